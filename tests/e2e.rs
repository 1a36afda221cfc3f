//! Live end-to-end scenarios. These drive a real Chrome instance against the
//! public demo applications, so they are ignored by default and run with:
//!
//! ```text
//! cargo test --test e2e -- --ignored --test-threads=1
//! ```

use e2e_harness::pages::login::{LoginPage, SAUCEDEMO_URL};
use e2e_harness::pages::todo::TODO_APP_URL;
use e2e_harness::{
    check_and_handle_dialog, scenarios, testdata, wait, HarnessError, ReportConfig, Reporter,
    Selector, Session, SessionConfig, WaitOptions,
};
use std::time::{Duration, Instant};
use uuid::Uuid;

fn reporter(tag: &str) -> Reporter {
    Reporter::new(ReportConfig {
        output_root: std::env::temp_dir().join(format!("e2e-{}-{}", tag, Uuid::new_v4())),
        embed_screenshots: false,
    })
    .expect("reporter output dir")
}

async fn launch() -> Session {
    Session::launch(SessionConfig::default())
        .await
        .expect("browser launch")
}

#[tokio::test]
#[ignore = "requires a Chrome install and network access"]
async fn positive_logins_reach_the_inventory_page() {
    let session = launch().await;
    let reporter = reporter("login-pos");

    for case in testdata::positive_logins() {
        scenarios::login::positive_login(&session, &reporter, &case, SAUCEDEMO_URL)
            .await
            .unwrap_or_else(|e| panic!("login for {} should succeed: {}", case.username, e));
        scenarios::login::reset_to_login_page(&session, SAUCEDEMO_URL)
            .await
            .expect("reset to login page");
    }

    session.close().await.expect("session close");
}

#[tokio::test]
#[ignore = "requires a Chrome install and network access"]
async fn composite_login_reaches_the_inventory_page() {
    let session = launch().await;
    let page = LoginPage::new(&session);
    let options = WaitOptions::default();

    page.open().await.expect("open login page");
    wait::wait_for_visible(&session, &LoginPage::username_input(), options)
        .await
        .expect("login form");

    page.login("standard_user", "secret_sauce")
        .await
        .expect("composite login");

    wait::wait_for_url_contains(&session, "inventory.html", options)
        .await
        .expect("inventory redirect");
    assert!(page.is_login_successful());

    session.close().await.expect("session close");
}

#[tokio::test]
#[ignore = "requires a Chrome install and network access"]
async fn negative_logins_surface_the_exact_error_text() {
    let session = launch().await;
    let reporter = reporter("login-neg");

    for case in testdata::negative_logins() {
        scenarios::login::negative_login(&session, &reporter, &case, SAUCEDEMO_URL)
            .await
            .unwrap_or_else(|e| {
                panic!("negative login for {} should validate: {}", case.username, e)
            });
    }

    session.close().await.expect("session close");
}

#[tokio::test]
#[ignore = "requires a Chrome install and network access"]
async fn todo_items_round_trip_cleanly() {
    let session = launch().await;
    let reporter = reporter("todo");

    for todo_text in testdata::todo_inputs() {
        scenarios::todo::create_and_delete_todo(&session, &reporter, todo_text, TODO_APP_URL)
            .await
            .unwrap_or_else(|e| panic!("todo round-trip for {:?} should pass: {}", todo_text, e));
    }

    session.close().await.expect("session close");
}

#[tokio::test]
#[ignore = "requires a Chrome install and network access"]
async fn waiting_for_a_missing_selector_times_out_in_bounded_time() {
    let session = launch().await;
    session
        .navigate("https://example.com")
        .await
        .expect("navigate");

    let options = WaitOptions::new().with_timeout(2000).with_poll_interval(200);
    let start = Instant::now();
    let result =
        wait::wait_for_visible(&session, &Selector::css("#does-not-exist"), options).await;
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(HarnessError::WaitTimeout { .. })));
    assert!(elapsed >= Duration::from_millis(2000));
    // Timeout plus at most one poll interval, with slack for probe latency.
    assert!(elapsed <= Duration::from_millis(2000 + 200 + 500));

    session.close().await.expect("session close");
}

#[tokio::test]
#[ignore = "requires a Chrome install and network access"]
async fn dialog_window_without_a_dialog_resolves_false_after_the_window() {
    let session = launch().await;
    session
        .navigate("https://example.com")
        .await
        .expect("navigate");

    let start = Instant::now();
    let detected = check_and_handle_dialog(&session, 3000)
        .await
        .expect("dialog window");
    let elapsed = start.elapsed();

    assert!(!detected);
    assert!(elapsed >= Duration::from_millis(3000));
    assert!(elapsed <= Duration::from_millis(3000 + 500));

    session.close().await.expect("session close");
}

#[tokio::test]
#[ignore = "requires a Chrome install and network access"]
async fn dialog_raised_by_the_page_is_detected_and_accepted() {
    let session = launch().await;
    session
        .navigate("https://example.com")
        .await
        .expect("navigate");

    let watch = e2e_harness::DialogWatch::arm(&session).expect("arm watch");
    session
        .evaluate("setTimeout(() => alert('hello from the page'), 200)")
        .await
        .expect("schedule alert");

    let outcome = watch.wait(3000).await;
    assert!(outcome.detected);
    assert_eq!(outcome.message.as_deref(), Some("hello from the page"));

    session.close().await.expect("session close");
}
