use clap::Parser;
use e2e_harness::pages::login::SAUCEDEMO_URL;
use e2e_harness::pages::todo::TODO_APP_URL;
use e2e_harness::{scenarios, testdata, ReportConfig, Reporter, Session, SessionConfig};
use std::path::PathBuf;
use tracing::{error, info};
use url::Url;

/// Runs the full browser end-to-end suite: the storefront login scenarios
/// and the to-do round-trip, one session per scenario class.
#[derive(Parser, Debug)]
#[command(name = "e2e-runner", version, about)]
struct Args {
    /// Run the browser headed instead of headless.
    #[arg(long)]
    headed: bool,

    /// Directory for the HTML report and screenshots.
    #[arg(long, default_value = "test-output")]
    output_dir: PathBuf,

    /// Inline screenshots into the HTML report instead of linking them.
    #[arg(long)]
    embed_screenshots: bool,

    /// Base URL of the storefront login app.
    #[arg(long, default_value = SAUCEDEMO_URL)]
    login_url: Url,

    /// Base URL of the to-do app.
    #[arg(long, default_value = TODO_APP_URL)]
    todo_url: Url,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let reporter = Reporter::new(ReportConfig {
        output_root: args.output_dir.clone(),
        embed_screenshots: args.embed_screenshots,
    })?;

    let session_config = SessionConfig {
        headless: !args.headed,
        ..Default::default()
    };

    let mut failures = 0usize;
    let mut total = 0usize;

    // Login scenario class: one session for all its data-driven cases. A
    // launch failure skips the whole class but lets the todo class still run.
    match Session::launch(session_config.clone()).await {
        Ok(session) => {
            let base_url = args.login_url.as_str();

            for case in testdata::positive_logins() {
                total += 1;
                if let Err(e) =
                    scenarios::login::positive_login(&session, &reporter, &case, base_url).await
                {
                    error!("positive login for {} failed: {}", case.username, e);
                    failures += 1;
                }
                if let Err(e) = scenarios::login::reset_to_login_page(&session, base_url).await {
                    error!("reset after login case failed: {}", e);
                }
            }

            for case in testdata::negative_logins() {
                total += 1;
                if let Err(e) =
                    scenarios::login::negative_login(&session, &reporter, &case, base_url).await
                {
                    error!("negative login for {} failed: {}", case.username, e);
                    failures += 1;
                }
            }

            session.close().await?;
        }
        Err(e) => {
            error!("browser launch for the login suite failed: {}", e);
            let reason = format!("Browser session could not be launched: {}", e);
            for case in testdata::positive_logins() {
                total += 1;
                failures += 1;
                reporter.skip_case(
                    &format!("Positive Login Test with user: {}", case.username),
                    &reason,
                );
            }
            for case in testdata::negative_logins() {
                total += 1;
                failures += 1;
                reporter.skip_case(
                    &format!("Negative Login Test with user: {}", case.username),
                    &reason,
                );
            }
        }
    }

    // Todo scenario class: a fresh session of its own.
    match Session::launch(session_config).await {
        Ok(session) => {
            let base_url = args.todo_url.as_str();

            for todo_text in testdata::todo_inputs() {
                total += 1;
                if let Err(e) = scenarios::todo::create_and_delete_todo(
                    &session, &reporter, todo_text, base_url,
                )
                .await
                {
                    error!("todo round-trip for {:?} failed: {}", todo_text, e);
                    failures += 1;
                }
            }

            session.close().await?;
        }
        Err(e) => {
            error!("browser launch for the todo suite failed: {}", e);
            let reason = format!("Browser session could not be launched: {}", e);
            for todo_text in testdata::todo_inputs() {
                total += 1;
                failures += 1;
                reporter.skip_case(
                    &format!("Create and Delete Todo Test with: {}", todo_text),
                    &reason,
                );
            }
        }
    }

    info!(
        "suite complete: {} cases, {} failed; report at {}",
        total,
        failures,
        args.output_dir.join("TestReport.html").display()
    );

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
