use crate::errors::{HarnessError, Result};
use crate::pages::todo::TodoPage;
use crate::report::{CaseLogger, Reporter, TestStatus};
use crate::session::Session;
use crate::wait::{self, WaitOptions};
use std::time::Duration;

/// Round-trip: create a timestamped to-do item, confirm it survives a page
/// reload, delete it, and confirm the list no longer carries it. The
/// timestamp keeps re-runs from colliding with leftovers of earlier runs.
pub async fn create_and_delete_todo(
    session: &Session,
    reporter: &Reporter,
    todo_text: &str,
    base_url: &str,
) -> Result<()> {
    let log = reporter.start_case(
        &format!("Create and Delete Todo Test with: {}", todo_text),
        None,
    );

    match run(session, &log, todo_text, base_url).await {
        Ok(()) => {
            log.finish(TestStatus::Passed);
            Ok(())
        }
        Err(e) => {
            if !matches!(e, HarnessError::AssertionFailed(_)) {
                log.fail(session, &format!("Todo scenario failed: {}", e)).await;
            }
            log.finish(TestStatus::Failed);
            Err(e)
        }
    }
}

async fn run(
    session: &Session,
    log: &CaseLogger,
    todo_text: &str,
    base_url: &str,
) -> Result<()> {
    let page = TodoPage::at(session, base_url);
    let options = WaitOptions::default();

    log.info("Step 1: Navigating to Todo application");
    page.open().await?;
    wait::wait_for_visible(session, &TodoPage::new_todo_input(), options).await?;

    let stamped = session.timestamp_text(todo_text).await?;

    log.info(&format!("Step 2: Entering todo text: {}", todo_text));
    page.enter_todo(&stamped).await?;

    log.info("Step 3: Clicking Add button");
    page.click_add().await?;

    // A reload proves the item was persisted, not just rendered.
    page.reload().await?;

    log.info(&format!("Step 4: Verifying todo item was created: {}", stamped));
    wait::wait_for_visible(session, &TodoPage::item_by_text(&stamped), options).await?;

    if page.is_todo_present(&stamped).await? {
        log.pass(
            session,
            &format!("Todo item was created successfully: {}", stamped),
        )
        .await;
    } else {
        log.fail(session, &format!("Failed to create todo item: {}", stamped))
            .await;
        return Err(HarnessError::AssertionFailed(format!(
            "todo item was not created: {}",
            stamped
        )));
    }

    log.info(&format!("Step 5: Deleting todo item: {}", todo_text));
    page.delete_todo(&stamped).await?;

    log.info(&format!("Step 6: Verifying todo item was deleted: {}", stamped));
    // Give the list a moment to settle after the delete animation.
    tokio::time::sleep(Duration::from_millis(1000)).await;

    if page.is_todo_present(&stamped).await? {
        log.fail(
            session,
            &format!("Todo item '{}' still exists after deletion", todo_text),
        )
        .await;
        return Err(HarnessError::AssertionFailed(format!(
            "todo item was not deleted: {}",
            todo_text
        )));
    }

    log.pass(
        session,
        &format!("Todo item '{}' was successfully deleted", todo_text),
    )
    .await;
    Ok(())
}
