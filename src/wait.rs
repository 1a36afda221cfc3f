use crate::errors::{HarnessError, Result};
use crate::selector::Selector;
use crate::session::Session;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Timeout and poll interval for one wait call, passed by value. Replaces
/// optional trailing-timeout parameters with explicit defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// What the harness is polling for. Stateless; built per wait call.
#[derive(Debug, Clone)]
pub enum Condition {
    Visible(Selector),
    Enabled(Selector),
    UrlContains(String),
}

impl Condition {
    pub fn describe(&self) -> &'static str {
        match self {
            Condition::Visible(_) => "element visible",
            Condition::Enabled(_) => "element enabled",
            Condition::UrlContains(_) => "url contains",
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Condition::Visible(sel) | Condition::Enabled(sel) => sel.to_string(),
            Condition::UrlContains(substr) => format!("`{}`", substr),
        }
    }
}

/// Poll `probe` until it reports true or `options.timeout_ms` elapses.
/// Re-checks promptly after each interval, so the worst-case wall time is
/// timeout + one poll interval. Probe errors count as "not yet true" since
/// the page may be mid-navigation.
pub async fn poll_until<F, Fut>(
    condition: &str,
    subject: &str,
    options: WaitOptions,
    mut probe: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    loop {
        match probe().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => debug!("probe for {} not conclusive yet: {}", condition, e),
        }
        if start.elapsed() >= options.timeout() {
            break;
        }
        tokio::time::sleep(options.poll_interval()).await;
    }

    Err(HarnessError::WaitTimeout {
        condition: condition.to_string(),
        subject: subject.to_string(),
        timeout_ms: options.timeout_ms,
    })
}

pub async fn wait_for(session: &Session, condition: &Condition, options: WaitOptions) -> Result<()> {
    match condition {
        Condition::Visible(sel) => {
            poll_until(condition.describe(), &condition.subject(), options, || async move {
                session.is_visible(sel).await
            })
            .await
        }
        Condition::Enabled(sel) => {
            // Two independent signals: attached to the page, and no disabled
            // property. Both must hold.
            poll_until(condition.describe(), &condition.subject(), options, || async move {
                Ok(session.is_attached(sel).await? && !session.is_disabled(sel).await?)
            })
            .await
        }
        Condition::UrlContains(substr) => {
            poll_until(condition.describe(), &condition.subject(), options, || async move {
                Ok(session.current_url().contains(substr.as_str()))
            })
            .await
        }
    }
}

pub async fn wait_for_visible(
    session: &Session,
    selector: &Selector,
    options: WaitOptions,
) -> Result<()> {
    wait_for(session, &Condition::Visible(selector.clone()), options).await
}

pub async fn wait_for_enabled(
    session: &Session,
    selector: &Selector,
    options: WaitOptions,
) -> Result<()> {
    wait_for(session, &Condition::Enabled(selector.clone()), options).await
}

pub async fn wait_for_url_contains(
    session: &Session,
    substring: &str,
    options: WaitOptions,
) -> Result<()> {
    wait_for(
        session,
        &Condition::UrlContains(substring.to_string()),
        options,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn options_default_to_harness_timings() {
        let options = WaitOptions::default();
        assert_eq!(options.timeout_ms, 10_000);
        assert_eq!(options.poll_interval_ms, 500);
    }

    #[test]
    fn options_builder_overrides() {
        let options = WaitOptions::new().with_timeout(3000).with_poll_interval(100);
        assert_eq!(options.timeout(), Duration::from_millis(3000));
        assert_eq!(options.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn condition_describes_itself() {
        let visible = Condition::Visible(Selector::css("#login-button"));
        assert_eq!(visible.describe(), "element visible");
        assert_eq!(visible.subject(), "css `#login-button`");

        let url = Condition::UrlContains("inventory.html".to_string());
        assert_eq!(url.describe(), "url contains");
        assert_eq!(url.subject(), "`inventory.html`");
    }

    #[tokio::test(start_paused = true)]
    async fn poll_returns_immediately_when_probe_is_true() {
        let start = Instant::now();
        let result = poll_until("always true", "probe", WaitOptions::default(), || async {
            Ok(true)
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_succeeds_once_condition_flips() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe_calls = calls.clone();
        let start = Instant::now();

        let result = poll_until(
            "third time lucky",
            "probe",
            WaitOptions::new().with_timeout(10_000).with_poll_interval(500),
            move || {
                let calls = probe_calls.clone();
                async move { Ok(calls.fetch_add(1, Ordering::SeqCst) >= 2) }
            },
        )
        .await;

        assert!(result.is_ok());
        // Two intervals elapsed before the third probe saw the flip.
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_times_out_within_one_extra_interval() {
        let start = Instant::now();
        let options = WaitOptions::new().with_timeout(10_000).with_poll_interval(500);

        let result = poll_until("never true", "#missing", options, || async { Ok(false) }).await;

        match result {
            Err(HarnessError::WaitTimeout {
                condition,
                subject,
                timeout_ms,
            }) => {
                assert_eq!(condition, "never true");
                assert_eq!(subject, "#missing");
                assert_eq!(timeout_ms, 10_000);
            }
            other => panic!("expected WaitTimeout, got {:?}", other),
        }

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10_000));
        assert!(elapsed <= Duration::from_millis(10_500));
    }

    #[tokio::test(start_paused = true)]
    async fn probe_errors_are_treated_as_not_yet_true() {
        let options = WaitOptions::new().with_timeout(1000).with_poll_interval(200);
        let result = poll_until("broken probe", "probe", options, || async {
            Err(HarnessError::JavaScriptFailed("boom".to_string()))
        })
        .await;

        assert!(matches!(result, Err(HarnessError::WaitTimeout { .. })));
    }
}
