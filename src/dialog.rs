use crate::errors::{HarnessError, Result};
use crate::session::Session;
use headless_chrome::browser::tab::EventListener;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Page::HandleJavaScriptDialog;
use headless_chrome::Tab;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How often the detection flag is re-checked while the window is open.
pub const DIALOG_POLL_INTERVAL_MS: u64 = 100;

/// What happened inside one interception window.
#[derive(Debug, Clone, Default)]
pub struct DialogOutcome {
    pub detected: bool,
    pub message: Option<String>,
    pub accepted: bool,
}

type ListenerHandle = Weak<dyn EventListener<Event> + Send + Sync>;

/// An armed dialog interceptor. Arming subscribes a CDP listener that records
/// the dialog message and raises a single-writer atomic flag; the listener is
/// unsubscribed when the watch resolves, or on drop as a backstop.
pub struct DialogWatch {
    tab: Arc<Tab>,
    detected: Arc<AtomicBool>,
    message: Arc<Mutex<Option<String>>>,
    listener: Option<ListenerHandle>,
}

impl DialogWatch {
    pub fn arm(session: &Session) -> Result<Self> {
        let tab = session.tab().clone();
        let detected = Arc::new(AtomicBool::new(false));
        let message = Arc::new(Mutex::new(None));

        let flag = detected.clone();
        let slot = message.clone();
        let listener = tab
            .add_event_listener(Arc::new(move |event: &Event| {
                if let Event::PageJavascriptDialogOpening(e) = event {
                    debug!(message = %e.params.message, "dialog opened");
                    if let Ok(mut guard) = slot.lock() {
                        *guard = Some(e.params.message.clone());
                    }
                    flag.store(true, Ordering::SeqCst);
                }
            }))
            .map_err(|e| HarnessError::DialogFailed(e.to_string()))?;

        Ok(Self {
            tab,
            detected,
            message,
            listener: Some(listener),
        })
    }

    /// Block for up to `timeout_ms` waiting for a dialog. On detection the
    /// dialog is auto-accepted; an accept failure is logged and the detection
    /// result preserved. No dialog within the window resolves to a
    /// not-detected outcome, never an error.
    pub async fn wait(mut self, timeout_ms: u64) -> DialogOutcome {
        let resolved =
            wait_flag(&self.detected, Duration::from_millis(timeout_ms), Duration::from_millis(DIALOG_POLL_INTERVAL_MS)).await;

        let mut accepted = false;
        if resolved {
            match self.tab.call_method(HandleJavaScriptDialog {
                accept: true,
                prompt_text: None,
            }) {
                Ok(_) => accepted = true,
                // The dialog was still observed; the accept failure must not
                // mask that.
                Err(e) => warn!("failed to accept dialog: {}", e),
            }
        }

        let message = self.message.lock().ok().and_then(|guard| guard.clone());
        self.disarm();

        DialogOutcome {
            detected: resolved,
            message,
            accepted,
        }
    }

    fn disarm(&mut self) {
        if let Some(listener) = self.listener.take() {
            if let Err(e) = self.tab.remove_event_listener(&listener) {
                debug!("dialog listener removal failed: {}", e);
            }
        }
    }
}

impl Drop for DialogWatch {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Poll an atomic flag on a fixed tick until it is set or the deadline
/// passes. Returns the flag's final state.
pub(crate) async fn wait_flag(flag: &AtomicBool, timeout: Duration, tick: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !flag.load(Ordering::SeqCst) && Instant::now() < deadline {
        tokio::time::sleep(tick).await;
    }
    flag.load(Ordering::SeqCst)
}

/// Arm an interceptor and wait out the window. Returns `true` iff a dialog
/// was observed and handled inside it.
pub async fn check_and_handle_dialog(session: &Session, timeout_ms: u64) -> Result<bool> {
    let watch = DialogWatch::arm(session)?;
    let outcome = watch.wait(timeout_ms).await;
    if outcome.detected {
        debug!(message = ?outcome.message, accepted = outcome.accepted, "dialog handled");
    }
    Ok(outcome.detected)
}
