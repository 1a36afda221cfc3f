use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("Timed out after {timeout_ms}ms waiting for {condition}: {subject}")]
    WaitTimeout {
        condition: String,
        subject: String,
        timeout_ms: u64,
    },

    #[error("Screenshot capture failed: {0}")]
    ScreenshotCapture(String),

    #[error("Dialog handling failed: {0}")]
    DialogFailed(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
