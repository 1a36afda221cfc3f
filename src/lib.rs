pub mod config;
pub mod dialog;
pub mod errors;
pub mod pages;
pub mod report;
pub mod scenarios;
pub mod selector;
pub mod session;
pub mod testdata;
pub mod wait;

pub use config::{ReportConfig, SessionConfig, Viewport};
pub use dialog::{check_and_handle_dialog, DialogOutcome, DialogWatch};
pub use errors::{HarnessError, Result};
pub use report::{CaseLogger, Reporter, StepLevel, TestStatus};
pub use selector::Selector;
pub use session::Session;
pub use wait::{Condition, WaitOptions};
