use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Configuration for one browser session. One session owns one browser
/// process, one browser instance and one tab for its whole lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport {
                width: 1280,
                height: 720,
            },
            user_agent: None,
        }
    }
}

/// Where report artifacts go: `TestReport.html` and `report.json` under
/// `output_root`, screenshots under `output_root/screenshots/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_root: PathBuf,
    /// Inline screenshots into the HTML as base64 data URIs instead of
    /// linking them by relative path.
    pub embed_screenshots: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("test-output"),
            embed_screenshots: false,
        }
    }
}
