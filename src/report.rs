use crate::config::ReportConfig;
use crate::errors::{HarnessError, Result};
use crate::session::Session;
use base64::Engine as _;
use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepLevel {
    Info,
    Pass,
    Fail,
}

impl StepLevel {
    fn label(self) -> &'static str {
        match self {
            StepLevel::Info => "INFO",
            StepLevel::Pass => "PASS",
            StepLevel::Fail => "FAIL",
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            StepLevel::Info => "info",
            StepLevel::Pass => "pass",
            StepLevel::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    fn label(self) -> &'static str {
        match self {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILURE",
            TestStatus::Skipped => "SKIPPED",
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            TestStatus::Passed => "status-passed",
            TestStatus::Failed => "status-failed",
            TestStatus::Skipped => "status-skipped",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub level: StepLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
    /// Screenshot path relative to the report output root.
    pub screenshot: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub name: String,
    pub description: String,
    pub started: DateTime<Local>,
    pub steps: Vec<Step>,
    pub status: Option<TestStatus>,
}

#[derive(Debug, Serialize)]
struct RunRecord {
    run_id: Uuid,
    started: DateTime<Local>,
    cases: Vec<CaseRecord>,
}

/// The report sink for one whole run. Cloneable and explicitly threaded
/// through scenarios; the inner mutex serializes step writes and flushes so
/// classes running on separate sessions cannot interleave report state.
#[derive(Clone)]
pub struct Reporter {
    inner: Arc<Mutex<RunRecord>>,
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Result<Self> {
        fs::create_dir_all(&config.output_root)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(RunRecord {
                run_id: Uuid::new_v4(),
                started: Local::now(),
                cases: Vec::new(),
            })),
            config,
        })
    }

    /// Open one report entry. A missing description defaults to empty.
    pub fn start_case(&self, name: &str, description: Option<&str>) -> CaseLogger {
        let index = {
            let mut run = self.lock();
            run.cases.push(CaseRecord {
                name: name.to_string(),
                description: description.unwrap_or("").to_string(),
                started: Local::now(),
                steps: Vec::new(),
                status: None,
            });
            run.cases.len() - 1
        };
        self.flush_or_warn();
        CaseLogger {
            reporter: self.clone(),
            index,
        }
    }

    /// Record a case that never ran, with the reason as its only step.
    /// Used when a whole scenario class loses its browser session.
    pub fn skip_case(&self, name: &str, reason: &str) {
        let case = self.start_case(name, None);
        case.info(reason);
        case.finish(TestStatus::Skipped);
    }

    /// Render and write `TestReport.html` and `report.json`. Called after
    /// every step and status write so partial reports are always recoverable.
    pub fn flush(&self) -> Result<()> {
        let (html, json) = {
            let run = self.lock();
            (
                render_html(&run, &self.config),
                serde_json::to_string_pretty(&*run)?,
            )
        };
        fs::create_dir_all(&self.config.output_root)?;
        fs::write(self.config.output_root.join("TestReport.html"), html)?;
        fs::write(self.config.output_root.join("report.json"), json)?;
        Ok(())
    }

    pub fn case_count(&self) -> usize {
        self.lock().cases.len()
    }

    fn flush_or_warn(&self) {
        // Report plumbing must never fail a test step.
        if let Err(e) = self.flush() {
            warn!("report flush failed: {}", e);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RunRecord> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Logger for one open report entry. Steps are appended strictly in call
/// order; the final status write follows all of them.
pub struct CaseLogger {
    reporter: Reporter,
    index: usize,
}

impl CaseLogger {
    pub fn info(&self, message: &str) {
        self.push_step(StepLevel::Info, message, None);
        self.reporter.flush_or_warn();
    }

    /// Log a passing step and attach a full-page screenshot. A capture
    /// failure degrades to an info note and never fails the step.
    pub async fn pass(&self, session: &Session, message: &str) {
        self.log_with_screenshot(session, StepLevel::Pass, "PASS", message)
            .await;
    }

    /// Log a failing step and attach a full-page screenshot, so every
    /// failure leaves visual evidence where feasible.
    pub async fn fail(&self, session: &Session, message: &str) {
        self.log_with_screenshot(session, StepLevel::Fail, "FAIL", message)
            .await;
    }

    /// Write the final status after all step logs and flush unconditionally.
    pub fn finish(&self, status: TestStatus) {
        {
            let mut run = self.reporter.lock();
            if let Some(case) = run.cases.get_mut(self.index) {
                case.status = Some(status);
            }
        }
        self.reporter.flush_or_warn();
    }

    /// Write screenshot bytes under `screenshots/<sanitized-label>.png` and
    /// attach the relative path to the most recent step of this case.
    pub fn attach_image_bytes(&self, label: &str, bytes: &[u8]) -> Result<String> {
        let dir = self.reporter.config.output_root.join("screenshots");
        fs::create_dir_all(&dir).map_err(|e| HarnessError::ScreenshotCapture(e.to_string()))?;

        let file_name = format!("{}.png", sanitize_label(label));
        fs::write(dir.join(&file_name), bytes)
            .map_err(|e| HarnessError::ScreenshotCapture(e.to_string()))?;

        let relative = format!("screenshots/{}", file_name);
        {
            let mut run = self.reporter.lock();
            if let Some(step) = run
                .cases
                .get_mut(self.index)
                .and_then(|case| case.steps.last_mut())
            {
                step.screenshot = Some(relative.clone());
            }
        }
        Ok(relative)
    }

    async fn log_with_screenshot(
        &self,
        session: &Session,
        level: StepLevel,
        prefix: &str,
        message: &str,
    ) {
        self.push_step(level, message, None);
        match self.capture(session, &format!("{}_{}", prefix, message)).await {
            Ok(_) => {}
            Err(e) => {
                warn!("screenshot capture failed: {}", e);
                self.push_step(
                    StepLevel::Info,
                    &format!("Failed to capture screenshot: {}", e),
                    None,
                );
            }
        }
        self.reporter.flush_or_warn();
    }

    async fn capture(&self, session: &Session, label: &str) -> Result<String> {
        session.scroll_to_bottom().await?;
        let bytes = session.capture_full_page().await?;
        self.attach_image_bytes(label, &bytes)
    }

    fn push_step(&self, level: StepLevel, message: &str, screenshot: Option<String>) {
        let mut run = self.reporter.lock();
        if let Some(case) = run.cases.get_mut(self.index) {
            case.steps.push(Step {
                level,
                message: message.to_string(),
                timestamp: Local::now(),
                screenshot,
            });
        }
    }
}

/// Replace every non-alphanumeric character with an underscore, giving a
/// filesystem-safe screenshot label.
pub fn sanitize_label(label: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new("[^A-Za-z0-9]").expect("static regex"));
    re.replace_all(label, "_").into_owned()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn image_src(relative: &str, config: &ReportConfig) -> String {
    if config.embed_screenshots {
        let path = config.output_root.join(relative);
        if let Ok(bytes) = fs::read(&path) {
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            return format!("data:image/png;base64,{}", encoded);
        }
        warn!("could not inline screenshot {}", path.display());
    }
    relative.to_string()
}

fn render_html(run: &RunRecord, config: &ReportConfig) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Test Report</title>\n<style>\n");
    html.push_str(
        "body { font-family: sans-serif; margin: 2em; background: #f7f7f7; }\n\
         section.case { background: #fff; border-radius: 6px; padding: 1em 1.5em; margin-bottom: 1.5em; box-shadow: 0 1px 3px rgba(0,0,0,0.15); }\n\
         .badge { padding: 2px 10px; border-radius: 10px; color: #fff; font-size: 0.8em; }\n\
         .status-passed .badge { background: #2e7d32; }\n\
         .status-failed .badge { background: #c62828; }\n\
         .status-skipped .badge { background: #f9a825; }\n\
         .status-running .badge { background: #757575; }\n\
         table.steps { border-collapse: collapse; width: 100%; }\n\
         table.steps td { border-bottom: 1px solid #eee; padding: 4px 8px; vertical-align: top; }\n\
         td.level { font-weight: bold; width: 4em; }\n\
         tr.pass td.level { color: #2e7d32; }\n\
         tr.fail td.level { color: #c62828; }\n\
         tr.info td.level { color: #616161; }\n\
         img.screenshot { max-width: 480px; border: 1px solid #ddd; margin: 4px 0; }\n",
    );
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<h1>Test Report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Run <code>{}</code> started {}</p>\n",
        run.run_id,
        run.started.format("%Y-%m-%d %H:%M:%S")
    ));

    for case in &run.cases {
        let (status_class, status_label) = match case.status {
            Some(status) => (status.css_class(), status.label()),
            None => ("status-running", "RUNNING"),
        };
        html.push_str(&format!("<section class=\"case {}\">\n", status_class));
        html.push_str(&format!(
            "<h2>{} <span class=\"badge\">{}</span></h2>\n",
            html_escape(&case.name),
            status_label
        ));
        if !case.description.is_empty() {
            html.push_str(&format!(
                "<p class=\"desc\">{}</p>\n",
                html_escape(&case.description)
            ));
        }
        html.push_str("<table class=\"steps\">\n");
        for step in &case.steps {
            html.push_str(&format!(
                "<tr class=\"{}\"><td class=\"time\">{}</td><td class=\"level\">{}</td><td class=\"message\">{}</td></tr>\n",
                step.level.css_class(),
                step.timestamp.format("%H:%M:%S%.3f"),
                step.level.label(),
                html_escape(&step.message)
            ));
            if let Some(ref shot) = step.screenshot {
                html.push_str(&format!(
                    "<tr class=\"{}\"><td colspan=\"3\"><img class=\"screenshot\" src=\"{}\" alt=\"{}\"></td></tr>\n",
                    step.level.css_class(),
                    html_escape(&image_src(shot, config)),
                    html_escape(shot)
                ));
            }
        }
        html.push_str("</table>\n</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector as HtmlSelector};
    use std::path::PathBuf;

    fn temp_output_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("e2e-harness-{}-{}", tag, Uuid::new_v4()))
    }

    fn reporter(tag: &str) -> Reporter {
        Reporter::new(ReportConfig {
            output_root: temp_output_root(tag),
            embed_screenshots: false,
        })
        .unwrap()
    }

    #[test]
    fn sanitize_replaces_spaces_and_punctuation() {
        assert_eq!(
            sanitize_label("This is a test Input 1"),
            "This_is_a_test_Input_1"
        );
        assert_eq!(sanitize_label("a-b.c!d"), "a_b_c_d");
        assert_eq!(sanitize_label("Already_Safe_123"), "Already_Safe_123");
    }

    #[test]
    fn sanitized_labels_are_filesystem_safe() {
        let label = sanitize_label("FAIL_Login failed - inventory page not loaded");
        assert!(label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn start_case_defaults_description_to_empty() {
        let reporter = reporter("desc");
        let _case = reporter.start_case("some case", None);
        let run = reporter.lock();
        assert_eq!(run.cases[0].description, "");
    }

    #[test]
    fn steps_stay_in_issue_order_and_status_comes_last() {
        let reporter = reporter("order");
        let case = reporter.start_case("ordering", Some("step ordering"));
        case.info("first");
        case.info("second");
        case.info("third");
        case.finish(TestStatus::Passed);

        let run = reporter.lock();
        let record = &run.cases[0];
        let messages: Vec<_> = record.steps.iter().map(|s| s.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
        assert_eq!(record.status, Some(TestStatus::Passed));
    }

    #[test]
    fn failed_case_is_flushed_with_failure_status_and_screenshot() {
        let reporter = reporter("flush");
        let case = reporter.start_case("failing case", None);
        case.info("about to fail");
        // Simulate the fail-logging path without a live browser: push the
        // fail step and attach image bytes directly.
        case.push_step(StepLevel::Fail, "it broke", None);
        case.attach_image_bytes("FAIL_it broke", b"\x89PNG\r\n\x1a\nfake")
            .unwrap();
        case.finish(TestStatus::Failed);

        let root = reporter.config.output_root.clone();
        let html = fs::read_to_string(root.join("TestReport.html")).unwrap();
        let json = fs::read_to_string(root.join("report.json")).unwrap();
        assert!(root.join("screenshots/FAIL_it_broke.png").exists());
        assert!(json.contains("\"failed\""));

        let document = Html::parse_document(&html);
        let section = HtmlSelector::parse("section.case.status-failed").unwrap();
        assert_eq!(document.select(&section).count(), 1);

        let img = HtmlSelector::parse("img.screenshot").unwrap();
        let srcs: Vec<_> = document
            .select(&img)
            .filter_map(|el| el.value().attr("src"))
            .collect();
        assert_eq!(srcs, ["screenshots/FAIL_it_broke.png"]);

        let badge = HtmlSelector::parse("section.case .badge").unwrap();
        let badge_text: String = document.select(&badge).flat_map(|el| el.text()).collect();
        assert_eq!(badge_text, "FAILURE");

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn skipped_case_renders_with_skipped_status_and_reason() {
        let reporter = reporter("skip");
        reporter.skip_case(
            "Positive Login Test with user: standard_user",
            "Browser session could not be launched",
        );

        let root = reporter.config.output_root.clone();
        let html = fs::read_to_string(root.join("TestReport.html")).unwrap();
        let document = Html::parse_document(&html);

        let section = HtmlSelector::parse("section.case.status-skipped").unwrap();
        assert_eq!(document.select(&section).count(), 1);

        let badge = HtmlSelector::parse("section.case .badge").unwrap();
        let badge_text: String = document.select(&badge).flat_map(|el| el.text()).collect();
        assert_eq!(badge_text, "SKIPPED");

        let run = reporter.lock();
        assert_eq!(run.cases[0].status, Some(TestStatus::Skipped));
        assert_eq!(
            run.cases[0].steps[0].message,
            "Browser session could not be launched"
        );
        drop(run);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn embedded_screenshots_become_data_uris() {
        let reporter = Reporter::new(ReportConfig {
            output_root: temp_output_root("embed"),
            embed_screenshots: true,
        })
        .unwrap();
        let case = reporter.start_case("inline", None);
        case.push_step(StepLevel::Pass, "captured", None);
        case.attach_image_bytes("PASS_captured", b"pngbytes").unwrap();
        case.finish(TestStatus::Passed);

        let root = reporter.config.output_root.clone();
        let html = fs::read_to_string(root.join("TestReport.html")).unwrap();
        assert!(html.contains("data:image/png;base64,"));
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn html_escapes_markup_in_messages() {
        let reporter = reporter("escape");
        let case = reporter.start_case("<script>alert(1)</script>", None);
        case.info("a < b & c > d");
        case.finish(TestStatus::Passed);

        let root = reporter.config.output_root.clone();
        let html = fs::read_to_string(root.join("TestReport.html")).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &lt; b &amp; c &gt; d"));
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn reporter_clones_share_one_sink() {
        let reporter = reporter("clone");
        let clone = reporter.clone();
        let _a = reporter.start_case("from original", None);
        let _b = clone.start_case("from clone", None);
        assert_eq!(reporter.case_count(), 2);
        fs::remove_dir_all(&reporter.config.output_root).ok();
    }
}
