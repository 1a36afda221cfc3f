use crate::config::SessionConfig;
use crate::errors::{HarnessError, Result};
use crate::selector::{js_escape, Selector};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use tracing::debug;

/// One browser process, one browser instance, one tab. Created once per test
/// class and exclusively owned by it; `close` consumes the session so nothing
/// can touch the browser after teardown begins.
pub struct Session {
    browser: Browser,
    tab: Arc<Tab>,
}

impl Session {
    pub async fn launch(config: SessionConfig) -> Result<Self> {
        // Arg strings must outlive the OsStr borrows below.
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );
        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];
        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .args(args)
            .build()
            .map_err(|e| HarnessError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| HarnessError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| HarnessError::LaunchFailed(e.to_string()))?;

        debug!(headless = config.headless, "browser session launched");

        Ok(Self { browser, tab })
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        self.tab
            .navigate_to(url)
            .map_err(|e| HarnessError::NavigationFailed(e.to_string()))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| HarnessError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    pub async fn reload(&self) -> Result<()> {
        self.tab
            .reload(false, None)
            .map_err(|e| HarnessError::NavigationFailed(e.to_string()))?;
        Ok(())
    }

    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    /// Fill a field. CSS selectors type through the browser's input pipeline;
    /// XPath fields are set in page context with input/change events so
    /// framework bindings still fire.
    pub async fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        match selector {
            Selector::Css(css) => {
                let element = self
                    .tab
                    .find_element(css)
                    .map_err(|e| HarnessError::ElementNotFound(e.to_string()))?;

                element
                    .click()
                    .map_err(|e| HarnessError::JavaScriptFailed(e.to_string()))?;

                element
                    .type_into(text)
                    .map_err(|e| HarnessError::JavaScriptFailed(e.to_string()))?;

                Ok(())
            }
            Selector::XPath(_) => {
                let js_code = format!(
                    r#"
                    (function() {{
                        const element = {};
                        if (element) {{
                            element.focus();
                            element.value = '{}';
                            element.dispatchEvent(new Event('input', {{ bubbles: true }}));
                            element.dispatchEvent(new Event('change', {{ bubbles: true }}));
                            return true;
                        }}
                        return false;
                    }})()
                "#,
                    selector.lookup_js(),
                    js_escape(text)
                );
                self.evaluate_expecting_true(&js_code, selector).await
            }
        }
    }

    pub async fn click(&self, selector: &Selector) -> Result<()> {
        match selector {
            Selector::Css(css) => {
                self.tab
                    .find_element(css)
                    .map_err(|e| HarnessError::ElementNotFound(e.to_string()))?
                    .click()
                    .map_err(|e| HarnessError::JavaScriptFailed(e.to_string()))?;
                Ok(())
            }
            Selector::XPath(_) => {
                let js_code = format!(
                    r#"
                    (function() {{
                        const element = {};
                        if (element) {{
                            element.click();
                            return true;
                        }}
                        return false;
                    }})()
                "#,
                    selector.lookup_js()
                );
                self.evaluate_expecting_true(&js_code, selector).await
            }
        }
    }

    pub async fn text(&self, selector: &Selector) -> Result<Option<String>> {
        let js_code = format!(
            r#"
            (function() {{
                const element = {};
                if (element) {{
                    return element.textContent || element.innerText;
                }}
                return null;
            }})()
        "#,
            selector.lookup_js()
        );

        let value = self.evaluate(&js_code).await?;
        Ok(value.as_str().map(|s| s.to_string()))
    }

    pub async fn is_visible(&self, selector: &Selector) -> Result<bool> {
        let js_code = format!(
            r#"
            (function() {{
                const element = {};
                if (!element) return false;

                const rect = element.getBoundingClientRect();
                const style = window.getComputedStyle(element);

                return rect.width > 0 &&
                       rect.height > 0 &&
                       style.visibility !== 'hidden' &&
                       style.display !== 'none' &&
                       parseFloat(style.opacity) > 0;
            }})()
        "#,
            selector.lookup_js()
        );

        let value = self.evaluate(&js_code).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn is_attached(&self, selector: &Selector) -> Result<bool> {
        let js_code = format!("(function() {{ return {} !== null; }})()", selector.lookup_js());
        let value = self.evaluate(&js_code).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// True when the element exists and carries a disabled property. A
    /// missing element reports false; attachment is a separate signal.
    pub async fn is_disabled(&self, selector: &Selector) -> Result<bool> {
        let js_code = format!(
            r#"
            (function() {{
                const element = {};
                return element !== null && element.disabled === true;
            }})()
        "#,
            selector.lookup_js()
        );
        let value = self.evaluate(&js_code).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn count(&self, selector: &Selector) -> Result<usize> {
        let js_code = format!("(function() {{ return {}; }})()", selector.count_js());
        let value = self.evaluate(&js_code).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| HarnessError::JavaScriptFailed(e.to_string()))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await?;
        Ok(())
    }

    pub async fn capture_full_page(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(
                headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption::Png,
                None,
                None,
                true,
            )
            .map_err(|e| HarnessError::ScreenshotCapture(e.to_string()))
    }

    /// Append a locale timestamp to `text`, computed in page context so the
    /// stamp reflects the browser's clock and locale.
    pub async fn timestamp_text(&self, text: &str) -> Result<String> {
        let js_code = format!(
            r#"
            (function() {{
                const now = new Date();
                return `{} - ${{now.toLocaleString()}}`;
            }})()
        "#,
            js_escape(text)
        );

        let value = self.evaluate(&js_code).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| HarnessError::JavaScriptFailed("timestamp evaluation returned no string".to_string()))
    }

    pub(crate) fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Tear down in order: tab, then browser (dropping the browser terminates
    /// the process). Consuming `self` makes use-after-teardown unrepresentable;
    /// a tab that is already gone is tolerated.
    pub async fn close(self) -> Result<()> {
        if let Err(e) = self.tab.close(true) {
            debug!("tab already closed or close failed: {}", e);
        }
        drop(self.browser);
        Ok(())
    }

    async fn evaluate_expecting_true(&self, js_code: &str, selector: &Selector) -> Result<()> {
        let value = self.evaluate(js_code).await?;
        if value.as_bool() == Some(true) {
            return Ok(());
        }
        Err(HarnessError::ElementNotFound(format!(
            "no element matching {}",
            selector
        )))
    }
}
