use crate::errors::Result;
use crate::selector::Selector;
use crate::session::Session;

pub const SAUCEDEMO_URL: &str = "https://www.saucedemo.com/";

/// Page object for the SauceDemo login screen. Borrows the session; the page
/// object never outlives the test class that owns the browser.
pub struct LoginPage<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self::at(session, SAUCEDEMO_URL)
    }

    pub fn at(session: &'a Session, url: impl Into<String>) -> Self {
        Self {
            session,
            url: url.into(),
        }
    }

    pub fn username_input() -> Selector {
        Selector::css("[name='user-name']")
    }

    // XPath on purpose, to keep one path-based locator in the suite.
    pub fn password_input() -> Selector {
        Selector::xpath("//input[@id='password']")
    }

    pub fn login_button() -> Selector {
        Selector::css("#login-button")
    }

    pub fn error_message() -> Selector {
        Selector::css("h3[data-test='error']")
    }

    pub async fn open(&self) -> Result<()> {
        self.session.navigate(&self.url).await
    }

    pub async fn enter_username(&self, username: &str) -> Result<()> {
        self.session.fill(&Self::username_input(), username).await
    }

    pub async fn enter_password(&self, password: &str) -> Result<()> {
        self.session.fill(&Self::password_input(), password).await
    }

    pub async fn click_login(&self) -> Result<()> {
        self.session.click(&Self::login_button()).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login().await
    }

    pub async fn error_text(&self) -> Result<Option<String>> {
        self.session.text(&Self::error_message()).await
    }

    pub async fn is_error_displayed(&self) -> Result<bool> {
        self.session.is_visible(&Self::error_message()).await
    }

    /// A successful login lands on the inventory page.
    pub fn is_login_successful(&self) -> bool {
        self.session.current_url().contains("inventory.html")
    }
}
