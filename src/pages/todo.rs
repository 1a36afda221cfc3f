use crate::errors::Result;
use crate::selector::Selector;
use crate::session::Session;

pub const TODO_APP_URL: &str = "https://todo.uiineed.com/";

/// Page object for the to-do list app. Static locators for the entry form,
/// dynamic XPath builders for items addressed by their text.
pub struct TodoPage<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> TodoPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self::at(session, TODO_APP_URL)
    }

    pub fn at(session: &'a Session, url: impl Into<String>) -> Self {
        Self {
            session,
            url: url.into(),
        }
    }

    pub fn new_todo_input() -> Selector {
        Selector::xpath("//input[@placeholder='Add a to-do item...']")
    }

    pub fn add_button() -> Selector {
        Selector::xpath("//button[text()='Add']")
    }

    pub fn item_by_text(todo_text: &str) -> Selector {
        Selector::xpath(format!(
            "//div[normalize-space(text())='{}']",
            todo_text
        ))
    }

    pub fn delete_button_for(todo_text: &str) -> Selector {
        Selector::xpath(format!(
            "//div[normalize-space(text())='{}']/following-sibling::div[contains(@class, 'todo-btn btn-delete')]",
            todo_text
        ))
    }

    pub async fn open(&self) -> Result<()> {
        self.session.navigate(&self.url).await
    }

    pub async fn reload(&self) -> Result<()> {
        self.session.reload().await
    }

    pub async fn enter_todo(&self, todo_text: &str) -> Result<()> {
        self.session.fill(&Self::new_todo_input(), todo_text).await
    }

    pub async fn click_add(&self) -> Result<()> {
        self.session.click(&Self::add_button()).await
    }

    pub async fn delete_todo(&self, todo_text: &str) -> Result<()> {
        self.session.click(&Self::delete_button_for(todo_text)).await
    }

    pub async fn is_todo_present(&self, todo_text: &str) -> Result<bool> {
        Ok(self.session.count(&Self::item_by_text(todo_text)).await? > 0)
    }
}
