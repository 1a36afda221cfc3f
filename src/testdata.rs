//! Data tables feeding the data-driven scenarios.

#[derive(Debug, Clone, Copy)]
pub struct LoginCase {
    pub username: &'static str,
    pub password: &'static str,
    /// Expected error text for negative cases; `None` for logins that should
    /// succeed.
    pub expected_error: Option<&'static str>,
}

pub const LOCKED_OUT_MESSAGE: &str = "Epic sadface: Sorry, this user has been locked out.";
pub const BAD_CREDENTIALS_MESSAGE: &str =
    "Epic sadface: Username and password do not match any user in this service";

pub fn positive_logins() -> Vec<LoginCase> {
    vec![
        LoginCase {
            username: "standard_user",
            password: "secret_sauce",
            expected_error: None,
        },
        LoginCase {
            username: "performance_glitch_user",
            password: "secret_sauce",
            expected_error: None,
        },
        LoginCase {
            username: "problem_user",
            password: "secret_sauce",
            expected_error: None,
        },
    ]
}

pub fn negative_logins() -> Vec<LoginCase> {
    vec![
        LoginCase {
            username: "locked_out_user",
            password: "secret_sauce",
            expected_error: Some(LOCKED_OUT_MESSAGE),
        },
        LoginCase {
            username: "standard_user",
            password: "wrong_password",
            expected_error: Some(BAD_CREDENTIALS_MESSAGE),
        },
        LoginCase {
            username: "wrong_user",
            password: "secret_sauce",
            expected_error: Some(BAD_CREDENTIALS_MESSAGE),
        },
    ]
}

pub fn todo_inputs() -> Vec<&'static str> {
    vec![
        "This is a test Input 1",
        "This is a test input 2 with a very very very long entry",
    ]
}
