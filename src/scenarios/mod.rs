pub mod login;
pub mod todo;
