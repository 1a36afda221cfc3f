pub mod login;
pub mod todo;

pub use login::LoginPage;
pub use todo::TodoPage;
