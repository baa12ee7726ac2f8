pub mod password;
pub mod repo;

pub use repo::{CreateUserError, Role, User};
