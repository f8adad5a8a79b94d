//! User records and the manager that keeps them in sync with the remote
//! collection.

pub mod api;
pub mod cli;
pub mod models;
pub mod store;
pub mod validation;

pub use api::{HttpUserApi, UserApi};
pub use cli::{UserCommands, handle_user_command};
