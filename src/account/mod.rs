//! Account domain: models, password digesting, persistence, and the service.

pub mod models;
pub mod password;
pub mod repo;
pub mod service;

pub use repo::{MemoryUserStore, PgUserStore, UserStore};
pub use service::AccountService;
