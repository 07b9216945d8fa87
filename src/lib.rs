pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod phone;
pub mod response;
pub mod server;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::ApiError;
pub use server::{create_app, Server};
pub use store::{KeyValueStore, MemoryStore, RedisStore, WriteOutcome};
