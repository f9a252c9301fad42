pub mod config;
pub mod dupes;
pub mod error;
pub mod hasher;
pub mod messages;
pub mod model;
pub mod scanner;
pub mod search;
pub mod worker;

pub use config::AppConfig;
pub use error::Error;
pub use worker::{CancelToken, WorkerHandle};
