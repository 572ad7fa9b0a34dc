pub mod common;
pub mod console;
pub mod downloader;
pub mod parser;

pub use common::api::client::ApiClient;
pub use common::api::error::ApiError;
pub use common::config::AppConfig;
