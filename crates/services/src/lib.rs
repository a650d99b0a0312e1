#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod progress_service;
pub mod quiz_service;

pub use api::{HttpProgressApi, ProgressApi};
pub use config::ApiConfig;
pub use error::{ApiError, RefreshError};
pub use progress_service::{ProgressService, RefreshOutcome};
pub use quiz_service::QuizService;
