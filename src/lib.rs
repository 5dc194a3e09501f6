//! reqdeck
//!
//! Playground and saved HTTP requests, a normalized response model for the
//! viewer, and file-backed workspaces, collections and requests.

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod state;
pub mod storage;
pub mod util;
pub mod view;

pub use app::App;
pub use config::Config;
pub use error::AppError;
