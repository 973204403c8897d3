pub mod app;
pub mod config;
pub mod headless;
pub mod render;

pub use app::{AppError, MapApp};
pub use config::ViewerConfig;
