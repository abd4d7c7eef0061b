pub mod app;
pub mod cache;
pub mod charts;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod state;
pub mod table;
pub mod ui;
pub mod whoop;

pub use app::router;
pub use config::AppConfig;
pub use errors::DashboardError;
pub use state::AppState;
