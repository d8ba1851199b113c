#![cfg(feature = "server")]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetcher;

pub use config::DashboardConfig;
pub use coordinator::{RefreshCoordinator, RefreshOutcome, RefreshReport};

pub use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt, EnvFilter};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn,hyper_util=warn"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
