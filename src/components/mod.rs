pub mod cards;
pub mod codex;
pub mod copilot;
pub mod dashboard;
pub mod donut;
pub mod header;
pub mod openrouter;

pub use dashboard::Dashboard;
