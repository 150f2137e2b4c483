mod config;
mod session;

pub use config::GrowthConfig;
pub use session::{GrowthSession, RunSummary};
