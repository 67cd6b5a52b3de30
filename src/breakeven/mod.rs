//! Auto-breakeven and trailing stop management

mod config;
mod manager;

pub use config::{BreakevenConfig, MAX_STEPS};
pub use manager::{
    BreakevenEvent, BreakevenManager, BreakevenState, BreakevenStatus, TrackedStatus,
};
