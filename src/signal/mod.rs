//! Signal generation module
//!
//! Detects entry opportunities from recent price momentum

mod momentum;
mod types;

pub use momentum::{MomentumConfig, MomentumSignal, HISTORY_CAPACITY};
pub use types::Signal;
