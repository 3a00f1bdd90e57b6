//! Deep Feast - frame-driven simulation core for an eat-and-grow ocean game
//!
//! The crate owns all gameplay state and rules. Rendering, audio and network
//! services sit outside it and talk to it through `RenderSnapshot`,
//! `SimEvent` and the `RankingSink` / `HighScoreStore` traits.

pub mod core;
pub mod entity;
pub mod progression;
pub mod simulation;
pub mod spatial;
pub mod store;

pub use crate::core::config::GameConfig;
pub use crate::core::error::{Result, SimError};
pub use crate::simulation::Simulation;
pub use crate::store::SimEvent;
