//! Frame-driven systems and the `Simulation` facade that runs them

pub mod behavior;
pub mod collision;
pub mod director;
pub mod input;
pub mod player_control;
pub mod snapshot;
pub mod tick;

pub use behavior::{BehaviorContext, BehaviorEngine, BehaviorTable};
pub use collision::{CollisionOutcome, CollisionSystem};
pub use director::Director;
pub use input::{InputEvent, InputState};
pub use player_control::{CameraRig, PlayerController};
pub use snapshot::{
    HighScoreStore, JsonHighScoreFile, LogRankingSink, MemoryHighScore, MemoryRankingSink,
    RankingSink, RenderSnapshot, RunOutcome, RunSummary,
};
pub use tick::Simulation;
