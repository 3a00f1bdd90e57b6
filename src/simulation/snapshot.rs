//! Outward boundaries: render snapshot, run summary, ranking and high score
//!
//! Nothing in the simulation calls a renderer or a network service. A
//! presentation layer reads `RenderSnapshot` each frame; when a run ends the
//! caller hands a `RunSummary` to whatever `RankingSink` it has.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::types::{ItemId, NpcId, RunState, Tier, Timestamp};
use crate::entity::{Behavior, ItemKind, WorldEventKind};
use crate::progression::quests::QuestProgress;
use crate::progression::PerkId;
use crate::simulation::player_control::CameraRig;
use crate::store::EntityStore;

// === RENDER BOUNDARY ===

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub position: Vec3,
    pub velocity: Vec3,
    pub facing_yaw: f32,
    pub size: f32,
    pub dashing: bool,
    pub invincible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NpcView {
    pub id: NpcId,
    pub tier: Tier,
    pub position: Vec3,
    pub heading: Vec3,
    pub behavior: Behavior,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub kind: ItemKind,
    pub position: Vec3,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossView {
    pub position: Vec3,
    pub heading: Vec3,
    pub scale: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub kind: WorldEventKind,
    pub remaining: f64,
    pub drift: Vec3,
}

/// Values the HUD shows
#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub state: RunState,
    pub tier: Tier,
    pub experience: f32,
    pub exp_threshold: f32,
    pub gold: u64,
    pub score: u64,
    pub kills: u64,
    /// Current combo, 0 once the window has lapsed
    pub combo: u32,
    pub combo_multiplier: f32,
    /// Seconds until the dash can be used again, 0 when ready
    pub dash_cooldown: f64,
    /// Active effects with seconds remaining
    pub effects: Vec<(ItemKind, f64)>,
    pub boss_incoming: bool,
    pub perk_offer: Vec<PerkId>,
    pub quests: Vec<QuestProgress>,
    pub play_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub time: Timestamp,
    pub player: PlayerView,
    pub camera: CameraRig,
    pub npcs: Vec<NpcView>,
    pub items: Vec<ItemView>,
    pub boss: Option<BossView>,
    pub event: Option<EventView>,
    pub hud: Hud,
}

impl RenderSnapshot {
    pub fn capture(store: &EntityStore, camera: CameraRig, now: Timestamp) -> Self {
        let player = store.player();
        let tiers = &store.config().tiers;

        let npcs = store
            .npcs()
            .iter()
            .filter(|n| n.alive)
            .map(|n| NpcView {
                id: n.id,
                tier: n.tier,
                position: n.position,
                heading: n.direction,
                behavior: n.behavior.current,
            })
            .collect();

        let items = store
            .items()
            .iter()
            .map(|i| ItemView { id: i.id, kind: i.kind, position: i.position })
            .collect();

        let combo = store.combo();
        let (combo_count, combo_multiplier) = if combo.is_live(now) {
            (combo.count(), combo.multiplier())
        } else {
            (0, 1.0)
        };

        let hud = Hud {
            state: store.state(),
            tier: player.tier,
            experience: player.experience,
            exp_threshold: tiers.exp_threshold(player.tier),
            gold: player.gold,
            score: player.score,
            kills: player.kills,
            combo: combo_count,
            combo_multiplier,
            dash_cooldown: (player.dash_cooldown_end - now).max(0.0),
            effects: store
                .effects()
                .iter()
                .filter(|(_, at)| *at > now)
                .map(|(kind, at)| (kind, at - now))
                .collect(),
            boss_incoming: store.boss_warning_pending(),
            perk_offer: store.perk_offer().to_vec(),
            quests: store.quests().active().to_vec(),
            play_time: player.play_time(store.ended_at().unwrap_or(now)),
        };

        Self {
            time: now,
            player: PlayerView {
                position: player.position,
                velocity: player.velocity,
                facing_yaw: player.facing_yaw,
                size: store.player_size(),
                dashing: player.dashing,
                invincible: store.is_invincible(now),
            },
            camera,
            npcs,
            items,
            boss: store.boss().map(|b| BossView {
                position: b.position,
                heading: b.heading,
                scale: b.scale,
            }),
            event: store.event().map(|e| EventView {
                kind: e.kind,
                remaining: (e.ends_at - now).max(0.0),
                drift: e.current_drift(),
            }),
            hud,
        }
    }
}

// === RANKING BOUNDARY ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Cleared,
    GameOver,
}

/// Final record of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub nickname: String,
    pub score: u64,
    pub tier_reached: Tier,
    pub gold_earned: u64,
    pub kills: u64,
    pub play_time_secs: f64,
    pub outcome: RunOutcome,
}

impl RunSummary {
    /// Summarize a finished run. `None` while the run is still going.
    pub fn from_store(store: &EntityStore, nickname: &str) -> Option<Self> {
        let outcome = match store.state() {
            RunState::Playing => return None,
            RunState::Cleared => RunOutcome::Cleared,
            RunState::GameOver => RunOutcome::GameOver,
        };
        let player = store.player();
        let ended_at = store.ended_at().unwrap_or(player.started_at);

        Some(Self {
            run_id: Uuid::new_v4(),
            nickname: nickname.to_string(),
            score: player.score,
            tier_reached: player.tier,
            gold_earned: player.gold_earned,
            kills: player.kills,
            play_time_secs: player.play_time(ended_at),
            outcome,
        })
    }
}

/// Receiver for finished runs (leaderboard, analytics, ...)
pub trait RankingSink {
    fn submit(&mut self, summary: &RunSummary);
}

/// Writes each summary to the log
#[derive(Debug, Default)]
pub struct LogRankingSink;

impl RankingSink for LogRankingSink {
    fn submit(&mut self, summary: &RunSummary) {
        tracing::info!(
            run_id = %summary.run_id,
            nickname = %summary.nickname,
            score = summary.score,
            tier = summary.tier_reached,
            kills = summary.kills,
            "Run submitted ({:?} after {:.1}s)",
            summary.outcome,
            summary.play_time_secs
        );
    }
}

/// Keeps every submitted summary in memory
#[derive(Debug, Default)]
pub struct MemoryRankingSink {
    pub submitted: Vec<RunSummary>,
}

impl RankingSink for MemoryRankingSink {
    fn submit(&mut self, summary: &RunSummary) {
        self.submitted.push(summary.clone());
    }
}

// === PERSISTENCE BOUNDARY ===

/// Persistent best score across runs
pub trait HighScoreStore {
    fn load(&self) -> Result<u64>;
    fn save(&mut self, score: u64) -> Result<()>;

    /// Save `score` if it beats the stored one; true if it did
    fn record(&mut self, score: u64) -> Result<bool> {
        if score <= self.load()? {
            return Ok(false);
        }
        self.save(score)?;
        Ok(true)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u64,
}

/// High score kept in a small JSON file. A missing file reads as 0.
#[derive(Debug, Clone)]
pub struct JsonHighScoreFile {
    path: PathBuf,
}

impl JsonHighScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonHighScoreFile {
    fn load(&self) -> Result<u64> {
        if !self.path.exists() {
            return Ok(0);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let file: HighScoreFile = serde_json::from_str(&content)?;
        Ok(file.high_score)
    }

    fn save(&mut self, score: u64) -> Result<()> {
        let content = serde_json::to_string_pretty(&HighScoreFile { high_score: score })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryHighScore {
    best: u64,
}

impl MemoryHighScore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn load(&self) -> Result<u64> {
        Ok(self.best)
    }

    fn save(&mut self, score: u64) -> Result<()> {
        self.best = score;
        Ok(())
    }
}
