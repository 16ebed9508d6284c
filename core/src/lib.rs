#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Echo Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the simulation systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what happened. Systems never reach into the world; they operate
//! on the vocabulary types declared here.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod enemies;
pub mod map;
pub mod rng;
pub mod turrets;
pub mod waves;

pub use enemies::{EliteTag, EnemyKind, EnemyProfile, BOSS_ROSTER};
pub use map::{MapData, PathGraph, PathSegment, Pool, RectN};
pub use rng::{mix_seed, SeededRng};
pub use turrets::{
    preview_upgrade, DamageType, ModIndex, ModSpec, StatKey, StatOp, StatsDelta, TargetMode,
    TurretKind, TurretStats, UpgradeError,
};
pub use waves::{SpawnEvent, WaveAnomaly, WaveScalar};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by the wall-clock time elapsed since the previous frame.
    Tick {
        /// Unscaled frame time; the world clamps and scales it before use.
        dt: Duration,
    },
    /// Selects the simulation speed multiplier.
    SetSpeed {
        /// Requested multiplier, clamped to `1..=4`.
        multiplier: u8,
    },
    /// Freezes or resumes the tick loop.
    SetPaused {
        /// Whether the simulation should be paused.
        paused: bool,
    },
    /// Records which turret kind the player is about to place.
    SetBuildMode {
        /// Kind selected for placement, or `None` to leave build mode.
        kind: Option<TurretKind>,
    },
    /// Requests construction of a turret on the provided cell.
    BuildTurret {
        /// Archetype to construct.
        kind: TurretKind,
        /// Grid cell that will host the turret.
        cell: CellCoord,
    },
    /// Applies the next upgrade tier to a turret.
    UpgradeTurret {
        /// Turret receiving the upgrade.
        turret: TurretId,
        /// Which of the tier's mod options to apply.
        mod_index: ModIndex,
    },
    /// Sells a turret for a partial refund.
    SellTurret {
        /// Turret to remove.
        turret: TurretId,
    },
    /// Changes the currently selected turret.
    SelectTurret {
        /// Turret to select, or `None` to clear the selection.
        turret: Option<TurretId>,
    },
    /// Sells whichever turret is currently selected.
    SellSelected,
    /// Changes how a turret prioritises enemies.
    SetTargetMode {
        /// Turret whose policy changes.
        turret: TurretId,
        /// New targeting policy.
        mode: TargetMode,
    },
    /// Pays to remove corruption from a tile.
    CleanseTile {
        /// Corrupted cell to cleanse.
        cell: CellCoord,
    },
    /// Pays to unlock a power tile for construction.
    PurchasePowerTile {
        /// Power tile to unlock.
        cell: CellCoord,
    },
    /// Starts the next wave from the building phase or intermission.
    StartWave,
    /// Ends the current intermission early for a reduced reward.
    SkipIntermission,
    /// Activates a player ability.
    UseAbility {
        /// Ability to trigger.
        ability: Ability,
        /// World-space point the ability is aimed at.
        at: Vec2,
    },
    /// Writes the current run into the configured save slot.
    Save,
    /// Replaces the current run with the provided save blob.
    Load {
        /// Encoded save produced by a previous `Save`.
        blob: String,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that simulated time advanced.
    TimeAdvanced {
        /// Scaled simulation seconds applied to the tick.
        dt: f32,
    },
    /// Announces that a new map was generated for the current level.
    MapGenerated {
        /// Seed used for the layout.
        seed: u32,
        /// Environment identifier.
        env_id: u32,
        /// Level the map belongs to.
        level_index: u32,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Number of spawn events queued for the wave.
        spawn_count: usize,
        /// Anomaly modifying the wave, if any.
        anomaly: Option<WaveAnomaly>,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Enemy archetype.
        kind: EnemyKind,
        /// Elite modifier rolled for the enemy.
        elite: Option<EliteTag>,
    },
    /// Reports that a turret fired.
    ShotFired {
        /// Turret that fired.
        turret: TurretId,
        /// Archetype of the turret.
        kind: TurretKind,
    },
    /// Reports that damage landed on an enemy.
    HitLanded {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health removed by the hit.
        amount: f32,
    },
    /// Reports that an enemy's shield was depleted.
    ShieldBroken {
        /// Enemy whose shield collapsed.
        enemy: EnemyId,
    },
    /// Confirms that an enemy died and the reward was paid.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Enemy archetype.
        kind: EnemyKind,
        /// Total gold granted including the combo bonus.
        reward: u32,
        /// Portion of `reward` contributed by the combo multiplier.
        bonus: u32,
        /// Additional gold refunded by a siphon trap.
        siphon_refund: u32,
        /// Combo count after the kill.
        combo: u32,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyLeaked {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Lives removed by the leak.
        lives_lost: u32,
    },
    /// Announces that the active wave was cleared.
    WaveCleared {
        /// Wave that was cleared.
        wave: u32,
        /// Gold granted for clearing the wave.
        bonus: u32,
    },
    /// Announces the start of an intermission countdown.
    IntermissionStarted {
        /// Intermission length in seconds.
        seconds: f32,
    },
    /// Reports the reward granted when intermission ends.
    IntermissionEnded {
        /// Gold granted.
        gold: u32,
        /// Damage buff carried into the next wave.
        buff: f32,
        /// Whether the player skipped the countdown.
        skipped: bool,
    },
    /// Confirms that a turret was built.
    TurretBuilt {
        /// Identifier allocated to the turret.
        turret: TurretId,
        /// Archetype that was built.
        kind: TurretKind,
        /// Cell hosting the turret.
        cell: CellCoord,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that a turret received an upgrade.
    TurretUpgraded {
        /// Upgraded turret.
        turret: TurretId,
        /// Level after the upgrade.
        level: u8,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that a turret was sold.
    TurretSold {
        /// Turret that was removed.
        turret: TurretId,
        /// Gold refunded.
        refund: u32,
    },
    /// Confirms that a corrupted tile was cleansed.
    TileCleansed {
        /// Cell that was cleansed.
        cell: CellCoord,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that a power tile was unlocked.
    PowerTilePurchased {
        /// Cell that was unlocked.
        cell: CellCoord,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that an ability fired.
    AbilityUsed {
        /// Ability that fired.
        ability: Ability,
    },
    /// Reports that a player action was refused; state is unchanged.
    ActionRejected {
        /// Action that was attempted.
        action: ActionKind,
        /// Reason the action was refused.
        reason: RejectReason,
    },
    /// Announces a change of run phase.
    PhaseChanged {
        /// Phase that became active.
        phase: PhaseKind,
    },
    /// Announces that the run moved on to the next level.
    LevelAdvanced {
        /// New level index.
        level_index: u32,
        /// Seed of the regenerated map.
        map_seed: u32,
    },
    /// Confirms that the run was written to the save slot.
    GameSaved,
    /// Reports the outcome of a load request.
    LoadCompleted {
        /// Whether the save was applied.
        success: bool,
    },
}

/// Player abilities available during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Temporarily increases every turret's fire rate.
    Overclock,
    /// Deals true damage and slows enemies around the aimed point.
    Shockwave,
}

impl Ability {
    /// Every ability in display order.
    pub const ALL: [Ability; 2] = [Ability::Overclock, Ability::Shockwave];
}

/// Player actions that can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Turret construction.
    Build,
    /// Turret upgrade.
    Upgrade,
    /// Turret sale.
    Sell,
    /// Target mode change.
    Retarget,
    /// Tile cleansing.
    Cleanse,
    /// Power tile purchase.
    PurchasePower,
    /// Wave start.
    StartWave,
    /// Intermission skip.
    Skip,
    /// Ability activation.
    Ability,
}

/// Reasons a player action may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum RejectReason {
    /// The player cannot afford the action.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Gold required.
        required: u32,
        /// Gold available.
        available: u32,
    },
    /// The action does not apply to the addressed object.
    #[error("not applicable")]
    NotApplicable,
    /// The simulation is paused.
    #[error("the simulation is paused")]
    Paused,
    /// The run is over.
    #[error("the run has ended")]
    RunOver,
    /// The action is not allowed in the current phase.
    #[error("not available in the current phase")]
    InvalidPhase,
    /// The cell cannot host a turret.
    #[error("cannot build here: {0}")]
    Placement(PlacementError),
    /// The turret does not exist.
    #[error("unknown turret")]
    UnknownTurret,
    /// The upgrade cannot be applied.
    #[error("upgrade refused: {0}")]
    Upgrade(UpgradeError),
    /// The ability is recharging.
    #[error("ability on cooldown")]
    OnCooldown,
}

/// Reasons a turret placement may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The cell lies outside the grid.
    #[error("out of bounds")]
    OutOfBounds,
    /// The cell is covered by the track.
    #[error("the track runs through this cell")]
    Track,
    /// The cell is covered by a pool.
    #[error("a pool covers this cell")]
    Pool,
    /// The cell is corrupted and must be cleansed first.
    #[error("the cell is corrupted")]
    Corrupted,
    /// The cell is a power tile that has not been purchased.
    #[error("the power tile is locked")]
    PowerLocked,
    /// Another turret already occupies the cell.
    #[error("the cell is occupied")]
    Occupied,
}

/// Coarse classification of the run phase, broadcast in [`Event::PhaseChanged`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    /// Before the first wave of a level.
    Building,
    /// A wave is spawning or enemies remain alive.
    WaveActive,
    /// Countdown between waves.
    Intermission,
    /// Scripted sequence after the level boss dies.
    BossCinematic,
    /// Fade between levels.
    LevelTransition,
    /// Lives reached zero.
    Defeat,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurretId(u32);

impl TurretId {
    /// Creates a new turret identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the turret identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Chebyshev distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }

    /// World-space centre of the cell for the provided cell size.
    #[must_use]
    pub fn center(self, cell_size: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * cell_size,
            (self.row as f32 + 0.5) * cell_size,
        )
    }

    /// Cell containing the provided world-space point, if it is not negative.
    #[must_use]
    pub fn containing(point: Vec2, cell_size: f32) -> Option<Self> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 || cell_size <= 0.0 {
            return None;
        }
        Some(Self::new(
            (point.x / cell_size) as u32,
            (point.y / cell_size) as u32,
        ))
    }
}
