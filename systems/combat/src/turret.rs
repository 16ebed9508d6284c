//! Placed turrets and the archetype-specific state they carry.

use echo_defence_core::{
    config::{POWER_TILE_DAMAGE, POWER_TILE_RANGE, SELL_REFUND_FRACTION},
    turrets::MAX_LEVEL,
    CellCoord, EnemyId, ModIndex, StatKey, TargetMode, TurretId, TurretKind, TurretStats,
    UpgradeError,
};
use glam::Vec2;

use crate::fault::{ensure_finite, CombatFault};

/// Archetype-specific runtime state.
#[derive(Clone, Debug, PartialEq)]
pub enum TurretState {
    /// Bolt, needle, venom, and mortar turrets need nothing beyond the cooldown.
    Basic,
    /// Counts shots towards net bursts.
    Arc {
        /// Shots fired.
        shots: u32,
    },
    /// Counts shots towards freeze pulses.
    Frost {
        /// Shots fired.
        shots: u32,
    },
    /// Sticky beam with ramping damage.
    Beam {
        /// Enemy currently held by the beam.
        target: Option<EnemyId>,
        /// Accumulated ramp bonus.
        ramp: f32,
    },
    /// One cooldown per drone.
    Hive {
        /// Seconds until each drone fires.
        drones: Vec<f32>,
    },
    /// Reveal pulse countdown.
    Beacon {
        /// Seconds until the next pulse.
        pulse_timer: f32,
    },
    /// Stored trap charges.
    Trap {
        /// Charges ready to deploy.
        charges: u32,
        /// Progress towards the next charge.
        charge_timer: f32,
    },
}

impl TurretState {
    /// State of a freshly built turret.
    #[must_use]
    pub fn for_kind(kind: TurretKind, stats: &TurretStats) -> Self {
        match kind {
            TurretKind::Arc => Self::Arc { shots: 0 },
            TurretKind::Frost => Self::Frost { shots: 0 },
            TurretKind::Beam => Self::Beam {
                target: None,
                ramp: 0.0,
            },
            TurretKind::Hive => Self::Hive {
                drones: vec![0.0; drone_count(stats)],
            },
            TurretKind::Beacon => Self::Beacon {
                pulse_timer: stats.pulse_every,
            },
            TurretKind::Trap => Self::Trap {
                charges: 1.min(charge_capacity(stats)),
                charge_timer: 0.0,
            },
            TurretKind::Bolt | TurretKind::Needle | TurretKind::Venom | TurretKind::Mortar => {
                Self::Basic
            }
        }
    }
}

pub(crate) fn drone_count(stats: &TurretStats) -> usize {
    stats.drone_count.max(0.0).round() as usize
}

pub(crate) fn charge_capacity(stats: &TurretStats) -> u32 {
    stats.max_charges.max(0.0).round() as u32
}

/// A turret standing on the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Turret {
    /// Identifier.
    pub id: TurretId,
    /// Archetype.
    pub kind: TurretKind,
    /// Host cell.
    pub cell: CellCoord,
    /// World position of the cell centre.
    pub position: Vec2,
    /// Upgrade tiers applied.
    pub level: u8,
    /// Mod chosen at each tier, in order.
    pub mods: Vec<ModIndex>,
    /// Statistics after upgrades.
    pub stats: TurretStats,
    /// Targeting policy.
    pub target_mode: TargetMode,
    /// Seconds until the next shot.
    pub cooldown: f32,
    /// Whether the turret stands on a purchased power tile.
    pub boosted: bool,
    /// Gold spent on construction and upgrades.
    pub invested: u32,
    /// Seconds the turret stays jammed.
    pub jam_t: f32,
    /// Archetype state.
    pub state: TurretState,
}

impl Turret {
    /// Builds a level-zero turret on `cell`.
    #[must_use]
    pub fn new(
        id: TurretId,
        kind: TurretKind,
        cell: CellCoord,
        cell_size: f32,
        boosted: bool,
    ) -> Self {
        let stats = kind.base_stats();
        Self {
            id,
            kind,
            cell,
            position: cell.center(cell_size),
            level: 0,
            mods: Vec::new(),
            state: TurretState::for_kind(kind, &stats),
            stats,
            target_mode: TargetMode::default(),
            cooldown: 0.0,
            boosted,
            invested: kind.cost(),
            jam_t: 0.0,
        }
    }

    /// Gold required for the next tier, `None` at max level.
    #[must_use]
    pub fn next_upgrade_cost(&self) -> Option<u32> {
        if self.level >= MAX_LEVEL {
            return None;
        }
        self.kind.upgrade_cost(self.level)
    }

    /// Applies the next tier's mod and returns the new level.
    ///
    /// Gold is not handled here; on error the turret is unchanged.
    pub fn upgrade(&mut self, mod_index: ModIndex) -> Result<u8, UpgradeError> {
        self.stats
            .apply_mod(self.kind, self.level, self.level, mod_index)?;
        self.mods.push(mod_index);
        self.level += 1;
        self.sync_state();
        Ok(self.level)
    }

    /// Rebuilds a turret by replaying its upgrade history one mod at a time.
    pub fn replay(
        id: TurretId,
        kind: TurretKind,
        cell: CellCoord,
        cell_size: f32,
        boosted: bool,
        mods: &[ModIndex],
    ) -> Result<Self, UpgradeError> {
        let mut turret = Self::new(id, kind, cell, cell_size, boosted);
        for mod_index in mods {
            let _ = turret.upgrade(*mod_index)?;
        }
        Ok(turret)
    }

    fn sync_state(&mut self) {
        let drones = drone_count(&self.stats);
        let capacity = charge_capacity(&self.stats);
        match &mut self.state {
            TurretState::Hive { drones: cooldowns } => cooldowns.resize(drones, 0.0),
            TurretState::Trap { charges, .. } => *charges = (*charges).min(capacity),
            TurretState::Beacon { pulse_timer } => {
                *pulse_timer = pulse_timer.min(self.stats.pulse_every);
            }
            _ => {}
        }
    }

    /// Targeting radius including the power tile boost.
    #[must_use]
    pub fn effective_range(&self) -> f32 {
        let boost = if self.boosted { POWER_TILE_RANGE } else { 1.0 };
        self.stats.range * boost
    }

    /// Damage multiplier from the power tile boost.
    #[must_use]
    pub fn damage_boost(&self) -> f32 {
        if self.boosted {
            POWER_TILE_DAMAGE
        } else {
            1.0
        }
    }

    /// Whether the turret may engage flying enemies.
    #[must_use]
    pub fn hits_flying(&self) -> bool {
        self.stats.flag(StatKey::HitsFlying)
    }

    /// Gold returned when the turret is sold.
    #[must_use]
    pub fn sell_refund(&self) -> u32 {
        (self.invested as f32 * SELL_REFUND_FRACTION + 1e-3).floor() as u32
    }

    /// Rejects turrets whose timers have gone non-finite.
    pub fn validate(&self) -> Result<(), CombatFault> {
        ensure_finite("turret", "cooldown", self.cooldown)?;
        ensure_finite("turret", "jam", self.jam_t)?;
        match &self.state {
            TurretState::Beam { ramp, .. } => ensure_finite("turret", "ramp", *ramp),
            TurretState::Hive { drones } => drones
                .iter()
                .try_for_each(|cooldown| ensure_finite("turret", "drone", *cooldown)),
            TurretState::Beacon { pulse_timer } => {
                ensure_finite("turret", "pulse_timer", *pulse_timer)
            }
            TurretState::Trap { charge_timer, .. } => {
                ensure_finite("turret", "charge_timer", *charge_timer)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turret(kind: TurretKind) -> Turret {
        Turret::new(TurretId::new(1), kind, CellCoord::new(2, 3), 40.0, false)
    }

    #[test]
    fn upgrades_are_sequential_and_capped() {
        let mut bolt = turret(TurretKind::Bolt);
        for expected in 1..=MAX_LEVEL {
            assert_eq!(bolt.upgrade(0).expect("tier applies"), expected);
        }
        assert_eq!(bolt.upgrade(0), Err(UpgradeError::MaxLevel));
        assert_eq!(bolt.next_upgrade_cost(), None);
        assert_eq!(bolt.mods.len(), usize::from(MAX_LEVEL));
    }

    #[test]
    fn unknown_mods_leave_the_turret_untouched() {
        let mut bolt = turret(TurretKind::Bolt);
        let before = bolt.clone();
        assert_eq!(
            bolt.upgrade(7),
            Err(UpgradeError::UnknownMod { mod_index: 7 })
        );
        assert_eq!(bolt, before);
    }

    #[test]
    fn replay_matches_incremental_upgrades() {
        let mut incremental = turret(TurretKind::Needle);
        for mod_index in [1, 0, 1] {
            let _ = incremental.upgrade(mod_index).expect("tier applies");
        }
        let replayed = Turret::replay(
            TurretId::new(1),
            TurretKind::Needle,
            CellCoord::new(2, 3),
            40.0,
            false,
            &[1, 0, 1],
        )
        .expect("history replays");
        assert_eq!(replayed.stats, incremental.stats);
        assert_eq!(replayed.level, 3);
    }

    #[test]
    fn hive_grows_drones_with_upgrades() {
        let mut hive = turret(TurretKind::Hive);
        assert!(matches!(&hive.state, TurretState::Hive { drones } if drones.len() == 2));
        let _ = hive.upgrade(0).expect("tier applies");
        assert!(matches!(&hive.state, TurretState::Hive { drones } if drones.len() == 3));
    }

    #[test]
    fn power_tiles_boost_range_and_damage() {
        let mut bolt = turret(TurretKind::Bolt);
        let range = bolt.effective_range();
        bolt.boosted = true;
        assert!((bolt.effective_range() - range * POWER_TILE_RANGE).abs() < 1e-4);
        assert_eq!(bolt.damage_boost(), POWER_TILE_DAMAGE);
    }

    #[test]
    fn refunds_are_a_fraction_of_investment() {
        let mut bolt = turret(TurretKind::Bolt);
        bolt.invested = 100;
        assert_eq!(bolt.sell_refund(), 70);
    }
}
