//! Scripted player that keeps a headless run moving.

use echo_defence_core::{Ability, CellCoord, Command, PhaseKind, TurretKind};
use echo_defence_world::{query, World};
use serde::Deserialize;

/// Tunables for the scripted player, read from the `[autoplay]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AutoplayConfig {
    /// Turret kinds built in rotation.
    pub(crate) roster: Vec<TurretKind>,
    /// Upper bound on deployed turrets; gold beyond it goes to upgrades.
    pub(crate) max_turrets: usize,
    /// Gold kept back during building before the next wave is called.
    pub(crate) reserve: u32,
    /// Whether overclock and shockwave are fired when enemies bunch up.
    pub(crate) use_abilities: bool,
    /// Living enemies required before an ability is spent.
    pub(crate) ability_crowd: usize,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            roster: vec![
                TurretKind::Bolt,
                TurretKind::Venom,
                TurretKind::Frost,
                TurretKind::Arc,
                TurretKind::Needle,
                TurretKind::Mortar,
            ],
            max_turrets: 10,
            reserve: 0,
            use_abilities: true,
            ability_crowd: 6,
        }
    }
}

/// Picks at most one action per call from the observable world state.
#[derive(Debug)]
pub(crate) struct Autoplayer {
    config: AutoplayConfig,
    next_kind: usize,
    next_mod: u8,
}

impl Autoplayer {
    pub(crate) fn new(config: AutoplayConfig) -> Self {
        Self {
            config,
            next_kind: 0,
            next_mod: 0,
        }
    }

    /// Returns the command the player wants issued before the next tick.
    pub(crate) fn decide(&mut self, world: &World) -> Option<Command> {
        if query::is_paused(world) {
            return None;
        }
        let phase = query::phase(world);
        if !matches!(
            phase,
            PhaseKind::Building | PhaseKind::WaveActive | PhaseKind::Intermission
        ) {
            return None;
        }

        if phase == PhaseKind::WaveActive {
            if let Some(command) = self.ability(world) {
                return Some(command);
            }
        }
        if let Some(command) = self.build(world) {
            return Some(command);
        }
        if let Some(command) = self.upgrade(world) {
            return Some(command);
        }
        (phase == PhaseKind::Building).then_some(Command::StartWave)
    }

    fn build(&mut self, world: &World) -> Option<Command> {
        if query::turrets(world).len() >= self.config.max_turrets || self.config.roster.is_empty() {
            return None;
        }
        let kind = self.config.roster[self.next_kind % self.config.roster.len()];
        if query::gold(world) < kind.cost().saturating_add(self.reserve(world)) {
            return None;
        }
        let cell = closest_to_track(world)?;
        self.next_kind += 1;
        Some(Command::BuildTurret { kind, cell })
    }

    fn upgrade(&mut self, world: &World) -> Option<Command> {
        let gold = query::gold(world).saturating_sub(self.reserve(world));
        let (turret, _) = query::turrets(world)
            .iter()
            .filter_map(|turret| Some((turret.id, turret.next_upgrade_cost()?)))
            .filter(|(_, cost)| *cost <= gold)
            .min_by_key(|(_, cost)| *cost)?;
        let mod_index = self.next_mod;
        self.next_mod ^= 1;
        Some(Command::UpgradeTurret { turret, mod_index })
    }

    fn ability(&self, world: &World) -> Option<Command> {
        if !self.config.use_abilities || query::living_enemies(world) < self.config.ability_crowd {
            return None;
        }
        if query::ability_cooldown(world, Ability::Overclock) <= 0.0 {
            return Some(Command::UseAbility {
                ability: Ability::Overclock,
                at: glam::Vec2::ZERO,
            });
        }
        if query::ability_cooldown(world, Ability::Shockwave) <= 0.0 {
            let leader = query::enemies(world)
                .iter()
                .filter(|enemy| !enemy.handled)
                .max_by(|a, b| a.path_distance.total_cmp(&b.path_distance))?;
            return Some(Command::UseAbility {
                ability: Ability::Shockwave,
                at: leader.position,
            });
        }
        None
    }

    /// Reserve only applies while there is time to spend it.
    fn reserve(&self, world: &World) -> u32 {
        if query::phase(world) == PhaseKind::Building {
            0
        } else {
            self.config.reserve
        }
    }
}

fn closest_to_track(world: &World) -> Option<CellCoord> {
    let layout = query::tile_layout(world);
    query::buildable_cells(world)
        .into_iter()
        .min_by(|a, b| layout.track_distance(*a).total_cmp(&layout.track_distance(*b)))
}
