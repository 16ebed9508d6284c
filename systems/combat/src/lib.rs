#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat: enemies, turrets, projectiles, zones, and the resolver that steps them.
//!
//! The [`EntityRegistry`] owns every live entity. Each tick the
//! [`CombatResolver`] moves enemies, lets turrets acquire targets and fire,
//! flies projectiles, burns zones, and finally processes deaths. Outcomes are
//! reported as [`CombatEvent`] values; payouts are left to the caller.
//!
//! Every entity update runs against a snapshot and is rolled back when it
//! produces non-finite state, so one broken entity never halts the tick.

pub mod enemy;
pub mod fault;
pub mod firing;
pub mod projectile;
pub mod registry;
pub mod targeting;
pub mod turret;
pub mod zone;

use echo_defence_core::{
    config::{SHOCKWAVE_DAMAGE, SHOCKWAVE_RADIUS},
    DamageType, EliteTag, EnemyId, EnemyKind, PathGraph, SpawnEvent, TurretId, TurretKind,
    WaveScalar,
};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use enemy::{DamageOutcome, Enemy, EnemyBehavior, HitSource, StatusEffects};
pub use fault::{CombatFault, FaultGuard};
pub use projectile::{HitEffects, Payload, Projectile};
pub use registry::EntityRegistry;
pub use targeting::{acquire_target, TargetQuery};
pub use turret::{Turret, TurretState};
pub use zone::{Zone, ZoneKind};

use enemy::{
    AuraBuffs, BehaviorPulse, HERALD_ARMOR_BONUS, HERALD_RADIUS, HERALD_SLOW_RESIST,
    WARDEN_RADIUS, WARDEN_SHIELD_CAP, WARDEN_SHIELD_PULSE,
};
use firing::{fly, update_turret, Arena, FireScale};

/// Slow applied by the shockwave ability.
pub const SHOCKWAVE_SLOW: f32 = 0.5;
/// Duration of the shockwave slow.
pub const SHOCKWAVE_SLOW_SECONDS: f32 = 2.0;
/// Turrets within this distance of a volatile death are jammed.
pub const VOLATILE_RADIUS: f32 = 90.0;
/// Seconds a volatile burst jams a turret.
pub const VOLATILE_JAM_SECONDS: f32 = 1.5;

/// Outcomes of a combat step.
#[derive(Clone, Debug, PartialEq)]
pub enum CombatEvent {
    /// An enemy entered the field.
    Spawned {
        /// Identifier of the new enemy.
        enemy: EnemyId,
        /// Archetype.
        kind: EnemyKind,
        /// Elite modifier.
        elite: Option<EliteTag>,
    },
    /// A turret fired or started a beam.
    Shot {
        /// Turret that fired.
        turret: TurretId,
        /// Archetype.
        kind: TurretKind,
    },
    /// A discrete hit removed health.
    Hit {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health removed.
        amount: f32,
    },
    /// An enemy's shield collapsed.
    ShieldBroken {
        /// Enemy whose shield broke.
        enemy: EnemyId,
    },
    /// An enemy died; the reward is still to be paid.
    Killed {
        /// Enemy that died.
        enemy: EnemyId,
        /// Archetype.
        kind: EnemyKind,
        /// Base reward before combo scaling.
        reward: u32,
        /// Whether the killing hit came from a siphon trap.
        siphoned: bool,
        /// Whether the enemy closed its wave.
        is_miniboss: bool,
    },
    /// An enemy reached the goal.
    Leaked {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Archetype.
        kind: EnemyKind,
        /// Lives it costs.
        lives: u32,
    },
}

/// Run-wide multipliers applied to every turret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatModifiers {
    /// Damage multiplier, e.g. from the intermission skip buff.
    pub damage: f32,
    /// Fire-rate multiplier, e.g. from Overclock.
    pub fire_rate: f32,
}

impl Default for CombatModifiers {
    fn default() -> Self {
        Self {
            damage: 1.0,
            fire_rate: 1.0,
        }
    }
}

/// Steps the entities held by an [`EntityRegistry`].
#[derive(Clone, Debug)]
pub struct CombatResolver {
    rng: ChaCha8Rng,
    guard: FaultGuard,
    picked: Vec<EnemyId>,
}

impl CombatResolver {
    /// Creates a resolver whose stun rolls derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            guard: FaultGuard::new(),
            picked: Vec::new(),
        }
    }

    /// Fault reporter used by the resolver.
    #[must_use]
    pub fn faults(&self) -> &FaultGuard {
        &self.guard
    }

    /// Admits scheduled spawns at the start of the path.
    pub fn admit(
        &mut self,
        registry: &mut EntityRegistry,
        spawns: &[SpawnEvent],
        path: &PathGraph,
        out: &mut Vec<CombatEvent>,
    ) {
        for spawn in spawns {
            let enemy = registry.spawn(spawn, path);
            out.push(CombatEvent::Spawned {
                enemy,
                kind: spawn.kind,
                elite: spawn.elite,
            });
        }
    }

    /// Advances combat by `dt` seconds.
    pub fn step(
        &mut self,
        registry: &mut EntityRegistry,
        path: &PathGraph,
        modifiers: CombatModifiers,
        dt: f32,
        out: &mut Vec<CombatEvent>,
    ) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.guard.advance(dt);
        registry.sweep();

        self.update_enemies(registry, path, dt, out);
        project_auras(registry);
        self.update_turrets(registry, path, modifiers, dt, out);
        self.update_projectiles(registry, path, dt, out);
        self.update_zones(registry, dt, out);
        self.resolve_deaths(registry, path, out);
    }

    /// Deals shockwave damage around `at` and returns how many enemies were hit.
    pub fn shockwave(
        &mut self,
        registry: &mut EntityRegistry,
        path: &PathGraph,
        at: Vec2,
        out: &mut Vec<CombatEvent>,
    ) -> usize {
        let mut hit = 0;
        for enemy in registry
            .enemies
            .iter_mut()
            .filter(|enemy| enemy.is_alive())
            .filter(|enemy| enemy.position.distance(at) <= SHOCKWAVE_RADIUS + enemy.radius)
        {
            let outcome =
                enemy.take_damage(SHOCKWAVE_DAMAGE, DamageType::True, Some(HitSource::Ability));
            out.push(CombatEvent::Hit {
                enemy: enemy.id,
                amount: outcome.hp_lost,
            });
            enemy.apply_slow(SHOCKWAVE_SLOW, SHOCKWAVE_SLOW_SECONDS);
            hit += 1;
        }
        self.resolve_deaths(registry, path, out);
        hit
    }

    fn update_enemies(
        &mut self,
        registry: &mut EntityRegistry,
        path: &PathGraph,
        dt: f32,
        out: &mut Vec<CombatEvent>,
    ) {
        let mut pulses = Vec::new();
        for enemy in registry.enemies.iter_mut().filter(|enemy| !enemy.handled) {
            let snapshot = enemy.clone();
            match enemy.advance(dt, path) {
                Ok(step) => {
                    if step.leaked && enemy.hp > 0.0 {
                        enemy.handled = true;
                        out.push(CombatEvent::Leaked {
                            enemy: enemy.id,
                            kind: enemy.kind,
                            lives: enemy.lives_cost,
                        });
                    }
                    if let Some(pulse) = step.pulse {
                        pulses.push((pulse, enemy.scalar));
                    }
                }
                Err(fault) => {
                    *enemy = snapshot;
                    let _ = self.guard.report("enemy", &fault);
                }
            }
        }

        for (pulse, scalar) in pulses {
            match pulse {
                BehaviorPulse::ShieldAllies(centre) => {
                    for ally in registry.enemies.iter_mut().filter(|ally| {
                        ally.is_alive() && ally.position.distance(centre) <= WARDEN_RADIUS
                    }) {
                        let cap = ally.max_shield.max(WARDEN_SHIELD_CAP);
                        ally.shield = (ally.shield + WARDEN_SHIELD_PULSE).min(cap);
                    }
                }
                BehaviorPulse::Brood { distance, count } => {
                    spawn_children(registry, scalar, distance, count, path, out);
                }
            }
        }
    }

    fn update_turrets(
        &mut self,
        registry: &mut EntityRegistry,
        path: &PathGraph,
        modifiers: CombatModifiers,
        dt: f32,
        out: &mut Vec<CombatEvent>,
    ) {
        let buffs = beacon_buffs(&registry.turrets);
        let EntityRegistry {
            enemies,
            turrets,
            projectiles,
            traps,
            ..
        } = registry;
        for (turret, (damage, rate)) in turrets.iter_mut().zip(buffs) {
            let snapshot = turret.clone();
            let mut arena = Arena {
                enemies: enemies.as_mut_slice(),
                projectiles: &mut *projectiles,
                zones: &mut *traps,
                path,
                rng: &mut self.rng,
                out: &mut *out,
                picked: &mut self.picked,
            };
            let scale = FireScale {
                damage: damage * modifiers.damage,
                rate: rate * modifiers.fire_rate,
            };
            if let Err(fault) = update_turret(turret, &mut arena, scale, dt) {
                *turret = snapshot;
                let _ = self.guard.report("turret", &fault);
            }
        }
    }

    fn update_projectiles(
        &mut self,
        registry: &mut EntityRegistry,
        path: &PathGraph,
        dt: f32,
        out: &mut Vec<CombatEvent>,
    ) {
        let mut flying = std::mem::take(&mut registry.projectiles);
        for projectile in &mut flying {
            let snapshot = projectile.clone();
            let mut arena = Arena {
                enemies: registry.enemies.as_mut_slice(),
                projectiles: &mut registry.projectiles,
                zones: &mut registry.lingering,
                path,
                rng: &mut self.rng,
                out: &mut *out,
                picked: &mut self.picked,
            };
            if let Err(fault) = fly(projectile, &mut arena, dt) {
                *projectile = snapshot;
                let _ = self.guard.report("projectile", &fault);
            }
        }
        flying.retain(|projectile| !projectile.spent);
        flying.append(&mut registry.projectiles);
        registry.projectiles = flying;
    }

    fn update_zones(
        &mut self,
        registry: &mut EntityRegistry,
        dt: f32,
        out: &mut Vec<CombatEvent>,
    ) {
        let EntityRegistry {
            enemies,
            traps,
            lingering,
            ..
        } = registry;
        for zone in traps.iter_mut().chain(lingering.iter_mut()) {
            let snapshot = *zone;
            if let Err(fault) = zone.tick(enemies, dt, out) {
                *zone = snapshot;
                let _ = self.guard.report("zone", &fault);
            }
        }
        traps.retain(|zone| !zone.expired());
        lingering.retain(|zone| !zone.expired());
    }

    fn resolve_deaths(
        &mut self,
        registry: &mut EntityRegistry,
        path: &PathGraph,
        out: &mut Vec<CombatEvent>,
    ) {
        let mut broods = Vec::new();
        let mut bursts = Vec::new();
        for enemy in registry.enemies.iter_mut() {
            if enemy.handled || enemy.hp > 0.0 {
                continue;
            }
            enemy.handled = true;
            enemy.hp = 0.0;
            out.push(CombatEvent::Killed {
                enemy: enemy.id,
                kind: enemy.kind,
                reward: enemy.reward,
                siphoned: matches!(enemy.last_hit, Some(HitSource::Trap { siphon: true, .. })),
                is_miniboss: enemy.is_miniboss,
            });
            let children = enemy.death_children();
            if children > 0 {
                broods.push((enemy.scalar, enemy.path_distance, children));
            }
            if enemy.elite == Some(EliteTag::Volatile) {
                bursts.push(enemy.position);
            }
        }

        for centre in bursts {
            for turret in registry
                .turrets
                .iter_mut()
                .filter(|turret| turret.position.distance(centre) <= VOLATILE_RADIUS)
            {
                turret.jam_t = turret.jam_t.max(VOLATILE_JAM_SECONDS);
            }
        }
        for (scalar, distance, count) in broods {
            spawn_children(registry, scalar, distance, count, path, out);
        }
    }
}

fn spawn_children(
    registry: &mut EntityRegistry,
    scalar: WaveScalar,
    distance: f32,
    count: u32,
    path: &PathGraph,
    out: &mut Vec<CombatEvent>,
) {
    for enemy in registry.spawn_children(scalar, distance, count, path) {
        out.push(CombatEvent::Spawned {
            enemy,
            kind: EnemyKind::Swarmling,
            elite: None,
        });
    }
}

fn project_auras(registry: &mut EntityRegistry) {
    let heralds: Vec<(EnemyId, Vec2)> = registry
        .enemies
        .iter()
        .filter(|enemy| enemy.is_alive() && enemy.behavior == EnemyBehavior::Herald)
        .map(|enemy| (enemy.id, enemy.position))
        .collect();
    for enemy in registry.enemies.iter_mut() {
        let covered = heralds.iter().any(|(herald, position)| {
            *herald != enemy.id && position.distance(enemy.position) <= HERALD_RADIUS
        });
        enemy.aura = if covered {
            AuraBuffs {
                armor: HERALD_ARMOR_BONUS,
                slow_resist: HERALD_SLOW_RESIST,
            }
        } else {
            AuraBuffs::default()
        };
    }
}

fn beacon_buffs(turrets: &[Turret]) -> Vec<(f32, f32)> {
    turrets
        .iter()
        .map(|turret| {
            if turret.kind == TurretKind::Beacon {
                return (1.0, 1.0);
            }
            turrets
                .iter()
                .filter(|beacon| {
                    beacon.kind == TurretKind::Beacon
                        && beacon.position.distance(turret.position) <= beacon.effective_range()
                })
                .fold((1.0, 1.0), |(damage, rate), beacon| {
                    (
                        damage * (1.0 + beacon.stats.aura_damage),
                        rate * (1.0 + beacon.stats.aura_rate),
                    )
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_defence_core::CellCoord;

    fn path() -> PathGraph {
        PathGraph::new(vec![Vec2::new(0.0, 100.0), Vec2::new(2_000.0, 100.0)])
    }

    #[test]
    fn beacons_multiply_nearby_turrets() {
        let mut registry = EntityRegistry::new();
        let _ = registry.add_turret(TurretKind::Bolt, CellCoord::new(2, 2), 40.0, false);
        let _ = registry.add_turret(TurretKind::Beacon, CellCoord::new(3, 2), 40.0, false);
        let _ = registry.add_turret(TurretKind::Beacon, CellCoord::new(2, 3), 40.0, false);
        let _ = registry.add_turret(TurretKind::Bolt, CellCoord::new(20, 2), 40.0, false);
        let buffs = beacon_buffs(registry.turrets());
        let aura = TurretKind::Beacon.base_stats().aura_damage;
        assert!((buffs[0].0 - (1.0 + aura) * (1.0 + aura)).abs() < 1e-5);
        assert_eq!(buffs[1], (1.0, 1.0));
        assert_eq!(buffs[3], (1.0, 1.0));
    }

    #[test]
    fn heralds_harden_their_neighbours_but_not_themselves() {
        let mut registry = EntityRegistry::new();
        let mut resolver = CombatResolver::new(1);
        let mut out = Vec::new();
        let spawns = [EnemyKind::Herald, EnemyKind::Grunt].map(|kind| SpawnEvent {
            time: 0.0,
            kind,
            scalar: WaveScalar::IDENTITY,
            elite: None,
            is_miniboss: false,
        });
        resolver.admit(&mut registry, &spawns, &path(), &mut out);
        project_auras(&mut registry);
        assert_eq!(registry.enemies()[0].aura, AuraBuffs::default());
        assert_eq!(registry.enemies()[1].aura.armor, HERALD_ARMOR_BONUS);
    }

    fn grunt_on_path(registry: &mut EntityRegistry) -> EnemyId {
        let spawn = SpawnEvent {
            time: 0.0,
            kind: EnemyKind::Grunt,
            scalar: WaveScalar::IDENTITY,
            elite: None,
            is_miniboss: false,
        };
        registry.spawn_at(&spawn, &path(), 400.0)
    }

    fn trap_at(position: Vec2, dps: f32) -> Zone {
        Zone {
            kind: ZoneKind::Trap,
            owner: TurretId::new(9),
            position,
            radius: 40.0,
            dps,
            slow: 0.0,
            dot: 0.0,
            remaining: 5.0,
            siphon: false,
            no_split: false,
        }
    }

    #[test]
    fn trap_damage_is_announced_as_hits() {
        let mut registry = EntityRegistry::new();
        let mut resolver = CombatResolver::new(1);
        let id = grunt_on_path(&mut registry);
        let position = registry.enemies()[0].position;
        registry.insert_trap(trap_at(position, 20.0));

        let mut out = Vec::new();
        resolver.step(
            &mut registry,
            &path(),
            CombatModifiers::default(),
            0.1,
            &mut out,
        );
        assert!(out.iter().any(|event| matches!(
            event,
            CombatEvent::Hit { enemy, amount } if *enemy == id && *amount > 0.0
        )));
        assert_eq!(resolver.faults().total(), 0);
    }

    #[test]
    fn broken_zones_are_rolled_back_and_counted() {
        let mut registry = EntityRegistry::new();
        let mut resolver = CombatResolver::new(1);
        let _ = grunt_on_path(&mut registry);
        let position = registry.enemies()[0].position;
        let broken = trap_at(position, f32::INFINITY);
        registry.insert_trap(broken);

        let mut out = Vec::new();
        resolver.step(
            &mut registry,
            &path(),
            CombatModifiers::default(),
            0.1,
            &mut out,
        );
        assert_eq!(registry.traps(), &[broken]);
        assert_eq!(registry.enemies()[0].hp, registry.enemies()[0].max_hp);
        assert!(!out.iter().any(|event| matches!(event, CombatEvent::Hit { .. })));
        assert_eq!(resolver.faults().total(), 1);
    }

    #[test]
    fn broken_projectiles_are_restored_rather_than_dropped() {
        let mut registry = EntityRegistry::new();
        let mut resolver = CombatResolver::new(1);
        let stray = Projectile {
            owner: TurretId::new(3),
            position: Vec2::new(100.0, 600.0),
            velocity: Vec2::new(f32::NAN, 0.0),
            damage: 10.0,
            damage_type: DamageType::Physical,
            hits_flying: false,
            ttl: 2.0,
            effects: HitEffects::default(),
            payload: Payload::Direct {
                pierce: 0,
                splash: 0.0,
            },
            struck: Vec::new(),
            spent: false,
        };
        registry.projectiles.push(stray.clone());

        let mut out = Vec::new();
        resolver.step(
            &mut registry,
            &path(),
            CombatModifiers::default(),
            0.1,
            &mut out,
        );
        assert_eq!(registry.projectiles(), &[stray]);
        assert_eq!(resolver.faults().total(), 1);
    }

    #[test]
    fn invalid_step_lengths_are_ignored() {
        let mut registry = EntityRegistry::new();
        let mut resolver = CombatResolver::new(1);
        let mut out = Vec::new();
        resolver.step(
            &mut registry,
            &path(),
            CombatModifiers::default(),
            f32::NAN,
            &mut out,
        );
        assert!(out.is_empty());
    }
}
