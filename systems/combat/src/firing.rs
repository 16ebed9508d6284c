//! Per-archetype turret attacks.

use echo_defence_core::{DamageType, EnemyId, PathGraph, StatKey, TurretKind};
use glam::Vec2;
use rand::Rng;

use crate::{
    enemy::{Enemy, HitSource},
    fault::{ensure_finite, CombatFault},
    projectile::{
        cluster_points, lead_target, HitEffects, Payload, Projectile,
        CLUSTER_DAMAGE_FRACTION, CLUSTER_RADIUS_FRACTION, LINGER_RADIUS_FRACTION,
        PROJECTILE_RADIUS, SHELL_PROXIMITY,
    },
    targeting::{acquire_target, find_enemy, nearest_target, TargetQuery},
    turret::{charge_capacity, Turret, TurretState},
    zone::{Zone, ZoneKind},
    CombatEvent,
};

/// Distance an arc may jump between enemies.
pub const ARC_HOP_RADIUS: f32 = 110.0;
/// Damage kept on each arc hop.
pub const ARC_FALLOFF: f32 = 0.72;
/// Radius of an arc net burst.
pub const ARC_NET_RADIUS: f32 = 60.0;
/// Slow applied by an arc net burst.
pub const ARC_NET_SLOW: f32 = 0.5;
/// Duration of the net burst slow.
pub const ARC_NET_SECONDS: f32 = 1.2;
/// Damage fraction dealt by a net burst.
pub const ARC_NET_DAMAGE_FRACTION: f32 = 0.5;
/// Slow applied by a frost freeze pulse.
pub const FREEZE_SLOW: f32 = 0.8;
/// Duration of a freeze pulse.
pub const FREEZE_SECONDS: f32 = 1.0;
/// Radius around the beam target searched for a split target.
pub const BEAM_SPLIT_RADIUS: f32 = 90.0;
/// Reveal granted by a beacon pulse.
pub const BEACON_REVEAL_SECONDS: f32 = 2.0;
/// Distance of hive drones from their turret.
pub const DRONE_ORBIT: f32 = 14.0;
/// Extra lifetime of projectiles beyond their nominal flight.
pub const PROJECTILE_SLACK: f32 = 1.5;
/// Damage fraction of splash around a direct hit.
pub const SPLASH_DAMAGE_FRACTION: f32 = 0.5;

/// Multipliers applied to one turret's attacks this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FireScale {
    pub(crate) damage: f32,
    pub(crate) rate: f32,
}

/// Mutable view of everything a turret may touch while firing.
pub(crate) struct Arena<'a, R: Rng + ?Sized> {
    pub(crate) enemies: &'a mut [Enemy],
    pub(crate) projectiles: &'a mut Vec<Projectile>,
    pub(crate) zones: &'a mut Vec<Zone>,
    pub(crate) path: &'a PathGraph,
    pub(crate) rng: &'a mut R,
    pub(crate) out: &'a mut Vec<CombatEvent>,
    pub(crate) picked: &'a mut Vec<EnemyId>,
}

impl<R: Rng + ?Sized> Arena<'_, R> {
    /// Applies a discrete hit and announces it.
    pub(crate) fn strike(
        &mut self,
        index: usize,
        amount: f32,
        damage_type: DamageType,
        source: HitSource,
        effects: Option<&HitEffects>,
    ) {
        let enemy = &mut self.enemies[index];
        if !enemy.is_alive() {
            return;
        }
        let outcome = enemy.take_damage(amount, damage_type, Some(source));
        if outcome.hp_lost > 0.0 {
            self.out.push(CombatEvent::Hit {
                enemy: enemy.id,
                amount: outcome.hp_lost,
            });
        }
        if outcome.shield_broken {
            self.out.push(CombatEvent::ShieldBroken { enemy: enemy.id });
        }
        if let Some(effects) = effects {
            effects.apply(enemy, self.rng);
        }
    }

    /// Applies continuous damage without announcing a hit.
    pub(crate) fn burn(
        &mut self,
        index: usize,
        amount: f32,
        damage_type: DamageType,
        source: HitSource,
    ) {
        let enemy = &mut self.enemies[index];
        let outcome = enemy.take_damage(amount, damage_type, Some(source));
        if outcome.shield_broken {
            self.out.push(CombatEvent::ShieldBroken { enemy: enemy.id });
        }
    }

    fn within(&self, centre: Vec2, radius: f32, hits_flying: bool) -> Vec<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| {
                enemy.is_alive()
                    && (hits_flying || !enemy.flying)
                    && enemy.position.distance(centre) <= radius + enemy.radius
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Strikes every enemy inside a blast.
    pub(crate) fn blast(
        &mut self,
        centre: Vec2,
        radius: f32,
        damage: f32,
        damage_type: DamageType,
        source: HitSource,
        effects: Option<&HitEffects>,
    ) {
        for index in self.within(centre, radius, false) {
            self.strike(index, damage, damage_type, source, effects);
        }
    }
}

/// Advances one turret, firing when ready, and validates the result.
pub(crate) fn update_turret<R: Rng + ?Sized>(
    turret: &mut Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    dt: f32,
) -> Result<(), CombatFault> {
    advance_turret(turret, arena, scale, dt);
    turret.validate()
}

fn advance_turret<R: Rng + ?Sized>(
    turret: &mut Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    dt: f32,
) {
    if turret.jam_t > 0.0 {
        turret.jam_t = (turret.jam_t - dt).max(0.0);
        return;
    }
    turret.cooldown = (turret.cooldown - dt * scale.rate).max(0.0);
    let scale = FireScale {
        damage: scale.damage * turret.damage_boost(),
        rate: scale.rate,
    };

    match turret.kind {
        TurretKind::Beam => fire_beam(turret, arena, scale, dt),
        TurretKind::Beacon => pulse_beacon(turret, arena, scale, dt),
        TurretKind::Hive => launch_drones(turret, arena, scale, dt),
        TurretKind::Trap => deploy_trap(turret, arena, scale, dt),
        TurretKind::Bolt
        | TurretKind::Needle
        | TurretKind::Venom
        | TurretKind::Arc
        | TurretKind::Frost
        | TurretKind::Mortar => {
            if turret.cooldown > 0.0 {
                return;
            }
            let query = TargetQuery::new(
                turret.position,
                turret.effective_range(),
                turret.target_mode,
                turret.hits_flying(),
            );
            let Some(target) = acquire_target(arena.enemies, &query) else {
                return;
            };
            match turret.kind {
                TurretKind::Needle => fire_needle(turret, arena, scale, target),
                TurretKind::Arc => fire_arc(turret, arena, scale, target),
                TurretKind::Frost => fire_frost(turret, arena, scale, target),
                TurretKind::Mortar => fire_mortar(turret, arena, scale, target),
                _ => fire_bolt(turret, arena, scale, target),
            }
            turret.cooldown = turret.stats.fire_interval;
            arena.out.push(CombatEvent::Shot {
                turret: turret.id,
                kind: turret.kind,
            });
        }
    }
}

fn launch<R: Rng + ?Sized>(
    turret: &Turret,
    arena: &mut Arena<'_, R>,
    origin: Vec2,
    target: usize,
    damage: f32,
    payload: Payload,
    effects: HitEffects,
) {
    let speed = turret.stats.projectile_speed.max(1.0);
    let enemy = &arena.enemies[target];
    let aim = lead_target(origin, enemy.position, enemy.velocity(arena.path), speed);
    let heading = (aim - origin).normalize_or_zero();
    let travel = origin.distance(aim);
    let ttl = match payload {
        Payload::Shell { .. } => travel / speed,
        Payload::Direct { .. } => {
            (turret.effective_range() + PROJECTILE_RADIUS) / speed * PROJECTILE_SLACK
        }
    };
    arena.projectiles.push(Projectile {
        owner: turret.id,
        position: origin,
        velocity: heading * speed,
        damage,
        damage_type: turret.stats.damage_type,
        hits_flying: turret.hits_flying(),
        ttl,
        effects,
        payload: match payload {
            Payload::Shell {
                blast,
                cluster,
                linger_dps,
                linger_duration,
                ..
            } => Payload::Shell {
                aim,
                blast,
                cluster,
                linger_dps,
                linger_duration,
            },
            direct => direct,
        },
        struck: Vec::new(),
        spent: false,
    });
}

fn fire_bolt<R: Rng + ?Sized>(
    turret: &Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    target: usize,
) {
    let stats = &turret.stats;
    let payload = Payload::Direct {
        pierce: stats.pierce.max(0.0).round() as u32,
        splash: stats.blast,
    };
    let effects = HitEffects::from_stats(stats, scale.damage);
    launch(
        turret,
        arena,
        turret.position,
        target,
        stats.damage * scale.damage,
        payload,
        effects,
    );
}

fn fire_needle<R: Rng + ?Sized>(
    turret: &Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    target: usize,
) {
    let stats = &turret.stats;
    let effects = HitEffects::from_stats(stats, scale.damage);
    let source = HitSource::Turret(turret.id);
    let damage = stats.damage * scale.damage;
    arena.strike(target, damage, stats.damage_type, source, Some(&effects));

    arena.picked.clear();
    arena.picked.push(arena.enemies[target].id);
    let extra = stats.pierce.max(0.0).round() as usize;
    for _ in 0..extra {
        let query = TargetQuery::new(
            turret.position,
            turret.effective_range(),
            turret.target_mode,
            turret.hits_flying(),
        );
        let excluded = arena.picked.clone();
        let Some(next) = acquire_target(arena.enemies, &query.excluding(&excluded)) else {
            break;
        };
        arena.picked.push(arena.enemies[next].id);
        arena.strike(next, damage, stats.damage_type, source, Some(&effects));
    }
}

fn fire_arc<R: Rng + ?Sized>(
    turret: &mut Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    target: usize,
) {
    let stats = turret.stats;
    let source = HitSource::Turret(turret.id);
    let hits_flying = turret.hits_flying();
    let primary = arena.enemies[target].position;
    let mut damage = stats.damage * scale.damage;
    arena.strike(target, damage, stats.damage_type, source, None);

    arena.picked.clear();
    arena.picked.push(arena.enemies[target].id);
    let mut from = primary;
    for _ in 0..stats.chain.max(0.0).round() as u32 {
        damage *= ARC_FALLOFF;
        let query = TargetQuery::new(from, ARC_HOP_RADIUS, turret.target_mode, hits_flying);
        let excluded = arena.picked.clone();
        let Some(next) = nearest_target(arena.enemies, &query.excluding(&excluded)) else {
            break;
        };
        arena.picked.push(arena.enemies[next].id);
        from = arena.enemies[next].position;
        arena.strike(next, damage, stats.damage_type, source, None);
    }

    if let TurretState::Arc { shots } = &mut turret.state {
        *shots += 1;
        let period = stats.net_every.round() as u32;
        if period > 0 && *shots % period == 0 {
            let net = HitEffects {
                slow: ARC_NET_SLOW,
                slow_duration: ARC_NET_SECONDS,
                ..HitEffects::default()
            };
            for index in arena.within(primary, ARC_NET_RADIUS, hits_flying) {
                arena.strike(
                    index,
                    stats.damage * scale.damage * ARC_NET_DAMAGE_FRACTION,
                    stats.damage_type,
                    source,
                    Some(&net),
                );
            }
        }
    }
}

fn fire_frost<R: Rng + ?Sized>(
    turret: &mut Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    target: usize,
) {
    let stats = turret.stats;
    let source = HitSource::Turret(turret.id);
    let effects = HitEffects::from_stats(&stats, scale.damage);
    let range = turret.effective_range();
    let aim = (arena.enemies[target].position - turret.position).normalize_or_zero();
    let half_cone = (stats.cone * 0.5).to_radians().cos();

    let query = TargetQuery::new(turret.position, range, turret.target_mode, turret.hits_flying());
    let struck: Vec<usize> = (0..arena.enemies.len())
        .filter(|&index| {
            let enemy = &arena.enemies[index];
            query.admits(enemy)
                && (index == target
                    || (enemy.position - turret.position)
                        .normalize_or_zero()
                        .dot(aim)
                        >= half_cone)
        })
        .collect();
    for index in struck {
        arena.strike(
            index,
            stats.damage * scale.damage,
            stats.damage_type,
            source,
            Some(&effects),
        );
    }

    if let TurretState::Frost { shots } = &mut turret.state {
        *shots += 1;
        let period = stats.freeze_every.round() as u32;
        if period > 0 && *shots % period == 0 {
            for index in arena.within(turret.position, range, turret.hits_flying()) {
                arena.enemies[index].apply_slow(FREEZE_SLOW, FREEZE_SECONDS);
            }
        }
    }
}

fn fire_mortar<R: Rng + ?Sized>(
    turret: &Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    target: usize,
) {
    let stats = &turret.stats;
    let payload = Payload::Shell {
        aim: Vec2::ZERO,
        blast: stats.blast,
        cluster: stats.cluster_count.max(0.0).round() as u32,
        linger_dps: stats.linger_dps * scale.damage,
        linger_duration: stats.linger_duration,
    };
    launch(
        turret,
        arena,
        turret.position,
        target,
        stats.damage * scale.damage,
        payload,
        HitEffects::from_stats(stats, scale.damage),
    );
}

fn fire_beam<R: Rng + ?Sized>(
    turret: &mut Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    dt: f32,
) {
    let stats = turret.stats;
    let (id, kind, mode) = (turret.id, turret.kind, turret.target_mode);
    let hits_flying = turret.hits_flying();
    let source = HitSource::Turret(id);
    let query = TargetQuery::new(turret.position, turret.effective_range(), mode, hits_flying);
    let position = turret.position;
    let TurretState::Beam { target, ramp } = &mut turret.state else {
        return;
    };

    let held = target
        .and_then(|held| find_enemy(arena.enemies, held))
        .filter(|&index| query.admits(&arena.enemies[index]));
    let index = match held {
        Some(index) => index,
        None => {
            *ramp = 0.0;
            let Some(index) = acquire_target(arena.enemies, &query) else {
                *target = None;
                return;
            };
            *target = Some(arena.enemies[index].id);
            arena.out.push(CombatEvent::Shot { turret: id, kind });
            index
        }
    };

    *ramp = (*ramp + stats.ramp_rate * dt).min(stats.ramp_max);
    let dps = stats.damage * scale.damage * scale.rate * (1.0 + *ramp);
    arena.burn(index, dps * dt, stats.damage_type, source);

    if stats.split_fraction > 0.0 {
        let excluded = [arena.enemies[index].id];
        let split = TargetQuery::new(
            arena.enemies[index].position,
            BEAM_SPLIT_RADIUS,
            mode,
            hits_flying,
        );
        if let Some(second) = nearest_target(arena.enemies, &split.excluding(&excluded)) {
            arena.burn(second, dps * dt * stats.split_fraction, stats.damage_type, source);
        }
    }

    if stats.chip_dps > 0.0 && stats.chip_radius > 0.0 {
        let chip = stats.chip_dps * scale.damage * dt;
        for index in arena.within(position, stats.chip_radius, hits_flying) {
            arena.burn(index, chip, stats.damage_type, source);
        }
    }
}

fn pulse_beacon<R: Rng + ?Sized>(
    turret: &mut Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    dt: f32,
) {
    let stats = turret.stats;
    if stats.pulse_every <= 0.0 {
        return;
    }
    let range = turret.effective_range();
    let TurretState::Beacon { pulse_timer } = &mut turret.state else {
        return;
    };
    *pulse_timer -= dt * scale.rate;
    if *pulse_timer > 0.0 {
        return;
    }
    *pulse_timer = stats.pulse_every;

    let source = HitSource::Turret(turret.id);
    for index in arena.within(turret.position, range, true) {
        arena.enemies[index].reveal(BEACON_REVEAL_SECONDS);
        if stats.damage > 0.0 {
            arena.strike(index, stats.damage * scale.damage, DamageType::True, source, None);
        }
    }
    arena.out.push(CombatEvent::Shot {
        turret: turret.id,
        kind: turret.kind,
    });
}

fn launch_drones<R: Rng + ?Sized>(
    turret: &mut Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    dt: f32,
) {
    let stats = turret.stats;
    let effects = HitEffects::from_stats(&stats, scale.damage);
    let range = turret.effective_range();
    let hits_flying = turret.hits_flying();
    let TurretState::Hive { drones } = &mut turret.state else {
        return;
    };
    let count = drones.len();
    arena.picked.clear();

    let mut launches = Vec::new();
    for (slot, cooldown) in drones.iter_mut().enumerate() {
        *cooldown = (*cooldown - dt * scale.rate).max(0.0);
        if *cooldown > 0.0 {
            continue;
        }
        let query = TargetQuery::new(turret.position, range, turret.target_mode, hits_flying);
        let excluded = arena.picked.clone();
        let Some(target) = acquire_target(arena.enemies, &query.excluding(&excluded))
            .or_else(|| acquire_target(arena.enemies, &query))
        else {
            continue;
        };
        arena.picked.push(arena.enemies[target].id);
        *cooldown = stats.fire_interval;
        let angle = std::f32::consts::TAU * slot as f32 / count.max(1) as f32;
        launches.push((turret.position + Vec2::from_angle(angle) * DRONE_ORBIT, target));
    }

    for (origin, target) in launches {
        launch(
            turret,
            arena,
            origin,
            target,
            stats.damage * scale.damage,
            Payload::Direct {
                pierce: 0,
                splash: 0.0,
            },
            effects,
        );
        arena.out.push(CombatEvent::Shot {
            turret: turret.id,
            kind: turret.kind,
        });
    }
}

fn deploy_trap<R: Rng + ?Sized>(
    turret: &mut Turret,
    arena: &mut Arena<'_, R>,
    scale: FireScale,
    dt: f32,
) {
    let stats = turret.stats;
    let capacity = charge_capacity(&stats);
    let query = TargetQuery::new(
        turret.position,
        turret.effective_range(),
        turret.target_mode,
        false,
    );
    let ready = turret.cooldown <= 0.0;
    let TurretState::Trap {
        charges,
        charge_timer,
    } = &mut turret.state
    else {
        return;
    };

    if *charges < capacity {
        *charge_timer += dt * scale.rate;
        if *charge_timer >= stats.charge_interval.max(0.1) {
            *charges += 1;
            *charge_timer = 0.0;
        }
    } else {
        *charge_timer = 0.0;
    }

    if !ready || *charges == 0 {
        return;
    }
    let Some(target) = acquire_target(arena.enemies, &query) else {
        return;
    };
    *charges -= 1;
    arena.zones.push(Zone {
        kind: ZoneKind::Trap,
        owner: turret.id,
        position: arena.enemies[target].position,
        radius: stats.blast,
        dps: stats.damage * scale.damage,
        slow: stats.slow_pct,
        dot: stats.dot_dps * scale.damage,
        remaining: stats.zone_duration,
        siphon: stats.flag(StatKey::Siphon),
        no_split: stats.flag(StatKey::NoSplit),
    });
    turret.cooldown = stats.fire_interval;
    arena.out.push(CombatEvent::Shot {
        turret: turret.id,
        kind: turret.kind,
    });
}

/// Moves a projectile and resolves contact, validating the result.
pub(crate) fn fly<R: Rng + ?Sized>(
    projectile: &mut Projectile,
    arena: &mut Arena<'_, R>,
    dt: f32,
) -> Result<(), CombatFault> {
    let from = projectile.position;
    projectile.position += projectile.velocity * dt;
    projectile.ttl -= dt;
    ensure_finite("projectile", "position", projectile.position.x + projectile.position.y)?;
    ensure_finite("projectile", "ttl", projectile.ttl)?;

    match projectile.payload {
        Payload::Direct { pierce, splash } => {
            strike_direct(projectile, arena, from, pierce, splash);
            if projectile.ttl <= 0.0 {
                projectile.spent = true;
            }
        }
        Payload::Shell { .. } => {
            let arrived = projectile.ttl <= 0.0;
            let touching = arena.enemies.iter().any(|enemy| {
                enemy.is_alive()
                    && !enemy.flying
                    && enemy.position.distance(projectile.position)
                        <= SHELL_PROXIMITY + enemy.radius
            });
            if arrived || touching {
                detonate(projectile, arena);
            }
        }
    }
    Ok(())
}

fn strike_direct<R: Rng + ?Sized>(
    projectile: &mut Projectile,
    arena: &mut Arena<'_, R>,
    from: Vec2,
    pierce: u32,
    splash: f32,
) {
    let source = HitSource::Turret(projectile.owner);
    for index in 0..arena.enemies.len() {
        if projectile.spent {
            break;
        }
        if !projectile.sweeps(from, &arena.enemies[index]) {
            continue;
        }
        let centre = arena.enemies[index].position;
        projectile.struck.push(arena.enemies[index].id);
        arena.strike(
            index,
            projectile.damage,
            projectile.damage_type,
            source,
            Some(&projectile.effects),
        );
        if splash > 0.0 {
            for other in arena.within(centre, splash, projectile.hits_flying) {
                if other != index {
                    arena.strike(
                        other,
                        projectile.damage * SPLASH_DAMAGE_FRACTION,
                        projectile.damage_type,
                        source,
                        Some(&projectile.effects),
                    );
                }
            }
        }
        if projectile.struck.len() > pierce as usize {
            projectile.spent = true;
        }
    }
}

fn detonate<R: Rng + ?Sized>(projectile: &mut Projectile, arena: &mut Arena<'_, R>) {
    projectile.spent = true;
    let Payload::Shell {
        blast,
        cluster,
        linger_dps,
        linger_duration,
        ..
    } = projectile.payload
    else {
        return;
    };
    let source = HitSource::Turret(projectile.owner);
    let centre = projectile.position;
    arena.blast(
        centre,
        blast,
        projectile.damage,
        projectile.damage_type,
        source,
        Some(&projectile.effects),
    );
    for point in cluster_points(centre, blast, cluster) {
        arena.blast(
            point,
            blast * CLUSTER_RADIUS_FRACTION,
            projectile.damage * CLUSTER_DAMAGE_FRACTION,
            projectile.damage_type,
            source,
            None,
        );
    }
    if linger_dps > 0.0 && linger_duration > 0.0 {
        arena.zones.push(Zone {
            kind: ZoneKind::Lingering,
            owner: projectile.owner,
            position: centre,
            radius: blast * LINGER_RADIUS_FRACTION,
            dps: linger_dps,
            slow: 0.0,
            dot: 0.0,
            remaining: linger_duration,
            siphon: false,
            no_split: false,
        });
    }
}
