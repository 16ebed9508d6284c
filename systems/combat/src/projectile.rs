//! Projectiles in flight and the effects they carry.

use echo_defence_core::{DamageType, EnemyId, TurretId, TurretStats};
use glam::Vec2;
use rand::Rng;

use crate::enemy::Enemy;

/// Collision radius of a projectile.
pub const PROJECTILE_RADIUS: f32 = 4.0;
/// Ground enemies closer than this to a shell detonate it early.
pub const SHELL_PROXIMITY: f32 = 14.0;
/// Damage fraction of each cluster bomblet.
pub const CLUSTER_DAMAGE_FRACTION: f32 = 0.35;
/// Radius fraction of each cluster bomblet.
pub const CLUSTER_RADIUS_FRACTION: f32 = 0.5;
/// Distance of bomblets from the blast centre, as a fraction of the blast radius.
pub const CLUSTER_SPREAD_FRACTION: f32 = 0.8;
/// Radius fraction of lingering fire.
pub const LINGER_RADIUS_FRACTION: f32 = 0.8;

/// Status effects applied by a hit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HitEffects {
    /// Slow strength.
    pub slow: f32,
    /// Slow duration.
    pub slow_duration: f32,
    /// Poison damage per second.
    pub dot: f32,
    /// Poison duration.
    pub dot_duration: f32,
    /// Mark amplification.
    pub mark: f32,
    /// Mark duration.
    pub mark_duration: f32,
    /// Chance to stun.
    pub stun_chance: f32,
}

impl HitEffects {
    /// Effects described by turret statistics, poison scaled by `damage_scale`.
    #[must_use]
    pub fn from_stats(stats: &TurretStats, damage_scale: f32) -> Self {
        Self {
            slow: stats.slow_pct,
            slow_duration: stats.slow_duration,
            dot: stats.dot_dps * damage_scale,
            dot_duration: stats.dot_duration,
            mark: stats.mark_pct,
            mark_duration: stats.mark_duration,
            stun_chance: stats.stun_chance,
        }
    }

    /// Applies the effects to a living enemy.
    pub fn apply<R: Rng + ?Sized>(&self, enemy: &mut Enemy, rng: &mut R) {
        if !enemy.is_alive() {
            return;
        }
        enemy.apply_slow(self.slow, self.slow_duration);
        enemy.apply_dot(self.dot, self.dot_duration);
        enemy.apply_mark(self.mark, self.mark_duration);
        if self.stun_chance > 0.0 && rng.gen::<f32>() < self.stun_chance {
            enemy.stun();
        }
    }
}

/// What a projectile does on contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payload {
    /// Strikes enemies it touches.
    Direct {
        /// Additional enemies it may pass through.
        pierce: u32,
        /// Radius of splash damage around each hit; zero disables.
        splash: f32,
    },
    /// Detonates near the aim point.
    Shell {
        /// Point the shell flies towards.
        aim: Vec2,
        /// Blast radius.
        blast: f32,
        /// Bomblets released around the blast.
        cluster: u32,
        /// Lingering fire damage per second.
        linger_dps: f32,
        /// Lingering fire duration.
        linger_duration: f32,
    },
}

/// A projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Turret that fired it.
    pub owner: TurretId,
    /// Current position.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Damage per hit.
    pub damage: f32,
    /// Damage class.
    pub damage_type: DamageType,
    /// Whether it may hit flying enemies.
    pub hits_flying: bool,
    /// Seconds before it expires.
    pub ttl: f32,
    /// Effects applied on hit.
    pub effects: HitEffects,
    /// Contact behaviour.
    pub payload: Payload,
    /// Enemies already struck.
    pub struck: Vec<EnemyId>,
    /// Finished and awaiting removal.
    pub spent: bool,
}

impl Projectile {
    /// Whether the projectile touched `enemy` while moving from `from` to its position.
    #[must_use]
    pub fn sweeps(&self, from: Vec2, enemy: &Enemy) -> bool {
        enemy.is_alive()
            && (self.hits_flying || !enemy.flying)
            && !self.struck.contains(&enemy.id)
            && segment_distance(from, self.position, enemy.position)
                <= enemy.radius + PROJECTILE_RADIUS
    }
}

/// Aim point leading a target moving at `velocity`.
#[must_use]
pub fn lead_target(origin: Vec2, target: Vec2, velocity: Vec2, speed: f32) -> Vec2 {
    if speed <= 0.0 {
        return target;
    }
    let flight = origin.distance(target) / speed;
    target + velocity * flight
}

/// Centres of `count` bomblets evenly spaced around `centre`.
#[must_use]
pub fn cluster_points(centre: Vec2, blast: f32, count: u32) -> Vec<Vec2> {
    (0..count)
        .map(|index| {
            let angle = std::f32::consts::TAU * index as f32 / count as f32;
            centre + Vec2::from_angle(angle) * blast * CLUSTER_SPREAD_FRACTION
        })
        .collect()
}

/// Shortest distance between `point` and the segment `start..end`.
#[must_use]
pub fn segment_distance(start: Vec2, end: Vec2, point: Vec2) -> f32 {
    let span = end - start;
    let length_squared = span.length_squared();
    if length_squared <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(span) / length_squared).clamp(0.0, 1.0);
    point.distance(start + span * t)
}
