//! Ground zones: deployed traps and lingering mortar fire.

use echo_defence_core::{DamageType, TurretId};
use glam::Vec2;

use crate::{
    enemy::{Enemy, HitSource},
    fault::{ensure_finite, CombatFault},
    CombatEvent,
};

/// Duration of the slow refreshed on enemies standing in a zone.
pub const ZONE_SLOW_SECONDS: f32 = 0.5;
/// Duration of the poison refreshed on enemies standing in a zone.
pub const ZONE_DOT_SECONDS: f32 = 2.0;
/// Duration of split suppression refreshed on enemies standing in a zone.
pub const ZONE_NO_SPLIT_SECONDS: f32 = 1.0;

/// Which turret family produced a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneKind {
    /// Deployed by a trap; deals physical damage.
    Trap,
    /// Left by a mortar shell; burns with chemical damage.
    Lingering,
}

/// A circular area that damages ground enemies inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zone {
    /// Family.
    pub kind: ZoneKind,
    /// Turret that created the zone.
    pub owner: TurretId,
    /// Centre.
    pub position: Vec2,
    /// Radius.
    pub radius: f32,
    /// Damage per second.
    pub dps: f32,
    /// Slow applied while inside.
    pub slow: f32,
    /// Poison damage per second applied while inside.
    pub dot: f32,
    /// Seconds left.
    pub remaining: f32,
    /// Kills refund part of the reward.
    pub siphon: bool,
    /// Enemies inside cannot split.
    pub no_split: bool,
}

impl Zone {
    /// Attribution for hits dealt by the zone.
    #[must_use]
    pub fn source(&self) -> HitSource {
        match self.kind {
            ZoneKind::Trap => HitSource::Trap {
                owner: self.owner,
                siphon: self.siphon,
            },
            ZoneKind::Lingering => HitSource::Turret(self.owner),
        }
    }

    /// Whether `enemy` is affected.
    #[must_use]
    pub fn covers(&self, enemy: &Enemy) -> bool {
        enemy.is_alive()
            && !enemy.flying
            && enemy.position.distance(self.position) <= self.radius + enemy.radius
    }

    /// Applies one tick of the zone to every covered enemy and ages it.
    ///
    /// Hits are announced like discrete strikes. A zone carrying non-finite
    /// numbers fails before touching any enemy.
    pub fn tick(
        &mut self,
        enemies: &mut [Enemy],
        dt: f32,
        out: &mut Vec<CombatEvent>,
    ) -> Result<(), CombatFault> {
        let exposure = dt.min(self.remaining.max(0.0));
        let amount = self.dps * exposure;
        ensure_finite("zone", "damage", amount)?;
        ensure_finite("zone", "slow", self.slow)?;
        ensure_finite("zone", "dot", self.dot)?;
        ensure_finite("zone", "position", self.position.x + self.position.y)?;

        let damage_type = match self.kind {
            ZoneKind::Trap => DamageType::Physical,
            ZoneKind::Lingering => DamageType::Chemical,
        };
        let source = self.source();
        for enemy in enemies.iter_mut().filter(|enemy| self.covers(enemy)) {
            let outcome = enemy.take_damage(amount, damage_type, Some(source));
            if outcome.hp_lost > 0.0 {
                out.push(CombatEvent::Hit {
                    enemy: enemy.id,
                    amount: outcome.hp_lost,
                });
            }
            if outcome.shield_broken {
                out.push(CombatEvent::ShieldBroken { enemy: enemy.id });
            }
            enemy.apply_slow(self.slow, ZONE_SLOW_SECONDS);
            enemy.apply_dot(self.dot, ZONE_DOT_SECONDS);
            if self.no_split {
                enemy.suppress_split(ZONE_NO_SPLIT_SECONDS);
            }
        }
        self.remaining -= dt;
        ensure_finite("zone", "remaining", self.remaining)
    }

    /// Whether the zone has burned out.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.remaining <= 0.0
    }
}
