//! Live enemies: defences, status effects, and per-archetype behaviour.

use echo_defence_core::{
    enemies::MAX_ARMOR, DamageType, EliteTag, EnemyId, EnemyKind, PathGraph, SpawnEvent,
    TurretId, WaveScalar,
};
use glam::Vec2;

use crate::fault::{ensure_finite, CombatFault};

/// Fraction of shield-absorbed energy damage that still reaches health.
pub const SHIELD_LEAK_THROUGH: f32 = 0.1;
/// Damage fraction taken by phaselinked elites that are neither revealed nor marked.
pub const PHASELINK_DAMAGE_FRACTION: f32 = 0.35;
/// Slow strength used to approximate a stun.
pub const STUN_SLOW: f32 = 0.95;
/// Length of a stun.
pub const STUN_DURATION: f32 = 0.35;

/// Seconds between warden shield pulses.
pub const WARDEN_INTERVAL: f32 = 1.5;
/// Radius of warden shield pulses.
pub const WARDEN_RADIUS: f32 = 100.0;
/// Shield granted to each ally per pulse.
pub const WARDEN_SHIELD_PULSE: f32 = 12.0;
/// Shield a warden may raise on an ally without a shield of its own.
pub const WARDEN_SHIELD_CAP: f32 = 40.0;
/// Radius of the herald aura.
pub const HERALD_RADIUS: f32 = 100.0;
/// Armour granted by the herald aura.
pub const HERALD_ARMOR_BONUS: f32 = 0.10;
/// Fraction of incoming slows ignored under the herald aura.
pub const HERALD_SLOW_RESIST: f32 = 0.4;
/// Swarmlings released by a dying splitter.
pub const SPLITTER_CHILDREN: u32 = 2;
/// Seconds between hivemother broods.
pub const HIVEMOTHER_BROOD_INTERVAL: f32 = 5.0;
/// Swarmlings per brood.
pub const HIVEMOTHER_BROOD_SIZE: u32 = 2;
/// Swarmlings released by a dying hivemother.
pub const HIVEMOTHER_DEATH_CHILDREN: u32 = 6;
/// Seconds between phantom re-cloaks.
pub const PHANTOM_CLOAK_INTERVAL: f32 = 6.0;
/// Health fraction below which the colossus hardens.
pub const COLOSSUS_SURGE_THRESHOLD: f32 = 0.5;
/// Armour gained by the colossus surge.
pub const COLOSSUS_SURGE_ARMOR: f32 = 0.15;

/// Origin of a hit, kept for kill attribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitSource {
    /// A turret attack.
    Turret(TurretId),
    /// A deployed trap zone.
    Trap {
        /// Trap turret that deployed the zone.
        owner: TurretId,
        /// Whether the zone refunds part of the reward.
        siphon: bool,
    },
    /// A player ability.
    Ability,
}

/// Timed status effects.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatusEffects {
    /// Slow strength.
    pub slow: f32,
    /// Slow time left.
    pub slow_t: f32,
    /// Poison damage per second.
    pub dot: f32,
    /// Poison time left.
    pub dot_t: f32,
    /// Damage amplification.
    pub mark: f32,
    /// Mark time left.
    pub mark_t: f32,
    /// Whether cloaking and phaselink are suppressed.
    pub revealed: bool,
    /// Reveal time left.
    pub reveal_t: f32,
    /// Time left during which death does not split.
    pub no_split_t: f32,
}

impl StatusEffects {
    fn decay(&mut self, dt: f32) {
        self.slow_t = (self.slow_t - dt).max(0.0);
        if self.slow_t <= 0.0 {
            self.slow = 0.0;
        }
        self.mark_t = (self.mark_t - dt).max(0.0);
        if self.mark_t <= 0.0 {
            self.mark = 0.0;
        }
        self.reveal_t = (self.reveal_t - dt).max(0.0);
        if self.reveal_t <= 0.0 {
            self.revealed = false;
        }
        self.no_split_t = (self.no_split_t - dt).max(0.0);
    }

    /// Whether a mark is active.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.mark_t > 0.0 && self.mark > 0.0
    }
}

/// Buffs projected onto an enemy by nearby heralds, recomputed every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AuraBuffs {
    /// Armour added before the cap.
    pub armor: f32,
    /// Fraction of slows ignored.
    pub slow_resist: f32,
}

/// Per-archetype behaviour and the state it needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyBehavior {
    /// Walks the path.
    Plain,
    /// Splits into swarmlings on death.
    Splitter,
    /// Pulses shields onto allies.
    Warden {
        /// Seconds until the next pulse.
        timer: f32,
    },
    /// Projects armour and slow resistance.
    Herald,
    /// Hardens once when badly hurt.
    Colossus {
        /// Whether the surge already happened.
        surged: bool,
    },
    /// Births a brood while walking and splits on death.
    Hivemother {
        /// Seconds until the next brood.
        timer: f32,
    },
    /// Periodically shakes off reveals.
    Phantom {
        /// Seconds until the next re-cloak.
        timer: f32,
    },
}

impl EnemyBehavior {
    /// Behaviour of a freshly spawned enemy.
    #[must_use]
    pub fn for_kind(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Splitter => Self::Splitter,
            EnemyKind::Warden => Self::Warden {
                timer: WARDEN_INTERVAL,
            },
            EnemyKind::Herald => Self::Herald,
            EnemyKind::Colossus => Self::Colossus { surged: false },
            EnemyKind::Hivemother => Self::Hivemother {
                timer: HIVEMOTHER_BROOD_INTERVAL,
            },
            EnemyKind::Phantom => Self::Phantom {
                timer: PHANTOM_CLOAK_INTERVAL,
            },
            _ => Self::Plain,
        }
    }

    /// Timer carried by the behaviour, zero when it has none.
    #[must_use]
    pub fn timer(&self) -> f32 {
        match self {
            Self::Warden { timer } | Self::Hivemother { timer } | Self::Phantom { timer } => {
                *timer
            }
            _ => 0.0,
        }
    }

    /// Replaces the behaviour timer, ignoring behaviours without one.
    pub fn set_timer(&mut self, value: f32) {
        if let Self::Warden { timer } | Self::Hivemother { timer } | Self::Phantom { timer } =
            self
        {
            *timer = value.max(0.0);
        }
    }
}

/// Behaviour triggered by an enemy's update that affects other entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BehaviorPulse {
    /// Shields allies around the position.
    ShieldAllies(Vec2),
    /// Spawns swarmlings at the path distance.
    Brood {
        /// Path distance of the mother.
        distance: f32,
        /// Swarmlings to spawn.
        count: u32,
    },
}

/// Result of one enemy update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyStep {
    /// The enemy reached the goal.
    pub leaked: bool,
    /// Behaviour reaching beyond the enemy itself.
    pub pulse: Option<BehaviorPulse>,
}

/// Damage actually applied by a hit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageOutcome {
    /// Health removed.
    pub hp_lost: f32,
    /// Shield removed.
    pub shield_absorbed: f32,
    /// The hit collapsed the shield for the first time.
    pub shield_broken: bool,
}

/// An enemy on the path.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Identifier.
    pub id: EnemyId,
    /// Archetype.
    pub kind: EnemyKind,
    /// Elite modifier.
    pub elite: Option<EliteTag>,
    /// Archetype behaviour.
    pub behavior: EnemyBehavior,
    /// Wave scaling applied at spawn.
    pub scalar: WaveScalar,
    /// Whether the enemy closes a wave as a miniboss.
    pub is_miniboss: bool,
    /// Current health.
    pub hp: f32,
    /// Health cap.
    pub max_hp: f32,
    /// Current shield.
    pub shield: f32,
    /// Shield at spawn.
    pub max_shield: f32,
    /// Physical damage reduction.
    pub armor: f32,
    /// Health regenerated per second.
    pub regen: f32,
    /// Path speed before slows.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Airborne.
    pub flying: bool,
    /// Cloaked.
    pub stealth: bool,
    /// Base gold paid on death.
    pub reward: u32,
    /// Lives removed on leak.
    pub lives_cost: u32,
    /// Arc length travelled.
    pub path_distance: f32,
    /// World position.
    pub position: Vec2,
    /// Timed effects.
    pub status: StatusEffects,
    /// Herald buffs for this tick.
    pub aura: AuraBuffs,
    /// Most recent attributed hit.
    pub last_hit: Option<HitSource>,
    /// Whether the shield break was already announced.
    pub shield_broken: bool,
    /// Death or leak was processed; the enemy is removed next tick.
    pub handled: bool,
}

impl Enemy {
    /// Builds an enemy at the start of the path.
    #[must_use]
    pub fn new(
        id: EnemyId,
        kind: EnemyKind,
        elite: Option<EliteTag>,
        scalar: WaveScalar,
        is_miniboss: bool,
    ) -> Self {
        let profile = kind.profile();
        let scalar = scalar.sanitized();
        let hp_multiplier = elite.map_or(1.0, EliteTag::hp_multiplier);
        let speed_multiplier = elite.map_or(1.0, EliteTag::speed_multiplier);
        let reward_multiplier = elite.map_or(1.0, EliteTag::reward_multiplier);
        let armor_bonus = elite.map_or(0.0, EliteTag::armor_bonus);

        let max_hp = (profile.hp * scalar.hp * hp_multiplier).max(1.0);
        let shield = profile.shield * scalar.shield;
        Self {
            id,
            kind,
            elite,
            behavior: EnemyBehavior::for_kind(kind),
            scalar,
            is_miniboss,
            hp: max_hp,
            max_hp,
            shield,
            max_shield: shield,
            armor: ((profile.armor + armor_bonus) * scalar.armor).clamp(0.0, MAX_ARMOR),
            regen: profile.regen * scalar.regen,
            speed: profile.speed * scalar.spd * speed_multiplier,
            radius: profile.radius,
            flying: profile.flying,
            stealth: profile.stealth,
            reward: ((profile.reward as f32 * scalar.reward * reward_multiplier).round() as u32)
                .max(1),
            lives_cost: profile.lives_cost,
            path_distance: 0.0,
            position: Vec2::ZERO,
            status: StatusEffects::default(),
            aura: AuraBuffs::default(),
            last_hit: None,
            shield_broken: false,
            handled: false,
        }
    }

    /// Builds an enemy from a scheduled spawn, placed `distance` along the path.
    #[must_use]
    pub fn spawn(id: EnemyId, event: &SpawnEvent, path: &PathGraph, distance: f32) -> Self {
        let mut enemy = Self::new(id, event.kind, event.elite, event.scalar, event.is_miniboss);
        enemy.path_distance = distance.clamp(0.0, path.total_length());
        enemy.position = path.point_at(enemy.path_distance);
        enemy
    }

    /// Whether the enemy can still be hit.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.handled && self.hp > 0.0
    }

    /// Armour including aura bonuses, capped.
    #[must_use]
    pub fn effective_armor(&self) -> f32 {
        (self.armor + self.aura.armor).clamp(0.0, MAX_ARMOR)
    }

    /// Path speed after slows.
    #[must_use]
    pub fn current_speed(&self) -> f32 {
        let slow = self.status.slow * (1.0 - self.aura.slow_resist);
        self.speed * (1.0 - slow.clamp(0.0, 1.0))
    }

    /// World velocity along the path.
    #[must_use]
    pub fn velocity(&self, path: &PathGraph) -> Vec2 {
        path.direction_at(self.path_distance) * self.current_speed()
    }

    /// Whether a turret at `origin` can see the enemy.
    #[must_use]
    pub fn is_visible_from(&self, origin: Vec2, proximity: f32) -> bool {
        !self.stealth || self.status.revealed || self.position.distance(origin) <= proximity
    }

    /// Whether the phaselink damage reduction applies.
    #[must_use]
    pub fn is_phased(&self) -> bool {
        self.elite == Some(EliteTag::Phaselink)
            && !self.status.revealed
            && !self.status.is_marked()
    }

    /// Applies a hit.
    ///
    /// Marks amplify the hit, phaselink reduces it, then the damage type
    /// decides how shields and armour interact. A `None` source leaves kill
    /// attribution untouched.
    pub fn take_damage(
        &mut self,
        amount: f32,
        damage_type: DamageType,
        source: Option<HitSource>,
    ) -> DamageOutcome {
        if !self.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return DamageOutcome::default();
        }

        let mut amount = amount;
        if self.status.is_marked() {
            amount *= 1.0 + self.status.mark;
        }
        if self.is_phased() {
            amount *= PHASELINK_DAMAGE_FRACTION;
        }

        let mut outcome = DamageOutcome::default();
        outcome.hp_lost = match damage_type {
            DamageType::Energy => {
                let absorbed = amount.min(self.shield.max(0.0));
                self.shield -= absorbed;
                outcome.shield_absorbed = absorbed;
                if absorbed > 0.0 && self.shield <= 0.0 && !self.shield_broken {
                    self.shield = 0.0;
                    self.shield_broken = true;
                    outcome.shield_broken = true;
                }
                (amount - absorbed) + absorbed * SHIELD_LEAK_THROUGH
            }
            DamageType::Physical => amount * (1.0 - self.effective_armor()),
            DamageType::Chemical | DamageType::True => amount,
        };

        self.hp -= outcome.hp_lost;
        if source.is_some() {
            self.last_hit = source;
        }
        outcome
    }

    /// Applies a slow, keeping the stronger strength and the longer duration.
    pub fn apply_slow(&mut self, strength: f32, duration: f32) {
        if strength <= 0.0 || duration <= 0.0 {
            return;
        }
        self.status.slow = self.status.slow.max(strength.min(1.0));
        self.status.slow_t = self.status.slow_t.max(duration);
    }

    /// Applies poison.
    pub fn apply_dot(&mut self, dps: f32, duration: f32) {
        if dps <= 0.0 || duration <= 0.0 {
            return;
        }
        self.status.dot = self.status.dot.max(dps);
        self.status.dot_t = self.status.dot_t.max(duration);
    }

    /// Applies a damage-amplifying mark.
    pub fn apply_mark(&mut self, amplification: f32, duration: f32) {
        if amplification <= 0.0 || duration <= 0.0 {
            return;
        }
        self.status.mark = self.status.mark.max(amplification);
        self.status.mark_t = self.status.mark_t.max(duration);
    }

    /// Lifts cloaking and phaselink for `duration`.
    ///
    /// Enemies with neither are unaffected.
    pub fn reveal(&mut self, duration: f32) {
        if duration <= 0.0 || !(self.stealth || self.elite == Some(EliteTag::Phaselink)) {
            return;
        }
        self.status.revealed = true;
        self.status.reveal_t = self.status.reveal_t.max(duration);
    }

    /// Prevents splitting on death for `duration`.
    pub fn suppress_split(&mut self, duration: f32) {
        self.status.no_split_t = self.status.no_split_t.max(duration);
    }

    /// Briefly halts the enemy.
    pub fn stun(&mut self) {
        self.apply_slow(STUN_SLOW, STUN_DURATION);
    }

    /// Swarmlings released when the enemy dies right now.
    #[must_use]
    pub fn death_children(&self) -> u32 {
        if self.status.no_split_t > 0.0 {
            return 0;
        }
        match self.behavior {
            EnemyBehavior::Splitter => SPLITTER_CHILDREN,
            EnemyBehavior::Hivemother { .. } => HIVEMOTHER_DEATH_CHILDREN,
            _ => 0,
        }
    }

    /// Advances statuses, poison, regeneration, behaviour, and movement.
    pub fn advance(&mut self, dt: f32, path: &PathGraph) -> Result<EnemyStep, CombatFault> {
        let mut step = EnemyStep::default();

        if self.status.dot_t > 0.0 {
            let exposure = dt.min(self.status.dot_t);
            let _ = self.take_damage(self.status.dot * exposure, DamageType::Chemical, None);
            self.status.dot_t -= exposure;
            if self.status.dot_t <= 0.0 {
                self.status.dot = 0.0;
            }
        }
        if self.regen > 0.0 && self.hp > 0.0 {
            self.hp = (self.hp + self.regen * dt).min(self.max_hp);
        }

        let speed = self.current_speed();
        step.pulse = self.advance_behavior(dt);
        self.status.decay(dt);

        self.path_distance += speed * dt;
        self.position = path.point_at(self.path_distance);
        self.validate()?;

        step.leaked = self.path_distance >= path.total_length();
        Ok(step)
    }

    fn advance_behavior(&mut self, dt: f32) -> Option<BehaviorPulse> {
        match &mut self.behavior {
            EnemyBehavior::Warden { timer } => {
                *timer -= dt;
                if *timer > 0.0 {
                    return None;
                }
                *timer += WARDEN_INTERVAL;
                Some(BehaviorPulse::ShieldAllies(self.position))
            }
            EnemyBehavior::Hivemother { timer } => {
                *timer -= dt;
                if *timer > 0.0 {
                    return None;
                }
                *timer += HIVEMOTHER_BROOD_INTERVAL;
                Some(BehaviorPulse::Brood {
                    distance: self.path_distance,
                    count: HIVEMOTHER_BROOD_SIZE,
                })
            }
            EnemyBehavior::Phantom { timer } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    *timer += PHANTOM_CLOAK_INTERVAL;
                    self.status.revealed = false;
                    self.status.reveal_t = 0.0;
                }
                None
            }
            EnemyBehavior::Colossus { surged } => {
                if !*surged && self.hp < self.max_hp * COLOSSUS_SURGE_THRESHOLD {
                    *surged = true;
                    self.armor = (self.armor + COLOSSUS_SURGE_ARMOR).min(MAX_ARMOR);
                }
                None
            }
            EnemyBehavior::Plain | EnemyBehavior::Splitter | EnemyBehavior::Herald => None,
        }
    }

    /// Rejects enemies whose numeric state has gone non-finite.
    pub fn validate(&self) -> Result<(), CombatFault> {
        ensure_finite("enemy", "hp", self.hp)?;
        ensure_finite("enemy", "shield", self.shield)?;
        ensure_finite("enemy", "speed", self.speed)?;
        ensure_finite("enemy", "path_distance", self.path_distance)?;
        ensure_finite("enemy", "position", self.position.x + self.position.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(kind: EnemyKind) -> Enemy {
        Enemy::new(EnemyId::new(1), kind, None, WaveScalar::IDENTITY, false)
    }

    fn straight_path() -> PathGraph {
        PathGraph::new(vec![Vec2::ZERO, Vec2::new(1_000.0, 0.0)])
    }

    #[test]
    fn shields_absorb_energy_with_leak_through() {
        let mut target = enemy(EnemyKind::Grunt);
        target.hp = 100.0;
        target.max_hp = 100.0;
        target.shield = 50.0;
        target.max_shield = 50.0;

        let outcome = target.take_damage(30.0, DamageType::Energy, None);

        assert_eq!(target.shield, 20.0);
        assert!((target.hp - (100.0 - 30.0 * SHIELD_LEAK_THROUGH)).abs() < 1e-4);
        assert!(!outcome.shield_broken);
    }

    #[test]
    fn reveal_only_touches_cloaked_or_phaselinked_enemies() {
        let mut grunt = enemy(EnemyKind::Grunt);
        grunt.reveal(3.0);
        assert!(!grunt.status.revealed);
        assert_eq!(grunt.status.reveal_t, 0.0);

        let mut wraith = enemy(EnemyKind::Wraith);
        wraith.reveal(3.0);
        assert!(wraith.status.revealed);
        assert_eq!(wraith.status.reveal_t, 3.0);

        let mut linked = Enemy::new(
            EnemyId::new(2),
            EnemyKind::Grunt,
            Some(EliteTag::Phaselink),
            WaveScalar::IDENTITY,
            false,
        );
        linked.reveal(2.0);
        assert!(linked.status.revealed);
    }

    #[test]
    fn shield_break_is_announced_once() {
        let mut target = enemy(EnemyKind::Shielded);
        let first = target.take_damage(target.shield + 5.0, DamageType::Energy, None);
        assert!(first.shield_broken);
        target.shield = 10.0;
        let second = target.take_damage(20.0, DamageType::Energy, None);
        assert!(!second.shield_broken);
    }

    #[test]
    fn armour_only_reduces_physical_damage() {
        for (damage_type, expected) in [
            (DamageType::Physical, 50.0),
            (DamageType::Energy, 100.0),
            (DamageType::Chemical, 100.0),
            (DamageType::True, 100.0),
        ] {
            let mut target = enemy(EnemyKind::Grunt);
            target.hp = 1_000.0;
            target.armor = 0.5;
            let outcome = target.take_damage(100.0, damage_type, None);
            assert!((outcome.hp_lost - expected).abs() < 1e-4, "{damage_type:?}");
        }
    }

    #[test]
    fn true_damage_ignores_shields() {
        let mut target = enemy(EnemyKind::Shielded);
        let shield = target.shield;
        let _ = target.take_damage(10.0, DamageType::True, None);
        assert_eq!(target.shield, shield);
    }

    #[test]
    fn phaselink_resists_until_marked() {
        let mut target = Enemy::new(
            EnemyId::new(2),
            EnemyKind::Grunt,
            Some(EliteTag::Phaselink),
            WaveScalar::IDENTITY,
            false,
        );
        let reduced = target.take_damage(10.0, DamageType::True, None);
        assert!((reduced.hp_lost - 10.0 * PHASELINK_DAMAGE_FRACTION).abs() < 1e-4);

        target.apply_mark(0.2, 2.0);
        let amplified = target.take_damage(10.0, DamageType::True, None);
        assert!((amplified.hp_lost - 12.0).abs() < 1e-4);
    }

    #[test]
    fn slows_keep_the_strongest_and_longest() {
        let mut target = enemy(EnemyKind::Grunt);
        target.apply_slow(0.3, 2.0);
        target.apply_slow(0.5, 1.0);
        assert_eq!(target.status.slow, 0.5);
        assert_eq!(target.status.slow_t, 2.0);
        target.aura.slow_resist = 0.5;
        assert!((target.current_speed() - target.speed * 0.75).abs() < 1e-4);
    }

    #[test]
    fn poison_ticks_without_claiming_the_kill() {
        let mut target = enemy(EnemyKind::Grunt);
        target.last_hit = Some(HitSource::Ability);
        target.apply_dot(10.0, 1.0);
        let _ = target.advance(0.5, &straight_path()).expect("update succeeds");
        assert!((target.hp - (target.max_hp - 5.0)).abs() < 1e-3);
        assert_eq!(target.last_hit, Some(HitSource::Ability));
    }

    #[test]
    fn enemies_leak_at_the_end_of_the_path() {
        let mut target = enemy(EnemyKind::Runner);
        target.path_distance = 995.0;
        let step = target.advance(1.0, &straight_path()).expect("update succeeds");
        assert!(step.leaked);
    }

    #[test]
    fn non_finite_state_is_a_fault() {
        let mut target = enemy(EnemyKind::Grunt);
        target.speed = f32::NAN;
        assert!(target.advance(0.1, &straight_path()).is_err());
    }

    #[test]
    fn split_suppression_blocks_children() {
        let mut target = enemy(EnemyKind::Splitter);
        assert_eq!(target.death_children(), SPLITTER_CHILDREN);
        target.suppress_split(1.0);
        assert_eq!(target.death_children(), 0);
    }

    #[test]
    fn colossus_hardens_once_when_hurt() {
        let mut boss = enemy(EnemyKind::Colossus);
        let armour = boss.armor;
        boss.hp = boss.max_hp * 0.4;
        boss.regen = 0.0;
        let _ = boss.advance(0.1, &straight_path()).expect("update succeeds");
        assert!((boss.armor - (armour + COLOSSUS_SURGE_ARMOR).min(MAX_ARMOR)).abs() < 1e-5);
        let _ = boss.advance(0.1, &straight_path()).expect("update succeeds");
        assert!((boss.armor - (armour + COLOSSUS_SURGE_ARMOR).min(MAX_ARMOR)).abs() < 1e-5);
    }
}
