//! Ability cooldown bookkeeping.

use echo_defence_core::{
    config::{
        OVERCLOCK_COOLDOWN, OVERCLOCK_DURATION, OVERCLOCK_RATE, SHOCKWAVE_COOLDOWN,
        SKIP_ABILITY_CUT,
    },
    Ability,
};

/// Recharge and activity timers for every ability.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct AbilityTimers {
    pub(crate) overclock_cooldown: f32,
    pub(crate) overclock_active: f32,
    pub(crate) shockwave_cooldown: f32,
}

impl AbilityTimers {
    pub(crate) fn cooldown(&self, ability: Ability) -> f32 {
        match ability {
            Ability::Overclock => self.overclock_cooldown,
            Ability::Shockwave => self.shockwave_cooldown,
        }
    }

    /// Starts the ability's recharge, and for Overclock its active window.
    pub(crate) fn trigger(&mut self, ability: Ability) {
        match ability {
            Ability::Overclock => {
                self.overclock_cooldown = OVERCLOCK_COOLDOWN;
                self.overclock_active = OVERCLOCK_DURATION;
            }
            Ability::Shockwave => self.shockwave_cooldown = SHOCKWAVE_COOLDOWN,
        }
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        self.overclock_cooldown = (self.overclock_cooldown - dt).max(0.0);
        self.overclock_active = (self.overclock_active - dt).max(0.0);
        self.shockwave_cooldown = (self.shockwave_cooldown - dt).max(0.0);
    }

    /// Flat cut granted by skipping an intermission.
    pub(crate) fn cut(&mut self) {
        self.overclock_cooldown = (self.overclock_cooldown - SKIP_ABILITY_CUT).max(0.0);
        self.shockwave_cooldown = (self.shockwave_cooldown - SKIP_ABILITY_CUT).max(0.0);
    }

    /// Fire-rate multiplier currently granted to every turret.
    pub(crate) fn fire_rate(&self) -> f32 {
        if self.overclock_active > 0.0 {
            OVERCLOCK_RATE
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overclock_buffs_until_it_runs_out() {
        let mut timers = AbilityTimers::default();
        timers.trigger(Ability::Overclock);
        assert_eq!(timers.fire_rate(), OVERCLOCK_RATE);
        timers.tick(OVERCLOCK_DURATION);
        assert_eq!(timers.fire_rate(), 1.0);
        assert!(timers.cooldown(Ability::Overclock) > 0.0);
    }

    #[test]
    fn skip_cut_never_goes_negative() {
        let mut timers = AbilityTimers {
            shockwave_cooldown: 1.0,
            ..AbilityTimers::default()
        };
        timers.cut();
        assert_eq!(timers.cooldown(Ability::Shockwave), 0.0);
    }
}
