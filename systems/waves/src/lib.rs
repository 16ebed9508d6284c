#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave composition, difficulty scaling, and spawn queue advancement.

mod composition;
mod scaling;

use echo_defence_core::SpawnEvent;
use log::debug;

pub use composition::{
    boss_for_level, build_wave, count_and_spacing, elite_chance, unlocked_pool, WaveContext,
    WavePlan, ANOMALY_CHANCE, ANOMALY_WAVE, ELITE_CHANCE_CAP, ELITE_WAVE, FORCED_ARMOR_PERIOD,
    FORCED_ARMOR_WAVE, MIN_SPACING, PUNCTUATION_PERIOD, UNLOCKS,
};
pub use scaling::{wave_scalar, LATE_WAVE_START};

/// Queue of pending spawns for the active wave.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveScheduler {
    queue: Vec<SpawnEvent>,
    next: usize,
    elapsed: f32,
}

impl WaveScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the queue with a freshly composed wave.
    pub fn begin(&mut self, plan: &WavePlan) {
        debug!(
            "wave {} queued with {} spawns",
            plan.wave,
            plan.spawns.len()
        );
        self.queue.clone_from(&plan.spawns);
        self.next = 0;
        self.elapsed = 0.0;
    }

    /// Advances the spawn clock and appends every event whose time was reached.
    pub fn advance(&mut self, dt: f32, out: &mut Vec<SpawnEvent>) {
        if self.is_exhausted() {
            return;
        }
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        while let Some(event) = self.queue.get(self.next) {
            if event.time > self.elapsed {
                break;
            }
            out.push(*event);
            self.next += 1;
        }
    }

    /// Whether every queued spawn was released.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.queue.len()
    }

    /// Seconds since the wave began.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Spawns not yet released.
    #[must_use]
    pub fn pending(&self) -> &[SpawnEvent] {
        self.queue.get(self.next..).unwrap_or(&[])
    }

    /// Resumes a saved queue of pending spawns at the saved clock.
    ///
    /// Events are re-sorted and invalid times dropped.
    pub fn restore(&mut self, pending: Vec<SpawnEvent>, elapsed: f32) {
        let mut queue: Vec<SpawnEvent> = pending
            .into_iter()
            .filter(|event| event.time.is_finite())
            .map(|event| SpawnEvent {
                scalar: event.scalar.sanitized(),
                ..event
            })
            .collect();
        queue.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.queue = queue;
        self.next = 0;
        self.elapsed = if elapsed.is_finite() {
            elapsed.max(0.0)
        } else {
            0.0
        };
    }

    /// Drops every pending spawn.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.next = 0;
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_defence_core::{EnemyKind, WaveScalar};

    fn event(time: f32) -> SpawnEvent {
        SpawnEvent {
            time,
            kind: EnemyKind::Grunt,
            scalar: WaveScalar::IDENTITY,
            elite: None,
            is_miniboss: false,
        }
    }

    fn plan(times: &[f32]) -> WavePlan {
        WavePlan {
            wave: 1,
            scalar: WaveScalar::IDENTITY,
            anomaly: None,
            spawns: times.iter().copied().map(event).collect(),
        }
    }

    #[test]
    fn advance_releases_every_due_event() {
        let mut scheduler = WaveScheduler::new();
        scheduler.begin(&plan(&[0.0, 0.5, 0.5, 2.0]));
        let mut out = Vec::new();
        scheduler.advance(0.0, &mut out);
        assert_eq!(out.len(), 1);
        scheduler.advance(0.6, &mut out);
        assert_eq!(out.len(), 3);
        assert!(!scheduler.is_exhausted());
        scheduler.advance(5.0, &mut out);
        assert_eq!(out.len(), 4);
        assert!(scheduler.is_exhausted());
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn negative_and_nan_steps_do_not_rewind() {
        let mut scheduler = WaveScheduler::new();
        scheduler.begin(&plan(&[1.0]));
        let mut out = Vec::new();
        scheduler.advance(0.5, &mut out);
        scheduler.advance(-3.0, &mut out);
        scheduler.advance(f32::NAN, &mut out);
        assert_eq!(scheduler.elapsed(), 0.5);
        assert!(out.is_empty());
    }

    #[test]
    fn restore_sorts_and_resumes() {
        let mut scheduler = WaveScheduler::new();
        scheduler.restore(vec![event(3.0), event(f32::NAN), event(1.0)], 0.5);
        assert_eq!(scheduler.pending().len(), 2);
        let mut out = Vec::new();
        scheduler.advance(0.5, &mut out);
        assert_eq!(out, vec![event(1.0)]);
    }
}
