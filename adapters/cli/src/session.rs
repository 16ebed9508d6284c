//! Fixed-step headless session driving the world with the autoplayer.

use std::{fmt, time::Duration};

use echo_defence_core::{Command, Event, PhaseKind};
use echo_defence_world::{apply, query, World};
use log::{debug, info};

use crate::autoplayer::Autoplayer;

/// Wall-clock length of one simulated frame.
pub(crate) const FRAME: Duration = Duration::from_millis(50);

/// Actions the autoplayer may issue before each frame.
const ACTIONS_PER_FRAME: usize = 4;

/// Tallies gathered from the event stream of a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Summary {
    pub(crate) frames: u64,
    pub(crate) simulated_seconds: f32,
    pub(crate) kills: u32,
    pub(crate) leaks: u32,
    pub(crate) waves_cleared: u32,
    pub(crate) levels_advanced: u32,
    pub(crate) turrets_built: u32,
    pub(crate) upgrades: u32,
    pub(crate) rejections: u32,
    pub(crate) best_combo: u32,
    pub(crate) gold_earned: u64,
    pub(crate) saves: u32,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::TimeAdvanced { dt } => self.simulated_seconds += dt,
            Event::EnemyKilled {
                reward,
                siphon_refund,
                combo,
                ..
            } => {
                self.kills += 1;
                self.best_combo = self.best_combo.max(*combo);
                self.gold_earned += u64::from(*reward) + u64::from(*siphon_refund);
            }
            Event::EnemyLeaked { .. } => self.leaks += 1,
            Event::WaveCleared { bonus, .. } => {
                self.waves_cleared += 1;
                self.gold_earned += u64::from(*bonus);
            }
            Event::IntermissionEnded { gold, .. } => self.gold_earned += u64::from(*gold),
            Event::LevelAdvanced { .. } => self.levels_advanced += 1,
            Event::TurretBuilt { .. } => self.turrets_built += 1,
            Event::TurretUpgraded { .. } => self.upgrades += 1,
            Event::ActionRejected { action, reason } => {
                self.rejections += 1;
                debug!("autoplayer {action:?} rejected: {reason}");
            }
            Event::GameSaved => self.saves += 1,
            _ => {}
        }
    }
}

/// Runs `frames` fixed frames or until the run is lost.
pub(crate) fn run(world: &mut World, player: &mut Autoplayer, frames: u64) -> Summary {
    let mut summary = Summary::default();
    let mut events = Vec::new();

    for _ in 0..frames {
        for _ in 0..ACTIONS_PER_FRAME {
            let Some(command) = player.decide(world) else {
                break;
            };
            let rejected_before = summary.rejections;
            apply(world, command, &mut events);
            drain(&mut summary, &mut events);
            if summary.rejections > rejected_before {
                break;
            }
        }

        apply(world, Command::Tick { dt: FRAME }, &mut events);
        drain(&mut summary, &mut events);
        summary.frames += 1;

        if query::phase(world) == PhaseKind::Defeat {
            info!("run lost after {} frames", summary.frames);
            break;
        }
    }
    summary
}

fn drain(summary: &mut Summary, events: &mut Vec<Event>) {
    for event in events.drain(..) {
        summary.record(&event);
    }
}

/// Human-readable end-of-run report.
pub(crate) struct Report<'a> {
    pub(crate) world: &'a World,
    pub(crate) summary: &'a Summary,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let world = self.world;
        let summary = self.summary;
        writeln!(
            f,
            "level {} wave {}/{} ({:?})",
            query::level_index(world) + 1,
            query::wave(world),
            query::wave_max(world),
            query::phase(world)
        )?;
        writeln!(
            f,
            "gold {}  lives {}  turrets {}",
            query::gold(world),
            query::lives(world),
            query::turrets(world).len()
        )?;
        writeln!(
            f,
            "simulated {:.1}s over {} frames",
            summary.simulated_seconds, summary.frames
        )?;
        writeln!(
            f,
            "kills {}  leaks {}  best combo {}  gold earned {}",
            summary.kills, summary.leaks, summary.best_combo, summary.gold_earned
        )?;
        writeln!(
            f,
            "waves cleared {}  levels advanced {}",
            summary.waves_cleared, summary.levels_advanced
        )?;
        writeln!(
            f,
            "built {}  upgraded {}  rejected {}  saves {}",
            summary.turrets_built, summary.upgrades, summary.rejections, summary.saves
        )?;
        write!(f, "combat faults {}", query::fault_count(world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoplayer::AutoplayConfig;
    use echo_defence_core::config::SimulationConfig;

    fn world(seed: u64) -> World {
        World::new(SimulationConfig {
            composition_seed: Some(seed),
            ..SimulationConfig::default()
        })
    }

    #[test]
    fn autoplayer_defends_the_first_wave() {
        let mut world = world(3);
        apply(
            &mut world,
            Command::SetSpeed { multiplier: 4 },
            &mut Vec::new(),
        );
        let mut player = Autoplayer::new(AutoplayConfig::default());
        let summary = run(&mut world, &mut player, 1_200);

        assert!(summary.turrets_built > 0);
        assert!(summary.kills > 0);
        assert!(summary.waves_cleared >= 1);
        assert!(summary.simulated_seconds > 0.0);
    }

    #[test]
    fn identical_seeds_produce_identical_summaries() {
        let play = || {
            let mut world = world(11);
            let mut player = Autoplayer::new(AutoplayConfig::default());
            let summary = run(&mut world, &mut player, 300);
            (summary, query::snapshot(&world))
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn report_lists_the_economy() {
        let world = world(1);
        let summary = Summary::default();
        let text = Report {
            world: &world,
            summary: &summary,
        }
        .to_string();
        assert!(text.starts_with("level 1 wave 0/16 (Building)"));
        assert!(text.contains("gold 250  lives 20"));
    }
}
