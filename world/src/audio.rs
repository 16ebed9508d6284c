//! Sound cue dispatch.
//!
//! The world never plays sound itself. It forwards cues to an optional
//! [`AudioSink`] supplied by the adapter and rate-limits the chatty ones.

use std::{collections::BTreeMap, fmt};

/// Minimum seconds between two shot cues.
pub const SHOT_CUE_COOLDOWN: f32 = 0.06;
/// Minimum seconds between two hit cues.
pub const HIT_CUE_COOLDOWN: f32 = 0.05;
/// Minimum seconds between two kill cues.
pub const KILL_CUE_COOLDOWN: f32 = 0.04;

/// Sounds the simulation asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AudioCue {
    /// A turret fired.
    Shot,
    /// Damage landed.
    Hit,
    /// An enemy died.
    Kill,
    /// An enemy reached the goal.
    Leak,
    /// A wave started.
    WaveStart,
}

impl AudioCue {
    /// Stable key for asset lookup.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Shot => "shot",
            Self::Hit => "hit",
            Self::Kill => "kill",
            Self::Leak => "leak",
            Self::WaveStart => "wave_start",
        }
    }
}

/// Fire-and-forget audio output.
pub trait AudioSink: fmt::Debug {
    /// Plays a cue.
    fn play(&mut self, cue: AudioCue);
}

/// Forwards cues to a sink, enforcing per-cue cooldowns.
#[derive(Debug, Default)]
pub(crate) struct AudioDispatch {
    sink: Option<Box<dyn AudioSink>>,
    cooldowns: BTreeMap<AudioCue, f32>,
}

impl AudioDispatch {
    pub(crate) fn attach(&mut self, sink: Box<dyn AudioSink>) {
        self.sink = Some(sink);
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = (*remaining - dt).max(0.0);
        }
    }

    pub(crate) fn play(&mut self, cue: AudioCue) {
        if let Some(sink) = self.sink.as_mut() {
            sink.play(cue);
        }
    }

    /// Plays `cue` unless it played less than `cooldown` seconds ago.
    pub(crate) fn play_limited(&mut self, cue: AudioCue, cooldown: f32) {
        let remaining = self.cooldowns.entry(cue).or_insert(0.0);
        if *remaining > 0.0 {
            return;
        }
        *remaining = cooldown;
        self.play(cue);
    }
}
