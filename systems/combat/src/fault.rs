//! Isolation of per-entity update failures.
//!
//! Each entity update runs against a snapshot. When the update reports a
//! [`CombatFault`] the resolver restores the snapshot and hands the fault to
//! the [`FaultGuard`], which logs at most once per scope every
//! [`FAULT_LOG_INTERVAL`] simulated seconds.

use std::collections::BTreeMap;

use log::warn;
use thiserror::Error;

/// Minimum simulated seconds between two log lines for the same scope.
pub const FAULT_LOG_INTERVAL: f32 = 2.0;

/// Failure raised by an entity update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CombatFault {
    /// A numeric field became NaN or infinite.
    #[error("{entity} produced a non-finite {field}")]
    NonFinite {
        /// Entity family.
        entity: &'static str,
        /// Offending field.
        field: &'static str,
    },
}

pub(crate) fn ensure_finite(
    entity: &'static str,
    field: &'static str,
    value: f32,
) -> Result<(), CombatFault> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CombatFault::NonFinite { entity, field })
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ScopeLog {
    last_logged: Option<f32>,
    suppressed: u32,
}

/// Rate-limited fault reporter.
#[derive(Clone, Debug, Default)]
pub struct FaultGuard {
    clock: f32,
    scopes: BTreeMap<&'static str, ScopeLog>,
    total: u64,
}

impl FaultGuard {
    /// Creates a guard with no recorded faults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the guard's clock.
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
    }

    /// Records a fault, returning whether it was logged.
    pub fn report(&mut self, scope: &'static str, fault: &CombatFault) -> bool {
        self.total += 1;
        let clock = self.clock;
        let entry = self.scopes.entry(scope).or_default();
        let due = entry
            .last_logged
            .map_or(true, |last| clock - last >= FAULT_LOG_INTERVAL);
        if !due {
            entry.suppressed += 1;
            return false;
        }
        if entry.suppressed > 0 {
            warn!(
                "{scope} update failed: {fault} ({} similar faults suppressed)",
                entry.suppressed
            );
        } else {
            warn!("{scope} update failed: {fault}");
        }
        entry.last_logged = Some(clock);
        entry.suppressed = 0;
        true
    }

    /// Faults recorded since creation.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAULT: CombatFault = CombatFault::NonFinite {
        entity: "enemy",
        field: "hp",
    };

    #[test]
    fn repeated_faults_are_rate_limited_per_scope() {
        let mut guard = FaultGuard::new();
        assert!(guard.report("enemy", &FAULT));
        assert!(!guard.report("enemy", &FAULT));
        assert!(guard.report("turret", &FAULT));

        guard.advance(FAULT_LOG_INTERVAL * 0.5);
        assert!(!guard.report("enemy", &FAULT));
        guard.advance(FAULT_LOG_INTERVAL * 0.5);
        assert!(guard.report("enemy", &FAULT));
        assert_eq!(guard.total(), 5);
    }

    #[test]
    fn finite_values_pass() {
        assert!(ensure_finite("enemy", "hp", 3.0).is_ok());
        assert_eq!(ensure_finite("enemy", "hp", f32::INFINITY), Err(FAULT));
    }
}
