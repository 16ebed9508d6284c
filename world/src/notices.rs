//! Transient player-facing notices.

use echo_defence_core::config::NOTICE_SECONDS;

/// Most notices shown at once; older ones are dropped first.
pub const MAX_NOTICES: usize = 4;

/// A message shown briefly to the player.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    /// Text to display.
    pub message: String,
    /// Seconds before the notice is dismissed.
    pub remaining: f32,
}

/// Queue of notices that dismiss themselves.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Notices {
    entries: Vec<Notice>,
}

impl Notices {
    pub(crate) fn push(&mut self, message: String) {
        if self.entries.len() >= MAX_NOTICES {
            let _ = self.entries.remove(0);
        }
        self.entries.push(Notice {
            message,
            remaining: NOTICE_SECONDS,
        });
    }

    /// Ages every notice by wall-clock time, even while paused.
    pub(crate) fn tick(&mut self, dt: f32) {
        for notice in &mut self.entries {
            notice.remaining -= dt;
        }
        self.entries.retain(|notice| notice.remaining > 0.0);
    }

    pub(crate) fn entries(&self) -> &[Notice] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_dismiss_themselves() {
        let mut notices = Notices::default();
        notices.push("insufficient funds".to_owned());
        notices.tick(NOTICE_SECONDS / 2.0);
        assert_eq!(notices.entries().len(), 1);
        notices.tick(NOTICE_SECONDS);
        assert!(notices.entries().is_empty());
    }

    #[test]
    fn oldest_notice_is_dropped_when_full() {
        let mut notices = Notices::default();
        for index in 0..=MAX_NOTICES {
            notices.push(format!("notice {index}"));
        }
        assert_eq!(notices.entries().len(), MAX_NOTICES);
        assert_eq!(notices.entries()[0].message, "notice 1");
    }
}
