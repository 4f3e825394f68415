//! Round timer.
//!
//! Tracks the round clock for the coordinator and publishes display
//! refreshes to the presentation layer. Publishing never touches the table
//! lock; the coordinator calls it outside the critical section each tick.

use super::{config::TimerMode, ui::UiSender};
use tokio::time::Instant;

#[derive(Debug)]
pub struct RoundTimer {
    mode: TimerMode,
    warning: std::time::Duration,
    started: Instant,
}

impl RoundTimer {
    #[must_use]
    pub fn new(mode: TimerMode, warning: std::time::Duration) -> Self {
        Self {
            mode,
            warning,
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Restart the round clock (called whenever cards are dealt).
    pub fn reset(&mut self) {
        self.started = Instant::now();
    }

    /// Whether the countdown has run out. Always false for elapsed and
    /// untimed modes.
    #[must_use]
    pub fn expired(&self) -> bool {
        match self.mode {
            TimerMode::Countdown(len) => self.started.elapsed() >= len,
            TimerMode::Elapsed | TimerMode::Untimed => false,
        }
    }

    /// Push the current display value. Untimed mode shows nothing.
    pub fn publish(&self, ui: &UiSender) {
        match self.mode {
            TimerMode::Countdown(len) => {
                let remaining = len.saturating_sub(self.started.elapsed());
                let warn = !remaining.is_zero() && remaining <= self.warning;
                ui.set_countdown(remaining.as_millis() as u64, warn);
            }
            TimerMode::Elapsed => {
                ui.set_elapsed(self.started.elapsed().as_millis() as u64);
            }
            TimerMode::Untimed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ui::{self, UiEvent};
    use std::time::Duration;

    #[test]
    fn countdown_expires_and_elapsed_never_does() {
        let countdown = RoundTimer::new(TimerMode::Countdown(Duration::ZERO), Duration::ZERO);
        assert!(countdown.expired());

        let fresh = RoundTimer::new(
            TimerMode::Countdown(Duration::from_secs(3600)),
            Duration::ZERO,
        );
        assert!(!fresh.expired());

        assert!(!RoundTimer::new(TimerMode::Elapsed, Duration::ZERO).expired());
        assert!(!RoundTimer::new(TimerMode::Untimed, Duration::ZERO).expired());
    }

    #[test]
    fn countdown_publishes_warning_inside_window() {
        let (ui_tx, mut rx) = ui::channel();
        let timer = RoundTimer::new(
            TimerMode::Countdown(Duration::from_millis(50)),
            Duration::from_secs(3600),
        );
        timer.publish(&ui_tx);
        match rx.try_recv().unwrap() {
            UiEvent::Countdown { warn, .. } => assert!(warn),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn expired_countdown_publishes_zero_without_warning() {
        let (ui_tx, mut rx) = ui::channel();
        let timer = RoundTimer::new(
            TimerMode::Countdown(Duration::ZERO),
            Duration::from_secs(3600),
        );
        timer.publish(&ui_tx);
        assert_eq!(
            rx.try_recv().unwrap(),
            UiEvent::Countdown {
                remaining_millis: 0,
                warn: false
            }
        );
    }

    #[test]
    fn untimed_publishes_nothing() {
        let (ui_tx, mut rx) = ui::channel();
        RoundTimer::new(TimerMode::Untimed, Duration::ZERO).publish(&ui_tx);
        assert!(rx.try_recv().is_err());
    }
}
