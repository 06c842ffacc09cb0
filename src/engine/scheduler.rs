//! Auto-play timer.
//!
//! The scheduler owns at most one deadline. It does not sleep or spawn; the
//! owner asks it for the next deadline, waits however it likes, then polls.

use std::time::{Duration, Instant};

use super::action::ControlAction;
use super::control::{ControlState, Speed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    deadline: Instant,
    speed: Speed,
}

/// Single outstanding step timer.
#[derive(Debug, Default)]
pub struct Scheduler {
    timer: Option<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay between automatic steps: `1000 / speed` ms.
    pub fn delay(speed: Speed) -> Duration {
        Duration::from_millis(1000 / u64::from(speed.get()))
    }

    /// Bring the timer in line with `control`.
    ///
    /// Not running: cancel. Running with a timer at the same speed: keep it.
    /// Otherwise arm a fresh timer from `now`.
    pub fn sync(&mut self, control: &ControlState, now: Instant) {
        if !control.is_running() {
            if self.timer.take().is_some() {
                log::trace!("Timer cancelled ({})", control.state.name());
            }
            return;
        }

        match self.timer {
            Some(timer) if timer.speed == control.speed => {}
            _ => {
                let deadline = now + Self::delay(control.speed);
                log::trace!("Timer armed for {:?} at speed {}", Self::delay(control.speed), control.speed);
                self.timer = Some(Timer {
                    deadline,
                    speed: control.speed,
                });
            }
        }
    }

    /// Fire the timer if its deadline has passed. Fires once; the owner
    /// re-arms with [`Scheduler::sync`] after applying the step.
    pub fn poll(&mut self, now: Instant) -> Option<ControlAction> {
        match self.timer {
            Some(timer) if now >= timer.deadline => {
                self.timer = None;
                Some(ControlAction::StepForward)
            }
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.map(|timer| timer.deadline)
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn cancel(&mut self) {
        self.timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProgramState;

    fn running(speed: u8) -> ControlState {
        let mut control = ControlState::new(Speed::try_from(speed).unwrap());
        control.state = ProgramState::Running;
        control
    }

    #[test]
    fn test_delay() {
        assert_eq!(Scheduler::delay(Speed::MIN), Duration::from_millis(1000));
        assert_eq!(Scheduler::delay(Speed::default()), Duration::from_millis(500));
        assert_eq!(Scheduler::delay(Speed::try_from(3).unwrap()), Duration::from_millis(333));
        assert_eq!(Scheduler::delay(Speed::MAX), Duration::from_millis(100));
    }

    #[test]
    fn test_fires_once_after_deadline() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.sync(&running(10), t0);
        assert_eq!(scheduler.next_deadline(), Some(t0 + Duration::from_millis(100)));

        assert_eq!(scheduler.poll(t0 + Duration::from_millis(99)), None);
        assert_eq!(
            scheduler.poll(t0 + Duration::from_millis(100)),
            Some(ControlAction::StepForward)
        );
        assert_eq!(scheduler.poll(t0 + Duration::from_millis(500)), None);
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn test_sync_keeps_existing_timer() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.sync(&running(2), t0);
        scheduler.sync(&running(2), t0 + Duration::from_millis(300));
        assert_eq!(scheduler.next_deadline(), Some(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_speed_change_rearms() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.sync(&running(1), t0);
        let later = t0 + Duration::from_millis(200);
        scheduler.sync(&running(5), later);
        assert_eq!(scheduler.next_deadline(), Some(later + Duration::from_millis(200)));
    }

    #[test]
    fn test_leaving_running_cancels() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.sync(&running(4), t0);

        let mut paused = running(4);
        paused.state = ProgramState::Paused;
        scheduler.sync(&paused, t0);
        assert_eq!(scheduler.next_deadline(), None);
        assert_eq!(scheduler.poll(t0 + Duration::from_secs(5)), None);
    }
}
