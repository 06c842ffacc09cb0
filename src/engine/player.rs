//! Session driver: routes actions and timer ticks into one session.

use std::thread;
use std::time::Instant;

use super::action::{Action, ControlAction};
use super::scheduler::Scheduler;
use super::session::Session;
use super::snapshot::Snapshot;

/// Owns a session and its timer.
///
/// Every action goes through [`Player::dispatch`], which re-syncs the timer
/// afterwards, so a pause, reset or speed change never leaves a stale step
/// pending.
#[derive(Debug)]
pub struct Player {
    session: Session,
    scheduler: Scheduler,
}

impl Player {
    pub fn new(session: Session) -> Self {
        let mut player = Self {
            session,
            scheduler: Scheduler::new(),
        };
        player.resync(Instant::now());
        player
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn resync(&mut self, now: Instant) {
        self.scheduler.sync(self.session.control(), now);
    }

    /// Apply a user action now.
    pub fn dispatch(&mut self, action: impl Into<Action>) {
        self.dispatch_at(action, Instant::now());
    }

    pub fn dispatch_at(&mut self, action: impl Into<Action>, now: Instant) {
        self.session.update(action);
        self.resync(now);
    }

    /// Apply the scheduled step if it is due. Returns true when a step ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.scheduler.poll(now) {
            Some(action) => {
                self.dispatch_at(action, now);
                true
            }
            None => false,
        }
    }

    /// Sleep through each deadline until the session stops running.
    /// `on_step` sees the snapshot after every scheduled step.
    pub fn run_until_idle(&mut self, mut on_step: impl FnMut(&Snapshot)) {
        while let Some(deadline) = self.scheduler.next_deadline() {
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
            if self.tick(Instant::now()) {
                on_step(&self.session.snapshot());
            }
        }
    }

    /// Step without timers until the session is terminal or `max_steps`
    /// steps ran. Returns the number of steps taken.
    pub fn run_to_end(&mut self, max_steps: usize, mut on_step: impl FnMut(&Snapshot)) -> usize {
        self.scheduler.cancel();
        let mut steps = 0;
        while steps < max_steps && self.session.accepts(&ControlAction::StepForward) {
            self.session.update(ControlAction::StepForward);
            steps += 1;
            on_step(&self.session.snapshot());
        }
        if steps == max_steps && !self.session.is_terminal() {
            log::warn!("Stopped after {} steps without finishing", max_steps);
        }
        self.resync(Instant::now());
        steps
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if self.scheduler.is_armed() {
            log::debug!("Player dropped with a pending step; cancelling");
            self.scheduler.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ProgramState, Speed};
    use crate::isa::parse_program;
    use crate::level::Level;
    use std::time::Duration;

    fn player(inputs: Vec<i64>, speed: u8) -> Player {
        let level = Level::double().with_fixed_input(inputs).initialize().unwrap();
        let program = parse_program("LOAD; COPY_TO 0; ADD 0; RETURN; JUMP 0").unwrap();
        Player::new(Session::new(level, program, Speed::try_from(speed).unwrap()))
    }

    #[test]
    fn test_play_arms_timer() {
        let mut p = player(vec![1], 10);
        assert!(!p.scheduler().is_armed());

        let t0 = Instant::now();
        p.dispatch_at(ControlAction::Play, t0);
        assert_eq!(p.scheduler().next_deadline(), Some(t0 + Duration::from_millis(100)));

        assert!(!p.tick(t0 + Duration::from_millis(50)));
        assert!(p.tick(t0 + Duration::from_millis(100)));
        assert_eq!(p.session().history().len(), 2);
        // Re-armed from the tick time.
        assert_eq!(p.scheduler().next_deadline(), Some(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_pause_cancels_pending_step() {
        let mut p = player(vec![1], 10);
        let t0 = Instant::now();
        p.dispatch_at(ControlAction::Play, t0);
        p.dispatch_at(ControlAction::Pause, t0 + Duration::from_millis(10));

        assert!(!p.scheduler().is_armed());
        assert!(!p.tick(t0 + Duration::from_secs(1)));
        assert_eq!(p.session().history().len(), 1);
    }

    #[test]
    fn test_reset_cancels_pending_step() {
        let mut p = player(vec![1], 10);
        let t0 = Instant::now();
        p.dispatch_at(ControlAction::Play, t0);
        p.dispatch_at(ControlAction::Reset, t0);
        assert_eq!(*p.session().state(), ProgramState::Pending);
        assert!(!p.scheduler().is_armed());
    }

    #[test]
    fn test_timer_stops_when_finished() {
        let mut p = player(vec![1, 2], 10);
        let mut now = Instant::now();
        p.dispatch_at(ControlAction::Play, now);
        for _ in 0..50 {
            now += Duration::from_millis(100);
            p.tick(now);
        }
        assert_eq!(*p.session().state(), ProgramState::Finished);
        assert!(!p.scheduler().is_armed());
    }

    #[test]
    fn test_run_until_idle_real_time() {
        let mut p = player(vec![3], 10);
        p.dispatch(ControlAction::Play);
        let mut seen = 0;
        p.run_until_idle(|_| seen += 1);
        assert_eq!(*p.session().state(), ProgramState::Finished);
        // Five executed instructions plus the terminating Load.
        assert_eq!(seen, 6);
    }

    #[test]
    fn test_run_to_end() {
        let mut p = player(vec![4, 5, 6], 1);
        let steps = p.run_to_end(1000, |_| {});
        assert_eq!(steps, 16);
        assert_eq!(*p.session().state(), ProgramState::Finished);

        let mut p = player(vec![4, 5, 6], 1);
        assert_eq!(p.run_to_end(3, |_| {}), 3);
        assert_eq!(*p.session().state(), ProgramState::Running);
        // Still running, so the timer picks up where the batch stopped.
        assert!(p.scheduler().is_armed());
    }
}
