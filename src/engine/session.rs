//! Session: execution engine, time travel and control transitions.

use std::sync::Arc;

use crate::isa::{execute, format_program, Instruction, Outcome};
use crate::level::InitializedLevel;
use crate::machine::{ExecError, MachineState};

use super::action::{Action, ControlAction};
use super::control::{ControlState, ProgramState, Speed};
use super::history::History;
use super::snapshot::Snapshot;

/// One run of a program against an initialized level.
///
/// Sessions are values: [`Session::apply`] consumes the session and returns
/// its successor. Snapshots already in the history are shared between
/// successors and never rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    level: Arc<InitializedLevel>,
    control: ControlState,
    history: History,
}

impl Session {
    /// Start a run in `Pending` with only the initial snapshot.
    pub fn new(level: InitializedLevel, program: impl Into<Arc<[Instruction]>>, speed: Speed) -> Self {
        let program = program.into();

        let disallowed = level.instructions.disallowed_in(&program);
        if !disallowed.is_empty() {
            let names: Vec<&str> = disallowed.iter().map(|op| op.mnemonic()).collect();
            log::warn!(
                "Program uses instructions not enabled for level {}: {}",
                level.name,
                names.join(", ")
            );
        }
        log::debug!("New session on {}:\n{}", level.name, format_program(&program));

        let initial = level.initial_state(program);
        Self {
            level: Arc::new(level),
            control: ControlState::new(speed),
            history: History::new(initial),
        }
    }

    pub fn level(&self) -> &InitializedLevel {
        &self.level
    }

    pub fn control(&self) -> &ControlState {
        &self.control
    }

    pub fn state(&self) -> &ProgramState {
        &self.control.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Machine state under the cursor.
    pub fn current(&self) -> &Arc<MachineState> {
        self.history.current()
    }

    pub fn is_terminal(&self) -> bool {
        self.control.state.is_terminal()
    }

    /// Whether a front end should enable `action` right now.
    pub fn accepts(&self, action: &ControlAction) -> bool {
        let can_replay = !self.history.at_live_edge();

        match (action, &self.control.state) {
            (ControlAction::Reset, _) => true,
            (ControlAction::StepBackward, _) => self.history.cursor() > 0,
            // Faulted runs only allow moving through what was recorded.
            (ControlAction::StepForward, ProgramState::Error(_)) => can_replay,
            (_, ProgramState::Error(_)) => false,
            (ControlAction::Play, state) => matches!(state, ProgramState::Pending | ProgramState::Paused),
            (ControlAction::Pause, state) => *state == ProgramState::Running,
            (ControlAction::StepForward, ProgramState::Finished) => can_replay,
            (ControlAction::StepForward, _) => true,
            (ControlAction::SetSpeed { .. }, _) => true,
        }
    }

    /// Apply a protocol message and return the successor session.
    pub fn apply(mut self, action: impl Into<Action>) -> Self {
        self.update(action);
        self
    }

    /// In-place form of [`Session::apply`], for an owner that holds the
    /// session across many actions. Rejected or non-control messages leave
    /// the session unchanged.
    pub fn update(&mut self, action: impl Into<Action>) {
        match action.into() {
            Action::Control(control) => self.control_action(control),
            Action::Instruction(instr) => {
                log::warn!("Ignoring {}: instructions are executed by the engine only", instr);
            }
        }
    }

    fn control_action(&mut self, action: ControlAction) {
        if !self.accepts(&action) {
            log::debug!("Rejected {} in state {}", action, self.control.state.name());
            return;
        }

        match action {
            ControlAction::Play => self.set_state(ProgramState::Running),
            ControlAction::Pause => self.set_state(ProgramState::Paused),
            ControlAction::StepForward => self.step_forward(),
            ControlAction::StepBackward => {
                self.history.back();
            }
            ControlAction::Reset => self.reset(),
            ControlAction::SetSpeed { speed } => self.control.speed = speed,
        }
    }

    fn set_state(&mut self, state: ProgramState) {
        self.control.state = state;
    }

    /// Replay the next recorded entry, or execute one instruction at the
    /// live edge.
    fn step_forward(&mut self) {
        if !self.history.replay() {
            self.step();
        }
    }

    /// Back to the initial snapshot and `Pending`. Level and speed survive.
    fn reset(&mut self) {
        log::debug!("Reset after {} recorded steps", self.history.len() - 1);
        self.history.reset();
        self.set_state(ProgramState::Pending);
    }

    /// Execute the instruction at the stack pointer.
    ///
    /// A faulted session is inert. Behind the live edge the next recorded
    /// entry is replayed instead, since executing would reproduce it.
    pub fn step(&mut self) {
        if let ProgramState::Error(_) = self.control.state {
            return;
        }
        if self.history.replay() {
            return;
        }

        let game = Arc::clone(self.history.current());
        let Some(instr) = game.current_instruction() else {
            if game.input.is_empty() {
                self.finish();
            } else {
                self.fault(ExecError::UnprocessedInput);
            }
            return;
        };

        match execute(instr, &game, &self.level.output) {
            Outcome::Next(next) => {
                log::debug!(
                    "step {}: {} at {} -> sp {}",
                    next.step_counter,
                    instr,
                    game.stack_pointer,
                    next.stack_pointer
                );
                self.history.push(next);
                if self.control.state == ProgramState::Pending {
                    self.set_state(ProgramState::Running);
                }
            }
            Outcome::Finished => self.finish(),
            Outcome::Fault(err) => self.fault(err),
        }
    }

    fn finish(&mut self) {
        let current = self.history.current();
        log::info!(
            "Level {} finished after {} steps with {} outputs",
            self.level.name,
            current.step_counter,
            current.output.len()
        );
        self.set_state(ProgramState::Finished);
    }

    fn fault(&mut self, err: ExecError) {
        log::warn!(
            "Level {} faulted at sp {}: {}",
            self.level.name,
            self.history.current().stack_pointer,
            err
        );
        self.set_state(ProgramState::Error(err));
    }

    /// Read-only view of the current frame.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            level: self.level.name,
            machine: Arc::clone(self.history.current()),
            state: self.control.state.name(),
            error: self.control.state.error().map(|err| err.to_string()),
            speed: self.control.speed,
            cursor: self.history.cursor(),
            history_len: self.history.len(),
            instructions: self.level.instructions,
            expected_output: self.level.output.clone(),
        }
    }
}
