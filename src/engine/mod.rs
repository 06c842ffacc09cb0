//! Execution engine and playback control.
//!
//! A [`Session`] ties an initialized level, a program and a [`History`] of
//! machine snapshots to a [`ControlState`]. Front ends send it
//! [`ControlAction`]s and render [`Snapshot`]s; the [`Player`] adds the
//! auto-play [`Scheduler`] on top.
//!
//! ```
//! use carry_vm::engine::{ControlAction, ProgramState, Session, Speed};
//! use carry_vm::isa::parse_program;
//! use carry_vm::level::Level;
//!
//! let level = Level::double().with_fixed_input(vec![21]).initialize().unwrap();
//! let program = parse_program("LOAD; COPY_TO 0; ADD 0; RETURN; JUMP 0").unwrap();
//!
//! let mut session = Session::new(level, program, Speed::default());
//! while !session.is_terminal() {
//!     session = session.apply(ControlAction::StepForward);
//! }
//! assert_eq!(*session.state(), ProgramState::Finished);
//! assert_eq!(session.current().output.len(), 1);
//! ```

pub mod action;
pub mod control;
pub mod history;
pub mod player;
pub mod scheduler;
pub mod session;
pub mod snapshot;

pub use action::{Action, ActionError, ControlAction};
pub use control::{ControlState, ProgramState, Speed};
pub use history::History;
pub use player::Player;
pub use scheduler::Scheduler;
pub use session::Session;
pub use snapshot::Snapshot;
