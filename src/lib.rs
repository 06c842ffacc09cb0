//! carry-vm library
//!
//! A step-through puzzle machine: one carry register, a few memory cells,
//! an input queue consumed from the tail and an output queue checked against
//! the level's expected values. Every executed instruction produces a new
//! snapshot, so a run can be rewound and replayed without re-executing.
//!
//! - [`machine`]: byte values, machine snapshots, execution errors
//! - [`isa`]: instruction set and per-opcode rules
//! - [`level`]: puzzle definitions and the built-in catalog
//! - [`engine`]: sessions, history, control state, scheduler
//! - [`config`]: layered configuration

pub mod config;
pub mod engine;
pub mod isa;
pub mod level;
pub mod machine;

mod property_tests;
