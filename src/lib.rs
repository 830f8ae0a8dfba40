//! This crate provides the core logic for a single-tape deterministic Turing machine simulator.
//! It includes modules for parsing machine specifications, executing them step by step over a
//! sparse unbounded tape, carrying execution state across invocations as snapshots, checking
//! definitions for consistency, and a catalog of bundled example machines.

pub mod analyzer;
pub mod engine;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod snapshot;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `Program`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `Snapshot` struct from the snapshot module.
pub use snapshot::Snapshot;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Cell, Direction, MachineDefinition, Outcome, RunRequest, SpecError, Step, Transition,
    TuringMachineError,
};
