//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including the machine definition, transitions, execution outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// The blank symbol used when a specification declares an empty `blank:` value.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// Input symbols assumed when no transition reads a non-blank symbol.
pub const DEFAULT_INPUT_SYMBOLS: [char; 2] = ['0', '1'];
/// The default step budget for `run`.
pub const DEFAULT_MAX_STEPS: usize = 1000;
/// The default number of cells shown on each side of the head.
pub const DEFAULT_WINDOW_SPAN: usize = 25;
/// The widest span a window request is served with; larger requests are clamped.
pub const MAX_WINDOW_SPAN: usize = 10_000;
/// Wire value of a step count meaning "run until the machine halts".
pub const RUN_TO_HALT: i64 = -1;

/// A validated, immutable single-tape Turing machine.
///
/// Built once by [`crate::parser::parse`] (or rebuilt from a snapshot) and shared
/// read-only by every machine executing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineDefinition {
    /// Declared state identifiers.
    pub states: BTreeSet<String>,
    /// Non-blank symbols read by at least one transition.
    pub input_symbols: BTreeSet<char>,
    /// Every symbol read or written by a transition, plus the blank.
    pub tape_symbols: BTreeSet<char>,
    /// The symbol held by every cell that was never written.
    pub blank: char,
    /// Transition table indexed by current state, then by the symbol under the head.
    pub transitions: HashMap<String, HashMap<char, Transition>>,
    pub start_state: String,
    pub accept_states: BTreeSet<String>,
    pub reject_states: BTreeSet<String>,
}

impl MachineDefinition {
    /// Looks up the transition for `state` reading `symbol`.
    pub fn transition(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.transitions.get(state)?.get(&symbol)
    }

    /// Inserts a transition, replacing any earlier entry with the same key.
    pub fn insert_transition(&mut self, state: String, read: char, transition: Transition) {
        self.transitions
            .entry(state)
            .or_default()
            .insert(read, transition);
    }

    /// Returns the number of distinct `(state, symbol)` keys in the table.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(HashMap::len).sum()
    }

    /// Iterates over all transitions as `(state, read, transition)`, sorted by key.
    pub fn sorted_transitions(&self) -> Vec<(&str, char, &Transition)> {
        let mut entries: Vec<_> = self
            .transitions
            .iter()
            .flat_map(|(state, row)| {
                row.iter()
                    .map(move |(&read, transition)| (state.as_str(), read, transition))
            })
            .collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        entries
    }

    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    pub fn is_rejecting(&self, state: &str) -> bool {
        self.reject_states.contains(state)
    }

    /// Summarizes the definition the way a validation response reports it.
    pub fn summary(&self) -> DefinitionSummary {
        DefinitionSummary {
            states: self.states.iter().cloned().collect(),
            transition_count: self.transition_count(),
        }
    }
}

/// A short description of a successfully parsed definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionSummary {
    pub states: Vec<String>,
    pub transition_count: usize,
}

/// The right-hand side of a transition rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine moves to.
    pub next_state: String,
    /// The symbol written under the head before it moves.
    pub write: char,
    /// Where the head moves after writing.
    pub direction: Direction,
}

/// Head movement after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one cell to the left.
    #[serde(rename = "L")]
    Left,
    /// Move the head one cell to the right.
    #[serde(rename = "R")]
    Right,
    /// Keep the head on the same cell.
    #[serde(rename = "N")]
    Stay,
}

impl Direction {
    /// The change applied to the head position.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }

    /// The token used for this direction in specification text.
    pub fn as_char(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'N',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Why a machine halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The machine entered an accept state.
    Accept,
    /// The machine entered a reject state.
    Reject,
    /// No rule exists for the current state and symbol.
    NoTransition,
    /// `run` exhausted its step budget before the machine halted.
    MaxSteps,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Accept => "ACCEPT",
            Outcome::Reject => "REJECT",
            Outcome::NoTransition => "NO_TRANSITION",
            Outcome::MaxSteps => "MAX_STEPS",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition was applied and the machine keeps running.
    Continue,
    /// The machine is halted with the given outcome.
    Halt(Outcome),
}

/// How many steps a caller asks `run` to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRequest {
    /// Execute at most this many steps, further clamped by the step budget.
    Steps(usize),
    /// Execute until the machine halts or the step budget is exhausted.
    ToHalt,
}

impl From<i64> for RunRequest {
    fn from(steps: i64) -> Self {
        if steps == RUN_TO_HALT {
            RunRequest::ToHalt
        } else {
            RunRequest::Steps(usize::try_from(steps).unwrap_or(0))
        }
    }
}

/// One visible tape cell around the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub position: i64,
    pub symbol: char,
    pub is_head: bool,
}

/// Structural problems in a machine specification text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("Specification requires a 'transitions:' section")]
    MissingSection,
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Field 'blank' must contain exactly one character, got {0:?}")]
    InvalidBlank(String),
    #[error("Invalid transition line: {0}")]
    InvalidTransitionLine(String),
    #[error("Invalid move in: {0} (expected L, R or N)")]
    InvalidMove(String),
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Error)]
pub enum TuringMachineError {
    /// The machine specification text is malformed.
    #[error("Specification error: {0}")]
    Spec(#[from] SpecError),
    /// The definition failed a strict consistency check.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// A snapshot does not describe a valid machine.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    /// A snapshot could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Indicates an error related to file system operations, such as reading specification files.
    #[error("File error: {0}")]
    FileError(String),
    /// A bundled example program was requested that does not exist.
    #[error("Program not found: {0}")]
    ProgramNotFound(String),
}
