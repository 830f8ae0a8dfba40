//! Flat, self-contained snapshots of a machine and its definition.
//!
//! A snapshot is the only way execution state survives between independent invocations:
//! callers keep the JSON, and every operation rebuilds a [`TuringMachine`] from it.

use crate::machine::TuringMachine;
use crate::types::{Direction, MachineDefinition, Outcome, Transition, TuringMachineError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A serializable copy of a machine's definition and execution state.
///
/// Sets are stored as sorted sequences and transitions are keyed by `"state,symbol"`,
/// so two snapshots of equal machines serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub states: Vec<String>,
    pub input_symbols: Vec<char>,
    pub tape_symbols: Vec<char>,
    pub blank: char,
    pub transitions: BTreeMap<String, TransitionEntry>,
    pub start_state: String,
    pub accept_states: Vec<String>,
    pub reject_states: Vec<String>,
    pub tape: BTreeMap<i64, char>,
    pub head: i64,
    pub current_state: String,
    pub halted: bool,
    pub result: Option<Outcome>,
}

/// A transition as `[next_state, write, move]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEntry(pub String, pub char, pub Direction);

impl Snapshot {
    /// Captures the full state of `machine`.
    pub fn capture(machine: &TuringMachine) -> Self {
        let definition = machine.definition();

        Self {
            states: definition.states.iter().cloned().collect(),
            input_symbols: definition.input_symbols.iter().copied().collect(),
            tape_symbols: definition.tape_symbols.iter().copied().collect(),
            blank: definition.blank,
            transitions: definition
                .sorted_transitions()
                .into_iter()
                .map(|(state, read, t)| {
                    (
                        format!("{state},{read}"),
                        TransitionEntry(t.next_state.clone(), t.write, t.direction),
                    )
                })
                .collect(),
            start_state: definition.start_state.clone(),
            accept_states: definition.accept_states.iter().cloned().collect(),
            reject_states: definition.reject_states.iter().cloned().collect(),
            tape: machine.tape().clone(),
            head: machine.head(),
            current_state: machine.state().to_string(),
            halted: machine.is_halted(),
            result: machine.result(),
        }
    }

    /// Rebuilds the machine described by this snapshot.
    ///
    /// # Errors
    ///
    /// Returns `TuringMachineError::InvalidSnapshot` if a transition key is not
    /// `"state,symbol"` with a one-character symbol, or if `halted` disagrees with `result`.
    pub fn restore(self) -> Result<TuringMachine, TuringMachineError> {
        if self.halted != self.result.is_some() {
            return Err(TuringMachineError::InvalidSnapshot(format!(
                "halted is {} but result is {:?}",
                self.halted, self.result
            )));
        }

        let mut definition = MachineDefinition {
            states: self.states.into_iter().collect(),
            input_symbols: self.input_symbols.into_iter().collect(),
            tape_symbols: self.tape_symbols.into_iter().collect(),
            blank: self.blank,
            transitions: HashMap::new(),
            start_state: self.start_state,
            accept_states: self.accept_states.into_iter().collect(),
            reject_states: self.reject_states.into_iter().collect(),
        };

        for (key, TransitionEntry(next_state, write, direction)) in self.transitions {
            let (state, read) = split_transition_key(&key)?;
            definition.insert_transition(
                state.to_string(),
                read,
                Transition {
                    next_state,
                    write,
                    direction,
                },
            );
        }

        let blank = definition.blank;
        let tape = self
            .tape
            .into_iter()
            .filter(|&(_, symbol)| symbol != blank)
            .collect();

        Ok(TuringMachine::from_parts(
            Arc::new(definition),
            tape,
            self.head,
            self.current_state,
            self.result,
        ))
    }

    pub fn to_json(&self) -> Result<String, TuringMachineError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TuringMachineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Well-formed JSON that does not describe a snapshot (a multi-character
    /// blank or symbol, an unknown move or result tag, a missing field) is
    /// `TuringMachineError::InvalidSnapshot`. Malformed JSON is
    /// `TuringMachineError::Serialization`.
    pub fn from_json(json: &str) -> Result<Self, TuringMachineError> {
        serde_json::from_str(json).map_err(|e| {
            if e.is_data() {
                TuringMachineError::InvalidSnapshot(e.to_string())
            } else {
                e.into()
            }
        })
    }
}

impl From<&TuringMachine> for Snapshot {
    fn from(machine: &TuringMachine) -> Self {
        Snapshot::capture(machine)
    }
}

impl TryFrom<Snapshot> for TuringMachine {
    type Error = TuringMachineError;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        snapshot.restore()
    }
}

/// Splits `"state,symbol"` at its first comma.
fn split_transition_key(key: &str) -> Result<(&str, char), TuringMachineError> {
    let invalid = || TuringMachineError::InvalidSnapshot(format!("bad transition key {key:?}"));

    let (state, symbol) = key.split_once(',').ok_or_else(invalid)?;
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(read), None) => Ok((state, read)),
        _ => Err(invalid()),
    }
}
