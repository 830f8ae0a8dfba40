//! This module provides consistency checks for parsed machine definitions.
//!
//! The parser accepts specifications whose start, accept, reject or transition states are
//! missing from `states:`, or whose accept and reject sets overlap. These checks report
//! such problems without changing what the parser accepts; callers opt into strictness.

use crate::types::{MachineDefinition, TuringMachineError};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// Represents the inconsistencies that can be found in a machine definition.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisError {
    /// The start state is not declared in `states:`.
    #[error("Start state is not declared: {0}")]
    UndeclaredStartState(String),
    /// Accept or reject states that are not declared in `states:`.
    #[error("Halting states are not declared: {0:?}")]
    UndeclaredHaltStates(Vec<String>),
    /// States used by transitions that are not declared in `states:`.
    #[error("Transitions reference undeclared states: {0:?}")]
    UndeclaredTransitionStates(Vec<String>),
    /// States listed as both accept and reject. They always accept.
    #[error("States are both accepting and rejecting: {0:?}")]
    OverlappingHaltStates(Vec<String>),
    /// Declared states that no sequence of transitions reaches from the start state.
    #[error("Unreachable states detected: {0:?}")]
    UnreachableStates(Vec<String>),
}

impl From<AnalysisError> for TuringMachineError {
    fn from(error: AnalysisError) -> Self {
        TuringMachineError::ValidationError(error.to_string())
    }
}

/// Runs every check on `definition` and returns all findings, in check order.
///
/// An empty result means the definition is fully consistent.
pub fn analyze(definition: &MachineDefinition) -> Vec<AnalysisError> {
    [
        check_start_state,
        check_halt_states,
        check_transition_states,
        check_overlapping_halt_states,
        check_unreachable_states,
    ]
    .iter()
    .filter_map(|check| check(definition).err())
    .collect()
}

/// Fails with the first finding of [`analyze`], if any.
pub fn check(definition: &MachineDefinition) -> Result<(), TuringMachineError> {
    match analyze(definition).into_iter().next() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn check_start_state(definition: &MachineDefinition) -> Result<(), AnalysisError> {
    if definition.states.contains(&definition.start_state) {
        Ok(())
    } else {
        Err(AnalysisError::UndeclaredStartState(
            definition.start_state.clone(),
        ))
    }
}

fn check_halt_states(definition: &MachineDefinition) -> Result<(), AnalysisError> {
    let undeclared = undeclared(
        definition,
        definition
            .accept_states
            .iter()
            .chain(&definition.reject_states)
            .map(String::as_str),
    );

    if undeclared.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UndeclaredHaltStates(undeclared))
    }
}

fn check_transition_states(definition: &MachineDefinition) -> Result<(), AnalysisError> {
    let undeclared = undeclared(
        definition,
        definition
            .sorted_transitions()
            .into_iter()
            .flat_map(|(state, _, t)| [state, t.next_state.as_str()]),
    );

    if undeclared.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UndeclaredTransitionStates(undeclared))
    }
}

fn check_overlapping_halt_states(definition: &MachineDefinition) -> Result<(), AnalysisError> {
    let overlapping: Vec<String> = definition
        .accept_states
        .intersection(&definition.reject_states)
        .cloned()
        .collect();

    if overlapping.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::OverlappingHaltStates(overlapping))
    }
}

/// Walks the transition graph from the start state. Accept and reject states
/// end a run, so their outgoing transitions are not followed.
fn check_unreachable_states(definition: &MachineDefinition) -> Result<(), AnalysisError> {
    let mut visited = HashSet::new();
    let mut queue = vec![definition.start_state.as_str()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        if definition.is_accepting(state) || definition.is_rejecting(state) {
            continue;
        }

        if let Some(row) = definition.transitions.get(state) {
            for transition in row.values() {
                if !visited.contains(transition.next_state.as_str()) {
                    queue.push(&transition.next_state);
                }
            }
        }
    }

    let unreachable: Vec<String> = definition
        .states
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect();

    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UnreachableStates(unreachable))
    }
}

/// Returns the sorted, deduplicated names in `names` missing from `states:`.
fn undeclared<'a>(
    definition: &MachineDefinition,
    names: impl Iterator<Item = &'a str>,
) -> Vec<String> {
    names
        .filter(|name| !definition.states.contains(*name))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
