//! This module defines the `TuringMachine` struct, the mutable execution state of a single-tape
//! machine. It owns a sparse tape, the head position and the control state, and applies the
//! transition table of a shared [`MachineDefinition`] one step at a time.

use crate::types::{Cell, MachineDefinition, Outcome, RunRequest, Step, Transition};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The mutable state of one executing machine.
///
/// The tape is unbounded in both directions. Only non-blank cells are stored; every
/// other position reads as the definition's blank. Once halted, the machine is frozen
/// and further steps are no-ops.
#[derive(Debug, Clone, PartialEq)]
pub struct TuringMachine {
    definition: Arc<MachineDefinition>,
    tape: BTreeMap<i64, char>,
    head: i64,
    state: String,
    result: Option<Outcome>,
}

impl TuringMachine {
    /// Creates a machine for `definition` with `input` written on cells `0..len`.
    ///
    /// Input characters are not checked against the definition's input symbols.
    pub fn new(definition: Arc<MachineDefinition>, input: &str) -> Self {
        let mut machine = Self {
            state: definition.start_state.clone(),
            definition,
            tape: BTreeMap::new(),
            head: 0,
            result: None,
        };
        machine.reset(input);
        machine
    }

    /// Rebuilds a machine from already validated parts.
    pub(crate) fn from_parts(
        definition: Arc<MachineDefinition>,
        tape: BTreeMap<i64, char>,
        head: i64,
        state: String,
        result: Option<Outcome>,
    ) -> Self {
        Self {
            definition,
            tape,
            head,
            state,
            result,
        }
    }

    /// Clears the tape, writes `input` from cell 0, and returns the head and
    /// control state to their initial values.
    pub fn reset(&mut self, input: &str) {
        let blank = self.definition.blank;

        self.tape = input
            .chars()
            .zip(0i64..)
            .filter(|&(symbol, _)| symbol != blank)
            .map(|(symbol, position)| (position, symbol))
            .collect();
        self.head = 0;
        self.state = self.definition.start_state.clone();
        self.result = None;
    }

    /// Executes a single step.
    ///
    /// Accept and reject states are checked when a step begins, before the
    /// transition table is consulted; a state in both sets accepts. A missing
    /// rule, or a move past the last addressable cell, halts the machine with
    /// [`Outcome::NoTransition`] and leaves the tape and head untouched.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = self.result {
            return Step::Halt(outcome);
        }

        let definition = Arc::clone(&self.definition);

        if definition.is_accepting(&self.state) {
            return self.halt(Outcome::Accept);
        }
        if definition.is_rejecting(&self.state) {
            return self.halt(Outcome::Reject);
        }

        let symbol = self.read();
        let Some(transition) = definition.transition(&self.state, symbol) else {
            return self.halt(Outcome::NoTransition);
        };
        let Some(head) = self.head.checked_add(transition.direction.offset()) else {
            log::warn!("Head at {} cannot move {}", self.head, transition.direction);
            return self.halt(Outcome::NoTransition);
        };

        log::trace!(
            "({}, {:?}) at {} -> ({}, {:?}, {})",
            self.state,
            symbol,
            self.head,
            transition.next_state,
            transition.write,
            transition.direction
        );

        self.write(transition.write);
        self.head = head;
        self.state.clone_from(&transition.next_state);

        Step::Continue
    }

    /// Steps until the machine halts or `max_steps` steps have run, and returns
    /// the number of steps executed.
    ///
    /// If a positive budget runs out first, the machine is halted with
    /// [`Outcome::MaxSteps`]. A budget of zero executes nothing and leaves the
    /// machine as it was.
    pub fn run(&mut self, max_steps: usize) -> usize {
        self.run_with(max_steps, |_| {})
    }

    /// Same as [`run`](Self::run), calling `observe` after every executed step.
    pub fn run_with(&mut self, max_steps: usize, mut observe: impl FnMut(&Self)) -> usize {
        let mut steps = 0;

        while !self.is_halted() && steps < max_steps {
            self.step();
            steps += 1;
            observe(self);
        }

        if !self.is_halted() && max_steps > 0 {
            self.halt(Outcome::MaxSteps);
        }

        log::debug!(
            "Run finished after {steps} steps in state {} ({:?})",
            self.state,
            self.result
        );

        steps
    }

    /// Executes a caller's run request bounded by `max_steps`.
    ///
    /// [`RunRequest::ToHalt`] behaves like [`run`](Self::run). A fixed step count
    /// executes at most `min(steps, max_steps)` steps, stops early if the machine
    /// halts, and never marks the machine as out of budget.
    pub fn execute(&mut self, request: RunRequest, max_steps: usize) -> usize {
        match request {
            RunRequest::ToHalt => self.run(max_steps),
            RunRequest::Steps(steps) => {
                let mut executed = 0;
                for _ in 0..steps.min(max_steps) {
                    if self.is_halted() {
                        break;
                    }
                    self.step();
                    executed += 1;
                }
                executed
            }
        }
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> char {
        self.symbol_at(self.head)
    }

    /// Writes `symbol` under the head. Writing the blank removes the cell.
    pub fn write(&mut self, symbol: char) {
        if symbol == self.definition.blank {
            self.tape.remove(&self.head);
        } else {
            self.tape.insert(self.head, symbol);
        }
    }

    /// Returns the symbol at `position`, or the blank if it was never written.
    pub fn symbol_at(&self, position: i64) -> char {
        self.tape
            .get(&position)
            .copied()
            .unwrap_or(self.definition.blank)
    }

    /// Returns the cells from `head - span` to `head + span` inclusive.
    ///
    /// Each call builds a fresh iterator over the current tape.
    pub fn window_cells(&self, span: usize) -> impl Iterator<Item = Cell> + '_ {
        let span = i64::try_from(span).unwrap_or(i64::MAX);
        let head = self.head;

        (head.saturating_sub(span)..=head.saturating_add(span)).map(move |position| Cell {
            position,
            symbol: self.symbol_at(position),
            is_head: position == head,
        })
    }

    /// Returns the transition the next step would apply, if any.
    pub fn next_transition(&self) -> Option<&Transition> {
        if self.is_halted()
            || self.definition.is_accepting(&self.state)
            || self.definition.is_rejecting(&self.state)
        {
            return None;
        }

        self.definition.transition(&self.state, self.read())
    }

    /// Renders the written region of the tape, from the leftmost to the
    /// rightmost non-blank cell.
    pub fn tape_contents(&self) -> String {
        match (self.tape.keys().next(), self.tape.keys().next_back()) {
            (Some(&first), Some(&last)) => (first..=last).map(|p| self.symbol_at(p)).collect(),
            _ => String::new(),
        }
    }

    pub fn definition(&self) -> &MachineDefinition {
        &self.definition
    }

    /// Returns the non-blank cells of the tape.
    pub fn tape(&self) -> &BTreeMap<i64, char> {
        &self.tape
    }

    pub fn head(&self) -> i64 {
        self.head
    }

    /// Returns the current control state.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn blank(&self) -> char {
        self.definition.blank
    }

    pub fn is_halted(&self) -> bool {
        self.result.is_some()
    }

    /// Returns why the machine halted, or `None` while it is running.
    pub fn result(&self) -> Option<Outcome> {
        self.result
    }

    fn halt(&mut self, outcome: Outcome) -> Step {
        log::trace!("Halted in state {} with {outcome}", self.state);
        self.result = Some(outcome);
        Step::Halt(outcome)
    }
}
