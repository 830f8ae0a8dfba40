//! Stateless operations over snapshots.
//!
//! Each function takes everything it needs and returns a new snapshot, so a surrounding
//! transport (CLI, HTTP handler) can advance machines without keeping any session.

use crate::machine::TuringMachine;
use crate::parser::parse;
use crate::snapshot::Snapshot;
use crate::types::{
    Cell, DefinitionSummary, MachineDefinition, RunRequest, SpecError, TuringMachineError,
    MAX_WINDOW_SPAN,
};
use std::sync::Arc;

/// Parses `spec` and summarizes the resulting definition.
pub fn validate(spec: &str) -> Result<DefinitionSummary, SpecError> {
    parse(spec).map(|definition| definition.summary())
}

/// Creates the initial snapshot of `definition` running on `input`.
pub fn initialize(definition: Arc<MachineDefinition>, input: &str) -> Snapshot {
    Snapshot::capture(&TuringMachine::new(definition, input))
}

/// Parses `spec` and initializes it with `input`.
pub fn load(spec: &str, input: &str) -> Result<Snapshot, TuringMachineError> {
    let definition = parse(spec)?;
    Ok(initialize(Arc::new(definition), input))
}

/// Applies a single step.
pub fn step(snapshot: Snapshot) -> Result<Snapshot, TuringMachineError> {
    let mut machine = snapshot.restore()?;
    machine.step();
    Ok(Snapshot::capture(&machine))
}

/// Executes `request` bounded by `max_steps`, returning the new snapshot and the
/// number of steps executed.
pub fn run(
    snapshot: Snapshot,
    request: RunRequest,
    max_steps: usize,
) -> Result<(Snapshot, usize), TuringMachineError> {
    let mut machine = snapshot.restore()?;
    let steps = machine.execute(request, max_steps);
    Ok((Snapshot::capture(&machine), steps))
}

/// Returns the `2 * span + 1` cells centred on the head, with `span` clamped to
/// [`MAX_WINDOW_SPAN`].
pub fn window(snapshot: &Snapshot, span: usize) -> Result<Vec<Cell>, TuringMachineError> {
    let machine = snapshot.clone().restore()?;
    Ok(machine.window_cells(span.min(MAX_WINDOW_SPAN)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Outcome, DEFAULT_MAX_STEPS, RUN_TO_HALT};

    const SHIFT_RIGHT: &str = r#"
states: q0,q1,q2,qaccept,qreject
blank: _
start: q0
accept: qaccept
reject: qreject
transitions:
q0,0 -> q1,_,R
q0,1 -> q2,_,R
q0,_ -> qaccept,_,N
q1,0 -> q1,0,R
q1,1 -> q1,1,R
q1,_ -> qaccept,0,N
q2,0 -> q2,0,R
q2,1 -> q2,1,R
q2,_ -> qaccept,1,N
"#;

    #[test]
    fn test_validate_summary() {
        let summary = validate(SHIFT_RIGHT).unwrap();

        assert_eq!(summary.states.len(), 5);
        assert_eq!(summary.transition_count, 9);
        assert_eq!(validate("states: q0"), Err(SpecError::MissingSection));
    }

    #[test]
    fn test_load_reports_spec_errors() {
        let error = load("blank: _\ntransitions:\n", "").unwrap_err();
        assert!(matches!(
            error,
            TuringMachineError::Spec(SpecError::MissingField(_))
        ));
    }

    #[test]
    fn test_step_through_snapshots() {
        let mut snapshot = load(SHIFT_RIGHT, "10").unwrap();
        assert_eq!(snapshot.tape.len(), 2);

        snapshot = step(snapshot).unwrap();
        assert_eq!(snapshot.current_state, "q2");
        assert_eq!(snapshot.head, 1);
        assert!(!snapshot.tape.contains_key(&0));
        assert!(!snapshot.halted);
    }

    #[test]
    fn test_run_to_halt() {
        let snapshot = load(SHIFT_RIGHT, "10").unwrap();

        let (snapshot, steps) =
            run(snapshot, RunRequest::from(RUN_TO_HALT), DEFAULT_MAX_STEPS).unwrap();

        assert_eq!(steps, 4);
        assert!(snapshot.halted);
        assert_eq!(snapshot.result, Some(Outcome::Accept));
        let machine = snapshot.restore().unwrap();
        assert_eq!(machine.tape_contents(), "01");
    }

    #[test]
    fn test_run_fixed_steps_matches_repeated_step() {
        let initial = load(SHIFT_RIGHT, "0110").unwrap();

        let mut stepped = initial.clone();
        for _ in 0..3 {
            stepped = step(stepped).unwrap();
        }
        let (ran, steps) = run(initial, RunRequest::Steps(3), DEFAULT_MAX_STEPS).unwrap();

        assert_eq!(steps, 3);
        assert_eq!(ran, stepped);
    }

    #[test]
    fn test_window_from_snapshot() {
        let snapshot = load(SHIFT_RIGHT, "1").unwrap();

        let cells = window(&snapshot, 1).unwrap();

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1].symbol, '1');
        assert!(cells[1].is_head);
        assert_eq!(cells[0].symbol, '_');
    }

    #[test]
    fn test_window_span_is_clamped() {
        let snapshot = load(SHIFT_RIGHT, "1").unwrap();

        let cells = window(&snapshot, usize::MAX).unwrap();

        assert_eq!(cells.len(), 2 * MAX_WINDOW_SPAN + 1);
        assert_eq!(cells.first().map(|c| c.position), Some(-(MAX_WINDOW_SPAN as i64)));
        assert!(cells[MAX_WINDOW_SPAN].is_head);
    }
}
