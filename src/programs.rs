//! The bundled catalog of example machines.
//!
//! The catalog is read-only: the texts are embedded at compile time and parsed once,
//! on first access, into shared definitions.

use crate::parser::parse;
use crate::types::{MachineDefinition, TuringMachineError};
use std::sync::Arc;

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str); 12] = [
    ("Parity of 1s", include_str!("../machines/parity.tm")),
    ("Simple palindrome", include_str!("../machines/palindrome.tm")),
    ("Duplicator", include_str!("../machines/duplicator.tm")),
    ("Binary complement", include_str!("../machines/complement.tm")),
    ("Equal zeros and ones (0^n1^n)", include_str!("../machines/zeros-then-ones-equal.tm")),
    ("Zeros before ones (0*1*)", include_str!("../machines/zeros-then-ones.tm")),
    ("Unary addition", include_str!("../machines/unary-addition.tm")),
    ("Binary doubling", include_str!("../machines/binary-double.tm")),
    ("End marker", include_str!("../machines/end-marker.tm")),
    ("Pattern 1*0*1*", include_str!("../machines/ones-zeros-ones.tm")),
    ("Eraser", include_str!("../machines/eraser.tm")),
    ("Shift right", include_str!("../machines/shift-right.tm")),
];

/// A bundled example machine.
#[derive(Debug, Clone)]
pub struct Program {
    pub name: &'static str,
    /// The specification text as shipped.
    pub text: &'static str,
    pub definition: Arc<MachineDefinition>,
}

lazy_static::lazy_static! {
    /// Every bundled program that parses, in catalog order.
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, text)| match parse(text) {
            Ok(definition) => Some(Program {
                name,
                text,
                definition: Arc::new(definition),
            }),
            Err(e) => {
                log::warn!("Skipping bundled program '{name}': {e}");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<&'static Program, TuringMachineError> {
        PROGRAMS.get(index).ok_or_else(|| {
            TuringMachineError::ProgramNotFound(format!("index {index} out of range"))
        })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<&'static Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| TuringMachineError::ProgramNotFound(format!("'{name}'")))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name.to_string(),
            start_state: program.definition.start_state.clone(),
            state_count: program.definition.states.len(),
            transition_count: program.definition.transition_count(),
        })
    }

    /// Search for programs by name, case-insensitively
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, program)| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub start_state: String,
    pub state_count: usize,
    pub transition_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze, AnalysisError};
    use crate::machine::TuringMachine;
    use crate::types::Outcome;

    fn run_program(name: &str, input: &str) -> TuringMachine {
        let program = ProgramManager::get_program_by_name(name).unwrap();
        let mut machine = TuringMachine::new(Arc::clone(&program.definition), input);
        machine.run(1000);
        machine
    }

    #[test]
    fn test_all_programs_parse() {
        assert_eq!(ProgramManager::get_program_count(), PROGRAM_TEXTS.len());
    }

    #[test]
    fn test_all_programs_declare_their_states() {
        for program in PROGRAMS.iter() {
            let findings: Vec<_> = analyze(&program.definition)
                .into_iter()
                .filter(|finding| !matches!(finding, AnalysisError::UnreachableStates(_)))
                .collect();
            assert!(findings.is_empty(), "{}: {findings:?}", program.name);
        }
    }

    #[test]
    fn test_program_names() {
        let names = ProgramManager::list_program_names();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "Parity of 1s");
        assert!(names.contains(&"Shift right"));
    }

    #[test]
    fn test_get_program_by_index() {
        assert!(ProgramManager::get_program_by_index(0).is_ok());

        let error = ProgramManager::get_program_by_index(999).unwrap_err();
        assert!(matches!(error, TuringMachineError::ProgramNotFound(_)));
    }

    #[test]
    fn test_get_program_by_name() {
        let program = ProgramManager::get_program_by_name("Binary complement").unwrap();
        assert!(program.text.contains("qback"));

        assert!(ProgramManager::get_program_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_get_program_info() {
        let info = ProgramManager::get_program_info(0).unwrap();

        assert_eq!(info.index, 0);
        assert_eq!(info.name, "Parity of 1s");
        assert_eq!(info.start_state, "qeven");
        assert_eq!(info.state_count, 4);
        assert_eq!(info.transition_count, 6);

        assert!(ProgramManager::get_program_info(999).is_err());
    }

    #[test]
    fn test_search_programs() {
        assert_eq!(ProgramManager::search_programs("PARITY"), vec![0]);
        assert_eq!(ProgramManager::search_programs("zeros").len(), 2);
        assert!(ProgramManager::search_programs("nonexistent").is_empty());
    }

    #[test]
    fn test_parity_program() {
        assert_eq!(
            run_program("Parity of 1s", "1001").result(),
            Some(Outcome::Accept)
        );
        assert_eq!(
            run_program("Parity of 1s", "1011").result(),
            Some(Outcome::Reject)
        );
    }

    #[test]
    fn test_complement_program() {
        let machine = run_program("Binary complement", "0110");

        assert_eq!(machine.result(), Some(Outcome::Accept));
        assert_eq!(machine.tape_contents(), "1001");
    }

    #[test]
    fn test_zeros_before_ones_program() {
        let name = "Zeros before ones (0*1*)";

        assert_eq!(run_program(name, "0011").result(), Some(Outcome::Accept));
        assert_eq!(run_program(name, "010").result(), Some(Outcome::Reject));
    }

    #[test]
    fn test_end_marker_program() {
        let machine = run_program("End marker", "01");

        assert_eq!(machine.result(), Some(Outcome::Accept));
        assert_eq!(machine.tape_contents(), "01#");
        assert_eq!(machine.head(), 2);
    }
}
