//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! specifications from files and directories.

use crate::parser::parse;
use crate::types::{MachineDefinition, TuringMachineError};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of machine specification files.
pub const SPEC_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading machine specifications.
/// It loads a single file, or discovers and loads all `.tm` files within a directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single machine specification from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(MachineDefinition)` if the file is read and parsed successfully.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::Spec)` if the file content is not a valid specification.
    pub fn load_program(path: &Path) -> Result<MachineDefinition, TuringMachineError> {
        let content = Self::read_text(path)?;
        Ok(parse(&content)?)
    }

    /// Reads a specification file without parsing it.
    pub fn read_text(path: &Path) -> Result<String, TuringMachineError> {
        fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })
    }

    /// Loads every `.tm` file in `directory`.
    ///
    /// Directories and files with other extensions are skipped. Each loaded file
    /// yields its own result, carrying the same error `load_program` reports for it.
    pub fn load_programs(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, MachineDefinition), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir() || path.extension().is_none_or(|ext| ext != SPEC_EXTENSION) {
                    return None;
                }

                match Self::load_program(&path) {
                    Ok(definition) => Some(Ok((path, definition))),
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", path.display(), e);
                        Some(Err(e))
                    }
                }
            })
            .collect();

        // read_dir order is platform dependent
        results.sort_by_key(|result| result.as_ref().ok().map(|(path, _)| path.clone()));
        results
    }
}
