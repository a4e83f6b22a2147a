//! Source-level debug metadata attached to a module

use crate::traits::DebugInfoQuery;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Debug metadata for a module: one entry per compilation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    #[serde(default)]
    pub compile_units: Vec<CompileUnit>,
}

/// A compilation unit and the subprograms it describes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileUnit {
    /// Tool that produced the unit
    #[serde(default)]
    pub producer: Option<String>,
    /// Compilation directory
    pub directory: String,
    /// Primary source file
    pub filename: String,
    #[serde(default)]
    subprograms: Vec<Subprogram>,
}

impl CompileUnit {
    pub fn new(directory: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            producer: None,
            directory: directory.into(),
            filename: filename.into(),
            subprograms: Vec::new(),
        }
    }

    /// Subprograms described by this compilation unit
    pub fn subprograms(&self) -> &[Subprogram] {
        &self.subprograms
    }

    /// Add a subprogram to this compilation unit
    pub fn add_subprogram(&mut self, subprogram: Subprogram) {
        self.subprograms.push(subprogram);
    }

    /// Builder-style variant of [`CompileUnit::add_subprogram`]
    pub fn with_subprogram(mut self, subprogram: Subprogram) -> Self {
        self.subprograms.push(subprogram);
        self
    }

    /// Subprogram attached to the named IR function
    pub fn subprogram_for(&self, function: &str) -> Option<&Subprogram> {
        self.subprograms
            .iter()
            .find(|sp| sp.function.as_deref() == Some(function))
    }

    /// Resolve a subprogram's location, inheriting the unit's file when the
    /// subprogram does not name its own
    pub fn location_of(&self, subprogram: &Subprogram) -> SourceLocation {
        SourceLocation {
            directory: subprogram
                .directory
                .clone()
                .unwrap_or_else(|| self.directory.clone()),
            filename: subprogram
                .filename
                .clone()
                .unwrap_or_else(|| self.filename.clone()),
            line: subprogram.line,
        }
    }
}

/// Debug description of one source function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subprogram {
    /// Source-level name
    pub name: String,
    /// IR function this subprogram describes. `None` once the function is gone.
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    pub line: u32,
}

impl Subprogram {
    /// Subprogram for `function`, defined at `line` of the unit's file
    pub fn new(function: impl Into<String>, line: u32) -> Self {
        let function = function.into();
        Self {
            name: function.clone(),
            function: Some(function),
            directory: None,
            filename: None,
            line,
        }
    }

    /// Override the file this subprogram is defined in
    pub fn in_file(mut self, directory: impl Into<String>, filename: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self.filename = Some(filename.into());
        self
    }
}

/// Resolved definition site of a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub directory: String,
    pub filename: String,
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.directory, self.filename, self.line)
    }
}

impl DebugInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style addition of a compilation unit
    pub fn with_unit(mut self, unit: CompileUnit) -> Self {
        self.compile_units.push(unit);
        self
    }
}

impl DebugInfoQuery for DebugInfo {
    fn function_location(&self, function: &str) -> Option<SourceLocation> {
        self.compile_units.iter().find_map(|unit| {
            unit.subprogram_for(function)
                .map(|subprogram| unit.location_of(subprogram))
        })
    }
}

#[cfg(test)]
#[path = "debug_info_tests.rs"]
mod tests;
