//! Pass registration by name

use crate::passes::find_loops::FindLoopsPass;
use crate::passes::function_line_number::FunctionLineNumberPass;
use crate::passes::function_names::FunctionNamesPass;
use crate::passes::scoped_inline::ScopedInlinePass;
use crate::passes::ModulePass;
use passforge_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Options passed to pass constructors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PassOptions {
    /// Target of `all-inline`
    pub inline_only_in_function: Option<String>,
    /// Target of `function-line-number`
    pub function_name: Option<String>,
}

/// Constructor for a registered pass
pub type PassFactory = Arc<dyn Fn(&PassOptions) -> Result<Box<dyn ModulePass>> + Send + Sync>;

/// One registered pass
#[derive(Clone)]
pub struct PassRegistration {
    pub name: String,
    pub description: String,
    factory: PassFactory,
}

impl PassRegistration {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        factory: PassFactory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            factory,
        }
    }

    /// Construct the pass, validating its required options
    pub fn create(&self, options: &PassOptions) -> Result<Box<dyn ModulePass>> {
        (self.factory)(options)
    }
}

impl fmt::Debug for PassRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassRegistration")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Registered passes, in registration order
#[derive(Debug, Clone, Default)]
pub struct PassRegistry {
    passes: Vec<PassRegistration>,
}

impl PassRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four built-in passes
    pub fn with_builtin_passes() -> Self {
        let mut registry = Self::new();
        registry.register(PassRegistration::new(
            "find-loops",
            "Find Loops Pass: prints a list of all functions with loops",
            Arc::new(|_: &PassOptions| -> Result<Box<dyn ModulePass>> {
                Ok(Box::new(FindLoopsPass::new()))
            }),
        ));
        registry.register(PassRegistration::new(
            "function-names",
            "Function Names Pass: prints a list of all functions",
            Arc::new(|_: &PassOptions| -> Result<Box<dyn ModulePass>> {
                Ok(Box::new(FunctionNamesPass::new()))
            }),
        ));
        registry.register(PassRegistration::new(
            "function-line-number",
            "Function Line Number Pass: prints the line number and the path to the source code file where the function is defined.",
            Arc::new(|options: &PassOptions| -> Result<Box<dyn ModulePass>> {
                Ok(Box::new(FunctionLineNumberPass::new(
                    options.function_name.clone(),
                )?))
            }),
        ));
        registry.register(PassRegistration::new(
            "all-inline",
            "all inliner",
            Arc::new(|options: &PassOptions| -> Result<Box<dyn ModulePass>> {
                Ok(Box::new(ScopedInlinePass::new(
                    options.inline_only_in_function.clone(),
                )?))
            }),
        ));
        registry
    }

    /// Add a pass, replacing any registration with the same name
    pub fn register(&mut self, registration: PassRegistration) {
        match self.passes.iter_mut().find(|p| p.name == registration.name) {
            Some(existing) => *existing = registration,
            None => self.passes.push(registration),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PassRegistration> {
        self.passes.iter().find(|p| p.name == name)
    }

    /// Construct the pass registered as `name`
    pub fn create(&self, name: &str, options: &PassOptions) -> Result<Box<dyn ModulePass>> {
        self.get(name)
            .ok_or_else(|| Error::UnknownPass(name.to_string()))?
            .create(options)
    }

    pub fn passes(&self) -> &[PassRegistration] {
        &self.passes
    }
}
