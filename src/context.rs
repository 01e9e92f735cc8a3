use indexmap::IndexMap;

use crate::{program::ProgramError, table::Table};

/// Everything a program run can load tables from.
///
/// External sources are supplied by the host before the run. Signals are
/// written by pipelines as they succeed; each name is written at most once
/// and the registry is dropped with the context.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    sources: IndexMap<String, Table>,
    signals: IndexMap<String, Table>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RunContext::add_source`].
    pub fn with_source(mut self, name: impl Into<String>, table: Table) -> Self {
        self.add_source(name, table);
        self
    }

    pub fn add_source(&mut self, name: impl Into<String>, table: Table) {
        self.sources.insert(name.into(), table);
    }

    /// Resolve a table name: published signals shadow external sources.
    pub fn lookup(&self, name: &str) -> Option<&Table> {
        self.signals.get(name).or_else(|| self.sources.get(name))
    }

    pub fn signal(&self, name: &str) -> Option<&Table> {
        self.signals.get(name)
    }

    pub fn signals(&self) -> impl Iterator<Item = (&String, &Table)> {
        self.signals.iter()
    }

    /// Record a pipeline's result under a signal name.
    pub fn publish(&mut self, name: impl Into<String>, table: Table) -> Result<(), ProgramError> {
        let name = name.into();
        if self.signals.contains_key(&name) {
            return Err(ProgramError::AlreadyPublished(name));
        }
        self.signals.insert(name, table);
        Ok(())
    }
}
