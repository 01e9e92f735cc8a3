//! Program coordinator: runs named pipelines in signal-dependency order.
//!
//! Pipeline `A` depends on pipeline `B` when `A` reads or joins a name that
//! `B` notifies. The dependency graph is checked before anything runs:
//! a signal with two producers, or a cycle, rejects the whole program.

use indexmap::IndexMap;
use log::{info, warn};
use thiserror::Error;

use crate::{
    context::RunContext,
    pipeline::{Pipeline, PipelineError},
    table::Table,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// Pipelines that wait on each other, listed along the cycle
    #[error("Dependency cycle between pipelines: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("Signal '{signal}' is notified by both '{first}' and '{second}'")]
    DuplicateSignal {
        signal: String,
        first: String,
        second: String,
    },

    #[error("Signal '{0}' has already been published")]
    AlreadyPublished(String),
}

/// An edge of the dependency graph: the signal waited on and who sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub signal: String,
    pub producer: String,
}

/// What happened to one pipeline during a program run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded(Table),
    Failed(PipelineError),
    /// Not run because a pipeline it depends on did not succeed
    Blocked { signal: String, producer: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            Outcome::Succeeded(table) => Some(table),
            _ => None,
        }
    }
}

/// Per-pipeline outcomes, in the order the pipelines were considered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramReport {
    pub outcomes: IndexMap<String, Outcome>,
}

impl ProgramReport {
    pub fn get(&self, name: &str) -> Option<&Outcome> {
        self.outcomes.get(name)
    }

    /// True when every pipeline succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.values().all(Outcome::is_success)
    }

    /// Names of the pipelines in the order they were considered.
    pub fn order(&self) -> Vec<&str> {
        self.outcomes.keys().map(String::as_str).collect()
    }
}

/// A named collection of pipelines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pipelines: IndexMap<String, Pipeline>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(mut self, name: impl Into<String>, pipeline: Pipeline) -> Self {
        self.insert(name, pipeline);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, pipeline: Pipeline) {
        self.pipelines.insert(name.into(), pipeline);
    }

    pub fn get(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.get(name)
    }

    /// Pipelines in definition order.
    pub fn pipelines(&self) -> &IndexMap<String, Pipeline> {
        &self.pipelines
    }

    /// Map each notified signal to the pipeline that notifies it.
    pub fn producers(&self) -> Result<IndexMap<String, String>, ProgramError> {
        let mut producers: IndexMap<String, String> = IndexMap::new();
        for (name, pipeline) in &self.pipelines {
            for signal in pipeline.signals() {
                if let Some(first) = producers.get(signal) {
                    return Err(ProgramError::DuplicateSignal {
                        signal: signal.to_string(),
                        first: first.clone(),
                        second: name.clone(),
                    });
                }
                producers.insert(signal.to_string(), name.clone());
            }
        }
        Ok(producers)
    }

    /// Dependencies of every pipeline. Names that no pipeline notifies are
    /// external sources and add no edge.
    pub fn dependencies(&self) -> Result<IndexMap<String, Vec<Dependency>>, ProgramError> {
        let producers = self.producers()?;
        Ok(self
            .pipelines
            .iter()
            .map(|(name, pipeline)| {
                let mut deps: Vec<Dependency> = Vec::new();
                for input in pipeline.inputs() {
                    if let Some(producer) = producers.get(input)
                        && !deps.iter().any(|d| d.signal == input)
                    {
                        deps.push(Dependency {
                            signal: input.to_string(),
                            producer: producer.clone(),
                        });
                    }
                }
                (name.clone(), deps)
            })
            .collect())
    }

    /// Topological run order; ties are broken by definition order.
    pub fn run_order(&self) -> Result<Vec<String>, ProgramError> {
        let deps = self.dependencies()?;
        topological_order(&deps)
    }

    /// Runs every pipeline once, producers before consumers.
    ///
    /// Configuration errors (duplicate producers, cycles, signals already in
    /// `ctx`) are returned before any pipeline runs. Pipeline failures are
    /// not errors of the program: they are recorded in the report, and
    /// dependents are marked blocked.
    pub fn run(&self, ctx: &mut RunContext) -> Result<ProgramReport, ProgramError> {
        let deps = self.dependencies()?;
        let order = topological_order(&deps)?;
        // a reused context may already hold one of our signals
        if let Some(signal) = self
            .pipelines
            .values()
            .flat_map(Pipeline::signals)
            .find(|s| ctx.signal(s).is_some())
        {
            return Err(ProgramError::AlreadyPublished(signal.to_string()));
        }
        info!("running {} pipelines: {}", order.len(), order.join(", "));

        let mut report = ProgramReport::default();
        for name in order {
            let pipeline = &self.pipelines[&name];

            let unmet = deps[&name]
                .iter()
                .find(|d| !report.get(&d.producer).is_some_and(Outcome::is_success));
            if let Some(dep) = unmet {
                warn!(
                    "pipeline '{}' blocked: '{}' did not publish signal '{}'",
                    name, dep.producer, dep.signal
                );
                report.outcomes.insert(
                    name,
                    Outcome::Blocked {
                        signal: dep.signal.clone(),
                        producer: dep.producer.clone(),
                    },
                );
                continue;
            }

            let outcome = match pipeline.run(ctx) {
                Ok(output) => {
                    for (signal, table) in output.notifications {
                        ctx.publish(signal, table)?;
                    }
                    Outcome::Succeeded(output.table)
                }
                Err(err) => {
                    warn!("pipeline '{}' failed: {}", name, err);
                    Outcome::Failed(err)
                }
            };
            report.outcomes.insert(name, outcome);
        }
        Ok(report)
    }
}

/// Kahn's algorithm, always taking the earliest-defined ready pipeline.
fn topological_order(deps: &IndexMap<String, Vec<Dependency>>) -> Result<Vec<String>, ProgramError> {
    let mut order: Vec<String> = Vec::with_capacity(deps.len());
    let mut done = vec![false; deps.len()];

    while order.len() < deps.len() {
        let ready = deps.iter().enumerate().find(|(i, (_, edges))| {
            !done[*i]
                && edges
                    .iter()
                    .all(|d| order.iter().any(|o| *o == d.producer))
        });
        match ready {
            Some((i, (name, _))) => {
                done[i] = true;
                order.push(name.clone());
            }
            None => return Err(ProgramError::Cycle(find_cycle(deps, &done))),
        }
    }
    Ok(order)
}

/// Walk unfinished pipelines along unfinished dependencies until a name repeats.
///
/// Every unfinished pipeline has at least one unfinished producer, otherwise
/// it would have been ready, so the walk always finds a cycle.
fn find_cycle(deps: &IndexMap<String, Vec<Dependency>>, done: &[bool]) -> Vec<String> {
    let pending = |name: &str| deps.get_index_of(name).is_some_and(|i| !done[i]);

    let Some(start) = deps.keys().enumerate().find(|(i, _)| !done[*i]).map(|(_, n)| n) else {
        return Vec::new();
    };

    let mut path: Vec<&String> = vec![start];
    loop {
        let current = path[path.len() - 1];
        let Some(next) = deps[current]
            .iter()
            .map(|d| &d.producer)
            .find(|p| pending(p.as_str()))
        else {
            return path.into_iter().cloned().collect();
        };
        if let Some(pos) = path.iter().position(|p| *p == next) {
            let mut cycle: Vec<String> = path[pos..].iter().map(|p| (*p).clone()).collect();
            cycle.push(next.clone());
            return cycle;
        }
        path.push(next);
    }
}
