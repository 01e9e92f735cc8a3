use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    ast::Stage,
    context::RunContext,
    table::Table,
    transform::{StageError, apply_stage},
};

/// A stage failure, located within its pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Stage {index} ({kind}) failed: {source}")]
pub struct PipelineError {
    /// 0-based position of the failing stage
    pub index: usize,
    pub kind: &'static str,
    pub source: StageError,
}

/// The result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// The table left after the last stage
    pub table: Table,
    /// Tables recorded by `notify` stages, in stage order
    pub notifications: Vec<(String, Table)>,
}

/// Where a pipeline run is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Ready,
    Running { stage: usize },
    Succeeded(PipelineOutput),
    Failed(PipelineError),
}

/// An ordered sequence of stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Pipeline { stages }
    }

    /// Table names this pipeline loads through `read` and `join`.
    pub fn inputs(&self) -> Vec<&str> {
        self.stages.iter().flat_map(Stage::inputs).collect()
    }

    /// Signals this pipeline publishes through `notify`.
    pub fn signals(&self) -> Vec<&str> {
        self.stages.iter().filter_map(Stage::signal).collect()
    }

    /// Runs the pipeline once against `ctx`.
    ///
    /// # Examples
    ///
    /// ```
    /// use briq::{Pipeline, RunContext, Stage, Table};
    ///
    /// let pipeline = Pipeline::new(vec![
    ///     Stage::Read { source: "empty".to_string() },
    ///     Stage::Ungroup,
    /// ]);
    /// let ctx = RunContext::new().with_source("empty", Table::empty());
    /// let output = pipeline.run(&ctx).unwrap();
    /// assert!(output.table.is_empty());
    /// ```
    pub fn run(&self, ctx: &RunContext) -> Result<PipelineOutput, PipelineError> {
        let mut run = PipelineRun::new(self);
        run.execute(ctx);
        match run.into_state() {
            PipelineState::Succeeded(output) => Ok(output),
            PipelineState::Failed(err) => Err(err),
            state => unreachable!("pipeline finished in state {:?}", state),
        }
    }
}

/// A single execution of a pipeline, tracking its state.
///
/// A run executes at most once; calling [`PipelineRun::execute`] again
/// returns the final state without re-running any stage.
#[derive(Debug)]
pub struct PipelineRun<'p> {
    pipeline: &'p Pipeline,
    state: PipelineState,
}

impl<'p> PipelineRun<'p> {
    pub fn new(pipeline: &'p Pipeline) -> Self {
        PipelineRun {
            pipeline,
            state: PipelineState::Ready,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn into_state(self) -> PipelineState {
        self.state
    }

    pub fn execute(&mut self, ctx: &RunContext) -> &PipelineState {
        if self.state != PipelineState::Ready {
            return &self.state;
        }

        let pipeline = self.pipeline;
        let mut table = Table::empty();
        let mut notifications = Vec::new();

        for (index, stage) in pipeline.stages.iter().enumerate() {
            self.transition(PipelineState::Running { stage: index });
            table = match apply_stage(stage, table, ctx) {
                Ok(table) => table,
                Err(source) => {
                    let err = PipelineError {
                        index,
                        kind: stage.kind(),
                        source,
                    };
                    warn!("{}", err);
                    self.transition(PipelineState::Failed(err));
                    return &self.state;
                }
            };
            if let Some(signal) = stage.signal() {
                notifications.push((signal.to_string(), table.clone()));
            }
        }

        info!(
            "pipeline finished with {} rows after {} stages",
            table.len(),
            pipeline.stages.len()
        );
        self.transition(PipelineState::Succeeded(PipelineOutput {
            table,
            notifications,
        }));
        &self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(
            "pipeline state {} -> {}",
            state_name(&self.state),
            state_name(&next)
        );
        self.state = next;
    }
}

fn state_name(state: &PipelineState) -> String {
    match state {
        PipelineState::Ready => "ready".to_string(),
        PipelineState::Running { stage } => format!("running(stage {})", stage),
        PipelineState::Succeeded(_) => "succeeded".to_string(),
        PipelineState::Failed(_) => "failed".to_string(),
    }
}
