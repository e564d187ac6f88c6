//! Running several stages connected by byte channels.
//!
//! Every stage is spawned before any is waited on, so producers and consumers
//! run side by side and the OS pipe buffer provides backpressure. The parent
//! keeps at most one channel endpoint open between iterations: the read end
//! that becomes the next stage's input.

use crate::command::{ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::{reap, spawn_stage};
use crate::parser::Stage;
use std::io::{self, PipeReader, PipeWriter};
use std::process::Child;

/// A unidirectional byte channel between two adjacent stages.
///
/// Both ends are owned values: they can be moved into a child's stream setup
/// or dropped, which closes them, but never duplicated by the shell. The OS
/// endpoints are created close-on-exec, so no child inherits an end it was not
/// explicitly given.
#[derive(Debug)]
pub struct Channel {
    reader: PipeReader,
    writer: PipeWriter,
}

impl Channel {
    pub fn open() -> Result<Self, ShellError> {
        let (reader, writer) = io::pipe().map_err(ShellError::Pipe)?;
        Ok(Self { reader, writer })
    }

    pub fn into_ends(self) -> (PipeReader, PipeWriter) {
        (self.reader, self.writer)
    }
}

/// What happened to one stage.
#[derive(Debug)]
pub enum StageOutcome {
    /// Spawned and reaped with this status.
    Exited(ExitCode),
    /// Could not be started, or could not be waited on.
    Failed(ShellError),
    /// Never attempted because an earlier channel could not be created.
    NotStarted,
}

impl StageOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            StageOutcome::Exited(code) => *code,
            StageOutcome::Failed(e) => e.exit_code(),
            StageOutcome::NotStarted => 1,
        }
    }
}

/// Summary of one pipeline run, one outcome per stage in stage order.
#[derive(Debug)]
pub struct PipelineReport {
    /// Channels created.
    pub channels: usize,
    /// Process ids of every spawned stage, in spawn order. Each was reaped.
    pub pids: Vec<u32>,
    pub outcomes: Vec<StageOutcome>,
}

impl PipelineReport {
    fn new(stages: usize) -> Self {
        Self {
            channels: 0,
            pids: Vec::with_capacity(stages),
            outcomes: (0..stages).map(|_| StageOutcome::NotStarted).collect(),
        }
    }

    pub fn spawned(&self) -> usize {
        self.pids.len()
    }

    /// Status of the last stage, which is the pipeline's status.
    pub fn status(&self) -> ExitCode {
        self.outcomes.last().map_or(0, StageOutcome::exit_code)
    }

    /// Errors of failed stages, in stage order.
    pub fn failures(&self) -> impl Iterator<Item = &ShellError> {
        self.outcomes.iter().filter_map(|o| match o {
            StageOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }
}

/// Run `stages` as a pipeline: `stdin` feeds the first stage, the last stage
/// writes to `stdout`, and each adjacent pair is joined by a fresh [`Channel`].
///
/// A stage that fails to start does not cancel its siblings: its neighbours
/// just see end-of-input or a closed reader. The call returns once every
/// spawned child has been reaped exactly once.
#[tracing::instrument(level = "debug", skip_all, fields(stages = stages.len()))]
pub fn run_pipeline(
    stages: &[Stage],
    env: &Environment,
    stdin: Box<dyn Stdin>,
    stdout: Box<dyn Stdout>,
) -> Result<PipelineReport, ShellError> {
    let (last, upstream) = stages
        .split_last()
        .ok_or(ShellError::EmptyCommand { stage: 1 })?;
    let mut report = PipelineReport::new(stages.len());
    let mut children: Vec<(usize, Child)> = Vec::with_capacity(stages.len());

    let mut input = stdin;
    let mut channels_ok = true;
    for (i, stage) in upstream.iter().enumerate() {
        let channel = match Channel::open() {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!(stage = i, error = %e, "channel creation failed");
                report.outcomes[i] = StageOutcome::Failed(e);
                channels_ok = false;
                break;
            }
        };
        report.channels += 1;
        let (reader, writer) = channel.into_ends();
        // The previous read end moves into this stage; the new one waits for the next.
        let next_input: Box<dyn Stdin> = Box::new(reader);
        let stage_input = std::mem::replace(&mut input, next_input);
        launch(&mut report, &mut children, i, stage, env, stage_input, Box::new(writer));
    }
    if channels_ok {
        launch(&mut report, &mut children, upstream.len(), last, env, input, stdout);
    } else {
        drop(input);
    }

    for (i, mut child) in children {
        let stage = &stages[i];
        report.outcomes[i] = match reap(stage, &mut child) {
            Ok(code) => {
                tracing::trace!(stage = i, pid = child.id(), code, "reaped");
                StageOutcome::Exited(code)
            }
            Err(e) => StageOutcome::Failed(e),
        };
    }
    Ok(report)
}

fn launch(
    report: &mut PipelineReport,
    children: &mut Vec<(usize, Child)>,
    index: usize,
    stage: &Stage,
    env: &Environment,
    stdin: Box<dyn Stdin>,
    stdout: Box<dyn Stdout>,
) {
    match spawn_stage(stage, env, stdin, stdout) {
        Ok(child) => {
            report.pids.push(child.id());
            children.push((index, child));
        }
        Err(e) => {
            tracing::debug!(stage = index, error = %e, "stage failed to start");
            report.outcomes[index] = StageOutcome::Failed(e);
        }
    }
}
