//! Request pipeline
//!
//! An ordered list of stages. Each stage either answers the request or
//! reports `NotFound`, which hands the request to the next stage. A request
//! that no stage answers is the host's to turn into a 404.
//!
//! Stages are appended through [`PipelineBuilder`] during setup; the built
//! [`Pipeline`] is immutable and shared by every connection.

pub mod compose;
pub mod context;
pub mod dev;
pub mod spa;
pub mod static_files;

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::http::HttpResponse;

pub use compose::{attach, attach_client, compose, AttachOptions, ClientApplication};
pub use context::RequestContext;
pub use dev::{AutoRebuild, DebugProxy, DevTooling, RebuildStrategy};
pub use spa::SpaFallback;
pub use static_files::StaticFileServingUnit;

/// Result of running a request through one stage (or the whole pipeline)
#[derive(Debug)]
pub enum Outcome {
    Handled(HttpResponse),
    /// Not for this stage; try the next one
    NotFound,
}

impl Outcome {
    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// A stage failed on a request it had decided to answer
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("default page {page} not found under {}", root.display())]
    DefaultPageMissing { root: PathBuf, page: &'static str },
}

/// One step of the pipeline
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Short label used in startup logs
    fn name(&self) -> &str;

    async fn handle(&self, ctx: &RequestContext) -> Result<Outcome, StageError>;
}

/// Append-only list of stages used during setup
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn Middleware>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage after every stage already present
    pub fn push(&mut self, stage: Arc<dyn Middleware>) -> &mut Self {
        crate::logger::log_stage_appended(self.stages.len(), stage.name());
        self.stages.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Freeze the stages in their current order
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages.into(),
        }
    }
}

/// Immutable, shareable stage list
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn Middleware>]>,
}

impl Pipeline {
    /// Run the stages in order until one answers
    pub async fn handle(&self, ctx: &RequestContext) -> Result<Outcome, StageError> {
        self.handle_traced(ctx).await.map(|(outcome, _)| outcome)
    }

    /// Like [`handle`](Self::handle), also naming the stage that answered
    pub async fn handle_traced(
        &self,
        ctx: &RequestContext,
    ) -> Result<(Outcome, Option<&str>), StageError> {
        for stage in self.stages.iter() {
            if let Outcome::Handled(response) = stage.handle(ctx).await? {
                return Ok((Outcome::Handled(response), Some(stage.name())));
            }
        }
        Ok((Outcome::NotFound, None))
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.stage_names()).finish()
    }
}
