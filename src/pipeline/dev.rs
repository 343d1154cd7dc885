//! Development tooling hooks
//!
//! Auto-rebuild and the debugger proxy live outside this crate. The composer
//! only decides whether and where they attach; these traits are the whole of
//! what it knows about them.

use std::sync::Arc;

use super::PipelineBuilder;
use crate::build_config::BuildConfig;

/// Application name of the standalone development server
pub const STANDALONE_DEV_SERVER_NAME: &str = "spa-devserver";

/// How auto-rebuild is wired up, picked once at setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildStrategy {
    /// Running inside a host application: rebuild in-process on change
    Embedded,
    /// Running as the standalone dev server: delegate rebuilds to it
    StandaloneDevServer,
}

impl RebuildStrategy {
    /// Choose by process identity (compared case-insensitively)
    pub fn for_application(application_name: &str) -> Self {
        if application_name.eq_ignore_ascii_case(STANDALONE_DEV_SERVER_NAME) {
            Self::StandaloneDevServer
        } else {
            Self::Embedded
        }
    }
}

/// Rebuilds the client bundle when its sources change
pub trait AutoRebuild: Send + Sync {
    fn attach(&self, builder: &mut PipelineBuilder, strategy: RebuildStrategy, config: &BuildConfig);
}

/// Proxies debugger connections to the client runtime
///
/// Implementations append their own stage and must leave any request outside
/// their protocol to the stages after it.
pub trait DebugProxy: Send + Sync {
    fn attach(&self, builder: &mut PipelineBuilder);
}

/// Collaborators available to the composer
///
/// Either may be absent; the matching feature is then skipped with a warning.
#[derive(Clone, Default)]
pub struct DevTooling {
    pub auto_rebuild: Option<Arc<dyn AutoRebuild>>,
    pub debug_proxy: Option<Arc<dyn DebugProxy>>,
}

impl DevTooling {
    #[must_use]
    pub fn with_auto_rebuild(mut self, auto_rebuild: Arc<dyn AutoRebuild>) -> Self {
        self.auto_rebuild = Some(auto_rebuild);
        self
    }

    #[must_use]
    pub fn with_debug_proxy(mut self, debug_proxy: Arc<dyn DebugProxy>) -> Self {
        self.debug_proxy = Some(debug_proxy);
        self
    }
}

impl std::fmt::Debug for DevTooling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevTooling")
            .field("auto_rebuild", &self.auto_rebuild.is_some())
            .field("debug_proxy", &self.debug_proxy.is_some())
            .finish()
    }
}
