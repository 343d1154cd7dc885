//! Pipeline composition
//!
//! Builds the stage order the client application is served with:
//!
//! 1. auto-rebuild hook (development only, when the build asks for it)
//! 2. distribution directory
//! 3. secondary web root, when the project has one
//! 4. debugger proxy, when debugging is enabled
//! 5. SPA fallback for everything outside `/_framework`

use std::path::PathBuf;
use std::sync::Arc;

use super::{DevTooling, PipelineBuilder, RebuildStrategy, SpaFallback, StaticFileServingUnit};
use crate::build_config::{self, BuildConfig, BuildConfigError};
use crate::config::HostEnvironment;
use crate::http::{cache, ContentTypeTable};
use crate::logger;

/// Where the client assembly lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachOptions {
    pub client_assembly_path: PathBuf,
}

/// Marker for a client application whose location is known at build time
///
/// ```
/// use spa_host::pipeline::ClientApplication;
/// use std::path::PathBuf;
///
/// struct Client;
///
/// impl ClientApplication for Client {
///     fn assembly_path() -> PathBuf {
///         PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("client/bin/Client.dll")
///     }
/// }
/// ```
pub trait ClientApplication {
    fn assembly_path() -> PathBuf;
}

/// Attach the client application identified by a marker type
pub fn attach_client<C: ClientApplication>(
    builder: &mut PipelineBuilder,
    env: &HostEnvironment,
    tooling: &DevTooling,
) -> Result<BuildConfig, BuildConfigError> {
    let options = AttachOptions {
        client_assembly_path: C::assembly_path(),
    };
    attach(builder, &options, env, tooling)
}

/// Resolve the build configuration and compose the pipeline from it
///
/// A missing or malformed descriptor aborts setup; nothing is appended to
/// `builder` in that case.
pub fn attach(
    builder: &mut PipelineBuilder,
    options: &AttachOptions,
    env: &HostEnvironment,
    tooling: &DevTooling,
) -> Result<BuildConfig, BuildConfigError> {
    let config = build_config::resolve(&options.client_assembly_path)?;
    logger::log_build_config(&config);
    compose(builder, &config, env, tooling);
    Ok(config)
}

/// Append the client application's stages to `builder`
pub fn compose(
    builder: &mut PipelineBuilder,
    config: &BuildConfig,
    env: &HostEnvironment,
    tooling: &DevTooling,
) {
    let dist = Arc::new(StaticFileServingUnit::new(
        &config.dist_path,
        Arc::new(ContentTypeTable::build(config.enable_debugging)),
        cache::decorate,
    ));

    if env.is_development() && config.enable_auto_rebuild {
        let strategy = RebuildStrategy::for_application(&env.application_name);
        if let Some(auto_rebuild) = &tooling.auto_rebuild {
            logger::log_info(&format!("[Pipeline] Auto-rebuild enabled ({strategy:?})"));
            auto_rebuild.attach(builder, strategy, config);
        } else {
            logger::log_warning("Auto-rebuild requested but no auto-rebuild tooling is registered");
        }
    }

    builder.push(dist.clone());

    if let Some(web_root) = config.web_root() {
        builder.push(Arc::new(StaticFileServingUnit::new(
            web_root,
            Arc::new(ContentTypeTable::baseline()),
            cache::decorate,
        )));
    }

    if config.enable_debugging {
        if let Some(debug_proxy) = &tooling.debug_proxy {
            debug_proxy.attach(builder);
        } else {
            logger::log_warning("Debugging enabled but no debug proxy is registered");
        }
    }

    builder.push(Arc::new(SpaFallback::new(dist)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::dev::{AutoRebuild, DebugProxy};
    use crate::pipeline::{Middleware, Outcome, RequestContext, StageError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn config(web_root: Option<&str>, auto_rebuild: bool, debugging: bool) -> BuildConfig {
        BuildConfig {
            dist_path: PathBuf::from("/srv/client/dist"),
            web_root_path: web_root.map(PathBuf::from),
            enable_auto_rebuild: auto_rebuild,
            enable_debugging: debugging,
        }
    }

    struct Named(&'static str);

    #[async_trait]
    impl Middleware for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn handle(&self, _ctx: &RequestContext) -> Result<Outcome, StageError> {
            Ok(Outcome::NotFound)
        }
    }

    #[derive(Default)]
    struct RecordingRebuild(Mutex<Vec<RebuildStrategy>>);

    impl AutoRebuild for RecordingRebuild {
        fn attach(&self, builder: &mut PipelineBuilder, strategy: RebuildStrategy, _: &BuildConfig) {
            self.0.lock().unwrap().push(strategy);
            builder.push(Arc::new(Named("auto rebuild")));
        }
    }

    struct Proxy;

    impl DebugProxy for Proxy {
        fn attach(&self, builder: &mut PipelineBuilder) {
            builder.push(Arc::new(Named("debug proxy")));
        }
    }

    fn stage_names_for(config: &BuildConfig, env: &HostEnvironment, tooling: &DevTooling) -> Vec<String> {
        let mut builder = PipelineBuilder::new();
        compose(&mut builder, config, env, tooling);
        builder.stage_names().into_iter().map(String::from).collect()
    }

    #[test]
    fn test_minimal_pipeline() {
        let names = stage_names_for(
            &config(None, false, false),
            &HostEnvironment::production("host"),
            &DevTooling::default(),
        );
        assert_eq!(
            names,
            ["static files (/srv/client/dist)", "spa fallback"]
        );
    }

    #[test]
    fn test_full_development_pipeline_order() {
        let rebuild = Arc::new(RecordingRebuild::default());
        let tooling = DevTooling::default()
            .with_auto_rebuild(rebuild.clone())
            .with_debug_proxy(Arc::new(Proxy));

        let names = stage_names_for(
            &config(Some("/srv/client/wwwroot"), true, true),
            &HostEnvironment::development("host"),
            &tooling,
        );
        assert_eq!(
            names,
            [
                "auto rebuild",
                "static files (/srv/client/dist)",
                "static files (/srv/client/wwwroot)",
                "debug proxy",
                "spa fallback",
            ]
        );
        assert_eq!(*rebuild.0.lock().unwrap(), [RebuildStrategy::Embedded]);
    }

    #[test]
    fn test_auto_rebuild_needs_development_mode() {
        let rebuild = Arc::new(RecordingRebuild::default());
        let tooling = DevTooling::default().with_auto_rebuild(rebuild.clone());

        stage_names_for(
            &config(None, true, false),
            &HostEnvironment::production("host"),
            &tooling,
        );
        assert!(rebuild.0.lock().unwrap().is_empty());

        stage_names_for(
            &config(None, true, false),
            &HostEnvironment::development("spa-devserver"),
            &tooling,
        );
        assert_eq!(
            *rebuild.0.lock().unwrap(),
            [RebuildStrategy::StandaloneDevServer]
        );
    }

    #[test]
    fn test_empty_web_root_adds_no_stage() {
        let names = stage_names_for(
            &config(Some(""), false, false),
            &HostEnvironment::production("host"),
            &DevTooling::default(),
        );
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_debug_proxy_only_when_debugging() {
        let tooling = DevTooling::default().with_debug_proxy(Arc::new(Proxy));
        let names = stage_names_for(
            &config(None, false, false),
            &HostEnvironment::development("host"),
            &tooling,
        );
        assert!(!names.iter().any(|n| n == "debug proxy"));
    }
}
