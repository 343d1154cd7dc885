//! Build configuration resolution
//!
//! Locates and reads the descriptor the client build writes next to the
//! compiled client assembly. The descriptor's on-disk shape is provisional;
//! the four values of [`BuildConfig`] are what the rest of the crate relies on.

mod descriptor;

use std::io;
use std::path::{Path, PathBuf};

pub use descriptor::{descriptor_path, DESCRIPTOR_EXTENSION};

/// Paths and feature flags produced by the client build
///
/// Read once at setup and never reloaded. Auto-rebuild, when enabled, acts on
/// the files under these paths, not on this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Build output served as the application bundle
    pub dist_path: PathBuf,
    /// Source-side static assets, `None` when the project has none
    pub web_root_path: Option<PathBuf>,
    pub enable_auto_rebuild: bool,
    pub enable_debugging: bool,
}

impl BuildConfig {
    /// The secondary web root, `None` when absent or empty
    pub fn web_root(&self) -> Option<&Path> {
        self.web_root_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    pub fn has_web_root(&self) -> bool {
        self.web_root().is_some()
    }
}

/// Setup-time failure to obtain a [`BuildConfig`]
#[derive(Debug, thiserror::Error)]
pub enum BuildConfigError {
    #[error("build descriptor not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("build descriptor {} is malformed: {reason}", path.display())]
    Malformed { path: PathBuf, reason: &'static str },

    #[error("failed to read build descriptor {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Load the build configuration for a client assembly
///
/// Not cached: callers resolve once during setup and keep the result.
pub fn resolve(client_assembly_path: &Path) -> Result<BuildConfig, BuildConfigError> {
    let path = descriptor_path(client_assembly_path);

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(BuildConfigError::NotFound { path });
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(BuildConfigError::Malformed {
                path,
                reason: "not valid UTF-8",
            });
        }
        Err(source) => return Err(BuildConfigError::Io { path, source }),
    };

    descriptor::parse(&contents, client_assembly_path, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_reads_sibling_descriptor() {
        let dir = tempdir().unwrap();
        let assembly = dir.path().join("Client.dll");
        std::fs::write(dir.path().join("Client.spa.config"), ".\nClient.dll\ndebug:true\n")
            .unwrap();

        let config = resolve(&assembly).unwrap();
        assert_eq!(config.dist_path, dir.path().join("dist"));
        assert!(config.enable_debugging);
        assert!(!config.enable_auto_rebuild);
        assert!(!config.has_web_root());
    }

    #[test]
    fn test_empty_web_root_counts_as_none() {
        let mut config = BuildConfig {
            dist_path: PathBuf::from("/srv/client/dist"),
            web_root_path: Some(PathBuf::new()),
            enable_auto_rebuild: false,
            enable_debugging: false,
        };
        assert_eq!(config.web_root(), None);

        config.web_root_path = Some(PathBuf::from("/srv/client/wwwroot"));
        assert_eq!(config.web_root(), Some(Path::new("/srv/client/wwwroot")));
    }

    #[test]
    fn test_missing_descriptor() {
        let dir = tempdir().unwrap();
        let err = resolve(&dir.path().join("Client.dll")).unwrap_err();
        assert!(matches!(err, BuildConfigError::NotFound { .. }));
        assert!(err.to_string().contains("Client.spa.config"));
    }

    #[test]
    fn test_non_utf8_descriptor_is_malformed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Client.spa.config"), [0xff, 0xfe, 0x00]).unwrap();
        let err = resolve(&dir.path().join("Client.dll")).unwrap_err();
        assert!(matches!(err, BuildConfigError::Malformed { .. }));
    }
}
