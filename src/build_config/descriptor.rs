//! Build descriptor parsing
//!
//! The descriptor is a line oriented file written by the client build:
//!
//! ```text
//! /src/Client/Client.csproj      <- source project ("." = the assembly itself)
//! bin/Debug/Client.dll           <- output assembly, relative to the project dir
//! autorebuild:true               <- optional flag lines, in any order
//! debug:true
//! ```
//!
//! The first two lines only matter for the directories derived from them.

use std::path::{Path, PathBuf};

use super::{BuildConfig, BuildConfigError};

/// Extension that replaces the client assembly's own to name its descriptor
pub const DESCRIPTOR_EXTENSION: &str = "spa.config";

const SAME_AS_ASSEMBLY: &str = ".";
const AUTO_REBUILD_FLAG: &str = "autorebuild:true";
const DEBUG_FLAG: &str = "debug:true";
const DIST_DIR: &str = "dist";
const WEB_ROOT_DIR: &str = "wwwroot";

/// Location of the descriptor for a client assembly (a sibling file)
pub fn descriptor_path(client_assembly_path: &Path) -> PathBuf {
    client_assembly_path.with_extension(DESCRIPTOR_EXTENSION)
}

/// Turn descriptor text into a [`BuildConfig`]
///
/// `descriptor` is only used to anchor relative paths and for error messages.
pub fn parse(
    contents: &str,
    client_assembly_path: &Path,
    descriptor: &Path,
) -> Result<BuildConfig, BuildConfigError> {
    let malformed = |reason: &'static str| BuildConfigError::Malformed {
        path: descriptor.to_path_buf(),
        reason,
    };

    let lines: Vec<&str> = contents.lines().map(str::trim_end).collect();
    let source_project = match lines.first() {
        Some(line) if !line.is_empty() => *line,
        _ => return Err(malformed("missing source project path")),
    };
    let output_assembly = match lines.get(1) {
        Some(line) if !line.is_empty() => *line,
        _ => return Err(malformed("missing output assembly path")),
    };

    let anchor = descriptor.parent().unwrap_or_else(|| Path::new(""));
    let source_project = if source_project == SAME_AS_ASSEMBLY {
        client_assembly_path.to_path_buf()
    } else {
        anchor.join(source_project)
    };
    let project_dir = source_project.parent().unwrap_or(anchor);

    let output_assembly = project_dir.join(output_assembly);
    let output_dir = output_assembly.parent().unwrap_or(project_dir);

    let web_root = project_dir.join(WEB_ROOT_DIR);
    let flags = &lines[2..];

    Ok(BuildConfig {
        dist_path: output_dir.join(DIST_DIR),
        web_root_path: web_root.is_dir().then_some(web_root),
        enable_auto_rebuild: flags.contains(&AUTO_REBUILD_FLAG),
        enable_debugging: flags.contains(&DEBUG_FLAG),
    })
}
