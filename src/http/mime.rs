//! Content-Type policy
//!
//! Maps file extensions to MIME types. A static file whose extension has no
//! type is not served at all, so the table doubles as the list of file types
//! a root is willing to expose.
//!
//! Lookups try the table's own entries first, then the standard registry
//! from `mime_guess`. Withheld extensions skip the registry.

use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Generic binary content type
pub const OCTET_STREAM: &str = "application/octet-stream";

/// WebAssembly content type
pub const WASM: &str = "application/wasm";

/// Client runtime formats kept out of the baseline even where the registry
/// knows them; the distribution table opts back in
const WITHHELD: &[&str] = &[".dll", ".mem", ".wasm", ".pdb"];

/// Preferred types for common web assets, ahead of the registry
const BASELINE: &[(&str, &str)] = &[
    // Text
    (".html", "text/html"),
    (".htm", "text/html"),
    (".css", "text/css"),
    (".txt", "text/plain"),
    (".md", "text/markdown"),
    (".csv", "text/csv"),
    (".xml", "text/xml"),
    // Scripts and data
    (".js", "application/javascript"),
    (".mjs", "application/javascript"),
    (".json", "application/json"),
    (".map", "application/json"),
    (".webmanifest", "application/manifest+json"),
    // Images
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".svg", "image/svg+xml"),
    (".ico", "image/x-icon"),
    (".webp", "image/webp"),
    (".bmp", "image/bmp"),
    // Video
    (".mp4", "video/mp4"),
    (".webm", "video/webm"),
    (".ogv", "video/ogg"),
    (".mov", "video/quicktime"),
    (".avi", "video/x-msvideo"),
    // Audio
    (".mp3", "audio/mpeg"),
    (".wav", "audio/wav"),
    (".ogg", "audio/ogg"),
    (".flac", "audio/flac"),
    (".m4a", "audio/mp4"),
    // Fonts
    (".woff", "font/woff"),
    (".woff2", "font/woff2"),
    (".ttf", "font/ttf"),
    (".otf", "font/otf"),
    (".eot", "application/vnd.ms-fontobject"),
    // Documents and archives
    (".pdf", "application/pdf"),
    (".zip", "application/zip"),
    (".gz", "application/gzip"),
    (".gzip", "application/gzip"),
    (".tar", "application/x-tar"),
];

/// Extension to MIME type table
///
/// Keys are stored lowercase with their leading dot; lookups accept either
/// form in any case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeTable {
    entries: HashMap<String, String>,
    withheld: HashSet<String>,
}

impl ContentTypeTable {
    /// The unmodified standard table, used for the secondary web root
    pub fn baseline() -> Self {
        let entries = BASELINE
            .iter()
            .map(|(ext, mime)| ((*ext).to_string(), (*mime).to_string()))
            .collect();
        let withheld = WITHHELD.iter().map(|ext| (*ext).to_string()).collect();
        Self { entries, withheld }
    }

    /// Table for the distribution directory
    ///
    /// Adds the client runtime's binary formats on top of the baseline.
    /// Debug symbols only get a type (and therefore only get served) when
    /// debugging is enabled.
    pub fn build(enable_debugging: bool) -> Self {
        let mut table = Self::baseline();
        table.insert(".dll", OCTET_STREAM);
        table.insert(".mem", OCTET_STREAM);
        table.insert(".wasm", WASM);
        if enable_debugging {
            table.insert(".pdb", OCTET_STREAM);
        }
        table
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, extension: &str, mime: &str) {
        let extension = normalize(extension);
        self.withheld.remove(&extension);
        self.entries.insert(extension, mime.to_string());
    }

    /// Give an extension no type at all, registry included
    pub fn withhold(&mut self, extension: &str) {
        let extension = normalize(extension);
        self.entries.remove(&extension);
        self.withheld.insert(extension);
    }

    /// Look up an extension (`"wasm"`, `".wasm"` and `".WASM"` are equivalent)
    pub fn get(&self, extension: &str) -> Option<&str> {
        let extension = normalize(extension);
        if let Some(mime) = self.entries.get(&extension) {
            return Some(mime.as_str());
        }
        if self.withheld.contains(&extension) {
            return None;
        }
        mime_guess::from_ext(&extension[1..]).first_raw()
    }

    /// Content type for a file path, `None` when the extension is unknown
    pub fn for_path(&self, path: &Path) -> Option<&str> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.get(e))
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.get(extension).is_some()
    }

    /// Extensions with an explicit entry (registry types not included)
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for ContentTypeTable {
    fn default() -> Self {
        Self::baseline()
    }
}

fn normalize(extension: &str) -> String {
    let lower = extension.to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}
