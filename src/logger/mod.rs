//! Logger module
//!
//! Provides logging utilities for the host:
//! - Startup and pipeline composition logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::build_config::BuildConfig;
use crate::config::HostConfig;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &HostConfig) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &HostConfig) {
    write_info("======================================");
    write_info("Client application host started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!(
        "Environment: {} ({})",
        config.app.environment, config.app.application_name
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_build_config(config: &BuildConfig) {
    write_info(&format!("[Build] Dist path: {}", config.dist_path.display()));
    match &config.web_root_path {
        Some(path) => write_info(&format!("[Build] Web root: {}", path.display())),
        None => write_info("[Build] Web root: (none)"),
    }
    write_info(&format!(
        "[Build] Auto-rebuild: {}, debugging: {}",
        config.enable_auto_rebuild, config.enable_debugging
    ));
}

pub fn log_stage_appended(index: usize, name: &str) {
    write_info(&format!("[Pipeline] #{index} {name}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_info(message: &str) {
    write_info(message);
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    match writer::get() {
        Some(w) => w.write_access(&entry.format(format)),
        None => println!("{}", entry.format(format)),
    }
}

pub fn log_shutdown(active_connections: usize) {
    write_info(&format!(
        "[Shutdown] Listener closed, {active_connections} connection(s) still finishing"
    ));
}
