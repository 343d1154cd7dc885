//! Host for a compiled single-page client application
//!
//! Resolves the client's build descriptor, composes the static-asset
//! pipeline from it and serves that pipeline over HTTP/1.1.

pub mod build_config;
pub mod config;
pub mod http;
pub mod logger;
pub mod pipeline;
pub mod server;
