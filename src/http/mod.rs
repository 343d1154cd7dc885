//! HTTP protocol layer module
//!
//! Content-type and cache policies plus the protocol helpers static file
//! serving is built from. Nothing in here knows about the pipeline.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

pub use cache::{decorate, ResponseDecorator};
pub use mime::ContentTypeTable;
pub use range::{ByteRange, RangeRequest};
pub use response::{build_404_response, build_500_response, HttpResponse};
