//! Transfer module
//!
//! Streams file bodies between HTTP requests/responses and the user's sandbox.

pub mod download;
pub mod upload;

pub use download::stream_file;
pub use upload::receive_upload;
