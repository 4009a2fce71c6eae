//! Anonymous upload client for [gofile.io](https://gofile.io).
//!
//! A [`Client`] picks an upload server, streams local files to it as
//! `multipart/form-data`, and remembers the guest token and folder handed
//! back by the first upload so later uploads land in the same folder.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod session;

#[cfg(test)]
mod mock;

pub use client::{Client, UploadResult};
pub use config::ClientConfig;
pub use error::Error;
pub use gofile_protocol::Region;
pub use session::Session;
