//! Wire types for the gofile.io HTTP API.
//!
//! Every response is wrapped in an [`ApiResponse`] envelope. The `data`
//! payload has a different shape per endpoint, so each call site decodes
//! into its own target ([`ServerList`] or [`FileData`]).

pub mod envelope;
pub mod types;

pub use envelope::{ApiResponse, STATUS_OK};
pub use types::{FileData, Region, Server, ServerList};
