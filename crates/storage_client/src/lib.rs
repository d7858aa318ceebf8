//! Sauce Labs Storage API client.
//!
//! Thin blocking client for the application storage service: upload app
//! binaries, download them back, list/search files and groups, edit file
//! metadata, delete files or whole groups. Every call authenticates with
//! HTTP Basic Auth (username + access key).
//!
//! No retries. No pagination loop. No caching. One request per operation.

mod auth;
mod client;
mod config;
mod error;
mod query;
mod transport;

pub use auth::{Credentials, ACCESS_KEY_ENV, USERNAME_ENV};
pub use client::{file_id_of, StorageClient};
pub use config::{ClientConfig, Region, DEFAULT_API_BASE};
pub use error::StorageError;
pub use query::{FileQuery, GroupQuery, DEFAULT_PAGE, DEFAULT_PER_PAGE};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, MultipartUpload, Payload, Transport,
};
