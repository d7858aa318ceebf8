//! Storage API client.
//!
//! Every operation builds its URL with [`StorageClient::build_url`] and goes
//! through one dispatch routine. Reads (`GET`) hand back the raw
//! [`HttpResponse`], whatever its status. Mutations (`POST`/`PUT`/`DELETE`)
//! decode a 2xx body as JSON and turn anything else into
//! [`StorageError::Api`].

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::StorageError;
use crate::query::{FileQuery, GroupQuery};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method, MultipartUpload, Payload, Transport};

const STORAGE: &str = "storage";

/// Storage API client (blocking).
#[derive(Clone)]
pub struct StorageClient<T = HttpTransport> {
    transport: T,
    api_base: String,
    credentials: Credentials,
}

impl StorageClient<HttpTransport> {
    /// Client for the default (US West) endpoint.
    ///
    /// Leading and trailing whitespace is trimmed from both the username
    /// and the access key (see [`Credentials::new`]).
    pub fn new(username: &str, access_key: &str) -> Result<Self, StorageError> {
        Self::with_config(Credentials::new(username, access_key)?, ClientConfig::default())
    }

    /// Client for an explicit endpoint, e.g. another region or a proxy.
    ///
    /// Credentials are trimmed as in [`StorageClient::new`].
    pub fn with_endpoint(username: &str, access_key: &str, api_base: &str) -> Result<Self, StorageError> {
        let config = ClientConfig::default().with_api_base(api_base);
        Self::with_config(Credentials::new(username, access_key)?, config)
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self, StorageError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(credentials, config.api_base, transport))
    }
}

impl<T: Transport> StorageClient<T> {
    /// Client over a caller-supplied transport. No network call is made.
    pub fn with_transport(credentials: Credentials, api_base: impl Into<String>, transport: T) -> Self {
        let api_base: String = api_base.into();
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// `{api_base}/{resource_group}[/{path}][/{query}]`.
    ///
    /// Absent or empty segments are skipped. Segments are expected to be
    /// URL-safe already; nothing is escaped.
    pub fn build_url(&self, resource_group: &str, path: Option<&str>, query: Option<&str>) -> String {
        let mut url = self.api_base.clone();
        for segment in [Some(resource_group), path, query].into_iter().flatten() {
            let segment = segment.trim_matches('/');
            if segment.is_empty() {
                continue;
            }
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    /// Upload a local binary (`POST /storage/upload`).
    ///
    /// `remote_name` defaults to the file's base name. Returns the decoded
    /// response; see [`file_id_of`] for the new file's id.
    pub fn upload(&self, file_path: impl AsRef<Path>, remote_name: Option<&str>) -> Result<serde_json::Value, StorageError> {
        let file_path = file_path.as_ref();
        let contents = read_file(file_path)?;

        let file_name = match remote_name {
            Some(name) => name.to_string(),
            None => base_name(file_path)?,
        };

        log::debug!("Uploading {} ({} bytes) as {}", file_path.display(), contents.len(), file_name);

        let url = self.build_url(STORAGE, Some("upload"), None);
        self.mutate(Method::Post, &url, Payload::Multipart(MultipartUpload { file_name, contents }))
    }

    /// Download a file into `output_dir` (`GET /storage/download/{file_id}`).
    ///
    /// The file name comes from the `Content-Disposition` header. Returns
    /// the written path. `output_dir` must already exist.
    pub fn download(&self, file_id: &str, output_dir: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        let response = self.fetch_download(file_id)?;

        let disposition = response.header("content-disposition").ok_or_else(|| {
            StorageError::MalformedResponse("missing Content-Disposition header".into())
        })?;
        let file_name = filename_from_disposition(disposition).ok_or_else(|| {
            StorageError::MalformedResponse(format!("no filename in Content-Disposition: {}", disposition))
        })?;

        write_file(&output_dir.as_ref().join(file_name), response.bytes())
    }

    /// Download a file as `{output_dir}/{file_id}.{extension}`, ignoring
    /// any server-supplied name.
    pub fn download_as(&self, file_id: &str, output_dir: impl AsRef<Path>, extension: &str) -> Result<PathBuf, StorageError> {
        let response = self.fetch_download(file_id)?;
        let extension = extension.trim_start_matches('.');
        let target = output_dir.as_ref().join(format!("{}.{}", file_id, extension));
        write_file(&target, response.bytes())
    }

    /// Apply metadata changes to a file (`PUT /storage/files/{file_id}`).
    ///
    /// `changes` is sent as the JSON body; the service defines its shape.
    pub fn edit(&self, file_id: &str, changes: &serde_json::Value) -> Result<serde_json::Value, StorageError> {
        let url = self.build_url(STORAGE, Some("files"), Some(file_id));
        self.mutate(Method::Put, &url, Payload::Json(changes.clone()))
    }

    /// Delete a file or a whole group. Exactly one id must be given.
    pub fn delete(&self, file_id: Option<&str>, group_id: Option<&str>) -> Result<serde_json::Value, StorageError> {
        let url = match (file_id, group_id) {
            (Some(file_id), None) => self.build_url(STORAGE, Some("files"), Some(file_id)),
            (None, Some(group_id)) => self.build_url(STORAGE, Some("groups"), Some(group_id)),
            (Some(_), Some(_)) => {
                return Err(StorageError::Usage("delete takes a file id or a group id, not both".into()));
            }
            (None, None) => {
                return Err(StorageError::Usage("delete needs a file id or a group id".into()));
            }
        };
        self.mutate(Method::Delete, &url, Payload::Empty)
    }

    pub fn delete_file(&self, file_id: &str) -> Result<serde_json::Value, StorageError> {
        self.delete(Some(file_id), None)
    }

    pub fn delete_group(&self, group_id: &str) -> Result<serde_json::Value, StorageError> {
        self.delete(None, Some(group_id))
    }

    /// List or search files (`GET /storage/files`).
    ///
    /// Returns the raw response; a non-2xx status is not an error here.
    pub fn list_files(&self, query: &FileQuery) -> Result<HttpResponse, StorageError> {
        let url = self.build_url(STORAGE, Some("files"), None);
        self.read(&url, query.to_pairs())
    }

    /// List or search groups (`GET /storage/groups`).
    ///
    /// Returns the raw response; a non-2xx status is not an error here.
    pub fn list_groups(&self, query: &GroupQuery) -> Result<HttpResponse, StorageError> {
        let url = self.build_url(STORAGE, Some("groups"), None);
        self.read(&url, query.to_pairs())
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn fetch_download(&self, file_id: &str) -> Result<HttpResponse, StorageError> {
        let url = self.build_url(STORAGE, Some("download"), Some(file_id));
        let response = self.read(&url, Vec::new())?;

        // Never write an error page to disk.
        if !response.is_success() {
            log::warn!("Download of {} failed with HTTP {}", file_id, response.status);
            return Err(StorageError::Api { status: response.status, body: response.text() });
        }
        Ok(response)
    }

    fn read(&self, url: &str, query: Vec<(String, String)>) -> Result<HttpResponse, StorageError> {
        self.request(Method::Get, url, Payload::Empty, query)
    }

    fn mutate(&self, method: Method, url: &str, payload: Payload) -> Result<serde_json::Value, StorageError> {
        let response = self.request(method, url, payload, Vec::new())?;
        translate(method, url, response)
    }

    fn request(
        &self,
        method: Method,
        url: &str,
        payload: Payload,
        query: Vec<(String, String)>,
    ) -> Result<HttpResponse, StorageError> {
        log::debug!("{} {}", method.as_str(), url);

        let response = self.transport.send(HttpRequest {
            method,
            url: url.to_string(),
            credentials: self.credentials.clone(),
            query,
            payload,
        })?;

        log::debug!("{} {} -> {}", method.as_str(), url, response.status);
        Ok(response)
    }
}

// ── Free functions ──────────────────────────────────────────────────

/// Id of the file described by an upload (or file) response.
///
/// Looks at `item.id`, then a top-level `id`. Numeric ids are stringified.
pub fn file_id_of(response: &serde_json::Value) -> Option<String> {
    json_id(&response["item"]["id"]).or_else(|| json_id(&response["id"]))
}

fn json_id(value: &serde_json::Value) -> Option<String> {
    value.as_str()
        .map(String::from)
        .or_else(|| value.as_i64().map(|n| n.to_string()))
}

/// Mutating-call translation: 2xx → JSON body (empty → `null`), else `Api`.
fn translate(method: Method, url: &str, response: HttpResponse) -> Result<serde_json::Value, StorageError> {
    if !response.is_success() {
        log::warn!("{} {} failed with HTTP {}", method.as_str(), url, response.status);
        return Err(StorageError::Api { status: response.status, body: response.text() });
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    response.json()
}

/// Extract the target file name from a `Content-Disposition` value.
///
/// Only the last path component is kept so the name cannot point outside
/// the output directory.
fn filename_from_disposition(header: &str) -> Option<String> {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    static BARE: OnceLock<Regex> = OnceLock::new();

    let quoted = QUOTED.get_or_init(|| Regex::new(r#"filename\s*=\s*"([^"]+)""#).unwrap());
    let bare = BARE.get_or_init(|| Regex::new(r#"filename\s*=\s*([^;"\s]+)"#).unwrap());

    let raw = quoted.captures(header)
        .or_else(|| bare.captures(header))
        .and_then(|caps| caps.get(1))?
        .as_str();

    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

fn base_name(path: &Path) -> Result<String, StorageError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .ok_or_else(|| {
            StorageError::Usage(format!("cannot derive a remote name from {}", path.display()))
        })
}

fn read_file(path: &Path) -> Result<Vec<u8>, StorageError> {
    let mut file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).map_err(|e| StorageError::io(path, e))?;
    Ok(contents)
}

fn write_file(path: &Path, contents: &[u8]) -> Result<PathBuf, StorageError> {
    let file = File::create(path).map_err(|e| StorageError::io(path, e))?;
    write_or_remove(path, file, contents)?;
    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(path.to_path_buf())
}

/// Write `contents` through `writer`; on failure delete `path` so no
/// truncated file is left behind.
fn write_or_remove(path: &Path, mut writer: impl Write, contents: &[u8]) -> Result<(), StorageError> {
    let result = writer.write_all(contents).and_then(|()| writer.flush());
    drop(writer);

    if let Err(e) = result {
        if let Err(cleanup) = std::fs::remove_file(path) {
            log::warn!("Could not remove partial file {}: {}", path.display(), cleanup);
        }
        return Err(StorageError::io(path, e));
    }
    Ok(())
}
