//! gofile.io client: server selection and streaming uploads.
//!
//! An upload runs as two concurrent units: a spawned [`StreamEncoder`] that
//! writes the multipart body into a transfer pipe, and the caller's task,
//! which sends the request with the pipe's read end as its body. Once the
//! request attempt is over the encoder is joined, and any failure it
//! recorded takes precedence over the HTTP outcome.

use std::path::Path;
use std::time::Duration;

use gofile_protocol::{FileData, Region, ServerList};
use gofile_transfer::{
    EncodeSummary, FileSource, FirstError, PipeReader, StreamEncoder, TransferError,
    transfer_pipe,
};
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::decode::decode_envelope;
use crate::error::Error;
use crate::session::Session;

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    download_page: String,
    code: String,
    parent_folder: String,
    guest_token: String,
    file_id: String,
    file_name: String,
    md5: String,
}

impl UploadResult {
    /// Public download page, e.g. `https://gofile.io/d/Ab12Cd`.
    pub fn download_page(&self) -> &str {
        &self.download_page
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn parent_folder(&self) -> &str {
        &self.parent_folder
    }

    pub fn guest_token(&self) -> &str {
        &self.guest_token
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MD5 reported by the service (may be empty).
    pub fn md5(&self) -> &str {
        &self.md5
    }
}

impl From<FileData> for UploadResult {
    fn from(data: FileData) -> Self {
        Self {
            download_page: data.download_page,
            code: data.code,
            parent_folder: data.parent_folder,
            guest_token: data.guest_token,
            file_id: data.file_id,
            file_name: data.file_name,
            md5: data.md5,
        }
    }
}

/// gofile.io upload client.
///
/// Holds the [`Session`] shared by consecutive uploads. Uploads take
/// `&mut self` because a successful one may fill unset session fields.
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    session: Session,
    region: Option<Region>,
}

impl Client {
    /// Creates a client against the public service.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config,
            session: Session::new(),
            region: None,
        })
    }

    /// Restricts server selection to `region`.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Starts with a known account or guest token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.session.set_token(token);
        self
    }

    /// Uploads into an existing folder.
    pub fn with_folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.session.set_folder_id(folder_id);
        self
    }

    pub fn set_region(&mut self, region: Option<Region>) {
        self.region = region;
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.session.set_token(token);
    }

    pub fn set_folder_id(&mut self, folder_id: impl Into<String>) {
        self.session.set_folder_id(folder_id);
    }

    pub fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn folder_id(&self) -> Option<&str> {
        self.session.folder_id()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Asks the service for an upload server and returns the first named one.
    pub async fn select_server(&self) -> Result<String, Error> {
        let mut request = self
            .http
            .get(self.config.servers_url())
            .timeout(self.config.server_timeout);
        if let Some(region) = self.region {
            request = request.query(&[("zone", region.as_str())]);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(Error::from_response(&resp));
        }

        let body = resp.bytes().await?;
        let list: ServerList = decode_envelope(&body)?;
        let server = list
            .first_available()
            .ok_or(Error::NoServersAvailable)?;

        info!(server = %server.name, region = ?self.region, "selected upload server");
        Ok(server.name.clone())
    }

    /// Uploads the file at `path` to `server`.
    pub async fn upload(
        &mut self,
        path: impl AsRef<Path>,
        server: &str,
    ) -> Result<UploadResult, Error> {
        self.upload_file(path.as_ref(), server, None).await
    }

    /// Like [`upload`](Self::upload), reporting cumulative bytes sent.
    pub async fn upload_with_progress(
        &mut self,
        path: impl AsRef<Path>,
        server: &str,
        progress: mpsc::Sender<u64>,
    ) -> Result<UploadResult, Error> {
        self.upload_file(path.as_ref(), server, Some(progress)).await
    }

    /// Uploads the bytes of `source` under `file_name`.
    pub async fn upload_stream<R>(
        &mut self,
        source: R,
        file_name: &str,
        server: &str,
    ) -> Result<UploadResult, Error>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let url = self.upload_url(server)?;
        let (writer, reader) = transfer_pipe(self.config.pipe_capacity);
        let errors = FirstError::new();
        let encoder = StreamEncoder::new(source, file_name, writer, errors.clone());
        self.send_encoded(url, encoder, reader, errors).await
    }

    async fn upload_file(
        &mut self,
        path: &Path,
        server: &str,
        progress: Option<mpsc::Sender<u64>>,
    ) -> Result<UploadResult, Error> {
        let url = self.upload_url(server)?;
        let source = FileSource::open(path).await?;
        info!(
            path = %path.display(),
            size = source.size(),
            server,
            "uploading file"
        );

        let (writer, reader) = transfer_pipe(self.config.pipe_capacity);
        let errors = FirstError::new();
        let mut encoder = StreamEncoder::from_file(source, writer, errors.clone());
        if let Some(tx) = progress {
            encoder = encoder.with_progress(tx);
        }
        self.send_encoded(url, encoder, reader, errors).await
    }

    async fn send_encoded<R>(
        &mut self,
        url: String,
        encoder: StreamEncoder<R>,
        body: PipeReader,
        errors: FirstError,
    ) -> Result<UploadResult, Error>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let encoder = self
            .session
            .form_fields()
            .into_iter()
            .fold(encoder, |enc, (name, value)| enc.with_field(name, value))
            .with_cancel(cancel.clone());
        let content_type = encoder.content_type();
        let task = encoder.spawn();

        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .body(reqwest::Body::wrap_stream(body.into_stream()));

        debug!(%url, "sending upload request");
        let deadline = self
            .config
            .upload_timeout
            .map(|limit| (Instant::now() + limit, limit));
        let outcome = within(deadline, request.send()).await;

        // The attempt is over; an encoder still parked on the pipe must not wait forever.
        cancel.cancel();
        let summary = match task.await {
            Ok(summary) => summary,
            Err(e) => {
                errors.record(TransferError::Encoding(format!("encoder task failed: {e}")));
                EncodeSummary::default()
            }
        };

        let response = reconcile(errors.take(), outcome, |resp: &reqwest::Response| {
            resp.status().is_success()
        })?;

        if !response.status().is_success() {
            return Err(Error::from_response(&response));
        }

        let bytes = within(deadline, response.bytes()).await?;
        let data: FileData = decode_envelope(&bytes)?;

        let checksum_mismatch = summary.completed
            && !data.md5.is_empty()
            && !data.md5.eq_ignore_ascii_case(&summary.md5);
        if checksum_mismatch {
            warn!(
                local = %summary.md5,
                remote = %data.md5,
                file = %data.file_name,
                "checksum reported by the service does not match the uploaded bytes"
            );
        }

        self.session.adopt(&data);
        info!(
            download_page = %data.download_page,
            bytes = summary.bytes,
            "upload complete"
        );
        Ok(data.into())
    }

    fn upload_url(&self, server: &str) -> Result<String, Error> {
        let invalid = server.is_empty()
            || server
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@'));
        if invalid {
            return Err(Error::InvalidServer(server.to_string()));
        }
        Ok(self.config.upload_url_for(server))
    }
}

/// Runs one step of an upload against its shared deadline, if any.
async fn within<T>(
    deadline: Option<(Instant, Duration)>,
    step: impl Future<Output = Result<T, reqwest::Error>>,
) -> Result<T, Error> {
    match deadline {
        Some((at, limit)) => match tokio::time::timeout_at(at, step).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::Timeout(limit)),
        },
        None => step.await.map_err(Error::from),
    }
}

/// Merges the encoder's recorded failure with the outcome of the request.
///
/// An encoder failure wins, since a body cut short can still draw a
/// success response. The exception is the consumer hanging up: that only
/// mirrors a failed or refused request, whose own error is reported
/// instead. `accepted` tells whether a response counts as success.
fn reconcile<T>(
    transfer: Option<TransferError>,
    outcome: Result<T, Error>,
    accepted: impl FnOnce(&T) -> bool,
) -> Result<T, Error> {
    let Some(err) = transfer else {
        return outcome;
    };

    if !err.is_consumer_hangup() {
        if let Err(http) = &outcome {
            warn!(error = %http, "request failed after the encoder had already failed");
        }
        return Err(err.into());
    }

    match outcome {
        Ok(resp) if accepted(&resp) => Err(err.into()),
        other => {
            debug!("body stream abandoned by the request");
            other
        }
    }
}
