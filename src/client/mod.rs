//! Client layer: the bulk package orchestrator and its HTTP transport.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{
    BulkResponse, CompressionMethod, ConnectionId, MessageEntry, MessageStore, PackageStatus,
    Password, RemoteMessages, SenderId, UnixTimestamp, ValidationError,
};
use crate::transport::{
    BulkForm, BulkReply, PACKAGE_FIELD, PackagePayload, TIMESTAMP_QUERY, TransportError,
    decode_bulk_response, encode_bulk_form,
};

const DEFAULT_HTTP_ENDPOINT: &str = "http://www.smslink.ro/sms/gateway/communicate/bulk-v3.php";
const DEFAULT_HTTPS_ENDPOINT: &str =
    "https://secure.smslink.ro/sms/gateway/communicate/bulk-v3.php";
const DEFAULT_CLIENT_VERSION: &str = "1.0";
const PACKAGE_FILE_NAME: &str = "package.txt";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    /// POST `fields` as a multipart form with the file at `package` attached as
    /// the `Package` part.
    fn post_multipart<'a>(
        &'a self,
        url: &'a str,
        fields: Vec<(String, String)>,
        package: &'a Path,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_multipart<'a>(
        &'a self,
        url: &'a str,
        fields: Vec<(String, String)>,
        package: &'a Path,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(package).await?;
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(PACKAGE_FILE_NAME)
                .mime_str("text/plain")?;

            let form = fields
                .into_iter()
                .fold(reqwest::multipart::Form::new(), |form, (key, value)| {
                    form.text(key, value)
                })
                .part(PACKAGE_FIELD, part);

            let response = self.client.post(url).multipart(form).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Protocol used to reach the gateway.
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ValidationError;

    /// Case-insensitive `HTTP` or `HTTPS`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "HTTP" => Ok(Self::Http),
            "HTTPS" => Ok(Self::Https),
            _ => Err(ValidationError::UnknownProtocol {
                input: value.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
/// Gateway credentials (`connection_id` + `password`).
///
/// Both parts are mandatory; a package cannot be built without them.
pub struct Credentials {
    connection_id: ConnectionId,
    password: Password,
}

impl Credentials {
    pub fn new(
        connection_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            connection_id: ConnectionId::new(connection_id)?,
            password: Password::new(password)?,
        })
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    fn push_form_params(&self, params: &mut Vec<(String, String)>) {
        params.push((
            ConnectionId::FIELD.to_owned(),
            self.connection_id.as_str().to_owned(),
        ));
        params.push((Password::FIELD.to_owned(), self.password.as_str().to_owned()));
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`BulkPackage`].
///
/// For transport and protocol failures the `Display` text is the gateway-style
/// message that is also recorded in [`BulkPackage::error_message`].
pub enum BulkPackageError {
    /// The package was already accepted by the gateway.
    #[error("package was already sent")]
    AlreadySent,

    /// The package holds no messages.
    #[error("package is empty")]
    EmptyPackage,

    /// The temporary payload file could not be written.
    #[error("ERROR;0;{0}")]
    Staging(#[source] io::Error),

    /// HTTP client / network failure (DNS, TLS, connection reset, timeouts).
    #[error("ERROR;0;{0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-2xx status code returned by the gateway.
    #[error("ERROR;0;Unexpected HTTP code {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// Reply body is not in the `;`-delimited bulk format.
    #[error("ERROR;0;Unexpected response format")]
    UnexpectedFormat,

    /// Gateway rejected the package; the reply body verbatim.
    #[error("{0}")]
    Gateway(String),

    /// Endpoint override is not a valid URL.
    #[error("ERROR;0;invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Build(#[source] reqwest::Error),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl BulkPackageError {
    /// Whether this failure happened while submitting and is recorded in
    /// [`BulkPackage::error_message`].
    fn is_submission_failure(&self) -> bool {
        matches!(
            self,
            Self::Staging(_)
                | Self::Transport(_)
                | Self::HttpStatus { .. }
                | Self::UnexpectedFormat
                | Self::Gateway(_)
                | Self::Endpoint(_)
        )
    }
}

impl From<TransportError> for BulkPackageError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::UnexpectedFormat => Self::UnexpectedFormat,
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`BulkPackage`].
///
/// Use this when you need to customize endpoints, protocol, timeout or the
/// directory used to stage the upload.
pub struct BulkPackageBuilder {
    credentials: Credentials,
    test_mode: bool,
    protocol: Protocol,
    http_endpoint: String,
    https_endpoint: String,
    compression: CompressionMethod,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    client_version: String,
    temp_dir: Option<PathBuf>,
    lock_after_send: bool,
}

impl BulkPackageBuilder {
    pub fn new(credentials: Credentials, test_mode: bool) -> Self {
        Self {
            credentials,
            test_mode,
            protocol: Protocol::default(),
            http_endpoint: DEFAULT_HTTP_ENDPOINT.to_owned(),
            https_endpoint: DEFAULT_HTTPS_ENDPOINT.to_owned(),
            compression: CompressionMethod::default(),
            timeout: None,
            user_agent: None,
            client_version: DEFAULT_CLIENT_VERSION.to_owned(),
            temp_dir: None,
            lock_after_send: false,
        }
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Override the endpoint used when the protocol is [`Protocol::Http`].
    pub fn http_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.http_endpoint = endpoint.into();
        self
    }

    /// Override the endpoint used when the protocol is [`Protocol::Https`].
    pub fn https_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.https_endpoint = endpoint.into();
        self
    }

    pub fn compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    ///
    /// Without it the request may wait indefinitely.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Client version reported in the `Version` form field.
    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = version.into();
        self
    }

    /// Directory for the temporary upload file (system temp dir by default).
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Reject message insertion and removal once the package was sent.
    ///
    /// Off by default: a sent package can still be edited, although it cannot be
    /// sent again.
    pub fn lock_after_send(mut self, lock: bool) -> Self {
        self.lock_after_send = lock;
        self
    }

    /// Build a [`BulkPackage`].
    pub fn build(self) -> Result<BulkPackage, BulkPackageError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(BulkPackageError::Build)?;

        self.build_with(Arc::new(ReqwestTransport { client }))
    }

    fn build_with(self, http: Arc<dyn HttpTransport>) -> Result<BulkPackage, BulkPackageError> {
        Url::parse(&self.http_endpoint)?;
        Url::parse(&self.https_endpoint)?;

        Ok(BulkPackage {
            credentials: self.credentials,
            test_mode: self.test_mode,
            protocol: self.protocol,
            http_endpoint: self.http_endpoint,
            https_endpoint: self.https_endpoint,
            client_version: self.client_version,
            temp_dir: self.temp_dir,
            lock_after_send: self.lock_after_send,
            http,
            compression: self.compression,
            store: MessageStore::new(),
            status: PackageStatus::Draft,
            payload: None,
            remote_package_id: None,
            remote_message_ids: RemoteMessages::new(),
            error_message: String::new(),
        })
    }
}

/// One bulk SMS package: collect messages locally, upload them in a single
/// request, then read the per-message outcome.
///
/// ```rust,no_run
/// use smslink_bulk::{BulkPackage, Credentials};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let mut package = BulkPackage::new(Credentials::new("MyConnectionID", "MyPassword")?, false);
/// package.insert_message(1, "0712345678", "numeric", "Test SMS 1", 0)?;
/// if package.send().await {
///     for message in package.remote_message_ids() {
///         println!("{} -> {}", message.local_message_id, message.remote_message_id);
///     }
/// } else {
///     eprintln!("{}", package.error_message());
/// }
/// # Ok(())
/// # }
/// ```
pub struct BulkPackage {
    credentials: Credentials,
    test_mode: bool,
    protocol: Protocol,
    http_endpoint: String,
    https_endpoint: String,
    client_version: String,
    temp_dir: Option<PathBuf>,
    lock_after_send: bool,
    http: Arc<dyn HttpTransport>,
    compression: CompressionMethod,
    store: MessageStore,
    status: PackageStatus,
    payload: Option<PackagePayload>,
    remote_package_id: Option<String>,
    remote_message_ids: RemoteMessages,
    error_message: String,
}

impl BulkPackage {
    /// Create a draft package with default endpoints, HTTPS and no compression.
    pub fn new(credentials: Credentials, test_mode: bool) -> Self {
        Self {
            credentials,
            test_mode,
            protocol: Protocol::default(),
            http_endpoint: DEFAULT_HTTP_ENDPOINT.to_owned(),
            https_endpoint: DEFAULT_HTTPS_ENDPOINT.to_owned(),
            client_version: DEFAULT_CLIENT_VERSION.to_owned(),
            temp_dir: None,
            lock_after_send: false,
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
            compression: CompressionMethod::default(),
            store: MessageStore::new(),
            status: PackageStatus::Draft,
            payload: None,
            remote_package_id: None,
            remote_message_ids: RemoteMessages::new(),
            error_message: String::new(),
        }
    }

    pub fn builder(credentials: Credentials, test_mode: bool) -> BulkPackageBuilder {
        BulkPackageBuilder::new(credentials, test_mode)
    }

    /// Queue one message.
    ///
    /// `local_message_id` must be digits only. `receiver_number` is normalized
    /// (leading `+` to `00`, non-digits dropped) and must not end up empty.
    /// `timestamp_programmed` is `0` for immediate delivery or a Unix timestamp.
    ///
    /// On error nothing is inserted.
    pub fn insert_message(
        &mut self,
        local_message_id: impl ToString,
        receiver_number: impl Into<String>,
        sender_id: impl Into<String>,
        message_text: impl AsRef<str>,
        timestamp_programmed: u64,
    ) -> Result<(), ValidationError> {
        if self.is_locked() {
            return Err(ValidationError::PackageLocked);
        }
        let entry = MessageEntry::new(
            local_message_id,
            receiver_number,
            SenderId::new(sender_id),
            message_text,
            UnixTimestamp::new(timestamp_programmed),
        )?;
        self.store.insert(entry);
        Ok(())
    }

    /// Remove the first queued message with this local id. Unknown ids are ignored.
    pub fn remove_message(&mut self, local_message_id: impl ToString) {
        if self.is_locked() {
            return;
        }
        self.store.remove(&local_message_id.to_string());
    }

    pub fn package_size(&self) -> usize {
        self.store.len()
    }

    pub fn messages(&self) -> &MessageStore {
        &self.store
    }

    /// Select the compression method by gateway id (`0..=3`).
    ///
    /// Returns `false` and keeps the current method when the id is unknown or
    /// the package was already sent.
    pub fn set_compression(&mut self, compression_id: u8) -> bool {
        CompressionMethod::from_id(compression_id)
            .and_then(|method| self.set_compression_method(method))
            .is_ok()
    }

    pub fn set_compression_method(
        &mut self,
        method: CompressionMethod,
    ) -> Result<(), ValidationError> {
        if self.status != PackageStatus::Draft {
            return Err(ValidationError::PackageSent);
        }
        self.compression = method;
        Ok(())
    }

    pub fn compression(&self) -> CompressionMethod {
        self.compression
    }

    /// Select the protocol by name (`HTTP` or `HTTPS`, any case).
    ///
    /// Returns `false` and keeps the current protocol for any other name.
    pub fn set_protocol(&mut self, name: &str) -> bool {
        match name.parse() {
            Ok(protocol) => {
                self.protocol = protocol;
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_protocol_kind(&mut self, protocol: Protocol) {
        self.protocol = protocol;
    }

    pub fn get_protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn status(&self) -> PackageStatus {
        self.status
    }

    /// Gateway package id; `None` until a send succeeds.
    pub fn remote_package_id(&self) -> Option<&str> {
        self.remote_package_id.as_deref()
    }

    /// Per-message outcomes of the last send attempt.
    pub fn remote_message_ids(&self) -> &RemoteMessages {
        &self.remote_message_ids
    }

    /// Last transport/protocol error, empty when the last attempt did not fail.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Payload built by the last send attempt.
    pub fn last_payload(&self) -> Option<&PackagePayload> {
        self.payload.as_ref()
    }

    /// Upload the package. Returns `true` when the gateway accepted it.
    ///
    /// On failure, inspect [`BulkPackage::error_message`]; the package stays a
    /// draft and can be sent again.
    pub async fn send(&mut self) -> bool {
        self.try_send().await.is_ok()
    }

    /// Upload the package, returning the failure as an error.
    ///
    /// Errors:
    /// - [`BulkPackageError::AlreadySent`] when a previous send succeeded (results
    ///   of that send are kept),
    /// - [`BulkPackageError::EmptyPackage`] when there is nothing to send,
    /// - any transport or protocol failure, which is also recorded in
    ///   [`BulkPackage::error_message`].
    pub async fn try_send(&mut self) -> Result<(), BulkPackageError> {
        if self.status == PackageStatus::Sent {
            return Err(BulkPackageError::AlreadySent);
        }

        self.remote_message_ids = RemoteMessages::new();
        self.error_message.clear();

        if self.store.is_empty() {
            return Err(BulkPackageError::EmptyPackage);
        }

        let payload = PackagePayload::build(&self.store, self.compression);
        debug!(
            receivers = self.store.len(),
            compression = payload.compression.id(),
            size_plain = payload.size_plain(),
            size_compressed = payload.size_compressed(),
            md5_plain = %payload.md5_plain,
            md5_compressed = %payload.md5_compressed,
            "built bulk package"
        );

        let result = self.submit(&payload).await;
        self.payload = Some(payload);

        match result {
            Ok(response) => {
                info!(
                    remote_package_id = %response.remote_package_id,
                    messages = response.messages.len(),
                    "bulk package accepted"
                );
                self.remote_package_id = Some(response.remote_package_id);
                self.remote_message_ids = response.messages;
                self.status = PackageStatus::Sent;
                Ok(())
            }
            Err(err) => {
                if err.is_submission_failure() {
                    warn!(error = %err, "bulk package submission failed");
                    self.error_message = err.to_string();
                }
                Err(err)
            }
        }
    }

    async fn submit(
        &self,
        payload: &PackagePayload,
    ) -> Result<BulkResponse, BulkPackageError> {
        let timestamp = unix_now();
        let url = self.endpoint_url(timestamp)?;

        let mut fields = Vec::<(String, String)>::new();
        self.credentials.push_form_params(&mut fields);
        fields.extend(encode_bulk_form(&BulkForm {
            test_mode: self.test_mode,
            payload,
            receivers: self.store.len(),
            timestamp,
            client_version: &self.client_version,
        }));

        let staged = self
            .stage_package(&payload.compressed)
            .map_err(BulkPackageError::Staging)?;

        debug!(endpoint = %url, protocol = %self.protocol, "submitting bulk package");
        let response = self
            .http
            .post_multipart(url.as_str(), fields, staged.path())
            .await;

        if let Err(err) = staged.close() {
            warn!(error = %err, "failed to remove staged package file");
        }

        let response = response.map_err(BulkPackageError::Transport)?;

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(BulkPackageError::HttpStatus {
                status: response.status,
                body,
            });
        }

        match decode_bulk_response(&response.body)? {
            BulkReply::Accepted(response) => Ok(response),
            BulkReply::Rejected(body) => Err(BulkPackageError::Gateway(body)),
        }
    }

    fn endpoint_url(&self, timestamp: u64) -> Result<Url, BulkPackageError> {
        let endpoint = match self.protocol {
            Protocol::Http => &self.http_endpoint,
            Protocol::Https => &self.https_endpoint,
        };
        let mut url = Url::parse(endpoint)?;
        url.query_pairs_mut()
            .append_pair(TIMESTAMP_QUERY, &timestamp.to_string());
        Ok(url)
    }

    /// Write the upload bytes to a temporary file that is removed on drop.
    fn stage_package(&self, content: &[u8]) -> io::Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("smslink-package-").suffix(".txt");
        let mut file = match self.temp_dir.as_deref() {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(content)?;
        file.flush()?;
        Ok(file)
    }

    fn is_locked(&self) -> bool {
        self.lock_after_send && self.status == PackageStatus::Sent
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
