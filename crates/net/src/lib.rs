use core_types::Method;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Header attached to every request so servers can render a fragment instead of a full page.
pub const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "Fetch");

const MAX_REDIRECTS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormEntry {
    pub name: String,
    pub value: String,
}

impl FormEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Sent as `multipart/form-data`, entries in order.
    Multipart(Vec<FormEntry>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute URL; GET query strings are already folded in.
    pub url: String,
    pub method: Method,
    pub body: RequestBody,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            body: RequestBody::Empty,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FetchResponse {
    pub requested_url: String,
    pub url: String, // final URL after redirects
    pub redirected: bool,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub duration_ms: u128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    Client(String),
    InvalidMethod(String),
    Transport { url: String, message: String },
    Status { url: String, status: u16 },
    Body { url: String, message: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Client(msg) => write!(f, "client build error: {msg}"),
            FetchError::InvalidMethod(m) => write!(f, "invalid HTTP method `{m}`"),
            FetchError::Transport { url, message } => write!(f, "request to {url} failed: {message}"),
            FetchError::Status { url, status } => write!(f, "{url} answered with status {status}"),
            FetchError::Body { url, message } => write!(f, "reading body of {url} failed: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

pub type FetchCallback = Arc<dyn Fn(Result<FetchResponse, FetchError>) + Send + Sync>;

/// Blocking HTTP client shared by the network runtime.
///
/// Redirects are followed transparently; a cookie store stands in for the browser's
/// credential handling so session cookies ride along on every request.
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("ajax-page-loader/0.1")
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn build_request(
        &self,
        request: &FetchRequest,
    ) -> Result<reqwest::blocking::Request, FetchError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().to_ascii_uppercase().as_bytes())
            .map_err(|_| FetchError::InvalidMethod(request.method.to_string()))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1);

        if let RequestBody::Multipart(entries) = &request.body {
            let form = entries.iter().fold(
                reqwest::blocking::multipart::Form::new(),
                |form, entry| form.text(entry.name.clone(), entry.value.clone()),
            );
            builder = builder.multipart(form);
        }

        builder.build().map_err(|e| FetchError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        })
    }

    /// Execute a request; a non-2xx status is reported as [`FetchError::Status`].
    pub fn execute(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();
        let built = self.build_request(request)?;
        let requested_url = built.url().to_string();

        let resp = self.client.execute(built).map_err(|e| FetchError::Transport {
            url: requested_url.clone(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        let final_url = resp.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = resp.text().map_err(|e| FetchError::Body {
            url: final_url.clone(),
            message: e.to_string(),
        })?;

        Ok(FetchResponse {
            redirected: final_url != requested_url,
            requested_url,
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
            duration_ms: start.elapsed().as_millis(),
        })
    }
}

/// Run `request` on a worker thread and hand the outcome to `cb`.
pub fn fetch_text(client: Arc<HttpClient>, request: FetchRequest, cb: FetchCallback) {
    thread::spawn(move || {
        let result = client.execute(&request);
        cb(result);
    });
}
