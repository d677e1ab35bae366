use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::StatusCode;
use std::time::Duration;

/// HTTP cache validators remembered from the last successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub body: Vec<u8>,
    pub validators: Validators,
}

#[derive(Debug, Clone)]
pub enum FetchStatus {
    Updated(FetchedBody),
    NotModified,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http client setup failed: {0}")]
    Client(reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
}

impl FetchError {
    fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(_) => true,
            FetchError::HttpStatus(code) => *code >= 500,
            FetchError::Client(_) => false,
        }
    }
}

pub fn build_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::Client)
}

pub async fn fetch_once(
    client: &reqwest::Client,
    url: &str,
    validators: &Validators,
) -> Result<FetchStatus, FetchError> {
    let mut request = client.get(url);
    if let Some(value) = validators.etag.as_deref() {
        request = request.header(IF_NONE_MATCH, value);
    }
    if let Some(value) = validators.last_modified.as_deref() {
        request = request.header(IF_MODIFIED_SINCE, value);
    }

    let response = request.send().await?;
    let status = response.status();
    if status == StatusCode::NOT_MODIFIED {
        return Ok(FetchStatus::NotModified);
    }
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let header = |name: reqwest::header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
    };
    let validators = Validators {
        etag: header(ETAG),
        last_modified: header(LAST_MODIFIED),
    };
    let body = response.bytes().await?.to_vec();

    Ok(FetchStatus::Updated(FetchedBody { body, validators }))
}

/// Fetches `url`, retrying request failures and 5xx responses with a linear
/// back-off.
pub async fn fetch_with_retry(
    client: &reqwest::Client,
    url: &str,
    validators: &Validators,
    max_retries: usize,
) -> Result<FetchStatus, FetchError> {
    let mut attempt = 0_usize;
    loop {
        match fetch_once(client, url, validators).await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                tracing::debug!(url, attempt, error = %err, "retrying feed fetch");
                tokio::time::sleep(Duration::from_millis(40 * attempt as u64)).await;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use axum::extract::State;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub const FEED_ETAG: &str = "\"essays-feed-v1\"";
    pub const FEED_LAST_MODIFIED: &str = "Thu, 04 Mar 2021 10:00:00 GMT";

    /// Serves the essay fixture at `/feed/`, fails the first `failures`
    /// requests with a 500, always 404s at `/missing/` and honours
    /// `If-None-Match`.
    #[derive(Clone)]
    pub struct FeedServer {
        pub hits: Arc<AtomicUsize>,
        failures: usize,
    }

    impl FeedServer {
        pub fn new(failures: usize) -> Self {
            Self {
                hits: Arc::new(AtomicUsize::new(0)),
                failures,
            }
        }

        pub fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }

        pub async fn spawn(self) -> (String, tokio::task::JoinHandle<()>) {
            let app = Router::new()
                .route("/feed/", get(feed_handler))
                .route("/missing/", get(missing_handler))
                .with_state(self);
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("listener should bind");
            let address = listener.local_addr().expect("local addr should exist");
            let join_handle = tokio::spawn(async move {
                axum::serve(listener, app).await.expect("server should run");
            });
            (format!("http://{address}"), join_handle)
        }
    }

    async fn feed_handler(State(server): State<FeedServer>, headers: HeaderMap) -> Response {
        let hit = server.hits.fetch_add(1, Ordering::SeqCst);
        if hit < server.failures {
            return (StatusCode::INTERNAL_SERVER_ERROR, "temporary failure").into_response();
        }

        let mut validators = HeaderMap::new();
        validators.insert(reqwest::header::ETAG, HeaderValue::from_static(FEED_ETAG));
        validators.insert(
            reqwest::header::LAST_MODIFIED,
            HeaderValue::from_static(FEED_LAST_MODIFIED),
        );

        let matches_etag = headers
            .get(reqwest::header::IF_NONE_MATCH)
            .and_then(|value| value.to_str().ok())
            == Some(FEED_ETAG);
        if matches_etag {
            return (StatusCode::NOT_MODIFIED, validators).into_response();
        }

        validators.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/rss+xml"),
        );
        (
            StatusCode::OK,
            validators,
            include_str!("../../../fixtures/essays.rss.xml"),
        )
            .into_response()
    }

    async fn missing_handler(State(server): State<FeedServer>) -> Response {
        server.hits.fetch_add(1, Ordering::SeqCst);
        (StatusCode::NOT_FOUND, "no such feed").into_response()
    }
}
