//! Outbound HTTP clients for upstream fetches.
//!
//! [`UpstreamClient`] owns a direct client and, when a forward proxy is
//! configured, a second client whose connector opens a `CONNECT` tunnel
//! through that proxy before the (optional) TLS handshake. Which one a
//! fetch uses is decided per request.

use std::time::Duration;

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderValue, ACCEPT, USER_AGENT};
use hyper_util::client::legacy::connect::proxy::Tunnel;
use hyper_util::client::legacy::connect::{Connect, HttpConnector};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use url::{Position, Url};

use crate::error::{FetchError, GatewayError};

pub type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;
pub type TunnelConnector = hyper_rustls::HttpsConnector<Tunnel<HttpConnector>>;
pub type HttpClient = Client<HttpsConnector, Full<Bytes>>;
pub type TunnelClient = Client<TunnelConnector, Full<Bytes>>;

const UA: &str = concat!("fetchgate/", env!("CARGO_PKG_VERSION"));

/// A fully buffered upstream response.
#[derive(Debug)]
pub struct FetchedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct UpstreamClient {
    direct: HttpClient,
    tunnel: Option<TunnelClient>,
    timeout: Option<Duration>,
}

fn install_crypto_provider() {
    // rustls cannot pick a provider on its own when several are compiled in.
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    install_crypto_provider();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new()).build(https)
}

#[must_use]
pub fn build_tunnel_client(proxy: Uri) -> TunnelClient {
    install_crypto_provider();

    let tunnel = Tunnel::new(proxy, HttpConnector::new());
    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(tunnel);
    Client::builder(TokioExecutor::new()).build(https)
}

impl UpstreamClient {
    /// `forward_proxy` must already be validated as an `http://` URL.
    pub fn new(
        forward_proxy: Option<&Url>,
        timeout: Option<Duration>,
    ) -> Result<Self, GatewayError> {
        let tunnel = forward_proxy
            .map(|proxy| {
                proxy
                    .as_str()
                    .parse::<Uri>()
                    .map(build_tunnel_client)
                    .map_err(|e| GatewayError::UriParse {
                        source: Box::new(e),
                    })
            })
            .transpose()?;

        Ok(Self {
            direct: build_http_client(),
            tunnel,
            timeout,
        })
    }

    #[must_use]
    pub const fn has_forward_proxy(&self) -> bool {
        self.tunnel.is_some()
    }

    /// GET `target` and buffer the whole response.
    ///
    /// Goes through the forward proxy when one is configured and
    /// `bypass_proxy` is false.
    pub async fn fetch(
        &self,
        target: &str,
        bypass_proxy: bool,
    ) -> Result<FetchedResponse, FetchError> {
        let uri = upstream_uri(target)?;
        let request = hyper::Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(USER_AGENT, HeaderValue::from_static(UA))
            .header(ACCEPT, HeaderValue::from_static("*/*"))
            .body(Full::new(Bytes::new()))?;

        let exchange = async {
            match (&self.tunnel, bypass_proxy) {
                (Some(tunnel), false) => send(tunnel, request).await,
                _ => send(&self.direct, request).await,
            }
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| FetchError::Timeout(limit))?,
            None => exchange.await,
        }
    }
}

async fn send<C>(
    client: &Client<C, Full<Bytes>>,
    request: hyper::Request<Full<Bytes>>,
) -> Result<FetchedResponse, FetchError>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    let response = client.request(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await?.to_bytes();

    Ok(FetchedResponse {
        status,
        headers,
        body,
    })
}

/// Normalize a caller-supplied URL into a request URI.
///
/// The authority always carries an explicit port so a `CONNECT` tunnel
/// targets the right one for plain-HTTP destinations. Fragments and
/// userinfo are not sent upstream.
pub fn upstream_uri(target: &str) -> Result<Uri, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: target.to_string(),
        reason,
    };

    let url = Url::parse(target).map_err(|e| invalid(e.to_string()))?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(invalid(format!(
            "unsupported scheme '{scheme}' (expected http or https)"
        )));
    }
    let host = url.host_str().ok_or_else(|| invalid("missing host".into()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid("missing port".into()))?;
    let path_and_query = &url[Position::BeforePath..Position::AfterQuery];

    format!("{scheme}://{host}:{port}{path_and_query}")
        .parse::<Uri>()
        .map_err(|e| invalid(e.to_string()))
}
