use crate::config::Options;
use crate::error::reqwest::WrappedReqwestError;
use crate::error::transport::BuildTransportError::{
    CreateHttpClientFailed, InvalidEndpoint, InvalidHeader,
};
use crate::error::transport::TransportError::{ReadBodyFailed, RequestFailed, UnexpectedStatus};
use crate::error::transport::{BuildTransportError, TransportError};
use crate::http::retryable::Retryable;
use crate::http::tls::TlsSettings;
use backoff::ExponentialBackoffBuilder;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use slog::{debug, error, warn, Logger};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Response headers passed through to callers; everything else is dropped.
pub const SUPPORTED_HEADERS: [&str; 4] = [
    "user-highest-id",
    "user-lowest-id",
    "group-highest-id",
    "group-lowest-id",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// Issues GET requests against one directory endpoint.
pub struct Transport {
    logger: Logger,
    endpoint: Url,
    options: Options,
    client: Client,
}

impl Transport {
    pub fn new(
        logger: &Logger,
        endpoint: &str,
        options: Options,
    ) -> Result<Self, BuildTransportError> {
        let endpoint =
            Url::parse(endpoint).map_err(|err| InvalidEndpoint(endpoint.to_string(), err))?;

        let mut builder = Client::builder()
            .use_rustls_tls()
            .default_headers(default_headers(&options)?)
            .connect_timeout(options.request_timeout())
            .timeout(options.request_timeout());

        if endpoint.scheme() == "https" {
            if let Some(tls) = TlsSettings::from_options(&options)? {
                builder = tls.apply(builder);
            }
        }

        if let Some(proxy_url) = options.http_proxy.as_deref().filter(|p| !p.is_empty()) {
            match reqwest::Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(err) => warn!(logger, "ignoring invalid proxy url {}: {}", proxy_url, err),
            }
        }

        let client = builder
            .build()
            .map_err(|err| CreateHttpClientFailed(WrappedReqwestError(err)))?;

        Ok(Transport {
            logger: logger.clone(),
            endpoint,
            options,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn request_url(&self, path: &str, query: &str) -> Url {
        let joined = format!(
            "{}/{}",
            self.endpoint.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = self.endpoint.clone();
        url.set_path(&joined);
        url.set_query(if query.is_empty() { None } else { Some(query) });
        url
    }

    /// Issues one GET to `endpoint + path + "?" + query`, retrying transient
    /// network failures up to the configured attempt count.
    pub fn request(&self, path: &str, query: &str) -> Result<Response, TransportError> {
        let url = self.request_url(path, query);
        let max_attempts = self.options.request_retry();
        let mut attempts = 0;

        debug!(self.logger, "GET {}", url);

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(200))
            .with_max_interval(Duration::from_secs(2))
            .with_max_elapsed_time(None)
            .build();
        let operation = || {
            attempts += 1;
            let mut request = self.client.get(url.clone());
            if let Some((user, password)) = self.options.basic_auth() {
                request = request.basic_auth(user, Some(password));
            }
            request.send().map_err(|err| {
                let err = WrappedReqwestError(err);
                if err.is_retryable() && attempts < max_attempts {
                    warn!(
                        self.logger,
                        "attempt {}/{} to {} failed: {}", attempts, max_attempts, url, err
                    );
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                }
            })
        };

        let response = backoff::retry(policy, operation).map_err(|err| {
            let source = match err {
                backoff::Error::Permanent(err) => err,
                backoff::Error::Transient { err, .. } => err,
            };
            error!(self.logger, "http request error: {}", source);
            RequestFailed {
                url: url.to_string(),
                attempts,
                source,
            }
        })?;

        let status = response.status();
        let headers = supported_headers(response.headers());
        let body = response.bytes().map_err(|err| ReadBodyFailed {
            url: url.to_string(),
            source: WrappedReqwestError(err),
        })?;

        if status != StatusCode::OK {
            return Err(UnexpectedStatus {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(Response {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn default_headers(options: &Options) -> Result<HeaderMap, BuildTransportError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &options.http_headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| InvalidHeader(name.clone()))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| InvalidHeader(name.clone()))?;
        headers.append(header_name, header_value);
    }

    let user_agent = options.user_agent();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&user_agent).map_err(|_| InvalidHeader(USER_AGENT.to_string()))?,
    );

    if let Some(token) = options.auth_token.as_deref().filter(|t| !t.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|_| InvalidHeader(AUTHORIZATION.to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

fn supported_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    SUPPORTED_HEADERS
        .iter()
        .filter_map(|name| {
            let value = headers.get(*name)?.to_str().ok()?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}
