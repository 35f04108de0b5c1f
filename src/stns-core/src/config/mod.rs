use crate::error::config::ConfigError;
use crate::error::config::ConfigError::InvalidEnvValue;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REQUEST_RETRY: u32 = 3;
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "~/.ssh/id_rsa";

pub const ENV_AUTH_TOKEN: &str = "STNS_AUTH_TOKEN";
pub const ENV_USER: &str = "STNS_USER";
pub const ENV_PASSWORD: &str = "STNS_PASSWORD";
pub const ENV_SKIP_VERIFY: &str = "STNS_SKIP_VERIFY";
pub const ENV_REQUEST_TIMEOUT: &str = "STNS_REQUEST_TIMEOUT";
pub const ENV_REQUEST_RETRY: &str = "STNS_REQUEST_RETRY";
pub const ENV_PRIVATE_KEY: &str = "STNS_PRIVATE_KEY";
pub const ENV_PRIVATE_KEY_PASSWORD: &str = "STNS_PRIVATE_KEY_PASSWORD";

pub fn stns_core_version_str() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), stns_core_version_str())
}

/// TLS trust material used when the endpoint is `https`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TlsOptions {
    /// PEM bundle of certificate authorities trusted for the server certificate.
    pub ca: Option<PathBuf>,
    /// PEM client certificate, presented only when `key` is also set.
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Options {
    pub auth_token: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub user_agent: Option<String>,
    pub skip_ssl_verify: bool,
    pub http_proxy: Option<String>,
    /// Seconds. Zero selects the default.
    pub request_timeout: u64,
    /// Total attempts per request. Zero selects the default.
    pub request_retry: u32,
    pub http_headers: BTreeMap<String, String>,
    pub tls: TlsOptions,
    pub private_key_path: PathBuf,
    pub private_key_password: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            auth_token: None,
            user: None,
            password: None,
            user_agent: None,
            skip_ssl_verify: false,
            http_proxy: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            request_retry: DEFAULT_REQUEST_RETRY,
            http_headers: BTreeMap::new(),
            tls: TlsOptions::default(),
            private_key_path: PathBuf::from(DEFAULT_PRIVATE_KEY_PATH),
            private_key_password: None,
        }
    }
}

impl Options {
    /// Default options with every `STNS_*` environment variable applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Options::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value if set.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_AUTH_TOKEN) {
            self.auth_token = Some(v);
        }
        if let Some(v) = lookup(ENV_USER) {
            self.user = Some(v);
        }
        if let Some(v) = lookup(ENV_PASSWORD) {
            self.password = Some(v);
        }
        if let Some(v) = lookup(ENV_SKIP_VERIFY) {
            self.skip_ssl_verify = parse_bool(ENV_SKIP_VERIFY, &v)?;
        }
        if let Some(v) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout = v.trim().parse().map_err(|_| InvalidEnvValue {
                name: ENV_REQUEST_TIMEOUT,
                value: v.clone(),
                expected: "a number of seconds",
            })?;
        }
        if let Some(v) = lookup(ENV_REQUEST_RETRY) {
            self.request_retry = v.trim().parse().map_err(|_| InvalidEnvValue {
                name: ENV_REQUEST_RETRY,
                value: v.clone(),
                expected: "a non-negative integer",
            })?;
        }
        if let Some(v) = lookup(ENV_PRIVATE_KEY) {
            self.private_key_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_PRIVATE_KEY_PASSWORD) {
            self.private_key_password = Some(v);
        }
        Ok(self)
    }

    pub fn user_agent(&self) -> String {
        match &self.user_agent {
            Some(agent) if !agent.is_empty() => agent.clone(),
            _ => default_user_agent(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout {
            0 => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn request_retry(&self) -> u32 {
        match self.request_retry {
            0 => DEFAULT_REQUEST_RETRY,
            n => n,
        }
    }

    /// Basic credentials, only when both halves are present and non-empty.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user, password))
            }
            _ => None,
        }
    }

    pub fn private_key_password(&self) -> Option<&str> {
        self.private_key_password
            .as_deref()
            .filter(|password| !password.is_empty())
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(InvalidEnvValue {
            name,
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.request_timeout(), Duration::from_secs(15));
        assert_eq!(opts.request_retry(), 3);
        assert_eq!(opts.private_key_path, PathBuf::from("~/.ssh/id_rsa"));
        assert_eq!(
            opts.user_agent(),
            format!("stns-core/{}", stns_core_version_str())
        );
        assert!(opts.basic_auth().is_none());
    }

    #[test]
    fn zero_values_select_defaults() {
        let opts = Options {
            request_timeout: 0,
            request_retry: 0,
            user_agent: Some(String::new()),
            ..Options::default()
        };
        assert_eq!(opts.request_timeout(), Duration::from_secs(15));
        assert_eq!(opts.request_retry(), 3);
        assert!(opts.user_agent().starts_with("stns-core/"));
    }

    #[test]
    fn explicit_values_are_kept() {
        let opts = Options {
            request_timeout: 30,
            request_retry: 6,
            user_agent: Some("libstns/update".to_string()),
            ..Options::default()
        };
        assert_eq!(opts.request_timeout(), Duration::from_secs(30));
        assert_eq!(opts.request_retry(), 6);
        assert_eq!(opts.user_agent(), "libstns/update");
    }

    #[test]
    fn env_overrides_replace_fields() {
        let opts = Options::default()
            .with_overrides_from(lookup_in(&[
                (ENV_AUTH_TOKEN, "secret"),
                (ENV_USER, "alice"),
                (ENV_PASSWORD, "hunter2"),
                (ENV_SKIP_VERIFY, "true"),
                (ENV_REQUEST_TIMEOUT, "5"),
                (ENV_REQUEST_RETRY, "1"),
                (ENV_PRIVATE_KEY, "/keys/id_ed25519"),
                (ENV_PRIVATE_KEY_PASSWORD, "test"),
            ]))
            .unwrap();
        assert_eq!(opts.auth_token.as_deref(), Some("secret"));
        assert_eq!(opts.basic_auth(), Some(("alice", "hunter2")));
        assert!(opts.skip_ssl_verify);
        assert_eq!(opts.request_timeout(), Duration::from_secs(5));
        assert_eq!(opts.request_retry(), 1);
        assert_eq!(opts.private_key_path, PathBuf::from("/keys/id_ed25519"));
        assert_eq!(opts.private_key_password(), Some("test"));
    }

    #[test]
    fn unset_env_keeps_configured_values() {
        let opts = Options {
            auth_token: Some("configured".to_string()),
            ..Options::default()
        }
        .with_overrides_from(lookup_in(&[]))
        .unwrap();
        assert_eq!(opts.auth_token.as_deref(), Some("configured"));
    }

    #[test]
    fn invalid_env_values_name_the_variable() {
        let err = Options::default()
            .with_overrides_from(lookup_in(&[(ENV_REQUEST_RETRY, "many")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_REQUEST_RETRY));

        let err = Options::default()
            .with_overrides_from(lookup_in(&[(ENV_SKIP_VERIFY, "yes")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_SKIP_VERIFY));
    }

    #[test]
    fn basic_auth_needs_both_halves() {
        let opts = Options {
            user: Some("alice".to_string()),
            ..Options::default()
        };
        assert!(opts.basic_auth().is_none());
    }

    #[test]
    fn deserializes_partial_json() {
        let opts: Options =
            serde_json::from_str(r#"{"auth_token":"t","tls":{"ca":"/etc/ca.pem"}}"#).unwrap();
        assert_eq!(opts.auth_token.as_deref(), Some("t"));
        assert_eq!(opts.tls.ca, Some(PathBuf::from("/etc/ca.pem")));
        assert_eq!(opts.request_retry(), 3);
    }
}
