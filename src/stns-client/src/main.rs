use crate::logger::create_root_logger;
use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser};
use stns_core::challenge::FileChallengeStore;
use stns_core::config::Options;
use stns_core::{MalformedKeyPolicy, Stns};
use std::path::PathBuf;
use std::sync::Arc;

mod commands;
mod logger;

/// Queries an STNS directory and runs SSH-key challenge-response authentication.
#[derive(Parser)]
#[command(name = "stns-client", version, arg_required_else_help = true)]
pub struct CliOpts {
    /// Displays detailed information about operations. -vv also logs every rejected key.
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppresses informational messages. -qq limits to errors only; -qqqq disables them all.
    #[arg(long, short, action = ArgAction::Count, global = true)]
    quiet: u8,

    /// Base url of the directory service.
    #[arg(
        long,
        env = "STNS_ENDPOINT",
        default_value = "http://localhost:1104/v1",
        global = true
    )]
    endpoint: String,

    #[command(flatten)]
    connection: ConnectionOpts,

    #[command(subcommand)]
    command: commands::StnsCommand,
}

/// Overrides for settings otherwise read from `STNS_*` environment variables.
#[derive(Args)]
struct ConnectionOpts {
    #[arg(long, global = true)]
    auth_token: Option<String>,

    /// HTTP basic auth user name; used together with `--basic-auth-password`.
    #[arg(long, global = true)]
    basic_auth_user: Option<String>,

    #[arg(long, global = true)]
    basic_auth_password: Option<String>,

    /// Do not validate the server certificate.
    #[arg(long, global = true)]
    skip_verify: bool,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    request_timeout: Option<u64>,

    /// Total attempts per request.
    #[arg(long, global = true)]
    request_retry: Option<u32>,

    #[arg(long, global = true)]
    http_proxy: Option<String>,

    /// Extra request header, as NAME=VALUE. May be repeated.
    #[arg(long = "header", global = true, value_name = "NAME=VALUE")]
    headers: Vec<String>,

    /// PEM bundle of trusted certificate authorities.
    #[arg(long, global = true)]
    tls_ca: Option<PathBuf>,

    #[arg(long, global = true, requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    #[arg(long, global = true, requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    #[arg(long, global = true)]
    private_key: Option<PathBuf>,

    #[arg(long, global = true)]
    private_key_password: Option<String>,

    /// Directory holding issued challenge codes. Defaults to the system temp directory.
    #[arg(long, global = true)]
    challenge_dir: Option<PathBuf>,

    /// Skip unparsable public keys instead of failing verification.
    #[arg(long, global = true)]
    skip_malformed_keys: bool,
}

impl ConnectionOpts {
    fn to_options(&self) -> anyhow::Result<Options> {
        let mut options = Options::from_env()?;
        if let Some(token) = &self.auth_token {
            options.auth_token = Some(token.clone());
        }
        if let Some(user) = &self.basic_auth_user {
            options.user = Some(user.clone());
        }
        if let Some(password) = &self.basic_auth_password {
            options.password = Some(password.clone());
        }
        if self.skip_verify {
            options.skip_ssl_verify = true;
        }
        if let Some(timeout) = self.request_timeout {
            options.request_timeout = timeout;
        }
        if let Some(retry) = self.request_retry {
            options.request_retry = retry;
        }
        if let Some(proxy) = &self.http_proxy {
            options.http_proxy = Some(proxy.clone());
        }
        for header in &self.headers {
            let Some((name, value)) = header.split_once('=') else {
                bail!("Header '{}' is not of the form NAME=VALUE", header);
            };
            options
                .http_headers
                .insert(name.trim().to_string(), value.trim().to_string());
        }
        if let Some(ca) = &self.tls_ca {
            options.tls.ca = Some(ca.clone());
        }
        if let Some(cert) = &self.tls_cert {
            options.tls.cert = Some(cert.clone());
        }
        if let Some(key) = &self.tls_key {
            options.tls.key = Some(key.clone());
        }
        if let Some(path) = &self.private_key {
            options.private_key_path = path.clone();
        }
        if let Some(password) = &self.private_key_password {
            options.private_key_password = Some(password.clone());
        }
        Ok(options)
    }
}

fn build_stns(opts: &CliOpts, log: &slog::Logger) -> anyhow::Result<Stns> {
    let options = opts.connection.to_options()?;
    let mut stns = Stns::with_logger(log, &opts.endpoint, options)
        .with_context(|| format!("Failed to set up a client for {}", opts.endpoint))?;
    if let Some(dir) = &opts.connection.challenge_dir {
        stns = stns.with_challenge_store(Arc::new(FileChallengeStore::in_dir(log, dir)));
    }
    if opts.connection.skip_malformed_keys {
        stns = stns.with_malformed_key_policy(MalformedKeyPolicy::Skip);
    }
    Ok(stns)
}

fn inner_main() -> anyhow::Result<()> {
    let opts = CliOpts::parse();
    let verbose_level = opts.verbose as i64 - opts.quiet as i64;
    let log = create_root_logger(verbose_level);

    let stns = build_stns(&opts, &log)?;
    slog::trace!(log, "Trace mode enabled. Lots of logs coming up.");
    commands::exec(&stns, opts.command)
}

fn main() {
    if let Err(err) = inner_main() {
        for (level, cause) in err.chain().enumerate() {
            let prefix = if level == 0 { "Error" } else { "Caused by" };
            eprintln!("{prefix}: {cause}");
        }
        std::process::exit(255);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        CliOpts::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let opts = CliOpts::parse_from([
            "stns-client",
            "--request-retry",
            "5",
            "--header",
            "X-Trace = abc",
            "--private-key",
            "/keys/id_ed25519",
            "user",
            "--name",
            "pyama",
        ]);
        let options = opts.connection.to_options().unwrap();
        assert_eq!(options.request_retry, 5);
        assert_eq!(options.http_headers.get("X-Trace").unwrap(), "abc");
        assert_eq!(options.private_key_path, PathBuf::from("/keys/id_ed25519"));
    }

    #[test]
    fn malformed_header_is_rejected() {
        let opts = CliOpts::parse_from(["stns-client", "--header", "nope", "group"]);
        assert!(opts.connection.to_options().is_err());
    }

    #[test]
    fn tls_cert_requires_key() {
        let result = CliOpts::try_parse_from(["stns-client", "--tls-cert", "c.pem", "group"]);
        assert!(result.is_err());
    }
}
