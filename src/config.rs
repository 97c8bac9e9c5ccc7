//! Process configuration.
//!
//! Resolution order for every setting: CLI flag, then environment (a `.env` file in the
//! working directory is loaded first if present), then the built-in default. The result
//! is immutable and shared with every handler through server state.

use std::env;
use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Result};

pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_FILE_ROOT: &str = ".";

pub const ENV_AUTH_SECRET: &str = "AUTH_SECRET";
pub const ENV_HTTP_PORT: &str = "CHIRPY_HTTP_PORT";
pub const ENV_FILE_ROOT: &str = "CHIRPY_FILE_ROOT";

#[derive(Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Directory served under `/app`.
    pub file_root: PathBuf,
    /// HMAC key for bearer tokens. Changing it invalidates every outstanding token.
    pub auth_secret: String,
}

// Keep the secret out of logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_port", &self.http_port)
            .field("file_root", &self.file_root)
            .field("auth_secret", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    pub fn new(auth_secret: impl Into<String>) -> Self {
        Self { http_port: DEFAULT_HTTP_PORT, file_root: PathBuf::from(DEFAULT_FILE_ROOT), auth_secret: auth_secret.into() }
    }

    pub fn secret(&self) -> &[u8] { self.auth_secret.as_bytes() }

    /// Build from process environment and the given argv.
    pub fn from_env_and_args(args: &[String]) -> Result<Self> {
        // A missing .env is normal in production.
        let _ = dotenvy::dotenv();
        Self::resolve(args, |name| env::var(name).ok())
    }

    /// Resolution with an injectable environment lookup.
    pub fn resolve<F: Fn(&str) -> Option<String>>(args: &[String], lookup: F) -> Result<Self> {
        let auth_secret = lookup(ENV_AUTH_SECRET).unwrap_or_default();
        if auth_secret.trim().is_empty() {
            bail!("{ENV_AUTH_SECRET} must be set to a non-empty value");
        }
        let env_port = match lookup(ENV_HTTP_PORT) {
            Some(v) => Some(parse_port(ENV_HTTP_PORT, &v)?),
            None => None,
        };
        let arg_port = match parse_value_arg(args, "--http-port") {
            Some(v) => Some(parse_port("--http-port", &v)?),
            None => None,
        };
        let http_port = arg_port.or(env_port).unwrap_or(DEFAULT_HTTP_PORT);
        let file_root = parse_value_arg(args, "--file-root")
            .or_else(|| lookup(ENV_FILE_ROOT))
            .unwrap_or_else(|| DEFAULT_FILE_ROOT.to_string());
        Ok(Self { http_port, file_root: PathBuf::from(file_root), auth_secret })
    }
}

fn parse_port(source: &str, raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(p) => Ok(p),
        Err(e) => bail!("{source}: invalid port '{raw}': {e}"),
    }
}

fn parse_value_arg(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

pub const USAGE: &str = "chirpy\n\nUSAGE:\n  chirpy [--http-port N] [--file-root PATH]\n\nOPTIONS:\n  --http-port N       HTTP port (env: CHIRPY_HTTP_PORT, default 8080)\n  --file-root PATH    Directory served under /app (env: CHIRPY_FILE_ROOT, default .)\n\nENVIRONMENT:\n  AUTH_SECRET         Token signing secret (required)\n";
