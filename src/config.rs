use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

pub(crate) const DEFAULT_SERVER: &str = "127.0.0.1:7777";
pub(crate) const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_NET_TIMEOUT: Duration = Duration::from_secs(2);
pub(crate) const DEFAULT_CONFIG_EXT: &str = "json";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("engine binary not found; searched: {}", .searched.join(", "))]
    EngineNotFound { searched: Vec<String> },
    #[error("engine path {} is not an executable file", .0.display())]
    EngineNotExecutable(PathBuf),
    #[error("invalid configuration extension {0:?}")]
    BadExtension(String),
}

/// Whether resolving the connection popup contacts the list server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ConnectPolicy {
    /// Connect whatever the answer was.
    #[default]
    Always,
    /// Connect only when the answer was yes.
    OnYes,
}

#[derive(Parser, Debug)]
#[command(name = "oak", version, about = "Transactional REPL for an external engine", long_about = None)]
struct ClapArgs {
    /// Engine binary. Discovered from OAK_ENGINE, PATH or ./zig-out/bin when omitted.
    engine: Option<PathBuf>,

    #[arg(long, env = "OAK_SERVER", default_value = DEFAULT_SERVER, help = "list server address")]
    server: String,

    #[arg(long, help = "never contact the list server")]
    offline: bool,

    #[arg(long, value_enum, default_value_t = ConnectPolicy::Always)]
    connect_policy: ConnectPolicy,

    #[arg(
        long,
        default_value_t = DEFAULT_ENGINE_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "seconds before a running engine is killed"
    )]
    engine_timeout: u64,

    #[arg(long, help = "directory holding the working and checkpoint buffers")]
    buffer_dir: Option<PathBuf>,

    #[arg(long, help = "directory the configuration picker opens in")]
    config_dir: Option<PathBuf>,

    #[arg(long = "config-ext", default_values_t = vec![DEFAULT_CONFIG_EXT.to_string()])]
    config_exts: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) engine: Option<PathBuf>,
    pub(crate) server: String,
    pub(crate) offline: bool,
    pub(crate) connect_policy: ConnectPolicy,
    pub(crate) engine_timeout: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) io_timeout: Duration,
    pub(crate) buffer_dir: PathBuf,
    pub(crate) config_dir: PathBuf,
    pub(crate) config_exts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: None,
            server: DEFAULT_SERVER.to_string(),
            offline: false,
            connect_policy: ConnectPolicy::Always,
            engine_timeout: Duration::from_secs(DEFAULT_ENGINE_TIMEOUT_SECS),
            connect_timeout: DEFAULT_NET_TIMEOUT,
            io_timeout: DEFAULT_NET_TIMEOUT,
            buffer_dir: default_buffer_dir(),
            config_dir: PathBuf::from("."),
            config_exts: vec![DEFAULT_CONFIG_EXT.to_string()],
        }
    }
}

impl Config {
    pub(crate) fn parse() -> Result<Self, ConfigError> {
        Self::from_args(ClapArgs::parse())
    }

    #[cfg(test)]
    pub(crate) fn parse_from<I, T>(itr: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::from_args(ClapArgs::parse_from(itr))
    }

    fn from_args(args: ClapArgs) -> Result<Self, ConfigError> {
        let config_exts = args
            .config_exts
            .iter()
            .map(|ext| normalize_ext(ext))
            .collect::<Result<Vec<_>, _>>()?;
        let defaults = Config::default();
        Ok(Self {
            engine: args.engine,
            server: args.server,
            offline: args.offline,
            connect_policy: args.connect_policy,
            engine_timeout: Duration::from_secs(args.engine_timeout),
            buffer_dir: args.buffer_dir.unwrap_or(defaults.buffer_dir),
            config_dir: args.config_dir.unwrap_or(defaults.config_dir),
            config_exts,
            ..defaults
        })
    }
}

fn default_buffer_dir() -> PathBuf {
    std::env::temp_dir().join("oak")
}

/// Accepts `json`, `.json` or `JSON`; stores the bare lowercase form.
fn normalize_ext(raw: &str) -> Result<String, ConfigError> {
    let ext = raw.trim().trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() || ext.contains(['/', '\\', '.']) {
        return Err(ConfigError::BadExtension(raw.to_string()));
    }
    Ok(ext)
}
