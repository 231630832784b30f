use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use roombook_engine::{EngineConfig, PastStartPolicy};

/// Server configuration, read from `ROOMBOOK_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub seed_rooms: bool,
    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("ROOMBOOK_HOST").unwrap_or_else(|| "localhost".into());
        let port: u16 = get("ROOMBOOK_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("ROOMBOOK_PORT must be a port number")?;
        let db_path: PathBuf = get("ROOMBOOK_DB_PATH")
            .unwrap_or_else(|| "roombook.db".into())
            .into();
        let seed_rooms = parse_bool(get("ROOMBOOK_SEED_ROOMS"), true)
            .context("ROOMBOOK_SEED_ROOMS must be true or false")?;

        let minute_secs: f64 = get("ROOMBOOK_MINUTE_SECS")
            .unwrap_or_else(|| "60".into())
            .parse()
            .context("ROOMBOOK_MINUTE_SECS must be a number")?;
        let minute = Duration::try_from_secs_f64(minute_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .context("ROOMBOOK_MINUTE_SECS must be positive")?;
        let retract_timers_on_delete = parse_bool(get("ROOMBOOK_RETRACT_TIMERS_ON_DELETE"), false)
            .context("ROOMBOOK_RETRACT_TIMERS_ON_DELETE must be true or false")?;
        let past_start: PastStartPolicy = match get("ROOMBOOK_PAST_START") {
            Some(v) => v.parse()?,
            None => PastStartPolicy::default(),
        };

        Ok(Self {
            host,
            port,
            db_path,
            seed_rooms,
            engine: EngineConfig {
                minute,
                retract_timers_on_delete,
                past_start,
            },
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        // Resolve names like "localhost".
        std::net::ToSocketAddrs::to_socket_addrs(&addr)
            .with_context(|| format!("cannot resolve listen address {addr}"))?
            .next()
            .with_context(|| format!("no address for {addr}"))
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => anyhow::bail!("invalid boolean '{v}'"),
    }
}
