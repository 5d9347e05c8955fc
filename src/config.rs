//! Runtime configuration from environment variables and command-line flags.
//!
//! Flags override environment variables, which override defaults.

use crate::client::DEFAULT_API_URL;
use crate::game::JumpRule;
use crate::scores::validate_name;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3001;
const DEFAULT_PLAYER_NAME: &str = "Player";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
    #[error("unknown option: {0}")]
    UnknownOption(String),
}

/// Settings for `music-runner serve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Score file location; `None` uses the platform data directory.
    pub scores_file: Option<PathBuf>,
    /// Keep scores in memory only.
    pub in_memory: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            scores_file: None,
            in_memory: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env(args: &[String]) -> Result<Self, ConfigError> {
        Self::from_sources(|key| std::env::var(key).ok(), args)
    }

    /// `env` looks up `HOST`, `PORT` and `SCORES_FILE`; `args` are the flags
    /// after the `serve` subcommand.
    pub fn from_sources(
        env: impl Fn(&str) -> Option<String>,
        args: &[String],
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = env("HOST") {
            config.host = parse_value("HOST", &host)?;
        }
        if let Some(port) = env("PORT") {
            config.port = parse_value("PORT", &port)?;
        }
        if let Some(path) = env("SCORES_FILE").filter(|p| !p.is_empty()) {
            config.scores_file = Some(PathBuf::from(path));
        }

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--port" | "-p" => config.port = parse_value(arg, next_value(arg, &mut iter)?)?,
                "--host" => config.host = parse_value(arg, next_value(arg, &mut iter)?)?,
                "--scores-file" => {
                    config.scores_file = Some(PathBuf::from(next_value(arg, &mut iter)?))
                }
                "--memory" => config.in_memory = true,
                other => return Err(ConfigError::UnknownOption(other.to_string())),
            }
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Settings for the terminal game.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Play without a score server.
    pub offline: bool,
    pub player_name: String,
    /// Fixed RNG seed for reproducible obstacle layouts.
    pub seed: Option<u64>,
    pub jump_rule: JumpRule,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            offline: false,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            seed: None,
            jump_rule: JumpRule::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env(args: &[String]) -> Result<Self, ConfigError> {
        Self::from_sources(|key| std::env::var(key).ok(), args)
    }

    /// `env` looks up `MUSIC_RUNNER_API`, `MUSIC_RUNNER_NAME` and `USER`.
    pub fn from_sources(
        env: impl Fn(&str) -> Option<String>,
        args: &[String],
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = env("MUSIC_RUNNER_API").filter(|u| !u.is_empty()) {
            config.api_url = url;
        }
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--offline" => config.offline = true,
                "--api" => config.api_url = next_value(arg, &mut iter)?.to_string(),
                "--name" => config.player_name = player_name(arg, next_value(arg, &mut iter)?)?,
                "--seed" => config.seed = Some(parse_value(arg, next_value(arg, &mut iter)?)?),
                "--grounded" => config.jump_rule = JumpRule::Grounded,
                other => return Err(ConfigError::UnknownOption(other.to_string())),
            }
        }

        // The environment only fills in a name the flags did not give
        if !args.iter().any(|a| a == "--name") {
            for key in ["MUSIC_RUNNER_NAME", "USER"] {
                if let Some(name) = env(key).filter(|n| !n.trim().is_empty()) {
                    config.player_name = player_name(key, &name)?;
                    break;
                }
            }
        }

        Ok(config)
    }
}

fn next_value<'a>(
    flag: &str,
    iter: &mut impl Iterator<Item = &'a String>,
) -> Result<&'a str, ConfigError> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

/// A name the leaderboard will accept, trimmed.
fn player_name(source: &str, value: &str) -> Result<String, ConfigError> {
    validate_name(value).map_err(|_| ConfigError::InvalidValue {
        flag: source.to_string(),
        value: value.to_string(),
    })
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}
