//! Configuration module - environment variable parsing

pub mod rewards;

use rewards::RewardConfig;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::game::CarId;
use crate::session::PrintSettings;

/// Where packets come from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedKind {
    /// Game bridge over TCP
    Tcp,
    /// Seeded built-in simulation
    Synthetic,
}

impl FromStr for FeedKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "synthetic" => Ok(Self::Synthetic),
            _ => Err(()),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Bridge listen address
    pub listen_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON objects instead of text
    pub log_json: bool,

    pub feed: FeedKind,
    pub synthetic_seed: u64,
    pub synthetic_players: u32,

    /// Score every Nth active tick
    pub tick_skip: u32,
    /// Reward table file; None uses the built-in table
    pub reward_config: Option<PathBuf>,

    pub print: PrintSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:23233".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddress)?;

        let tick_skip = parse_or(&lookup, "TICK_SKIP", 8u32)?;
        if tick_skip == 0 {
            return Err(ConfigError::Invalid {
                key: "TICK_SKIP",
                value: "0".to_string(),
            });
        }

        let players = match lookup("PLAYERS_TO_PRINT") {
            Some(value) => parse_players(&value)?,
            None => Some(vec![0, 1]),
        };

        Ok(Self {
            listen_addr,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: lookup("LOG_FORMAT")
                .is_some_and(|format| format.trim().eq_ignore_ascii_case("json")),

            feed: parse_or(&lookup, "FEED", FeedKind::Tcp)?,
            synthetic_seed: parse_or(&lookup, "SYNTHETIC_SEED", 0)?,
            synthetic_players: parse_or(&lookup, "SYNTHETIC_PLAYERS", 2)?,

            tick_skip,
            reward_config: lookup("REWARD_CONFIG")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),

            print: PrintSettings {
                individual: parse_or(&lookup, "PRINT_INDIVIDUAL", true)?,
                individual_total: parse_or(&lookup, "PRINT_INDIVIDUAL_TOTAL", true)?,
                general: parse_or(&lookup, "PRINT_GENERAL", false)?,
                players,
            },
        })
    }

    /// Load the reward table named by `REWARD_CONFIG`, or the default one
    pub fn reward_table(&self) -> Result<RewardConfig, ConfigError> {
        match &self.reward_config {
            Some(path) => RewardConfig::load(path),
            None => Ok(RewardConfig::default()),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// `all` prints everyone; otherwise a comma-separated list of car ids
fn parse_players(value: &str) -> Result<Option<Vec<CarId>>, ConfigError> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse())
        .collect::<Result<Vec<CarId>, _>>()
        .map(Some)
        .map_err(|_| ConfigError::Invalid {
            key: "PLAYERS_TO_PRINT",
            value: value.to_string(),
        })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Invalid listen address format")]
    InvalidAddress,

    #[error("Failed to read reward config {path}: {source}")]
    RewardFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid reward config: {0}")]
    RewardFormat(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:23233".parse().unwrap());
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(config.feed, FeedKind::Tcp);
        assert_eq!(config.tick_skip, 8);
        assert_eq!(config.synthetic_players, 2);
        assert!(config.reward_config.is_none());
        assert_eq!(config.print, PrintSettings::default());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("FEED", "Synthetic"),
            ("LOG_FORMAT", "json"),
            ("SYNTHETIC_SEED", "42"),
            ("TICK_SKIP", "1"),
            ("PRINT_GENERAL", "true"),
            ("PLAYERS_TO_PRINT", "all"),
            ("REWARD_CONFIG", "rewards.json"),
        ]))
        .unwrap();
        assert_eq!(config.feed, FeedKind::Synthetic);
        assert!(config.log_json);
        assert_eq!(config.synthetic_seed, 42);
        assert_eq!(config.tick_skip, 1);
        assert!(config.print.general);
        assert_eq!(config.print.players, None);
        assert_eq!(config.reward_config, Some(PathBuf::from("rewards.json")));
    }

    #[test]
    fn player_list_is_parsed() {
        let config = Config::from_lookup(lookup(&[("PLAYERS_TO_PRINT", "2, 5,")])).unwrap();
        assert_eq!(config.print.players, Some(vec![2, 5]));
    }

    #[test]
    fn rejects_zero_tick_skip() {
        let err = Config::from_lookup(lookup(&[("TICK_SKIP", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TICK_SKIP", .. }));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("LISTEN_ADDR", "nowhere")])),
            Err(ConfigError::InvalidAddress)
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("FEED", "carrier-pigeon")])),
            Err(ConfigError::Invalid { key: "FEED", .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("PLAYERS_TO_PRINT", "0,x")])),
            Err(ConfigError::Invalid { key: "PLAYERS_TO_PRINT", .. })
        ));
    }
}
