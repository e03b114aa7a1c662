//! Configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default HTTP port for the meet server
pub const DEFAULT_PORT: u16 = 5790;

/// Environment variable overrides
pub const ENV_PORT: &str = "IRONMEET_PORT";
pub const ENV_DATABASE: &str = "IRONMEET_DATABASE";
pub const ENV_CONFIG: &str = "IRONMEET_CONFIG";

/// Judge quorum policy for verdict aggregation
///
/// `WaitForThree` is the primary contract: no verdict until all three slots
/// are filled, then at least two passes make a good lift. `MajorityOfVoted`
/// is the looser historical behavior: minimum two votes, strict majority of
/// whoever has voted decides (a 1-1 split stays undecided).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictPolicy {
    #[default]
    WaitForThree,
    MajorityOfVoted,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// SQLite database file path
    pub database_path: PathBuf,
    /// Static judge credential map: PIN -> judge slot (1..=3)
    pub judge_pins: HashMap<String, u8>,
    /// Verdict aggregation policy
    pub verdict_policy: VerdictPolicy,
}

/// On-disk TOML shape; every field optional so partial files work
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    port: Option<u16>,
    database_path: Option<PathBuf>,
    judge_pins: Option<HashMap<String, u8>>,
    verdict_policy: Option<VerdictPolicy>,
}

impl Config {
    /// Load configuration, applying the priority order documented above
    ///
    /// `cli_port` / `cli_database` come from command-line arguments and win
    /// over everything else. `cli_config` names an explicit TOML file; when
    /// absent, `$IRONMEET_CONFIG` and then the platform config directory
    /// (`~/.config/ironmeet/config.toml`) are tried.
    pub fn load(
        cli_port: Option<u16>,
        cli_database: Option<PathBuf>,
        cli_config: Option<PathBuf>,
    ) -> Result<Config> {
        let file = match locate_config_file(cli_config) {
            Some(path) => load_config_file(&path)?,
            None => ConfigFile::default(),
        };

        let port = cli_port
            .or_else(|| env_parsed(ENV_PORT))
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);

        let database_path = cli_database
            .or_else(|| std::env::var(ENV_DATABASE).ok().map(PathBuf::from))
            .or(file.database_path)
            .unwrap_or_else(default_database_path);

        let judge_pins = file.judge_pins.unwrap_or_else(default_judge_pins);
        validate_judge_pins(&judge_pins)?;

        Ok(Config {
            port,
            database_path,
            judge_pins,
            verdict_policy: file.verdict_policy.unwrap_or_default(),
        })
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Find the config file to use, if any
fn locate_config_file(cli_config: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = cli_config {
        return Some(path);
    }
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        return Some(PathBuf::from(path));
    }
    let default = dirs::config_dir().map(|d| d.join("ironmeet").join("config.toml"))?;
    if default.exists() {
        Some(default)
    } else {
        None
    }
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
}

/// Default judge roster matching the printed PIN cards
fn default_judge_pins() -> HashMap<String, u8> {
    HashMap::from([
        ("1111".to_string(), 1),
        ("2222".to_string(), 2),
        ("3333".to_string(), 3),
    ])
}

fn validate_judge_pins(pins: &HashMap<String, u8>) -> Result<()> {
    for (pin, slot) in pins {
        if !(1..=3).contains(slot) {
            return Err(Error::Config(format!(
                "Judge PIN '{}' maps to slot {} (must be 1..=3)",
                pin, slot
            )));
        }
    }
    Ok(())
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ironmeet"))
        .unwrap_or_else(|| PathBuf::from("./ironmeet_data"))
        .join("meet.db")
}
