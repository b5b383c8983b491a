use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use log::{info, warn};

use crate::error::Error;
use crate::ring::Limit;

const DEFAULT_CAPACITY: usize = 4096;
const DEFAULT_CHUNK: usize = 8192;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub ring: RingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RingConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default = "default_chunk")]
    pub chunk: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            offset: 0,
            limit: None,
            chunk: DEFAULT_CHUNK,
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_chunk() -> usize {
    DEFAULT_CHUNK
}

/// Values given on the command line; each one wins over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub capacity: Option<usize>,
    pub offset: Option<usize>,
    pub limit: Option<u64>,
    pub chunk: Option<usize>,
}

/// Settings the commands run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingSettings {
    pub capacity: usize,
    pub offset: usize,
    pub limit: Limit,
    pub chunk: usize,
}

impl RingSettings {
    /// Checks that `offset` falls inside a ring of `capacity` bytes.
    ///
    /// Only commands that size the ring from `capacity` need this; `cycle`
    /// measures the offset against its file instead.
    pub fn check_window(&self) -> Result<(), Error> {
        if self.capacity == 0 {
            return Err(Error::Settings("capacity must be greater than zero".into()));
        }
        if self.offset >= self.capacity {
            return Err(Error::Settings(format!(
                "offset {} must be below capacity {}",
                self.offset, self.capacity
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Applies command-line overrides and produces the settings the commands use.
    pub fn resolve(self, overrides: &Overrides) -> Result<RingSettings, Error> {
        let ring = self.ring;
        let capacity = overrides.capacity.unwrap_or(ring.capacity);
        if capacity == 0 {
            return Err(Error::Settings("capacity must be greater than zero".into()));
        }
        let chunk = overrides.chunk.unwrap_or(ring.chunk);
        if chunk == 0 {
            return Err(Error::Settings("chunk must be greater than zero".into()));
        }
        let limit = match overrides.limit.or(ring.limit) {
            Some(n) => Limit::Bounded(n),
            None => Limit::Unlimited,
        };
        Ok(RingSettings {
            capacity,
            offset: overrides.offset.unwrap_or(ring.offset),
            limit,
            chunk,
        })
    }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(format!("{}/.config/ringcat/config.toml", home))
    } else {
        PathBuf::from("/etc/ringcat/config.toml")
    }
}

pub fn parse_config(content: &str) -> Result<Config, Error> {
    toml::from_str(content).map_err(|e| Error::Settings(format!("failed to parse TOML: {}", e)))
}

/// Loads the settings file.
///
/// An explicit `path` must exist; a missing default file falls back to the
/// built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, Error> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (default_config_path(), false),
    };

    if !path.exists() {
        if explicit {
            return Err(Error::Settings(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        warn!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        Error::Settings(format!("failed to read config file {}: {}", path.display(), e))
    })?;
    let cfg = parse_config(&content)?;

    info!("Config loaded from: {}", path.display());
    info!(
        "Ring: {} bytes from offset {}, limit {:?}",
        cfg.ring.capacity, cfg.ring.offset, cfg.ring.limit
    );
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let cfg = parse_config(
            r#"
            [ring]
            capacity = 16
            offset = 3
            limit = 100
            chunk = 4
            "#,
        )
        .unwrap();
        let settings = cfg.resolve(&Overrides::default()).unwrap();
        assert_eq!(
            settings,
            RingSettings {
                capacity: 16,
                offset: 3,
                limit: Limit::Bounded(100),
                chunk: 4,
            }
        );
    }

    #[test]
    fn test_defaults() {
        let settings = parse_config("").unwrap().resolve(&Overrides::default()).unwrap();
        assert_eq!(settings.capacity, DEFAULT_CAPACITY);
        assert_eq!(settings.offset, 0);
        assert_eq!(settings.limit, Limit::Unlimited);
        assert_eq!(settings.chunk, DEFAULT_CHUNK);
    }

    #[test]
    fn test_overrides_win() {
        let cfg = parse_config("[ring]\ncapacity = 16\nlimit = 5\n").unwrap();
        let overrides = Overrides {
            capacity: Some(32),
            limit: Some(7),
            ..Default::default()
        };
        let settings = cfg.resolve(&overrides).unwrap();
        assert_eq!(settings.capacity, 32);
        assert_eq!(settings.limit, Limit::Bounded(7));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            parse_config("[ring]\ncapacity = \"big\"\n"),
            Err(Error::Settings(_))
        ));
        let zero_chunk = parse_config("[ring]\nchunk = 0\n").unwrap();
        assert!(matches!(
            zero_chunk.resolve(&Overrides::default()),
            Err(Error::Settings(_))
        ));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let cfg = parse_config("[ring]\ncapacity = 0\noffset = 9\n").unwrap();
        let err = cfg.resolve(&Overrides::default()).unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
        assert_eq!(err.to_status_code(), 3);

        let cfg = parse_config("[ring]\ncapacity = 16\n").unwrap();
        let overrides = Overrides {
            capacity: Some(0),
            ..Default::default()
        };
        assert!(matches!(cfg.resolve(&overrides), Err(Error::Settings(_))));
    }

    #[test]
    fn test_check_window() {
        let settings = parse_config("[ring]\ncapacity = 8\noffset = 9\n")
            .unwrap()
            .resolve(&Overrides::default())
            .unwrap();
        let err = settings.check_window().unwrap_err();
        assert_eq!(err.to_string(), "invalid settings: offset 9 must be below capacity 8");

        let settings = RingSettings { offset: 7, ..settings };
        assert!(settings.check_window().is_ok());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some(Path::new("/nonexistent/ringcat.toml"))).unwrap_err();
        assert_eq!(err.to_status_code(), 3);
    }
}
