//! Build pipeline configuration.

use std::path::{Path, PathBuf};

use crate::registry::GeocoderConfig;

/// Default precompute resolutions (yards): 5 miles down to 1 chain.
pub const DEFAULT_RESOLUTIONS: [i64; 6] = [8_800, 1_760, 440, 220, 110, 22];

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid resolution {value:?} in ELR_RESOLUTIONS: must be a positive integer")]
    InvalidResolution { value: String },

    #[error("ELR_RESOLUTIONS is empty")]
    NoResolutions,
}

/// Configuration for the build pipeline.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Survey source JSON.
    pub source_path: PathBuf,

    /// Snapshot cache of calibrated ELRs.
    pub cache_path: PathBuf,

    /// Directory for exported CSV tables.
    pub output_dir: PathBuf,

    /// Precompute resolutions (yards).
    pub resolutions: Vec<i64>,

    /// Log lookup misses.
    pub verbose: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        let geocoder = GeocoderConfig::default();
        Self {
            source_path: geocoder.source_path,
            cache_path: geocoder.cache_path,
            output_dir: PathBuf::from("output"),
            resolutions: DEFAULT_RESOLUTIONS.to_vec(),
            verbose: false,
        }
    }
}

impl BuildConfig {
    /// Read overrides from the environment.
    ///
    /// `ELR_SOURCE`, `ELR_CACHE` and `ELR_OUTPUT_DIR` set paths;
    /// `ELR_RESOLUTIONS` is a comma-separated list of yardages;
    /// `ELR_VERBOSE` enables miss logging when set to `1` or `true`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup("ELR_SOURCE") {
            config.source_path = path.into();
        }
        if let Some(path) = lookup("ELR_CACHE") {
            config.cache_path = path.into();
        }
        if let Some(path) = lookup("ELR_OUTPUT_DIR") {
            config.output_dir = path.into();
        }
        if let Some(list) = lookup("ELR_RESOLUTIONS") {
            config.resolutions = parse_resolutions(&list)?;
        }
        if let Some(flag) = lookup("ELR_VERBOSE") {
            config.verbose = matches!(flag.trim(), "1" | "true");
        }

        Ok(config)
    }

    pub fn geocoder_config(&self) -> GeocoderConfig {
        GeocoderConfig::new(&self.source_path, &self.cache_path).with_verbose(self.verbose)
    }

    pub fn calibration_csv(&self) -> PathBuf {
        self.output_dir.join("calibration.csv")
    }

    pub fn statistics_csv(&self) -> PathBuf {
        self.output_dir.join("calibration_statistics.csv")
    }

    /// Output path for positions at one resolution, e.g. `positions_0440y.csv`.
    pub fn positions_csv(&self, resolution: i64) -> PathBuf {
        positions_csv(&self.output_dir, resolution)
    }
}

pub fn positions_csv(output_dir: &Path, resolution: i64) -> PathBuf {
    output_dir.join(format!("positions_{resolution:04}y.csv"))
}

fn parse_resolutions(list: &str) -> Result<Vec<i64>, ConfigError> {
    let resolutions = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<i64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidResolution {
                value: s.to_string(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if resolutions.is_empty() {
        return Err(ConfigError::NoResolutions);
    }
    Ok(resolutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = BuildConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.resolutions, vec![8_800, 1_760, 440, 220, 110, 22]);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(!config.verbose);
    }

    #[test]
    fn overrides_from_environment() {
        let config = BuildConfig::from_lookup(lookup(&[
            ("ELR_SOURCE", "/data/survey.json"),
            ("ELR_CACHE", "/data/elrs.msgpack"),
            ("ELR_OUTPUT_DIR", "/data/out"),
            ("ELR_RESOLUTIONS", "1760, 22"),
            ("ELR_VERBOSE", "true"),
        ]))
        .unwrap();

        assert_eq!(config.source_path, PathBuf::from("/data/survey.json"));
        assert_eq!(config.resolutions, vec![1_760, 22]);
        assert!(config.verbose);

        let gc = config.geocoder_config();
        assert_eq!(gc.cache_path, PathBuf::from("/data/elrs.msgpack"));
        assert!(gc.verbose);
    }

    #[test]
    fn invalid_resolutions() {
        assert_eq!(
            parse_resolutions("440,abc").unwrap_err(),
            ConfigError::InvalidResolution {
                value: "abc".to_string()
            }
        );
        assert_eq!(
            parse_resolutions("0").unwrap_err(),
            ConfigError::InvalidResolution {
                value: "0".to_string()
            }
        );
        assert_eq!(parse_resolutions(" , ").unwrap_err(), ConfigError::NoResolutions);
    }

    #[test]
    fn output_paths() {
        let config = BuildConfig {
            output_dir: PathBuf::from("/out"),
            ..BuildConfig::default()
        };
        assert_eq!(config.positions_csv(22), PathBuf::from("/out/positions_0022y.csv"));
        assert_eq!(config.positions_csv(8_800), PathBuf::from("/out/positions_8800y.csv"));
        assert_eq!(config.calibration_csv(), PathBuf::from("/out/calibration.csv"));
    }
}
