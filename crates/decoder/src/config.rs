use anyhow::{Context, bail};
use std::env;

use crate::bbox::NetworkGeometry;
use crate::thresholds::ThresholdTable;

pub use common::Environment;

#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    pub environment: Environment,
    pub num_classes: usize,
    pub confidence_threshold: f32,
    pub class_thresholds: Vec<(usize, f32)>,
    pub input_size: (u32, u32),
}

impl DecoderConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let num_classes = env::var("NUM_CLASSES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(91);

        let confidence_threshold = env::var("CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.5);

        let class_thresholds = match env::var("CLASS_THRESHOLDS") {
            Ok(raw) => parse_class_thresholds(&raw, num_classes)
                .context("Invalid CLASS_THRESHOLDS")?,
            Err(_) => Vec::new(),
        };

        let input_width = env::var("INPUT_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(640);

        let input_height = env::var("INPUT_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(640);

        Ok(Self {
            environment,
            num_classes,
            confidence_threshold,
            class_thresholds,
            input_size: (input_width, input_height),
        })
    }

    /// Threshold table with per-class overrides applied on top of the default.
    pub fn thresholds(&self) -> ThresholdTable {
        self.class_thresholds.iter().fold(
            ThresholdTable::uniform(self.num_classes, self.confidence_threshold),
            |table, &(class_id, threshold)| table.with_class_threshold(class_id, threshold),
        )
    }

    pub fn network(&self) -> NetworkGeometry {
        NetworkGeometry::new(self.input_size.0, self.input_size.1)
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            num_classes: 91,
            confidence_threshold: 0.5,
            class_thresholds: Vec::new(),
            input_size: (640, 640),
        }
    }
}

/// Parse `id=threshold` pairs separated by commas, e.g. `1=0.6,3=0.35`.
fn parse_class_thresholds(raw: &str, num_classes: usize) -> anyhow::Result<Vec<(usize, f32)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> anyhow::Result<(usize, f32)> {
            let (id, threshold) = entry
                .split_once('=')
                .with_context(|| format!("expected `id=threshold`, got `{entry}`"))?;

            let class_id: usize = id
                .trim()
                .parse()
                .with_context(|| format!("invalid class id `{id}`"))?;
            let threshold: f32 = threshold
                .trim()
                .parse()
                .with_context(|| format!("invalid threshold `{threshold}`"))?;

            if class_id >= num_classes {
                bail!("class id {class_id} is out of range for {num_classes} classes");
            }
            if !(0.0..=1.0).contains(&threshold) {
                bail!("threshold {threshold} for class {class_id} is outside [0, 1]");
            }

            Ok((class_id, threshold))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "ENVIRONMENT",
        "NUM_CLASSES",
        "CONFIDENCE_THRESHOLD",
        "CLASS_THRESHOLDS",
        "INPUT_WIDTH",
        "INPUT_HEIGHT",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: every test touching the environment is #[serial].
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_environment() {
        clear_env();
        let config = DecoderConfig::from_env().unwrap();
        assert_eq!(config, DecoderConfig::test_default());
        assert_eq!(config.thresholds().len(), 91);
        assert_eq!(config.network(), NetworkGeometry::new(640, 640));
    }

    #[test]
    #[serial]
    fn test_values_read_from_environment() {
        clear_env();
        unsafe {
            env::set_var("NUM_CLASSES", "4");
            env::set_var("CONFIDENCE_THRESHOLD", "0.3");
            env::set_var("CLASS_THRESHOLDS", "2=0.8, 3=0.1");
            env::set_var("INPUT_WIDTH", "560");
            env::set_var("INPUT_HEIGHT", "432");
        }

        let config = DecoderConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.num_classes, 4);
        assert_eq!(config.class_thresholds, vec![(2, 0.8), (3, 0.1)]);
        assert_eq!(config.thresholds().as_slice(), &[0.3, 0.3, 0.8, 0.1]);
        assert_eq!(config.network(), NetworkGeometry::new(560, 432));
    }

    #[test]
    #[serial]
    fn test_unparsable_scalars_fall_back_to_defaults() {
        clear_env();
        unsafe {
            env::set_var("NUM_CLASSES", "many");
            env::set_var("INPUT_WIDTH", "-1");
        }

        let config = DecoderConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.num_classes, 91);
        assert_eq!(config.input_size, (640, 640));
    }

    #[test]
    #[serial]
    fn test_malformed_class_thresholds_are_errors() {
        clear_env();
        unsafe { env::set_var("CLASS_THRESHOLDS", "1:0.5") };

        let err = DecoderConfig::from_env().unwrap_err();
        clear_env();

        assert!(format!("{err:#}").contains("CLASS_THRESHOLDS"));
    }

    #[test]
    fn test_parse_class_thresholds_rejects_out_of_range() {
        assert!(parse_class_thresholds("91=0.5", 91).is_err());
        assert!(parse_class_thresholds("1=1.5", 91).is_err());
        assert!(parse_class_thresholds("1=-0.1", 91).is_err());
        assert!(parse_class_thresholds("x=0.1", 91).is_err());
        assert_eq!(parse_class_thresholds(" , 5=0.25,", 91).unwrap(), vec![(5, 0.25)]);
    }
}
