use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DrillError, Result};
use crate::operator::Operator;

/// Timer ticks per second; one tick is `TICK_RATE_MS`.
pub const TICKS_PER_SEC: u32 = 1000 / crate::TICK_RATE_MS as u32;

/// Largest operand magnitude a config may ask for. Beyond this the
/// candidate enumeration in `ProblemSet::build` grows too large.
pub const OPERAND_LIMIT: i64 = 999;

/// Inclusive range both operands are drawn from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperandRange {
    pub min: i64,
    pub max: i64,
}

impl OperandRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    pub fn within(&self, limit: i64) -> bool {
        (-limit..=limit).contains(&self.min) && (-limit..=limit).contains(&self.max)
    }
}

/// Parses `MIN..MAX`, e.g. `0..8` or `-3..5`
impl FromStr for OperandRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (min, max) = s
            .split_once("..")
            .ok_or_else(|| format!("expected MIN..MAX, got '{s}'"))?;
        let min = min
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("bad range start '{min}': {e}"))?;
        let max = max
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("bad range end '{max}': {e}"))?;
        Ok(Self { min, max })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatorConfig {
    pub range: OperandRange,
    /// Upper bound on how many generated problems this operator contributes
    pub sample_count: usize,
}

impl OperatorConfig {
    pub const fn new(min: i64, max: i64, sample_count: usize) -> Self {
        Self {
            range: OperandRange::new(min, max),
            sample_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrillConfig {
    /// Seconds allowed per problem; `None` or zero disables the timer
    pub timer_secs: Option<u32>,
    /// Overall cap on the set size; `None` or zero keeps every sampled problem
    pub total_problems: Option<usize>,
    pub add: OperatorConfig,
    pub subtract: OperatorConfig,
    pub multiply: OperatorConfig,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Preset::Standard.config()
    }
}

impl DrillConfig {
    pub fn operator(&self, op: Operator) -> &OperatorConfig {
        match op {
            Operator::Add => &self.add,
            Operator::Subtract => &self.subtract,
            Operator::Multiply => &self.multiply,
        }
    }

    pub fn operator_mut(&mut self, op: Operator) -> &mut OperatorConfig {
        match op {
            Operator::Add => &mut self.add,
            Operator::Subtract => &mut self.subtract,
            Operator::Multiply => &mut self.multiply,
        }
    }

    pub fn timer_ticks(&self) -> Option<u32> {
        self.timer_secs
            .filter(|secs| *secs > 0)
            .map(|secs| secs.saturating_mul(TICKS_PER_SEC))
    }

    pub fn total_cap(&self) -> Option<usize> {
        self.total_problems.filter(|n| *n > 0)
    }

    pub fn validate(&self) -> Result<()> {
        for op in Operator::ALL {
            let range = self.operator(op).range;
            if range.is_inverted() {
                return Err(DrillError::InvalidRange {
                    operator: op,
                    min: range.min,
                    max: range.max,
                });
            }
            if !range.within(OPERAND_LIMIT) {
                return Err(DrillError::RangeTooWide {
                    operator: op,
                    min: range.min,
                    max: range.max,
                    limit: OPERAND_LIMIT,
                });
            }
        }
        Ok(())
    }
}

/// Built-in drill profiles
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Preset {
    /// untimed, 100 problems over operands up to 8
    Standard,
    /// three quick timed problems over small sums and differences
    Starter,
}

impl Preset {
    pub fn config(self) -> DrillConfig {
        match self {
            Preset::Standard => DrillConfig {
                timer_secs: None,
                total_problems: None,
                add: OperatorConfig::new(0, 8, 30),
                subtract: OperatorConfig::new(0, 8, 30),
                multiply: OperatorConfig::new(1, 8, 40),
            },
            Preset::Starter => DrillConfig {
                timer_secs: Some(10),
                total_problems: Some(3),
                add: OperatorConfig::new(0, 5, 12),
                subtract: OperatorConfig::new(0, 5, 12),
                multiply: OperatorConfig::new(0, 0, 0),
            },
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> DrillConfig;
    fn save(&self, cfg: &DrillConfig) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "flashsum") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("flashsum_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> DrillConfig {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => {
                log::debug!("no config at {}, using defaults", self.path.display());
                return DrillConfig::default();
            }
        };
        match serde_json::from_slice::<DrillConfig>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!(
                    "ignoring unreadable config {}: {e}",
                    self.path.display()
                );
                DrillConfig::default()
            }
        }
    }

    fn save(&self, cfg: &DrillConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        log::info!("saved config to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = DrillConfig::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = DrillConfig {
            timer_secs: Some(4),
            total_problems: Some(12),
            add: OperatorConfig::new(2, 9, 5),
            subtract: OperatorConfig::new(-3, 3, 6),
            multiply: OperatorConfig::new(1, 12, 7),
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_or_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.load(), DrillConfig::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), DrillConfig::default());
    }

    #[test]
    fn default_is_standard_preset() {
        let cfg = DrillConfig::default();
        assert_eq!(cfg.timer_secs, None);
        assert_eq!(cfg.total_problems, None);
        assert_eq!(cfg.add, OperatorConfig::new(0, 8, 30));
        assert_eq!(cfg.subtract, OperatorConfig::new(0, 8, 30));
        assert_eq!(cfg.multiply, OperatorConfig::new(1, 8, 40));
    }

    #[test]
    fn starter_preset() {
        let cfg = Preset::Starter.config();
        assert_eq!(cfg.timer_secs, Some(10));
        assert_eq!(cfg.timer_ticks(), Some(100));
        assert_eq!(cfg.total_cap(), Some(3));
        assert_eq!(cfg.multiply.sample_count, 0);
        assert_eq!(Preset::Starter.to_string(), "starter");
    }

    #[test]
    fn zero_timer_and_zero_cap_mean_disabled() {
        let cfg = DrillConfig {
            timer_secs: Some(0),
            total_problems: Some(0),
            ..DrillConfig::default()
        };
        assert_eq!(cfg.timer_ticks(), None);
        assert_eq!(cfg.total_cap(), None);
    }

    #[test]
    fn operand_range_parsing() {
        assert_eq!("0..8".parse::<OperandRange>(), Ok(OperandRange::new(0, 8)));
        assert_eq!("-3..5".parse::<OperandRange>(), Ok(OperandRange::new(-3, 5)));
        assert_eq!(" 1 .. 2 ".parse::<OperandRange>(), Ok(OperandRange::new(1, 2)));
        assert!("8".parse::<OperandRange>().is_err());
        assert!("a..3".parse::<OperandRange>().is_err());
    }

    #[test]
    fn validate_rejects_inverted_ranges() {
        let mut cfg = DrillConfig::default();
        assert!(cfg.validate().is_ok());

        cfg.subtract.range = OperandRange::new(5, 1);
        assert_matches!(
            cfg.validate(),
            Err(DrillError::InvalidRange {
                operator: Operator::Subtract,
                min: 5,
                max: 1
            })
        );
    }

    #[test]
    fn validate_rejects_operands_past_the_limit() {
        let mut cfg = DrillConfig::default();
        cfg.multiply.range = OperandRange::new(4_000_000_000, 4_000_000_001);
        assert_matches!(
            cfg.validate(),
            Err(DrillError::RangeTooWide {
                operator: Operator::Multiply,
                limit: OPERAND_LIMIT,
                ..
            })
        );

        cfg.multiply.range = OperandRange::new(0, 1_000_000);
        assert_matches!(cfg.validate(), Err(DrillError::RangeTooWide { .. }));

        cfg.multiply.range = OperandRange::new(-OPERAND_LIMIT, OPERAND_LIMIT);
        assert!(cfg.validate().is_ok());

        cfg.add.range = OperandRange::new(i64::MIN, 0);
        assert_matches!(
            cfg.validate(),
            Err(DrillError::RangeTooWide {
                operator: Operator::Add,
                ..
            })
        );
    }

    #[test]
    fn operator_accessors_match_fields() {
        let mut cfg = DrillConfig::default();
        cfg.operator_mut(Operator::Multiply).sample_count = 3;
        assert_eq!(cfg.multiply.sample_count, 3);
        assert_eq!(cfg.operator(Operator::Add), &cfg.add);
    }
}
