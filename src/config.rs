use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::ConvertError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: Logging,
    pub input: Input,
    pub speakers: Speakers,
    pub merge: Merge,
    pub timing: Timing,
    pub wrap: Wrap,
    pub progress: Progress,
}

impl Config {
    pub fn load(path_opt: Option<&Path>) -> Result<Self> {
        let default_path = Path::new("config.toml");
        let path = if let Some(p) = path_opt {
            Some(p)
        } else if default_path.exists() {
            Some(default_path)
        } else {
            None
        };

        let mut cfg = Config::default();

        if let Some(path) = path {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed reading config file: {}", path.display()))?;
            let parsed: Config = toml::from_str(&raw)
                .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
            cfg = parsed;
        }

        Ok(cfg)
    }

    pub fn to_toml_pretty(&self) -> Result<String> {
        let s = toml::to_string_pretty(self).context("failed serializing config as TOML")?;
        Ok(s)
    }

    /// Rejects settings the pipeline cannot honour.
    pub fn validate(&self) -> std::result::Result<(), ConvertError> {
        let bad = |msg: &str| Err(ConvertError::Config(msg.to_string()));

        if self.input.fps == 0 {
            return bad("input.fps must be greater than zero");
        }
        if self.wrap.max_line_chars == 0 {
            return bad("wrap.max_line_chars must be greater than zero");
        }
        if self.timing.min_gap_ms < 0 || self.merge.max_gap_ms < 0 {
            return bad("gaps must not be negative");
        }
        if self.merge.max_duration_ms < 0 {
            return bad("merge.max_duration_ms must not be negative (0 disables the limit)");
        }
        if self.timing.min_duration_ms < 0 || self.timing.min_duration_ms > self.timing.max_duration_ms {
            return bad("timing.min_duration_ms must be within 0..=timing.max_duration_ms");
        }
        if let Some(cps) = self.timing.chars_per_second {
            if !(cps.is_finite() && cps > 0.0) {
                return bad("timing.chars_per_second must be a positive number");
            }
        }
        if self.progress.every == 0 {
            return bad("progress.every must be greater than zero");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub format: String,
    pub debug_entry_samples: usize,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            debug_entry_samples: 20,
        }
    }
}

/// How parenthesised asides such as `(laughs)` are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cleaning {
    /// Drop `( ... )` together with its content.
    #[default]
    StripAsides,
    /// Keep the text as written, only flattening line breaks.
    KeepAsides,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Input {
    pub fps: u32,
    pub start_field: String,
    pub end_field: String,
    pub dialogue_field: String,
    pub speaker_field: String,
    pub cleaning: Cleaning,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            fps: 25,
            start_field: "IN".to_string(),
            end_field: "OUT".to_string(),
            dialogue_field: "DIÁLOGO".to_string(),
            speaker_field: "PERSONAJE".to_string(),
            cleaning: Cleaning::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Speakers {
    pub top_n: usize,
}

impl Default for Speakers {
    fn default() -> Self {
        Self { top_n: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Merge {
    pub enabled: bool,
    pub max_gap_ms: i64,
    /// Accept negative gaps (overlapping source timecodes) as mergeable.
    pub allow_overlap: bool,
    /// Combined text budget; defaults to two full lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,
    /// Longest span a merged entry may cover; `0` lifts the limit.
    pub max_duration_ms: i64,
}

impl Default for Merge {
    fn default() -> Self {
        Self {
            enabled: true,
            max_gap_ms: 500,
            allow_overlap: false,
            max_chars: None,
            max_duration_ms: 8_000,
        }
    }
}

impl Merge {
    pub fn char_budget(&self, wrap: &Wrap) -> usize {
        self.max_chars.unwrap_or(2 * wrap.max_line_chars)
    }

    pub fn duration_limit(&self) -> Option<i64> {
        (self.max_duration_ms > 0).then_some(self.max_duration_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub min_gap_ms: i64,
    pub min_duration_ms: i64,
    pub max_duration_ms: i64,
    /// Reading-speed model; unset keeps the source durations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chars_per_second: Option<f64>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            min_gap_ms: 24,
            min_duration_ms: 1_000,
            max_duration_ms: 8_000,
            chars_per_second: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Text past the second line stays on the second line.
    #[default]
    Allow,
    /// Text past the second line moves into continuation entries.
    Split,
}

/// How a split entry's time span is shared between its pieces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationTiming {
    /// Proportional to each piece's visible characters.
    #[default]
    Proportional,
    /// Equal shares.
    Even,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Wrap {
    pub max_line_chars: usize,
    pub overflow: Overflow,
    pub continuation_timing: ContinuationTiming,
}

impl Default for Wrap {
    fn default() -> Self {
        Self {
            max_line_chars: 37,
            overflow: Overflow::default(),
            continuation_timing: ContinuationTiming::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    /// Report after every n-th rendered entry.
    pub every: usize,
}

impl Default for Progress {
    fn default() -> Self {
        Self { every: 5 }
    }
}

/// Builds the subscriber for one command run. The caller scopes it with
/// `tracing::dispatcher::with_default` instead of installing a global.
pub fn build_dispatch(logging: &Logging, cli_override_level: Option<&str>) -> tracing::Dispatch {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = cli_override_level.unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let is_json = logging.format.to_lowercase() == "json";

    if is_json {
        tracing::Dispatch::new(
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .with_target(true)
                .finish(),
        )
    } else {
        tracing::Dispatch::new(
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .pretty()
                .finish(),
        )
    }
}
