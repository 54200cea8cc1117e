//! Configuration system for PlanForge.
//!
//! Load planner options from TOML or YAML to control the behaviour space
//! and the base planner without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use planforge_config::{PlanCount, PlannerOptions};
//! use std::time::Duration;
//!
//! let options = PlannerOptions::from_toml_str(r#"
//!     [bspace-cfg]
//!     [[bspace-cfg.dims]]
//!     name = "fuel"
//!     feature = { type = "resource_usage", fluent = "fuel" }
//!     tolerance = { type = "epsilon", value = 0.5 }
//!
//!     [[bspace-cfg.dims]]
//!     feature = { type = "plan_length" }
//!
//!     [base-planner-cfg]
//!     k = 5
//!     timeout_ms = 2000
//!     heuristic = "hadd"
//! "#).unwrap();
//!
//! let normalized = options.normalize().unwrap();
//! assert_eq!(normalized.plan_count, PlanCount::AtMost(5));
//! assert_eq!(normalized.oracle_timeout, Some(Duration::from_millis(2000)));
//! assert!(normalized.options.contains_key("heuristic"));
//! assert!(!normalized.options.contains_key("k"));
//! ```
//!
//! Missing dimensions are rejected before anything runs:
//!
//! ```
//! use planforge_config::{ConfigError, PlannerOptions};
//!
//! let options = PlannerOptions::from_toml_str("[base-planner-cfg]\nk = 2").unwrap();
//! assert!(matches!(options.validate(), Err(ConfigError::Invalid(_))));
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

use planforge_core::{Feature, OptionValue, OracleOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance applied to numeric dimensions that do not configure one.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level planner options: behaviour space plus base planner settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlannerOptions {
    /// Behaviour space configuration. Required.
    #[serde(rename = "bspace-cfg", default)]
    pub bspace_cfg: Option<BehaviourSpaceConfig>,

    /// Options for the base planner. Recognized keys are `k`, `timeout_ms`
    /// and `seconds_spent_limit`; everything else goes to the oracle.
    #[serde(rename = "base-planner-cfg", default)]
    pub base_planner_cfg: BasePlannerConfig,
}

impl PlannerOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads options from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses options from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads options from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses options from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Adds a behaviour dimension, creating the behaviour space if needed.
    pub fn with_dimension(mut self, dim: DimensionConfig) -> Self {
        let bspace = self.bspace_cfg.get_or_insert_with(Default::default);
        bspace.dims.get_or_insert_with(Vec::new).push(dim);
        self
    }

    /// Sets the requested plan count.
    pub fn with_k(mut self, k: i64) -> Self {
        self.base_planner_cfg.k = Some(k);
        self
    }

    /// Sets the per-call oracle timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.base_planner_cfg.timeout_ms = Some(timeout_ms);
        self
    }

    /// Adds an opaque oracle option.
    pub fn with_option(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        self.base_planner_cfg.options.insert(key.into(), value);
        self
    }

    /// Returns the behaviour space, failing if it or its dimensions are
    /// missing.
    pub fn behaviour_space(&self) -> Result<&BehaviourSpaceConfig, ConfigError> {
        self.bspace_cfg
            .as_ref()
            .ok_or_else(|| ConfigError::Invalid("missing 'bspace-cfg'".to_string()))
    }

    /// Checks every constraint on the options without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.behaviour_space()?.validate()?;
        self.base_planner_cfg.validate()
    }

    /// Validates and splits the base planner options into the immutable
    /// form consumed by the diversification loop.
    pub fn normalize(&self) -> Result<NormalizedPlannerConfig, ConfigError> {
        self.validate()?;
        Ok(self.base_planner_cfg.normalize())
    }
}

/// Behaviour space configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BehaviourSpaceConfig {
    /// Ordered dimensions. Must be present and non-empty.
    #[serde(default)]
    pub dims: Option<Vec<DimensionConfig>>,

    /// Tolerance for numeric dimensions without their own.
    #[serde(default)]
    pub default_tolerance: Option<ToleranceConfig>,
}

impl BehaviourSpaceConfig {
    /// Returns the dimensions, failing when they are missing or empty.
    pub fn dimensions(&self) -> Result<&[DimensionConfig], ConfigError> {
        match self.dims.as_deref() {
            None => Err(ConfigError::Invalid(
                "missing 'dims' in behaviour space".to_string(),
            )),
            Some([]) => Err(ConfigError::Invalid(
                "'dims' must contain at least one dimension".to_string(),
            )),
            Some(dims) => Ok(dims),
        }
    }

    /// Effective tolerance for numeric dimensions without their own.
    pub fn fallback_tolerance(&self) -> ToleranceConfig {
        self.default_tolerance
            .clone()
            .unwrap_or(ToleranceConfig::Epsilon {
                value: DEFAULT_EPSILON,
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = self.dimensions()?;
        if let Some(tolerance) = &self.default_tolerance {
            tolerance.validate("default_tolerance")?;
        }
        let mut names = HashSet::with_capacity(dims.len());
        for dim in dims {
            let name = dim.effective_name();
            if !names.insert(name.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate dimension name '{}'",
                    name
                )));
            }
            if let Some(tolerance) = &dim.tolerance {
                tolerance.validate(&name)?;
            }
        }
        Ok(())
    }
}

/// One behaviour dimension: a feature and how its values are compared.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DimensionConfig {
    /// Dimension name; defaults to the feature's description.
    #[serde(default)]
    pub name: Option<String>,

    /// Extraction rule.
    pub feature: FeatureConfig,

    /// Comparison policy for numeric features.
    #[serde(default)]
    pub tolerance: Option<ToleranceConfig>,
}

impl DimensionConfig {
    pub fn new(feature: FeatureConfig) -> Self {
        Self {
            name: None,
            feature,
            tolerance: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tolerance(mut self, tolerance: ToleranceConfig) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Configured name, or the feature's description.
    pub fn effective_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.feature.to_feature().to_string())
    }
}

/// Feature extraction rule.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureConfig {
    PlanLength,
    ActionCount { schema: String },
    Makespan,
    FinalValue { fluent: String },
    ResourceUsage { fluent: String },
    PeakValue { fluent: String },
    ActionUsed { schema: String },
    FirstAction,
}

impl FeatureConfig {
    pub fn to_feature(&self) -> Feature {
        match self {
            FeatureConfig::PlanLength => Feature::PlanLength,
            FeatureConfig::ActionCount { schema } => Feature::ActionCount {
                schema: schema.clone(),
            },
            FeatureConfig::Makespan => Feature::Makespan,
            FeatureConfig::FinalValue { fluent } => Feature::FinalValue {
                fluent: fluent.clone(),
            },
            FeatureConfig::ResourceUsage { fluent } => Feature::ResourceUsage {
                fluent: fluent.clone(),
            },
            FeatureConfig::PeakValue { fluent } => Feature::PeakValue {
                fluent: fluent.clone(),
            },
            FeatureConfig::ActionUsed { schema } => Feature::ActionUsed {
                schema: schema.clone(),
            },
            FeatureConfig::FirstAction => Feature::FirstAction,
        }
    }
}

/// Comparison policy for numeric feature values.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToleranceConfig {
    /// Values must be equal.
    Exact,

    /// Values within `value` of each other are the same behaviour.
    Epsilon { value: f64 },

    /// Values falling in the same bin of the given width are the same
    /// behaviour.
    Bin { width: f64 },
}

impl ToleranceConfig {
    fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        match self {
            ToleranceConfig::Exact => Ok(()),
            ToleranceConfig::Epsilon { value } if value.is_finite() && *value >= 0.0 => Ok(()),
            ToleranceConfig::Epsilon { value } => Err(ConfigError::Invalid(format!(
                "{}: epsilon must be finite and non-negative, got {}",
                owner, value
            ))),
            ToleranceConfig::Bin { width } if width.is_finite() && *width > 0.0 => Ok(()),
            ToleranceConfig::Bin { width } => Err(ConfigError::Invalid(format!(
                "{}: bin width must be finite and positive, got {}",
                owner, width
            ))),
        }
    }
}

/// Base planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BasePlannerConfig {
    /// Maximum number of distinct plans. Zero or negative requests nothing.
    #[serde(default)]
    pub k: Option<i64>,

    /// Wall-clock limit for a single oracle call, in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Wall-clock limit for the whole run, in seconds.
    #[serde(default)]
    pub seconds_spent_limit: Option<u64>,

    /// Opaque options forwarded to the oracle.
    #[serde(flatten)]
    pub options: BTreeMap<String, OptionValue>,
}

impl BasePlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_ms must be positive".to_string(),
            ));
        }
        if self.seconds_spent_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "seconds_spent_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Splits recognized keys from the opaque oracle options.
    pub fn normalize(&self) -> NormalizedPlannerConfig {
        NormalizedPlannerConfig {
            plan_count: PlanCount::from_k(self.k),
            oracle_timeout: self.timeout_ms.map(Duration::from_millis),
            time_limit: self.seconds_spent_limit.map(Duration::from_secs),
            options: self.options.clone(),
        }
    }
}

/// How many plans a run may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanCount {
    /// Run until the oracle reports unsolvability.
    Unbounded,
    /// Stop after this many accepted plans.
    AtMost(usize),
}

impl PlanCount {
    /// Interprets a raw `k`; absent means unbounded, `k <= 0` means zero.
    pub fn from_k(k: Option<i64>) -> Self {
        match k {
            None => PlanCount::Unbounded,
            Some(k) if k <= 0 => PlanCount::AtMost(0),
            Some(k) => PlanCount::AtMost(usize::try_from(k).unwrap_or(usize::MAX)),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, PlanCount::AtMost(0))
    }

    /// Returns true once `accepted` plans satisfy the request.
    pub fn is_reached(&self, accepted: usize) -> bool {
        match self {
            PlanCount::Unbounded => false,
            PlanCount::AtMost(n) => accepted >= *n,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            PlanCount::Unbounded => None,
            PlanCount::AtMost(n) => Some(*n),
        }
    }
}

/// Immutable base planner settings, built once per planner.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPlannerConfig {
    pub plan_count: PlanCount,
    pub oracle_timeout: Option<Duration>,
    pub time_limit: Option<Duration>,
    /// Oracle options with the recognized keys removed.
    pub options: OracleOptions,
}

impl Default for NormalizedPlannerConfig {
    fn default() -> Self {
        BasePlannerConfig::default().normalize()
    }
}

#[cfg(test)]
mod tests;
