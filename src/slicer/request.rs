//! Slice request: the immutable input of one engine invocation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::SliceError;

/// Hard floor for `budget_tokens`; anything below cannot hold even one
/// reference-only selection plus a summary.
pub const MIN_BUDGET: u32 = 256;

// ── Intensity ──────────────────────────────────────────────────────────────────

/// Scaling knob: how many items and how much context each strategy gathers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Lite,
    #[default]
    Standard,
    Deep,
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lite => write!(f, "lite"),
            Self::Standard => write!(f, "standard"),
            Self::Deep => write!(f, "deep"),
        }
    }
}

impl std::str::FromStr for Intensity {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lite" => Ok(Self::Lite),
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            other => Err(SliceError::InvalidRequest(format!(
                "unknown intensity '{other}' (expected lite, standard, or deep)"
            ))),
        }
    }
}

// ── Per-strategy caps ──────────────────────────────────────────────────────────

/// Request-level clamp on one strategy's output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StrategyCap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Per-candidate declared-token ceiling for this strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

// ── Request ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceRequest {
    /// Free-text task. May be empty (snapshot mode).
    pub task: String,
    /// Absolute repository root.
    pub root: PathBuf,
    pub budget_tokens: u32,
    pub intensity: Intensity,
    /// Strategies to run, in order. Empty = intensity default set.
    pub strategies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub strategy_intensity: BTreeMap<String, Intensity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub strategy_caps: BTreeMap<String, StrategyCap>,
    /// Request the directory-tree sidecar.
    #[serde(default)]
    pub with_tree: bool,
}

impl SliceRequest {
    pub fn new(task: impl Into<String>, root: impl Into<PathBuf>, budget_tokens: u32) -> Self {
        Self {
            task: task.into().trim().to_string(),
            root: root.into(),
            budget_tokens,
            intensity: Intensity::Standard,
            strategies: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            strategy_intensity: BTreeMap::new(),
            strategy_caps: BTreeMap::new(),
            with_tree: false,
        }
    }

    /// Effective intensity for one strategy: per-strategy override, else the
    /// request-wide level.
    pub fn effective_intensity(&self, strategy: &str) -> Intensity {
        self.strategy_intensity
            .get(strategy)
            .copied()
            .unwrap_or(self.intensity)
    }

    pub fn cap_for(&self, strategy: &str) -> StrategyCap {
        self.strategy_caps.get(strategy).copied().unwrap_or_default()
    }

    /// Fail-fast input validation. Strategy-name existence is checked by the
    /// planner against its registry; everything request-local lives here.
    pub fn validate(&self) -> Result<(), SliceError> {
        if self.budget_tokens < MIN_BUDGET {
            return Err(SliceError::InvalidRequest(format!(
                "budget {} below minimum {MIN_BUDGET}",
                self.budget_tokens
            )));
        }
        for pattern in &self.include {
            if self.exclude.contains(pattern) {
                return Err(SliceError::InvalidRequest(format!(
                    "pattern '{pattern}' appears in both include and exclude"
                )));
            }
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_floor() {
        let req = SliceRequest::new("task", "/repo", 255);
        assert!(matches!(
            req.validate(),
            Err(SliceError::InvalidRequest(_))
        ));
        assert!(SliceRequest::new("task", "/repo", 256).validate().is_ok());
    }

    #[test]
    fn test_include_exclude_conflict() {
        let mut req = SliceRequest::new("task", "/repo", 4000);
        req.include = vec!["src/**".to_string()];
        req.exclude = vec!["src/**".to_string()];
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_task_trimmed() {
        let req = SliceRequest::new("  fix auth  ", "/repo", 4000);
        assert_eq!(req.task, "fix auth");
    }

    #[test]
    fn test_effective_intensity_override() {
        let mut req = SliceRequest::new("task", "/repo", 4000);
        req.intensity = Intensity::Lite;
        req.strategy_intensity
            .insert("keyword".to_string(), Intensity::Deep);
        assert_eq!(req.effective_intensity("keyword"), Intensity::Deep);
        assert_eq!(req.effective_intensity("docs"), Intensity::Lite);
    }

    #[test]
    fn test_intensity_parse() {
        assert_eq!("deep".parse::<Intensity>().unwrap(), Intensity::Deep);
        assert!("extreme".parse::<Intensity>().is_err());
    }
}
