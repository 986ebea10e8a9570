mod defaults;
mod types;

pub use defaults::{DEFAULT_LIVENESS_INTERVAL, DEFAULT_MAX_EXPANSIONS};
pub use types::*;

use crate::error::ConfigError;
use crate::planner::{HeuristicWeight, MoveKind, SearchLimits};
use defaults::*;
use std::path::Path;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            service: ServiceConfig::default(),
            planner: PlannerConfig::default(),
            pressure: PressureConfig::default(),
            tracker: TrackerConfig::default(),
            profile: Default::default(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.threads == 0 {
            return Err(invalid("service.threads", "must be at least 1"));
        }
        if self.planner.max_expansions == 0 {
            return Err(invalid("planner.max_expansions", "must be at least 1"));
        }
        if self.planner.liveness_interval == 0 {
            return Err(invalid("planner.liveness_interval", "must be at least 1"));
        }
        HeuristicWeight::new(self.planner.heuristic_weight)
            .map_err(|e| invalid("planner.heuristic_weight", e))?;

        if self.pressure.enabled {
            if self.pressure.threshold == 0 {
                return Err(invalid("pressure.threshold", "must be at least 1"));
            }
            if !(self.pressure.step.is_finite() && self.pressure.step >= 0.0) {
                return Err(invalid("pressure.step", "must be a non-negative number"));
            }
        }
        if !(self.pressure.max_weight >= self.planner.heuristic_weight) {
            return Err(invalid(
                "pressure.max_weight",
                "must be at least planner.heuristic_weight",
            ));
        }

        if self.tracker.max_attempts == 0 {
            return Err(invalid("tracker.max_attempts", "must be at least 1"));
        }
        if self.tracker.budget_growth == 0 {
            return Err(invalid("tracker.budget_growth", "must be at least 1"));
        }

        for kind in MoveKind::ALL {
            if let Some(cost) = self.profile.cost_of(kind) {
                if !(cost.is_finite() && cost >= 0.0) {
                    return Err(invalid(
                        "profile",
                        format!("{} cost must be a non-negative number, got {}", kind, cost),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_expansions: self.planner.max_expansions,
            liveness_interval: self.planner.liveness_interval,
        }
    }
}

fn invalid(field: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
