use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::planner::AgentProfile;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub pressure: PressureConfig,

    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Movement profile used for agents created from the command line
    #[serde(default)]
    pub profile: AgentProfile,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ServiceConfig {
    /// Worker thread name prefix
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Worker threads for the planning service
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            threads: default_threads(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PlannerConfig {
    /// Expansion cap for requests that do not set their own
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,

    /// Heuristic weight for requests that do not set their own (>= 1)
    #[serde(default = "default_heuristic_weight")]
    pub heuristic_weight: f32,

    /// Re-check whether a request is still wanted every N expansions
    #[serde(default = "default_liveness_interval")]
    pub liveness_interval: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: default_max_expansions(),
            heuristic_weight: default_heuristic_weight(),
            liveness_interval: default_liveness_interval(),
        }
    }
}

/// Inflates the heuristic weight as the backlog grows
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PressureConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Outstanding requests per weight step
    #[serde(default = "default_pressure_threshold")]
    pub threshold: usize,

    /// Weight added per `threshold` outstanding requests
    #[serde(default = "default_pressure_step")]
    pub step: f32,

    #[serde(default = "default_max_weight")]
    pub max_weight: f32,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: default_pressure_threshold(),
            step: default_pressure_step(),
            max_weight: default_max_weight(),
        }
    }
}

/// Caller-side polling and retry policy
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct TrackerConfig {
    /// Ticks without a response before a request is given up on
    #[serde(default = "default_timeout_ticks")]
    pub timeout_ticks: u32,

    /// Attempts per plan, the first included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Expansion budget multiplier applied on each retry
    #[serde(default = "default_budget_growth")]
    pub budget_growth: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            timeout_ticks: default_timeout_ticks(),
            max_attempts: default_max_attempts(),
            budget_growth: default_budget_growth(),
        }
    }
}
