pub const DEFAULT_MAX_EXPANSIONS: usize = 4096;
pub const DEFAULT_LIVENESS_INTERVAL: usize = 16;

pub fn default_version() -> u32 {
    1
}

pub fn default_service_name() -> String {
    "pathfinding".to_string()
}

pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().clamp(1, 8))
        .unwrap_or(4)
}

pub fn default_max_expansions() -> usize {
    DEFAULT_MAX_EXPANSIONS
}

pub fn default_heuristic_weight() -> f32 {
    1.0
}

pub fn default_liveness_interval() -> usize {
    DEFAULT_LIVENESS_INTERVAL
}

pub fn default_pressure_threshold() -> usize {
    32
}

pub fn default_pressure_step() -> f32 {
    0.25
}

pub fn default_max_weight() -> f32 {
    3.0
}

pub fn default_timeout_ticks() -> u32 {
    120
}

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_budget_growth() -> usize {
    2
}

pub fn default_true() -> bool {
    true
}
