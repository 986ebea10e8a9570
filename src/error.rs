use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridplanError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Failed to read map file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Map is empty")]
    Empty,

    #[error("Layer {layer} row {row} has width {found}, expected {expected}")]
    RaggedRow {
        layer: usize,
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Layer {layer} has {found} rows, expected {expected}")]
    RaggedLayer {
        layer: usize,
        found: usize,
        expected: usize,
    },

    #[error("Unknown map glyph '{glyph}' at layer {layer} row {row} column {column}")]
    UnknownGlyph {
        glyph: char,
        layer: usize,
        row: usize,
        column: usize,
    },

    #[error("Cell {0} is outside the map")]
    OutOfBounds(String),

    #[error("Invalid cell '{0}', expected x,y or x,y,z")]
    InvalidCell(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("Heuristic weight must be finite and >= 1, got {0}")]
    InvalidWeight(f32),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service '{0}' has been shut down")]
    ShutDown(String),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write report: {0}")]
    WriteReport(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
