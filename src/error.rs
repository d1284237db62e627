//! Error types for the simulation core

use thiserror::Error;

/// The main error type for simulation operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid time step: {0} (must be finite and >= 0)")]
    InvalidTimeStep(f32),

    #[error("Simulation used before assets were ready")]
    NotReady,

    #[error("Ready signal fired more than once")]
    AlreadyReady,

    #[error("Asset load failed: {0}")]
    AssetLoad(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
