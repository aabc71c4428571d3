use thiserror::Error;

/// Fatal planning errors. A run that returns one of these produces no layout.
///
/// Per-structure infeasibility and budget truncation are not errors; they are
/// recorded on the returned [`crate::layout::Layout`].
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Invalid parcel geometry: {0}")]
    InvalidParcelGeometry(String),

    #[error("No buildable area: setbacks and exclusions consume the whole parcel")]
    NoBuildableArea,

    #[error("Invalid setback rules: {0}")]
    InvalidSetback(String),

    #[error("Invalid structure spec '{id}': {reason}")]
    InvalidStructureSpec { id: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
