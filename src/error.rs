use std::fmt;

use thiserror::Error;

/// Kind of catalog record a lookup was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Ingredient,
    SubRecipe,
    Dish,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Ingredient => write!(f, "ingredient"),
            RecordKind::SubRecipe => write!(f, "sub-recipe"),
            RecordKind::Dish => write!(f, "dish"),
        }
    }
}

/// Errors that can occur while costing recipes
#[derive(Error, Debug)]
pub enum CostingError {
    /// Referenced name has no catalog match
    #[error("{kind} not found: {name}")]
    NotFound { kind: RecordKind, name: String },

    /// Name matches records in more than one brand and no brand was given
    #[error("{kind} '{name}' exists in several brands, specify a brand")]
    Ambiguous { kind: RecordKind, name: String },

    /// Yield is zero, negative, above 100% or unparseable
    #[error("Invalid yield for {item}: {value}")]
    InvalidYield { item: String, value: String },

    /// Unit price is missing, zero or negative
    #[error("Invalid price for item: {item}")]
    InvalidPrice { item: String },

    /// Unit of measure spelling is not recognised
    #[error("Unknown unit of measure '{unit}' for {item}")]
    InvalidUnit { item: String, unit: String },

    /// Wastage or variance percentage is negative or not a number
    #[error("Invalid wastage percentage: {0}")]
    InvalidWastage(f64),

    /// Sub-recipe expansion looped or went deeper than the configured bound
    #[error("Sub-recipe cycle or depth limit ({depth}) reached at {item}: {chain}")]
    CycleOrDepthExceeded {
        item: String,
        depth: usize,
        chain: String,
    },

    /// Catalog row could not be mapped onto a canonical record
    #[error("Invalid catalog record: {0}")]
    InvalidRecord(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Catalog document is not valid JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Catalog file could not be read
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CostingError {
    pub(crate) fn not_found(kind: RecordKind, name: &str) -> Self {
        CostingError::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    /// True when the failure points at broken catalog data rather than a
    /// missing name, so operators know the source rows need fixing.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            CostingError::InvalidYield { .. }
                | CostingError::InvalidPrice { .. }
                | CostingError::InvalidUnit { .. }
                | CostingError::CycleOrDepthExceeded { .. }
                | CostingError::InvalidRecord(_)
        )
    }
}
