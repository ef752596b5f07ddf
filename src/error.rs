use thiserror::Error;

/// Main error type for the risk service
#[derive(Error, Debug)]
pub enum BodyEchoError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Request shape errors (whole request is rejected)
    #[error("Invalid request: {0}")]
    Request(String),

    // Artifact errors
    #[error("Artifact error: {0}")]
    Artifact(#[from] LoadError),

    #[error("Food search error: {0}")]
    FoodSearch(#[from] FoodSearchError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for BodyEchoError
pub type Result<T> = std::result::Result<T, BodyEchoError>;

/// Failure to load one category's model or scaler artifact.
///
/// Recorded by the registry and kept for the process lifetime, so it only
/// carries owned strings and is cheap to clone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("artifact not found: {path}")]
    NotFound { path: String },

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: String, reason: String },
}

/// A model row could not be built for a category.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("scaler column `{0}` is not a known feature column")]
    UnknownScalerColumn(String),

    #[error("model feature `{0}` is not a known feature column")]
    UnknownModelColumn(String),

    #[error("model feature `{column}` is forbidden for {category}")]
    ForbiddenModelColumn { column: String, category: String },

    #[error("scaler transform failed: {0}")]
    Scale(#[from] ScaleError),
}

/// A scaler could not transform the requested columns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error("{columns} columns but {values} values")]
    LengthMismatch { columns: usize, values: usize },

    #[error("scaler was not fit on `{0}`")]
    UnfitColumn(String),

    #[error("scaler returned {got} values for {expected} columns")]
    OutputWidth { got: usize, expected: usize },
}

/// predict / predict_proba failed for a category.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("feature count mismatch: got {got}, expected {expected}")]
    FeatureCount { got: usize, expected: usize },

    #[error("invalid class label {0}")]
    InvalidLabel(String),

    #[error("invalid probability {0}")]
    InvalidProbability(String),

    #[error("model evaluation failed: {0}")]
    Evaluation(String),
}

/// Per-category outcome error; never aborts sibling categories.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Model not loaded")]
    NotLoaded,

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Food-search proxy failures, each mapped to a response status and code.
#[derive(Error, Debug)]
pub enum FoodSearchError {
    #[error("Query parameter is required")]
    MissingQuery,

    #[error("API credentials not configured")]
    MissingCredentials,

    #[error("Authentication failed - Invalid API credentials")]
    AuthFailed { details: String },

    #[error("Access forbidden - Check API permissions")]
    Forbidden { details: String },

    #[error("Rate limit exceeded - Too many requests")]
    RateLimited { details: String },

    #[error("FatSecret API request failed with status {status}")]
    Api { status: u16, details: String },

    #[error("Failed to parse API response")]
    Parse { details: String },

    #[error("Request timeout - FatSecret API took too long to respond")]
    Timeout,

    #[error("Connection error - Unable to reach FatSecret API")]
    Connection { details: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl FoodSearchError {
    /// Stable machine-readable code returned to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingQuery => "MISSING_QUERY",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::AuthFailed { .. } => "AUTH_FAILED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::RateLimited { .. } => "RATE_LIMIT",
            Self::Api { .. } => "API_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Connection { .. } => "CONNECTION_ERROR",
            Self::Unexpected(_) => "UNKNOWN_ERROR",
        }
    }

    /// HTTP status the proxy answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingQuery => 400,
            Self::AuthFailed { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::RateLimited { .. } => 429,
            Self::Timeout => 504,
            Self::Connection { .. } => 503,
            Self::MissingCredentials
            | Self::Api { .. }
            | Self::Parse { .. }
            | Self::Unexpected(_) => 500,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            Self::AuthFailed { details }
            | Self::Forbidden { details }
            | Self::RateLimited { details }
            | Self::Api { details, .. }
            | Self::Parse { details }
            | Self::Connection { details } => Some(details),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FoodSearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FoodSearchError::Timeout
        } else if err.is_connect() {
            FoodSearchError::Connection {
                details: err.to_string(),
            }
        } else {
            FoodSearchError::Unexpected(err.to_string())
        }
    }
}
