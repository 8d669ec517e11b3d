use thiserror::Error;

/// Result type for planning operations
pub type Result<T> = std::result::Result<T, PlanError>;

/// Errors raised while validating a distribution network
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Two tables disagree on the size of a shared axis
    #[error("dimension mismatch on {axis} axis: {left} has {left_len}, {right} has {right_len}")]
    DimensionMismatch {
        axis: &'static str,
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    /// A cost or demand entry is outside its allowed range
    #[error("invalid value in {table} at {location}: {value}")]
    InvalidValue {
        table: &'static str,
        location: String,
        value: String,
    },

    /// The same identifier appears twice on one axis
    #[error("duplicate {axis} identifier '{id}'")]
    DuplicateIdentifier { axis: &'static str, id: String },
}

/// Errors raised while assembling the optimization model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("cannot build model from invalid network: {0}")]
    InvalidNetwork(#[from] NetworkError),
}

/// Failures of a solver backend that are not solve statuses
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The backend could not be set up or rejected the program
    #[error("{solver} backend failed: {details}")]
    Backend { solver: String, details: String },

    /// The worker running the backend stopped without reporting back
    #[error("solver worker terminated unexpectedly")]
    WorkerLost,
}

/// Errors raised while reading solved values back into flows
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("cannot extract flows from a {status} outcome")]
    NotOptimal { status: String },

    #[error("variable {variable} has non-integral value {value}")]
    NonIntegralFlow { variable: String, value: f64 },

    #[error("flow conservation violated at {dc}: inbound {inbound}, outbound {outbound}")]
    ConservationViolated {
        dc: String,
        inbound: u64,
        outbound: u64,
    },
}

/// Errors raised while reading network tables from disk
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path} line {line}: cannot parse '{value}' as {expected}")]
    Parse {
        path: String,
        line: usize,
        value: String,
        expected: &'static str,
    },

    #[error("{path}: {details}")]
    Malformed { path: String, details: String },

    #[error("{axis} '{id}' in {path} is not present in {reference}")]
    UnknownIdentifier {
        axis: &'static str,
        id: String,
        path: String,
        reference: String,
    },

    #[error("{axis} '{id}' has no entry in {path}")]
    MissingIdentifier {
        axis: &'static str,
        id: String,
        path: String,
    },

    #[error("{axis} '{id}' appears more than once in {path}")]
    DuplicateIdentifier {
        axis: &'static str,
        id: String,
        path: String,
    },

    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Umbrella error for the plan pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl PlanError {
    /// Whether the error stems from caller input rather than the solver
    pub fn is_input_error(&self) -> bool {
        matches!(self, PlanError::Network(_) | PlanError::Build(_))
    }
}
