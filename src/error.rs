use thiserror::Error;

/// Top-level error type for the schedule IR toolkit.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}", format_error_pretty("analyzer error", &format!("{}", _0)))]
    Analyzer(#[from] AnalyzerError),

    #[error("{}", format_error_pretty("module format error", &format!("{}", _0)))]
    Serial(#[from] SerialError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_error_pretty(category: &str, msg: &str) -> String {
    format!("[{}] {}", category, msg)
}

// ---------------------------------------------------------------------------
// Analyzer errors
// ---------------------------------------------------------------------------

/// An invariant of the schedule IR does not hold.
///
/// These indicate a bug in whatever pass produced or edited the IR; callers
/// should stop using the affected trees.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("expected {expected}, found {found}:\n{dump}")]
    UnexpectedNode {
        expected: &'static str,
        found: &'static str,
        dump: String,
    },

    #[error("didn't find a block with name '{name}' in this module")]
    BlockNotFound { name: String },

    #[error("there should not be more than 1 block with identical name '{name}'")]
    DuplicateBlock { name: String },

    #[error("block '{name}' appeared in more than one function")]
    BlockInMultipleTrees { name: String },

    #[error("didn't find any schedule block in the module")]
    NoBlocks,

    #[error("didn't find any loop in the first function")]
    NoLoops,

    #[error("malformed function root: {detail}")]
    MalformedRoot { detail: String },

    #[error("didn't find expression in any function:\n{dump}")]
    ExprNotFound { dump: String },

    #[error("can't find the parent of block '{name}'")]
    ParentNotFound { name: String },

    #[error("block '{name}' should have exactly one store, found {count}")]
    StoreCount { name: String, count: usize },

    #[error("store target is not a tensor:\n{dump}")]
    NotTensor { dump: String },

    #[error("reduction tensor '{name}' should have exactly one consumer, found {count}")]
    ReduceConsumerCount { name: String, count: usize },

    #[error("size mismatch in {what}: expected {expected}, found {found}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// Module document errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("invalid module document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid module structure: {detail}")]
    Structure { detail: String },

    #[error("could not print module: {0}")]
    Format(#[from] std::fmt::Error),
}

impl Error {
    /// Returns a stable diagnostic code for this error.
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            Error::Analyzer(a) => match a {
                AnalyzerError::UnexpectedNode { .. } => "E0001",
                AnalyzerError::BlockNotFound { .. } => "E0002",
                AnalyzerError::DuplicateBlock { .. } => "E0003",
                AnalyzerError::BlockInMultipleTrees { .. } => "E0004",
                AnalyzerError::NoBlocks => "E0005",
                AnalyzerError::NoLoops => "E0006",
                AnalyzerError::MalformedRoot { .. } => "E0007",
                AnalyzerError::ExprNotFound { .. } => "E0008",
                AnalyzerError::ParentNotFound { .. } => "E0009",
                AnalyzerError::StoreCount { .. } => "E0010",
                AnalyzerError::NotTensor { .. } => "E0011",
                AnalyzerError::ReduceConsumerCount { .. } => "E0012",
                AnalyzerError::SizeMismatch { .. } => "E0013",
            },
            Error::Serial(s) => match s {
                SerialError::Json(_) => "E0100",
                SerialError::Structure { .. } => "E0101",
                SerialError::Format(_) => "E0102",
            },
            Error::Io(_) => "E0200",
        }
    }
}
