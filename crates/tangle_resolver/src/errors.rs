use std::fmt;

/// Errors surfaced while adding or ordering sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A source could not be loaded or understood. The key names the file.
    Key { key: String, message: String },
    /// `resolve_only` was asked for an export no added file provides.
    UnresolvedExport { path: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Key { key, message } => write!(f, "{key}: {message}"),
            ResolveError::UnresolvedExport { path } => {
                write!(f, "export does not exist: {path}")
            }
        }
    }
}

impl std::error::Error for ResolveError {}
