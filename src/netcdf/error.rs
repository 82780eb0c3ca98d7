use super::Phase;
use super::types::NcType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("not a NetCDF classic container: {0}")]
    Format(String),

    #[error("dimension '{0}' does not exist")]
    MissingDimension(String),

    #[error("variable '{0}' does not exist")]
    MissingVariable(String),

    #[error("attribute '{name}' does not exist on variable '{variable}'")]
    MissingAttribute { variable: String, name: String },

    #[error("variable '{variable}' is of type {found}, not {expected}")]
    TypeMismatch {
        variable: String,
        expected: NcType,
        found: NcType,
    },

    #[error("attribute '{name}' is of type {found}, expected {expected} data")]
    AttributeType {
        name: String,
        expected: &'static str,
        found: NcType,
    },

    #[error("invalid access to variable '{variable}': {details}")]
    Bounds { variable: String, details: String },

    #[error("cannot {operation} while in {phase} phase")]
    Phase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("cannot {0}: container is opened read-only")]
    ReadOnly(&'static str),

    #[error("{kind} '{name}' is already defined")]
    Duplicate { kind: &'static str, name: String },

    #[error("invalid schema: {0}")]
    Schema(String),
}

impl Error {
    /// `true` when a named dimension, variable or attribute is absent.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Error::MissingDimension(_) | Error::MissingVariable(_) | Error::MissingAttribute { .. }
        )
    }

    pub(crate) fn bounds(variable: &str, details: impl Into<String>) -> Self {
        Self::Bounds {
            variable: variable.to_string(),
            details: details.into(),
        }
    }
}
