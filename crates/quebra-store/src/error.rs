//! # Store Error Types
//!
//! Error types for file, spreadsheet and configuration operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io::Error / csv::Error / calamine::Error / XlsxError                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds path context                          │
//! │       │                     wraps CoreError from quebra-core           │
//! │       ▼                                                                 │
//! │  StoreError::kind() → Validation | Schema | NotFound |                 │
//! │                       Persistence | Config                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Presentation layer picks the message and exit code                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::path::PathBuf;

use quebra_core::error::{CoreError, SchemaError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Business rule failure from quebra-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading or writing a file failed.
    ///
    /// ## When This Occurs
    /// - Data directory is read-only
    /// - Disk full during the temp-file write
    /// - Rename onto the target failed
    ///
    /// Memory is left untouched: mutations commit only after the write.
    #[error("Falha ao acessar '{path}': {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored file has a row that cannot be read back.
    #[error("Arquivo '{path}' inválido na linha {line}: {reason}")]
    Corrupt {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// CSV encoding/decoding failure outside row parsing.
    #[error("Erro de CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Import spreadsheet could not be opened or read.
    #[error("Erro ao ler planilha: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// A CSV import source is not text or has a malformed record.
    ///
    /// ## When This Occurs
    /// - File saved in a legacy encoding instead of UTF-8
    /// - Unbalanced quotes in a data row
    #[error("Planilha '{path}' ilegível: {reason}")]
    UnreadableSource { path: PathBuf, reason: String },

    /// XLSX export failed.
    #[error("Erro ao gerar planilha: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Invalid configuration value or unreadable config file.
    #[error("Configuração inválida: {0}")]
    Config(String),

    /// Import source does not exist.
    #[error("Arquivo de importação não encontrado: {0}")]
    SourceMissing(PathBuf),

    /// Import source extension is not a known spreadsheet format.
    #[error("Formato de planilha não suportado: {0}")]
    UnsupportedFormat(String),
}

impl StoreError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Classifies the error for the presentation layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Core(CoreError::Validation(_)) => ErrorKind::Validation,
            StoreError::Core(CoreError::Schema(_)) => ErrorKind::Schema,
            StoreError::Core(CoreError::RecordNotFound(_) | CoreError::PriceNotFound(_)) => {
                ErrorKind::NotFound
            }
            StoreError::SourceMissing(_) | StoreError::UnsupportedFormat(_) => ErrorKind::Validation,
            StoreError::Spreadsheet(_) | StoreError::UnreadableSource { .. } => ErrorKind::Schema,
            StoreError::Config(_) => ErrorKind::Config,
            StoreError::Persistence { .. }
            | StoreError::Corrupt { .. }
            | StoreError::Csv(_)
            | StoreError::Xlsx(_) => ErrorKind::Persistence,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Core(err.into())
    }
}

impl From<SchemaError> for StoreError {
    fn from(err: SchemaError) -> Self {
        StoreError::Core(err.into())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::Config(err.to_string())
    }
}

/// Error categories shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or invalid input; nothing changed.
    Validation,
    /// Import source lacks a required column or cannot be parsed.
    Schema,
    /// Edit/delete target does not exist.
    NotFound,
    /// File read/write failure; retry the operation.
    Persistence,
    /// Bad configuration.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Schema => write!(f, "schema"),
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Persistence => write!(f, "persistence"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use quebra_core::RecordId;

    #[test]
    fn test_error_kinds() {
        let err: StoreError = ValidationError::required("Filial").into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Filial é obrigatório");

        let err: StoreError = SchemaError::MissingColumn("DESCRIÇÃO".into()).into();
        assert_eq!(err.kind(), ErrorKind::Schema);

        let err: StoreError = CoreError::RecordNotFound(RecordId::new()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = StoreError::io("x.csv", std::io::Error::other("disk full"));
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
