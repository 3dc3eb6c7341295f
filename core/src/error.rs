use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument to {operation}")]
    InvalidArgument {
        operation: &'static str,
        details: String,
    },
    #[error("Invalid value for {field}")]
    Validation {
        field: &'static str,
        details: String,
    },
    #[error("No ledger entry for {category} / {subcategory}")]
    MasterNotFound {
        category: String,
        subcategory: String,
    },
    #[error("Record {id} not found")]
    RecordNotFound { id: u64 },
    #[error("RON {action} error")]
    Ron {
        action: StorageAction,
        path: Option<String>,
        #[source]
        source: ron::Error,
    },
    #[error("RON {action} error")]
    RonParse {
        action: StorageAction,
        path: Option<String>,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("Storage {action} error")]
    StorageIo {
        action: StorageAction,
        path: Option<String>,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAction {
    Load,
    Save,
}

impl fmt::Display for StorageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageAction::Load => f.write_str("load"),
            StorageAction::Save => f.write_str("save"),
        }
    }
}

impl Error {
    pub fn validation(field: &'static str, details: impl Into<String>) -> Self {
        Error::Validation {
            field,
            details: details.into(),
        }
    }

    /// Short message suitable for a status line or toast.
    pub fn user_summary(&self) -> String {
        match self {
            Error::InvalidArgument { operation, .. } => {
                format!("Invalid argument passed to {operation}.")
            }
            Error::Validation { details, .. } => details.clone(),
            Error::MasterNotFound { subcategory, .. } => {
                format!("Master record not found for {subcategory}.")
            }
            Error::RecordNotFound { id } => format!("Record {id} no longer exists."),
            Error::Ron { action, .. } | Error::RonParse { action, .. } => {
                format!("Failed to {action} ledger data.")
            }
            Error::StorageIo { action, .. } => format!("Failed to {action} ledger file."),
        }
    }

    pub fn technical_detail(&self) -> String {
        match self {
            Error::InvalidArgument { operation, details } => {
                format!("{operation}: {details}")
            }
            Error::Validation { field, details } => format!("{field}: {details}"),
            Error::MasterNotFound {
                category,
                subcategory,
            } => format!("No cost master with category={category} subcategory={subcategory}."),
            Error::RecordNotFound { id } => format!("No record with id={id}."),
            Error::Ron {
                action,
                path,
                source,
            } => format!("RON {action} error.{} {source}", path_suffix(path)),
            Error::RonParse {
                action,
                path,
                source,
            } => format!("RON {action} error.{} {source}", path_suffix(path)),
            Error::StorageIo {
                action,
                path,
                source,
            } => format!("Storage {action} error.{} {source}", path_suffix(path)),
        }
    }
}

fn path_suffix(path: &Option<String>) -> String {
    path.as_ref()
        .map(|value| format!(" path={value}."))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_summary_is_the_details() {
        let error = Error::validation("headcount", "Headcount must be at least 1.");
        assert_eq!(error.user_summary(), "Headcount must be at least 1.");
        assert_eq!(
            error.technical_detail(),
            "headcount: Headcount must be at least 1."
        );
    }

    #[test]
    fn storage_detail_includes_path() {
        let error = Error::StorageIo {
            action: StorageAction::Save,
            path: Some("ledger.ron".to_string()),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(error.user_summary(), "Failed to save ledger file.");
        assert!(error.technical_detail().contains("path=ledger.ron."));
    }
}
