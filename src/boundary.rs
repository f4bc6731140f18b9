use std::fmt;

/// Non-fatal conditions met while reconciling.
/// The run continues with a default; these should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileWarning {
    /// Tags could not be fetched or listed; treated as "no tags yet"
    MarkerEnumerationFailed { reason: String },
    /// Tag exists but carries no version number
    UnparsableTag { tag: String },
    /// Version string had missing or non-numeric parts that defaulted to 0
    MalformedVersion { source: String, raw: String },
}

impl fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileWarning::MarkerEnumerationFailed { reason } => {
                write!(
                    f,
                    "Could not enumerate release tags ({}); continuing as if none exist",
                    reason
                )
            }
            ReconcileWarning::UnparsableTag { tag } => {
                write!(f, "Ignoring tag '{}': no version number found", tag)
            }
            ReconcileWarning::MalformedVersion { source, raw } => {
                write!(
                    f,
                    "Version '{}' from {} is malformed; missing parts were read as 0",
                    raw, source
                )
            }
        }
    }
}
