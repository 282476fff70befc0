use thiserror::Error;

/// Result alias used across the router's operation surface.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

/// Defines the primary error categories surfaced by the router.
///
/// Every public operation either returns a value or fails with exactly one of
/// these variants, regardless of which protocol version is active underneath.
/// Callers never observe backend-specific error shapes.
#[derive(Error, Debug)]
pub enum RouterError {
    /// Fatal failure while constructing the router: missing version or node
    /// configuration, an unrecognized protocol version, or a backend handle
    /// that could not be built. The router must not be used afterward.
    #[error("router initialization failed: {0}")]
    Initialization(String),

    /// The requested (protocol version, partition, operation) combination is
    /// not possible: either the partition is not addressable under the active
    /// mode, or the operation does not exist in the active capability set.
    #[error("version not supported: {0}")]
    UnsupportedOperation(String),

    /// Malformed caller input, rejected before any backend dispatch.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// A failure surfaced by the underlying ledger interaction, passed through
    /// without reinterpretation.
    #[error("ledger backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl RouterError {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation(reason.into())
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
