//! Error types for the bridge.
//!
//! The external tool reports everything as free text, so most failures end
//! up in `Invocation` carrying the child's own diagnostic. The remaining
//! variants exist so the request/response front end can map faults to
//! distinct codes instead of collapsing them all into one envelope.

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Faults raised by the executor and the operation catalog.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation name not present in the catalog
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Missing or malformed operation parameters
    #[error("{0}")]
    BadArgs(String),

    /// Operation exists in the catalog but has no real implementation
    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),

    /// The device bridge reported that no usable device is attached
    #[error("no device: {0}")]
    NoDevice(String),

    /// Child process failed; message embeds its merged diagnostic output
    #[error("command failed: {0}")]
    Invocation(String),
}

impl Error {
    /// Classify a non-zero-exit diagnostic. adb prints a small set of
    /// stable markers when the failure is about device availability rather
    /// than the command itself.
    pub fn from_diagnostic(diag: String) -> Self {
        let lower = diag.to_ascii_lowercase();
        if lower.contains("no devices/emulators found") || lower.contains("device offline") {
            Error::NoDevice(diag)
        } else {
            Error::Invocation(diag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_device_marker_classified() {
        let e = Error::from_diagnostic("adb: no devices/emulators found".into());
        assert!(matches!(e, Error::NoDevice(_)));
    }

    #[test]
    fn offline_marker_classified() {
        let e = Error::from_diagnostic("error: device offline".into());
        assert!(matches!(e, Error::NoDevice(_)));
    }

    #[test]
    fn other_diagnostics_stay_invocation() {
        let e = Error::from_diagnostic("Error: Activity not started".into());
        assert!(matches!(e, Error::Invocation(_)));
        assert!(
            e.to_string().contains("Activity not started"),
            "diagnostic text must survive into the message"
        );
    }
}
