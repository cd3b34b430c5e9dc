use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The backing store's medium could not be opened or allocated.
    #[error("state store is not valid")]
    InvalidStore,

    /// A previous read or write on this store failed; `reset()` clears it.
    #[error("state store is in a failed state (reset required)")]
    Poisoned,

    #[error("no machine attached")]
    NoRoot,

    #[error("out of memory allocating {len} bytes")]
    OutOfMemory { len: usize },

    #[error("snapshot header mismatch (expected {expected:?}, found {found:?})")]
    HeaderMismatch { expected: String, found: String },

    #[error("snapshot was taken for {found:?}, running {expected:?}")]
    IdentityMismatch { expected: String, found: String },

    #[error("component tag mismatch (expected {expected:?}, found {found:?})")]
    TagMismatch { expected: String, found: String },

    #[error("corrupt snapshot: {0}")]
    Corrupt(&'static str),

    #[error("utf-8 decoding failed: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{component}: {source}")]
    Component {
        component: &'static str,
        #[source]
        source: Box<StateError>,
    },
}

impl StateError {
    /// Wraps `self` with the name of the component whose save/load failed.
    pub fn in_component(self, component: &'static str) -> Self {
        StateError::Component {
            component,
            source: Box::new(self),
        }
    }

    /// Strips any `Component` wrappers and returns the error that started the failure.
    pub fn root_cause(&self) -> &StateError {
        let mut err = self;
        while let StateError::Component { source, .. } = err {
            err = source;
        }
        err
    }

    /// Component path from the outermost composite down to the failing leaf.
    pub fn component_path(&self) -> Vec<&'static str> {
        let mut path = Vec::new();
        let mut err = self;
        while let StateError::Component { component, source } = err {
            path.push(*component);
            err = source;
        }
        path
    }

    /// True if this error came from a header or identity check rather than the body.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(
            self.root_cause(),
            StateError::HeaderMismatch { .. } | StateError::IdentityMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_chain_reports_path_and_cause() {
        let err = StateError::Corrupt("bad bank")
            .in_component("Cartridge")
            .in_component("System")
            .in_component("Console");
        assert_eq!(err.component_path(), vec!["Console", "System", "Cartridge"]);
        assert!(matches!(err.root_cause(), StateError::Corrupt("bad bank")));
        assert_eq!(
            err.to_string(),
            "Console: System: Cartridge: corrupt snapshot: bad bank"
        );
    }

    #[test]
    fn header_and_identity_are_format_mismatches() {
        let header = StateError::HeaderMismatch {
            expected: "a".into(),
            found: "b".into(),
        };
        assert!(header.is_format_mismatch());
        assert!(!StateError::Poisoned.is_format_mismatch());
    }
}
