//! Error type shared by all groundcover crates

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while preparing or running a classification
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Missing or invalid target cloud, or an invalid parameter
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A layer that a step reads was never created on the cloud
    #[error("Layer '{0}' does not exist on this cloud")]
    MissingLayer(String),

    /// A layer transfer whose length does not match the point count of the cloud
    #[error("Layer '{layer}' expects {expected} values, got {actual}")]
    LayerLength {
        /// Name of the layer
        layer: String,
        /// Number of points in the cloud
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// A ratio was requested over zero points
    #[error("Division undefined: {0}")]
    DivisionUndefined(&'static str),
}

impl Error {
    /// Creates a new `Error::Configuration` from anything printable
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Returns `true` for every error that is detected while validating inputs, i.e. before a run mutates
    /// any cloud
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::MissingLayer(_) | Error::LayerLength { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_kinds() {
        assert!(Error::configuration("no target").is_configuration());
        assert!(Error::MissingLayer("H".into()).is_configuration());
        assert!(Error::LayerLength {
            layer: "L".into(),
            expected: 3,
            actual: 2
        }
        .is_configuration());
        assert!(!Error::DivisionUndefined("no visible points").is_configuration());
    }

    #[test]
    fn test_messages_name_the_culprit() {
        let err = Error::LayerLength {
            layer: "features".into(),
            expected: 4,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Layer 'features' expects 4 values, got 1");
        assert_eq!(
            Error::MissingLayer("H".into()).to_string(),
            "Layer 'H' does not exist on this cloud"
        );
    }
}
