//! Error types for tessel-core.
//!
//! The runtime absorbs most failures internally (out-of-bounds writes are
//! dropped, stale focus is repositioned, bad styles are clamped); this type
//! covers the few surfaces where a caller can observe a failure.

/// Error type for tessel-core operations.
#[derive(Debug, thiserror::Error)]
pub enum TesselError {
    /// A coordinate fell outside the current frame dimensions.
    #[error("coordinate ({x}, {y}) outside {width}x{height} frame")]
    OutOfBounds {
        /// Column of the rejected access.
        x: u16,
        /// Row of the rejected access.
        y: u16,
        /// Frame width at the time of the access.
        width: u16,
        /// Frame height at the time of the access.
        height: u16,
    },

    /// The focused node disappeared during a relayout.
    #[error("focused node {0:?} no longer present")]
    StaleFocus(String),

    /// A style field was outside its valid range and had to be clamped.
    #[error("invalid style value: {0}")]
    InvalidStyle(String),

    /// A styled-text run claimed more visible characters than the row holds.
    #[error("styled text overflows row: {0}")]
    BadStyledText(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for tessel-core operations.
pub type Result<T> = std::result::Result<T, TesselError>;
