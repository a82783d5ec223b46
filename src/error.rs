//! Error type shared by the export pipeline.

/// Everything that can abort an export call.
///
/// Unrecognized line styles are not listed here: they are recoverable and only
/// produce a warning (see [`crate::style::resolve_dash`]).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    /// A path carried a command code outside moveto/lineto/curve3/curve4/closepoly.
    #[error("unrecognized path command code: {0}")]
    UnrecognizedCommand(u8),

    /// A path command needed more vertices than the path provides.
    #[error("path truncated: command {command} needs {needed} vertices, {available} left")]
    TruncatedPath {
        command: &'static str,
        needed: usize,
        available: usize,
    },

    /// Host path whose code list does not pair up with its vertex list.
    #[error("path has {vertices} vertices but {codes} command codes")]
    CodeCountMismatch { vertices: usize, codes: usize },

    /// Axis scale other than linear, log or date.
    #[error("unknown axis scale: {0}")]
    UnknownScale(String),

    /// Date-axis limit outside the representable calendar range.
    #[error("date value out of range: {0} days since epoch")]
    DateOutOfRange(f64),

    /// Tick formatter template that cannot be expressed as prefix/spec/suffix.
    #[error("unsupported tick format: {0}")]
    UnsupportedFormat(String),

    /// Both a CRS definition and an EPSG code were supplied.
    #[error("crs and epsg cannot both be specified")]
    ConflictingProjection,

    /// A CRS definition or EPSG code this crate cannot invert to lon/lat.
    #[error("unsupported projection: {0}")]
    UnsupportedProjection(String),

    /// Tile shortcut missing from the provider registry.
    #[error("unknown tile provider: {0}")]
    UnknownTiles(String),

    /// Color specification that could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("serialization failed: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
