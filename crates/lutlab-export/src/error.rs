//! Error types for preset validation, sampling and LUT export.

use std::path::PathBuf;
use thiserror::Error;

use crate::preset::LutType;

/// Result type for export operations.
pub type LutResult<T> = Result<T, LutError>;

/// Result type for preset validation.
pub type PresetResult<T> = Result<T, PresetError>;

/// A preset attribute is missing or holds an illegal value.
///
/// Every variant names the offending attribute and, where there is one,
/// the rejected value rendered as JSON.
#[derive(Debug, Error)]
pub enum PresetError {
    /// A required attribute is absent.
    #[error("missing attribute '{attr}'")]
    MissingAttribute {
        /// Attribute key.
        attr: String,
    },

    /// `type` is not one of 1D, 2D, 3D, default.
    #[error("invalid type: {value} (expected 1D, 2D, 3D or default)")]
    InvalidType {
        /// Rejected value.
        value: String,
    },

    /// `out_bitdepth` is not an integer in the legal interval.
    #[error("invalid out_bitdepth: {value} (expected an integer in [{min}, {max}])")]
    InvalidBitDepth {
        /// Rejected value.
        value: String,
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },

    /// `cube_size` is not an integer in the legal interval.
    #[error("invalid cube_size: {value} (expected an integer in [{min}, {max}])")]
    InvalidCubeSize {
        /// Rejected value.
        value: String,
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },

    /// A range is not an ordered pair of numbers.
    #[error("invalid {attr}: {value} (expected [low, high] with low <= high)")]
    InvalidRange {
        /// Attribute key (`in_range` or `out_range`).
        attr: String,
        /// Rejected value.
        value: String,
    },

    /// `smooth` is not an integer sample count.
    #[error("invalid smooth: {value} (expected an integer >= 2)")]
    InvalidSmooth {
        /// Rejected value.
        value: String,
    },

    /// `smooth` was given on a 3D preset.
    #[error("smooth is not allowed on a 3D preset")]
    SmoothOnCube,

    /// A boolean attribute holds a non-boolean.
    #[error("invalid {attr}: {value} (expected a boolean)")]
    InvalidFlag {
        /// Attribute key.
        attr: String,
        /// Rejected value.
        value: String,
    },

    /// A text attribute holds a non-string.
    #[error("invalid {attr}: {value} (expected a string)")]
    InvalidText {
        /// Attribute key.
        attr: String,
        /// Rejected value.
        value: String,
    },

    /// A format-specific attribute is absent.
    #[error("{format} preset needs attribute '{attr}'")]
    MissingFormatAttribute {
        /// Codec name.
        format: &'static str,
        /// Attribute key.
        attr: String,
    },

    /// A format-specific attribute holds an illegal value.
    #[error("{format} preset has invalid '{attr}': {value}")]
    InvalidFormatAttribute {
        /// Codec name.
        format: &'static str,
        /// Attribute key.
        attr: String,
        /// Rejected value.
        value: String,
    },

    /// The preset type cannot be written by this format.
    #[error("{format} presets must be of type {expected}, found {found}")]
    FormatType {
        /// Codec name.
        format: &'static str,
        /// Accepted type.
        expected: LutType,
        /// Type found in the preset.
        found: LutType,
    },
}

/// Errors that can occur while sampling or writing a LUT.
#[derive(Debug, Error)]
pub enum LutError {
    /// Preset validation failed.
    #[error("preset error: {0}")]
    Preset(#[from] PresetError),

    /// The sampler was called with a preset of the wrong dimensionality.
    #[error("preset isn't valid for {expected} sampling: type is {found}")]
    DimensionMismatch {
        /// Sampling mode requested.
        expected: &'static str,
        /// Preset type.
        found: LutType,
    },

    /// A codec write operation does not match the preset type.
    #[error("{format}: cannot write a {requested} LUT from a {found} preset")]
    WrongType {
        /// Codec name.
        format: &'static str,
        /// Write operation requested.
        requested: LutType,
        /// Preset type.
        found: LutType,
    },

    /// The format cannot store LUTs of this dimensionality.
    #[error("{format} format doesn't support {requested} LUTs")]
    UnsupportedDimension {
        /// Codec name.
        format: &'static str,
        /// Write operation requested.
        requested: LutType,
    },

    /// A format-specific legality rule was violated.
    #[error("{format}: {reason}")]
    Format {
        /// Codec name.
        format: &'static str,
        /// Description of the violated rule.
        reason: String,
    },

    /// The output bit depth does not match the span of the output range.
    #[error(
        "{format}: out_bitdepth {bitdepth} ({expected} code values) is inconsistent with \
         out_range {range}; set is_float to write float values"
    )]
    BitDepthMismatch {
        /// Codec name.
        format: &'static str,
        /// Requested bit depth.
        bitdepth: u32,
        /// Largest code value implied by the bit depth.
        expected: u64,
        /// Declared output range.
        range: String,
    },

    /// The output path extension does not match the format.
    #[error("{path}: expected a '{expected}' file")]
    ExtensionMismatch {
        /// Offending path.
        path: PathBuf,
        /// Expected extension.
        expected: String,
    },

    /// The output directory does not exist.
    #[error("directory doesn't exist: {path}")]
    MissingDirectory {
        /// Missing directory.
        path: PathBuf,
    },

    /// No codec is registered under this name or extension.
    #[error("unsupported export format: {0}")]
    UnknownFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid preset search pattern.
    #[error("invalid preset search pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}
