//! # lutlab-export
//!
//! Preset-driven LUT export for VFX color pipelines.
//!
//! A color transform, any `Fn([f64; 3]) -> [f64; 3]`, is discretized over a
//! 1D/2D curve or a 3D cube and written in one of the common LUT formats.
//! What gets sampled, and how values are quantized, is described by a
//! [`preset`].
//!
//! # Pipeline
//!
//! - [`preset`] - raw and validated presets, preset files
//! - [`sampler`] - curve and cube sampling, with optional smoothing
//! - [`codec`] - the file formats and the shared write pipeline
//!
//! # Supported Formats
//!
//! | Codec | Extension | Dimensions |
//! |-------|-----------|------------|
//! | `cube` | `.cube` | 1D, 2D, 3D |
//! | `csp` | `.csp` | 1D, 2D, 3D |
//! | `3dl` | `.3dl` | 3D |
//! | `lut` | `.lut` | 1D, 2D |
//! | `spi` | `.spi1d`, `.spi3d` | 1D, 2D, 3D |
//! | `clcc` | `.cc` | 3D |
//! | `json` | `.json` | 3D |
//!
//! # Usage
//!
//! ```rust,no_run
//! use lutlab_export::{LutCodec, ThreeDlCodec, RawPreset};
//!
//! let gamma = |rgb: [f64; 3]| rgb.map(|c| c.powf(1.0 / 2.2));
//! let report = ThreeDlCodec.write_3d(&gamma, "grades".as_ref(), &RawPreset::new())?;
//! println!("{}", report);
//! # Ok::<(), lutlab_export::LutError>(())
//! ```
//!
//! # Dependencies
//!
//! - [`serde_json`] / [`serde_yaml`] - preset values and files
//! - [`rayon`] - parallel cube sampling
//! - [`tracing`] - export logging
//! - [`thiserror`] - error handling

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod codec;
mod error;
pub mod interp;
pub mod preset;
pub mod sampler;

pub use codec::{
    AsciiCodec, ClccCodec, CspCodec, CubeCodec, CurveLayout, ExportReport, JsonCodec, LutCodec,
    SpiCodec, ThreeDlCodec, codec_by_name, codec_for_extension, codecs, export,
};
pub use error::{LutError, LutResult, PresetError, PresetResult};
pub use preset::{LutKind, LutType, Number, Preset, Range, RawPreset, ValidationMode};
pub use sampler::{CubeSample, Rgb, Transform, sample_cube, sample_curve};
