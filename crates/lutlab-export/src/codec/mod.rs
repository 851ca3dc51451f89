//! LUT file formats.
//!
//! Every format implements [`LutCodec`]. A codec owns a default preset,
//! layers its own legality rules on top of preset validation, and writes
//! the sampled data in its layout. All writes share one pipeline:
//!
//! 1. reject dimensions the format cannot store
//! 2. complete the preset from the codec default
//! 3. reject presets of the wrong type for the requested write
//! 4. apply the codec rules, then its write-time checks
//! 5. resolve the output path
//! 6. sample, then serialize through a buffered writer
//!
//! Nothing touches the file system before step 6, and a write that fails
//! during step 6 removes its partial file.
//!
//! # Example
//!
//! ```rust,no_run
//! use lutlab_export::codec;
//! use lutlab_export::preset::{self, RawPreset};
//!
//! let raw = RawPreset::new().with(preset::TYPE, "3D").with(preset::CUBE_SIZE, 33);
//! let report = codec::export("cube", &|rgb| rgb, "out/identity.cube".as_ref(), &raw)?;
//! println!("{}", report);
//! # Ok::<(), lutlab_export::LutError>(())
//! ```

pub mod ascii;
pub mod clcc;
pub mod csp;
pub mod cube;
pub mod json;
pub mod spi;
pub mod threedl;

pub use ascii::AsciiCodec;
pub use clcc::ClccCodec;
pub use csp::CspCodec;
pub use cube::CubeCodec;
pub use json::JsonCodec;
pub use spi::SpiCodec;
pub use threedl::ThreeDlCodec;

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::preset::{self, LutType, Preset, RawPreset, ValidationMode};
use crate::sampler::{CubeSample, Rgb, Transform, sample_cube, sample_curve};
use crate::{LutError, LutResult, PresetError, PresetResult};

/// A LUT file format.
pub trait LutCodec: Send + Sync {
    /// Short name used for lookup (`cube`, `3dl`, ...).
    fn name(&self) -> &'static str;

    /// Preset used to complete caller presets.
    fn default_preset(&self) -> RawPreset;

    /// True if the format can store LUTs of this type.
    fn supports(&self, lut_type: LutType) -> bool;

    /// File extension, with the leading dot, for a write of this type.
    fn extension(&self, lut_type: LutType) -> &'static str;

    /// Format-specific rules applied after generic validation.
    fn validate_format(&self, preset: Preset, _mode: ValidationMode) -> PresetResult<Preset> {
        Ok(preset)
    }

    /// Validates `raw` against this codec's default and rules.
    fn validate(&self, raw: &RawPreset, mode: ValidationMode) -> PresetResult<Preset> {
        let preset = preset::validate(raw, mode, &self.default_preset())?;
        self.validate_format(preset, mode)
    }

    /// Strict validation.
    fn check_preset(&self, raw: &RawPreset) -> PresetResult<Preset> {
        self.validate(raw, ValidationMode::Raise)
    }

    /// Validation that fills holes from the codec default.
    fn complete_preset(&self, raw: &RawPreset) -> PresetResult<Preset> {
        self.validate(raw, ValidationMode::Fill)
    }

    /// Write-time legality of a completed preset of the right type.
    ///
    /// Runs after the dimension check and before the output file exists.
    fn check_write(&self, _preset: &Preset) -> LutResult<()> {
        Ok(())
    }

    /// Writes a shared-curve LUT.
    fn write_1d(
        &self,
        _f: &Transform<'_>,
        _path: &Path,
        _raw: &RawPreset,
    ) -> LutResult<ExportReport> {
        Err(LutError::UnsupportedDimension {
            format: self.name(),
            requested: LutType::OneD,
        })
    }

    /// Writes a per-channel-curve LUT.
    fn write_2d(
        &self,
        _f: &Transform<'_>,
        _path: &Path,
        _raw: &RawPreset,
    ) -> LutResult<ExportReport> {
        Err(LutError::UnsupportedDimension {
            format: self.name(),
            requested: LutType::TwoD,
        })
    }

    /// Writes a cube LUT.
    fn write_3d(
        &self,
        _f: &Transform<'_>,
        _path: &Path,
        _raw: &RawPreset,
    ) -> LutResult<ExportReport> {
        Err(LutError::UnsupportedDimension {
            format: self.name(),
            requested: LutType::ThreeD,
        })
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Written file.
    pub path: PathBuf,
    /// Codec name.
    pub format: &'static str,
    /// Number of samples written.
    pub samples: usize,
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a new LUT was written in {}", self.path.display())
    }
}

/// Whether a curve write shares one curve or keeps three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveLayout {
    /// 1D: the red channel stands for all three.
    Shared,
    /// 2D: one curve per channel.
    PerChannel,
}

impl CurveLayout {
    /// Matching preset type.
    pub fn lut_type(self) -> LutType {
        match self {
            CurveLayout::Shared => LutType::OneD,
            CurveLayout::PerChannel => LutType::TwoD,
        }
    }
}

/// Number pattern for sample values: bare integers, or 6 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pattern {
    Int,
    Float,
}

impl Pattern {
    pub(crate) fn for_preset(preset: &Preset) -> Self {
        if preset.is_output_int() { Pattern::Int } else { Pattern::Float }
    }

    pub(crate) fn write_value<W: Write>(self, w: &mut W, v: f64) -> io::Result<()> {
        match self {
            Pattern::Int => writeln!(w, "{}", v as i64),
            Pattern::Float => writeln!(w, "{:.6}", v),
        }
    }

    pub(crate) fn write_rgb<W: Write>(self, w: &mut W, rgb: Rgb) -> io::Result<()> {
        match self {
            Pattern::Int => writeln!(w, "{} {} {}", rgb[0] as i64, rgb[1] as i64, rgb[2] as i64),
            Pattern::Float => writeln!(w, "{:.6} {:.6} {:.6}", rgb[0], rgb[1], rgb[2]),
        }
    }
}

static CODECS: [&dyn LutCodec; 7] = [
    &CubeCodec,
    &CspCodec,
    &ThreeDlCodec,
    &AsciiCodec,
    &SpiCodec,
    &ClccCodec,
    &JsonCodec,
];

/// All registered codecs.
pub fn codecs() -> &'static [&'static dyn LutCodec] {
    &CODECS
}

/// Looks a codec up by name (case-insensitive).
pub fn codec_by_name(name: &str) -> LutResult<&'static dyn LutCodec> {
    CODECS
        .iter()
        .copied()
        .find(|codec| codec.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| LutError::UnknownFormat(name.to_string()))
}

/// Looks a codec up by file extension, with or without the leading dot.
pub fn codec_for_extension(ext: &str) -> LutResult<&'static dyn LutCodec> {
    let wanted = ext.trim_start_matches('.');
    CODECS
        .iter()
        .copied()
        .find(|codec| {
            [LutType::OneD, LutType::ThreeD].iter().any(|&t| {
                codec.supports(t)
                    && codec
                        .extension(t)
                        .trim_start_matches('.')
                        .eq_ignore_ascii_case(wanted)
            })
        })
        .ok_or_else(|| LutError::UnknownFormat(ext.to_string()))
}

/// Completes `raw` with the named codec and writes the LUT its type asks for.
///
/// # Errors
///
/// [`LutError::DimensionMismatch`] if the completed preset is of type
/// `default`, plus every error of the codec write.
pub fn export(
    format: &str,
    f: &Transform<'_>,
    path: &Path,
    raw: &RawPreset,
) -> LutResult<ExportReport> {
    let codec = codec_by_name(format)?;
    let preset = codec.complete_preset(raw)?;
    match preset.lut_type() {
        LutType::OneD => codec.write_1d(f, path, raw),
        LutType::TwoD => codec.write_2d(f, path, raw),
        LutType::ThreeD => codec.write_3d(f, path, raw),
        LutType::Default => Err(LutError::DimensionMismatch {
            expected: "1D, 2D or 3D",
            found: LutType::Default,
        }),
    }
}

/// Resolves where a LUT is written.
///
/// An existing directory receives `<stem><ext>`. Any other path must end
/// in `ext` (case-insensitive) and sit in an existing directory.
pub fn resolve_output_path(path: &Path, ext: &str, stem: &str) -> LutResult<PathBuf> {
    if path.is_dir() {
        return Ok(path.join(format!("{}{}", stem, ext)));
    }

    let wanted = ext.trim_start_matches('.');
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted));
    if !matches {
        return Err(LutError::ExtensionMismatch {
            path: path.to_path_buf(),
            expected: ext.to_string(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(LutError::MissingDirectory {
                path: parent.to_path_buf(),
            });
        }
    }
    Ok(path.to_path_buf())
}

/// File name stem derived from a title.
pub(crate) fn file_stem(title: Option<&str>) -> String {
    let stem: String = title
        .unwrap_or("")
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    let stem = stem.trim_matches(|c| c == '_' || c == '.');
    if stem.is_empty() { "lut".to_string() } else { stem.to_string() }
}

/// Validation and path resolution shared by every write.
pub(crate) fn prepare<C: LutCodec + ?Sized>(
    codec: &C,
    raw: &RawPreset,
    requested: LutType,
    path: &Path,
) -> LutResult<(Preset, PathBuf)> {
    if !codec.supports(requested) {
        return Err(LutError::UnsupportedDimension {
            format: codec.name(),
            requested,
        });
    }

    let preset = preset::validate(raw, ValidationMode::Fill, &codec.default_preset())?;
    let found = preset.lut_type();
    let accepted = match requested {
        LutType::ThreeD => matches!(found, LutType::ThreeD | LutType::Default),
        _ => matches!(found, LutType::OneD | LutType::TwoD | LutType::Default),
    };
    if !accepted {
        return Err(LutError::WrongType {
            format: codec.name(),
            requested,
            found,
        });
    }

    let preset = codec.validate_format(preset, ValidationMode::Fill)?;
    codec.check_write(&preset)?;
    let stem = file_stem(preset.title.as_deref());
    let path = resolve_output_path(path, codec.extension(requested), &stem)?;
    Ok((preset, path))
}

/// Samples and writes a curve LUT.
pub(crate) fn export_curve<C, B>(
    codec: &C,
    f: &Transform<'_>,
    path: &Path,
    raw: &RawPreset,
    layout: CurveLayout,
    body: B,
) -> LutResult<ExportReport>
where
    C: LutCodec + ?Sized,
    B: FnOnce(&mut BufWriter<File>, &[Rgb], &Preset) -> LutResult<()>,
{
    let (preset, path) = prepare(codec, raw, layout.lut_type(), path)?;
    debug!(format = codec.name(), path = %path.display(), layout = ?layout, "Exporting curve LUT");

    let curve = sample_curve(f, &preset)?;
    write_file(&path, |w| body(w, &curve, &preset))?;
    debug!(format = codec.name(), samples = curve.len(), "Curve LUT written");
    Ok(ExportReport {
        path,
        format: codec.name(),
        samples: curve.len(),
    })
}

/// Samples and writes a cube LUT.
pub(crate) fn export_cube<C, B>(
    codec: &C,
    f: &Transform<'_>,
    path: &Path,
    raw: &RawPreset,
    body: B,
) -> LutResult<ExportReport>
where
    C: LutCodec + ?Sized,
    B: FnOnce(&mut BufWriter<File>, &[CubeSample], &Preset) -> LutResult<()>,
{
    let (preset, path) = prepare(codec, raw, LutType::ThreeD, path)?;
    debug!(format = codec.name(), path = %path.display(), "Exporting cube LUT");

    let cube = sample_cube(f, &preset)?;
    write_file(&path, |w| body(w, &cube, &preset))?;
    debug!(format = codec.name(), samples = cube.len(), "Cube LUT written");
    Ok(ExportReport {
        path,
        format: codec.name(),
        samples: cube.len(),
    })
}

/// Deletes a partially written file unless disarmed.
struct PartialFile<'a> {
    path: &'a Path,
    armed: bool,
}

impl Drop for PartialFile<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(path = %self.path.display(), "Removing partial LUT file");
            let _ = fs::remove_file(self.path);
        }
    }
}

fn write_file<F>(path: &Path, body: F) -> LutResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> LutResult<()>,
{
    let file = File::create(path)?;
    let mut partial = PartialFile { path, armed: true };
    let mut writer = BufWriter::new(file);
    body(&mut writer)?;
    writer.flush()?;
    partial.armed = false;
    Ok(())
}

/// Resolves a boolean codec attribute.
///
/// In raise mode a missing or non-boolean value is an error; in fill mode it
/// is taken from `default`.
pub(crate) fn format_flag(
    preset: &mut Preset,
    key: &str,
    format: &'static str,
    mode: ValidationMode,
    default: &RawPreset,
) -> PresetResult<bool> {
    let fallback = || default.get(key).and_then(Value::as_bool).unwrap_or(false);
    let value = match preset.extras.get(key) {
        Some(Value::Bool(flag)) => *flag,
        Some(other) if mode == ValidationMode::Raise => {
            return Err(PresetError::InvalidFormatAttribute {
                format,
                attr: key.to_string(),
                value: other.to_string(),
            });
        }
        None if mode == ValidationMode::Raise => {
            return Err(PresetError::MissingFormatAttribute {
                format,
                attr: key.to_string(),
            });
        }
        _ => fallback(),
    };
    preset.extras.insert(key.to_string(), Value::Bool(value));
    Ok(value)
}
