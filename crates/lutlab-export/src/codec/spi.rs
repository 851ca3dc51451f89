//! Sony Pictures Imageworks .spi1d / .spi3d writers.
//!
//! # Format
//!
//! ## SPI1D
//! ```text
//! Version 1
//! From 0.0 1.0
//! Length 4096
//! Components 1
//! {
//! 		0.00000000
//! 		...
//! }
//! ```
//!
//! ## SPI3D
//! ```text
//! SPILUT 1.0
//! 3 3
//! 17 17 17
//! 0 0 0 0.00000000 0.00000000 0.00000000
//! 1 0 0 0.06250000 0.00000000 0.00000000
//! ...
//! ```
//!
//! Values are always written as floats with 8 decimals.

use std::io::Write;
use std::path::Path;

use super::{CurveLayout, ExportReport, LutCodec, export_cube, export_curve};
use crate::LutResult;
use crate::preset::{self, LutType, Preset, RawPreset};
use crate::sampler::{CubeSample, Rgb, Transform};

/// `.spi1d` / `.spi3d` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpiCodec;

impl LutCodec for SpiCodec {
    fn name(&self) -> &'static str {
        "spi"
    }

    fn default_preset(&self) -> RawPreset {
        preset::default_preset()
            .with(preset::EXT, ".spi1d")
            .with(preset::TITLE, "SPI LUT")
    }

    fn supports(&self, _lut_type: LutType) -> bool {
        true
    }

    fn extension(&self, lut_type: LutType) -> &'static str {
        match lut_type {
            LutType::ThreeD => ".spi3d",
            _ => ".spi1d",
        }
    }

    fn write_1d(&self, f: &Transform<'_>, path: &Path, raw: &RawPreset) -> LutResult<ExportReport> {
        export_curve(self, f, path, raw, CurveLayout::Shared, |w, curve, preset| {
            write_spi1d_to(w, curve, preset, CurveLayout::Shared)
        })
    }

    fn write_2d(&self, f: &Transform<'_>, path: &Path, raw: &RawPreset) -> LutResult<ExportReport> {
        export_curve(self, f, path, raw, CurveLayout::PerChannel, |w, curve, preset| {
            write_spi1d_to(w, curve, preset, CurveLayout::PerChannel)
        })
    }

    fn write_3d(&self, f: &Transform<'_>, path: &Path, raw: &RawPreset) -> LutResult<ExportReport> {
        export_cube(self, f, path, raw, |w, cube, preset| write_spi3d_to(w, cube, preset))
    }
}

/// Writes an SPI1D body. A shared curve has one component, a per-channel
/// curve three.
pub fn write_spi1d_to<W: Write>(
    w: &mut W,
    curve: &[Rgb],
    preset: &Preset,
    layout: CurveLayout,
) -> LutResult<()> {
    writeln!(w, "Version 1")?;
    writeln!(w, "From {} {}", preset.in_range.low, preset.in_range.high)?;
    writeln!(w, "Length {}", curve.len())?;
    match layout {
        CurveLayout::Shared => writeln!(w, "Components 1")?,
        CurveLayout::PerChannel => writeln!(w, "Components 3")?,
    }
    writeln!(w, "{{")?;
    for rgb in curve {
        match layout {
            CurveLayout::Shared => writeln!(w, "\t\t{:.8}", rgb[0])?,
            CurveLayout::PerChannel => {
                writeln!(w, "\t\t{:.8} {:.8} {:.8}", rgb[0], rgb[1], rgb[2])?
            }
        }
    }
    writeln!(w, "}}")?;
    Ok(())
}

/// Writes an SPI3D body, one `r g b R G B` line per lattice point.
pub fn write_spi3d_to<W: Write>(w: &mut W, cube: &[CubeSample], preset: &Preset) -> LutResult<()> {
    let size = preset.cube_size().unwrap_or(0);
    writeln!(w, "SPILUT 1.0")?;
    writeln!(w, "3 3")?;
    writeln!(w, "{} {} {}", size, size, size)?;
    for sample in cube {
        let [r, g, b] = sample.index;
        let rgb = sample.rgb;
        writeln!(w, "{} {} {} {:.8} {:.8} {:.8}", r, g, b, rgb[0], rgb[1], rgb[2])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::Range;
    use crate::sampler::{sample_cube, sample_curve};
    use tempfile::tempdir;

    #[test]
    fn spi1d_layout() {
        let raw = RawPreset::new()
            .with(preset::TYPE, "1D")
            .with(preset::OUT_BITDEPTH, 1)
            .with_range(preset::IN_RANGE, Range::float(-0.25, 1.25));
        let preset = SpiCodec.complete_preset(&raw).unwrap();
        let curve = sample_curve(&|rgb: Rgb| rgb, &preset).unwrap();

        let mut out = Vec::new();
        write_spi1d_to(&mut out, &curve, &preset, CurveLayout::Shared).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Version 1\nFrom -0.25 1.25\nLength 2\nComponents 1\n\
             {\n\t\t-0.25000000\n\t\t1.25000000\n}\n"
        );

        let mut out = Vec::new();
        write_spi1d_to(&mut out, &curve, &preset, CurveLayout::PerChannel).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Components 3\n"));
        assert!(text.contains("\t\t1.25000000 1.25000000 1.25000000\n"));
    }

    #[test]
    fn integer_output_is_still_float() {
        let raw = RawPreset::new()
            .with(preset::TYPE, "1D")
            .with(preset::OUT_BITDEPTH, 1)
            .with_range(preset::OUT_RANGE, Range::int(0, 1023));
        let preset = SpiCodec.complete_preset(&raw).unwrap();
        let curve = sample_curve(&|rgb: Rgb| rgb, &preset).unwrap();
        let mut out = Vec::new();
        write_spi1d_to(&mut out, &curve, &preset, CurveLayout::Shared).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\t\t1023.00000000\n"));
    }

    #[test]
    fn spi3d_keeps_indices() {
        let raw = RawPreset::new().with(preset::TYPE, "3D").with(preset::CUBE_SIZE, 2);
        let preset = SpiCodec.complete_preset(&raw).unwrap();
        let cube = sample_cube(&|rgb: Rgb| rgb, &preset).unwrap();

        let mut out = Vec::new();
        write_spi3d_to(&mut out, &cube, &preset).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(&lines[..3], &["SPILUT 1.0", "3 3", "2 2 2"]);
        assert_eq!(lines[4], "1 0 0 1.00000000 0.00000000 0.00000000");
        assert_eq!(lines[10], "1 1 1 1.00000000 1.00000000 1.00000000");
    }

    #[test]
    fn extension_follows_dimension() {
        let dir = tempdir().unwrap();
        let raw = RawPreset::new().with(preset::TYPE, "3D").with(preset::CUBE_SIZE, 3);
        let report = SpiCodec.write_3d(&|rgb| rgb, dir.path(), &raw).unwrap();
        assert_eq!(report.path, dir.path().join("SPI_LUT.spi3d"));

        let err = SpiCodec
            .write_3d(&|rgb| rgb, &dir.path().join("cube.spi1d"), &raw)
            .unwrap_err();
        assert!(matches!(err, crate::LutError::ExtensionMismatch { .. }));
    }
}
