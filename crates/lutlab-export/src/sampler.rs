//! Discretization of a color transform over a preset's domain.
//!
//! - [`sample_curve`] - 1D/2D: an achromatic ramp `f(x, x, x)` of
//!   `2^out_bitdepth` samples, optionally rebuilt from fewer samples with a
//!   monotone interpolant.
//! - [`sample_cube`] - 3D: a `cube_size^3` lattice enumerated blue
//!   outermost, green, red innermost.
//!
//! # Arithmetic
//!
//! With an integer input range, values are normalized as
//! `(x - low) / high` before calling the transform; float input values are
//! passed unchanged. Every output channel is rescaled as
//! `c * out.high + out.low`, then truncated toward zero when the preset
//! writes integer output.
//!
//! # Example
//!
//! ```rust
//! use lutlab_export::preset::{self, RawPreset};
//! use lutlab_export::sampler::sample_cube;
//!
//! let raw = RawPreset::new()
//!     .with(preset::TYPE, "3D")
//!     .with(preset::CUBE_SIZE, 2);
//! let preset = preset::complete_preset(&raw).unwrap();
//!
//! let cube = sample_cube(&|rgb| rgb, &preset).unwrap();
//! assert_eq!(cube[1].rgb, [1.0, 0.0, 0.0]);
//! ```

use rayon::prelude::*;
use tracing::trace;

use crate::interp::MonotoneCubic;
use crate::preset::{LutKind, Preset, Range};
use crate::{LutError, LutResult};

/// An RGB triplet. Not clamped; integral when the preset quantizes.
pub type Rgb = [f64; 3];

/// A color transform consumed by the pipeline.
pub type Transform<'a> = dyn Fn(Rgb) -> Rgb + Sync + 'a;

/// One cube lattice point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeSample {
    /// Lattice indices `[r, g, b]`, each in `0..cube_size`.
    pub index: [usize; 3],
    /// Output color.
    pub rgb: Rgb,
}

/// Samples a 1D/2D curve.
///
/// Returns `2^out_bitdepth` triplets in input order.
///
/// # Errors
///
/// [`LutError::DimensionMismatch`] for 3D presets.
pub fn sample_curve<F>(f: &F, preset: &Preset) -> LutResult<Vec<Rgb>>
where
    F: Fn(Rgb) -> Rgb + ?Sized,
{
    let bitdepth = match preset.kind {
        LutKind::OneD { bitdepth }
        | LutKind::TwoD { bitdepth }
        | LutKind::Default { bitdepth, .. } => bitdepth,
        LutKind::ThreeD { .. } => {
            return Err(LutError::DimensionMismatch {
                expected: "1D / 2D",
                found: preset.lut_type(),
            });
        }
    };
    let size = 1usize << bitdepth;
    let count = match preset.smooth {
        Some(smooth) if (smooth as usize) < size => smooth as usize,
        _ => size,
    };
    trace!(size, count, in_range = %preset.in_range, out_range = %preset.out_range, "sample_curve");

    let curve: Vec<Rgb> = preset
        .in_range
        .linspace(count)
        .into_iter()
        .map(|x| {
            let x = normalize(x, &preset.in_range);
            rescale(f([x, x, x]), preset)
        })
        .collect();

    if count == size {
        return Ok(curve);
    }
    Ok(smooth_curve(&curve, preset, size))
}

/// Samples a 3D cube.
///
/// Returns `cube_size^3` samples, blue outermost and red innermost: the
/// first two samples differ only in their red index. Lattice points are
/// evaluated in parallel; the output order does not depend on it.
///
/// # Errors
///
/// [`LutError::DimensionMismatch`] for 1D/2D presets.
pub fn sample_cube<F>(f: &F, preset: &Preset) -> LutResult<Vec<CubeSample>>
where
    F: Fn(Rgb) -> Rgb + Sync + ?Sized,
{
    let size = preset.cube_size().ok_or(LutError::DimensionMismatch {
        expected: "3D",
        found: preset.lut_type(),
    })?;
    trace!(size, in_range = %preset.in_range, out_range = %preset.out_range, "sample_cube");

    let coords: Vec<f64> = preset
        .in_range
        .linspace(size)
        .into_iter()
        .map(|v| normalize(v, &preset.in_range))
        .collect();

    let samples = (0..size * size * size)
        .into_par_iter()
        .map(|i| {
            let index = [i % size, (i / size) % size, i / (size * size)];
            let rgb = f([coords[index[0]], coords[index[1]], coords[index[2]]]);
            CubeSample {
                index,
                rgb: rescale(rgb, preset),
            }
        })
        .collect();
    Ok(samples)
}

fn normalize(value: f64, range: &Range) -> f64 {
    if range.is_int() {
        (value - range.low()) / range.high()
    } else {
        value
    }
}

fn rescale(rgb: Rgb, preset: &Preset) -> Rgb {
    let (low, high) = (preset.out_range.low(), preset.out_range.high());
    let quantize = preset.is_output_int();
    rgb.map(|c| {
        let v = c * high + low;
        if quantize { v.trunc() } else { v }
    })
}

/// Rebuilds a `size`-sample curve from the control points in `curve`.
fn smooth_curve(curve: &[Rgb], preset: &Preset, size: usize) -> Vec<Rgb> {
    let knots = preset.in_range.linspace(curve.len());
    let positions = preset.in_range.linspace(size);
    let quantize = preset.is_output_int();

    let channels: Vec<Option<MonotoneCubic>> = (0..3)
        .map(|c| {
            let values: Vec<f64> = curve.iter().map(|rgb| rgb[c]).collect();
            MonotoneCubic::new(&knots, &values)
        })
        .collect();

    positions
        .iter()
        .map(|&x| {
            let mut rgb = [0.0; 3];
            for (c, channel) in channels.iter().enumerate() {
                // A degenerate input range has no usable knots: hold the
                // first sample.
                let v = channel.as_ref().map_or(curve[0][c], |spline| spline.eval(x));
                rgb[c] = if quantize { v.trunc() } else { v };
            }
            rgb
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{self, RawPreset};
    use approx::assert_relative_eq;

    fn identity(rgb: Rgb) -> Rgb {
        rgb
    }

    fn curve_preset(bitdepth: u32, in_range: Range, out_range: Range) -> Preset {
        let raw = RawPreset::new()
            .with(preset::TYPE, "1D")
            .with(preset::OUT_BITDEPTH, bitdepth)
            .with_range(preset::IN_RANGE, in_range)
            .with_range(preset::OUT_RANGE, out_range);
        preset::complete_preset(&raw).unwrap()
    }

    fn cube_preset(size: u32) -> Preset {
        let raw = RawPreset::new()
            .with(preset::TYPE, "3D")
            .with(preset::CUBE_SIZE, size);
        preset::complete_preset(&raw).unwrap()
    }

    #[test]
    fn identity_ramp() {
        let preset = curve_preset(4, Range::float(0.0, 1.0), Range::float(0.0, 1.0));
        let curve = sample_curve(&identity, &preset).unwrap();
        assert_eq!(curve.len(), 16);
        for (i, rgb) in curve.iter().enumerate() {
            let expected = i as f64 / 15.0;
            for c in rgb {
                assert_relative_eq!(*c, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn curve_length_follows_bitdepth() {
        for bits in [1, 2, 8, 10] {
            let preset = curve_preset(bits, Range::float(0.0, 1.0), Range::float(0.0, 1.0));
            assert_eq!(sample_curve(&identity, &preset).unwrap().len(), 1 << bits);
        }
    }

    #[test]
    fn integer_ranges_normalize_and_truncate() {
        let preset = curve_preset(10, Range::int(0, 1023), Range::int(0, 1023));
        // The last input reaches the transform as (1023 - 0) / 1023.
        let half_at_top = |rgb: Rgb| rgb.map(|c| if c == 1.0 { 0.5 } else { 0.0 });
        let curve = sample_curve(&half_at_top, &preset).unwrap();
        assert_eq!(curve[1023], [511.0; 3]);

        let curve = sample_curve(&identity, &preset).unwrap();
        assert_eq!(curve[0], [0.0; 3]);
        assert_eq!(curve[1023], [1023.0; 3]);
        for rgb in &curve {
            assert_eq!(rgb[0], rgb[0].trunc());
        }
        // 0.6 * 1023 = 613.8 truncates to 613.
        let curve = sample_curve(&|_: Rgb| [0.6; 3], &preset).unwrap();
        assert_eq!(curve[5], [613.0; 3]);
    }

    #[test]
    fn forced_float_skips_truncation() {
        let mut preset = curve_preset(4, Range::int(0, 1023), Range::int(0, 1023));
        preset.is_float = true;
        let curve = sample_curve(&|_: Rgb| [0.6; 3], &preset).unwrap();
        assert_relative_eq!(curve[0][0], 613.8, epsilon = 1e-9);
    }

    #[test]
    fn output_rescale_uses_low_and_high() {
        let preset = curve_preset(2, Range::float(0.0, 1.0), Range::float(0.5, 2.0));
        let curve = sample_curve(&identity, &preset).unwrap();
        assert_relative_eq!(curve[0][0], 0.5);
        assert_relative_eq!(curve[3][0], 2.5);
    }

    #[test]
    fn cube_order_is_blue_major() {
        let cube = sample_cube(&identity, &cube_preset(2)).unwrap();
        let rgb: Vec<Rgb> = cube.iter().map(|s| s.rgb).collect();
        assert_eq!(
            rgb,
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
            ]
        );
        assert_eq!(cube[5].index, [1, 0, 1]);
    }

    #[test]
    fn cube_length_and_index_order() {
        let size = 5;
        let cube = sample_cube(&identity, &cube_preset(size)).unwrap();
        assert_eq!(cube.len(), 125);
        assert_eq!(cube[0].index, [0, 0, 0]);
        assert_eq!(cube[1].index, [1, 0, 0]);
        assert_eq!(cube[5].index, [0, 1, 0]);
        assert_eq!(cube[25].index, [0, 0, 1]);
    }

    #[test]
    fn dimension_mismatch() {
        let curve = curve_preset(4, Range::float(0.0, 1.0), Range::float(0.0, 1.0));
        assert!(matches!(
            sample_cube(&identity, &curve),
            Err(LutError::DimensionMismatch { expected: "3D", .. })
        ));
        assert!(matches!(
            sample_curve(&identity, &cube_preset(3)),
            Err(LutError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn default_kind_samples_both() {
        let preset = preset::complete_preset(&RawPreset::new()).unwrap();
        assert_eq!(sample_curve(&identity, &preset).unwrap().len(), 4096);
        assert_eq!(sample_cube(&identity, &preset).unwrap().len(), 17 * 17 * 17);
    }

    #[test]
    fn smoothing_keeps_size_and_monotonicity() {
        let mut preset = curve_preset(10, Range::float(0.0, 1.0), Range::float(0.0, 1.0));
        preset.smooth = Some(17);
        let gamma = |rgb: Rgb| rgb.map(|c| c.powf(1.0 / 2.4));
        let curve = sample_curve(&gamma, &preset).unwrap();
        assert_eq!(curve.len(), 1024);
        assert_relative_eq!(curve[0][0], 0.0);
        assert_relative_eq!(curve[1023][0], 1.0);
        for pair in curve.windows(2) {
            assert!(pair[1][0] >= pair[0][0]);
        }
        // Close to the dense curve.
        assert_relative_eq!(curve[512][0], gamma([512.0 / 1023.0; 3])[0], epsilon = 1e-2);
    }

    #[test]
    fn smoothing_with_integer_output() {
        let mut preset = curve_preset(10, Range::int(0, 1023), Range::int(0, 1023));
        preset.smooth = Some(33);
        let curve = sample_curve(&identity, &preset).unwrap();
        assert_eq!(curve.len(), 1024);
        for pair in curve.windows(2) {
            assert!(pair[1][0] >= pair[0][0]);
            assert_eq!(pair[1][0], pair[1][0].trunc());
        }
    }
}
