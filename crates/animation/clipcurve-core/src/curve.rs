//! Curve reconstruction from raw keyframe arrays.
//!
//! Model:
//! - A channel is a set of parallel arrays (time, value, slopes, weights, modes).
//! - Slopes are tokens: numbers, the `"Infinity"` / `"-Infinity"` markers, or
//!   numeric strings (`"NaN"` included).
//! - `weightedMode` selects, per keyframe, which slopes are scaled by their weight.
//! - Keyframes whose `tangentMode` is not linked start a new block; each adjacent
//!   keyframe pair in a block becomes one segment:
//!   - non-finite out-slope (left) or in-slope (right) -> constant hold of the left value
//!   - otherwise cubic Hermite, or linear when the interval is degenerate
//!
//! API:
//! - build_curve(&ChannelKeys) -> (Curve, max keyframe time)

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::ClipError;
use crate::Result;

/// Finite slopes are clamped to +/- this bound after weighting.
pub const SLOPE_LIMIT: f64 = 1e8;

const POSITIVE_INFINITY_TOKEN: &str = "Infinity";
const NEGATIVE_INFINITY_TOKEN: &str = "-Infinity";

/// A raw slope entry as it appears in the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slope {
    Number(f64),
    Token(String),
}

impl Slope {
    /// Resolve to a number: the infinity markers map to signed infinity, other
    /// strings must parse as a float. `"NaN"` resolves to NaN, which the builder
    /// treats like an infinity.
    pub fn resolve(&self) -> Result<f64> {
        match self {
            Slope::Number(n) => Ok(*n),
            Slope::Token(token) => match token.trim() {
                POSITIVE_INFINITY_TOKEN => Ok(f64::INFINITY),
                NEGATIVE_INFINITY_TOKEN => Ok(f64::NEG_INFINITY),
                other => other.parse::<f64>().map_err(|_| ClipError::InvalidSlope {
                    token: token.clone(),
                }),
            },
        }
    }
}

impl From<f64> for Slope {
    fn from(value: f64) -> Self {
        if value == f64::INFINITY {
            Slope::Token(POSITIVE_INFINITY_TOKEN.to_string())
        } else if value == f64::NEG_INFINITY {
            Slope::Token(NEGATIVE_INFINITY_TOKEN.to_string())
        } else {
            Slope::Number(value)
        }
    }
}

/// Per-keyframe tangent mode. Only the linked mode continues smoothly into
/// its neighbour; every other value is a block breakpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TangentMode(pub i64);

impl TangentMode {
    pub const LINKED: TangentMode = TangentMode(1);

    #[inline]
    pub fn is_breakpoint(self) -> bool {
        self != Self::LINKED
    }
}

/// Which slopes of a keyframe get multiplied by their paired weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightPolicy {
    pub scale_in: bool,
    pub scale_out: bool,
}

impl WeightPolicy {
    /// Policy for a `weightedMode` value; `None` means pass the slopes through untouched.
    pub const fn for_mode(mode: i64) -> Option<Self> {
        match mode {
            0 => Some(Self {
                scale_in: false,
                scale_out: false,
            }),
            1 => Some(Self {
                scale_in: true,
                scale_out: false,
            }),
            2 => Some(Self {
                scale_in: true,
                scale_out: true,
            }),
            3 => Some(Self {
                scale_in: false,
                scale_out: true,
            }),
            _ => None,
        }
    }

    /// Apply the policy to one keyframe's (in, out) slopes.
    ///
    /// The weight product approximates the origin format's weighted tangents;
    /// non-finite slopes are never scaled or clamped.
    pub fn apply(self, in_slope: f64, out_slope: f64, in_weight: f64, out_weight: f64) -> (f64, f64) {
        (
            weigh(in_slope, in_weight, self.scale_in),
            weigh(out_slope, out_weight, self.scale_out),
        )
    }
}

fn weigh(slope: f64, weight: f64, scale: bool) -> f64 {
    if !slope.is_finite() {
        return slope;
    }
    let scaled = if scale { slope * weight } else { slope };
    scaled.clamp(-SLOPE_LIMIT, SLOPE_LIMIT)
}

/// Slopes after weighting for one keyframe.
pub fn weighted_slopes(
    in_slope: f64,
    out_slope: f64,
    in_weight: f64,
    out_weight: f64,
    weighted_mode: i64,
) -> (f64, f64) {
    match WeightPolicy::for_mode(weighted_mode) {
        Some(policy) => policy.apply(in_slope, out_slope, in_weight, out_weight),
        None => (in_slope, out_slope),
    }
}

/// The function bound to a segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Interpolant {
    /// Cubic Hermite between (y0, m0) and (y1, m1).
    Hermite { y0: f64, y1: f64, m0: f64, m1: f64 },
    /// Step hold.
    Constant { value: f64 },
    /// Fallback used when the Hermite form cannot be built.
    Linear { y0: f64, y1: f64 },
}

/// One interpolation interval `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub interpolant: Interpolant,
}

impl Segment {
    /// Hermite segment; `None` when the interval is not strictly increasing and finite.
    pub fn hermite(start: f64, end: f64, y0: f64, y1: f64, m0: f64, m1: f64) -> Option<Self> {
        let valid = start.is_finite() && end.is_finite() && end > start && m0.is_finite() && m1.is_finite();
        valid.then_some(Self {
            start,
            end,
            interpolant: Interpolant::Hermite { y0, y1, m0, m1 },
        })
    }

    pub fn constant(start: f64, end: f64, value: f64) -> Self {
        Self {
            start,
            end,
            interpolant: Interpolant::Constant { value },
        }
    }

    pub fn linear(start: f64, end: f64, y0: f64, y1: f64) -> Self {
        Self {
            start,
            end,
            interpolant: Interpolant::Linear { y0, y1 },
        }
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Evaluate at `t`, clamped to the segment's own interval.
    pub fn evaluate(&self, t: f64) -> f64 {
        match self.interpolant {
            Interpolant::Constant { value } => value,
            Interpolant::Linear { y0, y1 } => {
                if t <= self.start {
                    y0
                } else if t >= self.end {
                    y1
                } else {
                    let s = (t - self.start) / (self.end - self.start);
                    y0 + (y1 - y0) * s
                }
            }
            Interpolant::Hermite { y0, y1, m0, m1 } => {
                if t <= self.start {
                    return y0;
                }
                if t >= self.end {
                    return y1;
                }
                let h = self.end - self.start;
                let s = (t - self.start) / h;
                let s2 = s * s;
                let s3 = s2 * s;

                let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
                let h10 = s3 - 2.0 * s2 + s;
                let h01 = -2.0 * s3 + 3.0 * s2;
                let h11 = s3 - s2;

                h00 * y0 + h10 * h * m0 + h01 * y1 + h11 * h * m1
            }
        }
    }
}

/// Ordered, gap-free sequence of segments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    segments: Vec<Segment>,
}

impl Curve {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Covered interval, `None` for an empty curve.
    pub fn span(&self) -> Option<(f64, f64)> {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => Some((first.start, last.end)),
            _ => None,
        }
    }

    /// Binary-search the segment containing `t` and evaluate it.
    ///
    /// Adjacent segments share their boundary time; the last segment starting
    /// at or before `t` wins, so a step lands on the new key exactly at its
    /// time. Times before the first segment evaluate that segment at its start,
    /// times after the last evaluate it at its end. An empty curve yields 0.
    pub fn evaluate(&self, t: f64) -> f64 {
        let Some(first) = self.segments.first() else {
            return 0.0;
        };

        match self.segments.partition_point(|segment| segment.start <= t) {
            0 => first.evaluate(first.start),
            n => {
                let segment = &self.segments[n - 1];
                segment.evaluate(t.min(segment.end))
            }
        }
    }
}

/// Parallel keyframe arrays for one scalar channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelKeys {
    pub time: Vec<f64>,
    pub value: Vec<f64>,
    pub in_slope: Vec<Slope>,
    pub out_slope: Vec<Slope>,
    pub in_weight: Vec<f64>,
    pub out_weight: Vec<f64>,
    pub tangent_mode: Vec<TangentMode>,
    pub weighted_mode: Vec<i64>,
}

impl ChannelKeys {
    #[inline]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Append one keyframe to every array.
    #[allow(clippy::too_many_arguments)]
    pub fn push(
        &mut self,
        time: f64,
        value: f64,
        in_slope: Slope,
        out_slope: Slope,
        in_weight: f64,
        out_weight: f64,
        tangent_mode: TangentMode,
        weighted_mode: i64,
    ) {
        self.time.push(time);
        self.value.push(value);
        self.in_slope.push(in_slope);
        self.out_slope.push(out_slope);
        self.in_weight.push(in_weight);
        self.out_weight.push(out_weight);
        self.tangent_mode.push(tangent_mode);
        self.weighted_mode.push(weighted_mode);
    }

    fn check_lengths(&self) -> Result<()> {
        let expected = self.time.len();
        let lengths = [
            ("value", self.value.len()),
            ("inSlope", self.in_slope.len()),
            ("outSlope", self.out_slope.len()),
            ("inWeight", self.in_weight.len()),
            ("outWeight", self.out_weight.len()),
            ("tangentMode", self.tangent_mode.len()),
            ("weightedMode", self.weighted_mode.len()),
        ];
        for (field, actual) in lengths {
            if actual != expected {
                return Err(ClipError::InconsistentKeyframes {
                    field: field.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Block boundaries: index 0, the last index, and every breakpoint.
    fn block_boundaries(&self) -> Vec<usize> {
        let n = self.len();
        let mut boundaries: BTreeSet<usize> = self
            .tangent_mode
            .iter()
            .enumerate()
            .filter(|(_, mode)| mode.is_breakpoint())
            .map(|(i, _)| i)
            .collect();
        boundaries.insert(0);
        boundaries.insert(n - 1);
        boundaries.into_iter().collect()
    }
}

/// Build the curve for one channel, returning it with the channel's largest
/// keyframe time (`None` when the channel has no keyframes).
///
/// Fewer than two keyframes produce an empty curve.
pub fn build_curve(keys: &ChannelKeys) -> Result<(Curve, Option<f64>)> {
    keys.check_lengths()?;

    let max_time = keys.time.iter().copied().fold(None, |acc: Option<f64>, t| {
        Some(acc.map_or(t, |m| m.max(t)))
    });

    let n = keys.len();
    if n < 2 {
        return Ok((Curve::empty(), max_time));
    }

    let mut in_slopes = Vec::with_capacity(n);
    let mut out_slopes = Vec::with_capacity(n);
    for i in 0..n {
        let raw_in = keys.in_slope[i].resolve()?;
        let raw_out = keys.out_slope[i].resolve()?;
        let mode = keys.weighted_mode[i];
        if WeightPolicy::for_mode(mode).is_none() {
            warn!("weightedMode {mode} at keyframe {i} is not recognized; slopes pass through");
        }
        let (in_slope, out_slope) =
            weighted_slopes(raw_in, raw_out, keys.in_weight[i], keys.out_weight[i], mode);
        in_slopes.push(in_slope);
        out_slopes.push(out_slope);
    }

    let mut segments = Vec::with_capacity(n - 1);
    for block in keys.block_boundaries().windows(2) {
        let (i0, i1) = (block[0], block[1]);
        for k in i0..i1 {
            segments.push(pair_segment(keys, &in_slopes, &out_slopes, k));
        }
    }

    Ok((Curve::from_segments(segments), max_time))
}

fn pair_segment(keys: &ChannelKeys, in_slopes: &[f64], out_slopes: &[f64], k: usize) -> Segment {
    let (x0, x1) = (keys.time[k], keys.time[k + 1]);
    let (y0, y1) = (keys.value[k], keys.value[k + 1]);
    let (m0, m1) = (out_slopes[k], in_slopes[k + 1]);

    // Any non-finite slope, either side, holds the left value.
    if !m0.is_finite() || !m1.is_finite() {
        return Segment::constant(x0, x1, y0);
    }

    Segment::hermite(x0, x1, y0, y1, m0, m1).unwrap_or_else(|| {
        debug!("degenerate interval [{x0}, {x1}] at keyframe {k}; using linear fallback");
        Segment::linear(x0, x1, y0, y1)
    })
}
