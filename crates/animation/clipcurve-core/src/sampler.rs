//! Pose sampling over a shared [`AnimationIndex`].
//!
//! Model:
//! - A sample query carries a time plus [`SampleOptions`] (path, axis selectors,
//!   position remapping).
//! - Times past the resolved stop time are out of range: the pose is empty and no
//!   lookup happens. Time reversal only changes the lookup time, never the range check.
//! - Each present track kind contributes one field to the [`Pose`].

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::IndexCache;
use crate::error::ClipError;
use crate::index::{AnimationIndex, Channel, PathEntry, TrackKind, GENERAL_PATH};
use crate::loader::DocumentLoader;
use crate::pose::Pose;
use crate::Result;

/// Component letter of a vector track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
    W,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::W => "w",
        }
    }
}

/// Per-query options. Field names on the wire match the player keyword arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleOptions {
    pub path: String,
    #[serde(rename = "timeReverse")]
    pub time_reverse: bool,
    /// Euler component to report; `w` is rejected.
    #[serde(rename = "Eunit")]
    pub euler_axis: Axis,
    #[serde(rename = "Runit")]
    pub rotation_axis: Axis,
    #[serde(rename = "Punit")]
    pub position_axes: (Axis, Axis),
    #[serde(rename = "Preverse")]
    pub position_reverse: (bool, bool),
    #[serde(rename = "Pratio")]
    pub position_ratio: (f64, f64),
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            path: GENERAL_PATH.to_string(),
            time_reverse: false,
            euler_axis: Axis::Z,
            rotation_axis: Axis::W,
            position_axes: (Axis::X, Axis::Y),
            position_reverse: (false, false),
            position_ratio: (1.0, 1.0),
        }
    }
}

impl SampleOptions {
    /// Defaults, targeting `path`.
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_time_reverse(mut self, reverse: bool) -> Self {
        self.time_reverse = reverse;
        self
    }

    pub fn with_euler_axis(mut self, axis: Axis) -> Self {
        self.euler_axis = axis;
        self
    }

    pub fn with_rotation_axis(mut self, axis: Axis) -> Self {
        self.rotation_axis = axis;
        self
    }

    pub fn with_position_axes(mut self, first: Axis, second: Axis) -> Self {
        self.position_axes = (first, second);
        self
    }

    pub fn with_position_reverse(mut self, first: bool, second: bool) -> Self {
        self.position_reverse = (first, second);
        self
    }

    pub fn with_position_ratio(mut self, first: f64, second: f64) -> Self {
        self.position_ratio = (first, second);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.euler_axis == Axis::W {
            return Err(ClipError::InvalidOption {
                option: "Eunit".to_string(),
                reason: "Euler tracks carry only x, y and z".to_string(),
            });
        }
        Ok(())
    }
}

/// Samples poses from one clip. Cheap to clone; the index is shared.
#[derive(Clone, Debug)]
pub struct Sampler {
    index: Arc<AnimationIndex>,
    stop_time: f64,
}

impl Sampler {
    /// Sampler over an already built index; `override_stop_time` replaces the
    /// index's resolved duration.
    pub fn new(index: Arc<AnimationIndex>, override_stop_time: Option<f64>) -> Self {
        let stop_time = override_stop_time.unwrap_or_else(|| index.stop_time());
        Self { index, stop_time }
    }

    /// Load (or reuse) the index for the clip at `path` through `cache`.
    pub fn open<L: DocumentLoader>(
        cache: &IndexCache<L>,
        path: impl AsRef<Path>,
        override_stop_time: Option<f64>,
    ) -> Result<Self> {
        let index = cache.get_or_build(path)?;
        Ok(Self::new(index, override_stop_time))
    }

    #[inline]
    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    #[inline]
    pub fn index(&self) -> &Arc<AnimationIndex> {
        &self.index
    }

    /// Sample the pose of `options.path` at `time`.
    ///
    /// Returns `(pose, in_range)`. When `time` exceeds the stop time the pose is
    /// empty and `in_range` is false; an unknown path is an error otherwise.
    pub fn sample(&self, time: f64, options: &SampleOptions) -> Result<(Pose, bool)> {
        if time > self.stop_time {
            return Ok((Pose::default(), false));
        }
        options.validate()?;

        let entry = self.index.require(&options.path)?;
        let t = if options.time_reverse {
            self.stop_time - time
        } else {
            time
        };
        let lookup = AxisLookup {
            path: &options.path,
            t,
        };

        let mut pose = Pose::default();
        if let Some(euler) = &entry.euler {
            pose.euler = Some(lookup.value(TrackKind::Euler, euler, options.euler_axis)?);
        }
        if let Some(rotation) = &entry.rotation {
            pose.rotation = Some(lookup.value(TrackKind::Rotation, rotation, options.rotation_axis)?);
        }
        if let Some(position) = &entry.position {
            let (a0, a1) = options.position_axes;
            let (r0, r1) = options.position_ratio;
            let (flip0, flip1) = options.position_reverse;
            let p0 = lookup.value(TrackKind::Position, position, a0)? * r0;
            let p1 = lookup.value(TrackKind::Position, position, a1)? * r1;
            pose.position = Some((negate_if(p0, flip0), negate_if(p1, flip1)));
        }
        if let Some(scale) = &entry.scale {
            pose.scale = Some((
                lookup.value(TrackKind::Scale, scale, Axis::X)?,
                lookup.value(TrackKind::Scale, scale, Axis::Y)?,
            ));
        }
        // Only a per-keyframe scalar Float curve is reported.
        if let Some(curve) = entry.float.as_ref().and_then(Channel::as_scalar) {
            pose.float = Some(curve.evaluate(t));
        }

        Ok((pose, true))
    }

    /// Pose with `default_value` in every field the path would populate, without
    /// any time lookup.
    pub fn default_pose(&self, default_value: f64, options: &SampleOptions) -> Result<Pose> {
        let entry = self.index.require(&options.path)?;
        Ok(default_pose_for(entry, default_value))
    }
}

fn default_pose_for(entry: &PathEntry, value: f64) -> Pose {
    Pose {
        euler: entry.euler.as_ref().map(|_| value),
        rotation: entry.rotation.as_ref().map(|_| value),
        position: entry.position.as_ref().map(|_| (value, value)),
        scale: entry.scale.as_ref().map(|_| (value, value)),
        float: entry.float.as_ref().map(|_| value),
    }
}

#[inline]
fn negate_if(value: f64, negate: bool) -> f64 {
    if negate {
        -value
    } else {
        value
    }
}

struct AxisLookup<'a> {
    path: &'a str,
    t: f64,
}

impl AxisLookup<'_> {
    fn value(&self, kind: TrackKind, channel: &Channel, axis: Axis) -> Result<f64> {
        match channel.axis(axis.as_str()) {
            Some(curve) => Ok(curve.evaluate(self.t)),
            // A block without keyframes has no components; treat it as an empty curve.
            None if channel.is_shapeless() => Ok(0.0),
            None => Err(ClipError::AxisNotFound {
                path: self.path.to_string(),
                kind: kind.name().to_string(),
                axis: axis.as_str().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_from_player_keywords() {
        let options: SampleOptions = serde_json::from_str(
            r#"{"path": "Body", "Eunit": "x", "Punit": ["x", "z"], "Preverse": [true, false]}"#,
        )
        .unwrap();
        assert_eq!(options.path, "Body");
        assert_eq!(options.euler_axis, Axis::X);
        assert_eq!(options.rotation_axis, Axis::W);
        assert_eq!(options.position_axes, (Axis::X, Axis::Z));
        assert_eq!(options.position_reverse, (true, false));
        assert_eq!(options.position_ratio, (1.0, 1.0));
        assert!(!options.time_reverse);
    }

    #[test]
    fn euler_w_is_rejected() {
        let options = SampleOptions::default().with_euler_axis(Axis::W);
        assert!(matches!(
            options.validate(),
            Err(ClipError::InvalidOption { .. })
        ));
        assert!(SampleOptions::default().validate().is_ok());
    }

    #[test]
    fn default_pose_mirrors_present_kinds() {
        let entry = PathEntry {
            rotation: Some(Channel::Vector(Default::default())),
            float: Some(Channel::Vector(Default::default())),
            ..PathEntry::default()
        };
        let pose = default_pose_for(&entry, 0.0);
        assert_eq!(pose.rotation, Some(0.0));
        assert_eq!(pose.float, Some(0.0));
        assert_eq!(pose.position, None);
        assert_eq!(pose.euler, None);
    }
}
