//! Per-document index of curves, grouped by target path and track kind.

use hashbrown::HashMap;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::curve::{build_curve, Curve};
use crate::document::{ChannelData, RawCurveBlock, RawDocument};
use crate::error::ClipError;
use crate::Result;

/// Path given to curve blocks without a label.
pub const GENERAL_PATH: &str = "general";

/// Track kinds, in the order their groups are read from the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Rotation,
    CompressedRotation,
    Euler,
    Position,
    Scale,
    Float,
}

impl TrackKind {
    pub const ALL: [TrackKind; 6] = [
        TrackKind::Rotation,
        TrackKind::CompressedRotation,
        TrackKind::Euler,
        TrackKind::Position,
        TrackKind::Scale,
        TrackKind::Float,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rotation => "Rotation",
            Self::CompressedRotation => "CompressedRotation",
            Self::Euler => "Euler",
            Self::Position => "Position",
            Self::Scale => "Scale",
            Self::Float => "Float",
        }
    }

    /// Document key of the group holding this kind's curve blocks.
    pub fn group_key(&self) -> &'static str {
        match self {
            Self::Rotation => "m_RotationCurves",
            Self::CompressedRotation => "m_CompressedRotationCurves",
            Self::Euler => "m_EulerCurves",
            Self::Position => "m_PositionCurves",
            Self::Scale => "m_ScaleCurves",
            Self::Float => "m_FloatCurves",
        }
    }

    /// Every kind except `Float` is a vector over components.
    #[inline]
    pub fn is_vector(&self) -> bool {
        !matches!(self, Self::Float)
    }
}

/// A track's curves: one for a scalar channel, one per axis letter otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum Channel {
    Scalar(Curve),
    Vector(HashMap<String, Curve>),
}

impl Channel {
    /// Curve for an axis letter of a vector channel.
    pub fn axis(&self, axis: &str) -> Option<&Curve> {
        match self {
            Channel::Vector(curves) => curves.get(axis),
            Channel::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Curve> {
        match self {
            Channel::Scalar(curve) => Some(curve),
            Channel::Vector(_) => None,
        }
    }

    /// True for a vector channel built from a block without keyframes.
    pub fn is_shapeless(&self) -> bool {
        matches!(self, Channel::Vector(curves) if curves.is_empty())
    }
}

/// All tracks bound to one target path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathEntry {
    pub rotation: Option<Channel>,
    pub compressed_rotation: Option<Channel>,
    pub euler: Option<Channel>,
    pub position: Option<Channel>,
    pub scale: Option<Channel>,
    pub float: Option<Channel>,
}

impl PathEntry {
    pub fn get(&self, kind: TrackKind) -> Option<&Channel> {
        self.slot(kind).as_ref()
    }

    #[inline]
    pub fn contains(&self, kind: TrackKind) -> bool {
        self.get(kind).is_some()
    }

    /// Kinds present on this path, in group order.
    pub fn kinds(&self) -> Vec<TrackKind> {
        TrackKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    fn slot(&self, kind: TrackKind) -> &Option<Channel> {
        match kind {
            TrackKind::Rotation => &self.rotation,
            TrackKind::CompressedRotation => &self.compressed_rotation,
            TrackKind::Euler => &self.euler,
            TrackKind::Position => &self.position,
            TrackKind::Scale => &self.scale,
            TrackKind::Float => &self.float,
        }
    }

    fn slot_mut(&mut self, kind: TrackKind) -> &mut Option<Channel> {
        match kind {
            TrackKind::Rotation => &mut self.rotation,
            TrackKind::CompressedRotation => &mut self.compressed_rotation,
            TrackKind::Euler => &mut self.euler,
            TrackKind::Position => &mut self.position,
            TrackKind::Scale => &mut self.scale,
            TrackKind::Float => &mut self.float,
        }
    }
}

/// `m_StopTime` as declared by the document.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DeclaredStopTime {
    /// The integer `1`: derive the duration from the keyframes.
    Derived,
    Fixed(f64),
}

impl DeclaredStopTime {
    /// Only the integer literal `1` is the sentinel; `1.0` is a real duration.
    pub fn from_number(number: &serde_json::Number) -> Result<Self> {
        if number.as_u64() == Some(1) {
            return Ok(Self::Derived);
        }
        number
            .as_f64()
            .map(Self::Fixed)
            .ok_or_else(|| ClipError::schema(format!("m_StopTime is not a number: {number}")))
    }
}

/// Immutable curve index for one clip document.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationIndex {
    paths: IndexMap<String, PathEntry>,
    declared_stop_time: DeclaredStopTime,
    max_keyframe_time: f64,
    stop_time: f64,
}

impl AnimationIndex {
    /// Build the index from a parsed clip document.
    pub fn from_document(document: &serde_json::Value) -> Result<Self> {
        let raw = RawDocument::from_value(document)?;
        let clip = raw.clip;
        let declared_stop_time = DeclaredStopTime::from_number(&clip.settings.stop_time)?;

        let groups: [(TrackKind, &[RawCurveBlock]); 6] = [
            (TrackKind::Rotation, clip.rotation.as_slice()),
            (TrackKind::CompressedRotation, clip.compressed_rotation.as_slice()),
            (TrackKind::Euler, clip.euler.as_slice()),
            (TrackKind::Position, clip.position.as_slice()),
            (TrackKind::Scale, clip.scale.as_slice()),
            (TrackKind::Float, clip.float.as_slice()),
        ];

        let mut paths: IndexMap<String, PathEntry> = IndexMap::new();
        let mut max_keyframe_time: Option<f64> = None;

        for (kind, blocks) in groups {
            debug!("{}: {} curve blocks", kind.group_key(), blocks.len());
            // Synthetic names restart per group so unlabeled blocks of
            // different kinds share one "general" entry.
            let mut unlabeled = 0usize;
            for block in blocks {
                let path = block.label().unwrap_or_else(|| {
                    let name = general_name(unlabeled);
                    unlabeled += 1;
                    name
                });

                let (channel, block_max) = build_channel(kind, block)?;
                if let Some(t) = block_max {
                    max_keyframe_time = Some(max_keyframe_time.map_or(t, |m| m.max(t)));
                }
                *paths.entry(path).or_default().slot_mut(kind) = Some(channel);
            }
        }

        let max_keyframe_time = max_keyframe_time.unwrap_or(0.0);
        let stop_time = match declared_stop_time {
            DeclaredStopTime::Derived => {
                debug!("m_StopTime is the derive sentinel; using max keyframe time {max_keyframe_time}");
                max_keyframe_time
            }
            DeclaredStopTime::Fixed(t) => t,
        };

        Ok(Self {
            paths,
            declared_stop_time,
            max_keyframe_time,
            stop_time,
        })
    }

    /// Resolved clip duration.
    #[inline]
    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    #[inline]
    pub fn declared_stop_time(&self) -> DeclaredStopTime {
        self.declared_stop_time
    }

    /// Largest keyframe time across every processed curve (0 without keyframes).
    #[inline]
    pub fn max_keyframe_time(&self) -> f64 {
        self.max_keyframe_time
    }

    /// Paths in first-seen order.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.paths.keys().map(String::as_str)
    }

    pub fn entry(&self, path: &str) -> Option<&PathEntry> {
        self.paths.get(path)
    }

    /// Entry for a path, or `PathNotFound`.
    pub fn require(&self, path: &str) -> Result<&PathEntry> {
        self.entry(path).ok_or_else(|| ClipError::PathNotFound {
            path: path.to_string(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn general_name(n: usize) -> String {
    if n == 0 {
        GENERAL_PATH.to_string()
    } else {
        format!("{GENERAL_PATH}({n})")
    }
}

fn build_channel(kind: TrackKind, block: &RawCurveBlock) -> Result<(Channel, Option<f64>)> {
    match block.curve.channel_data(kind.is_vector())? {
        ChannelData::Scalar(keys) => {
            let (curve, max_time) = build_curve(&keys)?;
            Ok((Channel::Scalar(curve), max_time))
        }
        ChannelData::Vector(components) => {
            let mut curves = HashMap::with_capacity(components.len());
            let mut max_time: Option<f64> = None;
            for (axis, keys) in components {
                let (curve, component_max) = build_curve(&keys)?;
                if let Some(t) = component_max {
                    max_time = Some(max_time.map_or(t, |m| m.max(t)));
                }
                curves.insert(axis, curve);
            }
            Ok((Channel::Vector(curves), max_time))
        }
    }
}
