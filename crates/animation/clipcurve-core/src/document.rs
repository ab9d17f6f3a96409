//! Serde schema for the subset of the clip document the decoder consumes.
//!
//! Notes:
//! - The clip lives under the top-level `AnimationClip` key.
//! - Keyframe fields are either scalars or per-component maps (`{x, y, z[, w]}`);
//!   the shape of the first keyframe's `value` decides the channel kind once.
//! - Slopes may be the string markers `"Infinity"` / `"-Infinity"`.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::curve::{ChannelKeys, Slope, TangentMode};
use crate::error::ClipError;
use crate::Result;

#[derive(Debug, Deserialize)]
pub(crate) struct RawDocument {
    #[serde(rename = "AnimationClip")]
    pub clip: RawClip,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawClip {
    #[serde(rename = "m_AnimationClipSettings")]
    pub settings: RawSettings,
    #[serde(rename = "m_RotationCurves")]
    pub rotation: Vec<RawCurveBlock>,
    #[serde(rename = "m_CompressedRotationCurves")]
    pub compressed_rotation: Vec<RawCurveBlock>,
    #[serde(rename = "m_EulerCurves")]
    pub euler: Vec<RawCurveBlock>,
    #[serde(rename = "m_PositionCurves")]
    pub position: Vec<RawCurveBlock>,
    #[serde(rename = "m_ScaleCurves")]
    pub scale: Vec<RawCurveBlock>,
    #[serde(rename = "m_FloatCurves", default)]
    pub float: Vec<RawCurveBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSettings {
    #[serde(rename = "m_StopTime")]
    pub stop_time: serde_json::Number,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCurveBlock {
    #[serde(default)]
    pub path: Option<RawPath>,
    pub curve: RawCurve,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawPath {
    Text(String),
    Number(serde_json::Number),
}

impl RawCurveBlock {
    /// Explicit path label; `None` for absent, null or empty labels.
    pub fn label(&self) -> Option<String> {
        match &self.path {
            None => None,
            Some(RawPath::Text(text)) if text.is_empty() => None,
            Some(RawPath::Text(text)) => Some(text.clone()),
            Some(RawPath::Number(n)) => Some(n.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCurve {
    #[serde(rename = "m_Curve")]
    pub keys: Vec<RawKeyframe>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Component<T> {
    Scalar(T),
    Vector(IndexMap<String, T>),
}

impl<T: Clone> Component<T> {
    fn scalar(&self, field: &str, index: usize) -> Result<T> {
        match self {
            Component::Scalar(v) => Ok(v.clone()),
            Component::Vector(_) => Err(ClipError::schema(format!(
                "keyframe {index}: `{field}` is a component map in a scalar channel"
            ))),
        }
    }

    fn axis(&self, field: &str, axis: &str, index: usize) -> Result<T> {
        match self {
            Component::Vector(map) => map.get(axis).cloned().ok_or_else(|| {
                ClipError::schema(format!(
                    "keyframe {index}: `{field}` has no `{axis}` component"
                ))
            }),
            Component::Scalar(_) => Err(ClipError::schema(format!(
                "keyframe {index}: `{field}` is a scalar in a vector channel"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawKeyframe {
    pub time: f64,
    pub value: Component<f64>,
    #[serde(rename = "inSlope")]
    pub in_slope: Component<Slope>,
    #[serde(rename = "outSlope")]
    pub out_slope: Component<Slope>,
    #[serde(rename = "inWeight")]
    pub in_weight: Component<f64>,
    #[serde(rename = "outWeight")]
    pub out_weight: Component<f64>,
    #[serde(rename = "tangentMode")]
    pub tangent_mode: f64,
    #[serde(rename = "weightedMode")]
    pub weighted_mode: f64,
}

/// Keyframe arrays of one curve block, classified once by shape.
#[derive(Debug)]
pub(crate) enum ChannelData {
    Scalar(ChannelKeys),
    Vector(Vec<(String, ChannelKeys)>),
}

impl RawCurve {
    /// Split the keyframe list into parallel arrays.
    ///
    /// An empty list has no shape of its own and takes `empty_as_vector`.
    pub fn channel_data(&self, empty_as_vector: bool) -> Result<ChannelData> {
        let Some(first) = self.keys.first() else {
            return Ok(if empty_as_vector {
                ChannelData::Vector(Vec::new())
            } else {
                ChannelData::Scalar(ChannelKeys::default())
            });
        };

        match &first.value {
            Component::Scalar(_) => {
                let mut keys = ChannelKeys::default();
                for (i, k) in self.keys.iter().enumerate() {
                    keys.push(
                        k.time,
                        k.value.scalar("value", i)?,
                        k.in_slope.scalar("inSlope", i)?,
                        k.out_slope.scalar("outSlope", i)?,
                        k.in_weight.scalar("inWeight", i)?,
                        k.out_weight.scalar("outWeight", i)?,
                        TangentMode(k.tangent_mode as i64),
                        k.weighted_mode as i64,
                    );
                }
                Ok(ChannelData::Scalar(keys))
            }
            Component::Vector(axes) => {
                let mut channels = Vec::with_capacity(axes.len());
                for axis in axes.keys() {
                    let mut keys = ChannelKeys::default();
                    for (i, k) in self.keys.iter().enumerate() {
                        keys.push(
                            k.time,
                            k.value.axis("value", axis, i)?,
                            k.in_slope.axis("inSlope", axis, i)?,
                            k.out_slope.axis("outSlope", axis, i)?,
                            k.in_weight.axis("inWeight", axis, i)?,
                            k.out_weight.axis("outWeight", axis, i)?,
                            TangentMode(k.tangent_mode as i64),
                            k.weighted_mode as i64,
                        );
                    }
                    channels.push((axis.clone(), keys));
                }
                Ok(ChannelData::Vector(channels))
            }
        }
    }
}

impl RawDocument {
    /// Interpret a parsed document; shape mismatches become schema errors.
    pub fn from_value(document: &serde_json::Value) -> Result<Self> {
        RawDocument::deserialize(document).map_err(|e| ClipError::schema(e.to_string()))
    }
}
