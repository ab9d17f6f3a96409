//! Pose snapshot handed to renderers.

use serde::{Deserialize, Serialize};

/// Values sampled for one path. A field is present only when the path has the
/// corresponding track kind; absent fields are omitted when serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub euler: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float: Option<f64>,
}

impl Pose {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.euler.is_none()
            && self.rotation.is_none()
            && self.position.is_none()
            && self.scale.is_none()
            && self.float.is_none()
    }
}
