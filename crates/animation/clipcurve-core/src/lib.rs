//! clipcurve core (renderer-agnostic)
//!
//! Decodes serialized animation clips into piecewise curves and samples them
//! into pose snapshots.
//!
//! Pipeline: [`DocumentLoader`] -> [`AnimationIndex`] (one [`Curve`] per channel,
//! built by [`build_curve`]) -> [`Sampler`]. Indexes are immutable and shared
//! through `Arc`; [`IndexCache`] memoizes them by document content.

pub mod cache;
pub mod config;
pub mod curve;
mod document;
pub mod error;
pub mod index;
pub mod loader;
pub mod pose;
pub mod sampler;

// Re-exports for consumers (renderers, tools)
pub use cache::IndexCache;
pub use config::Config;
pub use curve::{
    build_curve, weighted_slopes, ChannelKeys, Curve, Interpolant, Segment, Slope, TangentMode,
    WeightPolicy, SLOPE_LIMIT,
};
pub use error::ClipError;
pub use index::{AnimationIndex, Channel, DeclaredStopTime, PathEntry, TrackKind, GENERAL_PATH};
pub use loader::{ContentKey, DocumentLoader, JsonFileLoader, LoadedDocument};
pub use pose::Pose;
pub use sampler::{Axis, SampleOptions, Sampler};

/// Crate result type
pub type Result<T> = core::result::Result<T, ClipError>;
