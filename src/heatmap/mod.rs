//! Muscle-group heatmap rendering.
//!
//! A [`WeightVector`] carries one integer per [`MuscleGroup`]. Each weight is
//! reduced to one of four intensity tiers by [`bucket`], and the matching
//! pre-rendered overlay is pasted onto a full-body base image at the group's
//! fixed origin.
//!
//! # Assets
//!
//! The asset directory must contain:
//!
//! - `전체.png` (the base image)
//! - `{group}{tier}.png` for every group key and tier `0..=3`
//!
//! for 53 files in total.

mod compositor;
mod groups;
mod weights;

pub use compositor::{
    bucket, decode_png, paste_masked, HeatmapCompositor, BASE_ASSET, BUCKET_COUNT,
};
pub use groups::MuscleGroup;
pub use weights::WeightVector;
