//! Core library for stitching page images into near-square composites.
//!
//! - Planner: orientation-driven arrangement strategies for 2 or 4 images, grid fallback otherwise
//! - Joiner: pads-never-resamples pair joins onto a white canvas
//! - Optimizer: deterministic downscale + PNG/JPEG encoding with size reporting
//! - Pipeline: `stitch` takes in-memory images and returns the composite, its
//!   provenance (source keys in spatial order), and encoded bytes
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use page_stitch_core::{OptimizationSpec, PageImage, stitch};
//! # fn main() -> anyhow::Result<()> {
//! let pages = vec![
//!     PageImage { key: "1.png".into(), image: ImageReader::open("1.png")?.decode()? },
//!     PageImage { key: "2.png".into(), image: ImageReader::open("2.png")?.decode()? },
//! ];
//! let out = stitch(pages, &OptimizationSpec::default())?;
//! println!("{}", out.stats.summary());
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod join;
pub mod model;
pub mod optimize;
pub mod pipeline;
pub mod plan;

pub use config::*;
pub use error::*;
pub use join::*;
pub use model::*;
pub use pipeline::*;
pub use plan::*;

/// Convenience prelude for common types and functions.
/// Importing `page_stitch_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        OptimizationSpec, OptimizationSpecBuilder, OutputFormat, PngCompression,
    };
    pub use crate::error::{Result, StitchError};
    pub use crate::join::{join_pair, joined_dimensions};
    pub use crate::model::{Axis, Composite, Orientation, PageImage, StitchStats};
    pub use crate::pipeline::{
        JobOutcome, StitchJob, stitch, stitch_batch, stitch_exact, stitch_to_path,
    };
    pub use crate::plan::{ArrangementPlan, JoinOp, NodeRef, Strategy, plan};
}
