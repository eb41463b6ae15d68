//! Ember Core - renderer-agnostic data model for the Ember path tracer.
//!
//! This crate provides:
//!
//! - **Mesh ingestion types**: [`MeshData`], [`Face`], [`FaceVertex`] with
//!   construction-time index validation
//! - **Render output**: [`Raster`], the row-major color grid handed to
//!   downstream encoders
//! - **Configuration**: [`RenderSettings`], the explicit settings value
//!   threaded through mesh construction and rendering
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{MeshData, Face, RenderSettings};
//!
//! let mesh = MeshData::new(positions, vec![], vec![], faces)?;
//! let settings = RenderSettings::default();
//! ```

pub mod mesh;
pub mod raster;
pub mod settings;

// Re-export commonly used types
pub use mesh::{Face, FaceVertex, MeshData, MeshError};
pub use raster::{Color, Raster};
pub use settings::RenderSettings;
