//! WebGPU rendering module
//!
//! The scene is a handful of axis-aligned quads, so geometry is built on the
//! CPU each frame and drawn with a single flat-color pipeline.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState};
pub use vertex::{Vertex, colors};
