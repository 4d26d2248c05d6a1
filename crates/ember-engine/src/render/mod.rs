//! GPU rendering.
//!
//! One fixed scene: a single clip-space triangle with a depth attachment and
//! a clear color that varies deterministically with the frame index. The
//! scene owns its GPU resources (pipeline, depth texture) and records one
//! render pass per frame.

mod triangle;

pub use triangle::TriangleScene;
