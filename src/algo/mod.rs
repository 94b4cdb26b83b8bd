//! Mesh processing algorithms.
//!
//! - **Remeshing**: isotropic remeshing towards a uniform edge length band
//! - **Progress**: stage-level progress callbacks for long runs

pub mod progress;
pub mod remesh;

pub use progress::{Progress, ProgressEvent, RemeshStage};
