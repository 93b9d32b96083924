//! chartpkg
//! ========
//!
//! Distribute Helm charts through OCI registries. A chart is pushed as an
//! artifact of two layers, chart metadata and chart content, and pulled back
//! by reassembling them; see [artifact] for the convention.

pub mod artifact;
pub mod chart;
pub mod distribution;
pub mod error;
pub mod media_types;

mod digest;
mod image_name;
mod store;

pub use digest::Digest;
pub use image_name::ImageName;
pub use store::MemoryStore;
