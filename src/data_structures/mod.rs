//! Engine data structures: models, textures, lights and the scene registry.
//!
//! - `model` contains mesh and material definitions and GPU resources
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-mesh world transform data
//! - `lights` is the fixed preview lighting rig
//! - `scene` is the mutable registry the render loop draws from

pub mod instance;
pub mod lights;
pub mod model;
pub mod scene;
pub mod texture;
