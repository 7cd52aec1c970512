//! tee-studio
//!
//! A small native 3D garment-preview demo. It loads a t-shirt and a logo
//! plane from GLB, two logo textures and an HDR environment map, exposes a
//! tint colour and a logo selector in a floating debug panel, and renders
//! the scene continuously until the window closes.
//!
//! High-level modules
//! - `app`: event loop, render loop and the studio configuration
//! - `bindings`: typed panel-to-material bindings
//! - `camera`: camera, projection and the (default-off) orbit controller
//! - `color`: sRGB hex tint parsing and linear conversion
//! - `context`: central GPU and window context
//! - `data_structures`: models, textures, lights and the scene registry
//! - `panel`: the egui debug panel
//! - `pipelines`: render pipeline definitions and shaders
//! - `resources`: async asset loading and completion events
//! - `viewport`: window sizing and the pixel-ratio clamp

pub mod app;
pub mod bindings;
pub mod camera;
pub mod color;
pub mod context;
pub mod data_structures;
pub mod panel;
pub mod pipelines;
pub mod resources;
pub mod viewport;

// Re-exports commonly used types for convenience in downstream code.
pub use app::{StudioConfig, run};
pub use bindings::{BindingState, Logo};
pub use color::Rgb;
