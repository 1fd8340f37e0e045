//! Comparison grid of 3D viewports
//!
//! This crate drives a grid of up to twelve viewports showing the reconstructions of
//! several SLAM frameworks side by side:
//! - Viewport pool built over the page containers
//! - Camera sync within each comparison row
//! - Background model loading with per-framework rendering policies
//! - Captions and the framework tab bar
//!
//! Drawing goes through the [`RenderSurface`] trait; [`HeadlessSurface`] records draw
//! statistics without a GPU.

pub mod camera;
pub mod config;
pub mod controls;
pub mod framework;
pub mod grid;
pub mod layout;
pub mod material;
pub mod pipeline;
pub mod scene;
pub mod surface;
pub mod sync;

pub use camera::*;
pub use config::*;
pub use controls::*;
pub use framework::*;
pub use grid::*;
pub use layout::*;
pub use material::*;
pub use pipeline::{AssetPipeline, LoadCompletion};
pub use scene::*;
pub use surface::*;
pub use sync::*;
