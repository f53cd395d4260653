//! Texture upload pipeline.
//!
//! Turns staged tile payloads into renderer-owned textures. The
//! [`TextureBackend`] trait hides the rendering API; [`WgpuTextureBackend`]
//! is the production implementation and [`SoftwareTextureBackend`] serves
//! headless consumers and tests.

mod backend;
mod gpu;
mod software;
mod uploader;

pub use backend::{TextureBackend, TextureError, TextureHandle};
pub use gpu::{TileTexture, WgpuTextureBackend};
pub use software::{SoftwareTexture, SoftwareTextureBackend};
pub use uploader::process_pending;
