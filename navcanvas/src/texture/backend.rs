//! Texture backend abstraction.
//!
//! A [`TextureBackend`] owns the renderer-side texture objects that tiles are
//! uploaded into. All GPU mutation in the crate flows through a `&mut` backend
//! reference: holding that reference is the capability token for "I am on the
//! thread that owns the rendering context". Code that only has a shared
//! [`crate::cache::TileCache`] handle cannot touch a texture.

use thiserror::Error;

/// Opaque identifier for a renderer-owned texture.
///
/// Handles are non-zero by construction; a tile with no texture holds
/// `None` rather than a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Wrap a raw backend id. Backends allocate ids starting at 1.
    pub(crate) fn from_raw(raw: u64) -> Self {
        debug_assert!(raw != 0, "texture handle 0 is reserved for 'absent'");
        Self(raw)
    }

    /// The raw id, for logging and display.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Errors that can occur while creating a texture.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Width or height is zero
    #[error("invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer length does not match width * height * 4
    #[error("pixel buffer length {actual} does not match {width}x{height} RGBA ({expected})")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Backend-specific failure (device lost, out of memory, ...)
    #[error("texture backend error: {0}")]
    Backend(String),
}

/// Renderer-side texture storage.
///
/// Pixel data at this boundary is always 4 bytes per pixel, RGBA byte order,
/// row-major, with no padding between rows (stride == width * 4).
pub trait TextureBackend {
    /// Create a texture and upload `pixels` into it.
    ///
    /// Returns a handle that stays valid until [`destroy_texture`] is called
    /// with it. Implementations must validate dimensions and buffer length
    /// before allocating anything.
    ///
    /// [`destroy_texture`]: TextureBackend::destroy_texture
    fn create_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, TextureError>;

    /// Release the texture behind `handle`.
    ///
    /// Destroying an unknown or already-destroyed handle is a no-op.
    fn destroy_texture(&mut self, handle: TextureHandle);
}

/// Validate the RGBA payload contract shared by all backends.
pub(crate) fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(TextureError::LengthMismatch {
            width,
            height,
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
