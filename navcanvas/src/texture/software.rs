//! CPU-side texture backend.
//!
//! Stores uploaded tiles as plain pixel buffers. Used by headless consumers
//! (the CLI snapshot compositor) and by tests, where its create/destroy
//! counters double as the GPU resource leak detector.

use std::collections::HashMap;

use super::backend::{validate_rgba, TextureBackend, TextureError, TextureHandle};

/// A texture held by the software backend.
#[derive(Debug, Clone)]
pub struct SoftwareTexture {
    /// RGBA pixels, row-major, stride == width * 4
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// In-memory [`TextureBackend`] implementation.
#[derive(Debug, Default)]
pub struct SoftwareTextureBackend {
    textures: HashMap<TextureHandle, SoftwareTexture>,
    next_id: u64,
    created: u64,
    destroyed: u64,
}

impl SoftwareTextureBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an uploaded texture.
    pub fn texture(&self, handle: TextureHandle) -> Option<&SoftwareTexture> {
        self.textures.get(&handle)
    }

    /// Number of textures currently alive.
    pub fn live_count(&self) -> usize {
        self.textures.len()
    }

    /// Total textures created since construction.
    pub fn created_count(&self) -> u64 {
        self.created
    }

    /// Total textures destroyed since construction.
    ///
    /// Each successfully destroyed handle counts exactly once; repeated
    /// destruction of the same handle does not inflate the counter.
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}

impl TextureBackend for SoftwareTextureBackend {
    fn create_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, TextureError> {
        validate_rgba(pixels, width, height)?;

        self.next_id += 1;
        let handle = TextureHandle::from_raw(self.next_id);
        self.textures.insert(
            handle,
            SoftwareTexture {
                pixels: pixels.to_vec(),
                width,
                height,
            },
        );
        self.created += 1;

        Ok(handle)
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }
}
