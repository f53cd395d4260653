//! wgpu texture backend.
//!
//! Production [`TextureBackend`] over an injected `wgpu::Device` and
//! `wgpu::Queue`. The device and queue are created by the host's rendering
//! setup (surface/swapchain code is outside this crate); this backend only
//! creates, fills, and destroys tile textures.

use std::collections::HashMap;

use super::backend::{validate_rgba, TextureBackend, TextureError, TextureHandle};

/// A tile texture and its sampleable view.
#[derive(Debug)]
pub struct TileTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// [`TextureBackend`] implementation backed by a wgpu device.
#[derive(Debug)]
pub struct WgpuTextureBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: HashMap<TextureHandle, TileTexture>,
    next_id: u64,
}

impl WgpuTextureBackend {
    /// Create a backend over an existing device and queue.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: HashMap::new(),
            next_id: 0,
        }
    }

    /// Texture view for binding during tile draws.
    pub fn texture_view(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.textures.get(&handle).map(|t| &t.view)
    }

    /// Number of tile textures currently alive on the device.
    pub fn live_count(&self) -> usize {
        self.textures.len()
    }
}

impl TextureBackend for WgpuTextureBackend {
    fn create_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, TextureError> {
        validate_rgba(pixels, width, height)?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("map-tile"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.next_id += 1;
        let handle = TextureHandle::from_raw(self.next_id);
        self.textures.insert(handle, TileTexture { texture, view });

        Ok(handle)
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        if let Some(tile) = self.textures.remove(&handle) {
            tile.texture.destroy();
        }
    }
}
