//! Software frame compositor.
//!
//! Rasterizes a [`MapFrame`] into an RGBA image using the software texture
//! backend's pixel buffers. This is a reference consumer of the engine's
//! draw list: the same (texture, screen position, size) sequence a GPU
//! renderer would turn into quads becomes plain blits here.

use image::RgbaImage;
use navcanvas::render::MapFrame;
use navcanvas::texture::SoftwareTextureBackend;

/// Route polyline color (light blue, matching the on-device style).
const ROUTE_COLOR: [u8; 4] = [51, 153, 255, 255];
/// Marker colors: white ring around a yellow disc.
const MARKER_RING: [u8; 4] = [255, 255, 255, 255];
const MARKER_FILL: [u8; 4] = [255, 215, 0, 255];
const MARKER_RADIUS: i32 = 12;
const MARKER_RING_WIDTH: i32 = 2;

/// Rasterize `frame` onto a `width`×`height` canvas.
///
/// Tiles with no entry in `backend` (already destroyed) are skipped.
pub fn composite_frame(
    frame: &MapFrame,
    backend: &SoftwareTextureBackend,
    width: u32,
    height: u32,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, image::Rgba([32, 32, 32, 255]));

    for draw in &frame.tiles {
        let Some(texture) = backend.texture(draw.texture) else {
            continue;
        };
        blit_scaled(
            &mut canvas,
            &texture.pixels,
            texture.width,
            texture.height,
            draw.screen_x,
            draw.screen_y,
            draw.size_px,
        );
    }

    for pair in frame.route.windows(2) {
        draw_line(&mut canvas, pair[0], pair[1], ROUTE_COLOR);
    }

    if let Some(marker) = &frame.marker {
        draw_disc(
            &mut canvas,
            marker.screen_x,
            marker.screen_y,
            MARKER_RADIUS,
            MARKER_RING,
        );
        draw_disc(
            &mut canvas,
            marker.screen_x,
            marker.screen_y,
            MARKER_RADIUS - MARKER_RING_WIDTH,
            MARKER_FILL,
        );
    }

    canvas
}

/// Blit an RGBA tile onto the canvas with nearest-neighbour scaling to
/// `size_px`, clipped to the canvas bounds.
fn blit_scaled(
    canvas: &mut RgbaImage,
    pixels: &[u8],
    src_width: u32,
    src_height: u32,
    origin_x: f32,
    origin_y: f32,
    size_px: f32,
) {
    let (canvas_width, canvas_height) = canvas.dimensions();
    let size = size_px.round() as i32;
    let base_x = origin_x.round() as i32;
    let base_y = origin_y.round() as i32;

    for dy in 0..size {
        let y = base_y + dy;
        if y < 0 || y >= canvas_height as i32 {
            continue;
        }
        let src_y = (dy as u32 * src_height / size as u32).min(src_height - 1);
        for dx in 0..size {
            let x = base_x + dx;
            if x < 0 || x >= canvas_width as i32 {
                continue;
            }
            let src_x = (dx as u32 * src_width / size as u32).min(src_width - 1);
            let offset = ((src_y * src_width + src_x) * 4) as usize;
            let pixel = image::Rgba([
                pixels[offset],
                pixels[offset + 1],
                pixels[offset + 2],
                pixels[offset + 3],
            ]);
            canvas.put_pixel(x as u32, y as u32, pixel);
        }
    }
}

/// Sample-based line segment, good enough for a preview polyline.
fn draw_line(canvas: &mut RgbaImage, from: (f32, f32), to: (f32, f32), color: [u8; 4]) {
    let (width, height) = canvas.dimensions();
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let steps = dx.abs().max(dy.abs()).ceil() as i32;
    if steps == 0 {
        return;
    }

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (from.0 + dx * t).round() as i32;
        let y = (from.1 + dy * t).round() as i32;
        if x >= 0 && (x as u32) < width && y >= 0 && (y as u32) < height {
            canvas.put_pixel(x as u32, y as u32, image::Rgba(color));
        }
    }
}

fn draw_disc(canvas: &mut RgbaImage, center_x: f32, center_y: f32, radius: i32, color: [u8; 4]) {
    let (width, height) = canvas.dimensions();
    let cx = center_x.round() as i32;
    let cy = center_y.round() as i32;

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let x = cx + dx;
            let y = cy + dy;
            if x >= 0 && (x as u32) < width && y >= 0 && (y as u32) < height {
                canvas.put_pixel(x as u32, y as u32, image::Rgba(color));
            }
        }
    }
}
