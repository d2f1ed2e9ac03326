use std::path::Path;

use image::{Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Get convex combination of two colors: t * c_1 + (1 - t) * c_2.
/// t is unrestricted; the cast truncates out-of-range channels.
pub fn blend(color_1: Rgb<u8>, color_2: Rgb<u8>, t: f32) -> Rgb<u8> {
    let mut channels = [0u8; 3];
    for i in 0..3 {
        channels[i] = (t * color_1.0[i] as f32 + (1.0 - t) * color_2.0[i] as f32) as u8;
    }
    return Rgb(channels);
}

/// Dense rgb8 color buffer with (0, 0) at the bottom left. The vertical flip
/// to the top-left-origin image convention happens exactly once, at export.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixel_data: Vec<u8>, // Flat array, 3 bytes per pixel.
}

impl Framebuffer {
    /// New all-black framebuffer of the given size.
    pub fn new(width: u32, height: u32) -> Framebuffer {
        let capacity = (3 * width * height) as usize;
        return Framebuffer {
            width,
            height,
            pixel_data: vec![0; capacity],
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    /// Sets all pixel data back to (0, 0, 0).
    pub fn clear(&mut self) {
        for elem in &mut self.pixel_data {
            *elem = 0;
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        let index = (3 * (x + y * self.width)) as usize;
        return Rgb([
            self.pixel_data[index],
            self.pixel_data[index + 1],
            self.pixel_data[index + 2],
        ]);
    }

    /// Sets the pixel at a coordinate. Callers are expected to stay in
    /// bounds; the rasterizer clamps its bounding box before getting here.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        let index = (3 * (x + y * self.width)) as usize;
        self.pixel_data[index] = color.0[0];
        self.pixel_data[index + 1] = color.0[1];
        self.pixel_data[index + 2] = color.0[2];
    }

    pub fn as_pixel_data(&self) -> &[u8] {
        return &self.pixel_data[..];
    }

    /// Copies out an image, flipping vertically so that row 0 of the file is
    /// the top of the picture.
    pub fn to_image(&self) -> RgbImage {
        return RgbImage::from_fn(self.width, self.height, |x, y| {
            self.get_pixel(x, self.height - 1 - y)
        });
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        return self.to_image().save(path);
    }
}

/// Per-pixel depth storage, same shape as the framebuffer it pairs with.
/// Larger values are nearer; untouched pixels stay at negative infinity.
#[derive(Clone)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> DepthBuffer {
        return DepthBuffer {
            width,
            height,
            data: vec![f32::NEG_INFINITY; (width * height) as usize],
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        return self.data[(x + y * self.width) as usize];
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.data[(x + y * self.width) as usize] = value;
    }

    pub fn as_values(&self) -> &[f32] {
        return &self.data[..];
    }

    /// Grayscale visualization of the buffer, normalized over the covered
    /// range. Pixels never written stay black.
    pub fn to_image(&self) -> RgbImage {
        let mut z_min = f32::MAX;
        let mut z_max = f32::MIN;
        for &z in &self.data {
            if z.is_finite() {
                z_min = z_min.min(z);
                z_max = z_max.max(z);
            }
        }
        let scale = if z_max > z_min { z_max - z_min } else { 1.0 };
        return RgbImage::from_fn(self.width, self.height, |x, y| {
            let z = self.get(x, self.height - 1 - y);
            if !z.is_finite() {
                return BLACK;
            }
            let level = (((z - z_min) / scale) * 255.0) as u8;
            return Rgb([level, level, level]);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(WHITE, BLACK, 1.0), WHITE);
        assert_eq!(blend(WHITE, BLACK, 0.0), BLACK);
        assert_eq!(blend(WHITE, BLACK, 0.5), Rgb([127, 127, 127]));
    }

    #[test]
    fn set_and_get_pixel() {
        let mut frame = Framebuffer::new(4, 4);
        frame.set_pixel(1, 2, Rgb([10, 20, 30]));
        assert_eq!(frame.get_pixel(1, 2), Rgb([10, 20, 30]));
        assert_eq!(frame.get_pixel(0, 0), BLACK);
        frame.clear();
        assert_eq!(frame.get_pixel(1, 2), BLACK);
    }

    #[test]
    fn export_flips_vertically() {
        let mut frame = Framebuffer::new(2, 2);
        // Bottom-left in the buffer is bottom-left of the picture, which is
        // the last row of the exported image.
        frame.set_pixel(0, 0, WHITE);
        let img = frame.to_image();
        assert_eq!(*img.get_pixel(0, 1), WHITE);
        assert_eq!(*img.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn depth_buffer_starts_at_negative_infinity() {
        let mut depth = DepthBuffer::new(2, 2);
        assert_eq!(depth.get(0, 0), f32::NEG_INFINITY);
        depth.set(0, 0, 12.5);
        assert_eq!(depth.get(0, 0), 12.5);
    }

    #[test]
    fn depth_visualization_normalizes() {
        let mut depth = DepthBuffer::new(2, 1);
        depth.set(0, 0, 10.0);
        depth.set(1, 0, 20.0);
        let img = depth.to_image();
        assert_eq!(*img.get_pixel(0, 0), BLACK);
        assert_eq!(*img.get_pixel(1, 0), WHITE);
    }
}
