//! 2D pixel grid used for color textures, shadow maps and depth buffers
//!
//! One type covers them all: color consumers treat pixels as packed ARGB,
//! depth consumers as raw fixed-point scalars.

use std::path::Path;

use log::info;

use crate::color;

#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<i32>,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Read a pixel; out-of-bounds coordinates read as 0
    pub fn get_pixel(&self, x: i32, y: i32) -> i32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.pixels[y as usize * self.width + x as usize]
    }

    /// Write a pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, value: i32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = value;
    }

    pub fn fill(&mut self, value: i32) {
        self.pixels.fill(value);
    }

    pub fn pixels(&self) -> &[i32] {
        &self.pixels
    }

    /// Load a texture from an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;
        let texture = Self::from_image(img);
        info!(
            "loaded texture {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    /// Load a texture from raw image bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| format!("Failed to decode image: {}", e))?;
        Ok(Self::from_image(img))
    }

    fn from_image(img: image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba
            .pixels()
            .map(|p| color::pack_rgba(p[0] as i32, p[1] as i32, p[2] as i32, p[3] as i32))
            .collect();
        Self {
            width: width as usize,
            height: height as usize,
            pixels,
        }
    }

    /// Checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: i32, color2: i32) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut t = Texture::new(4, 4);
        t.set_pixel(2, 3, 42);
        assert_eq!(t.get_pixel(2, 3), 42);
    }

    #[test]
    fn test_out_of_bounds_is_silent() {
        let mut t = Texture::new(4, 4);
        t.set_pixel(-1, 0, 7);
        t.set_pixel(4, 4, 7);
        assert_eq!(t.get_pixel(-1, 0), 0);
        assert_eq!(t.get_pixel(100, 100), 0);
    }

    #[test]
    fn test_fill() {
        let mut t = Texture::new(2, 2);
        t.fill(i32::MAX);
        assert!(t.pixels().iter().all(|&p| p == i32::MAX));
    }

    #[test]
    fn test_checkerboard_alternates() {
        let t = Texture::checkerboard(8, 8, 1, 2);
        assert_eq!(t.get_pixel(0, 0), 1);
        assert_eq!(t.get_pixel(4, 0), 2);
        assert_eq!(t.get_pixel(4, 4), 1);
    }
}
