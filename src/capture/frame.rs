//! Frame data structures for captured screen content

use anyhow::{Context, Result};
use image::{GrayImage, Luma, RgbaImage};
use imageproc::rect::Rect;
use std::time::Instant;

/// A captured frame from the screen.
///
/// Frames are immutable once produced: downstream stages crop or convert
/// into new buffers rather than writing into this one.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl CapturedFrame {
    /// Create a new captured frame from raw RGBA data
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reinterpret the frame as an owned RGBA image
    pub fn to_rgba(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .context("frame buffer does not match its dimensions")
    }

    /// Convert the frame to grayscale using standard luma weights
    pub fn to_gray(&self) -> GrayImage {
        let mut gray = GrayImage::new(self.width, self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                let idx = ((y * self.width + x) * 4) as usize;
                if idx + 2 < self.data.len() {
                    let r = self.data[idx] as f32;
                    let g = self.data[idx + 1] as f32;
                    let b = self.data[idx + 2] as f32;
                    let luma = (0.299 * r + 0.587 * g + 0.114 * b) as u8;
                    gray.put_pixel(x, y, Luma([luma]));
                }
            }
        }

        gray
    }

    /// Copy a sub-region of the frame into a new frame.
    ///
    /// The region is clamped to the frame boundary, so the result may be
    /// smaller than requested (or empty when the region lies fully outside).
    pub fn crop(&self, bounds: Rect) -> CapturedFrame {
        let x = (bounds.left().max(0) as u32).min(self.width);
        let y = (bounds.top().max(0) as u32).min(self.height);
        let width = bounds.width().min(self.width - x);
        let height = bounds.height().min(self.height - y);

        let mut region = Vec::with_capacity((width * height * 4) as usize);
        for row in y..(y + height) {
            let start = ((row * self.width + x) * 4) as usize;
            let end = start + (width * 4) as usize;
            if end <= self.data.len() {
                region.extend_from_slice(&self.data[start..end]);
            }
        }

        CapturedFrame::new(region, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> CapturedFrame {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        CapturedFrame::new(data, width, height)
    }

    #[test]
    fn dimensions_roundtrip() {
        let frame = solid_frame(8, 4, [0, 0, 0, 255]);
        assert_eq!(frame.dimensions(), (8, 4));
        assert_eq!(frame.data.len(), 8 * 4 * 4);
    }

    #[test]
    fn crop_inside_bounds() {
        let frame = solid_frame(10, 10, [10, 20, 30, 255]);
        let crop = frame.crop(Rect::at(2, 3).of_size(4, 5));
        assert_eq!(crop.dimensions(), (4, 5));
        assert_eq!(crop.data.len(), 4 * 5 * 4);
        assert_eq!(&crop.data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn crop_clamps_to_frame_edge() {
        let frame = solid_frame(10, 10, [0, 0, 0, 255]);
        let crop = frame.crop(Rect::at(6, 8).of_size(20, 20));
        assert_eq!(crop.dimensions(), (4, 2));
    }

    #[test]
    fn grayscale_orders_channels_correctly() {
        // Green carries the largest luma weight, blue the smallest.
        let green = solid_frame(1, 1, [0, 255, 0, 255]);
        let blue = solid_frame(1, 1, [0, 0, 255, 255]);
        let g = green.to_gray().get_pixel(0, 0).0[0];
        let b = blue.to_gray().get_pixel(0, 0).0[0];
        assert!(g > b, "green ({g}) should be brighter than blue ({b})");
    }

    #[test]
    fn to_rgba_preserves_pixels() {
        let frame = solid_frame(3, 2, [1, 2, 3, 255]);
        let img = frame.to_rgba().unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [1, 2, 3, 255]);
    }
}
