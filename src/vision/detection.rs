//! Geometric control detection
//!
//! Finds button-like regions from shape alone: edge detection, dilation to
//! close gaps, outer-contour extraction, then a size/aspect filter encoding
//! the prior that clickable controls are wider than tall and sit within
//! plausible pixel ranges. Icons, full-width banners and text lines are
//! rejected on purpose.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::dilate;
use imageproc::point::Point;
use imageproc::rect::Rect;
use tracing::debug;

/// Configuration for geometric control detection
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Canny low threshold
    pub canny_low: f32,
    /// Canny high threshold
    pub canny_high: f32,
    /// Dilation radius used to close broken edges
    pub dilate_radius: u8,
    /// Accepted width range, exclusive on both ends
    pub min_width: u32,
    pub max_width: u32,
    /// Accepted height range, exclusive on both ends
    pub min_height: u32,
    pub max_height: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            dilate_radius: 2,
            min_width: 40,
            max_width: 400,
            min_height: 20,
            max_height: 100,
        }
    }
}

impl DetectorConfig {
    /// Size/aspect filter for control-shaped regions
    fn accepts(&self, rect: &Rect) -> bool {
        rect.width() > self.min_width
            && rect.width() < self.max_width
            && rect.height() > self.min_height
            && rect.height() < self.max_height
            && rect.width() > rect.height()
    }
}

/// Detect control-shaped regions in a grayscale frame.
///
/// Pure function of the input; an empty result simply means nothing on the
/// screen looked like a control.
pub fn detect_control_regions(gray: &GrayImage, config: &DetectorConfig) -> Vec<Rect> {
    let edges = canny(gray, config.canny_low, config.canny_high);
    let closed = dilate(&edges, Norm::LInf, config.dilate_radius);

    let contours = find_contours::<i32>(&closed);
    let total = contours.len();

    let regions: Vec<Rect> = contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .filter_map(|c: Contour<i32>| bounding_rect(&c.points))
        .filter(|r| config.accepts(r))
        .collect();

    debug!(
        "control detection: {} contours, {} accepted regions",
        total,
        regions.len()
    );

    regions
}

/// Axis-aligned bounding rectangle of a contour
fn bounding_rect(points: &[Point<i32>]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let width = (max_x - min_x + 1) as u32;
    let height = (max_y - min_y + 1) as u32;
    Some(Rect::at(min_x, min_y).of_size(width, height))
}
