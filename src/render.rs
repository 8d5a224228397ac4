//! Annotated screenshot rendering for the `show` command

use anyhow::Result;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::capture::frame::CapturedFrame;
use crate::vision::UiCandidate;

const BOX_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Draw each candidate's bounds onto a copy of the frame.
///
/// Boxes are drawn two pixels thick so they stay visible on busy content.
pub fn annotate(frame: &CapturedFrame, candidates: &[UiCandidate]) -> Result<RgbaImage> {
    let mut canvas = frame.to_rgba()?;

    for candidate in candidates {
        draw_hollow_rect_mut(&mut canvas, candidate.bounds, BOX_COLOR);
        if let Some(inner) = shrink(candidate.bounds) {
            draw_hollow_rect_mut(&mut canvas, inner, BOX_COLOR);
        }
    }

    Ok(canvas)
}

/// Rect inset by one pixel on every side, when it stays non-empty
fn shrink(rect: Rect) -> Option<Rect> {
    if rect.width() > 2 && rect.height() > 2 {
        Some(Rect::at(rect.left() + 1, rect.top() + 1).of_size(rect.width() - 2, rect.height() - 2))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::ElementKind;

    fn black_frame(width: u32, height: u32) -> CapturedFrame {
        CapturedFrame::new(vec![0; (width * height * 4) as usize], width, height)
    }

    #[test]
    fn annotate_draws_candidate_borders() {
        let frame = black_frame(40, 30);
        let candidates = vec![UiCandidate {
            bounds: Rect::at(5, 5).of_size(10, 8),
            text: "ok".to_string(),
            kind: ElementKind::Button,
            confidence: 0.7,
        }];

        let annotated = annotate(&frame, &candidates).unwrap();
        assert_eq!(annotated.dimensions(), (40, 30));
        assert_eq!(annotated.get_pixel(5, 5).0, [0, 255, 0, 255]);
        // Interior stays untouched.
        assert_eq!(annotated.get_pixel(10, 9).0, [0, 0, 0, 0]);
    }

    #[test]
    fn shrink_preserves_positive_area() {
        assert!(shrink(Rect::at(0, 0).of_size(3, 3)).is_some());
        assert!(shrink(Rect::at(0, 0).of_size(2, 5)).is_none());
    }
}
