//! Vision Layer
//!
//! Turns a captured frame into a unified set of labeled candidates:
//! word-level OCR produces text candidates, geometric detection produces
//! button candidates, and each button is enriched with whatever text a
//! second OCR pass finds inside its bounds.

pub mod detection;
pub mod matcher;
pub mod ocr;

use anyhow::Result;
use imageproc::rect::Rect;
use std::time::Instant;
use tracing::{debug, warn};

use crate::capture::frame::CapturedFrame;
use detection::DetectorConfig;
use ocr::OcrEngine;

/// Nominal confidence assigned to geometry-only detections.
///
/// Shape-based hits are unverified by text corroboration, so they carry a
/// fixed value that keeps them below any well-recognized OCR word once the
/// scorer normalizes by 100.
pub const BUTTON_CONFIDENCE: f32 = 0.7;

/// Provenance of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Produced by word-level OCR
    Text,
    /// Produced by geometric control detection
    Button,
}

impl ElementKind {
    /// Lowercase label for operator-facing output
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Button => "button",
        }
    }
}

/// One detected, scorable region of the screen
#[derive(Debug, Clone)]
pub struct UiCandidate {
    /// Location within the source frame; always has positive area
    pub bounds: Rect,
    /// Recognized text, possibly empty
    pub text: String,
    /// Provenance tag
    pub kind: ElementKind,
    /// Confidence on a 0-100 scale for Text candidates; the fixed nominal
    /// value for Button candidates
    pub confidence: f32,
}

impl UiCandidate {
    /// Center point of the candidate's bounds
    pub fn center(&self) -> (i32, i32) {
        (
            self.bounds.left() + self.bounds.width() as i32 / 2,
            self.bounds.top() + self.bounds.height() as i32 / 2,
        )
    }
}

/// Merges textual and geometric detections into one candidate set
pub struct Synthesizer {
    ocr: Box<dyn OcrEngine>,
    detector: DetectorConfig,
}

impl Synthesizer {
    /// Create a synthesizer over the given OCR engine and detector settings
    pub fn new(ocr: Box<dyn OcrEngine>, detector: DetectorConfig) -> Self {
        Self { ocr, detector }
    }

    /// Analyze one frame into a candidate set.
    ///
    /// Order is stable for reproducibility: all Text candidates first, then
    /// all Button candidates, each in producer order. Zero-area candidates
    /// are never emitted.
    pub fn analyze(&self, frame: &CapturedFrame) -> Result<Vec<UiCandidate>> {
        let start = Instant::now();

        let mut candidates = self.text_candidates(frame)?;
        let text_count = candidates.len();

        let gray = frame.to_gray();
        let regions = detection::detect_control_regions(&gray, &self.detector);

        for bounds in regions {
            let crop = frame.crop(bounds);
            if crop.width == 0 || crop.height == 0 {
                continue;
            }

            // A crop that yields no text is still a candidate; a crop the
            // engine chokes on is tolerated the same way.
            let text = match self.ocr.recognize_region(&crop) {
                Ok(text) => text,
                Err(e) => {
                    warn!("region OCR failed, keeping unlabeled candidate: {e:#}");
                    String::new()
                }
            };

            candidates.push(UiCandidate {
                bounds,
                text,
                kind: ElementKind::Button,
                confidence: BUTTON_CONFIDENCE,
            });
        }

        debug!(
            "synthesized {} candidates ({} text, {} button) in {:?}",
            candidates.len(),
            text_count,
            candidates.len() - text_count,
            start.elapsed()
        );

        Ok(candidates)
    }

    /// Word-level OCR over the whole frame, one Text candidate per word
    fn text_candidates(&self, frame: &CapturedFrame) -> Result<Vec<UiCandidate>> {
        let words = self.ocr.recognize_words(frame)?;

        Ok(words
            .into_iter()
            .filter(|w| w.bounds.width() > 0 && w.bounds.height() > 0)
            .map(|w| UiCandidate {
                bounds: w.bounds,
                text: w.text,
                kind: ElementKind::Text,
                confidence: w.confidence,
            })
            .collect())
    }
}
