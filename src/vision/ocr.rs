//! OCR (Optical Character Recognition) module
//!
//! Wraps Tesseract for word-level recognition over full frames and
//! whole-region recognition over crops.

use anyhow::{anyhow, Result};
use image::DynamicImage;
use imageproc::rect::Rect;
use rusty_tesseract::Args;
use tracing::{debug, info};

use crate::capture::frame::CapturedFrame;

/// TSV hierarchy level for word records in tesseract output
const WORD_LEVEL: i32 = 5;

/// A single recognized word
#[derive(Debug, Clone)]
pub struct OcrWord {
    /// Recognized text
    pub text: String,
    /// Bounding box within the source frame
    pub bounds: Rect,
    /// Recognition confidence on a 0-100 scale
    pub confidence: f32,
}

/// Text recognition seam.
///
/// Word-level over a full frame, or a single text string over a cropped
/// region. Tests script both with a fake; production uses [`TesseractOcr`].
pub trait OcrEngine {
    /// Recognize individual words with bounding boxes and confidences.
    ///
    /// The full result set is drained before returning; words the engine
    /// cannot bound or reads as empty are skipped, not reported as errors.
    fn recognize_words(&self, frame: &CapturedFrame) -> Result<Vec<OcrWord>>;

    /// Recognize the whole region as one text string (trimmed, possibly empty)
    fn recognize_region(&self, frame: &CapturedFrame) -> Result<String>;
}

/// OCR engine configuration
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract language code, e.g. "eng"
    pub language: String,
    /// Page segmentation mode; None uses the tesseract default
    pub psm: Option<i32>,
    /// OCR engine mode; None uses the tesseract default
    pub oem: Option<i32>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            psm: None,
            oem: None,
        }
    }
}

/// Tesseract-backed OCR engine
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    /// Create the engine, verifying that a tesseract installation is usable.
    ///
    /// Failure here is fatal for the caller: without OCR the pipeline cannot
    /// label anything.
    pub fn new(config: OcrConfig) -> Result<Self> {
        let version = rusty_tesseract::get_tesseract_version()
            .map_err(|e| anyhow!("tesseract is not available: {e}"))?;
        info!(
            "tesseract ready (language '{}'): {}",
            config.language,
            version.lines().next().unwrap_or("").trim()
        );
        Ok(Self { config })
    }

    fn args(&self) -> Args {
        Args {
            lang: self.config.language.clone(),
            psm: self.config.psm,
            oem: self.config.oem,
            ..Args::default()
        }
    }

    fn ocr_image(frame: &CapturedFrame) -> Result<rusty_tesseract::Image> {
        let rgba = frame.to_rgba()?;
        rusty_tesseract::Image::from_dynamic_image(&DynamicImage::ImageRgba8(rgba))
            .map_err(|e| anyhow!("failed to prepare frame for OCR: {e}"))
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize_words(&self, frame: &CapturedFrame) -> Result<Vec<OcrWord>> {
        let image = Self::ocr_image(frame)?;
        let output = rusty_tesseract::image_to_data(&image, &self.args())
            .map_err(|e| anyhow!("word recognition failed: {e}"))?;

        let mut words = Vec::new();
        for record in output.data {
            if record.level != WORD_LEVEL || record.conf < 0.0 {
                continue;
            }
            let text = record.text.trim();
            if text.is_empty() || record.width <= 0 || record.height <= 0 {
                continue;
            }
            words.push(OcrWord {
                text: text.to_string(),
                bounds: Rect::at(record.left, record.top)
                    .of_size(record.width as u32, record.height as u32),
                confidence: record.conf,
            });
        }

        debug!("word OCR: {} words recognized", words.len());
        Ok(words)
    }

    fn recognize_region(&self, frame: &CapturedFrame) -> Result<String> {
        let image = Self::ocr_image(frame)?;
        let text = rusty_tesseract::image_to_string(&image, &self.args())
            .map_err(|e| anyhow!("region recognition failed: {e}"))?;
        Ok(text.trim().to_string())
    }
}
