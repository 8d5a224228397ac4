//! Automation Controller
//!
//! Orchestrates the capture -> synthesize -> score -> act cycle. Every
//! public operation re-observes the live screen: the candidate set and last
//! frame are replaced wholesale each cycle, never merged across cycles.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::capture::frame::CapturedFrame;
use crate::capture::ScreenSource;
use crate::input::{PointerButton, PointerDriver};
use crate::render;
use crate::vision::{matcher, Synthesizer, UiCandidate};

/// Outcome of a query-driven pointer operation.
///
/// `NoMatch` is a soft outcome reported to the operator, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The pointer acted on a matched candidate
    Matched {
        /// Text of the winning candidate
        text: String,
        /// Screen point the pointer was sent to
        x: i32,
        y: i32,
    },
    /// No candidate cleared the match threshold; the pointer did not move
    NoMatch,
}

/// Drives pointer actions from visual analysis of the screen
pub struct AutomationController {
    screen: Box<dyn ScreenSource>,
    pointer: Box<dyn PointerDriver>,
    synthesizer: Synthesizer,
    last_frame: Option<CapturedFrame>,
    candidates: Vec<UiCandidate>,
}

impl AutomationController {
    /// Create a controller over the given collaborators
    pub fn new(
        screen: Box<dyn ScreenSource>,
        pointer: Box<dyn PointerDriver>,
        synthesizer: Synthesizer,
    ) -> Self {
        Self {
            screen,
            pointer,
            synthesizer,
            last_frame: None,
            candidates: Vec::new(),
        }
    }

    /// Capture one frame and rebuild the candidate set from it.
    ///
    /// Returns the number of candidates detected.
    pub fn refresh(&mut self) -> Result<usize> {
        let frame = self
            .screen
            .capture_frame()
            .context("screen capture failed")?;

        self.candidates = self.synthesizer.analyze(&frame)?;
        self.last_frame = Some(frame);

        info!("detected {} ui candidates", self.candidates.len());
        Ok(self.candidates.len())
    }

    /// Click the candidate best matching `query` with the given button
    pub fn click_on(&mut self, query: &str, button: PointerButton) -> Result<MatchOutcome> {
        self.refresh()?;

        let Some((text, (x, y))) = self.best_target(query) else {
            info!("no candidate matched '{query}'");
            return Ok(MatchOutcome::NoMatch);
        };

        info!("clicking '{text}' at ({x}, {y})");
        self.pointer.click(x, y, button)?;
        Ok(MatchOutcome::Matched { text, x, y })
    }

    /// Double-click the candidate best matching `query`
    pub fn double_click_on(&mut self, query: &str) -> Result<MatchOutcome> {
        self.refresh()?;

        let Some((text, (x, y))) = self.best_target(query) else {
            info!("no candidate matched '{query}'");
            return Ok(MatchOutcome::NoMatch);
        };

        info!("double-clicking '{text}' at ({x}, {y})");
        self.pointer.double_click(x, y)?;
        Ok(MatchOutcome::Matched { text, x, y })
    }

    /// Move the pointer to the candidate best matching `query`, no click
    pub fn move_to(&mut self, query: &str) -> Result<MatchOutcome> {
        self.refresh()?;

        let Some((text, (x, y))) = self.best_target(query) else {
            info!("no candidate matched '{query}'");
            return Ok(MatchOutcome::NoMatch);
        };

        info!("moving to '{text}' at ({x}, {y})");
        self.pointer.move_to(x, y)?;
        Ok(MatchOutcome::Matched { text, x, y })
    }

    /// Refresh, then write an annotated screenshot of the detections.
    ///
    /// Returns the number of candidates rendered.
    pub fn show(&mut self, output: &Path) -> Result<usize> {
        self.refresh()?;

        let frame = self
            .last_frame
            .as_ref()
            .context("no frame available after refresh")?;

        for candidate in &self.candidates {
            info!(
                "  [{}] '{}' at ({}, {}) {}x{}",
                candidate.kind.label(),
                candidate.text,
                candidate.bounds.left(),
                candidate.bounds.top(),
                candidate.bounds.width(),
                candidate.bounds.height()
            );
        }

        let annotated = render::annotate(frame, &self.candidates)?;
        annotated
            .save(output)
            .with_context(|| format!("failed to write {}", output.display()))?;

        info!("wrote annotated screenshot to {}", output.display());
        Ok(self.candidates.len())
    }

    /// Owned copy of the winning candidate's text and center, if any
    fn best_target(&self, query: &str) -> Option<(String, (i32, i32))> {
        matcher::find_best_match(&self.candidates, query).map(|c| (c.text.clone(), c.center()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureError;
    use crate::vision::detection::DetectorConfig;
    use crate::vision::ocr::{OcrEngine, OcrWord};
    use imageproc::rect::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FakeScreen {
        width: u32,
        height: u32,
    }

    impl ScreenSource for FakeScreen {
        fn capture_frame(&mut self) -> Result<CapturedFrame, CaptureError> {
            let data = vec![0u8; (self.width * self.height * 4) as usize];
            Ok(CapturedFrame::new(data, self.width, self.height))
        }

        fn dimensions(&self) -> (u32, u32) {
            (self.width, self.height)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum PointerEvent {
        Move(i32, i32),
        Click(i32, i32, PointerButton),
        DoubleClick(i32, i32),
    }

    #[derive(Clone, Default)]
    struct RecordingPointer {
        events: Rc<RefCell<Vec<PointerEvent>>>,
    }

    impl PointerDriver for RecordingPointer {
        fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
            self.events.borrow_mut().push(PointerEvent::Move(x, y));
            Ok(())
        }

        fn click(&mut self, x: i32, y: i32, button: PointerButton) -> Result<()> {
            self.events
                .borrow_mut()
                .push(PointerEvent::Click(x, y, button));
            Ok(())
        }

        fn double_click(&mut self, x: i32, y: i32) -> Result<()> {
            self.events.borrow_mut().push(PointerEvent::DoubleClick(x, y));
            Ok(())
        }
    }

    struct FakeOcr {
        words: Vec<OcrWord>,
    }

    impl OcrEngine for FakeOcr {
        fn recognize_words(&self, _frame: &CapturedFrame) -> Result<Vec<OcrWord>> {
            Ok(self.words.clone())
        }

        fn recognize_region(&self, _frame: &CapturedFrame) -> Result<String> {
            Ok(String::new())
        }
    }

    fn controller_with_words(words: Vec<OcrWord>) -> (AutomationController, RecordingPointer) {
        let pointer = RecordingPointer::default();
        let synthesizer = Synthesizer::new(Box::new(FakeOcr { words }), DetectorConfig::default());
        let controller = AutomationController::new(
            Box::new(FakeScreen {
                width: 320,
                height: 200,
            }),
            Box::new(pointer.clone()),
            synthesizer,
        );
        (controller, pointer)
    }

    fn submit_word() -> OcrWord {
        OcrWord {
            text: "Submit".to_string(),
            bounds: Rect::at(10, 20).of_size(100, 30),
            confidence: 90.0,
        }
    }

    #[test]
    fn click_on_hits_the_candidate_center() {
        let (mut controller, pointer) = controller_with_words(vec![submit_word()]);

        let outcome = controller.click_on("submit", PointerButton::Left).unwrap();
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                text: "Submit".to_string(),
                x: 60,
                y: 35,
            }
        );
        assert_eq!(
            pointer.events.borrow().as_slice(),
            &[PointerEvent::Click(60, 35, PointerButton::Left)]
        );
    }

    #[test]
    fn right_click_uses_the_right_button() {
        let (mut controller, pointer) = controller_with_words(vec![submit_word()]);

        controller.click_on("submit", PointerButton::Right).unwrap();
        assert_eq!(
            pointer.events.borrow().as_slice(),
            &[PointerEvent::Click(60, 35, PointerButton::Right)]
        );
    }

    #[test]
    fn no_match_leaves_the_pointer_untouched() {
        let (mut controller, pointer) = controller_with_words(vec![submit_word()]);

        let outcome = controller.click_on("zzzz", PointerButton::Left).unwrap();
        assert_eq!(outcome, MatchOutcome::NoMatch);
        assert!(pointer.events.borrow().is_empty());
    }

    #[test]
    fn double_click_and_move_reach_the_same_point() {
        let (mut controller, pointer) = controller_with_words(vec![submit_word()]);

        controller.double_click_on("submit").unwrap();
        controller.move_to("submit").unwrap();
        assert_eq!(
            pointer.events.borrow().as_slice(),
            &[
                PointerEvent::DoubleClick(60, 35),
                PointerEvent::Move(60, 35)
            ]
        );
    }

    #[test]
    fn refresh_replaces_the_candidate_set() {
        let (mut controller, _pointer) = controller_with_words(vec![submit_word()]);

        assert_eq!(controller.refresh().unwrap(), 1);
        assert_eq!(controller.refresh().unwrap(), 1);
        assert_eq!(controller.candidates.len(), 1);
        assert!(controller.last_frame.is_some());
    }

    #[test]
    fn show_writes_an_annotated_screenshot() {
        let (mut controller, _pointer) = controller_with_words(vec![submit_word()]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.png");
        let count = controller.show(&path).unwrap();
        assert_eq!(count, 1);
        assert!(path.exists());
    }
}
