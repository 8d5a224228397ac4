//! Screen Capture Layer
//!
//! Grabs full-screen frames from the primary monitor. Capture is a read-only
//! operation; every call produces a fresh, independently owned frame.

pub mod frame;

use thiserror::Error;
use tracing::info;

use frame::CapturedFrame;

/// Errors raised by the capture layer
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No monitor could be found to capture from
    #[error("no monitor available for capture")]
    NoMonitor,
    /// The platform capture backend reported a failure
    #[error("screen capture failed: {0}")]
    Backend(String),
}

/// Source of screen frames.
///
/// The one seam between the pipeline and the OS: tests substitute a
/// synthetic implementation, production uses [`XcapScreen`].
pub trait ScreenSource {
    /// Capture one full frame of the screen
    fn capture_frame(&mut self) -> Result<CapturedFrame, CaptureError>;

    /// Screen dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32);
}

/// Primary-monitor capture backed by the `xcap` crate
pub struct XcapScreen {
    monitor: xcap::Monitor,
}

impl XcapScreen {
    /// Open the primary monitor (first monitor when none is marked primary)
    pub fn primary() -> Result<Self, CaptureError> {
        let monitors =
            xcap::Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;

        let monitor = monitors
            .into_iter()
            .find(|m| m.is_primary())
            .or_else(|| xcap::Monitor::all().ok()?.into_iter().next())
            .ok_or(CaptureError::NoMonitor)?;

        info!(
            "capturing monitor '{}' ({}x{})",
            monitor.name(),
            monitor.width(),
            monitor.height()
        );

        Ok(Self { monitor })
    }
}

impl ScreenSource for XcapScreen {
    fn capture_frame(&mut self) -> Result<CapturedFrame, CaptureError> {
        let image = self
            .monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        let (width, height) = image.dimensions();
        Ok(CapturedFrame::new(image.into_raw(), width, height))
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.monitor.width(), self.monitor.height())
    }
}
