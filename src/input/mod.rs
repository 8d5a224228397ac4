//! Pointer Injection Layer
//!
//! Moves the cursor and fires button events on the live desktop. Injected
//! events need short dwell times around button transitions to register
//! reliably, so the production driver sleeps between move, press and release.

use anyhow::{anyhow, Result};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Delay between moving the pointer and pressing a button
const MOVE_SETTLE: Duration = Duration::from_millis(100);
/// Delay between button press and release
const PRESS_HOLD: Duration = Duration::from_millis(50);
/// Delay between the two clicks of a double-click
const DOUBLE_CLICK_GAP: Duration = Duration::from_millis(100);

/// Which pointer button to press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

/// Pointer event injection seam.
///
/// Tests substitute a recording implementation; production uses
/// [`EnigoPointer`].
pub trait PointerDriver {
    /// Move the cursor to absolute screen coordinates
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Move to the point and perform a single click
    fn click(&mut self, x: i32, y: i32, button: PointerButton) -> Result<()>;

    /// Move to the point and perform two closely spaced left clicks
    fn double_click(&mut self, x: i32, y: i32) -> Result<()>;
}

/// Pointer driver backed by the `enigo` crate
pub struct EnigoPointer {
    enigo: Enigo,
}

impl EnigoPointer {
    /// Connect to the platform input subsystem
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| anyhow!("failed to initialize pointer driver: {e}"))?;
        Ok(Self { enigo })
    }

    fn press_and_release(&mut self, button: Button) -> Result<()> {
        self.enigo
            .button(button, Direction::Press)
            .map_err(|e| anyhow!("button press failed: {e}"))?;
        thread::sleep(PRESS_HOLD);
        self.enigo
            .button(button, Direction::Release)
            .map_err(|e| anyhow!("button release failed: {e}"))
    }
}

impl PointerDriver for EnigoPointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        debug!("moving pointer to ({x}, {y})");
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| anyhow!("pointer move failed: {e}"))
    }

    fn click(&mut self, x: i32, y: i32, button: PointerButton) -> Result<()> {
        self.move_to(x, y)?;
        thread::sleep(MOVE_SETTLE);

        let button = match button {
            PointerButton::Left => Button::Left,
            PointerButton::Right => Button::Right,
        };
        self.press_and_release(button)
    }

    fn double_click(&mut self, x: i32, y: i32) -> Result<()> {
        self.click(x, y, PointerButton::Left)?;
        thread::sleep(DOUBLE_CLICK_GAP);
        self.click(x, y, PointerButton::Left)
    }
}
