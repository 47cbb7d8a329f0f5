//! Host service contract consumed by [`crate::console::run`].
//!
//! A host owns the window, renderer, and audio device; the core never
//! reaches for any of those directly, so `run()` can be driven by a
//! headless test harness just as well as a real frontend.

use std::sync::Arc;

use rustynes_apu::RingBuffer;

use crate::input::Button;

/// Result of pumping host events for one iteration of the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Keep running.
    Continue,
    /// The host wants the emulation to stop; `run()` returns `Quit`.
    Quit,
    /// The host wants a full reset (e.g. a reset button or menu item).
    ResetRequest,
}

/// Services a host must provide for [`crate::console::run`] to drive a
/// console to completion.
pub trait Host {
    /// Snapshot of whether `button` is currently held on `controller`
    /// (0 or 1).
    fn button(&self, controller: u8, button: Button) -> bool;

    /// Writes one pixel of the next frame. `color` is the 6-bit NES
    /// palette index; `emphasis_{red,green,blue}` are the PPUMASK
    /// emphasis bits in effect for this pixel.
    fn present_pixel(
        &mut self,
        color: u8,
        emphasis_red: bool,
        emphasis_green: bool,
        emphasis_blue: bool,
        x: u8,
        y: u8,
    );

    /// Pumps host events (window/input). Called once per emulated frame.
    fn poll(&mut self) -> HostEvent;

    /// Blits the frame assembled via `present_pixel` and paces to the
    /// display's refresh rate. `Err` is a fatal host failure.
    fn present_frame(&mut self) -> Result<(), String>;

    /// Registers the ring buffer the host's audio callback should drain.
    /// Called once, before the run loop starts.
    fn set_audio_source(&mut self, source: Arc<RingBuffer>);
}
