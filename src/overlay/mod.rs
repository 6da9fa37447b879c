//! Overlay lifecycle: readiness signalling, capture painting, gesture
//! completion, and handoff to the persistence boundary.
//!
//! Every failure short of a rejected persistence call is logged and
//! swallowed here; the overlay may end up blank but it stays mounted and
//! responsive to Escape.

pub mod canvas;
pub mod window;

pub use canvas::CanvasSurface;
pub use window::WindowSlot;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::{json, Value};

use crate::bridge::EventBridge;
use crate::decode::{self, CapturedImagePayload};
use crate::error::AppResult;
use crate::export::{self, CroppedImagePayload};
use crate::geometry::{BitmapSize, SelectionArea, ViewportSize};
use crate::input::{self, OverlayKey};
use crate::notification::AlertSink;
use crate::selection::{Difficulty, PointerTarget, SelectionMachine, SelectionPhase};
use crate::shell::{
    ShellEvents, ShellRpc, ShellWindows, CAPTURE_EVENT, CLOSE_COMMAND, OVERLAY_LABEL, READY_EVENT,
    SUBMIT_COMMAND,
};

const LOG_TAG: &str = "screenshot_overlay";

/// Capabilities the overlay needs from its host.
pub struct OverlayDeps {
    pub events: Rc<dyn ShellEvents>,
    pub rpc: Rc<dyn ShellRpc>,
    pub windows: Rc<dyn ShellWindows>,
    pub alerts: Rc<dyn AlertSink>,
}

pub struct ScreenshotOverlay {
    state: Rc<OverlayState>,
    bridge: Option<EventBridge>,
}

struct OverlayState {
    deps: OverlayDeps,
    mounted: Cell<bool>,
    close_requested: Cell<bool>,
    machine: RefCell<SelectionMachine>,
    canvas: RefCell<CanvasSurface>,
    window: RefCell<WindowSlot>,
}

impl ScreenshotOverlay {
    /// Mounts the overlay. The capture listener is registered before the
    /// readiness signal goes out, so the shell can never emit into a gap;
    /// the readiness emission itself is fire-and-forget.
    pub fn mount(deps: OverlayDeps) -> Self {
        let state = Rc::new(OverlayState {
            deps,
            mounted: Cell::new(true),
            close_requested: Cell::new(false),
            machine: RefCell::new(SelectionMachine::new()),
            canvas: RefCell::new(CanvasSurface::new()),
            window: RefCell::new(WindowSlot::new()),
        });

        let handler_state: Weak<OverlayState> = Rc::downgrade(&state);
        let bridge = EventBridge::subscribe(
            state.deps.events.clone(),
            CAPTURE_EVENT,
            Box::new(move |payload| {
                if let Some(state) = handler_state.upgrade() {
                    state.handle_capture_event(payload);
                }
            }),
        );

        if let Err(err) = state
            .deps
            .events
            .emit(READY_EVENT, json!({ "label": OVERLAY_LABEL }))
        {
            tracing::warn!(component = LOG_TAG, ?err, "readiness signal failed");
        }

        Self {
            state,
            bridge: Some(bridge),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.state.mounted.get()
    }

    pub fn phase(&self) -> SelectionPhase {
        self.state.machine.borrow().phase()
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.state.machine.borrow().difficulty()
    }

    pub fn selection(&self) -> Option<SelectionArea> {
        self.state.machine.borrow().selection()
    }

    pub fn canvas_size(&self) -> Option<BitmapSize> {
        self.state.canvas.borrow().size()
    }

    /// Layout report from the host; crop math scales against the most
    /// recent value.
    pub fn set_displayed_size(&self, displayed: ViewportSize) {
        if !self.state.active() {
            return;
        }
        self.state.canvas.borrow_mut().set_displayed_size(displayed);
    }

    /// Raw key input from the host. Unbound keys are ignored.
    pub fn handle_raw_key(&self, name: &str) {
        if let Some(key) = input::resolve_overlay_key(name) {
            self.handle_key(key);
        }
    }

    pub fn handle_key(&self, key: OverlayKey) {
        if !self.state.active() {
            return;
        }
        match key {
            OverlayKey::Escape => self.cancel(),
            OverlayKey::Classify(difficulty) => {
                let first = self.state.machine.borrow_mut().choose_difficulty(difficulty);
                if first {
                    tracing::debug!(component = LOG_TAG, "chooser condensed to status bar");
                }
            }
        }
    }

    pub fn choose_difficulty(&self, difficulty: Difficulty) {
        self.handle_key(OverlayKey::Classify(difficulty));
    }

    pub fn pointer_down(&self, target: PointerTarget, x: f64, y: f64) {
        if !self.state.active() {
            return;
        }
        self.state.machine.borrow_mut().pointer_down(target, x, y);
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        if !self.state.active() {
            return;
        }
        self.state.machine.borrow_mut().pointer_move(x, y);
    }

    /// Completes an active gesture: scale, crop, persist, close. Crops
    /// under one device pixel are discarded silently.
    pub fn pointer_up(&self) {
        if !self.state.active() {
            return;
        }
        let Some(gesture) = self.state.machine.borrow_mut().pointer_up() else {
            return;
        };

        let submission = {
            let canvas = self.state.canvas.borrow();
            let Some(bitmap) = canvas.bitmap() else {
                tracing::warn!(
                    component = LOG_TAG,
                    "gesture completed before any capture was painted"
                );
                return;
            };
            let Some(displayed) = canvas.displayed_size() else {
                return;
            };
            match export::crop(bitmap, &gesture.area, displayed) {
                Ok(Some(payload)) => Some(payload),
                Ok(None) => None,
                Err(err) => {
                    tracing::error!(component = LOG_TAG, ?err, "crop failed");
                    None
                }
            }
        };

        if let Some(payload) = submission {
            self.state.submit(&payload, gesture.difficulty);
        }
    }

    /// Escape path: clears the selection (classification survives) and
    /// requests overlay closure.
    pub fn cancel(&self) {
        if !self.state.active() {
            return;
        }
        self.state.machine.borrow_mut().cancel();
        self.state.request_close();
    }

    /// Close-button path: dismisses without touching selection state.
    pub fn dismiss(&self) {
        if !self.state.active() {
            return;
        }
        self.state.request_close();
    }

    /// Idempotent teardown: detaches the capture listener and the keyboard
    /// surface and drops the window handle. Safe while capture or persist
    /// work is still in flight.
    pub fn unmount(&mut self) {
        if !self.state.mounted.replace(false) {
            return;
        }
        self.bridge = None;
        self.state.window.borrow_mut().release();
        tracing::debug!(component = LOG_TAG, "overlay unmounted");
    }
}

impl Drop for ScreenshotOverlay {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl OverlayState {
    /// Input and deliveries are live only while mounted and not yet
    /// dismissed; everything arriving later is a stale continuation.
    fn active(&self) -> bool {
        self.mounted.get() && !self.close_requested.get()
    }

    fn handle_capture_event(&self, payload: &Value) {
        if !self.active() {
            tracing::debug!(
                component = LOG_TAG,
                "capture event after teardown or dismissal; ignored"
            );
            return;
        }
        if let Err(err) = self.paint_capture(payload) {
            tracing::error!(component = LOG_TAG, ?err, "capture event dropped");
        }
    }

    fn paint_capture(&self, payload: &Value) -> AppResult<()> {
        let payload = CapturedImagePayload::from_event(payload)?;
        let bitmap = decode::decode(&payload)?;
        tracing::debug!(
            component = LOG_TAG,
            width = bitmap.width(),
            height = bitmap.height(),
            "capture painted"
        );
        self.canvas.borrow_mut().paint(bitmap);

        let window = self.window.borrow_mut().acquire(self.deps.windows.as_ref());
        window.show()?;
        Ok(())
    }

    fn submit(&self, payload: &CroppedImagePayload, difficulty: Difficulty) {
        let args = json!({
            "imageUrl": payload.data_url(),
            "folderId": Value::Null,
            "courseId": Value::Null,
            "setId": Value::Null,
            "difficultyRating": difficulty.rating(),
        });

        if let Err(err) = self.deps.rpc.invoke(SUBMIT_COMMAND, args) {
            tracing::error!(component = LOG_TAG, ?err, "persisting capture failed");
            self.deps
                .alerts
                .alert("Saving the captured screenshot failed. The capture was discarded.");
        }
        // The capture is neither retried nor queued; the overlay closes on
        // success and failure alike.
        self.request_close();
    }

    fn request_close(&self) {
        if self.close_requested.replace(true) {
            return;
        }
        if let Err(err) = self.deps.rpc.invoke(CLOSE_COMMAND, Value::Null) {
            tracing::warn!(component = LOG_TAG, ?err, "overlay close call failed");
        }
    }
}
