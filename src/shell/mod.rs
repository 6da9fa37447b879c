//! Boundary traits for the host shell that owns window creation, event
//! delivery, and the persistence RPC surface.
//!
//! The engine never reaches shell state directly; everything arrives
//! through these injected capabilities.

use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

/// Channel the shell emits capture data on.
pub const CAPTURE_EVENT: &str = "open_screenshot_overlay";
/// Readiness signal emitted once per overlay mount.
pub const READY_EVENT: &str = "screenshot_overlay_ready";
/// Window label carried in the readiness body.
pub const OVERLAY_LABEL: &str = "screenshot_overlay";
/// Persistence command receiving the cropped capture.
pub const SUBMIT_COMMAND: &str = "receive_screenshot_data";
/// Dismissal command; the shell tears the overlay window down.
pub const CLOSE_COMMAND: &str = "close_screenshot_overlay";

pub type ShellResult<T> = std::result::Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("event registration failed for {event}: {source}")]
    SubscribeFailed {
        event: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("emit failed for {event}: {source}")]
    EmitFailed {
        event: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("command {command} failed: {source}")]
    InvokeFailed {
        command: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("overlay window handle unavailable: {0}")]
    WindowUnavailable(#[source] anyhow::Error),
    #[error("window {call} call failed: {source}")]
    WindowCallFailed {
        call: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Identifies one live registration on the shell's event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Delivery callback handed to the shell on registration. The shell calls
/// it with the event's payload value.
pub type EventSink = Box<dyn FnMut(&Value)>;

/// The shell's publish/subscribe channel.
pub trait ShellEvents {
    /// Registers `sink` for every delivery of `event`. Independent
    /// registrations on the same event each receive every delivery.
    fn subscribe(&self, event: &str, sink: EventSink) -> ShellResult<SubscriptionId>;

    /// Removes a registration. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    fn emit(&self, event: &str, payload: Value) -> ShellResult<()>;
}

/// The shell's remote-procedure surface.
pub trait ShellRpc {
    fn invoke(&self, command: &str, args: Value) -> ShellResult<Value>;
}

/// Control handle for one shell-owned window.
pub trait WindowControl {
    fn show(&self) -> ShellResult<()>;
    fn hide(&self) -> ShellResult<()>;
    fn close(&self) -> ShellResult<()>;
}

/// Builds control handles for the overlay's own window.
pub trait ShellWindows {
    fn overlay_window(&self) -> ShellResult<Rc<dyn WindowControl>>;
}
