use std::rc::Rc;

use crate::shell::{ShellResult, ShellWindows, WindowControl};

/// Lazily constructed handle to the overlay's own window.
///
/// Built on first use; when construction fails a no-op stand-in is
/// installed permanently, so window-control calls never error again for
/// the lifetime of this overlay instance.
pub enum WindowSlot {
    Uninitialized,
    Ready(Rc<dyn WindowControl>),
    Fallback(Rc<dyn WindowControl>),
}

struct NoopWindow;

impl WindowControl for NoopWindow {
    fn show(&self) -> ShellResult<()> {
        Ok(())
    }

    fn hide(&self) -> ShellResult<()> {
        Ok(())
    }

    fn close(&self) -> ShellResult<()> {
        Ok(())
    }
}

impl WindowSlot {
    pub fn new() -> Self {
        Self::Uninitialized
    }

    pub fn acquire(&mut self, windows: &dyn ShellWindows) -> Rc<dyn WindowControl> {
        match self {
            Self::Ready(handle) | Self::Fallback(handle) => handle.clone(),
            Self::Uninitialized => match windows.overlay_window() {
                Ok(handle) => {
                    *self = Self::Ready(handle.clone());
                    handle
                }
                Err(err) => {
                    tracing::error!(?err, "overlay window handle unavailable; window calls are no-ops");
                    let handle: Rc<dyn WindowControl> = Rc::new(NoopWindow);
                    *self = Self::Fallback(handle.clone());
                    handle
                }
            },
        }
    }

    /// Drops any held handle; the next acquire constructs afresh.
    pub fn release(&mut self) {
        *self = Self::Uninitialized;
    }
}

impl Default for WindowSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellError;
    use std::cell::Cell;

    struct CountingWindows {
        builds: Cell<usize>,
        fail: bool,
    }

    impl ShellWindows for CountingWindows {
        fn overlay_window(&self) -> ShellResult<Rc<dyn WindowControl>> {
            self.builds.set(self.builds.get() + 1);
            if self.fail {
                return Err(ShellError::WindowUnavailable(anyhow::anyhow!(
                    "injected window failure"
                )));
            }
            Ok(Rc::new(NoopWindow))
        }
    }

    #[test]
    fn handle_is_built_once_and_reused() {
        let windows = CountingWindows {
            builds: Cell::new(0),
            fail: false,
        };
        let mut slot = WindowSlot::new();
        let _ = slot.acquire(&windows);
        let _ = slot.acquire(&windows);
        assert_eq!(windows.builds.get(), 1);
    }

    #[test]
    fn failed_construction_installs_a_noop_fallback() {
        let windows = CountingWindows {
            builds: Cell::new(0),
            fail: true,
        };
        let mut slot = WindowSlot::new();
        let handle = slot.acquire(&windows);
        handle.show().expect("fallback show should never fail");
        handle.close().expect("fallback close should never fail");

        // The failure is not retried.
        let _ = slot.acquire(&windows);
        assert_eq!(windows.builds.get(), 1);
    }

    #[test]
    fn release_allows_a_fresh_construction() {
        let windows = CountingWindows {
            builds: Cell::new(0),
            fail: false,
        };
        let mut slot = WindowSlot::new();
        let _ = slot.acquire(&windows);
        slot.release();
        let _ = slot.acquire(&windows);
        assert_eq!(windows.builds.get(), 2);
    }
}
