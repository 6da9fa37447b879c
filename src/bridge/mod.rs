//! Single-registration event subscription with a swappable handler.
//!
//! The shell is subscribed exactly once per bridge; delivery always goes
//! through an indirection cell holding the caller's *current* handler, so
//! replacing the handler never drops the subscription or loses an event
//! to a stale closure.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::shell::{ShellEvents, SubscriptionId};

pub type BridgeHandler = Box<dyn FnMut(&Value)>;

pub struct EventBridge {
    shell: Rc<dyn ShellEvents>,
    event: String,
    handler: Rc<RefCell<BridgeHandler>>,
    subscription: Option<SubscriptionId>,
}

impl EventBridge {
    /// Registers against `event` once. Registration failure is logged with
    /// the event name and swallowed; the bridge then acts as a permanent
    /// no-op and its teardown never touches the shell.
    pub fn subscribe(shell: Rc<dyn ShellEvents>, event: &str, handler: BridgeHandler) -> Self {
        let handler = Rc::new(RefCell::new(handler));
        let delivery_cell = Rc::downgrade(&handler);
        let sink = Box::new(move |payload: &Value| {
            // A delivery racing teardown upgrades to nothing and is dropped.
            if let Some(current) = delivery_cell.upgrade() {
                (current.borrow_mut())(payload);
            }
        });

        let subscription = match shell.subscribe(event, sink) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::error!(event, ?err, "event registration failed");
                None
            }
        };

        Self {
            shell,
            event: event.to_owned(),
            handler,
            subscription,
        }
    }

    /// Swaps the handler without re-subscribing. The next delivery invokes
    /// the replacement.
    pub fn replace_handler(&self, handler: BridgeHandler) {
        *self.handler.borrow_mut() = handler;
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn is_registered(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.shell.unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{EventSink, ShellError, ShellResult};
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Default)]
    struct RecordingShell {
        listeners: RefCell<Vec<(String, SubscriptionId, EventSink)>>,
        next_id: Cell<u64>,
        unsubscribed: RefCell<Vec<SubscriptionId>>,
        fail_subscribe: Cell<bool>,
    }

    impl RecordingShell {
        fn deliver(&self, event: &str, payload: Value) {
            let mut listeners = self.listeners.borrow_mut();
            for (name, _, sink) in listeners.iter_mut() {
                if name == event {
                    sink(&payload);
                }
            }
        }
    }

    impl ShellEvents for RecordingShell {
        fn subscribe(&self, event: &str, sink: EventSink) -> ShellResult<SubscriptionId> {
            if self.fail_subscribe.get() {
                return Err(ShellError::SubscribeFailed {
                    event: event.to_owned(),
                    source: anyhow::anyhow!("injected registration failure"),
                });
            }
            let id = SubscriptionId(self.next_id.get());
            self.next_id.set(id.0 + 1);
            self.listeners.borrow_mut().push((event.to_owned(), id, sink));
            Ok(id)
        }

        fn unsubscribe(&self, id: SubscriptionId) {
            self.unsubscribed.borrow_mut().push(id);
            self.listeners.borrow_mut().retain(|(_, sub, _)| *sub != id);
        }

        fn emit(&self, _event: &str, _payload: Value) -> ShellResult<()> {
            Ok(())
        }
    }

    #[test]
    fn delivery_reaches_the_latest_handler_without_resubscribing() {
        let shell = Rc::new(RecordingShell::default());
        let first_hits = Rc::new(Cell::new(0));
        let second_hits = Rc::new(Cell::new(0));

        let hits = first_hits.clone();
        let bridge = EventBridge::subscribe(
            shell.clone(),
            "capture",
            Box::new(move |_| hits.set(hits.get() + 1)),
        );
        shell.deliver("capture", json!("a"));

        let hits = second_hits.clone();
        bridge.replace_handler(Box::new(move |_| hits.set(hits.get() + 1)));
        shell.deliver("capture", json!("b"));

        assert_eq!(first_hits.get(), 1);
        assert_eq!(second_hits.get(), 1);
        assert_eq!(shell.listeners.borrow().len(), 1, "one registration only");
    }

    #[test]
    fn drop_unsubscribes_exactly_once() {
        let shell = Rc::new(RecordingShell::default());
        let bridge = EventBridge::subscribe(shell.clone(), "capture", Box::new(|_| {}));
        assert!(bridge.is_registered());

        drop(bridge);
        assert_eq!(shell.unsubscribed.borrow().len(), 1);
        assert!(shell.listeners.borrow().is_empty());
    }

    #[test]
    fn failed_registration_is_a_permanent_noop() {
        let shell = Rc::new(RecordingShell::default());
        shell.fail_subscribe.set(true);

        let bridge = EventBridge::subscribe(shell.clone(), "capture", Box::new(|_| {}));
        assert!(!bridge.is_registered());

        drop(bridge);
        assert!(shell.unsubscribed.borrow().is_empty(), "nothing to undo");
    }

    #[test]
    fn independent_bridges_each_receive_every_event() {
        let shell = Rc::new(RecordingShell::default());
        let left = Rc::new(Cell::new(0));
        let right = Rc::new(Cell::new(0));

        let hits = left.clone();
        let _left_bridge = EventBridge::subscribe(
            shell.clone(),
            "capture",
            Box::new(move |_| hits.set(hits.get() + 1)),
        );
        let hits = right.clone();
        let _right_bridge = EventBridge::subscribe(
            shell.clone(),
            "capture",
            Box::new(move |_| hits.set(hits.get() + 1)),
        );

        shell.deliver("capture", json!("x"));
        shell.deliver("capture", json!("y"));
        assert_eq!(left.get(), 2);
        assert_eq!(right.get(), 2);
    }

    #[test]
    fn late_delivery_after_drop_is_ignored() {
        let shell = Rc::new(RecordingShell::default());
        let hits = Rc::new(Cell::new(0));

        let hit_cell = hits.clone();
        let bridge = EventBridge::subscribe(
            shell.clone(),
            "capture",
            Box::new(move |_| hit_cell.set(hit_cell.get() + 1)),
        );

        // Steal the raw sink to simulate a shell that delivers after the
        // disposer ran (out-of-order teardown).
        let (_, _, mut sink) = shell.listeners.borrow_mut().pop().expect("sink registered");
        drop(bridge);
        sink(&json!("late"));
        assert_eq!(hits.get(), 0);
    }
}
