use crate::config::AppConfig;

/// User-facing alerts for failures that would otherwise lose a capture
/// silently. Injected so hosts and tests can intercept them.
pub trait AlertSink {
    fn alert(&self, body: &str);
}

/// Desktop notification backend.
#[derive(Debug, Clone)]
pub struct SystemNotifier {
    enabled: bool,
}

impl SystemNotifier {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            enabled: config.notifications_enabled(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for SystemNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for SystemNotifier {
    fn alert(&self, body: &str) {
        if !self.enabled {
            tracing::warn!(body, "desktop notifications disabled; alert logged only");
            return;
        }

        if let Err(err) = notify_rust::Notification::new()
            .appname("StudySnap")
            .summary("StudySnap")
            .body(body)
            .show()
        {
            tracing::warn!("system notification failed: {err}");
        }
    }
}
