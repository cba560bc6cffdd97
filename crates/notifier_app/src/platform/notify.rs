use notifier_logging::{notifier_info, notifier_warn};

pub const APP_NAME: &str = "PubMedNotifier";

/// Delivers a short run summary to the user. Best effort.
pub trait Notifier {
    fn send(&self, summary: &str);
}

/// Desktop notification through the platform notification service.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn send(&self, summary: &str) {
        let shown = notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(APP_NAME)
            .body(summary)
            .show();
        match shown {
            Ok(_) => notifier_info!("Desktop notification sent"),
            Err(err) => notifier_warn!("Desktop notification failed: {}", err),
        }
    }
}
