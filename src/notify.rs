pub const APP_NAME: &str = "apod-bg";

/// Short desktop messages about what the tool just did.
///
/// Delivery is best effort: a notifier never fails the operation it reports on.
pub trait Notifier {
    fn notify(&self, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str) {}
}

#[cfg(feature = "notify")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

#[cfg(feature = "notify")]
impl Notifier for DesktopNotifier {
    fn notify(&self, message: &str) {
        let result = notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(APP_NAME)
            .body(message)
            .timeout(notify_rust::Timeout::Milliseconds(3000))
            .show();

        if let Err(e) = result {
            tracing::warn!("Could not deliver notification {message:?}: {e}");
        }
    }
}
