//! User-facing notices and prompts.

/// Toast-style notices shown to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, description: &str);
}

/// Forwards notices to the log when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, description: &str) {
        tracing::warn!(title, description, "notice");
    }
}

/// Asks the user for a value, e.g. a missing video URL. `None` means cancelled.
pub trait UrlPrompt: Send + Sync {
    fn ask(&self, message: &str) -> Option<String>;
}
