//! User-facing notifications.
//!
//! Non-fatal conditions (for example an unresolvable common branch) are
//! reported through this seam instead of being printed inline, so the
//! pipeline stays testable and callers decide how warnings surface.

/// Sink for non-fatal warnings aimed at the user.
pub trait Notifier {
    fn warn(&self, message: &str);
}

/// Writes warnings to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn warn(&self, message: &str) {
        eprintln!("Warning: {message}");
    }
}
