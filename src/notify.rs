//! User-facing notifications
//!
//! The submission workflow reports on-chain failures through a [`Notifier`].
//! Front-ends plug in their own renderer; [`TracingNotifier`] writes them to
//! the log.

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// One notification with a headline and optional detail lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub description: Vec<String>,
    pub kind: NotificationKind,
    /// Explorer link for the transaction the notification is about
    pub link: Option<String>,
}

impl Notification {
    pub fn error(message: impl Into<String>, description: Vec<String>) -> Self {
        Self {
            message: message.into(),
            description,
            kind: NotificationKind::Error,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Renders notifications to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let description = notification.description.join("; ");
        let link = notification.link.as_deref().unwrap_or("");
        match notification.kind {
            NotificationKind::Info | NotificationKind::Success => {
                info!(description = %description, link = %link, "{}", notification.message)
            }
            NotificationKind::Warning => {
                warn!(description = %description, link = %link, "{}", notification.message)
            }
            NotificationKind::Error => {
                error!(description = %description, link = %link, "{}", notification.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_builder() {
        let n = Notification::error("Transaction failed", vec!["boom".to_string()])
            .with_link("https://explorer.solana.com/tx/abc");
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.description, vec!["boom".to_string()]);
        assert_eq!(n.link.as_deref(), Some("https://explorer.solana.com/tx/abc"));
    }

    #[test]
    fn test_tracing_notifier_accepts_every_kind() {
        for kind in [
            NotificationKind::Info,
            NotificationKind::Success,
            NotificationKind::Warning,
            NotificationKind::Error,
        ] {
            TracingNotifier.notify(Notification {
                message: "m".to_string(),
                description: vec![],
                kind,
                link: None,
            });
        }
    }
}
