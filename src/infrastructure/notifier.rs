use crate::application::ports::notifier::{Notification, NotificationLevel, Notifier};
use crate::shared::AppError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// 通知を UI 側のチャネルへ流す実装
#[derive(Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), AppError> {
        self.sender
            .send(notification)
            .map_err(|err| AppError::Internal(format!("Notification channel closed: {err}")))
    }
}

/// 通知をログに出すだけの実装（UI を持たない環境向け）
#[derive(Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), AppError> {
        match notification.level {
            NotificationLevel::Success => {
                info!(action = notification.action, "{}", notification.message)
            }
            NotificationLevel::Error => {
                warn!(action = notification.action, "{}", notification.message)
            }
        }
        Ok(())
    }
}
