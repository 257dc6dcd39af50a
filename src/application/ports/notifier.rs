use crate::domain::entities::ActionKind;
use crate::shared::AppError;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// ユーザーに表示するトースト通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    pub action: &'static str,
    pub message: String,
}

impl Notification {
    pub fn success(action: ActionKind, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            action: action.as_str(),
            message: message.into(),
        }
    }

    pub fn error(action: ActionKind, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            action: action.as_str(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), AppError>;
}
