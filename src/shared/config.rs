use serde::{Deserialize, Serialize};

/// 削除失敗時に楽観的に取り除いた投稿をどう戻すか
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeleteRecovery {
    /// 取り除いた位置にそのまま差し戻す
    #[default]
    Reinsert,
    /// 影響したコレクションを stale にして取り直す
    Refetch,
}

impl DeleteRecovery {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reinsert" => Some(DeleteRecovery::Reinsert),
            "refetch" => Some(DeleteRecovery::Refetch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub reconcile: ReconcileConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub delete_recovery: DeleteRecovery,
    // 失敗時にコレクション側も対称に巻き戻すか（既定では次回リフェッチ任せ）
    pub rollback_collections_on_failure: bool,
    pub cancel_refetch_on_mutation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub repost_success_message: String,
    pub repost_removed_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            delete_recovery: DeleteRecovery::Reinsert,
            rollback_collections_on_failure: false,
            cancel_refetch_on_mutation: true,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repost_success_message: "Reposted".to_string(),
            repost_removed_message: "Repost removed".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("CAMPUS_FEED_DELETE_RECOVERY") {
            if let Some(recovery) = DeleteRecovery::parse(&v) {
                cfg.reconcile.delete_recovery = recovery;
            }
        }
        if let Ok(v) = std::env::var("CAMPUS_FEED_ROLLBACK_COLLECTIONS") {
            cfg.reconcile.rollback_collections_on_failure =
                parse_bool(&v, cfg.reconcile.rollback_collections_on_failure);
        }
        if let Ok(v) = std::env::var("CAMPUS_FEED_CANCEL_REFETCH") {
            cfg.reconcile.cancel_refetch_on_mutation =
                parse_bool(&v, cfg.reconcile.cancel_refetch_on_mutation);
        }

        if let Ok(v) = std::env::var("CAMPUS_FEED_NOTIFICATIONS") {
            cfg.notifications.enabled = parse_bool(&v, cfg.notifications.enabled);
        }

        // ログ設定
        if let Ok(v) = std::env::var("CAMPUS_FEED_LOG") {
            let filter = v.trim();
            if !filter.is_empty() {
                cfg.logging.filter = filter.to_string();
            }
        }
        if let Ok(v) = std::env::var("CAMPUS_FEED_LOG_JSON") {
            cfg.logging.json = parse_bool(&v, cfg.logging.json);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.notifications.enabled {
            if self.notifications.repost_success_message.trim().is_empty() {
                return Err("Notification repost_success_message must not be empty".to_string());
            }
            if self.notifications.repost_removed_message.trim().is_empty() {
                return Err("Notification repost_removed_message must not be empty".to_string());
            }
        }
        if self.logging.filter.trim().is_empty() {
            return Err("Logging filter must not be empty".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
