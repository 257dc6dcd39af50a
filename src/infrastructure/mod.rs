pub mod cache;
pub mod metrics;
pub mod notifier;

pub use cache::{CollectionRegistry, RefetchTicket};
pub use metrics::{ReconcileMetrics, ReconcileMetricsSnapshot};
pub use notifier::{ChannelNotifier, TracingNotifier};
