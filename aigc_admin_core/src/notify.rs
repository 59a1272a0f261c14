//! 用户可见的阻塞式通知

use tracing::warn;

/// 通知渠道
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// 向用户展示一条消息，返回前用户已看到它
    fn alert(&self, message: &str);
}

/// 写入标准错误输出
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// 只写日志，适合无人值守的场景
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn alert(&self, message: &str) {
        warn!(alert = message, "User notification");
    }
}
