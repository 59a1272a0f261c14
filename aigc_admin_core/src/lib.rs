//! AIGC 后台管理客户端核心库
//!
//! 提供后台管理界面所需的客户端能力：
//! - 令牌持久化与认证上下文
//! - 统一约定的 HTTP 客户端（401 即会话失效）
//! - 订阅方案、微信设置等资源
//! - 页面路由与会话守卫

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod notify;
pub mod router;
pub mod subscription;
pub mod token_store;
pub mod types;
pub mod wechat;

pub use auth::AuthContext;
pub use client::AdminClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::HttpClient;
pub use notify::{Notifier, StderrNotifier, TracingNotifier};
pub use router::{Router, Screen};
pub use subscription::{LoadStatus, SubscriptionPlans};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::*;
pub use wechat::{SaveReport, SettingField, WechatSettings};
