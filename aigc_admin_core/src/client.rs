//! 后台管理客户端

use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::notify::{Notifier, StderrNotifier};
use crate::subscription::SubscriptionPlans;
use crate::token_store::{FileTokenStore, TokenStore};
use crate::types::{LoginRequest, LoginResponse};
use crate::wechat::WechatSettings;
use std::sync::Arc;
use tracing::info;

const LOGIN_PATH: &str = "/auth/login";

/// 后台管理客户端
///
/// 启动时构造一次，克隆句柄共享同一个 [`AuthContext`] 与通知渠道。
#[derive(Clone)]
pub struct AdminClient {
    http: HttpClient,
    auth: AuthContext,
    notifier: Arc<dyn Notifier>,
}

impl AdminClient {
    /// 创建新的客户端实例
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
            auth: AuthContext::restore(store),
            notifier,
        })
    }

    /// 令牌保存在配置指定的文件中，通知输出到标准错误
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
        Self::new(config, store, Arc::new(StderrNotifier))
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// 订阅方案资源
    pub fn plans(&self) -> SubscriptionPlans {
        SubscriptionPlans::new(self.clone())
    }

    /// 微信设置
    pub fn wechat(&self) -> WechatSettings {
        WechatSettings::new(self.clone())
    }

    /// 用户登录，成功后令牌写入认证上下文
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        info!("Logging in user: {}", username);

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let data: LoginResponse = self
            .http
            .post_anonymous(LOGIN_PATH, &request)
            .await
            .map_err(|e| self.recover(e, None, "登录失败"))?;

        self.auth
            .set_token(Some(data.token))
            .map_err(|e| self.recover(e, None, "保存登录状态失败"))?;

        info!("User logged in successfully");
        Ok(())
    }

    /// 用户登出。服务端没有登出接口，会话在服务端自然过期。
    pub fn logout(&self) -> Result<()> {
        self.auth
            .clear()
            .map_err(|e| self.recover(e, None, "登出失败"))?;
        info!("User logged out");
        Ok(())
    }

    pub(crate) fn alert(&self, message: &str) {
        self.notifier.alert(message);
    }

    /// 统一的失败处理：未认证时清除会话（触发跳转登录），其他错误通知用户
    ///
    /// `token` 为失败请求所携带的令牌。返回原错误以便调用方继续传播。
    pub(crate) fn recover(&self, err: Error, token: Option<&str>, context: &str) -> Error {
        match (&err, token) {
            (Error::NoAuth, Some(token)) => {
                self.auth.invalidate(token);
            }
            (Error::NoAuth, None) => {}
            _ => self.alert(&format!("{}: {}", context, err)),
        }
        err
    }
}
