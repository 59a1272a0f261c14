//! 微信系统设置
//!
//! 设置分散在四个独立接口中。读取时并发拉取后组装成一份本地草稿；保存时四个写请求
//! 并发发出并全部等待完成，逐项汇报结果。服务端不提供事务，已成功的写入不会回滚。

use crate::client::AdminClient;
use crate::error::{Error, Result};
use crate::types::{IntValue, PaymentExpires, UrlValue, WechatDraft, WechatSecrets};
use std::fmt;
use tracing::{info, warn};

/// 微信设置的四个独立配置项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Secrets,
    LoginCallback,
    PaymentCallback,
    PaymentExpires,
}

impl SettingField {
    pub const ALL: [SettingField; 4] = [
        SettingField::Secrets,
        SettingField::LoginCallback,
        SettingField::PaymentCallback,
        SettingField::PaymentExpires,
    ];

    pub fn path(self) -> &'static str {
        match self {
            SettingField::Secrets => "/sysconf/wechat/secrets",
            SettingField::LoginCallback => "/sysconf/wechat/login_callback",
            SettingField::PaymentCallback => "/sysconf/wechat/payment_callback",
            SettingField::PaymentExpires => "/sysconf/wechat/payment_expires",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SettingField::Secrets => "微信密钥",
            SettingField::LoginCallback => "登录回调地址",
            SettingField::PaymentCallback => "支付结果回调地址",
            SettingField::PaymentExpires => "支付有效期",
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 单项写入结果
#[derive(Debug)]
pub struct FieldOutcome {
    pub field: SettingField,
    pub result: Result<()>,
}

/// 保存结果：四项写入各自的成败
#[derive(Debug)]
pub struct SaveReport {
    pub outcomes: Vec<FieldOutcome>,
}

impl SaveReport {
    /// 四项全部成功
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn succeeded(&self) -> Vec<SettingField> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.field)
            .collect()
    }

    pub fn failures(&self) -> Vec<(SettingField, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.field, e)))
            .collect()
    }

    fn has_no_auth(&self) -> bool {
        self.failures().iter().any(|(_, e)| e.is_no_auth())
    }

    /// 失败项摘要，例如 `登录回调地址: HTTP 500: Internal Server Error`
    pub fn summary(&self) -> String {
        self.failures()
            .iter()
            .map(|(field, e)| format!("{}: {}", field, e))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// 微信设置
#[derive(Clone)]
pub struct WechatSettings {
    client: AdminClient,
}

impl WechatSettings {
    pub fn new(client: AdminClient) -> Self {
        Self { client }
    }

    /// 并发读取四项配置并组装草稿，任一项失败则整体失败
    pub async fn load(&self) -> Result<WechatDraft> {
        let token = self.client.auth().token();
        let token = token.as_deref();
        let http = self.client.http();

        let tagged = |field: SettingField| move |e: Error| (field, e);

        let loaded = tokio::try_join!(
            async {
                http.get::<WechatSecrets>(SettingField::Secrets.path(), token)
                    .await
                    .map_err(tagged(SettingField::Secrets))
            },
            async {
                http.get::<UrlValue>(SettingField::LoginCallback.path(), token)
                    .await
                    .map_err(tagged(SettingField::LoginCallback))
            },
            async {
                http.get::<UrlValue>(SettingField::PaymentCallback.path(), token)
                    .await
                    .map_err(tagged(SettingField::PaymentCallback))
            },
            async {
                http.get::<PaymentExpires>(SettingField::PaymentExpires.path(), token)
                    .await
                    .map_err(tagged(SettingField::PaymentExpires))
            },
        );

        match loaded {
            Ok((secrets, login_callback, payment_callback, payment_expires)) => {
                info!("Wechat settings loaded");
                Ok(WechatDraft {
                    secrets,
                    login_callback: login_callback.url,
                    payment_callback: payment_callback.url,
                    payment_expires: payment_expires.seconds,
                })
            }
            Err((field, e)) => {
                let context = format!("读取{}失败", field);
                Err(self.client.recover(e, token, &context))
            }
        }
    }

    /// 读取当前设置作为编辑草稿
    ///
    /// 尚未配置过的服务端对读取返回应用错误，此时在通知之后以空草稿开始编辑。
    /// 未认证、网络等其他错误照常返回。
    pub async fn load_or_default(&self) -> Result<WechatDraft> {
        match self.load().await {
            Err(Error::Application { code, msg }) => {
                warn!(
                    "Wechat settings unavailable (code {}: {}), starting from an empty draft",
                    code, msg
                );
                Ok(WechatDraft::default())
            }
            other => other,
        }
    }

    /// 并发写入四项配置，等待全部完成后返回逐项结果
    ///
    /// 有未认证失败时清除会话一次；否则有失败时通知一次失败列表，全部成功时通知已保存。
    pub async fn save(&self, draft: &WechatDraft) -> Result<SaveReport> {
        if draft.payment_expires < 0 {
            let e = Error::InvalidParam(format!(
                "payment expires must not be negative, got {}",
                draft.payment_expires
            ));
            return Err(self.client.recover(e, None, "保存微信设置失败"));
        }

        let token = self.client.auth().token();
        let token = token.as_deref();
        let http = self.client.http();

        let login_callback = UrlValue {
            url: draft.login_callback.clone(),
        };
        let payment_callback = UrlValue {
            url: draft.payment_callback.clone(),
        };
        let payment_expires = IntValue {
            val: draft.payment_expires,
        };

        let (secrets, login, payment, expires) = tokio::join!(
            http.post(SettingField::Secrets.path(), &draft.secrets, token),
            http.post(SettingField::LoginCallback.path(), &login_callback, token),
            http.post(SettingField::PaymentCallback.path(), &payment_callback, token),
            http.post(SettingField::PaymentExpires.path(), &payment_expires, token),
        );

        let report = SaveReport {
            outcomes: SettingField::ALL
                .into_iter()
                .zip([secrets, login, payment, expires])
                .map(|(field, result)| FieldOutcome { field, result })
                .collect(),
        };

        if report.has_no_auth() {
            if let Some(token) = token {
                self.client.auth().invalidate(token);
            }
        } else if report.is_success() {
            info!("Wechat settings saved");
            self.client.alert("微信设置已保存");
        } else {
            warn!(
                "Wechat settings partially saved, succeeded: {:?}",
                report.succeeded()
            );
            self.client
                .alert(&format!("保存微信设置失败: {}", report.summary()));
        }

        Ok(report)
    }
}
