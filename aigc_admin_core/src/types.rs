//! 数据类型定义

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 统一 API 响应信封
///
/// 成功时服务端可能省略 `msg` 与 `data`，两者在解码时均为可选。
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// 登录请求
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应数据
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// 订阅方案类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Subscription,
    Trail,
}

impl PlanType {
    /// 界面显示名称
    pub fn label(self) -> &'static str {
        match self {
            PlanType::Subscription => "订阅",
            PlanType::Trail => "试用",
        }
    }
}

/// 有效期单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiresUnit {
    Month,
    Day,
}

impl ExpiresUnit {
    /// 界面显示名称
    pub fn label(self) -> &'static str {
        match self {
            ExpiresUnit::Month => "月",
            ExpiresUnit::Day => "天",
        }
    }
}

/// 订阅方案（服务端分配 id）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub stype: PlanType,
    /// 价格，单位：分
    pub price: i64,
    pub expires: i64,
    pub unit: ExpiresUnit,
    /// 点数
    pub point: i64,
    #[serde(default)]
    pub enable: bool,
}

impl Plan {
    /// 有效期显示，例如 `3月`
    pub fn duration_label(&self) -> String {
        format!("{}{}", self.expires, self.unit.label())
    }
}

/// 新增订阅方案草稿（不含 id）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanDraft {
    pub stype: PlanType,
    pub price: i64,
    pub expires: i64,
    pub unit: ExpiresUnit,
    pub point: i64,
    pub enable: bool,
}

impl Default for PlanDraft {
    fn default() -> Self {
        Self {
            stype: PlanType::Subscription,
            price: 1,
            expires: 1,
            unit: ExpiresUnit::Month,
            point: 1,
            enable: false,
        }
    }
}

impl PlanDraft {
    /// 价格、时长、点数都必须 ≥ 1
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("price", self.price),
            ("expires", self.expires),
            ("point", self.point),
        ] {
            if value < 1 {
                return Err(Error::InvalidParam(format!(
                    "{} must be at least 1, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// 批量删除请求
#[derive(Debug, Clone, Serialize)]
pub struct DeletePlansRequest {
    pub ids: Vec<i64>,
}

/// 微信密钥配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WechatSecrets {
    /// 扫码登录 AppId
    pub login_id: String,
    pub app_id: String,
    pub app_secret: String,
    /// 商户 id
    pub mch_id: String,
    /// 商户证书序列号
    pub mch_cert_serial: String,
    pub pub_key_id: String,
    pub api_v3_pwd: String,
    /// 商户私钥（PEM）
    pub api_client_key: String,
    /// 微信支付公钥（PEM）
    pub pub_key: String,
}

/// `{url}` 请求/响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlValue {
    pub url: String,
}

/// `{val}` 请求
#[derive(Debug, Clone, Serialize)]
pub struct IntValue {
    pub val: i64,
}

/// 支付有效期响应数据
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentExpires {
    pub seconds: i64,
}

/// 微信设置本地草稿，由四个接口的数据组装而成
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WechatDraft {
    pub secrets: WechatSecrets,
    pub login_callback: String,
    pub payment_callback: String,
    /// 支付有效期（秒）
    pub payment_expires: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_without_data() {
        let resp: ApiResponse<LoginResponse> = serde_json::from_str(r#"{"code":0,"msg":"ok"}"#).unwrap();
        assert_eq!(resp.code, 0);
        assert!(resp.data.is_none());

        let resp: ApiResponse<()> = serde_json::from_str(r#"{"code":1}"#).unwrap();
        assert_eq!(resp.code, 1);
        assert_eq!(resp.msg, "");
    }

    #[test]
    fn test_plan_wire_format() {
        let plan: Plan = serde_json::from_str(
            r#"{"id":3,"stype":"subscription","point":100,"expires":1,"unit":"month","price":990,"enable":true}"#,
        )
        .unwrap();
        assert_eq!(plan.id, 3);
        assert_eq!(plan.stype, PlanType::Subscription);
        assert_eq!(plan.duration_label(), "1月");
        assert!(plan.enable);
    }

    #[test]
    fn test_draft_serializes_without_id() {
        let value = serde_json::to_value(PlanDraft::default()).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["stype"], "subscription");
        assert_eq!(value["unit"], "month");
        assert_eq!(value["enable"], false);
    }

    #[test]
    fn test_draft_validation() {
        assert!(PlanDraft::default().validate().is_ok());

        let draft = PlanDraft {
            point: 0,
            ..PlanDraft::default()
        };
        assert!(matches!(draft.validate(), Err(Error::InvalidParam(_))));
    }
}
