//! 错误类型定义

use thiserror::Error;

/// 错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 未认证：令牌缺失，或服务端返回 401
    #[error("no authorization")]
    NoAuth,

    /// 传输错误：HTTP 状态码既不是 200 也不是 401
    #[error("HTTP {status}: {status_text}")]
    Transport { status: u16, status_text: String },

    /// 应用错误：HTTP 200 但响应信封中 code 非零
    #[error("API error (code {code}): {msg}")]
    Application { code: i64, msg: String },

    /// 网络错误（连接失败等，请求未得到响应）
    #[error("Network error: {0}")]
    Network(String),

    /// 响应体解析失败
    #[error("Decode error: {0}")]
    Decode(String),

    /// 参数错误
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 是否为未认证错误
    pub fn is_no_auth(&self) -> bool {
        matches!(self, Error::NoAuth)
    }
}

/// 结果类型
pub type Result<T> = std::result::Result<T, Error>;
