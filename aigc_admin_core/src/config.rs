//! 客户端配置

use std::env;
use std::path::PathBuf;

/// 默认 API 前缀
pub const DEFAULT_BASE_PATH: &str = "/aigc/admin/api";

/// 会话文件名
const SESSION_FILE_NAME: &str = "session.json";

/// 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 服务器 URL
    pub server_url: String,
    /// API 前缀
    pub base_path: String,
    /// 请求超时（秒），`None` 表示不设超时
    pub timeout: Option<u64>,
    /// 是否验证 TLS 证书
    pub verify_tls: bool,
    /// 令牌持久化文件
    pub token_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:80".to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            timeout: None,
            verify_tls: true,
            token_path: default_token_path(),
        }
    }
}

impl ClientConfig {
    /// 从环境变量（以及 `.env` 文件）读取配置，缺省项取默认值
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        if let Ok(url) = env::var("AIGC_ADMIN_SERVER") {
            config.server_url = url;
        }
        if let Ok(base_path) = env::var("AIGC_ADMIN_BASE_PATH") {
            config.base_path = base_path;
        }
        if let Ok(timeout) = env::var("AIGC_ADMIN_TIMEOUT") {
            config.timeout = timeout.trim().parse().ok();
        }
        if let Ok(verify) = env::var("AIGC_ADMIN_VERIFY_TLS") {
            config.verify_tls = parse_bool(&verify).unwrap_or(true);
        }
        if let Ok(path) = env::var("AIGC_ADMIN_TOKEN_FILE") {
            config.token_path = PathBuf::from(path);
        }
        config
    }

    /// 拼接完整接口地址
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.server_url.trim_end_matches('/'),
            self.base_path.trim_end_matches('/'),
            path
        )
    }
}

fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("aigc-admin").join(SESSION_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".aigc-admin-{}", SESSION_FILE_NAME)))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
