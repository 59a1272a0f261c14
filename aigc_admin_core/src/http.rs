//! HTTP 客户端
//!
//! 所有需要认证的请求遵循同一约定：
//! 1. 令牌缺失时直接返回 [`Error::NoAuth`]，不发起网络请求；
//! 2. 携带 `authorization: bearer <token>`，有请求体时为 JSON；
//! 3. 401 一律视为 [`Error::NoAuth`]，其他非 200 状态为 [`Error::Transport`]；
//! 4. 200 时解析响应信封，`code != 0` 为 [`Error::Application`]。

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::ApiResponse;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, warn};

/// 后台 API 的 HTTP 客户端
#[derive(Debug, Clone)]
pub struct HttpClient {
    config: ClientConfig,
    http_client: Client,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(!config.verify_tls);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET，返回信封中的 `data`
    pub async fn get<T>(&self, path: &str, token: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let token = token.ok_or(Error::NoAuth)?;
        let request = self.request(Method::GET, path).header(AUTHORIZATION, bearer(token));
        self.send::<T>(request, path)
            .await?
            .ok_or_else(|| Error::Decode(format!("No data in response from {}", path)))
    }

    /// 带 JSON 请求体的 POST，忽略响应 `data`
    pub async fn post<B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let token = token.ok_or(Error::NoAuth)?;
        let request = self
            .request(Method::POST, path)
            .header(AUTHORIZATION, bearer(token))
            .json(body);
        self.send::<IgnoredAny>(request, path).await.map(|_| ())
    }

    /// 无请求体的 POST
    pub async fn post_empty(&self, path: &str, token: Option<&str>) -> Result<()> {
        let token = token.ok_or(Error::NoAuth)?;
        let request = self.request(Method::POST, path).header(AUTHORIZATION, bearer(token));
        self.send::<IgnoredAny>(request, path).await.map(|_| ())
    }

    /// 带 JSON 请求体的 DELETE
    pub async fn delete<B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let token = token.ok_or(Error::NoAuth)?;
        let request = self
            .request(Method::DELETE, path)
            .header(AUTHORIZATION, bearer(token))
            .json(body);
        self.send::<IgnoredAny>(request, path).await.map(|_| ())
    }

    /// 不需要认证的 POST（仅登录使用），返回信封中的 `data`
    pub async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body);
        self.send::<T>(request, path)
            .await?
            .ok_or_else(|| Error::Decode(format!("No data in response from {}", path)))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client.request(method, self.config.endpoint(path))
    }

    async fn send<T>(&self, request: RequestBuilder, path: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to connect to {}: {}", path, e)))?;

        let status = response.status();
        debug!("{} -> {}", path, status);

        if status == StatusCode::UNAUTHORIZED {
            warn!("Unauthorized response from {}", path);
            return Err(Error::NoAuth);
        }
        if status != StatusCode::OK {
            return Err(Error::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let api_response: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("Failed to parse response from {}: {}", path, e)))?;

        if api_response.code != 0 {
            return Err(Error::Application {
                code: api_response.code,
                msg: api_response.msg,
            });
        }

        Ok(api_response.data)
    }
}

fn bearer(token: &str) -> String {
    format!("bearer {}", token)
}
