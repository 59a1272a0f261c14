//! 认证上下文
//!
//! 进程内唯一的会话持有者：启动时从 [`TokenStore`] 恢复一次，之后通过克隆句柄注入到
//! 各个资源钩子与路由。每次修改同时写入持久化存储和内存状态，并向所有订阅者广播。

use crate::error::Result;
use crate::token_store::TokenStore;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

struct Inner {
    store: Arc<dyn TokenStore>,
    state: watch::Sender<Option<String>>,
}

/// 认证上下文句柄，克隆后共享同一会话
#[derive(Clone)]
pub struct AuthContext {
    inner: Arc<Inner>,
}

impl AuthContext {
    /// 用存储中已有的令牌构造上下文
    pub fn restore(store: Arc<dyn TokenStore>) -> Self {
        let token = store.read();
        let (state, _) = watch::channel(token);
        Self {
            inner: Arc::new(Inner { store, state }),
        }
    }

    /// 当前令牌
    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// 设置令牌：`Some` 写入存储，`None` 清除存储
    ///
    /// 存储写入失败时内存状态保持不变。
    pub fn set_token(&self, token: Option<String>) -> Result<()> {
        let mut outcome = Ok(());
        self.inner.state.send_if_modified(|current| {
            let persisted = match &token {
                Some(value) => self.inner.store.write(value),
                None => self.inner.store.clear(),
            };
            if let Err(e) = persisted {
                outcome = Err(e);
                return false;
            }
            if *current == token {
                return false;
            }
            *current = token.clone();
            true
        });
        outcome
    }

    /// 登出
    pub fn clear(&self) -> Result<()> {
        self.set_token(None)
    }

    /// 请求返回 401 后调用：仅当当前令牌仍是失败请求所携带的令牌时才清除
    ///
    /// 返回是否真的发生了清除。多个并发请求同时 401 时只有第一个返回 `true`，
    /// 失败请求之后重新登录得到的新令牌也不会被误清。
    ///
    /// 与 [`set_token`](Self::set_token) 不同，存储清除失败时内存状态仍然清空：服务端已拒绝
    /// 该令牌，继续持有只会让后续请求全部 401。存储中的残留令牌在下次启动恢复后同样会被拒绝并清除。
    pub fn invalidate(&self, failed_token: &str) -> bool {
        let cleared = self.inner.state.send_if_modified(|current| {
            if current.as_deref() != Some(failed_token) {
                return false;
            }
            if let Err(e) = self.inner.store.clear() {
                warn!("Failed to clear persisted token: {}", e);
            }
            *current = None;
            true
        });
        if cleared {
            info!("Session invalidated by server, login required");
        }
        cleared
    }

    /// 订阅会话变化
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.inner.state.subscribe()
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::token_store::{MemoryTokenStore, MockTokenStore};
    use mockall::predicate::eq;

    #[test]
    fn test_restore_from_store() {
        let ctx = AuthContext::restore(Arc::new(MemoryTokenStore::with_token("tk")));
        assert_eq!(ctx.token().as_deref(), Some("tk"));
        assert!(ctx.is_logged_in());

        let ctx = AuthContext::restore(Arc::new(MemoryTokenStore::new()));
        assert!(!ctx.is_logged_in());
    }

    #[test]
    fn test_set_token_mirrors_to_store() {
        let mut store = MockTokenStore::new();
        store.expect_read().times(1).returning(|| None);
        store
            .expect_write()
            .with(eq("tk"))
            .times(1)
            .returning(|_| Ok(()));
        store.expect_clear().times(1).returning(|| Ok(()));

        let ctx = AuthContext::restore(Arc::new(store));
        ctx.set_token(Some("tk".to_string())).unwrap();
        assert_eq!(ctx.token().as_deref(), Some("tk"));
        ctx.clear().unwrap();
        assert_eq!(ctx.token(), None);
    }

    #[test]
    fn test_store_failure_keeps_memory_state() {
        let mut store = MockTokenStore::new();
        store.expect_read().returning(|| None);
        store.expect_write().returning(|_| {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        });

        let ctx = AuthContext::restore(Arc::new(store));
        assert!(ctx.set_token(Some("tk".to_string())).is_err());
        assert_eq!(ctx.token(), None);
    }

    #[test]
    fn test_invalidate_clears_once() {
        let mut store = MockTokenStore::new();
        store.expect_read().returning(|| Some("tk".to_string()));
        store.expect_clear().times(1).returning(|| Ok(()));

        let ctx = AuthContext::restore(Arc::new(store));
        assert!(ctx.invalidate("tk"));
        assert!(!ctx.invalidate("tk"));
        assert_eq!(ctx.token(), None);
    }

    #[test]
    fn test_invalidate_clears_memory_when_store_fails() {
        let mut store = MockTokenStore::new();
        store.expect_read().returning(|| Some("tk".to_string()));
        store.expect_clear().times(1).returning(|| {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        });

        let ctx = AuthContext::restore(Arc::new(store));
        let mut rx = ctx.subscribe();
        assert!(ctx.invalidate("tk"));
        assert_eq!(ctx.token(), None);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), None);
    }

    #[test]
    fn test_invalidate_ignores_stale_token() {
        let ctx = AuthContext::restore(Arc::new(MemoryTokenStore::with_token("new")));
        assert!(!ctx.invalidate("old"));
        assert_eq!(ctx.token().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let ctx = AuthContext::restore(Arc::new(MemoryTokenStore::new()));
        let mut rx = ctx.subscribe();

        ctx.set_token(Some("tk".to_string())).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_deref(), Some("tk"));

        ctx.invalidate("tk");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), None);
    }
}
