//! 订阅方案资源
//!
//! 本地列表只是服务端数据的缓存：每次增删改成功后代数加一并整体重新拉取，
//! 不做乐观合并。

use crate::client::AdminClient;
use crate::error::{Error, Result};
use crate::types::{DeletePlansRequest, Plan, PlanDraft};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

const PLAN_PATH: &str = "/subscription/plan";

fn enable_path(id: i64) -> String {
    format!("{}/{}/enable", PLAN_PATH, id)
}

fn disable_path(id: i64) -> String {
    format!("{}/{}/disable", PLAN_PATH, id)
}

/// 资源加载状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug)]
struct PlanState {
    status: LoadStatus,
    /// 每次变更成功后递增
    generation: u64,
    /// 当前列表来自哪一代的拉取
    applied: u64,
    plans: Vec<Plan>,
}

/// 订阅方案列表及其变更操作
#[derive(Clone)]
pub struct SubscriptionPlans {
    client: AdminClient,
    state: Arc<RwLock<PlanState>>,
}

impl SubscriptionPlans {
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(PlanState {
                status: LoadStatus::Idle,
                generation: 0,
                applied: 0,
                plans: Vec::new(),
            })),
        }
    }

    /// 拉取完整列表并替换本地缓存
    ///
    /// 失败时保留上一次的列表。若本次拉取开始后已有更新一代的结果落地，本次结果被丢弃，
    /// 失败也不会改写加载状态。
    pub async fn list(&self) -> Result<Vec<Plan>> {
        let generation = {
            let mut state = self.state.write().await;
            state.status = LoadStatus::Loading;
            state.generation
        };

        let token = self.client.auth().token();
        let fetched = self
            .client
            .http()
            .get::<Vec<Plan>>(PLAN_PATH, token.as_deref())
            .await;

        let mut state = self.state.write().await;
        match fetched {
            Ok(plans) => {
                if generation < state.applied {
                    debug!(
                        "Discarding plan list of generation {} (already at {})",
                        generation, state.applied
                    );
                } else {
                    debug!("Loaded {} plans at generation {}", plans.len(), generation);
                    state.applied = generation;
                    state.plans = plans;
                    state.status = LoadStatus::Loaded;
                }
                Ok(state.plans.clone())
            }
            Err(e) => {
                if generation < state.applied {
                    debug!(
                        "Ignoring failed plan fetch of generation {} (already at {})",
                        generation, state.applied
                    );
                } else {
                    state.status = LoadStatus::Failed(e.to_string());
                }
                drop(state);
                Err(self.client.recover(e, token.as_deref(), "加载订阅方案失败"))
            }
        }
    }

    /// 新增方案，成功后重新拉取。新方案只会在重新拉取成功后出现。
    pub async fn add(&self, draft: &PlanDraft) -> Result<Vec<Plan>> {
        if let Err(e) = draft.validate() {
            return Err(self.client.recover(e, None, "新增订阅方案失败"));
        }

        let token = self.client.auth().token();
        self.client
            .http()
            .post(PLAN_PATH, draft, token.as_deref())
            .await
            .map_err(|e| self.client.recover(e, token.as_deref(), "新增订阅方案失败"))?;

        info!("Subscription plan added");
        self.refetch().await
    }

    /// 按 id 批量删除，一次请求
    pub async fn remove<I>(&self, ids: I) -> Result<Vec<Plan>>
    where
        I: IntoIterator<Item = i64>,
    {
        let ids: BTreeSet<i64> = ids.into_iter().collect();
        if ids.is_empty() {
            let e = Error::InvalidParam("no plan id given".to_string());
            return Err(self.client.recover(e, None, "删除订阅方案失败"));
        }

        let request = DeletePlansRequest {
            ids: ids.into_iter().collect(),
        };
        let token = self.client.auth().token();
        self.client
            .http()
            .delete(PLAN_PATH, &request, token.as_deref())
            .await
            .map_err(|e| self.client.recover(e, token.as_deref(), "删除订阅方案失败"))?;

        info!("Subscription plans removed: {:?}", request.ids);
        self.refetch().await
    }

    /// 启用或停用方案，分别调用 enable / disable 接口
    pub async fn set_enabled(&self, id: i64, enabled: bool) -> Result<Vec<Plan>> {
        let path = if enabled {
            enable_path(id)
        } else {
            disable_path(id)
        };

        let token = self.client.auth().token();
        self.client
            .http()
            .post_empty(&path, token.as_deref())
            .await
            .map_err(|e| self.client.recover(e, token.as_deref(), "修改订阅方案状态失败"))?;

        info!("Subscription plan {} enabled: {}", id, enabled);
        self.refetch().await
    }

    /// 当前缓存的列表
    pub async fn snapshot(&self) -> Vec<Plan> {
        self.state.read().await.plans.clone()
    }

    pub async fn status(&self) -> LoadStatus {
        self.state.read().await.status.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    async fn refetch(&self) -> Result<Vec<Plan>> {
        self.state.write().await.generation += 1;
        self.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_paths() {
        assert_eq!(enable_path(3), "/subscription/plan/3/enable");
        assert_eq!(disable_path(3), "/subscription/plan/3/disable");
    }
}
