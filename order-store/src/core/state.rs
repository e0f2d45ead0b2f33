use std::sync::Arc;

use crate::core::{Config, Result};
use crate::orders::{OrderStorage, OrdersService};

/// 服务器状态 - 持有所有服务的共享引用
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | orders | Arc<OrdersService> | 订单服务 |
///
/// 浅拷贝，每个 handler 持有一份
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub orders: Arc<OrdersService>,
}

impl ServerState {
    /// 打开 `work_dir` 下的订单数据库
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let storage = OrderStorage::open(config.db_path())?;
        tracing::info!(path = %config.db_path().display(), "Order database opened");
        Ok(Self::with_storage(config.clone(), storage))
    }

    /// 基于已打开的存储构建状态
    pub fn with_storage(config: Config, storage: OrderStorage) -> Self {
        Self {
            config,
            orders: Arc::new(OrdersService::new(storage)),
        }
    }
}
