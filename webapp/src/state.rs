//! Web 服务共享状态

use common::config::AppConfig;
use common::errors::AppResult;
use dashboard::api::Backend;

/// 处理器共享的应用状态
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// MongoHero 后端 API 客户端
    pub backend: Backend,
}

impl AppState {
    /// 根据配置创建应用状态
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let backend = Backend::from_config(&config)?;
        Ok(Self { config, backend })
    }

    /// 慢查询默认分页大小
    pub fn slow_query_page_size(&self) -> Option<u32> {
        self.config.slow_query_page_size
    }
}
