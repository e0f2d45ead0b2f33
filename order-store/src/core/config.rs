use std::path::PathBuf;

/// `GET /api/orders?limit=N` 的上限
pub const MAX_RECENT_ORDERS_LIMIT: usize = 1000;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data/order-store | 工作目录 (数据库文件) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (none) | 日志目录，设置后按天滚动写文件 |
/// | RECENT_ORDERS_LIMIT | 100 | 最近订单列表默认条数 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/java-joy HTTP_PORT=8080 cargo run -p order-store
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放 redb 数据库
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 最近订单列表默认条数
    pub recent_orders_limit: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data/order-store".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            recent_orders_limit: std::env::var("RECENT_ORDERS_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(100)
                .min(MAX_RECENT_ORDERS_LIMIT),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 订单数据库文件路径
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("orders.redb")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_overrides() {
        let config = Config::with_overrides("/tmp/java-joy-test", 0);
        assert_eq!(config.work_dir, "/tmp/java-joy-test");
        assert_eq!(config.http_port, 0);
        assert_eq!(
            config.db_path(),
            PathBuf::from("/tmp/java-joy-test/orders.redb")
        );
        assert!(config.recent_orders_limit > 0);
        assert!(config.recent_orders_limit <= MAX_RECENT_ORDERS_LIMIT);
    }
}
