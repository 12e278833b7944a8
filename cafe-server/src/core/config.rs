use crate::auth::JwtConfig;

use super::ServerError;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | cafe.db | SQLite 数据库文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | JWT_SECRET | (开发环境随机) | 至少 32 字符 |
/// | JWT_EXPIRATION_MINUTES | 720 | 令牌有效期 |
/// | ADMIN_USERNAME / ADMIN_PASSWORD | - | 首次启动创建管理员 |
/// | LOG_LEVEL | cafe_server=info | 日志过滤 (RUST_LOG 优先) |
/// | LOG_JSON | false | JSON 日志 |
/// | LOG_DIR | - | 日志文件目录 (按天滚动) |
/// | WS_PING_INTERVAL_SECS | 30 | WebSocket 心跳间隔 |
/// | WS_CHANNEL_CAPACITY | 64 | 每连接发送缓冲 |
/// | CORS_ALLOW_ORIGIN | * | 允许的来源 |
///
/// # 示例
///
/// ```ignore
/// DATABASE_PATH=/data/cafe.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 数据库路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 初始管理员账号
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub log: LogConfig,
    /// WebSocket 心跳间隔 (秒)
    pub ws_ping_interval_secs: u64,
    /// 每个 WebSocket 连接的发送缓冲大小
    pub ws_channel_capacity: usize,
    /// CORS 允许来源，未设置时允许任意来源
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self, ServerError> {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let jwt = JwtConfig::from_env(&environment)
            .map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "cafe.db".into()),
            http_port: parse_env("HTTP_PORT", 3000),
            environment,
            jwt,
            admin_username: non_empty_env("ADMIN_USERNAME"),
            admin_password: non_empty_env("ADMIN_PASSWORD"),
            log: LogConfig::from_env(),
            ws_ping_interval_secs: parse_env("WS_PING_INTERVAL_SECS", 30).max(1),
            ws_channel_capacity: parse_env("WS_CHANNEL_CAPACITY", 64).max(1),
            cors_allow_origin: non_empty_env("CORS_ALLOW_ORIGIN"),
        })
    }

    /// 测试配置：内存数据库、固定密钥
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            http_port: 0,
            environment: "test".into(),
            jwt: JwtConfig::with_secret("test-secret-that-is-long-enough-for-hs256"),
            admin_username: None,
            admin_password: None,
            log: LogConfig::default(),
            ws_ping_interval_secs: 30,
            ws_channel_capacity: 64,
            cors_allow_origin: None,
        }
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

/// 日志配置，须在 [`Config::from_env`] 之前加载并初始化
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogConfig {
    /// EnvFilter 语法，`RUST_LOG` 优先
    pub level: Option<String>,
    pub json: bool,
    /// 按天滚动的日志目录
    pub dir: Option<String>,
}

impl LogConfig {
    /// `LOG_LEVEL`, `LOG_JSON`, `LOG_DIR`
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        Self {
            level: non_empty("LOG_LEVEL"),
            json: non_empty("LOG_JSON")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(false),
            dir: non_empty("LOG_DIR"),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
