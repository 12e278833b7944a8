use std::sync::Arc;

use shared::error::AppResult;
use shared::models::Role;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use super::{Config, ServerError};
use crate::auth::JwtService;
use crate::auth::password::hash_password;
use crate::db::DbService;
use crate::db::repository::user;
use crate::live::Broadcaster;
use crate::menu::MenuCatalog;
use crate::orders::OrderEngine;
use crate::tables::TableRegistry;
use crate::utils::AppError;
use crate::utils::validation::check_password;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是廉价 Clone (内部 Arc / 连接池句柄)。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | broadcaster | Broadcaster | 实时事件分发 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | orders | OrderEngine | 订单引擎 |
/// | menu | MenuCatalog | 菜单目录 |
/// | tables | TableRegistry | 桌台登记 |
/// | shutdown | CancellationToken | 关闭信号 (结束 WebSocket 会话) |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 数据库
    pub db: DbService,
    /// 实时事件广播
    pub broadcaster: Broadcaster,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    pub orders: OrderEngine,
    pub menu: MenuCatalog,
    pub tables: TableRegistry,
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 基于已打开的数据库构造状态
    pub fn new(config: Config, db: DbService) -> Self {
        let broadcaster = Broadcaster::new(config.ws_channel_capacity);
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

        Self {
            orders: OrderEngine::new(db.pool.clone(), broadcaster.clone()),
            menu: MenuCatalog::new(db.pool.clone(), broadcaster.clone()),
            tables: TableRegistry::new(db.pool.clone(), broadcaster.clone()),
            config,
            db,
            broadcaster,
            jwt_service,
            shutdown: CancellationToken::new(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 打开数据库并执行迁移 (`:memory:` 使用内存库)
    /// 2. 按需创建初始管理员
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        let db = if config.database_path == ":memory:" {
            DbService::in_memory().await?
        } else {
            DbService::new(&config.database_path).await?
        };

        let state = Self::new(config.clone(), db);
        state.bootstrap_admin().await?;
        Ok(state)
    }

    /// 没有任何管理员时，用 `ADMIN_USERNAME` / `ADMIN_PASSWORD` 创建一个
    pub async fn bootstrap_admin(&self) -> AppResult<()> {
        if user::count_by_role(self.pool(), Role::Admin).await? > 0 {
            return Ok(());
        }

        let (Some(username), Some(password)) =
            (&self.config.admin_username, &self.config.admin_password)
        else {
            tracing::warn!(
                "No admin account exists; set ADMIN_USERNAME and ADMIN_PASSWORD to create one"
            );
            return Ok(());
        };

        check_password(password, "ADMIN_PASSWORD")?;

        let hash = hash_password(password)
            .map_err(|e| AppError::internal(format!("Failed to hash admin password: {e}")))?;
        let admin = user::create(self.pool(), username.trim(), &hash, Role::Admin).await?;
        tracing::info!(user_id = admin.id, username = %admin.username, "Admin account created");
        Ok(())
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }
}
