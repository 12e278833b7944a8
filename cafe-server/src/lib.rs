//! Café Server - 咖啡馆扫码点单服务
//!
//! # 架构概述
//!
//! 顾客扫描桌台二维码、浏览菜单并匿名下单；店员和管理员通过认证接口
//! 管理订单、菜单和桌台。所有变更通过 `/ws` 实时推送。
//!
//! # 模块结构
//!
//! ```text
//! cafe-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色检查
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 连接池和仓储
//! ├── orders/        # 订单引擎、状态机、订单号
//! ├── menu/          # 菜单目录
//! ├── tables/        # 桌台登记
//! ├── live/          # 实时事件广播
//! └── utils/         # 日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod live;
pub mod menu;
pub mod orders;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use live::Broadcaster;
pub use orders::OrderEngine;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
