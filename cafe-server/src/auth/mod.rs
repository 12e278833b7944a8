//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`authenticate`] - 全局认证中间件 (宽松)
//! - [`require_roles`] - 路由组角色检查
//! - [`password`] - Argon2 密码哈希

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{ADMIN_ROLES, STAFF_ROLES, authenticate, require_roles};
