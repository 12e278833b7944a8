//! 核心模块 - 配置、状态、服务器生命周期

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{Config, LogConfig};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
