use shared::error::AppError;
use thiserror::Error;

/// 服务器启动/运行错误
///
/// HTTP 请求级错误使用 [`AppError`]；这里只覆盖进程生命周期。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("初始化失败: {0}")]
    Startup(#[from] AppError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
