use cafe_server::core::LogConfig;
use cafe_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 1. 加载 .env
    let _ = dotenvy::dotenv();

    // 2. 先初始化日志，加载配置时的警告才能输出
    let log = LogConfig::from_env();
    init_logger(log.level.as_deref(), log.json, log.dir.as_deref());

    // 3. 加载配置
    let config = Config::from_env()?;

    tracing::info!(
        "☕ Cafe Server starting (env: {}, db: {})",
        config.environment,
        config.database_path
    );

    // 4. 初始化服务器状态 (数据库、迁移、管理员账号)
    let state = ServerState::initialize(&config).await?;

    // 5. 启动 HTTP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
