use studio_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境 (dotenv + 日志)
    dotenv::dotenv().ok();
    init_logger();

    tracing::info!("Studio booking server starting...");

    // 2. 加载配置
    let config = Config::from_env();
    tracing::info!(
        timezone = %config.timezone,
        port = config.http_port,
        "Configuration loaded"
    );

    // 3. 初始化状态（数据库 + schema）
    let state = ServerState::initialize(&config).await?;

    // 4. 启动 HTTP 服务器 (Server::run 会自动启动后台任务)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e.into());
    }

    Ok(())
}
