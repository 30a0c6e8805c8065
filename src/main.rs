use anyhow::Result;
use question_extract::utils::logging;
use question_extract::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 运行应用
    App::new(config).run().await?;

    Ok(())
}
