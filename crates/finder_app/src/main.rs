use finder_app::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    finder_app::init_logging(&config)?;
    finder_app::server::serve(config).await
}
