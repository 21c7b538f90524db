use petmed_lib::config::AppConfig;

#[tokio::main]
async fn main() {
    petmed_lib::init_tracing();
    let config = AppConfig::from_env();

    if let Err(e) = petmed_lib::run(config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
