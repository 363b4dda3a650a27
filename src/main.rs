use tracing_subscriber::EnvFilter;

use tsetmc_options::config::Config;
use tsetmc_options::pipeline;
use tsetmc_options::user_agent::random_source;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    pipeline::execute(&cfg, random_source()).await;
}
