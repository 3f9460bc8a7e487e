use log::error;
use tasmota_exporter::{config, server};

#[tokio::main]
async fn main() {
    env_logger::init();
    let app_config = config::Config::load();

    if let Err(err) = server::run(app_config).await {
        error!("error starting server: {}", err);
        std::process::exit(1);
    }
}
