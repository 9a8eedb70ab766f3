//! Minimal host wiring: point the updater at an endpoint and let it poll.
//!
//! ```sh
//! UPDATE_URL=https://updates.example.com/latest cargo run --example run_updater
//! ```

use std::time::Duration;

use airlift_updater::{Updater, UpdaterConfig, UpdaterEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = UpdaterConfig {
        auto_update: true,
        auto_update_url: std::env::var("UPDATE_URL").unwrap_or_default(),
        direct_update: true,
        period_check_delay: Duration::from_secs(30),
        version_build: env!("CARGO_PKG_VERSION").to_string(),
        ..Default::default()
    };

    let updater = Updater::builder()
        .with_config(config)
        .with_data_dir("./target/airlift-demo")
        .with_builtin_dir("./target/airlift-demo/public")
        .build()?;

    let mut events = updater.subscribe();
    updater.start().await?;
    println!("device id: {}", updater.get_id());

    loop {
        match events.recv().await {
            Ok(UpdaterEvent::Download { percent, bundle }) => {
                println!("downloading {}: {}%", bundle.version_name, percent);
            }
            Ok(UpdaterEvent::UpdateAvailable { bundle }) => {
                println!("armed for next restart: {}", bundle.version_name);
            }
            Ok(UpdaterEvent::UpdateFailed { bundle }) => {
                println!("update failed: {}", bundle.version_name);
            }
            Ok(UpdaterEvent::MajorAvailable { version }) => {
                println!("major update blocked: {}", version);
            }
            Ok(UpdaterEvent::AppReloadRequested { path, .. }) => {
                println!("reload from {}", path.display());
                updater.notify_app_ready()?;
            }
            Err(err) => {
                eprintln!("event stream closed: {}", err);
                break;
            }
        }
    }

    updater.shutdown();
    Ok(())
}
