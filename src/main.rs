use color_eyre::{eyre::eyre, Result};
use key_operator::config::TeleopConfig;
use key_operator::control::{ControlLoop, LogPublisher};
use key_operator::mapping::HELP_BANNER;
use key_operator::mqtt::MqttPublisher;
use key_operator::terminal::TerminalReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = TeleopConfig::default_path()?;
    let config = TeleopConfig::load(&config_path).await?;
    info!("Using config from {}", config_path.display());

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    // Terminal problems are fatal, nothing below works without raw input
    let reader = TerminalReader::create(Some(config.reader_settings()), shutdown.clone())
        .configure()
        .map_err(|e| eyre!("Terminal setup failed: {}", e))?;

    info!("\n{}", HELP_BANNER);

    let final_state = if config.mqtt.enabled {
        let publisher = MqttPublisher::connect(&config.mqtt)?;
        let control = ControlLoop::new(
            reader,
            publisher,
            Some(config.control_settings()),
            shutdown.clone(),
        );
        let result = control.run_with_publisher().await;
        let (state, publisher) = result?;
        publisher.shutdown().await;
        state
    } else {
        warn!("MQTT disabled, velocity commands are only logged");
        let publisher = LogPublisher::new(config.mqtt.topic.clone());
        let control = ControlLoop::new(
            reader,
            publisher,
            Some(config.control_settings()),
            shutdown.clone(),
        );
        control.run().await?
    };

    info!("Key operator finished, last command: {}", final_state);
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

// SIGINT outside the raw mode window arrives as a signal, inside it as a key
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                shutdown.cancel();
            }
            Err(e) => warn!("Unable to listen for interrupt signal: {}", e),
        }
    });
}
