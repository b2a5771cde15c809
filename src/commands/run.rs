//! `run`: the full utility.
//!
//! Sets up logging, connects to the broker, starts the consumer and then
//! hands the current task to the control loop until shutdown.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::amqp::{self, AmqpConsumer, AmqpPublisher, BrokerError};
use crate::config::Resolution;
use crate::context::{detect_hostname, AppContext};
use crate::control::{spawn_signal_bridge, ControlLoop};
use crate::error::Result;
use crate::watcher::logging::init_logging;
use crate::watcher::{Dispatcher, StdoutSink};
use crate::{banner, server_version, APP_NAME, APP_NAME_FULL, VERSION};

use super::filter_lines;

/// Print a startup failure to STDOUT and the log before it is returned.
fn fatal(e: BrokerError) -> BrokerError {
    println!("{}", e);
    error!(error = %e, "Startup failed");
    e
}

/// Run the utility until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns startup failures (logging, hostname, broker) and a consumer
/// failure that stopped the utility early.
pub async fn run(resolution: Resolution, verbose: bool) -> Result<()> {
    let Resolution {
        config,
        path,
        read_error,
    } = resolution;

    println!("Configuration OK, starting {}...", APP_NAME);
    let log_path = init_logging(&config, verbose)?;
    info!(config_file = %path.display(), "Configuration OK, starting {}...", APP_NAME);
    if let Some(e) = read_error {
        warn!(
            path = %path.display(),
            error = %e,
            "Could not open config file, using environment and defaults"
        );
    }

    print!("{}", banner());
    println!("{}\n", server_version());
    info!(version = VERSION, "{} starting up", APP_NAME);
    info!(log_file = %log_path.display(), "Logging with level: {}", config.log_level);

    let hostname = detect_hostname()?;
    info!("Detecting my hostname... {}", hostname);
    let ctx = Arc::new(AppContext::new(config, &hostname));

    println!("Connecting to RabbitMQ: {}", ctx.config.amqp_uri);
    debug!(uri = %ctx.config.amqp_uri, "Connecting to RabbitMQ");
    let connection = amqp::connect(&ctx.config.amqp_uri).await.map_err(fatal)?;

    let consumer = AmqpConsumer::start(&connection, ctx.consumer_options())
        .await
        .map_err(fatal)?;
    let publisher = AmqpPublisher::new(&connection).await.map_err(fatal)?;
    trace!(
        exchange_kind = %ctx.config.amqp_exchange_type,
        exchange = %ctx.config.amqp_pub_exchange,
        routing_key = %ctx.config.amqp_pub_routing_key,
        "Publisher configured"
    );

    for line in filter_lines(&ctx.filter) {
        println!("{}", line);
    }
    info!(filters = %ctx.filter.summary(), "Filters configured");

    info!("{} system started. [READY]", APP_NAME_FULL);
    println!("{} system started.\n-----> [READY]", APP_NAME_FULL);

    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel(1);
    let bridge = spawn_signal_bridge(tx, shutdown.clone())?;

    let dispatcher = Arc::new(Dispatcher::stdout(ctx.filter.clone(), ctx.config.log_level));
    let consumer_shutdown = shutdown.clone();
    let consumer_task = tokio::spawn(async move {
        let result = consumer.run(dispatcher, consumer_shutdown.clone()).await;
        if let Err(e) = &result {
            println!("{}", e);
            consumer_shutdown.cancel();
        }
        result
    });

    ControlLoop::new(ctx.clone(), Arc::new(publisher), Arc::new(StdoutSink))
        .run(rx, shutdown.clone())
        .await;

    shutdown.cancel();
    bridge.await?;
    let consumed = consumer_task.await?;

    if let Err(e) = connection.close(200, "Shutting down").await {
        debug!(error = %e, "Connection close failed");
    }
    info!("{} stopped", APP_NAME);

    consumed?;
    Ok(())
}
