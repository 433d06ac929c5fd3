use offerguard::config::LoggingConfig;
use offerguard::runtime::Components;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so banner and modal output on stdout stays readable
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn,reqwest=warn", config.level)));

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    let console_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(console_layer)
        .init();
}

pub async fn print_registry_status(components: &Components) -> offerguard::Result<()> {
    let status = components.registry_status().await?;

    println!("Registry source:  {}", components.config.registry.url);
    match (status.entries, status.fetched_at) {
        (Some(entries), Some(fetched_at)) => {
            let age_hours = status.age_secs.unwrap_or_default() / 3600;
            println!("Cached bots:      {}", entries);
            println!("Fetched at:       {} ({}h ago)", fetched_at.to_rfc3339(), age_hours);
            if status.fresh {
                println!("State:            \x1b[32mfresh\x1b[0m");
            } else {
                println!("State:            \x1b[33mstale, refreshed on next check\x1b[0m");
            }
        }
        (Some(entries), None) => {
            println!("Cached bots:      {}", entries);
            println!("State:            \x1b[33mno fetch time recorded, refreshed on next check\x1b[0m");
        }
        _ => println!("State:            empty, fetched on next check"),
    }
    Ok(())
}
