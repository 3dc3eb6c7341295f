use tracing::Level;

use dspi_core::{targets, DashboardConfig};
use dspi_ui::logging::{init_logging, LogLevel, LogStore};
use dspi_ui::{run, Flags, UiResult};

fn main() -> UiResult {
    let config_path = DashboardConfig::config_path_from_env();
    let loaded = DashboardConfig::load(&config_path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        Ok(None) | Err(_) => DashboardConfig::default(),
    };

    let parsed_level = config.log_level.parse::<LogLevel>();
    let log_level = parsed_level.clone().unwrap_or_default();
    let log_store = LogStore::new(config.log_capacity);
    let reload_handle = init_logging(log_store.clone(), log_level);

    tracing::info!(target: targets::UI, "DSPI dashboard starting");
    match loaded {
        Ok(Some(_)) => tracing::info!(
            target: targets::CONFIG,
            path = %config_path.display(),
            "Config loaded"
        ),
        Ok(None) => tracing::info!(
            target: targets::CONFIG,
            path = %config_path.display(),
            "No config file, using defaults"
        ),
        Err(error) => tracing::error!(
            target: targets::CONFIG,
            detail = %error.technical_detail(),
            "{}; using defaults",
            error.user_summary()
        ),
    }
    if let Err(message) = parsed_level {
        tracing::warn!(target: targets::CONFIG, "{}; falling back to {}", message, log_level);
    }
    tracing::event!(
        target: targets::UI,
        Level::DEBUG,
        page_size = %config.default_page_size,
        data_path = %config.data_path.display(),
        "Logging infrastructure online"
    );

    run(Flags {
        log_store,
        reload_handle,
        log_level,
        config,
    })
}
