pub mod config;
mod filters;
mod formatter;
pub mod handle;

pub use config::{FileSinkConfig, LogFormat, LoggingConfig, Rotation};
pub use handle::LoggingHandle;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Инициализация логирования с конфигурацией.
///
/// Устанавливает глобальный subscriber: `EnvFilter` (`RUST_LOG` или
/// директива из конфигурации), console layer и, если задан, файловый
/// layer с ротацией. Повторный вызов возвращает ошибку.
pub fn init_logging(
    mut config: LoggingConfig
) -> Result<LoggingHandle, Box<dyn std::error::Error + Send + Sync>> {
    config.apply_env_overrides();
    config.validate()?;
    config.ensure_log_dir()?;

    let env_filter = filters::build_filter_from_config(&config);
    let mut layers = Vec::new();

    // Console layer
    if config.console_enabled {
        layers.push(formatter::console_layer(&config));
    }

    // File layer
    let file_guard = match &config.file {
        Some(file) => {
            let appender = RollingFileAppender::new(
                rotation(file.rotation),
                &file.dir,
                &file.file_name_prefix,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(formatter::build_formatter(&config, file.format, writer, false));
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        directive = %config.build_filter_directive(),
        format = %config.format,
        console_enabled = config.console_enabled,
        file_enabled = config.file.is_some(),
        "Logging system initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}

fn rotation(policy: Rotation) -> rolling::Rotation {
    match policy {
        Rotation::Minutely => rolling::Rotation::MINUTELY,
        Rotation::Hourly => rolling::Rotation::HOURLY,
        Rotation::Daily => rolling::Rotation::DAILY,
        Rotation::Never => rolling::Rotation::NEVER,
    }
}
