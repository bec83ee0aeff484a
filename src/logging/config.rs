use std::{fmt, path::PathBuf, str::FromStr};

use fanout_error::EmitterError;
use serde::{Deserialize, Serialize};

/// Уровни, допустимые в `LoggingConfig::level`.
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Формат вывода логов.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Политика ротации файла логов.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// Конфигурация файлового sink.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FileSinkConfig {
    /// Каталог для файлов логов (создаётся при инициализации)
    pub dir: PathBuf,
    /// Префикс имени файла (`fanout.log.2025-10-04`)
    #[serde(default = "default_file_prefix")]
    pub file_name_prefix: String,
    #[serde(default)]
    pub rotation: Rotation,
    /// Формат записи в файл; ANSI-цвета в файле всегда выключены
    #[serde(default = "default_file_format")]
    pub format: LogFormat,
}

/// Конфигурация логирования.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Уровень для целей крейта (`info`) или полная директива
    /// `EnvFilter` (`fanout=debug,warn`)
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_true")]
    pub console_enabled: bool,
    #[serde(default = "default_true")]
    pub with_ansi: bool,
    #[serde(default = "default_true")]
    pub with_target: bool,
    #[serde(default)]
    pub with_thread_ids: bool,
    #[serde(default)]
    pub with_line_numbers: bool,
    #[serde(default)]
    pub file: Option<FileSinkConfig>,
}

impl LoggingConfig {
    /// Применяет переменные окружения `FANOUT_LOG_LEVEL` и
    /// `FANOUT_LOG_FORMAT` поверх значений конфигурации.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("FANOUT_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = std::env::var("FANOUT_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(e) => eprintln!("Ignoring FANOUT_LOG_FORMAT: {e}"),
            }
        }
    }

    /// Проверяет конфигурацию.
    ///
    /// Простой уровень должен быть одним из `trace..error`; полные
    /// директивы проверяются при сборке `EnvFilter`.
    pub fn validate(&self) -> Result<(), EmitterError> {
        let level = self.level.trim();
        if level.is_empty() {
            return Err(EmitterError::Config("log level is empty".to_string()));
        }
        if !self.is_directive() && !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(EmitterError::Config(format!("unknown log level '{level}'")));
        }
        if let Some(file) = &self.file {
            if file.file_name_prefix.is_empty() {
                return Err(EmitterError::Config(
                    "log file name prefix is empty".to_string(),
                ));
            }
        }
        if !self.console_enabled && self.file.is_none() {
            return Err(EmitterError::Config(
                "no log sink enabled (console disabled and no file configured)".to_string(),
            ));
        }
        Ok(())
    }

    /// Создаёт каталог файлового sink, если он задан.
    pub fn ensure_log_dir(&self) -> std::io::Result<()> {
        match &self.file {
            Some(file) => std::fs::create_dir_all(&file.dir),
            None => Ok(()),
        }
    }

    /// Директива для `EnvFilter`.
    ///
    /// Простой уровень применяется к целям крейта, остальные цели
    /// ограничиваются `warn`.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.trim();
        if self.is_directive() {
            level.to_string()
        } else {
            format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level.to_ascii_lowercase())
        }
    }

    fn is_directive(&self) -> bool {
        self.level.contains('=') || self.level.contains(',')
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            console_enabled: true,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            with_line_numbers: false,
            file: None,
        }
    }
}

impl FromStr for LogFormat {
    type Err = EmitterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(EmitterError::Config(format!("unknown log format '{other}'"))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_file_prefix() -> String {
    "fanout.log".to_string()
}

fn default_file_format() -> LogFormat {
    LogFormat::Json
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = LoggingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.build_filter_directive(), "warn,fanout=info");
    }

    /// Полная директива передаётся в `EnvFilter` как есть.
    #[test]
    fn test_full_directive_passthrough() {
        let config = LoggingConfig {
            level: "fanout=trace,hyper=off".to_string(),
            ..LoggingConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.build_filter_directive(), "fanout=trace,hyper=off");
    }

    #[test]
    fn test_invalid_configs() {
        let unknown = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(unknown.validate(), Err(EmitterError::Config(_))));

        let no_sink = LoggingConfig {
            console_enabled: false,
            ..LoggingConfig::default()
        };
        assert!(no_sink.validate().is_err());

        let empty_prefix = LoggingConfig {
            file: Some(FileSinkConfig {
                dir: PathBuf::from("logs"),
                file_name_prefix: String::new(),
                rotation: Rotation::Never,
                format: LogFormat::Compact,
            }),
            ..LoggingConfig::default()
        };
        assert!(empty_prefix.validate().is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" pretty ".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }

    /// Конфигурация читается из JSON с подстановкой значений по умолчанию.
    #[test]
    fn test_deserialize_with_defaults() {
        let config: LoggingConfig = serde_json::from_str(
            r#"{ "level": "debug", "file": { "dir": "/tmp/fanout-logs" } }"#,
        )
        .unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.console_enabled);

        let file = config.file.unwrap();
        assert_eq!(file.file_name_prefix, "fanout.log");
        assert_eq!(file.rotation, Rotation::Daily);
        assert_eq!(file.format, LogFormat::Json);
    }
}
