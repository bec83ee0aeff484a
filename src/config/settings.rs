use config::{Config, ConfigError, Environment};
use fanout_error::EmitterError;
use serde::{Deserialize, Serialize};

use crate::emitter::{MaxListeners, DEFAULT_MAX_LISTENERS};

/// Префикс переменных окружения (`FANOUT_MAX_LISTENERS`, `FANOUT_CATCH_PANICS`).
pub const ENV_PREFIX: &str = "FANOUT";

/// Настройки эмиттера.
///
/// Лимит хранится числом, как его задаёт пользователь: `inf` отключает
/// лимит, отрицательные значения отклоняются при проверке.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterSettings {
    pub max_listeners: f64,
    pub catch_panics: bool,
}

impl EmitterSettings {
    /// Загружает настройки: значения по умолчанию, затем переменные
    /// окружения с префиксом `FANOUT_`.
    pub fn load() -> Result<Self, EmitterError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Загружает настройки из заданного источника окружения.
    pub fn from_environment(env: Environment) -> Result<Self, EmitterError> {
        let settings = Self::build(env).map_err(|e| EmitterError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn build(env: Environment) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            // Добавляем значения по умолчанию
            .set_default("max_listeners", DEFAULT_MAX_LISTENERS as f64)?
            .set_default("catch_panics", true)?
            .add_source(env)
            .build()?;

        // Десериализуем конфигурацию в нашу структуру
        cfg.try_deserialize()
    }

    /// Проверяет лимит и возвращает его в типизированном виде.
    pub fn validate(&self) -> Result<MaxListeners, EmitterError> {
        MaxListeners::try_from(self.max_listeners)
    }
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            max_listeners: DEFAULT_MAX_LISTENERS as f64,
            catch_panics: true,
        }
    }
}
