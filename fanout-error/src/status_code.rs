use std::fmt;

#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок эмиттера.
///
/// # Диапазоны:
/// - 2xxx: Ошибки аргументов и конфигурации
/// - 3xxx: Ошибки обработчиков (во время dispatch)
/// - 4xxx: Диагностика (предупреждения, не ошибки)
///
/// # Реализация:
/// - опционально: `strum` для `AsRefStr`/`EnumIter` (feature = "strum").
/// - опционально: `serde_repr` для сериализации в виде числового значения
///   (feature = "serde_repr").
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 2xxx: Аргументы/Конфигурация ===
    InvalidArgs = 2000,
    InvalidConfig = 2001,

    // === 3xxx: Обработчики ===
    ListenerFailed = 3000,
    ListenerPanicked = 3001,
    UnhandledFailure = 3002,
    /// Сбой обработчика события `error`; такой сбой больше никуда не уходит.
    ErrorListenerFailed = 3003,

    // === 4xxx: Диагностика ===
    ListenerLimitExceeded = 4000,
}

/// Уровень, на котором эмиттер пишет диагностику по коду статуса.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Рекомендуемый уровень логирования для данного кода.
    ///
    /// Сбой, доставленный слушателю `error`, уже обработан, поэтому пишется
    /// на `debug`. Потерянный сбой и превышение лимита пишутся на `warn`.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::ListenerFailed | Self::ListenerPanicked => LogLevel::Debug,
            Self::InvalidArgs | Self::InvalidConfig => LogLevel::Info,
            Self::UnhandledFailure | Self::ListenerLimitExceeded => LogLevel::Warn,
            Self::ErrorListenerFailed => LogLevel::Error,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        // Если включён feature "strum", используем human-readable имя (AsRefStr).
        // Иначе Debug-имя.
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
