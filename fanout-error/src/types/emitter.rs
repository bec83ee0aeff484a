use std::{any::Any, sync::Arc};

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки, возвращаемые вызывающему коду синхронно.
///
/// Никогда не повторяются автоматически: вызов нужно исправить.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitterError {
    /// Недопустимое значение аргумента (например, отрицательный лимит
    /// слушателей).
    #[error("invalid argument `{name}` = {value}: {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Ошибка загрузки или разбора конфигурации.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Причина сбоя обработчика.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// Обработчик вернул `Err`.
    #[error("{0:#}")]
    Error(anyhow::Error),
    /// Обработчик запаниковал; сохраняется текст паники.
    #[error("panicked: {0}")]
    Panic(String),
}

/// Сбой обработчика во время dispatch.
///
/// Не передаётся вызывающему `emit`: эмиттер превращает его в данные и
/// публикует как аргумент события `error`.
#[derive(Debug, Error)]
#[error("listener for event `{event}` failed: {cause}")]
pub struct HandlerFailure {
    event: Arc<str>,
    cause: FailureCause,
}

/// Диагностика: число слушателей события превысило лимит.
///
/// Только предупреждение, регистрацию не блокирует.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "possible listener leak: {count} listeners registered for event `{event}` \
     (limit {limit}); use set_max_listeners() to raise the bound"
)]
pub struct MaxListenersExceeded {
    pub event: Arc<str>,
    pub count: usize,
    pub limit: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl EmitterError {
    pub fn invalid_argument(
        name: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        Self::InvalidArgument {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

impl HandlerFailure {
    pub fn new(
        event: Arc<str>,
        cause: FailureCause,
    ) -> Self {
        Self { event, cause }
    }

    /// Сбой из ошибки, возвращённой обработчиком.
    pub fn returned(
        event: Arc<str>,
        error: anyhow::Error,
    ) -> Self {
        Self::new(event, FailureCause::Error(error))
    }

    /// Сбой из payload паники (`catch_unwind`).
    pub fn panicked(
        event: Arc<str>,
        payload: &(dyn Any + Send),
    ) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::new(event, FailureCause::Panic(message))
    }

    /// Имя события, во время которого обработчик упал.
    pub fn event(&self) -> &Arc<str> {
        &self.event
    }

    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }

    pub fn is_panic(&self) -> bool {
        matches!(self.cause, FailureCause::Panic(_))
    }

    /// Downcast исходной ошибки обработчика к конкретному типу.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        match &self.cause {
            FailureCause::Error(err) => err.downcast_ref::<E>(),
            FailureCause::Panic(_) => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// ErrorExt
////////////////////////////////////////////////////////////////////////////////

impl ErrorExt for EmitterError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } => StatusCode::InvalidArgs,
            Self::Config(_) => StatusCode::InvalidConfig,
        }
    }
}

impl ErrorExt for HandlerFailure {
    fn status_code(&self) -> StatusCode {
        match self.cause {
            FailureCause::Error(_) => StatusCode::ListenerFailed,
            FailureCause::Panic(_) => StatusCode::ListenerPanicked,
        }
    }
}

impl ErrorExt for MaxListenersExceeded {
    fn status_code(&self) -> StatusCode {
        StatusCode::ListenerLimitExceeded
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
