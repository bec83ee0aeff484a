//! Типы ошибок эмиттера.
//!
//! Сами типы живут в крейте `fanout-error`; модуль переэкспортирует их,
//! чтобы пользователям хватало зависимости на `fanout`.

pub use fanout_error::{
    EmitterError, ErrorExt, FailureCause, HandlerFailure, LogLevel,
    MaxListenersExceeded, StatusCode,
};
