//! Синхронный эмиттер событий.
//!
//! Модуль реализует внутрипроцессный publish/subscribe: реестр обработчиков
//! по именам событий и синхронную рассылку.
//!
//! - `emitter`: [`Emitter`]: регистрация, снятие и рассылка.
//! - `registry` (приватный): упорядоченные списки записей по событиям.
//! - `listener`: [`Listener`], [`RawListener`] и записи реестра.
//! - `arg`: [`Arg`], аргументы события.
//! - `limits`: [`MaxListeners`], рекомендательный лимит слушателей.
//! - `stats`: счётчики эмиттера.

pub mod arg;
#[allow(clippy::module_inception)]
pub mod emitter;
pub mod limits;
pub mod listener;
mod registry;
pub mod stats;

use std::sync::Arc;

/// Имя события. Эмиттер хранит одну копию имени на событие, пока у
/// события есть слушатели.
pub type EventName = Arc<str>;

pub use arg::*;
pub use emitter::*;
pub use limits::*;
pub(crate) use listener::Entry;
pub use listener::{
    HandlerResult, IntoHandlerResult, Listener, ListenerFn, ListenerId, ListenerOptions,
    RawListener,
};
pub(crate) use registry::Registry;
pub(crate) use stats::EmitterStats;
pub use stats::EmitterStatsSnapshot;
