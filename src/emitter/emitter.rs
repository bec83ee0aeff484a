use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

use fanout_error::{
    EmitterError, ErrorExt, HandlerFailure, LogLevel, MaxListenersExceeded, StatusCode,
};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, trace, warn};

use super::{
    Arg, EmitterStats, EmitterStatsSnapshot, Entry, EventName, Listener, ListenerOptions,
    MaxListeners, RawListener, Registry,
};
use crate::config::EmitterSettings;

/// Пишет диагностику на уровне, который задаёт код статуса.
macro_rules! log_at {
    ($code:expr, $($rest:tt)+) => {{
        let code: StatusCode = $code;
        match code.log_level() {
            LogLevel::Debug => debug!(code = %code, $($rest)+),
            LogLevel::Info => info!(code = %code, $($rest)+),
            LogLevel::Warn => warn!(code = %code, $($rest)+),
            LogLevel::Error => error!(code = %code, $($rest)+),
        }
    }};
}

/// Зарезервированное событие, в которое перенаправляются сбои обработчиков.
pub const ERROR_EVENT: &str = "error";

/// Синхронный эмиттер событий.
///
/// Объединяет реестр (имя события → упорядоченный список обработчиков) и
/// dispatch. `Emitter` это дешёвый в клонировании handle: все клоны работают
/// с одним реестром.
///
/// Поддерживает:
/// - Постоянные и одноразовые обработчики, вызываемые в порядке регистрации
/// - Снимок списка перед вызовом: изменения реестра из обработчиков
///   действуют только на следующие `emit`
/// - Изоляцию сбоев: ошибка или паника обработчика уходит в событие
///   [`ERROR_EVENT`] и не мешает остальным обработчикам
/// - Рекомендательный лимит слушателей с предупреждением в лог
///
/// Обработчик, которому нужен сам эмиттер, должен захватывать
/// [`WeakEmitter`], иначе возникнет цикл ссылок.
#[derive(Clone)]
pub struct Emitter {
    shared: Arc<Shared>,
}

/// Слабая ссылка на [`Emitter`].
#[derive(Clone)]
pub struct WeakEmitter {
    shared: Weak<Shared>,
}

struct Shared {
    /// Единственный мьютекс реестра. Никогда не удерживается во время
    /// вызова обработчиков.
    registry: Mutex<Registry>,
    max_listeners: RwLock<MaxListeners>,
    catch_panics: bool,
    next_id: AtomicU64,
    stats: EmitterStats,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Emitter {
    /// Создаёт пустой эмиттер с лимитом по умолчанию (10) и перехватом паник.
    pub fn new() -> Self {
        Self::from_parts(MaxListeners::default(), true)
    }

    /// Создаёт эмиттер из загруженных настроек.
    ///
    /// Возвращает `EmitterError::InvalidArgument`, если лимит слушателей
    /// отрицательный или `NaN`.
    pub fn with_settings(settings: &EmitterSettings) -> Result<Self, EmitterError> {
        let max_listeners = settings.validate().inspect_err(|err| {
            log_at!(err.status_code(), error = %err, "rejected emitter settings");
        })?;
        Ok(Self::from_parts(max_listeners, settings.catch_panics))
    }

    fn from_parts(
        max_listeners: MaxListeners,
        catch_panics: bool,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::new()),
                max_listeners: RwLock::new(max_listeners),
                catch_panics,
                next_id: AtomicU64::new(1),
                stats: EmitterStats::default(),
            }),
        }
    }

    /// Регистрирует обработчик с параметрами.
    ///
    /// Запись добавляется в конец списка события. Дедупликации нет:
    /// повторная регистрация того же обработчика создаёт новую запись.
    pub fn add_listener(
        &self,
        event: impl AsRef<str>,
        listener: &Listener,
        options: ListenerOptions,
    ) -> &Self {
        let event = event.as_ref();
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = if options.once {
            Entry::one_shot(id, listener.clone())
        } else {
            Entry::persistent(id, listener.clone())
        };

        let max_listeners = *self.shared.max_listeners.read();
        let warning = {
            let mut registry = self.shared.registry.lock();
            let (name, count) = registry.insert(event, entry);
            match max_listeners.limit() {
                Some(limit) if count > limit && registry.mark_warned(&name) => {
                    Some(MaxListenersExceeded {
                        event: name,
                        count,
                        limit,
                    })
                }
                _ => None,
            }
        };

        debug!(event, id, once = options.once, "listener registered");

        if let Some(warning) = warning {
            self.shared.stats.record_warning();
            log_at!(
                warning.status_code(),
                event = %warning.event,
                count = warning.count,
                limit = warning.limit,
                "{warning}"
            );
        }
        self
    }

    /// Регистрирует постоянный обработчик.
    pub fn on(
        &self,
        event: impl AsRef<str>,
        listener: &Listener,
    ) -> &Self {
        self.add_listener(event, listener, ListenerOptions { once: false })
    }

    /// Регистрирует одноразовый обработчик.
    ///
    /// Запись снимается из реестра перед вызовом обработчика, поэтому
    /// обработчик может снова подписаться на то же событие.
    pub fn once(
        &self,
        event: impl AsRef<str>,
        listener: &Listener,
    ) -> &Self {
        self.add_listener(event, listener, ListenerOptions { once: true })
    }

    /// Снимает все записи события с этим обработчиком (и постоянные, и
    /// одноразовые). Без совпадений ничего не делает.
    pub fn off(
        &self,
        event: impl AsRef<str>,
        listener: &Listener,
    ) -> &Self {
        let event = event.as_ref();
        // Снятые записи освобождаются после мьютекса: `Drop` захваченного
        // состояния может снова обратиться к эмиттеру.
        let removed = self.shared.registry.lock().remove_matching(event, listener);
        if !removed.is_empty() {
            debug!(event, removed = removed.len(), "listener removed");
        }
        self
    }

    /// Синоним [`Emitter::off`].
    pub fn remove_listener(
        &self,
        event: impl AsRef<str>,
        listener: &Listener,
    ) -> &Self {
        self.off(event, listener)
    }

    /// Снимает ровно одну запись, полученную из
    /// [`Emitter::raw_listeners`].
    pub fn off_raw(
        &self,
        event: impl AsRef<str>,
        raw: &RawListener,
    ) -> &Self {
        let event = event.as_ref();
        let removed = self.shared.registry.lock().remove_entry(event, raw.id());
        if removed.is_some() {
            debug!(event, id = raw.id(), "listener entry removed");
        }
        self
    }

    /// С именем события снимает все его записи, без имени очищает
    /// весь реестр.
    pub fn remove_all_listeners(
        &self,
        event: Option<&str>,
    ) -> &Self {
        let removed = {
            let mut registry = self.shared.registry.lock();
            match event {
                Some(event) => registry.clear_event(event),
                None => registry.clear(),
            }
        };
        debug!(
            event = event.unwrap_or("*"),
            removed = removed.len(),
            "listeners cleared"
        );
        self
    }

    /// Синхронно вызывает все обработчики события.
    ///
    /// Работает в два этапа:
    /// 1. Под мьютексом копирует текущий список записей
    /// 2. Без мьютекса вызывает каждую запись копии в порядке регистрации
    ///
    /// Одноразовая запись снимается из реестра непосредственно перед своим
    /// вызовом. Сбой обработчика перенаправляется в [`ERROR_EVENT`].
    ///
    /// Возвращает `true`, если на момент копирования у события были
    /// слушатели, независимо от исхода их вызова.
    pub fn emit(
        &self,
        event: impl AsRef<str>,
        args: &[Arg],
    ) -> bool {
        let event = event.as_ref();
        let stats = &self.shared.stats;
        stats.record_emit();

        let snapshot = self.shared.registry.lock().snapshot(event);
        let Some((name, snapshot)) = snapshot else {
            trace!(event, "emit without listeners");
            return false;
        };
        stats.record_delivered();
        trace!(event, listeners = snapshot.len(), args = args.len(), "emit");

        for entry in &snapshot {
            if !entry.try_fire() {
                continue;
            }
            if entry.is_once() {
                let removed = self.shared.registry.lock().remove_entry(&name, entry.id());
                drop(removed);
            }
            if let Err(failure) = self.invoke(&name, entry.listener(), args) {
                self.route_failure(&name, failure);
            }
        }
        true
    }

    fn invoke(
        &self,
        event: &EventName,
        listener: &Listener,
        args: &[Arg],
    ) -> Result<(), HandlerFailure> {
        let result = if self.shared.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.call(args))) {
                Ok(result) => result,
                Err(payload) => return Err(HandlerFailure::panicked(event.clone(), &*payload)),
            }
        } else {
            listener.call(args)
        };
        result.map_err(|err| HandlerFailure::returned(event.clone(), err))
    }

    fn route_failure(
        &self,
        event: &EventName,
        failure: HandlerFailure,
    ) {
        let stats = &self.shared.stats;
        stats.record_failure();

        // Сбой обработчика самого `error` повторно не публикуется.
        if &**event == ERROR_EVENT {
            stats.record_unhandled();
            log_at!(
                StatusCode::ErrorListenerFailed,
                error = %failure,
                "error listener failed; failure dropped"
            );
            return;
        }

        log_at!(
            failure.status_code(),
            event = %event,
            error = %failure,
            "listener failed; re-emitting as error event"
        );
        let failure = Arc::new(failure);
        if !self.emit(ERROR_EVENT, &[Arg::Failure(failure.clone())]) {
            stats.record_unhandled();
            log_at!(
                StatusCode::UnhandledFailure,
                event = %event,
                error = %failure,
                "unhandled listener failure: no `error` listener"
            );
        }
    }

    /// Точное число записей события (постоянных и одноразовых).
    pub fn listener_count(
        &self,
        event: impl AsRef<str>,
    ) -> usize {
        self.shared.registry.lock().count(event.as_ref())
    }

    pub fn has_listeners(
        &self,
        event: impl AsRef<str>,
    ) -> bool {
        self.shared.registry.lock().contains(event.as_ref())
    }

    /// Имена событий, у которых есть хотя бы один слушатель, в
    /// лексикографическом порядке.
    pub fn event_names(&self) -> Vec<EventName> {
        self.shared.registry.lock().names()
    }

    /// Копия списка исходных обработчиков события.
    pub fn listeners(
        &self,
        event: impl AsRef<str>,
    ) -> Vec<Listener> {
        self.shared.registry.lock().listeners(event.as_ref())
    }

    /// Копия списка записей события (с признаком одноразовости).
    pub fn raw_listeners(
        &self,
        event: impl AsRef<str>,
    ) -> Vec<RawListener> {
        self.shared.registry.lock().raw_listeners(event.as_ref())
    }

    /// Устанавливает лимит слушателей на событие.
    ///
    /// Принимает `i32`, `i64`, `usize` и `f64` (`f64::INFINITY` означает отсутствие лимита).
    /// Отрицательное значение или `NaN` дают `EmitterError::InvalidArgument`.
    pub fn set_max_listeners<N>(
        &self,
        n: N,
    ) -> Result<&Self, EmitterError>
    where
        N: TryInto<MaxListeners, Error = EmitterError>,
    {
        let max_listeners = n.try_into().inspect_err(|err| {
            log_at!(err.status_code(), error = %err, "rejected max listeners value");
        })?;
        *self.shared.max_listeners.write() = max_listeners;
        debug!(%max_listeners, "max listeners updated");
        Ok(self)
    }

    pub fn max_listeners(&self) -> MaxListeners {
        *self.shared.max_listeners.read()
    }

    /// Перехватываются ли паники обработчиков.
    pub fn catches_panics(&self) -> bool {
        self.shared.catch_panics
    }

    pub fn stats(&self) -> EmitterStatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn downgrade(&self) -> WeakEmitter {
        WeakEmitter {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl WeakEmitter {
    /// Возвращает `None`, если все сильные ссылки на эмиттер уже удалены.
    pub fn upgrade(&self) -> Option<Emitter> {
        self.shared.upgrade().map(|shared| Emitter { shared })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let registry = self.shared.registry.lock();
        f.debug_struct("Emitter")
            .field("events", &registry.names())
            .field("listeners", &registry.total())
            .field("max_listeners", &self.max_listeners())
            .field("catch_panics", &self.shared.catch_panics)
            .finish()
    }
}

impl fmt::Debug for WeakEmitter {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WeakEmitter")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}
