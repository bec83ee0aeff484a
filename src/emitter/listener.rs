use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use super::Arg;

/// Результат вызова обработчика. `Err` перенаправляется в событие `error`.
pub type HandlerResult = anyhow::Result<()>;

/// Идентификатор записи в реестре. Уникален в пределах одного эмиттера.
pub type ListenerId = u64;

/// Тип замыкания-обработчика.
pub type ListenerFn = dyn Fn(&[Arg]) -> HandlerResult + Send + Sync;

/// Приведение возвращаемого значения замыкания к [`HandlerResult`].
///
/// Позволяет регистрировать как `|args| { ... }` без результата, так и
/// обработчики, возвращающие `Result<(), E>`.
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

/// Обработчик события.
///
/// Дешёвая в клонировании ссылка на замыкание. Идентичность определяется
/// адресом аллокации: клоны одного `Listener` равны друг другу, два
/// `Listener`, созданные из одинаковых замыканий, не равны. По этой
/// идентичности выполняется `off`.
#[derive(Clone)]
pub struct Listener {
    inner: Arc<ListenerFn>,
}

/// Параметры регистрации.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Одноразовый обработчик: снимается перед первым вызовом.
    pub once: bool,
}

/// Запись реестра.
///
/// Вид записи фиксируется при регистрации. Для одноразовой записи флаг
/// `fired` выставляет dispatch; повторный вызов той же записи (например, из
/// вложенного `emit`) пропускается.
pub(crate) enum Entry {
    Persistent {
        id: ListenerId,
        listener: Listener,
    },
    OneShot {
        id: ListenerId,
        listener: Listener,
        fired: AtomicBool,
    },
}

/// Внешнее представление записи реестра (аналог "обёрнутого" обработчика).
///
/// Возвращается из [`Emitter::raw_listeners`](super::Emitter::raw_listeners)
/// и принимается [`Emitter::off_raw`](super::Emitter::off_raw), который
/// снимает именно эту запись, а не все записи с тем же обработчиком.
#[derive(Clone)]
pub struct RawListener {
    entry: Arc<Entry>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Listener {
    /// Создаёт обработчик из замыкания.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&[Arg]) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        Self {
            inner: Arc::new(move |args: &[Arg]| f(args).into_handler_result()),
        }
    }

    /// Вызывает обработчик напрямую, минуя эмиттер.
    pub fn call(
        &self,
        args: &[Arg],
    ) -> HandlerResult {
        (self.inner)(args)
    }

    /// Проверяет, что оба значения ссылаются на одну и ту же аллокацию.
    pub fn ptr_eq(
        &self,
        other: &Listener,
    ) -> bool {
        // Сравниваем только адрес данных: vtable у одного замыкания может
        // различаться между единицами кодогенерации.
        std::ptr::eq(
            Arc::as_ptr(&self.inner) as *const (),
            Arc::as_ptr(&other.inner) as *const (),
        )
    }
}

impl Entry {
    pub(crate) fn persistent(
        id: ListenerId,
        listener: Listener,
    ) -> Self {
        Self::Persistent { id, listener }
    }

    pub(crate) fn one_shot(
        id: ListenerId,
        listener: Listener,
    ) -> Self {
        Self::OneShot {
            id,
            listener,
            fired: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> ListenerId {
        match self {
            Self::Persistent { id, .. } | Self::OneShot { id, .. } => *id,
        }
    }

    pub(crate) fn listener(&self) -> &Listener {
        match self {
            Self::Persistent { listener, .. } | Self::OneShot { listener, .. } => listener,
        }
    }

    pub(crate) fn is_once(&self) -> bool {
        matches!(self, Self::OneShot { .. })
    }

    /// Отмечает одноразовую запись как сработавшую.
    ///
    /// Возвращает `true`, если запись можно вызывать: постоянная запись
    /// всегда, одноразовая только при первом обращении.
    pub(crate) fn try_fire(&self) -> bool {
        match self {
            Self::Persistent { .. } => true,
            Self::OneShot { fired, .. } => !fired.swap(true, Ordering::AcqRel),
        }
    }

    pub(crate) fn has_fired(&self) -> bool {
        match self {
            Self::Persistent { .. } => false,
            Self::OneShot { fired, .. } => fired.load(Ordering::Acquire),
        }
    }
}

impl RawListener {
    pub(crate) fn new(entry: Arc<Entry>) -> Self {
        Self { entry }
    }

    /// Идентификатор записи в реестре.
    pub fn id(&self) -> ListenerId {
        self.entry.id()
    }

    /// Исходный обработчик, переданный при регистрации.
    pub fn listener(&self) -> &Listener {
        self.entry.listener()
    }

    pub fn is_once(&self) -> bool {
        self.entry.is_once()
    }

    /// Сработала ли одноразовая запись (для постоянной всегда `false`).
    pub fn has_fired(&self) -> bool {
        self.entry.has_fired()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl PartialEq for Listener {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Listener({:p})", Arc::as_ptr(&self.inner) as *const ())
    }
}

impl PartialEq for RawListener {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.entry, &other.entry)
    }
}

impl fmt::Debug for RawListener {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("RawListener")
            .field("id", &self.id())
            .field("listener", self.listener())
            .field("once", &self.is_once())
            .field("fired", &self.has_fired())
            .finish()
    }
}
