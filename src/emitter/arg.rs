use std::{any::Any, fmt, sync::Arc};

use bytes::Bytes;
use fanout_error::HandlerFailure;

/// Аргумент события.
///
/// Эмиттер не знает типов полезной нагрузки: `emit` принимает срез `Arg`
/// произвольной длины, и каждый обработчик получает тот же срез.
#[derive(Clone)]
pub enum Arg {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Bytes(Bytes),
    Json(serde_json::Value),
    /// Сбой обработчика, переданный в событие `error`.
    Failure(Arc<HandlerFailure>),
    /// Произвольное значение; сравнивается по указателю.
    Any(Arc<dyn Any + Send + Sync>),
}

/// Собирает `Vec<Arg>` из значений, конвертируемых в [`Arg`].
///
/// ```
/// use fanout::{args, Arg};
///
/// let a = args![1, "two", 3.5];
/// assert_eq!(a[1], Arg::from("two"));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($value)),+]
    };
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Arg {
    /// Оборачивает произвольное значение в `Arg::Any`.
    pub fn any<T: Any + Send + Sync>(value: T) -> Self {
        Self::Any(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Число с плавающей точкой; целые значения приводятся к `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_failure(&self) -> Option<&Arc<HandlerFailure>> {
        match self {
            Self::Failure(f) => Some(f),
            _ => None,
        }
    }

    /// Downcast значения `Arg::Any` к конкретному типу.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Any(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Имя варианта (для логов).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Json(_) => "json",
            Self::Failure(_) => "failure",
            Self::Any(_) => "any",
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Преобразования
////////////////////////////////////////////////////////////////////////////////

impl From<()> for Arg {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Arg {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<Arc<str>> for Arg {
    fn from(v: Arc<str>) -> Self {
        Self::Str(v)
    }
}

impl From<Bytes> for Arg {
    fn from(v: Bytes) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<u8>> for Arg {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(v))
    }
}

impl From<serde_json::Value> for Arg {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl From<HandlerFailure> for Arg {
    fn from(v: HandlerFailure) -> Self {
        Self::Failure(Arc::new(v))
    }
}

impl From<Arc<HandlerFailure>> for Arg {
    fn from(v: Arc<HandlerFailure>) -> Self {
        Self::Failure(v)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl PartialEq for Arg {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            (Self::Failure(a), Self::Failure(b)) => Arc::ptr_eq(a, b),
            (Self::Any(a), Self::Any(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Self::Failure(v) => f.debug_tuple("Failure").field(v).finish(),
            Self::Any(_) => write!(f, "Any(..)"),
        }
    }
}
