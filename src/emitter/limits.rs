use std::fmt;

use fanout_error::EmitterError;
use serde::{Deserialize, Serialize};

/// Лимит по умолчанию для числа слушателей одного события.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Рекомендательный лимит слушателей на одно событие.
///
/// Превышение лимита не блокирует регистрацию: эмиттер только пишет
/// предупреждение. `Bounded(0)` отключает предупреждение так же, как
/// `Unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxListeners {
    Bounded(usize),
    Unbounded,
}

impl MaxListeners {
    /// Возвращает числовой лимит, если предупреждение включено.
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Bounded(0) | Self::Unbounded => None,
            Self::Bounded(n) => Some(n),
        }
    }

    /// Превышает ли `count` лимит.
    pub fn is_exceeded_by(
        self,
        count: usize,
    ) -> bool {
        self.limit().is_some_and(|limit| count > limit)
    }

    /// Значение в виде числа (`f64::INFINITY` для `Unbounded`).
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Bounded(n) => n as f64,
            Self::Unbounded => f64::INFINITY,
        }
    }
}

impl Default for MaxListeners {
    fn default() -> Self {
        Self::Bounded(DEFAULT_MAX_LISTENERS)
    }
}

impl fmt::Display for MaxListeners {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{n}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Преобразования с проверкой
////////////////////////////////////////////////////////////////////////////////

const NEGATIVE: &str = "must be a non-negative number";

impl TryFrom<f64> for MaxListeners {
    type Error = EmitterError;

    /// Отрицательные значения и `NaN` отклоняются, `+inf` означает
    /// отсутствие лимита, дробная часть отбрасывается.
    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if n.is_nan() || n < 0.0 {
            return Err(EmitterError::invalid_argument("n", n, NEGATIVE));
        }
        if n.is_infinite() || n >= usize::MAX as f64 {
            return Ok(Self::Unbounded);
        }
        Ok(Self::Bounded(n as usize))
    }
}

impl TryFrom<i64> for MaxListeners {
    type Error = EmitterError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        usize::try_from(n)
            .map(Self::Bounded)
            .map_err(|_| EmitterError::invalid_argument("n", n, NEGATIVE))
    }
}

impl TryFrom<i32> for MaxListeners {
    type Error = EmitterError;

    fn try_from(n: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(n))
    }
}

impl TryFrom<usize> for MaxListeners {
    type Error = EmitterError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Ok(Self::Bounded(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ten() {
        assert_eq!(MaxListeners::default(), MaxListeners::Bounded(10));
        assert_eq!(MaxListeners::default().as_f64(), 10.0);
    }

    #[test]
    fn test_exceeded() {
        let bound = MaxListeners::Bounded(2);
        assert!(!bound.is_exceeded_by(2));
        assert!(bound.is_exceeded_by(3));
        assert!(!MaxListeners::Unbounded.is_exceeded_by(usize::MAX));
        assert!(!MaxListeners::Bounded(0).is_exceeded_by(1_000));
    }

    #[test]
    fn test_try_from_float() {
        assert_eq!(MaxListeners::try_from(5.0), Ok(MaxListeners::Bounded(5)));
        assert_eq!(MaxListeners::try_from(5.9), Ok(MaxListeners::Bounded(5)));
        assert_eq!(
            MaxListeners::try_from(f64::INFINITY),
            Ok(MaxListeners::Unbounded)
        );
        assert!(MaxListeners::try_from(-1.0).is_err());
        assert!(MaxListeners::try_from(f64::NAN).is_err());
        assert!(MaxListeners::try_from(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_try_from_integers() {
        assert_eq!(MaxListeners::try_from(0i32), Ok(MaxListeners::Bounded(0)));
        assert_eq!(MaxListeners::try_from(20i64), Ok(MaxListeners::Bounded(20)));
        assert_eq!(MaxListeners::try_from(3usize), Ok(MaxListeners::Bounded(3)));

        let err = MaxListeners::try_from(-5i32).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument `n` = -5: must be a non-negative number"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(MaxListeners::Bounded(3).to_string(), "3");
        assert_eq!(MaxListeners::Unbounded.to_string(), "unbounded");
    }
}
