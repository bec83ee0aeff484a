use std::error::Error;

use crate::StatusCode;

/// Расширение для ошибок библиотеки (object-safe).
///
/// Связывает ошибку с [`StatusCode`], по которому эмиттер выбирает уровень
/// логирования диагностики.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Статус ошибки.
    fn status_code(&self) -> StatusCode;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Opaque;

    impl std::fmt::Display for Opaque {
        fn fmt(
            &self,
            f: &mut std::fmt::Formatter<'_>,
        ) -> std::fmt::Result {
            write!(f, "opaque")
        }
    }

    impl Error for Opaque {}

    impl ErrorExt for Opaque {
        fn status_code(&self) -> StatusCode {
            StatusCode::ListenerFailed
        }
    }

    /// Трейт используется как trait-объект.
    #[test]
    fn test_object_safe() {
        let err: Box<dyn ErrorExt> = Box::new(Opaque);
        assert_eq!(err.status_code(), StatusCode::ListenerFailed);
        assert_eq!(err.to_string(), "opaque");
    }
}
