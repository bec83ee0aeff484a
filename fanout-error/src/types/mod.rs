pub mod emitter;

// Публичный экспорт всех типов ошибок из вложенных модулей.
pub use emitter::*;
