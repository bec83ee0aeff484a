use std::sync::atomic::{AtomicU64, Ordering};

/// Счётчики эмиттера.
#[derive(Debug, Default)]
pub(crate) struct EmitterStats {
    /// Общее количество вызовов `emit` (включая внутренние `error`)
    emit_count: AtomicU64,
    /// Вызовы `emit`, у которых на момент снимка были слушатели
    delivered_count: AtomicU64,
    /// Сбои обработчиков (ошибки и паники)
    failure_count: AtomicU64,
    /// Сбои, которые никто не обработал (нет слушателя `error`)
    unhandled_count: AtomicU64,
    /// Выданные предупреждения о превышении лимита слушателей
    warning_count: AtomicU64,
}

/// Снимок счётчиков эмиттера.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStatsSnapshot {
    pub emit_count: u64,
    pub delivered_count: u64,
    pub failure_count: u64,
    pub unhandled_count: u64,
    pub warning_count: u64,
}

impl EmitterStats {
    pub(crate) fn record_emit(&self) {
        self.emit_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unhandled(&self) {
        self.unhandled_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_warning(&self) {
        self.warning_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> EmitterStatsSnapshot {
        EmitterStatsSnapshot {
            emit_count: self.emit_count.load(Ordering::Relaxed),
            delivered_count: self.delivered_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            unhandled_count: self.unhandled_count.load(Ordering::Relaxed),
            warning_count: self.warning_count.load(Ordering::Relaxed),
        }
    }
}
