//! Загрузка `EmitterSettings` из реальных переменных окружения.
//!
//! Тесты меняют окружение процесса, поэтому выполняются последовательно.

use std::env;

use fanout::{Emitter, EmitterError, EmitterSettings, MaxListeners};
use serial_test::serial;

const MAX_VAR: &str = "FANOUT_MAX_LISTENERS";
const PANICS_VAR: &str = "FANOUT_CATCH_PANICS";

/// Снимает переменные при выходе из теста, даже если он упал.
struct EnvGuard(&'static [&'static str]);

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in self.0 {
            env::remove_var(var);
        }
    }
}

#[test]
#[serial]
fn test_load_defaults_without_env() {
    let _guard = EnvGuard(&[MAX_VAR, PANICS_VAR]);
    env::remove_var(MAX_VAR);
    env::remove_var(PANICS_VAR);

    let settings = EmitterSettings::load().unwrap();
    assert_eq!(settings, EmitterSettings::default());

    let emitter = Emitter::with_settings(&settings).unwrap();
    assert_eq!(emitter.max_listeners(), MaxListeners::Bounded(10));
    assert!(emitter.catches_panics());
}

#[test]
#[serial]
fn test_load_from_env() {
    let _guard = EnvGuard(&[MAX_VAR, PANICS_VAR]);
    env::set_var(MAX_VAR, "25");
    env::set_var(PANICS_VAR, "false");

    let settings = EmitterSettings::load().unwrap();
    assert_eq!(settings.max_listeners, 25.0);
    assert!(!settings.catch_panics);

    let emitter = Emitter::with_settings(&settings).unwrap();
    assert_eq!(emitter.max_listeners(), MaxListeners::Bounded(25));
    assert!(!emitter.catches_panics());
}

#[test]
#[serial]
fn test_load_unbounded_from_env() {
    let _guard = EnvGuard(&[MAX_VAR]);
    env::set_var(MAX_VAR, "inf");

    let settings = EmitterSettings::load().unwrap();
    assert_eq!(settings.validate(), Ok(MaxListeners::Unbounded));
}

#[test]
#[serial]
fn test_load_rejects_negative_bound() {
    let _guard = EnvGuard(&[MAX_VAR]);
    env::set_var(MAX_VAR, "-4");

    let err = EmitterSettings::load().unwrap_err();
    assert!(matches!(err, EmitterError::InvalidArgument { .. }));
}
