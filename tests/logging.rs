//! Инициализация глобального логирования.
//!
//! Глобальный subscriber ставится один раз на процесс, поэтому весь
//! сценарий собран в одном тесте.

use std::fs;

use fanout::{
    init_logging,
    logging::{FileSinkConfig, LogFormat, Rotation},
    Arg, Emitter, Listener, LoggingConfig,
};

#[test]
fn test_init_logging_writes_emitter_diagnostics_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");

    let config = LoggingConfig {
        level: "debug".to_string(),
        console_enabled: false,
        file: Some(FileSinkConfig {
            dir: log_dir.clone(),
            file_name_prefix: "fanout.log".to_string(),
            rotation: Rotation::Never,
            format: LogFormat::Json,
        }),
        ..LoggingConfig::default()
    };

    let handle = init_logging(config.clone()).unwrap();
    assert!(handle.has_file_sink());
    assert!(log_dir.is_dir());

    let emitter = Emitter::new();
    emitter.set_max_listeners(1).unwrap();
    emitter
        .on("job", &Listener::new(|_: &[Arg]| ()))
        .on(
            "job",
            &Listener::new(|_: &[Arg]| -> anyhow::Result<()> { anyhow::bail!("broken pipe") }),
        );
    emitter.emit("job", &[]);

    // Второй глобальный subscriber поставить нельзя.
    assert!(init_logging(config).is_err());

    handle.shutdown();

    let contents = fs::read_to_string(log_dir.join("fanout.log")).unwrap();
    assert!(contents.contains("Logging system initialized"));
    assert!(contents.contains("possible listener leak"));
    assert!(contents.contains("unhandled listener failure"));
    assert!(contents.contains("broken pipe"));
    for line in contents.lines().filter(|l| !l.is_empty()) {
        assert!(
            serde_json::from_str::<serde_json::Value>(line).is_ok(),
            "not a JSON line: {line}"
        );
    }
}
