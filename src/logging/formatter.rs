use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::Layer as LayerTrait,
    registry::LookupSpan,
};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Build formatter layer на основе конфигурации.
///
/// Возвращаем boxed trait-объект, чтобы стереть конкретный тип формата
/// (json/pretty/compact) и writer-а (stdout/файл).
pub fn build_formatter<S, W>(
    config: &LoggingConfig,
    format: LogFormat,
    writer: W,
    with_ansi: bool,
) -> Box<dyn LayerTrait<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => {
            let json_fmt = fmt::format().json().with_current_span(true);
            let layer = fmt::layer()
                .event_format(json_fmt)
                .with_writer(writer)
                .with_ansi(with_ansi)
                .with_target(config.with_target)
                .with_thread_ids(config.with_thread_ids)
                .with_line_number(config.with_line_numbers);
            Box::new(layer)
        }
        LogFormat::Pretty => {
            let pretty_fmt = fmt::format().pretty();
            let layer = fmt::layer()
                .event_format(pretty_fmt)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(writer)
                .with_ansi(with_ansi)
                .with_target(config.with_target)
                .with_thread_ids(config.with_thread_ids)
                .with_line_number(config.with_line_numbers);
            Box::new(layer)
        }
        LogFormat::Compact => {
            let compact_fmt = fmt::format().compact();
            let layer = fmt::layer()
                .event_format(compact_fmt)
                .with_writer(writer)
                .with_ansi(with_ansi)
                .with_target(config.with_target)
                .with_thread_ids(config.with_thread_ids)
                .with_line_number(config.with_line_numbers);
            Box::new(layer)
        }
    }
}

/// Console layer (stdout) по конфигурации.
pub fn console_layer<S>(config: &LoggingConfig) -> Box<dyn LayerTrait<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    build_formatter(config, config.format, std::io::stdout, config.with_ansi)
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    #[derive(Clone)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn render(format: LogFormat) -> String {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let shared = SharedBuf(buf.clone());
        let config = LoggingConfig::default();
        let layer = build_formatter::<Registry, _>(&config, format, move || shared.clone(), false);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(event = "tick", count = 11, "listener limit exceeded");
        });

        let bytes = buf.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    /// JSON-формат выдаёт разбираемую строку с полями события.
    #[test]
    fn test_json_format() {
        let out = render(LogFormat::Json);
        let line: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["fields"]["message"], "listener limit exceeded");
        assert_eq!(line["fields"]["count"], 11);
    }

    #[test]
    fn test_compact_and_pretty_formats() {
        let compact = render(LogFormat::Compact);
        assert!(compact.contains("listener limit exceeded"));
        assert!(compact.contains("count=11"));

        let pretty = render(LogFormat::Pretty);
        assert!(pretty.contains("listener limit exceeded"));
    }

    /// Console layer собирается и регистрируется без паники.
    #[test]
    fn test_console_layer_registers() {
        let config = LoggingConfig {
            with_ansi: false,
            ..LoggingConfig::default()
        };
        let subscriber = Registry::default().with(console_layer(&config));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("console layer smoke test");
        });
    }
}
