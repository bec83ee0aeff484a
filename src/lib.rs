//! In-process synchronous event emitter.
//!
//! Producers [`emit`](Emitter::emit) named events without knowing who listens;
//! consumers register [`Listener`]s with [`on`](Emitter::on) or
//! [`once`](Emitter::once) without knowing who publishes.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use fanout::{args, Arg, Emitter, Listener};
//!
//! let emitter = Emitter::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let log = seen.clone();
//! let listener = Listener::new(move |args: &[Arg]| {
//!     log.lock().unwrap().push(args.to_vec());
//! });
//!
//! emitter.on("data", &listener);
//! assert!(emitter.emit("data", &args!["hello", 42]));
//! assert!(!emitter.emit("nobody-listens", &[]));
//!
//! emitter.off("data", &listener);
//! assert_eq!(emitter.listener_count("data"), 0);
//! assert_eq!(seen.lock().unwrap().len(), 1);
//! ```

/// Emitter configuration loading.
pub mod config;
/// Registry + dispatcher: Emitter, Listener, Arg, MaxListeners.
pub mod emitter;
/// Common error types: invalid arguments, handler failures, diagnostics.
pub mod error;
/// Logging setup (filters, formats, sinks).
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Settings.
pub use config::EmitterSettings;
/// Emitter API.
pub use emitter::{
    Arg, Emitter, EmitterStatsSnapshot, EventName, HandlerResult, IntoHandlerResult, Listener,
    ListenerId, ListenerOptions, MaxListeners, RawListener, WeakEmitter, DEFAULT_MAX_LISTENERS,
    ERROR_EVENT,
};
/// Operation errors and result types.
pub use error::{EmitterError, ErrorExt, FailureCause, HandlerFailure, MaxListenersExceeded};
/// Logging.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
