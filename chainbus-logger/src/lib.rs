//! Tracing-subscriber initialization shared by chainbus services and tests.

mod logging;

pub use logging::{init, LogConfig, LogFormat, LogOutput};
