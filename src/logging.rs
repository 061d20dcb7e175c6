use std::os::raw::{c_char, c_void};
use std::sync::Once;

/// Initialize structured JSON logging.
///
/// Defaults to `error` level unless overridden by `CAPBURN_LOG`.
#[cfg(feature = "logging")]
pub fn init() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::builder()
        .with_env_var("CAPBURN_LOG")
        .with_default_directive(tracing::level_filters::LevelFilter::ERROR.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init();
}

/// A no-op log callback used to silence logs emitted by whisper.cpp.
unsafe extern "C" fn whisper_log_callback(
    _level: u32,
    _c_msg: *const c_char,
    _user_data: *mut c_void,
) {
    // Intentionally left empty.
}

/// Ensure whisper logging is configured exactly once for the lifetime of the process.
///
/// whisper.cpp writes directly to stderr by default, which would interleave with
/// our own output during transcription.
pub fn init_whisper_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whisper_logging_init_is_idempotent() {
        init_whisper_logging();
        init_whisper_logging();
    }

    #[cfg(feature = "logging")]
    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
