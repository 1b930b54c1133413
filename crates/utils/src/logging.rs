//! provides logging helpers

use std::path::Path;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::InitError;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// When set, logs go to a daily rolling file at this path instead of stderr.
pub const LOG_PATH_ENV_VAR: &str = "KUBEPROXY_LOG_PATH";

const DEFAULT_LOG_FILE: &str = "kubeproxy.log";
const MAX_LOG_FILES: usize = 7;

pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Build the formatting layer, writing to stderr or to a rolling file.
///
/// The returned guard must be kept alive for as long as file logging is
/// wanted; dropping it flushes and stops the background writer.
pub fn get_fmt_layer<S>(
    log_path: Option<String>,
) -> Result<(BoxedLayer<S>, Option<WorkerGuard>), InitError>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let Some(log_path) = log_path.filter(|p| !p.is_empty()) else {
        let fmt_layer = layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed();
        return Ok((fmt_layer, None));
    };

    let log_path = Path::new(&log_path);
    let dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let fmt_layer = layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .boxed();

    Ok((fmt_layer, Some(guard)))
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::Registry;

    use super::*;

    #[test]
    fn stderr_layer_has_no_guard() {
        let (_layer, guard) = get_fmt_layer::<Registry>(None).expect("stderr layer");
        assert!(guard.is_none());

        let (_layer, guard) = get_fmt_layer::<Registry>(Some(String::new())).expect("stderr layer");
        assert!(guard.is_none());
    }

    #[test]
    fn file_layer_keeps_writer_guard() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("kubeproxy.log");

        let (_layer, guard) =
            get_fmt_layer::<Registry>(Some(path.to_string_lossy().into_owned())).expect("file layer");
        assert!(guard.is_some());
    }
}
