use std::path::Path;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install console logging, plus daily-rolling files when `log_dir` is given.
///
/// `RUST_LOG` overrides `base_level` when set. Console output goes to stdout
/// with warnings and errors mirrored to stderr. File lines carry thread ids
/// because tiles are processed on the rayon pool.
pub fn setup_logging(base_level: &str, log_dir: Option<&Path>, file_prefix: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .unwrap_or_else(|e| panic!("Invalid log filter: {}", e));

    let console_writer = std::io::stdout.and(std::io::stderr.with_max_level(Level::WARN));
    let mut layers: Vec<BoxedLayer> = vec![
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .with_writer(console_writer)
            .boxed(),
    ];

    if let Some(log_dir) = log_dir {
        layers.push(file_layer(log_dir, file_prefix));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .unwrap_or_else(|e| panic!("Logger initialization failed: {}", e));
}

fn file_layer(log_dir: &Path, file_prefix: &str) -> BoxedLayer {
    std::fs::create_dir_all(log_dir)
        .unwrap_or_else(|e| panic!("Failed to create log directory {}: {}", log_dir.display(), e));

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(file_prefix)
        .filename_suffix("log")
        .max_log_files(5)
        .build(log_dir)
        .unwrap_or_else(|e| panic!("Failed to create log file appender: {}", e));

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).expect("Logging already initialized");

    tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer)
        .boxed()
}
