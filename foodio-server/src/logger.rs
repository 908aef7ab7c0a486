//! Logging Infrastructure
//!
//! Console output plus optional daily rotating files: application logs
//! under `<dir>/app`, `security` target events under `<dir>/security`.

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directives used when `RUST_LOG` is not set
pub fn default_directives(level: &str) -> String {
    format!("warn,foodio_server={level},tower_http={level},security={level}")
}

/// Initialize the global subscriber
///
/// `RUST_LOG` overrides `level` when present.
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> std::io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let json_console = json_format.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
    });
    let pretty_console = (!json_format).then(|| fmt::layer().with_target(true));

    let (app_layer, security_layer) = match log_dir {
        Some(dir) => {
            let dir = Path::new(dir);
            let app_dir = dir.join("app");
            let security_dir = dir.join("security");
            fs::create_dir_all(&app_dir)?;
            fs::create_dir_all(&security_dir)?;

            let app_log = RollingFileAppender::new(Rotation::DAILY, app_dir, "foodio-server");
            let security_log = RollingFileAppender::new(Rotation::DAILY, security_dir, "security");

            let app_layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(app_log)
                .with_filter(filter_fn(|meta| meta.target() != "security"));
            let security_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(security_log)
                .with_filter(filter_fn(|meta| meta.target() == "security"));

            (Some(app_layer), Some(security_layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(pretty_console)
        .with(app_layer)
        .with(security_layer)
        .try_init()
        .map_err(std::io::Error::other)
}
