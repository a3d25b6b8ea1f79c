//! Logging Infrastructure
//!
//! - Console output, pretty (development) or JSON (production)
//! - Optional daily rotating files under `LOG_DIR`:
//!   - `app/`      application logs, removed after 14 days
//!   - `audit/`    target `audit` (refunds, staff changes), kept
//!   - `security/` target `security` (auth failures, webhook rejections), kept

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Initialize the logging system
///
/// `level` accepts an `EnvFilter` directive (e.g. `"info"`, `"debug,sqlx=warn"`).
/// `RUST_LOG` overrides it for the console.
///
/// ```no_run
/// // Development (console only)
/// pos_server::init_logger_with_file("debug", false, None)?;
///
/// // Production (console + files)
/// pos_server::init_logger_with_file("info", true, Some("./logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(json_format, env_filter)];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        // 文件日志只接受不低于 level 的事件
        let max_level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);

        layers.push(file_layer(log_dir, "app", json_format, max_level, |target| {
            target != "audit" && target != "security"
        })?);
        layers.push(file_layer(log_dir, "audit", json_format, max_level, |target| {
            target == "audit"
        })?);
        layers.push(file_layer(log_dir, "security", json_format, max_level, |target| {
            target == "security"
        })?);

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

fn console_layer(json_format: bool, filter: EnvFilter) -> BoxedLayer {
    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter)
            .boxed()
    }
}

fn file_layer(
    log_dir: &Path,
    name: &str,
    json_format: bool,
    max_level: LevelFilter,
    accept_target: fn(&str) -> bool,
) -> anyhow::Result<BoxedLayer> {
    let dir = log_dir.join(name);
    fs::create_dir_all(&dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, name);
    let filter = filter_fn(move |meta| {
        accept_target(meta.target()) && max_level >= *meta.level()
    });

    let layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(filter)
            .boxed()
    };

    Ok(layer)
}

/// Remove `app/app.YYYY-MM-DD` files older than the retention window.
/// Audit and security logs are never removed.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let app_dir = log_dir.join("app");
    if !app_dir.exists() {
        return Ok(0);
    }

    let cutoff = (chrono::Local::now() - chrono::Duration::days(APP_LOG_RETENTION_DAYS)).date_naive();
    let mut removed = 0;

    for entry in fs::read_dir(app_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date) = log_file_date(name) else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(removed)
}

/// `app.2024-07-02` -> 2024-07-02
fn log_file_date(file_name: &str) -> Option<chrono::NaiveDate> {
    let date_part = file_name.strip_prefix("app.")?;
    chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Runs every hour
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_date() {
        assert_eq!(
            log_file_date("app.2024-07-02"),
            chrono::NaiveDate::from_ymd_opt(2024, 7, 2)
        );
        assert_eq!(log_file_date("audit.2024-07-02"), None);
        assert_eq!(log_file_date("app.latest"), None);
    }

    #[test]
    fn test_cleanup_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("app");
        fs::create_dir_all(&app_dir).unwrap();

        let today = chrono::Local::now().date_naive();
        let old = today - chrono::Duration::days(30);
        fs::write(app_dir.join(format!("app.{}", old.format("%Y-%m-%d"))), "old").unwrap();
        fs::write(app_dir.join(format!("app.{}", today.format("%Y-%m-%d"))), "new").unwrap();

        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 1);
        assert_eq!(fs::read_dir(&app_dir).unwrap().count(), 1);
    }
}
