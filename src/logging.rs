// Logging setup plus conditional macros that are only active in debug builds.

use chrono::Local;
use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const LOG_DIR_NAME: &str = "forca";
const LOG_FILE_NAME: &str = "forca.log";
const DEFAULT_FILTER: &str = "info";

/// `<cache dir>/forca/forca.log`, if the platform has a cache directory.
#[must_use]
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(LOG_DIR_NAME).join(LOG_FILE_NAME))
}

/// Routes `log` output to `path`, appending. The filter comes from `RUST_LOG`.
///
/// The terminal UI owns stdout and stderr, so logs always go to a file.
pub fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .map_err(io::Error::other)
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path_file_name() {
        if let Some(path) = default_log_path() {
            assert!(path.ends_with("forca/forca.log"));
        }
    }

    #[test]
    fn test_init_logging_creates_file() {
        let dir = std::env::temp_dir().join("forca_logging_test");
        let path = dir.join("nested").join("test.log");
        let _ = fs::remove_dir_all(&dir);

        // A logger may already be installed by another test; the file is
        // still created before that is detected.
        let _ = init_logging(&path);
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
