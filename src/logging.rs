//! Session logging.
//!
//! Every record goes to two places: a JSON-lines file (one object per line,
//! appended across runs) and the console via [`env_logger`].

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

/// The name of the log file inside the log directory.
pub const LOG_FILE: &str = "app.log";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// A single line in the log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

impl Entry {
    pub fn from_record(record: &Record<'_>) -> Self {
        Entry {
            time: Local::now().format(TIME_FORMAT).to_string(),
            level: record.level().to_string(),
            source: record.target().to_string(),
            message: record.args().to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unable to open the log file, {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("a logger has already been installed")]
    AlreadyInstalled(#[from] SetLoggerError),
}

/// Appends [`Entry`]s to a file.
#[derive(Debug)]
pub struct FileLogger {
    path: PathBuf,
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    /// Open (or create) the log file inside `directory`, creating the
    /// directory if necessary.
    pub fn open(
        directory: &Path,
        level: LevelFilter,
    ) -> Result<Self, LoggingError> {
        let path = directory.join(LOG_FILE);
        let open_error = |source| LoggingError::Open {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(directory).map_err(open_error)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_error)?;

        Ok(FileLogger {
            path,
            level,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path { &self.path }

    fn write_entry(&self, record: &Record<'_>) -> io::Result<()> {
        let entry = Entry::from_record(record);
        let line = serde_json::to_string(&entry)?;

        match self.file.lock() {
            Ok(mut file) => writeln!(file, "{}", line),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                "the log file lock was poisoned",
            )),
        }
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            // there's nowhere left to report a failure to log
            let _ = self.write_entry(record);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Sends each record to both the log file and the console.
struct Logger {
    file: FileLogger,
    console: env_logger::Logger,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.file.enabled(metadata) || self.console.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        self.file.log(record);
        self.console.log(record);
    }

    fn flush(&self) {
        self.file.flush();
        self.console.flush();
    }
}

/// Install the global logger, returning the path of the log file.
///
/// The console shows `LEVEL - message` lines filtered by `RUST_LOG`,
/// defaulting to warnings and above.
pub fn init(
    directory: &Path,
    level: LevelFilter,
) -> Result<PathBuf, LoggingError> {
    let file = FileLogger::open(directory, level)?;
    let path = file.path().to_path_buf();

    let console = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    )
    .format(|buf, record| {
        writeln!(buf, "{} - {}", record.level(), record.args())
    })
    .build();

    let max_level = level.max(console.filter());
    log::set_boxed_logger(Box::new(Logger { file, console }))?;
    log::set_max_level(max_level);

    Ok(path)
}

/// Read the last `count` lines of a file.
pub fn tail(path: &Path, count: usize) -> io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();

    for line in reader.lines() {
        lines.push(line?);
        if lines.len() > count {
            lines.remove(0);
        }
    }

    Ok(lines)
}
