use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    thread,
};

use chrono::{DateTime, Local};
use crossbeam_channel::{unbounded, Receiver, Sender};
use once_cell::sync::Lazy;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// A named log file under `log/`, written by a dedicated thread so the
/// pipeline never waits on disk.
pub struct Logger {
    writer: Sender<LogMessage>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        let log_path = Self::log_path(log_name).unwrap_or_else(|| {
            panic!("Failed to create log directory.");
        });
        let (tx, rx) = unbounded::<LogMessage>();

        thread::spawn(move || write_messages(rx, log_path));

        Logger { writer: tx }
    }

    pub fn info(&self, log: String) {
        self.send(log::Level::Info, log);
    }

    pub fn debug(&self, log: String) {
        self.send(log::Level::Debug, log);
    }

    pub fn error(&self, log: String) {
        self.send(log::Level::Error, log);
    }

    fn send(&self, level: log::Level, msg: String) {
        if let Err(why) = self.writer.send(LogMessage::new(level, msg)) {
            error_console(why.to_string());
        }
    }

    fn log_path(name: &str) -> Option<PathBuf> {
        let dir = Path::new("log");
        if !dir.exists() {
            fs::create_dir_all(dir).ok()?;
        }

        let mut log_path = PathBuf::from(dir);
        log_path.push(format!("{}_{}.log", name, Local::now().format("%Y-%m-%d")));

        Some(log_path)
    }
}

struct LogMessage {
    level: log::Level,
    msg: String,
    created_at: DateTime<Local>,
}

impl LogMessage {
    fn new(level: log::Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

fn write_messages(rx: Receiver<LogMessage>, log_path: PathBuf) {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .unwrap_or_else(|e| {
            panic!("Failed to open log file: {}", e);
        });

    let mut writer = BufWriter::new(file);
    let mut batch = String::with_capacity(4096);

    while let Ok(received) = rx.recv() {
        if writeln!(
            &mut batch,
            "{} {} {}",
            received.created_at.format("%F %X%.6f"),
            received.level,
            received.msg
        )
        .is_err()
        {
            continue;
        }

        // Flush once the channel drains or the batch grows large.
        if rx.is_empty() || batch.len() >= 4096 {
            if writer.write_all(batch.as_bytes()).is_err() || writer.flush().is_err() {
                info_console(batch.clone());
            }
            batch.clear();
        }
    }
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn debug_file_async(log: String) {
    LOGGER.debug(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    println!(
        "{} Error {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}
