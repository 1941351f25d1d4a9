//! umu-front Logging System
//!
//! Console logging with an optional per-session log file and a short
//! environment header.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

static LOGGER: OnceLock<Mutex<FrontLogger>> = OnceLock::new();

// ============================================================================
// Session Header
// ============================================================================

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub app_version: String,
    pub distro: String,
    pub kernel: String,
    pub session_type: String,
    pub runner_on_path: bool,
}

impl SessionInfo {
    pub fn detect() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            distro: detect_distro(),
            kernel: detect_kernel(),
            session_type: std::env::var("XDG_SESSION_TYPE")
                .unwrap_or_else(|_| "Unknown".to_string()),
            runner_on_path: find_on_path(crate::launch::DEFAULT_RUNNER),
        }
    }

    pub fn to_log_header(&self) -> String {
        format!(
r#"================================================================================
umu-front Log - {}
================================================================================
Application:   umu-front v{}
  Distro:      {}
  Kernel:      {}
  Session:     {}
  umu-run:     {}
================================================================================"#,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.app_version,
            self.distro,
            self.kernel,
            self.session_type,
            if self.runner_on_path { "found on PATH" } else { "NOT FOUND on PATH" },
        )
    }
}

fn detect_distro() -> String {
    if let Ok(file) = File::open("/etc/os-release") {
        let reader = BufReader::new(file);
        for line in reader.lines().map_while(Result::ok) {
            if let Some(name) = line.strip_prefix("PRETTY_NAME=") {
                return name.trim_matches('"').to_string();
            }
        }
    }
    "Unknown".to_string()
}

fn detect_kernel() -> String {
    if let Ok(output) = Command::new("uname").arg("-r").output() {
        if output.status.success() {
            return String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
    }
    "Unknown".to_string()
}

fn find_on_path(binary: &str) -> bool {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|dir| dir.join(binary).exists()))
        .unwrap_or(false)
}

// ============================================================================
// Log Levels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Action, // Library mutations requested by the user
    Launch,
    Download,
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "[INFO]",
            LogLevel::Action => "[ACTION]",
            LogLevel::Launch => "[LAUNCH]",
            LogLevel::Download => "[DOWNLOAD]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Error => "[ERROR]",
        }
    }

    fn is_problem(&self) -> bool {
        matches!(self, LogLevel::Warning | LogLevel::Error)
    }
}

// ============================================================================
// Logger
// ============================================================================

#[derive(Default)]
pub struct FrontLogger {
    log_file: Option<File>,
}

impl FrontLogger {
    /// Console-only logger, used until `init_logger` runs.
    pub fn console() -> Self {
        Self { log_file: None }
    }

    /// Logger that also appends to a timestamped file inside `log_dir`.
    pub fn with_file(log_dir: &Path) -> Self {
        let _ = fs::create_dir_all(log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("umu-front_{}.log", timestamp));

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        let mut logger = Self { log_file };
        if let Some(ref mut file) = logger.log_file {
            let _ = writeln!(file, "{}", SessionInfo::detect().to_log_header());
        }
        logger
    }

    pub fn log(&mut self, level: LogLevel, message: &str) {
        let line = format_line(level, message);

        if let Some(ref mut file) = self.log_file {
            let _ = writeln!(file, "{}", line);
            let _ = file.flush();
        }

        // stdout is reserved for command output
        if level.is_problem() || self.log_file.is_none() {
            eprintln!("{}", line);
        }
    }
}

fn format_line(level: LogLevel, message: &str) -> String {
    format!(
        "[{}] {} {}",
        Local::now().format("%H:%M:%S"),
        level.prefix(),
        message
    )
}

// ============================================================================
// Global Logger Access
// ============================================================================

/// Initialize the global logger with a log file (call once at startup).
///
/// Returns `false` if a logger was already installed.
pub fn init_logger() -> bool {
    let mut installed = false;
    LOGGER.get_or_init(|| {
        installed = true;
        Mutex::new(FrontLogger::with_file(&crate::front_path!("logs")))
    });
    installed
}

fn logger() -> &'static Mutex<FrontLogger> {
    LOGGER.get_or_init(|| Mutex::new(FrontLogger::console()))
}

// ============================================================================
// Convenience Logging Functions
// ============================================================================

pub fn log_info(message: &str) {
    logger().lock().log(LogLevel::Info, message);
}

pub fn log_action(message: &str) {
    logger().lock().log(LogLevel::Action, message);
}

pub fn log_launch(message: &str) {
    logger().lock().log(LogLevel::Launch, message);
}

pub fn log_download(message: &str) {
    logger().lock().log(LogLevel::Download, message);
}

pub fn log_warning(message: &str) {
    logger().lock().log(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    logger().lock().log(LogLevel::Error, message);
}
