//! Per-level macros that record the call site with `file!()` and `line!()`

/// Write a record at an explicit level
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log(
            $level,
            $crate::CallSite::new(file!(), line!()),
            format_args!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Write a fatal record and exit the process with status 1
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal_at(
            $crate::CallSite::new(file!(), line!()),
            format_args!($($arg)+),
        )
    };
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::{Config, Level, Logger};

    #[test]
    fn test_macros_capture_file_and_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("macros.log");
        let logger = Logger::open(Config::new(&path, Level::Debug)).unwrap();

        let line = line!() + 1;
        crate::info!(logger, "value = {}", 7);
        crate::debug!(logger, "plain");
        crate::warn!(&logger, "by reference");
        crate::error!(logger, "{:>4}|", "x");
        crate::log!(logger, Level::Info, "explicit level");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with(&format!("[info   ] macros.rs:{}: value = 7", line)));
        assert!(lines[1].contains("[debug  ] macros.rs:"));
        assert!(lines[2].ends_with(": by reference"));
        assert!(lines[3].ends_with(":    x|"));
        assert!(lines[4].ends_with(": explicit level"));
    }
}
