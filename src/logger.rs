use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Verbosity {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Verbosity {
    /// Number of `-v` flags given.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Low,
            1 => Verbosity::Medium,
            _ => Verbosity::High,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Verbosity::Low => "wii_bridge=info",
            Verbosity::Medium => "wii_bridge=debug",
            Verbosity::High => "wii_bridge=trace",
        }
    }
}

/// Diagnostics go to stderr; RUST_LOG wins over `-v`.
pub fn init(level: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

static BLOCK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Console listing for the user, numbered per process.
pub fn log_block(title: &str, lines: Vec<String>) {
    let block_num = BLOCK_COUNTER.fetch_add(1, Ordering::SeqCst);
    println!("╭── #{}  [{}]", block_num, title);
    for line in lines {
        println!("│   {}", line);
    }
    println!("╰──────────────────────────────────");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_saturates() {
        assert_eq!(Verbosity::from_count(0), Verbosity::Low);
        assert_eq!(Verbosity::from_count(1), Verbosity::Medium);
        assert_eq!(Verbosity::from_count(7), Verbosity::High);
        assert!(Verbosity::High > Verbosity::Low);
    }
}
