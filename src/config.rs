//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "curfew")]
#[command(about = "A state-managed HTTP service that enforces inactivity logout on admin sessions")]
#[command(version = "1.1.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20561")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Total inactivity budget before forced logout, in seconds
    #[arg(short = 't', long, default_value = "300")]
    pub inactivity_timeout: u64,

    /// Trailing portion of the budget during which the warning is shown, in seconds
    #[arg(short = 'w', long, default_value = "5")]
    pub warning_period: u64,

    /// Path clients are redirected to after a forced logout
    #[arg(long, default_value = "/login")]
    pub login_path: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Validate the timing configuration
    ///
    /// The warning period must fit strictly inside the inactivity budget,
    /// otherwise the main deadline would be zero or negative.
    pub fn validate(&self) -> Result<(), String> {
        if self.inactivity_timeout == 0 {
            return Err("inactivity timeout must be greater than zero".to_string());
        }
        if self.warning_period >= self.inactivity_timeout {
            return Err(format!(
                "warning period ({}s) must be shorter than the inactivity timeout ({}s)",
                self.warning_period, self.inactivity_timeout
            ));
        }
        Ok(())
    }

    /// Total idle budget before forced logout
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout)
    }

    /// Warning window at the tail of the budget
    pub fn warning_period(&self) -> Duration {
        Duration::from_secs(self.warning_period)
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
