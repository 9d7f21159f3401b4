//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "phishguard-server")]
#[command(about = "Phishing URL prediction service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PHISHGUARD_CONFIG", default_value = "phishguard.yaml")]
    pub config: String,

    /// Word corpus file (overrides config)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Model artifact file (overrides config)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Feature schema file (overrides config)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long, default_value = "127.0.0.1")]
    pub listen: String,

    /// Listen port
    #[arg(short = 'P', long, default_value = "5000")]
    pub port: u16,

    /// Serve Prometheus metrics on this address, e.g. 127.0.0.1:9000
    #[arg(long)]
    pub metrics_listen: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
