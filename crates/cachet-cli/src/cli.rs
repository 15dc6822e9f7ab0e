use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cachet")]
#[command(about = "Diagnostics for cachet Redis cache backends")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the cache configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "CACHET_CONFIG",
        default_value = "caches.toml"
    )]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured Redis cache backends
    List,
    /// Exercise set/get/get-by-tag/remove end-to-end against a backend
    Verify(CacheArgs),
    /// Check connectivity and report Redis server details
    Ping(CacheArgs),
}

#[derive(clap::Args)]
pub struct CacheArgs {
    /// Cache identifier from the configuration file
    pub cache: String,
}
