use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::config;

/// Print a table of all configured cache backends.
pub fn run(config_path: &str) -> Result<()> {
    let config = config::load(config_path)?;
    if config.caches.is_empty() {
        println!("No caches configured in {config_path}.");
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Cache Identifier", "Host / Sentinels", "Port", "Database", "Password"]);
    for (identifier, options) in &config.caches {
        let (host, port) = if options.sentinels.is_empty() {
            (options.hostname.clone(), options.port.to_string())
        } else {
            (options.sentinels.join(", "), "-".to_string())
        };
        builder.push_record([
            identifier.clone(),
            host,
            port,
            options.database.to_string(),
            if options.password.is_some() { "yes" } else { "no" }.to_string(),
        ]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
