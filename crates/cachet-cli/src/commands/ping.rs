use anyhow::{Result, ensure};
use cachet_redis::{MIN_REDIS_VERSION, connect};
use colored::Colorize;

use crate::config;
use crate::output::{print_error, step};

/// Check connectivity for a configured backend and report server details.
pub fn run(config_path: &str, cache: &str) -> Result<()> {
    let config = config::load(config_path)?;
    let options = config::cache_options(&config, cache)?;

    if options.sentinels.is_empty() {
        println!(
            "{}: {}:{}",
            "Target".cyan(),
            options.hostname,
            options.port
        );
    } else {
        println!(
            "{}: service \"{}\" via sentinels {}",
            "Target".cyan(),
            options.service,
            options.sentinels.join(", ")
        );
    }

    let mut connection = step("Establishing connection", || Ok(connect::open(options)?))?;

    step("Sending PING", || {
        let pong: String = redis::cmd("PING").query(&mut connection)?;
        ensure!(pong == "PONG", "unexpected PING reply: {pong}");
        Ok(())
    })?;

    let info = step("Fetching server info", || {
        let info: String = redis::cmd("INFO").arg("server").query(&mut connection)?;
        Ok(info)
    })?;

    if let Some(version) = info_field(&info, "redis_version") {
        println!("{}: {}", "Redis version".cyan(), version);
        if version_below(version, MIN_REDIS_VERSION) {
            print_error(&format!(
                "Redis {version} is older than the supported minimum {MIN_REDIS_VERSION}"
            ));
            std::process::exit(1);
        }
    }
    if let Some(mode) = info_field(&info, "redis_mode") {
        println!("{}: {}", "Mode".cyan(), mode);
    }

    Ok(())
}

/// Extract one `field:value` line from an INFO reply.
fn info_field<'a>(info: &'a str, field: &str) -> Option<&'a str> {
    info.lines()
        .find_map(|line| line.strip_prefix(field)?.strip_prefix(':'))
        .map(str::trim)
}

/// Numeric comparison of dotted version strings; missing segments count as 0.
fn version_below(version: &str, minimum: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    };
    let (version, minimum) = (parse(version), parse(minimum));
    for i in 0..version.len().max(minimum.len()) {
        let have = version.get(i).copied().unwrap_or(0);
        let need = minimum.get(i).copied().unwrap_or(0);
        if have != need {
            return have < need;
        }
    }
    false
}
