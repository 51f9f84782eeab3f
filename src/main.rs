//! agcod - issue or void a single gift card from the command line
//!
//! ```text
//! agcod --env dev --value 10.00 --request-id order-1 [--currency USD]
//! agcod --env dev --void --request-id order-1
//! agcod --version
//! ```
//!
//! On success the settled record is printed as YAML for the caller to store.

use std::process::ExitCode;
use std::str::FromStr;

use agcod::config::AgcodConfig;
use agcod::issuance::{GiftCardClient, IssuanceError};
use anyhow::{Context, bail};
use rust_decimal::Decimal;

// ============================================================
// ARGUMENTS
// ============================================================

fn get_arg(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if names.contains(&args[i].as_str()) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args().any(|a| a == name)
}

fn get_env() -> String {
    get_arg(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

// ============================================================
// MAIN
// ============================================================

fn main() -> anyhow::Result<ExitCode> {
    if has_flag("--version") {
        println!("agcod {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));
        return Ok(ExitCode::SUCCESS);
    }

    let env = get_env();
    let config = match get_arg(&["--config", "-c"]) {
        Some(path) => AgcodConfig::from_file(&path),
        None => AgcodConfig::load(&env),
    }
    .context("Failed to load configuration")?;
    let _log_guard = agcod::logging::init_logging(&config.logging);

    let request_id = get_arg(&["--request-id"]).context("--request-id is required")?;
    let client = GiftCardClient::from_config(&config).context("Failed to build client")?;

    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    if has_flag("--void") {
        tracing::info!(request_id = %request_id, "Voiding gift card creation");
        rt.block_on(client.void_gift_card(&request_id))
            .with_context(|| format!("Void failed for request {}", request_id))?;
        println!("voided: {}", request_id);
        return Ok(ExitCode::SUCCESS);
    }

    let value = match get_arg(&["--value"]) {
        Some(v) => Decimal::from_str(&v).with_context(|| format!("Invalid --value {}", v))?,
        None => bail!("--value is required"),
    };
    let currency = get_arg(&["--currency"]);

    tracing::info!(
        request_id = %request_id,
        value = %value,
        env = %env,
        "Creating gift card"
    );

    // No process::exit: the log guard must drop to flush the file log
    match rt.block_on(client.create_gift_card(value, currency.as_deref(), &request_id)) {
        Ok(record) => {
            print!("{}", record.to_yaml().context("Failed to serialize record")?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report(&request_id, &e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report(request_id: &str, e: &IssuanceError) {
    tracing::error!(request_id = request_id, code = e.code(), error = %e, "Issuance failed");
    eprintln!("error [{}]: {}", e.code(), e);
    if e.needs_reconciliation() {
        eprintln!(
            "request {} may have been issued remotely; reconcile manually before reusing it",
            request_id
        );
    }
}
