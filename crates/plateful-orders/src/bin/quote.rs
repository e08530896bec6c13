//! # quote
//!
//! Prices a cart from the command line.
//!
//! ```text
//! quote cart.json            # read the cart from a file
//! quote - < cart.json        # read the cart from stdin
//! ```
//!
//! The fee schedule comes from the `PLATEFUL_*` environment variables,
//! falling back to the defaults. The quote is printed to stdout as JSON;
//! logs and errors go to stderr.

use std::io::Read;
use std::process::ExitCode;

use plateful_core::{price, Cart, PriceQuote};
use plateful_orders::config::fee_schedule_from_env;
use plateful_orders::telemetry::init_tracing;
use plateful_orders::{OrderError, OrderResult};
use tracing::{debug, error};

fn main() -> ExitCode {
    init_tracing();

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: quote <cart.json | ->");
            return ExitCode::from(2);
        }
    };

    match run(&path) {
        Ok(quote) => match serde_json::to_string_pretty(&quote) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize quote");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            let body = e.to_body();
            match serde_json::to_string(&body) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", body.message),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> OrderResult<PriceQuote> {
    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| OrderError::InvalidInput(format!("stdin: {}", e)))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| OrderError::InvalidInput(format!("{}: {}", path, e)))?
    };

    let cart: Cart = serde_json::from_str(&raw)
        .map_err(|e| OrderError::InvalidInput(format!("cart JSON: {}", e)))?;
    let fees = fee_schedule_from_env()?;

    debug!(items = cart.items.len(), "Pricing cart");
    Ok(price(&cart, &fees)?)
}
