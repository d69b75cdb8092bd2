// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the option registry.
//!
//! This example demonstrates:
//! - Registering typed options with defaults into groups
//! - Reading options from environment variables
//! - Typed accessors on groups
//! - Handling options that were never set
//!
//! To run this example:
//! ```bash
//! export DEMO_APP_NAME="MyApplication"
//! export DEMO_DATABASE_PORT="5432"
//! export DEMO_DATABASE_TIMEOUT="2m30s"
//! export DEMO_DEBUG="true"
//!
//! cargo run --example basic_usage --features env
//! ```

use optreg::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== Option Registry: Basic Usage ===\n");

    let registry = Registry::builder()
        .with_parser(Box::new(EnvVarParser::with_prefix("DEMO_")))
        .build()?;

    registry.register_options(
        "",
        vec![
            OptionSpec::of::<bool>("debug").help("Enable debug output").build()?,
            OptionSpec::of::<f64>("ratio").default_value(0.5f64).build()?,
        ],
        false,
    )?;
    registry.register_option(
        "app",
        OptionSpec::of::<String>("name").default_value("DefaultApp").build()?,
        false,
    )?;
    registry.register_options(
        "database",
        vec![
            OptionSpec::of::<u16>("port").default_value(5432u16).build()?,
            OptionSpec::of::<Duration>("timeout").default_text("30s").build()?,
            OptionSpec::of::<Vec<String>>("replicas").build()?,
        ],
        false,
    )?;

    registry.parse(std::env::args().skip(1))?;

    println!("--- Example 1: String Values ---");
    let app = registry.group("app")?;
    println!("app.name = {}", app.get_string("name")?);

    println!("\n--- Example 2: Typed Values ---");
    let database = registry.group("database")?;
    println!("database.port    = {}", database.get_u16("port")?);
    println!("database.timeout = {:?}", database.get_duration("timeout")?);

    println!("\n--- Example 3: Default Group ---");
    println!("debug = {}", registry.get_or::<bool>("", "debug", false));
    println!("ratio = {}", registry.get::<f64>("", "ratio")?);

    println!("\n--- Example 4: Unset Options ---");
    match database.get_strings("replicas") {
        Ok(replicas) => println!("database.replicas = {:?}", replicas),
        Err(e) => println!("database.replicas is unset: {}", e),
    }

    println!("\n--- All Values ---");
    for (name, value) in registry.snapshot() {
        println!("{} = {}", name, value);
    }

    Ok(())
}
