// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-source example.
//!
//! This example demonstrates:
//! - Using several sources at once (YAML, environment variables, CLI args)
//! - How higher priority sources override lower priority ones
//! - Registering a struct of options with a validator
//! - Observing every accepted write
//!
//! To run this example:
//! ```bash
//! # Environment variables override the YAML file
//! export MULTI_APP_NAME="EnvApp"
//! export MULTI_DATABASE_HOST="db.example.com"
//!
//! # CLI args override both
//! cargo run --example multi_source --features yaml,env,cli -- \
//!   --app.name=CliApp --app.port=9000 extra-arg
//! ```

use optreg::prelude::*;
use std::time::Duration;

struct Database {
    host: String,
    port: u16,
    pool: u32,
    timeout: Duration,
}

impl OptionStruct for Database {
    fn fields() -> Result<Vec<FieldSpec>> {
        Ok(vec![
            FieldSpec::new(OptionSpec::of::<String>("host").required(true).build()?),
            FieldSpec::new(OptionSpec::of::<u16>("port").default_value(5432u16).build()?),
            FieldSpec::new(OptionSpec::of::<u32>("pool").default_value(8u32).build()?),
            FieldSpec::new(OptionSpec::of::<Duration>("timeout").default_text("5s").build()?)
                .cli(false),
        ])
    }

    fn load(registry: &Registry, group: &str) -> Result<Self> {
        Ok(Self {
            host: registry.get(group, "host")?,
            port: registry.get(group, "port")?,
            pool: registry.get(group, "pool")?,
            timeout: registry.get(group, "timeout")?,
        })
    }
}

impl Validate for Database {
    fn validate(&self) -> Result<()> {
        if self.pool == 0 {
            return Err(RegistryError::validation("database.pool must be positive"));
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("=== Option Registry: Multi-Source Example ===\n");

    let yaml_content = r#"
app:
  name: "YamlApp"
  port: 8080
  tags: [web, public]

database:
  host: "localhost"
  pool: 16
"#;

    let temp_file = tempfile::NamedTempFile::new()?;
    std::fs::write(temp_file.path(), yaml_content)?;
    println!("Created temporary YAML file at: {:?}\n", temp_file.path());

    // Parsers run in ascending priority; the highest priority write wins:
    //   1. CLI arguments (priority 100)
    //   2. Environment variables (priority 50)
    //   3. YAML file (priority 10)
    let registry = RegistryBuilder::new()
        .version(VersionInfo::new(env!("CARGO_PKG_VERSION")))
        .with_yaml_file(temp_file.path())?
        .with_env_prefix("MULTI_")
        .with_parser(Box::new(
            CommandLineParser::new().about("Multi-source option registry demo"),
        ))
        .build()?;

    registry.observe(std::sync::Arc::new(|group: &str, option: &str, value: &Value| {
        println!("  set {}/{} = {}", group, option, value);
    }))?;

    registry.register_options(
        "app",
        vec![
            OptionSpec::of::<String>("name").build()?,
            OptionSpec::of::<u16>("port").build()?,
            OptionSpec::of::<Vec<String>>("tags").build()?,
        ],
        true,
    )?;
    registry.register_validated_struct::<Database>("database", true)?;

    println!("Parsing sources:");
    registry.parse(std::env::args().skip(1))?;

    let app = registry.group("app")?;
    println!("\n--- Resolved ---");
    println!("app.name  = {}", app.get_string("name")?);
    println!("app.port  = {}", app.get_u16("port")?);
    println!("app.tags  = {:?}", app.get_strings_or("tags", Vec::new()));

    let database = registry.load::<Database>("database")?;
    println!(
        "database  = {}:{} (pool {}, timeout {:?})",
        database.host, database.port, database.pool, database.timeout
    );
    println!("arguments = {:?}", registry.args()?);

    Ok(())
}
