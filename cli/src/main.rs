//! maclookup — look up a MAC address on macaddress.io.
//!
//! Prints a one-line summary on stdout and exits with a code scripts can test:
//! `0` valid (and a VM with `--isvm`), `EEXIST` physical machine with `--isvm`,
//! `ENODEV` invalid MAC, `EIO` lookup failure, `EINVAL` bad arguments or config.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use maclookup::{LookupConfig, LookupError, MacLookupClient, Verdict, render};
use tracing_subscriber::EnvFilter;

/// Look up a MAC address's vendor and virtual machine status.
#[derive(Parser)]
#[command(name = "maclookup", version, about)]
struct Cli {
    /// NIC MAC address
    mac: String,
    /// User API key credential
    #[arg(long = "key", value_name = "API_KEY")]
    api_key: String,
    /// Check if MAC is on a virtual machine
    #[arg(long)]
    isvm: bool,
    /// Path to maclookup.toml [default: ./maclookup.toml or ~/.config/maclookup/maclookup.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    // RUST_LOG controls verbosity; stdout is reserved for the summary line
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(verdict) => {
            tracing::debug!(?verdict, "lookup verdict");
            verdict.exit_code()
        }
        Err(err) => {
            println!("ERROR: {:#}", err);
            err.downcast_ref::<LookupError>()
                .map_or(libc::EIO, LookupError::exit_code)
        }
    };

    ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX))
}

/// Connect, look up, print the summary and close.
fn run(cli: &Cli) -> Result<Verdict> {
    let config = match resolve_config(cli.config.as_deref()) {
        Some(path) => LookupConfig::load(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LookupConfig::default(),
    };

    let mut client = MacLookupClient::new();
    client.connect_with_config(&config.endpoint, &cli.api_key)?;
    let response = client.lookup(&cli.mac)?;
    client.close();

    println!("{}", render(&response));
    Ok(Verdict::from_response(&response, cli.isvm))
}

/// Resolve config file path: explicit flag → ./maclookup.toml → ~/.config/maclookup/maclookup.toml.
///
/// Returns `None` when no file exists, in which case built-in defaults apply.
fn resolve_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = Path::new("maclookup.toml");
    if local.exists() {
        return Some(local.to_path_buf());
    }

    dirs::config_dir()
        .map(|dir| dir.join("maclookup").join("maclookup.toml"))
        .filter(|path| path.exists())
}
