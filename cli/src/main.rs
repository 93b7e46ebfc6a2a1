//! yamlist CLI: driving adapter for the yamlist inventory engine.
//!
//! Subcommands:
//! - `list <config>`: build the inventory and print it as dynamic inventory JSON
//! - `host <config> <name>`: print the variables of one host
//! - `check <config>`: load config and data, report condition diagnostics
//! - `explain <config> <name>`: show how admission was decided for one host
//! - `data -f <file> [-s] <action>`: search, add, set or remove data file records

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use yamlist::{
    is_inventory_source, load_records, parse_bool_flag, parse_value, save_records, AddOutcome,
    AddRequest, CompiledConfig, DataEditor, EditError, InventoryConfig, KeyPath, MemoryInventory,
    Value,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Arguments
// ═══════════════════════════════════════════════════════════════════════════════

/// Build, inspect and edit YAML list inventories.
#[derive(Parser, Debug)]
#[command(name = "yamlist", version, about)]
struct Cli {
    /// Show debug messages (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the whole inventory as JSON.
    List {
        /// Inventory source file (`*.list.yaml`).
        config: PathBuf,
    },
    /// Print one host's variables as JSON.
    Host { config: PathBuf, name: String },
    /// Validate the config and its data file.
    Check { config: PathBuf },
    /// Show the accept and ignore evaluation for one host.
    ///
    /// Every record with the name is explained; the first admitted one is the
    /// one in the inventory.
    Explain { config: PathBuf, name: String },
    /// Search, add, set or remove hosts in a data file.
    Data(DataArgs),
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Data file to edit.
    #[arg(short, long)]
    file: PathBuf,

    /// Print the result to stdout instead of writing it back to the file.
    #[arg(short, long)]
    stdout: bool,

    #[command(subcommand)]
    action: DataAction,
}

#[derive(Subcommand, Debug)]
enum DataAction {
    /// Print the first record with this name.
    Search { host: String },
    /// Add a host or update an existing one.
    Add {
        host: String,
        ip: Option<String>,
        /// Comma-separated list of groups.
        group: Option<String>,
        /// Set `ansible.override_ungrouped`.
        #[arg(
            short = 'o',
            long = "override-ungrouped",
            alias = "override_ungrouped",
            value_name = "BOOL",
            num_args = 0..=1,
            default_value = "true",
            default_missing_value = "true",
            value_parser = parse_flag_arg,
        )]
        override_ungrouped: bool,
    },
    /// Set a host property; a `null` value removes it.
    Set {
        host: String,
        /// Dotted path, e.g. `vcenter.nics[0].mac`.
        path: String,
        /// Value, parsed as YAML.
        value: String,
    },
    /// Remove a host.
    Remove { host: String },
}

fn parse_flag_arg(raw: &str) -> Result<bool, String> {
    parse_bool_flag(raw).ok_or_else(|| format!("\"{raw}\" is not a valid boolean value"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Entry point
// ═══════════════════════════════════════════════════════════════════════════════

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(cli.command, &mut out) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            let status = e.downcast_ref::<EditError>().map_or(1, EditError::exit_code);
            ExitCode::from(u8::try_from(status).unwrap_or(1))
        }
    }
}

/// Logs go to stderr so stdout stays machine readable.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Returns `false` when the command ran but found problems.
fn run(command: Command, out: &mut impl Write) -> anyhow::Result<bool> {
    match command {
        Command::List { config } => cmd_list(&config, out).map(|()| true),
        Command::Host { config, name } => cmd_host(&config, &name, out).map(|()| true),
        Command::Check { config } => cmd_check(&config, out),
        Command::Explain { config, name } => cmd_explain(&config, &name, out).map(|()| true),
        Command::Data(args) => cmd_data(args, out).map(|()| true),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Inventory commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_list(config: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let inventory = build_inventory(config)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&inventory.to_ansible_json())?)?;
    Ok(())
}

fn cmd_host(config: &Path, name: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let inventory = build_inventory(config)?;
    let Some(vars) = inventory.host_vars(name) else {
        bail!("host \"{name}\" is not in the inventory");
    };
    let json = Value::Map(vars.clone()).to_json();
    writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

fn cmd_check(config: &Path, out: &mut impl Write) -> anyhow::Result<bool> {
    let (compiled, records) = load_inventory(config)?;
    let (_, summary) = compiled.build(&records, MemoryInventory::new());

    for diagnostic in &compiled.diagnostics {
        writeln!(out, "warning: {diagnostic}")?;
    }
    writeln!(
        out,
        "{} records: {} added, {} rejected, {} unnamed, {} duplicates",
        records.len(),
        summary.added,
        summary.rejected,
        summary.unnamed,
        summary.duplicates
    )?;

    let valid = compiled.diagnostics.is_empty();
    if valid {
        writeln!(out, "Config valid")?;
    }
    Ok(valid)
}

fn cmd_explain(config: &Path, name: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let (compiled, records) = load_inventory(config)?;
    let named: Vec<(usize, &Value)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.get("name").and_then(Value::as_str) == Some(name))
        .collect();
    if named.is_empty() {
        bail!("no record named \"{name}\" in the data file");
    }

    let kept = named
        .iter()
        .find(|(_, r)| compiled.rules.admit(r))
        .map(|(index, _)| *index);
    for (n, (index, record)) in named.iter().enumerate() {
        if named.len() > 1 {
            if n > 0 {
                writeln!(out)?;
            }
            let status = if kept == Some(*index) { " (in inventory)" } else { "" };
            writeln!(out, "record {index}{status}:")?;
        }
        write!(out, "{}", compiled.rules.explain(record))?;
        let groups: Vec<&str> = compiled.rules.grouping().matching(record).collect();
        writeln!(out, "grouping: {}", groups.join(", "))?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Inventory loading (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn load_inventory(config_path: &Path) -> anyhow::Result<(CompiledConfig, Vec<Value>)> {
    if !is_inventory_source(config_path) {
        warn!(
            path = %config_path.display(),
            "inventory source names usually end in .list.yaml or .list.yml"
        );
    }

    let config = InventoryConfig::from_path(config_path)?;
    debug!(data_file = %config.data_file.display(), "loading records");
    let records = load_records(&config.data_file)
        .with_context(|| format!("loading data file for {}", config_path.display()))?;

    let compiled = config.compile();
    for diagnostic in &compiled.diagnostics {
        warn!(%diagnostic, "condition problem");
    }
    Ok((compiled, records))
}

fn build_inventory(config_path: &Path) -> anyhow::Result<MemoryInventory> {
    let (compiled, records) = load_inventory(config_path)?;
    let (inventory, summary) = compiled.build(&records, MemoryInventory::new());
    debug!(?summary, "inventory built");
    Ok(inventory)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Data file commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_data(args: DataArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let mut editor = DataEditor::new(load_records(&args.file)?);

    match args.action {
        DataAction::Search { host } => {
            if let Some(record) = editor.search(&host) {
                write!(out, "{}", serde_yaml::to_string(std::slice::from_ref(record))?)?;
            }
            return Ok(());
        }
        DataAction::Add {
            host,
            ip,
            group,
            override_ungrouped,
        } => {
            let request = AddRequest {
                ip,
                groups: group,
                override_ungrouped,
                ..AddRequest::new(host)
            };
            if editor.add(&request) == AddOutcome::Unchanged {
                debug!(host = %request.name, "nothing to update");
            }
        }
        DataAction::Set { host, path, value } => {
            let value = parse_value(&value)?;
            let outcome = editor.set(&host, &KeyPath::parse(&path), value)?;
            debug!(?outcome, "set finished");
        }
        DataAction::Remove { host } => {
            editor.remove(&host);
        }
    }

    write_back(&args.file, args.stdout, editor.records(), out)
}

fn write_back(
    file: &Path,
    to_stdout: bool,
    records: &[Value],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if to_stdout {
        debug!("printing to stdout");
        let rendered = yamlist::render_records(records)?;
        write!(out, "{rendered}")?;
    } else {
        debug!(path = %file.display(), "writing back to file");
        save_records(file, records)?;
    }
    Ok(())
}
