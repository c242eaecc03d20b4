use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use usched_core::*;

/// Exit code for an allocation that found no room for some section
const EXIT_INFEASIBLE: i32 = 2;

#[derive(Parser)]
#[command(name = "usched")]
#[command(about = "Homebase room allocation for university sections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON catalog of sections and rooms (overrides config)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Room eligibility policy: classroom-or-hall or not-lab (overrides config)
    #[arg(long, global = true)]
    eligibility: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one allocation and print the resulting assignments
    Assign {
        /// Print records as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also write the records to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List sections in the catalog
    Sections {
        /// Only sections of this department/program
        #[arg(long)]
        group: Option<String>,

        /// Only sections of this year level
        #[arg(long)]
        year: Option<u8>,
    },

    /// List rooms in the catalog
    Rooms {
        /// Only rooms of this kind (classroom, hall, lab)
        #[arg(long)]
        kind: Option<String>,

        /// Only rooms that are available
        #[arg(long)]
        available: bool,
    },

    /// Read commands from stdin and answer with JSON lines (default)
    Shell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    usched_core::logging::init_for_verbosity(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(path) = cli.catalog {
        config.catalog.path = Some(path);
    }
    if let Some(policy) = cli.eligibility.as_deref() {
        config.allocation.eligibility = policy.parse()?;
    }

    let catalog = config.load_catalog()?;
    let service = AllocationService::new(Arc::new(catalog), config.allocation.eligibility);

    match cli.command {
        Some(Commands::Assign { json, export }) => cmd_assign(&service, json, export),
        Some(Commands::Sections { group, year }) => cmd_sections(&service, group, year),
        Some(Commands::Rooms { kind, available }) => cmd_rooms(&service, kind, available),
        Some(Commands::Shell) | None => cmd_shell(&service, &config),
    }
}

fn cmd_assign(service: &AllocationService, json: bool, export: Option<PathBuf>) -> Result<()> {
    let resp = service.run_allocation()?;
    if !resp.success {
        println!("✗ {}", resp.message.unwrap_or_default());
        std::process::exit(EXIT_INFEASIBLE);
    }

    let records = service.assignments()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        display_assignments(&records);
    }

    if let Some(path) = export {
        let count = usched_core::export::write_csv(&records, &path)?;
        println!("✓ Exported {} assignments to {}", count, path.display());
    }

    Ok(())
}

fn cmd_sections(service: &AllocationService, group: Option<String>, year: Option<u8>) -> Result<()> {
    let filter = SectionFilter {
        group_id: group,
        year_level: year,
    };

    for s in service.sections(&filter) {
        println!(
            "  {:<10} {:<14} {:<10} year {}  {:>4} students",
            s.id, s.name, s.group_id, s.year_level, s.capacity_demand
        );
    }
    Ok(())
}

fn cmd_rooms(service: &AllocationService, kind: Option<String>, available: bool) -> Result<()> {
    let filter = RoomFilter {
        kind: kind.as_deref().map(str::parse::<RoomKind>).transpose()?,
        available_only: available,
    };
    let policy = service.eligibility();

    for r in service.rooms(&filter) {
        println!(
            "  {:<8} {:<12} {:<10} {:>4} seats  {} floor {}{}",
            r.id,
            r.name,
            r.kind.to_string(),
            r.capacity,
            r.building_name,
            r.floor,
            if policy.admits(&r) { "" } else { "  (ineligible)" }
        );
    }
    Ok(())
}

fn display_assignments(records: &[DisplayRecord]) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  HOMEBASE ASSIGNMENTS ({})", records.len());
    println!("╰─────────────────────────────────────────╯");
    println!();

    for r in records {
        println!(
            "  {:<18} {:>4}  →  {} ({}, floor {})",
            r.section_name, r.capacity_demand, r.room_name, r.building_name, r.floor
        );
    }

    println!();
    println!("✓ Assigned {} sections", records.len());
}

fn cmd_shell(service: &AllocationService, config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut out = io::stdout().lock();

    if interactive {
        eprintln!("usched shell ({} policy). Type 'help' for commands.", service.eligibility());
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            eprint!("> ");
            io::stderr().flush()?;
        }

        let Some(line) = lines.next() else { break };
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else { continue };

        let command = command.to_lowercase();
        if matches!(command.as_str(), "quit" | "exit") {
            break;
        }

        let reply = match shell_reply(service, config, &command, words.next()) {
            Ok(reply) => reply,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => rejection(rejection_kind(&e), &e),
        };

        writeln!(out, "{}", reply)?;
        out.flush()?;
    }

    Ok(())
}

/// Answer one shell command; errors are turned into replies by the caller
fn shell_reply(
    service: &AllocationService,
    config: &Config,
    command: &str,
    arg: Option<&str>,
) -> Result<serde_json::Value> {
    let reply = match command {
        "status" => serde_json::to_value(service.status()?)?,
        "assign" => serde_json::to_value(service.run_allocation()?)?,
        "list" => serde_json::to_value(service.assignments()?)?,
        "sections" => serde_json::to_value(service.section_overview(&SectionFilter::default())?)?,
        "reset" => serde_json::to_value(service.reset()?)?,
        "export" => {
            let path = arg
                .map(PathBuf::from)
                .unwrap_or_else(|| config.export.dir.join("assignments.csv"));
            let count = usched_core::export::write_csv(&service.assignments()?, &path)?;
            json!({ "success": true, "count": count, "path": path })
        }
        "help" => json!({
            "commands": ["status", "assign", "list", "sections", "reset", "export [path]", "quit"]
        }),
        other => json!({
            "error": "unknown_command",
            "message": format!("Unknown command: {}", other),
        }),
    };
    Ok(reply)
}

fn rejection_kind(err: &Error) -> &'static str {
    match err {
        Error::AlreadyAssigned => "conflict",
        Error::Io(_) | Error::Csv(_) => "io",
        _ => "failed",
    }
}

fn rejection(kind: &str, err: &Error) -> serde_json::Value {
    tracing::debug!(kind, error = %err, "Rejected shell command");
    json!({ "error": kind, "message": err.to_string() })
}
