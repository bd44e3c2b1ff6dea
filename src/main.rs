use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sprig::output::Format;

#[derive(Parser)]
#[command(
    name = "sprig",
    version,
    about = "Hierarchical todo manager with due dates and recurrence"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: Format,
    /// Path to the task store (default: $SPRIG_STORE, then ./tasks.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title
        title: String,
        /// Parent task ID (creates a subtask)
        #[arg(long)]
        parent: Option<String>,
        /// Slot among siblings (default: append; clamped to the valid range)
        #[arg(long)]
        position: Option<usize>,
        /// Due date expression ("tomorrow", "every monday", "2025-05-01", ...)
        #[arg(long)]
        due: Option<String>,
    },
    /// Display the task forest
    List {
        /// Root task ID (omit for the full forest)
        id: Option<String>,
    },
    /// Delete a task and its whole subtree
    Delete {
        /// Task ID to delete
        id: String,
    },
    /// Move a task to a new parent and slot
    Move {
        /// Task ID to move
        id: String,
        /// New parent task ID (omit for top level)
        #[arg(long)]
        parent: Option<String>,
        /// Slot among the new siblings (default: append)
        #[arg(long)]
        position: Option<usize>,
    },
    /// Set or clear a task's due date from a date expression
    Due {
        /// Task ID
        id: String,
        /// Date expression, e.g. "tomorrow", "in 3 days", "every friday"
        #[arg(required_unless_present = "clear", num_args = 1.., value_name = "EXPR")]
        expr: Vec<String>,
        /// Remove the due date
        #[arg(long, conflicts_with = "expr")]
        clear: bool,
    },
    /// Set or clear a task's recurrence interval in days
    Repeat {
        /// Task ID
        id: String,
        /// Interval in days
        #[arg(required_unless_present = "clear")]
        days: Option<u32>,
        /// Remove the recurrence
        #[arg(long, conflicts_with = "days")]
        clear: bool,
    },
    /// Complete a task (recurring tasks reschedule instead of deleting)
    Done {
        /// Task ID to complete
        id: String,
    },
    /// List tasks due on or before a date
    Today {
        /// Cutoff date (default: today)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Remove all tasks
    Clear,
    /// Serve the HTTP API
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:7171")]
        addr: SocketAddr,
    },
}

fn store_path(cli_store: Option<PathBuf>) -> PathBuf {
    cli_store
        .or_else(|| std::env::var_os("SPRIG_STORE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("tasks.json"))
}

fn run(cli: Cli, format: Format) -> sprig::error::Result<()> {
    let store = store_path(cli.store);

    match cli.command {
        Commands::Add {
            title,
            parent,
            position,
            due,
        } => sprig::commands::add::run(&store, title, parent, position, due, format),
        Commands::List { id } => sprig::commands::list::run(&store, id, format),
        Commands::Delete { id } => sprig::commands::delete::run(&store, id, format),
        Commands::Move {
            id,
            parent,
            position,
        } => sprig::commands::mv::run(&store, id, parent, position, format),
        Commands::Due { id, expr, clear } => {
            let expr = (!expr.is_empty()).then(|| expr.join(" "));
            sprig::commands::due::run(&store, id, expr, clear, format)
        }
        Commands::Repeat { id, days, clear } => {
            sprig::commands::repeat::run(&store, id, days, clear, format)
        }
        Commands::Done { id } => sprig::commands::done::run(&store, id, format),
        Commands::Today { on } => sprig::commands::today::run(&store, on, format),
        Commands::Clear => sprig::commands::clear::run(&store, format),
        Commands::Serve { addr } => sprig::commands::serve::run(&store, addr),
    }
}

fn main() {
    let cli = Cli::parse();
    let format = cli.format;
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
