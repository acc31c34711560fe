//! trip-dashboard - command line front end for the dashboard core
//!
//! Works against the CSV/YAML data directory; every command is one page
//! interaction (search, add, edit, delete, export) or a session change.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use shared::{EntityKind, Record, Role, SearchCriteria};
use trip_dashboard::backend::{
    default_data_directory, initialize_backend, DashboardContext, FileRecordPage, SearchOutcome, Sidebar,
};

/// trip-dashboard - role-gated trip and expense records
#[derive(Parser, Debug)]
#[command(name = "trip-dashboard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory (defaults to $TRIP_DASHBOARD_DATA_DIR or ~/Documents/Trip Dashboard)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with a name and role
    Login {
        #[arg(long)]
        name: String,

        /// Admin, Accountant or User
        #[arg(long, default_value = "User")]
        role: Role,
    },

    /// Sign out
    Logout,

    /// Show the current session
    Whoami,

    /// Show the sidebar links for the current session
    Nav,

    /// Search records by date range and show one page
    Search {
        /// trips or expenses
        kind: EntityKind,

        /// Lower date bound (YYYY-MM-DD or DD-MM-YYYY)
        #[arg(long)]
        from: Option<String>,

        /// Upper date bound (YYYY-MM-DD or DD-MM-YYYY)
        #[arg(long)]
        to: Option<String>,

        /// Page to show
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Create a record from field=value pairs
    Add {
        kind: EntityKind,

        /// field=value pairs
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Update fields of an existing record
    Edit {
        kind: EntityKind,

        id: String,

        /// field=value pairs
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Delete a record
    Delete {
        kind: EntityKind,

        id: String,

        /// Confirm the delete
        #[arg(long)]
        yes: bool,
    },

    /// Export the records matching a date range as CSV
    Export {
        kind: EntityKind,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// Directory to write into (defaults to the configured export directory)
        #[arg(long)]
        out: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.as_str())).init();

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_directory);
    info!("Starting trip-dashboard with data directory {}", data_dir.display());
    let context = initialize_backend(&data_dir)?;

    match cli.command {
        Commands::Login { name, role } => login(&context, &name, role),
        Commands::Logout => {
            context.session_service.clear_session()?;
            println!("Signed out");
            Ok(())
        }
        Commands::Whoami => {
            let session = context.session_service.get_session();
            if session.is_authenticated {
                println!("{} ({})", session.display_name(), session.role);
            } else {
                println!("Not signed in");
            }
            Ok(())
        }
        Commands::Nav => {
            print_sidebar(&Sidebar::for_session(&context.session_service.get_session()));
            Ok(())
        }
        Commands::Search { kind, from, to, page } => search(&context, kind, from, to, page).await,
        Commands::Add { kind, fields } => add(&context, kind, &fields).await,
        Commands::Edit { kind, id, fields } => edit(&context, kind, &id, &fields).await,
        Commands::Delete { kind, id, yes } => delete(&context, kind, &id, yes).await,
        Commands::Export { kind, from, to, out } => export(&context, kind, from, to, out.as_deref()).await,
    }
}

fn login(context: &DashboardContext, name: &str, role: Role) -> Result<()> {
    if name.trim().is_empty() {
        bail!("A name is required to sign in");
    }
    let session = context.session_service.login(name, role)?;
    println!("Signed in as {} ({})", session.display_name(), session.role);
    print_sidebar(&Sidebar::for_session(&session));
    Ok(())
}

fn print_sidebar(sidebar: &Sidebar) {
    println!("{}", sidebar.welcome_label);
    for entry in &sidebar.entries {
        println!("  {:<10} {}", entry.label, entry.path);
    }
    if sidebar.show_logout {
        println!("  Logout");
    }
}

/// Split `field=value` arguments
fn parse_assignments(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("Expected field=value, got '{}'", pair))?;
            let key = key.trim();
            if key.is_empty() {
                bail!("Empty field name in '{}'", pair);
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// A page loaded with every record of `kind`
async fn load_all(context: &DashboardContext, kind: EntityKind) -> Result<FileRecordPage> {
    let mut page = context.page(kind);
    if let SearchOutcome::Failed(message) = page.search(SearchCriteria::default()).await? {
        bail!(message);
    }
    Ok(page)
}

/// A page loaded with every record, positioned on the one holding `id`
async fn load_showing(context: &DashboardContext, kind: EntityKind, id: &str) -> Result<FileRecordPage> {
    let mut page = load_all(context, kind).await?;
    if !page.show_record(id) {
        bail!("No {} with id '{}'", kind.display_name().to_lowercase(), id);
    }
    Ok(page)
}

fn print_record(kind: EntityKind, record: &Record) {
    let summary: Vec<String> = kind
        .columns()
        .iter()
        .filter_map(|column| {
            let value = record.text(column.key);
            (!value.is_empty()).then(|| format!("{}: {}", column.label, value))
        })
        .collect();
    println!("{}  {}", record.id, summary.join(" | "));
}

async fn search(
    context: &DashboardContext,
    kind: EntityKind,
    from: Option<String>,
    to: Option<String>,
    page_number: usize,
) -> Result<()> {
    let mut page = context.page(kind);
    let outcome = page.search(SearchCriteria::from_bounds(from, to)).await?;

    match &outcome {
        SearchOutcome::Failed(message) => bail!(message.clone()),
        SearchOutcome::Empty => {
            println!("{}", outcome.notification().unwrap_or_default());
            return Ok(());
        }
        SearchOutcome::Loaded { .. } | SearchOutcome::Stale => {}
    }

    while page.list().current_page() < page_number && page.next_page() {}

    for record in page.list().current_page_records() {
        print_record(kind, record);
    }
    println!(
        "{} ({} records)",
        page.list().page_label(),
        page.list().records().len()
    );
    Ok(())
}

async fn add(context: &DashboardContext, kind: EntityKind, fields: &[String]) -> Result<()> {
    let assignments = parse_assignments(fields)?;
    let mut page = context.page(kind);
    page.open_create()?;
    for (key, value) in assignments {
        page.set_field(&key, value);
    }
    let submission = page.submit().await?;
    println!("Created {} {}", kind.display_name().to_lowercase(), submission.id());
    Ok(())
}

async fn edit(context: &DashboardContext, kind: EntityKind, id: &str, fields: &[String]) -> Result<()> {
    let assignments = parse_assignments(fields)?;
    let mut page = load_showing(context, kind, id).await?;
    page.open_edit(id)?;
    for (key, value) in assignments {
        page.set_field(&key, value);
    }
    let submission = page.submit().await?;
    println!("Updated {} {}", kind.display_name().to_lowercase(), submission.id());
    Ok(())
}

async fn delete(context: &DashboardContext, kind: EntityKind, id: &str, confirmed: bool) -> Result<()> {
    let mut page = load_showing(context, kind, id).await?;
    let pending = page.request_delete(id)?;
    if !confirmed {
        bail!("{} Re-run with --yes to confirm.", pending.prompt());
    }
    let outcome = page.confirm_delete(pending).await?;
    println!("{:?}: {} {}", outcome, kind.display_name().to_lowercase(), id);
    Ok(())
}

async fn export(
    context: &DashboardContext,
    kind: EntityKind,
    from: Option<String>,
    to: Option<String>,
    out: Option<&str>,
) -> Result<()> {
    let mut page = context.page(kind);
    if let SearchOutcome::Failed(message) = page.search(SearchCriteria::from_bounds(from, to)).await? {
        bail!(message);
    }
    let payload = page.export()?;
    let path = context
        .export_service
        .export_to_path(&payload, out)
        .with_context(|| format!("Failed to export {}", kind.collection()))?;
    println!("Exported {} records to {}", payload.record_count, path.display());
    Ok(())
}
