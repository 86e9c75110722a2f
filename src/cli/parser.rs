use crate::export::ExportFormat;
use crate::models::check_in_method::CheckInMethod;
use crate::models::fine::FineStatus;
use crate::models::shift::ShiftStatus;
use crate::models::violation_kind::ViolationKind;
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for ronda
/// CLI application to run neighborhood night patrols with SQLite
#[derive(Parser)]
#[command(
    name = "ronda",
    version = env!("CARGO_PKG_VERSION"),
    about = "Neighborhood night-patrol scheduling, geofenced check-ins and fines, backed by SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Neighborhood every command is scoped to (default: from config)
    #[arg(global = true, long = "neighborhood", short = 'n')]
    pub neighborhood: Option<i64>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show or edit the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Specify the editor to use")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f', help = "Overwrite without asking")]
        force: bool,
    },

    /// Patrol shifts
    Shift {
        #[command(subcommand)]
        action: ShiftAction,
    },

    /// Geofenced checkpoints and their tokens
    Checkpoint {
        #[command(subcommand)]
        action: CheckpointAction,
    },

    /// Residents assigned to shifts
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },

    /// Check a participant in at a checkpoint
    Checkin(AttendanceArgs),

    /// Check a participant out
    Checkout(AttendanceArgs),

    /// Fine policies of the neighborhood
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },

    /// Evaluate a shift (or every finished shift) and issue fines
    Evaluate {
        /// Shift to evaluate
        #[arg(required_unless_present = "due", conflicts_with = "due")]
        shift: Option<i64>,

        #[arg(long, help = "Evaluate every ACTIVE shift that has already ended")]
        due: bool,

        #[arg(long, value_name = "TIMESTAMP", help = "Evaluation time (YYYY-MM-DDTHH:MM)")]
        at: Option<String>,
    },

    /// Issued fines
    Fines {
        #[command(subcommand)]
        action: FinesAction,
    },
}

#[derive(Subcommand)]
pub enum ShiftAction {
    /// Schedule a shift
    Add {
        #[arg(long)]
        label: String,

        #[arg(long = "start-date", value_name = "YYYY-MM-DD")]
        start_date: String,

        /// Defaults to the start date (the day after, for an overnight window)
        #[arg(long = "end-date", value_name = "YYYY-MM-DD")]
        end_date: Option<String>,

        #[arg(long = "start", value_name = "HH:MM")]
        start: String,

        #[arg(long = "end", value_name = "HH:MM")]
        end: String,

        #[arg(long, help = "Default checkpoint for check-ins")]
        checkpoint: Option<i64>,
    },

    /// List shifts
    List {
        #[arg(long, value_enum)]
        status: Option<ShiftStatus>,
    },

    /// Cancel an ACTIVE shift
    Cancel { id: i64 },
}

#[derive(Subcommand)]
pub enum CheckpointAction {
    /// Create a checkpoint and issue its first token
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, value_name = "METERS")]
        radius: f64,

        #[arg(long, value_name = "MINUTES", help = "Token lifetime (default: from config)")]
        ttl: Option<i64>,
    },

    /// List checkpoints
    List {
        #[arg(long, help = "Also print the current tokens")]
        tokens: bool,
    },

    /// Issue a new token; the old one stops working immediately
    Rotate {
        id: i64,

        #[arg(long, value_name = "MINUTES", help = "Token lifetime (default: from config)")]
        ttl: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum RosterAction {
    /// Assign a resident to a shift (every occurrence unless --date)
    Assign {
        #[arg(long)]
        shift: i64,

        #[arg(long)]
        resident: i64,

        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },

    /// List the participants of a shift
    List {
        #[arg(long)]
        shift: i64,
    },

    /// Excuse a PENDING participant
    Excuse {
        id: i64,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Args)]
pub struct AttendanceArgs {
    /// Participant id
    pub participant: i64,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    #[arg(long)]
    pub token: Option<String>,

    #[arg(long, value_enum, help = "token | manual (default: from config)")]
    pub method: Option<CheckInMethod>,

    #[arg(long, help = "Checkpoint to verify against (default: the shift's)")]
    pub checkpoint: Option<i64>,

    #[arg(long, value_name = "TIMESTAMP", help = "Attempt time (YYYY-MM-DDTHH:MM)")]
    pub at: Option<String>,
}

#[derive(Subcommand)]
pub enum PolicyAction {
    /// Create or replace the policy for a violation kind
    Set {
        #[arg(long, value_enum)]
        kind: ViolationKind,

        #[arg(long)]
        amount: i64,

        #[arg(long, value_name = "MINUTES", help = "Grace period (default 0)")]
        tolerance: Option<i64>,

        #[arg(long, help = "Store the policy as inactive")]
        inactive: bool,
    },

    /// List policies
    List,
}

#[derive(Subcommand)]
pub enum FinesAction {
    /// List fines
    List {
        #[arg(long)]
        shift: Option<i64>,

        #[arg(long, value_enum)]
        status: Option<FineStatus>,

        #[arg(long, value_name = "TIMESTAMP", help = "Only fines generated at or after")]
        since: Option<String>,
    },

    /// Mark a fine as paid and hand it to the ledger
    Pay { id: i64 },

    /// Export fines for external consumers
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        shift: Option<i64>,

        #[arg(long, value_enum)]
        status: Option<FineStatus>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}
