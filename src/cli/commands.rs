use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cad", about = concat!("cadence v", env!("CARGO_PKG_VERSION"), " - working days, carried over honestly"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Data directory holding project files and config.toml
    #[arg(short = 'C', long = "data-dir", global = true, default_value = ".cadence")]
    pub data_dir: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project
    Init(InitArgs),
    /// Show a project's current status
    Status(StatusArgs),
    /// Add a task (lands on today on the first day, on tomorrow while accepting)
    Add(AddArgs),
    /// Change a task's state
    State(StateArgs),
    /// Mark a task done (shortcut for state <ID> done)
    Done(DoneArgs),
    /// Record progress on a task
    Progress(ProgressArgs),
    /// Run day-close reconciliation and carry-over migration
    Close(CloseArgs),
    /// Show one day's categories, tasks, and success rate
    Day(DayArgs),
    /// Show per-day success rates and the overall success rate
    Metrics(MetricsArgs),
    /// Show weekday averages across all projects
    Week,
    /// Add a project category
    Category(CategoryArgs),
    /// Manage the backlog bucket
    Bucket(BucketCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Project name
    pub name: String,
    /// Working day start, HH:MM
    #[arg(long, default_value = "09:00")]
    pub start: String,
    /// Working day close, HH:MM
    #[arg(long, default_value = "17:00")]
    pub close: String,
    /// Minutes past close during which the day still counts as open
    #[arg(long, default_value_t = 0)]
    pub tolerance: u16,
    /// Remind when the closing time approaches
    #[arg(long)]
    pub notify: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    pub project: String,
}

#[derive(Args)]
pub struct AddArgs {
    pub project: String,
    pub category: String,
    pub title: String,
    /// Free-form note
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Args)]
pub struct StateArgs {
    pub project: String,
    pub task_id: u64,
    /// One of: pending, done, not-applicable, dilate, verify, verified, not-verified
    pub state: String,
}

#[derive(Args)]
pub struct DoneArgs {
    pub project: String,
    pub task_id: u64,
}

#[derive(Args)]
pub struct ProgressArgs {
    pub project: String,
    pub task_id: u64,
    /// Completion percentage, 0-100
    pub percent: f64,
}

#[derive(Args)]
pub struct CloseArgs {
    pub project: String,
}

#[derive(Args)]
pub struct DayArgs {
    pub project: String,
    /// Calendar date (YYYY-MM-DD); defaults to the most recent day
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args)]
pub struct MetricsArgs {
    pub project: String,
    /// Include days that never got a task
    #[arg(long)]
    pub with_empty: bool,
}

#[derive(Args)]
pub struct CategoryArgs {
    pub project: String,
    pub name: String,
}

#[derive(Args)]
pub struct BucketCmd {
    pub project: String,
    #[command(subcommand)]
    pub action: BucketAction,
}

#[derive(Subcommand)]
pub enum BucketAction {
    /// List bucket entries
    List,
    /// Add a backlog entry
    Add {
        name: String,
        #[arg(long, default_value_t = 0)]
        priority: u8,
    },
    /// Turn a bucket entry into a task
    Promote { entry_id: u64, category: String },
}
