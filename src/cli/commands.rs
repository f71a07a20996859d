use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "plank", about = concat!("plank v", env!("CARGO_PKG_VERSION"), " - a kanban board in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Data directory holding config.toml and the stored board
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory with a starter config.toml
    Init,
    /// Show the active board
    Board(BoardArgs),
    /// Show one feature with its subtasks
    Show(ShowArgs),
    /// Add a feature to a column
    Add(AddArgs),
    /// Move a feature onto a column or onto another feature's column
    Mv(MvArgs),
    /// Edit feature fields
    Edit(EditArgs),
    /// Delete a feature
    Rm(RmArgs),
    /// Toggle a user's assignment on a feature
    Assign(AssignArgs),
    /// Subtask commands
    Sub(SubCmd),
    /// Column management
    Column(ColumnCmd),
    /// Project management
    Project(ProjectCmd),
    /// Set (or clear, with an empty string) a note
    Note(NoteArgs),
    /// Attach a file's metadata to a feature or subtask
    Attach(AttachArgs),
    /// Remove an attachment
    Detach(DetachArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct BoardArgs {
    /// Only show this column
    #[arg(long)]
    pub column: Option<String>,
    /// Only show features this user works on (kept as the board filter; empty clears)
    #[arg(long)]
    pub user: Option<String>,
    /// Include hidden columns
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Feature ID
    pub id: String,
}

// ---------------------------------------------------------------------------
// Feature command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Feature title
    pub title: String,
    /// Column ID (default: first visible column)
    #[arg(long)]
    pub column: Option<String>,
    /// Description text
    #[arg(long)]
    pub description: Option<String>,
    /// Priority (low, medium, high, critical)
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Icon key (feature, bug, design, research, docs, infra, idea, release)
    #[arg(long)]
    pub icon: Option<String>,
    /// Assign a user (repeatable)
    #[arg(long = "assign", value_name = "USER")]
    pub assignees: Vec<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Estimate in hours
    #[arg(long)]
    pub estimate: Option<f64>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Feature ID
    pub id: String,
    /// Target column ID, or a feature ID whose column to join
    pub target: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Feature ID
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Priority (low, medium, high, critical)
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,
    /// Estimate in hours
    #[arg(long)]
    pub estimate: Option<f64>,
    /// Actual hours spent
    #[arg(long)]
    pub actual: Option<f64>,
}

#[derive(Args)]
pub struct RmArgs {
    /// Feature ID
    pub id: String,
}

#[derive(Args)]
pub struct AssignArgs {
    /// Feature ID
    pub id: String,
    /// User ID
    pub user: String,
}

// ---------------------------------------------------------------------------
// Subtask command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Add a subtask to a feature
    Add(SubAddArgs),
    /// Advance a subtask: todo -> inprogress -> done -> todo
    Advance(SubRefArgs),
    /// Set a subtask's status directly
    Status(SubStatusArgs),
    /// Toggle a user on a subtask
    Assign(SubAssignArgs),
    /// Give several subtasks the same assignees
    AssignAll(SubAssignAllArgs),
    /// Delete a subtask
    Rm(SubRefArgs),
}

#[derive(Args)]
pub struct SubAddArgs {
    /// Feature ID
    pub feature: String,
    /// Subtask title
    pub title: String,
}

#[derive(Args)]
pub struct SubRefArgs {
    /// Feature ID
    pub feature: String,
    /// Subtask ID
    pub sub: String,
}

#[derive(Args)]
pub struct SubStatusArgs {
    /// Feature ID
    pub feature: String,
    /// Subtask ID
    pub sub: String,
    /// New status (todo, inprogress, done)
    pub status: String,
}

#[derive(Args)]
pub struct SubAssignArgs {
    /// Feature ID
    pub feature: String,
    /// Subtask ID
    pub sub: String,
    /// User ID
    pub user: String,
}

#[derive(Args)]
pub struct SubAssignAllArgs {
    /// Subtask as FEATURE/SUB (repeatable)
    #[arg(long = "sub", value_name = "FEATURE/SUB", required = true)]
    pub subs: Vec<String>,
    /// User to assign (repeatable; none clears)
    #[arg(long = "user", value_name = "USER")]
    pub users: Vec<String>,
}

// ---------------------------------------------------------------------------
// Column command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ColumnCmd {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// List columns with visibility and card counts
    List,
    /// Add a column at the end
    Add(ColumnAddArgs),
    /// Rename or recolor a column
    Edit(ColumnEditArgs),
    /// Move a column to a position
    Mv(ColumnMvArgs),
    /// Delete a column, moving its features to the first remaining column
    Rm(ColumnRmArgs),
    /// Hide a column
    Hide(ColumnIdArg),
    /// Show a hidden column
    Show(ColumnIdArg),
}

#[derive(Args)]
pub struct ColumnAddArgs {
    /// Column name
    pub name: String,
    #[arg(long, default_value = "gray")]
    pub color: String,
}

#[derive(Args)]
pub struct ColumnEditArgs {
    /// Column ID
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct ColumnMvArgs {
    /// Column ID
    pub id: String,
    /// New position (0-indexed)
    pub position: usize,
}

#[derive(Args)]
pub struct ColumnRmArgs {
    /// Column ID
    pub id: String,
    /// Confirm moving the column's features
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ColumnIdArg {
    /// Column ID
    pub id: String,
}

// ---------------------------------------------------------------------------
// Project command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects
    List,
    /// Create a project and make it active
    New(ProjectNewArgs),
    /// Make a project active
    Use(ProjectIdArg),
    /// Edit the active project
    Edit(ProjectEditArgs),
    /// Delete a project
    Rm(ProjectIdArg),
    /// Add a collaborator to the active project
    Invite(UserArg),
    /// Remove a collaborator from the active project
    Uninvite(UserArg),
}

#[derive(Args)]
pub struct ProjectNewArgs {
    /// Project name
    pub name: String,
}

#[derive(Args)]
pub struct ProjectIdArg {
    /// Project ID
    pub id: String,
}

#[derive(Args)]
pub struct ProjectEditArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    /// Deadline (YYYY-MM-DD, empty clears)
    #[arg(long)]
    pub deadline: Option<String>,
    /// Release date (YYYY-MM-DD, empty clears)
    #[arg(long)]
    pub release: Option<String>,
}

#[derive(Args)]
pub struct UserArg {
    /// User ID
    pub user: String,
}

// ---------------------------------------------------------------------------
// Notes and attachments
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NoteArgs {
    /// Feature ID
    pub feature: String,
    /// Note text (empty clears the note)
    pub text: String,
    /// Put the note on this subtask instead
    #[arg(long)]
    pub sub: Option<String>,
}

#[derive(Args)]
pub struct AttachArgs {
    /// Feature ID
    pub feature: String,
    /// File to attach
    pub path: String,
    /// Attach to this subtask instead
    #[arg(long)]
    pub sub: Option<String>,
}

#[derive(Args)]
pub struct DetachArgs {
    /// Feature ID
    pub feature: String,
    /// Attachment ID
    pub attachment: String,
    #[arg(long)]
    pub sub: Option<String>,
}
