mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::engine::drag::resolve_drop_target;
use crate::engine::{Board, BoardOptions, DropOutcome};
use crate::io::config_io;
use crate::io::persist::Persister;
use crate::io::storage::FileStorage;
use crate::model::feature::{Priority, SubtaskStatus};
use crate::model::icon::IconKey;
use crate::ops::ItemRef;
use crate::ops::column_ops::ColumnPatch;
use crate::ops::feature_ops::{AttachmentDraft, FeatureDraft, FeaturePatch};
use crate::ops::project_ops::ProjectPatch;
use crate::ops::subtask_ops::SubtaskSelection;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one subcommand. Everything except `init` loads the stored board,
/// applies one change through the `Board` facade and writes it back.
pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = data_dir(&cli);

    let Some(cmd) = cli.command else {
        return Err("no subcommand given (try `plank --help`)".into());
    };
    match cmd {
        Commands::Init => cmd_init(&data_dir),

        // Read commands
        Commands::Board(args) => with_board(&data_dir, |b| cmd_board(b, args, json)),
        Commands::Show(args) => with_board(&data_dir, |b| cmd_show(b, args, json)),

        // Feature commands
        Commands::Add(args) => with_board(&data_dir, |b| cmd_add(b, args)),
        Commands::Mv(args) => with_board(&data_dir, |b| cmd_mv(b, args)),
        Commands::Edit(args) => with_board(&data_dir, |b| cmd_edit(b, args)),
        Commands::Rm(args) => with_board(&data_dir, |b| {
            b.delete_feature(&args.id)?;
            println!("deleted {}", args.id);
            Ok(())
        }),
        Commands::Assign(args) => with_board(&data_dir, |b| {
            let assigned = b.toggle_feature_assignee(&args.id, &args.user)?;
            println!("{} {}", if assigned { "assigned" } else { "unassigned" }, args.user);
            Ok(())
        }),

        Commands::Sub(args) => with_board(&data_dir, |b| cmd_sub(b, args)),
        Commands::Column(args) => with_board(&data_dir, |b| cmd_column(b, args, json)),
        Commands::Project(args) => with_board(&data_dir, |b| cmd_project(b, args, json)),

        // Notes and attachments
        Commands::Note(args) => with_board(&data_dir, |b| {
            let item = item_ref(&args.feature, args.sub.as_deref());
            if b.save_note(&item, &args.text)? {
                println!("note saved on {}", item);
            }
            Ok(())
        }),
        Commands::Attach(args) => with_board(&data_dir, |b| cmd_attach(b, args)),
        Commands::Detach(args) => with_board(&data_dir, |b| {
            let item = item_ref(&args.feature, args.sub.as_deref());
            b.remove_attachment(&item, &args.attachment)?;
            println!("removed {}", args.attachment);
            Ok(())
        }),
    }
}

/// The data directory from `-C`, `PLANK_DIR`, or the default
pub fn data_dir(cli: &Cli) -> PathBuf {
    config_io::resolve_data_dir(cli.data_dir.as_deref().map(Path::new))
}

/// Load config and the stored board from a data directory
pub fn open_board(data_dir: &Path) -> Result<Board, Box<dyn std::error::Error>> {
    let config = config_io::read_config(data_dir)?;
    let persister = Persister::new(Box::new(FileStorage::new(data_dir)))
        .with_stale_after_days(config.storage.stale_after_days);
    Ok(Board::open(persister, BoardOptions::from_config(&config), Utc::now()))
}

/// Open the board, run `f`, then write any change straight to disk.
/// A failed command leaves the stored board untouched.
fn with_board<F>(data_dir: &Path, f: F) -> CmdResult
where
    F: FnOnce(&mut Board) -> CmdResult,
{
    let mut board = open_board(data_dir)?;
    f(&mut board)?;
    if board.has_unsaved_changes() && !board.flush() {
        return Err("the board could not be saved (see log)".into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("invalid priority: {} (low, medium, high, critical)", s))
}

fn parse_icon(s: &str) -> Result<IconKey, String> {
    IconKey::parse(s).ok_or_else(|| {
        let keys: Vec<&str> = IconKey::ALL.iter().map(|k| k.key()).collect();
        format!("invalid icon: {} ({})", s, keys.join(", "))
    })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("invalid date: {} (use YYYY-MM-DD)", s))
}

/// Empty string clears an optional date
fn parse_optional_date(s: &str) -> Result<Option<NaiveDate>, String> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(s).map(Some)
    }
}

fn parse_status(s: &str) -> Result<SubtaskStatus, String> {
    SubtaskStatus::parse(s).ok_or_else(|| format!("invalid status: {} (todo, inprogress, done)", s))
}

/// `FEATURE/SUB` as used by `sub assign-all --sub`
fn parse_selection(s: &str) -> Result<SubtaskSelection, String> {
    match s.split_once('/') {
        Some((f, sub)) if !f.is_empty() && !sub.is_empty() => Ok(SubtaskSelection::new(f, sub)),
        _ => Err(format!("invalid subtask reference: {} (use FEATURE/SUB)", s)),
    }
}

fn item_ref(feature: &str, sub: Option<&str>) -> ItemRef {
    match sub {
        Some(sub) => ItemRef::subtask(feature, sub),
        None => ItemRef::feature(feature),
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "md" => "text/markdown",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_board(board: &mut Board, args: BoardArgs, json: bool) -> CmdResult {
    if let Some(user) = args.user {
        let filter = if user.is_empty() { None } else { Some(user) };
        board.set_filter_by_user(filter)?;
    }
    let mut columns = listed_columns(board, args.all);
    if let Some(ref only) = args.column {
        columns.retain(|c| &c.id == only);
        if columns.is_empty() {
            return Err(format!("column not found: {}", only).into());
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&board_to_json(board, &columns))?);
    } else {
        for line in format_board(board, &columns) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(board: &Board, args: ShowArgs, json: bool) -> CmdResult {
    let project = board.active_project().ok_or("no active project")?;
    let feature = project
        .feature(&args.id)
        .ok_or_else(|| format!("feature not found: {}", args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(feature)?);
    } else {
        let column = project.column(&feature.status);
        for line in format_feature(feature, column, board.roster()) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Feature commands
// ---------------------------------------------------------------------------

fn cmd_add(board: &mut Board, args: AddArgs) -> CmdResult {
    let column = match args.column {
        Some(c) => c,
        None => board
            .nth_visible_column(0)
            .map(|c| c.id.clone())
            .ok_or("the board has no visible column")?,
    };
    let draft = FeatureDraft {
        title: args.title,
        description: args.description.unwrap_or_default(),
        priority: args.priority.as_deref().map(parse_priority).transpose()?.unwrap_or_default(),
        category: args.category.unwrap_or_default(),
        icon: args.icon.as_deref().map(parse_icon).transpose()?.unwrap_or_default(),
        assignees: args.assignees,
        due_date: args.due.as_deref().map(parse_date).transpose()?,
        estimate_hours: args.estimate,
    };
    let id = board.create_feature(&column, draft)?;
    println!("{}", id);
    Ok(())
}

/// Same resolution as a drag: a column id, or a feature id meaning "its column"
fn cmd_mv(board: &mut Board, args: MvArgs) -> CmdResult {
    let project = board.active_project().ok_or("no active project")?;
    if project.feature(&args.id).is_none() {
        return Err(format!("feature not found: {}", args.id).into());
    }
    let target = resolve_drop_target(project, board.visibility(), Some(&args.target))?;
    match board.drop_feature(&args.id, Some(&target)) {
        DropOutcome::Moved { feature_id, from, to } => println!("{}: {} -> {}", feature_id, from, to),
        DropOutcome::AlreadyThere { column_id } => println!("{} is already in {}", args.id, column_id),
        DropOutcome::Rejected(reason) => return Err(reason.into()),
    }
    Ok(())
}

fn cmd_edit(board: &mut Board, args: EditArgs) -> CmdResult {
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due.as_deref().map(parse_date).transpose()?.map(Some)
    };
    let patch = FeaturePatch {
        title: args.title,
        description: args.description,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        category: args.category,
        icon: args.icon.as_deref().map(parse_icon).transpose()?,
        due_date,
        estimate_hours: args.estimate.map(Some),
        actual_hours: args.actual.map(Some),
    };
    if patch.is_empty() {
        return Err("nothing to edit (see `plank edit --help`)".into());
    }
    if board.edit_feature(&args.id, &patch)? {
        println!("updated {}", args.id);
    } else {
        println!("{} unchanged", args.id);
    }
    Ok(())
}

fn cmd_attach(board: &mut Board, args: AttachArgs) -> CmdResult {
    let path = Path::new(&args.path);
    let meta = std::fs::metadata(path).map_err(|e| format!("cannot read {}: {}", args.path, e))?;
    let storage_ref = std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();
    let draft = AttachmentDraft {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.path.clone()),
        size: meta.len(),
        mime_type: guess_mime(path).to_string(),
        storage_ref,
    };
    let item = item_ref(&args.feature, args.sub.as_deref());
    let id = board.add_attachment(&item, draft)?;
    println!("{}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Subtask commands
// ---------------------------------------------------------------------------

fn cmd_sub(board: &mut Board, args: SubCmd) -> CmdResult {
    match args.action {
        SubAction::Add(a) => {
            let id = board.add_subtask(&a.feature, &a.title)?;
            println!("{}", id);
        }
        SubAction::Advance(a) => {
            let status = board.advance_subtask(&a.feature, &a.sub)?;
            println!("{} {}", a.sub, status.label());
        }
        SubAction::Status(a) => {
            let status = parse_status(&a.status)?;
            board.set_subtask_status(&a.feature, &a.sub, status)?;
            println!("{} {}", a.sub, status.label());
        }
        SubAction::Assign(a) => {
            let assigned = board.toggle_subtask_assignee(&a.feature, &a.sub, &a.user)?;
            println!("{} {}", if assigned { "assigned" } else { "unassigned" }, a.user);
        }
        SubAction::AssignAll(a) => {
            let selection = a
                .subs
                .iter()
                .map(|s| parse_selection(s))
                .collect::<Result<Vec<_>, _>>()?;
            let changed = board.bulk_assign_subtasks(&selection, &a.users)?;
            println!("updated {} subtask(s)", changed);
        }
        SubAction::Rm(a) => {
            board.delete_subtask(&a.feature, &a.sub)?;
            println!("deleted {}", a.sub);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Column commands
// ---------------------------------------------------------------------------

fn cmd_column(board: &mut Board, args: ColumnCmd, json: bool) -> CmdResult {
    match args.action {
        ColumnAction::List => {
            let project = board.active_project().ok_or("no active project")?;
            let infos: Vec<ColumnInfoJson> = project
                .ordered_columns()
                .into_iter()
                .map(|c| ColumnInfoJson {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    color: c.color.clone(),
                    order: c.order,
                    visible: board.visibility().is_visible(&c.id),
                    features: project.features_in(&c.id).len(),
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&infos)?);
            } else {
                for c in &infos {
                    let hidden = if c.visible { "" } else { "  (hidden)" };
                    println!("{:<12} {:<16} {:>3}{}", c.id, c.name, c.features, hidden);
                }
            }
        }
        ColumnAction::Add(a) => {
            let id = board.add_column(&a.name, &a.color)?;
            println!("{}", id);
        }
        ColumnAction::Edit(a) => {
            let patch = ColumnPatch {
                name: a.name,
                color: a.color,
            };
            board.edit_column(&a.id, &patch)?;
            println!("updated {}", a.id);
        }
        ColumnAction::Mv(a) => {
            board.move_column(&a.id, a.position)?;
            println!("moved {} to {}", a.id, a.position);
        }
        ColumnAction::Rm(a) => {
            let deletion = board.delete_column(&a.id, a.yes).map_err(|e| match e {
                crate::ops::BoardError::ConfirmationRequired { .. } => format!("{} (pass --yes)", e),
                other => other.to_string(),
            })?;
            if deletion.reassigned.is_empty() {
                println!("deleted {}", a.id);
            } else {
                println!(
                    "deleted {}; moved {} feature(s) to {}",
                    a.id,
                    deletion.reassigned.len(),
                    deletion.target
                );
            }
        }
        ColumnAction::Hide(a) => {
            board.hide_column(&a.id)?;
            println!("hid {}", a.id);
        }
        ColumnAction::Show(a) => {
            board.show_column(&a.id)?;
            println!("showing {}", a.id);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Project commands
// ---------------------------------------------------------------------------

fn cmd_project(board: &mut Board, args: ProjectCmd, json: bool) -> CmdResult {
    match args.action {
        ProjectAction::List => {
            let active = board.store().active_project_id();
            let infos: Vec<ProjectInfoJson> = board
                .store()
                .projects()
                .iter()
                .map(|p| ProjectInfoJson {
                    id: p.id.clone(),
                    name: p.name().to_string(),
                    active: p.id == active,
                    owner: p.meta.owner.clone(),
                    collaborators: p.meta.collaborators.clone(),
                    columns: p.columns.len(),
                    features: p.features.len(),
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&infos)?);
            } else {
                for p in &infos {
                    let marker = if p.active { "*" } else { " " };
                    println!("{} {:<16} {} ({} features)", marker, p.id, p.name, p.features);
                }
            }
        }
        ProjectAction::New(a) => {
            let id = board.create_project(&a.name)?;
            println!("{}", id);
        }
        ProjectAction::Use(a) => {
            board.switch_project(&a.id)?;
            println!("switched to {}", a.id);
        }
        ProjectAction::Edit(a) => {
            let patch = ProjectPatch {
                name: a.name,
                description: a.description,
                color: a.color,
                deadline: a.deadline.as_deref().map(parse_optional_date).transpose()?,
                release_date: a.release.as_deref().map(parse_optional_date).transpose()?,
            };
            board.edit_project(&patch)?;
            println!("updated project");
        }
        ProjectAction::Rm(a) => {
            board.delete_project(&a.id)?;
            println!("deleted {}", a.id);
        }
        ProjectAction::Invite(a) => {
            board.add_collaborator(&a.user)?;
            println!("added {}", a.user);
        }
        ProjectAction::Uninvite(a) => {
            board.remove_collaborator(&a.user)?;
            println!("removed {}", a.user);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn selection_parsing() {
        assert_eq!(parse_selection("f1/s1").unwrap(), SubtaskSelection::new("f1", "s1"));
        assert!(parse_selection("f1").is_err());
        assert!(parse_selection("/s1").is_err());
    }

    #[test]
    fn optional_dates() {
        assert_eq!(parse_optional_date("").unwrap(), None);
        assert_eq!(
            parse_optional_date("2026-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 1)
        );
        assert!(parse_optional_date("May 1").is_err());
    }

    #[test]
    fn mime_by_extension() {
        assert_eq!(guess_mime(Path::new("shot.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("blob")), "application/octet-stream");
    }
}
