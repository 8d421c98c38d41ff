use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde_json::json;

use crate::cli::commands::*;
use crate::io::config_io;
use crate::io::repository::{JsonRepository, Repository};
use crate::model::config::EngineConfig;
use crate::model::project::Project;
use crate::model::task::{TaskId, TaskState};
use crate::ops::metrics::{
    day_success_rate, most_productive_day, project_osr, refresh_day_sr, refresh_project_osr,
    weekly_aggregates,
};
use crate::ops::migrate::migrate_queues;
use crate::ops::sanity::run_day_close_checks;
use crate::ops::status::project_status;
use crate::ops::task_ops;
use crate::time::{Clock, SystemClock, TimeOfDay};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let ctx = Context {
        repo: JsonRepository::new(PathBuf::from(&cli.data_dir)),
        json: cli.json,
    };
    match cli.command {
        Commands::Init(args) => cmd_init(&ctx, args),
        Commands::Status(args) => cmd_status(&ctx, args),
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::State(args) => cmd_state(&ctx, args.project, args.task_id, &args.state),
        Commands::Done(args) => cmd_state(&ctx, args.project, args.task_id, "done"),
        Commands::Progress(args) => cmd_progress(&ctx, args),
        Commands::Close(args) => cmd_close(&ctx, args),
        Commands::Day(args) => cmd_day(&ctx, args),
        Commands::Metrics(args) => cmd_metrics(&ctx, args),
        Commands::Week => cmd_week(&ctx),
        Commands::Category(args) => cmd_category(&ctx, args),
        Commands::Bucket(args) => cmd_bucket(&ctx, args),
    }
}

struct Context {
    repo: JsonRepository,
    json: bool,
}

impl Context {
    fn config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        Ok(config_io::read_config(self.repo.root())?)
    }
}

fn parse_state(s: &str) -> Result<TaskState, Box<dyn Error>> {
    match s {
        "pending" => Ok(TaskState::Pending),
        "done" => Ok(TaskState::Done),
        "not-done" => Ok(TaskState::NotDone),
        "not-applicable" | "na" => Ok(TaskState::NotApplicable),
        "dilate" => Ok(TaskState::Dilate),
        "verify" => Ok(TaskState::Verify),
        "verified" => Ok(TaskState::Verified),
        "not-verified" => Ok(TaskState::NotVerified),
        other => Err(format!("unknown state: {}", other).into()),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_init(ctx: &Context, args: InitArgs) -> Result<(), Box<dyn Error>> {
    let now = SystemClock.now();
    let mut project = Project::new(
        args.name,
        now.date_naive(),
        args.start.parse::<TimeOfDay>()?,
        args.close.parse::<TimeOfDay>()?,
        args.tolerance,
    )?;
    project.notify_closing_time = args.notify;
    ctx.repo.persist(&project)?;
    println!(
        "created project '{}' ({}-{})",
        project.name, project.starting_time, project.closing_time
    );
    Ok(())
}

fn cmd_status(ctx: &Context, args: StatusArgs) -> Result<(), Box<dyn Error>> {
    let project = ctx.repo.fetch_project(&args.project)?;
    let status = project_status(&project, SystemClock.now(), &ctx.config()?);
    if ctx.json {
        println!("{}", json!({ "project": project.name, "status": status }));
    } else {
        println!("{}: {}", project.name, status);
    }
    Ok(())
}

fn cmd_add(ctx: &Context, args: AddArgs) -> Result<(), Box<dyn Error>> {
    let mut project = ctx.repo.fetch_project(&args.project)?;
    let id = task_ops::add_task(
        &mut project,
        SystemClock.now(),
        &ctx.config()?,
        &args.category,
        &args.title,
        args.note,
    )?;
    let date = project.locate_task(id).map(|l| l.date);
    ctx.repo.persist(&project)?;
    match date {
        Some(date) => println!("added {} under {} on {}", id, args.category, date),
        None => println!("added {}", id),
    }
    Ok(())
}

fn cmd_state(
    ctx: &Context,
    project_name: String,
    task_id: u64,
    state: &str,
) -> Result<(), Box<dyn Error>> {
    let mut project = ctx.repo.fetch_project(&project_name)?;
    let to = parse_state(state)?;
    task_ops::set_task_state(&mut project, SystemClock.now(), &ctx.config()?, TaskId(task_id), to)?;
    ctx.repo.persist(&project)?;
    println!("{} -> {}", TaskId(task_id), to);
    Ok(())
}

fn cmd_progress(ctx: &Context, args: ProgressArgs) -> Result<(), Box<dyn Error>> {
    let mut project = ctx.repo.fetch_project(&args.project)?;
    task_ops::set_completion(&mut project, TaskId(args.task_id), args.percent)?;
    ctx.repo.persist(&project)?;
    println!("{} at {}%", TaskId(args.task_id), args.percent);
    Ok(())
}

/// The day-close batch: reconcile, migrate, refresh cached metrics, persist
/// once. Safe to re-run; a pass whose gate is not met reports and changes
/// nothing.
fn cmd_close(ctx: &Context, args: CloseArgs) -> Result<(), Box<dyn Error>> {
    let mut project = ctx.repo.fetch_project(&args.project)?;
    let config = ctx.config()?;
    let now = SystemClock.now();
    let today = now.date_naive();

    let report = run_day_close_checks(&mut project, now, &config);
    let migrated_to = if report.ran {
        let day = migrate_queues(&mut project, now, &config)?;
        Some(day.date)
    } else {
        None
    };
    for day in project.days.values_mut() {
        refresh_day_sr(day);
    }
    refresh_project_osr(&mut project, today);
    ctx.repo.persist(&project)?;

    if ctx.json {
        println!(
            "{}",
            json!({
                "report": report,
                "migrated_to": migrated_to,
                "osr": project.osr,
            })
        );
    } else if !report.ran {
        println!("{}: not at day-close; nothing to do", project.name);
    } else {
        println!(
            "{}: {} not done, {} carried, {} dilated{}",
            project.name,
            report.marked_not_done,
            report.queued_pending,
            report.queued_dilate,
            migrated_to
                .map(|d| format!(", moved to {}", d))
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn cmd_day(ctx: &Context, args: DayArgs) -> Result<(), Box<dyn Error>> {
    let project = ctx.repo.fetch_project(&args.project)?;
    let date = match args.date {
        Some(s) => Some(s.parse::<NaiveDate>()?),
        None => project.days.keys().max().copied(),
    };
    let Some(date) = date else {
        println!("{}: no days yet", project.name);
        return Ok(());
    };
    let Some(day) = project.day(date) else {
        return Err(format!("no day recorded for {}", date).into());
    };

    if ctx.json {
        println!("{}", json!({ "day": day, "sr": day_success_rate(day) }));
        return Ok(());
    }
    println!("{} — {} (sr {:.1})", project.name, day.date, day_success_rate(day));
    for category in &day.categories {
        println!("  {}", category.name);
        for task in &category.tasks {
            println!(
                "    {} [{}] {} ({:.0}%)",
                task.id, task.state, task.name, task.completion
            );
        }
    }
    Ok(())
}

fn cmd_metrics(ctx: &Context, args: MetricsArgs) -> Result<(), Box<dyn Error>> {
    let project = ctx.repo.fetch_project(&args.project)?;
    let today = SystemClock.now().date_naive();
    let osr = project_osr(&project, today, !args.with_empty);
    if ctx.json {
        let days: Vec<_> = project
            .days
            .values()
            .map(|d| json!({ "date": d.date, "sr": day_success_rate(d) }))
            .collect();
        println!("{}", json!({ "project": project.name, "osr": osr, "days": days }));
        return Ok(());
    }
    for day in project.days.values() {
        let marker = if day.date > today { " (upcoming)" } else { "" };
        println!("{}  sr {:>5.1}{}", day.date, day_success_rate(day), marker);
    }
    println!("overall: {:.1}", osr);
    Ok(())
}

fn cmd_week(ctx: &Context) -> Result<(), Box<dyn Error>> {
    let projects = ctx.repo.fetch_all()?;
    let refs: Vec<&Project> = projects.iter().collect();
    let today = SystemClock.now().date_naive();
    let week = weekly_aggregates(&refs, today);
    let best = most_productive_day(&refs, today);

    use chrono::Weekday::*;
    if ctx.json {
        let days: Vec<_> = [Mon, Tue, Wed, Thu, Fri, Sat, Sun]
            .iter()
            .map(|wd| json!({ "weekday": wd.to_string(), "sr": week.get(*wd) }))
            .collect();
        println!(
            "{}",
            json!({ "weekdays": days, "most_productive": best.map(|w| w.to_string()) })
        );
        return Ok(());
    }
    for wd in [Mon, Tue, Wed, Thu, Fri, Sat, Sun] {
        println!("{}  {:>5.1}  ({} days)", wd, week.get(wd), week.observations(wd));
    }
    match best {
        Some(wd) => println!("most productive: {}", wd),
        None => println!("most productive: no history yet"),
    }
    Ok(())
}

fn cmd_category(ctx: &Context, args: CategoryArgs) -> Result<(), Box<dyn Error>> {
    let mut project = ctx.repo.fetch_project(&args.project)?;
    project.add_category(&args.name)?;
    ctx.repo.persist(&project)?;
    println!("added category '{}'", args.name);
    Ok(())
}

fn cmd_bucket(ctx: &Context, args: BucketCmd) -> Result<(), Box<dyn Error>> {
    let mut project = ctx.repo.fetch_project(&args.project)?;
    match args.action {
        BucketAction::List => {
            for entry in &project.bucket {
                println!("{:>4}  p{}  {}", entry.id, entry.priority, entry.name);
            }
        }
        BucketAction::Add { name, priority } => {
            let now = SystemClock.now();
            let id = project.add_bucket_entry(&name, priority, now.date_naive())?;
            ctx.repo.persist(&project)?;
            println!("bucketed {} as entry {}", name, id);
        }
        BucketAction::Promote { entry_id, category } => {
            let task_id = task_ops::promote_bucket_entry(
                &mut project,
                SystemClock.now(),
                &ctx.config()?,
                entry_id,
                &category,
            )?;
            ctx.repo.persist(&project)?;
            println!("promoted entry {} to task {}", entry_id, task_id);
        }
    }
    Ok(())
}
