#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pms_timeline::backend::JsonFileBackend;
use pms_timeline::config::Settings;
use pms_timeline::filter::{filter_projects, search_projects, FilterOptions};
use pms_timeline::io;
use pms_timeline::model::{
    parse_dependency_list, DateRange, MemberRole, ProjectDraft, ProjectPatch, ProjectStatus,
    TaskDraft, TaskPatch, ViewMode,
};
use pms_timeline::sample::sample_data;
use pms_timeline::timeline::{bar_links, display_order, progress_label, Shade};
use pms_timeline::{App, TimelineLayout};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pms-timeline: project store and Gantt/calendar timeline",
    long_about = None
)]
struct Cli {
    /// Data file (defaults to the one in settings, then the user data dir).
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Seed the data file with the sample projects when it is empty.
    #[arg(long, global = true)]
    sample: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List projects.
    Projects(ProjectsArgs),
    /// Create a project.
    Add(AddArgs),
    /// Change fields of a project.
    Update(UpdateArgs),
    /// Delete a project and its timeline entries.
    Delete { id: String },
    /// Change a timeline entry. Editing a project-level entry updates the project too.
    Task(TaskArgs),
    /// Add a sub-task or milestone to a project.
    Subtask(SubtaskArgs),
    /// Delete a sub-task.
    DeleteTask { id: String },
    /// Print the day grid for a view mode around a date.
    Timeline(TimelineArgs),
    /// Print continuous bar geometry for every entry.
    Chart {
        /// Available width in pixels.
        #[arg(long, default_value_t = 1200.0)]
        width: f32,
    },
    /// Dashboard counts.
    Stats,
    /// Export timeline entries as CSV.
    ExportCsv { path: PathBuf },
    /// Import timeline entries from CSV.
    ImportCsv {
        path: PathBuf,
        /// Project for rows without a project column.
        #[arg(long)]
        project: Option<String>,
    },
    /// Put a user on a project's team or take them off it.
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// List users who can be put on a team.
    Users,
    /// Show the signed-in user.
    Whoami,
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum MemberAction {
    Add {
        project: String,
        user: String,
        #[arg(long)]
        role: MemberRole,
    },
    Remove { project: String, user: String },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the settings file location and current values.
    Show,
    /// Change one setting and save it.
    Set { key: String, value: String },
}

#[derive(Args, Debug)]
struct ProjectsArgs {
    #[arg(long)]
    client: Option<String>,
    #[arg(long)]
    status: Option<ProjectStatus>,
    /// User id among designers or developers.
    #[arg(long)]
    assignee: Option<String>,
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
    /// Substring of name, client or code.
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    client: String,
    #[arg(long)]
    start: NaiveDate,
    #[arg(long)]
    end: NaiveDate,
    #[arg(long, default_value = "planning")]
    status: ProjectStatus,
    #[arg(long)]
    description: Option<String>,
    #[arg(long = "designer")]
    designers: Vec<String>,
    #[arg(long = "developer")]
    developers: Vec<String>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    client: Option<String>,
    #[arg(long)]
    start: Option<NaiveDate>,
    #[arg(long)]
    end: Option<NaiveDate>,
    #[arg(long)]
    status: Option<ProjectStatus>,
    #[arg(long)]
    description: Option<String>,
    /// Replace the designer list (repeatable).
    #[arg(long = "designer")]
    designers: Vec<String>,
    /// Replace the developer list (repeatable).
    #[arg(long = "developer")]
    developers: Vec<String>,
}

#[derive(Args, Debug)]
struct TaskArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    start: Option<NaiveDate>,
    #[arg(long)]
    end: Option<NaiveDate>,
    #[arg(long)]
    progress: Option<u8>,
    /// Comma-separated predecessor ids.
    #[arg(long)]
    deps: Option<String>,
    #[arg(long)]
    status: Option<ProjectStatus>,
    #[arg(long)]
    assignee: Option<String>,
}

#[derive(Args, Debug)]
struct SubtaskArgs {
    #[arg(long)]
    project: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    start: NaiveDate,
    /// Defaults to the start date.
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Id to use instead of a generated one.
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    milestone: bool,
    #[arg(long, default_value_t = 0)]
    progress: u8,
    #[arg(long)]
    deps: Option<String>,
    #[arg(long)]
    assignee: Option<String>,
}

#[derive(Args, Debug)]
struct TimelineArgs {
    #[arg(long)]
    view: Option<ViewMode>,
    /// Anchor date (defaults to today).
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Single-scroll layout instead of the split panel.
    #[arg(long)]
    simple: bool,
    /// Days of padding around the period, overriding the layout's setting.
    #[arg(long)]
    padding: Option<u32>,
    #[arg(long)]
    search: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PMS_LOG")
        .unwrap_or_else(|_| EnvFilter::new("pms_timeline=info,warn"));

    let format = env::var("PMS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr)).init();
        }
        _ => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut settings = Settings::load();
    if let Commands::Config { action } = &cli.command {
        return run_config(&mut settings, action);
    }

    let data_file = cli.data.clone().unwrap_or_else(|| settings.data_file());
    debug!(path = %data_file.display(), "using data file");

    let mut backend = JsonFileBackend::new(&data_file);
    if cli.sample && backend.seed_if_empty(&sample_data())? {
        println!("Seeded {} with sample data", data_file.display());
    }

    let today = chrono::Local::now().date_naive();
    let mut app = App::new(Box::new(backend), settings, today);
    app.load()
        .with_context(|| format!("could not load {}", data_file.display()))?;

    match cli.command {
        Commands::Projects(args) => list_projects(&app, &args),
        Commands::Add(args) => {
            let draft = ProjectDraft {
                status: args.status,
                description: args.description,
                designer_ids: args.designers,
                developer_ids: args.developers,
                created_by: app.current_user.as_ref().map(|u| u.id.clone()).unwrap_or_default(),
                ..ProjectDraft::new(args.code, args.name, args.client, args.start, args.end)
            };
            let project = app.create_project(draft)?;
            println!("{}", project.id);
        }
        Commands::Update(args) => {
            let patch = ProjectPatch {
                code: args.code,
                name: args.name,
                client: args.client,
                start_date: args.start,
                end_date: args.end,
                status: args.status,
                description: args.description,
                designer_ids: Some(args.designers).filter(|ids| !ids.is_empty()),
                developer_ids: Some(args.developers).filter(|ids| !ids.is_empty()),
                ..Default::default()
            };
            app.update_project(&args.id, patch)?;
        }
        Commands::Delete { id } => app.delete_project(&id)?,
        Commands::Task(args) => {
            let patch = TaskPatch {
                name: args.name,
                start: args.start,
                end: args.end,
                progress: args.progress,
                dependencies: args.deps.as_deref().map(parse_dependency_list),
                status: args.status,
                assignee: args.assignee,
            };
            app.update_timeline_entry(&args.id, patch)?;
        }
        Commands::Subtask(args) => {
            let draft = TaskDraft {
                id: args.id,
                progress: args.progress,
                dependencies: args.deps.as_deref().map(parse_dependency_list).unwrap_or_default(),
                milestone: args.milestone,
                assignee: args.assignee,
                ..TaskDraft::new(args.project, args.name, args.start, args.end.unwrap_or(args.start))
            };
            let task = app.add_task(draft)?;
            println!("{}", task.id);
        }
        Commands::DeleteTask { id } => app.delete_task(&id)?,
        Commands::Timeline(args) => print_timeline(&mut app, args, today),
        Commands::Chart { width } => print_chart(&app, width),
        Commands::Stats => {
            let stats = app.stats();
            println!("Total projects:       {}", stats.total_projects);
            println!("In progress:          {}", stats.in_progress_projects);
            println!("Completed:            {}", stats.completed_projects);
            println!("Clients:              {}", stats.client_count);
        }
        Commands::ExportCsv { path } => {
            if app.store.tasks().is_empty() {
                println!("Nothing to export");
            } else {
                let count = io::export_csv(app.store.tasks(), &path)?;
                println!("Exported {count} tasks to {}", path.display());
            }
        }
        Commands::ImportCsv { path, project } => {
            let parsed = io::import_csv(&path, project.as_deref())?;
            let (imported, rejected) = app.import_tasks(parsed.tasks)?;
            println!("{}", app.status.message());
            if parsed.skipped + rejected > 0 {
                println!("{} rows unreadable, {} rejected", parsed.skipped, rejected);
            }
            debug!(imported, "csv import finished");
        }
        Commands::Member { action } => {
            match action {
                MemberAction::Add { project, user, role } => app.add_member(&project, &user, role)?,
                MemberAction::Remove { project, user } => app.remove_member(&project, &user)?,
            }
            println!("{}", app.status.message());
        }
        Commands::Users => {
            for user in app.users()? {
                println!("{:<4} {:<20} {:<28} {:?}", user.id, user.name, user.email, user.role);
            }
        }
        Commands::Whoami => match &app.current_user {
            Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
            None => println!("not signed in"),
        },
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn run_config(settings: &mut Settings, action: &ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", Settings::config_path().display());
            println!("split_panel_padding = {}", settings.split_panel_padding);
            println!("simple_padding      = {}", settings.simple_padding);
            println!("chart_buffer_days   = {}", settings.chart_buffer_days);
            println!("min_day_width       = {}", settings.min_day_width);
            println!("default_view        = {}", settings.default_view);
            println!("data_file           = {}", settings.data_file().display());
        }
        ConfigAction::Set { key, value } => {
            settings
                .set(key, value)
                .with_context(|| format!("expected one of: {}", Settings::KEYS.join(", ")))?;
            settings.save()?;
            println!("{key} saved to {}", Settings::config_path().display());
        }
    }
    Ok(())
}

fn list_projects(app: &App, args: &ProjectsArgs) {
    let options = FilterOptions {
        client: args.client.clone(),
        status: args.status,
        date_range: args.from.zip(args.to).map(|(from, to)| DateRange::new(from, to)),
        assignee: args.assignee.clone(),
    };
    let matching = search_projects(app.store.projects(), args.search.as_deref().unwrap_or(""));
    let filtered = filter_projects(app.store.projects(), &options);
    for project in matching.into_iter().filter(|p| filtered.iter().any(|f| f.id == p.id)) {
        println!(
            "{:<14} {:<30} {:<20} {} .. {}  {}",
            project.code,
            project.name,
            project.client,
            project.start_date,
            project.end_date,
            project.status.label()
        );
    }
}

fn print_timeline(app: &mut App, args: TimelineArgs, today: NaiveDate) {
    if let Some(view) = args.view {
        app.view.mode = view;
    }
    if let Some(date) = args.date {
        app.view.go_to(date);
    }
    if let Some(search) = args.search {
        app.view.search_term = search;
    }
    if args.simple {
        app.layout = TimelineLayout::Simple;
    }
    if let Some(days) = args.padding {
        match app.layout {
            TimelineLayout::SplitPanel => app.settings.split_panel_padding = days,
            TimelineLayout::Simple => app.settings.simple_padding = days,
        }
    }

    let header = app.header(today);
    let window = app.display_dates().window();
    println!("{} view, {} .. {}", app.view.mode, window.start, window.end);
    let days: String = header
        .iter()
        .map(|h| match h.shade() {
            Shade::Today => '|',
            Shade::Weekend => '.',
            Shade::Plain => ' ',
        })
        .collect();
    println!("{:<32}{days}", "");

    for row in app.visible_rows(today) {
        let bar: String = row
            .cells
            .iter()
            .map(|c| if c.in_range { '#' } else if c.is_weekend { '.' } else { ' ' })
            .collect();
        let label = row
            .label_column()
            .map(|_| progress_label(row.task.progress))
            .unwrap_or_default();
        println!("{:<32}{bar} {label}", truncate(&row.task.name, 30));
    }
}

fn print_chart(app: &App, width: f32) {
    let Some(chart) = app.chart(width) else {
        println!("No timeline entries");
        return;
    };
    println!(
        "axis {} .. {}, {:.1}px/day, {:.0}px total",
        chart.start,
        chart.end,
        chart.day_width,
        chart.total_width()
    );
    let tasks = app.store.tasks();
    for task in display_order(tasks) {
        let bar = chart.bar(task);
        println!(
            "{:<32} left {:>8.1} width {:>8.1} {}",
            truncate(&task.name, 30),
            bar.left,
            bar.width,
            progress_label(task.progress)
        );
        for link in bar_links(task, tasks, &chart) {
            println!("{:<32}   <- {} ({:+.1}px)", "", link.predecessor.name, link.length());
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
