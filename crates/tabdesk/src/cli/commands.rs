use super::render::{self, View};
use super::setup::{
    ChapterArgs, Cli, Commands, ConfigCommands, Kind, SettingsAction, Status, TodoAction,
    WallpaperAction, WidgetAction,
};
use anyhow::Result;
use chrono::FixedOffset;
use clap::Parser;
use tabdeskapp::api::DeskApi;
use tabdeskapp::commands::chapters::ChapterQuery;
use tabdeskapp::commands::config::ConfigAction;
use tabdeskapp::commands::{CmdMessage, CmdResult, MessageLevel};
use tabdeskapp::config::{default_config_path, DeskConfig};
use tabdeskapp::model::{MediaKind, Position, Size};
use tabdeskapp::repository::StatusFilter;
use tabdeskapp::store::FsBackend;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `TABDESK_LOG=tabdeskapp=debug`.
const LOG_ENV: &str = "TABDESK_LOG";

struct AppContext {
    api: DeskApi<FsBackend>,
    offset: FixedOffset,
    json: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Chapters(args)) => handle_chapters(&ctx, args),
        Some(Commands::Search { term }) => {
            let result = ctx.api.search_chapters(&term)?;
            ctx.emit(result, View::Chapters)
        }
        Some(Commands::Today) | None => {
            let result = ctx.api.agenda()?;
            ctx.emit(result, View::Agenda)
        }
        Some(Commands::Done { ids }) => {
            let result = ctx.api.complete_chapters(&ids)?;
            ctx.emit(result, View::Affected)
        }
        Some(Commands::Revise { ids, on }) => {
            let result = ctx.api.revise_chapters(&ids, on)?;
            ctx.emit(result, View::Affected)
        }
        Some(Commands::Revert { ids }) => {
            let result = ctx.api.revert_chapters(&ids)?;
            ctx.emit(result, View::Affected)
        }
        Some(Commands::Reset { yes }) => handle_reset(&mut ctx, yes),
        Some(Commands::Add {
            class,
            subject,
            names,
        }) => {
            let result = ctx.api.add_chapters(&class, &subject, &names)?;
            ctx.emit(result, View::Affected)
        }
        Some(Commands::Delete { ids }) => {
            let result = ctx.api.delete_chapters(&ids)?;
            ctx.emit(result, View::Messages)
        }
        Some(Commands::Rename { id, name }) => {
            let result = ctx.api.rename_chapter(&id, &name.join(" "))?;
            ctx.emit(result, View::Affected)
        }
        Some(Commands::Progress { class, subject }) => {
            let result = ctx.api.progress(class.as_deref(), subject.as_deref())?;
            ctx.emit(result, View::Progress)
        }
        Some(Commands::Seed) => {
            let result = ctx.api.seed()?;
            ctx.emit(result, View::Messages)
        }
        Some(Commands::Settings { action }) => handle_settings(&mut ctx, action),
        Some(Commands::Wallpaper { action }) => handle_wallpaper(&ctx, action),
        Some(Commands::Widget { widget, action }) => handle_widget(&mut ctx, &widget, action),
        Some(Commands::Todo { action }) => handle_todo(&mut ctx, action),
        Some(Commands::Countdown) => {
            let result = ctx.api.countdowns()?;
            ctx.emit(result, View::Countdowns)
        }
        Some(Commands::Config { action }) => handle_config(&ctx, action),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let config_file = cli.config.clone().or_else(default_config_path);
    let mut config = DeskConfig::load(config_file.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }

    let offset = config.utc_offset()?;
    let data_dir = config.data_dir();
    debug!(data_dir = %data_dir.display(), config = ?config_file, "opening tabdesk");

    let api = DeskApi::open(FsBackend::new(data_dir), config)?;
    Ok(AppContext {
        api,
        offset,
        json: cli.json,
    })
}

impl AppContext {
    /// Print `result`, preceded by anything noteworthy from opening the stores.
    fn emit(&self, mut result: CmdResult, view: View) -> Result<()> {
        let mut messages: Vec<CmdMessage> = self
            .api
            .startup()
            .messages
            .iter()
            .filter(|m| m.level != MessageLevel::Info)
            .cloned()
            .collect();
        messages.append(&mut result.messages);
        result.messages = messages;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print!("{}", render::render(&result, view, self.offset));
        }
        Ok(())
    }
}

fn handle_chapters(ctx: &AppContext, args: ChapterArgs) -> Result<()> {
    let query = ChapterQuery {
        class_label: args.class,
        subject_name: args.subject,
        status: match args.status {
            Status::All => StatusFilter::All,
            Status::Done => StatusFilter::Completed,
            Status::Todo => StatusFilter::Incomplete,
        },
    };
    let result = ctx.api.list_chapters(&query)?;
    ctx.emit(result, View::Chapters)
}

fn handle_reset(ctx: &mut AppContext, yes: bool) -> Result<()> {
    let result = if yes {
        ctx.api.reset_all()?
    } else {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::warning(
            "This sets every chapter back to not started. Run again with --yes to confirm.",
        ));
        result
    };
    ctx.emit(result, View::Messages)
}

fn handle_settings(ctx: &mut AppContext, action: Option<SettingsAction>) -> Result<()> {
    let result = match action {
        None => ctx.api.settings()?,
        Some(SettingsAction::Set { key, value }) => ctx.api.set_setting(&key, &value)?,
        Some(SettingsAction::Toggle { key }) => ctx.api.toggle_setting(&key)?,
        Some(SettingsAction::Reset) => ctx.api.reset_settings()?,
    };
    ctx.emit(result, View::Settings)
}

fn media_kind(kind: Kind) -> MediaKind {
    match kind {
        Kind::Video => MediaKind::Video,
        Kind::Image => MediaKind::Image,
    }
}

fn handle_wallpaper(ctx: &AppContext, action: Option<WallpaperAction>) -> Result<()> {
    let result = match action {
        None => ctx.api.wallpaper()?,
        Some(WallpaperAction::Set { path, kind }) => {
            ctx.api.set_wallpaper_file(&path, kind.map(media_kind))?
        }
        Some(WallpaperAction::Fetch { url, kind }) => {
            ctx.api.fetch_wallpaper(&url, media_kind(kind))?
        }
        Some(WallpaperAction::Clear) => ctx.api.clear_wallpaper()?,
        Some(WallpaperAction::Export { path }) => ctx.api.export_wallpaper(&path)?,
    };
    ctx.emit(result, View::Wallpaper)
}

fn handle_widget(ctx: &mut AppContext, widget: &str, action: Option<WidgetAction>) -> Result<()> {
    let result = match action {
        None => ctx.api.widget(widget)?,
        Some(WidgetAction::Move { x, y }) => ctx.api.move_widget(widget, Position { x, y })?,
        Some(WidgetAction::Resize { width, height }) => {
            ctx.api.resize_widget(widget, Size { width, height })?
        }
        Some(WidgetAction::Style { json }) => ctx.api.style_widget(widget, &json)?,
        Some(WidgetAction::Reset { all }) => ctx.api.reset_widget(widget, all)?,
    };
    ctx.emit(result, View::Widget)
}

fn handle_todo(ctx: &mut AppContext, action: Option<TodoAction>) -> Result<()> {
    let result = match action {
        None => ctx.api.todos()?,
        Some(TodoAction::Add { text }) => ctx.api.add_todo(&text.join(" "))?,
        Some(TodoAction::Toggle { ids }) => ctx.api.toggle_todos(&ids)?,
        Some(TodoAction::Remove { ids }) => ctx.api.remove_todos(&ids)?,
        Some(TodoAction::Clear) => ctx.api.clear_done_todos()?,
    };
    ctx.emit(result, View::Todos)
}

fn handle_config(ctx: &AppContext, action: Option<ConfigCommands>) -> Result<()> {
    let (action, view) = match action {
        None => (ConfigAction::ShowAll, View::Config),
        Some(ConfigCommands::Get { key }) => (ConfigAction::ShowKey(key), View::Messages),
        Some(ConfigCommands::Path) => (ConfigAction::Path, View::Messages),
        Some(ConfigCommands::Template) => (ConfigAction::Template, View::Messages),
    };
    let result = ctx.api.config_action(action)?;
    ctx.emit(result, view)
}
