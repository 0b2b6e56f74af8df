use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.3.2"
/// Format for dev builds: "v0.3.2\ndev: abc1234 2026-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "tabdesk",
    bin_name = "tabdesk",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Study dashboard: chapters, spaced revisions, wallpaper and widgets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (overrides config and TABDESK_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to tabdesk.toml in the OS config directory)
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Status {
    #[default]
    All,
    Done,
    Todo,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Video,
    Image,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List chapters
    #[command(alias = "ls", display_order = 1)]
    Chapters(ChapterArgs),

    /// Search chapter names and subjects
    #[command(display_order = 2)]
    Search { term: String },

    /// Revisions due today, upcoming and overdue
    #[command(display_order = 3)]
    Today,

    /// Mark chapters complete and schedule their revisions
    #[command(display_order = 4)]
    Done {
        /// Chapter ids (e.g. 3 5 or 3-7)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Complete a scheduled revision
    #[command(display_order = 5)]
    Revise {
        /// Chapter ids (e.g. 3 5 or 3-7)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Day of the revision (YYYY-MM-DD), defaults to today
        #[arg(long, value_name = "DATE")]
        on: Option<chrono::NaiveDate>,
    },

    /// Set chapters back to not started
    #[command(display_order = 6)]
    Revert {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Set every chapter back to not started
    #[command(display_order = 7)]
    Reset {
        /// Required, this clears all progress
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Add your own chapters
    #[command(display_order = 8)]
    Add {
        /// Class label, e.g. "Class 12"
        #[arg(long)]
        class: String,

        /// Subject name, e.g. "Biology"
        #[arg(long)]
        subject: String,

        /// Chapter names
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },

    /// Delete chapters
    #[command(alias = "rm", display_order = 9)]
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Rename a chapter
    #[command(display_order = 10)]
    Rename {
        id: String,
        /// New name words (joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },

    /// Completion per class and subject
    #[command(display_order = 11)]
    Progress {
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        subject: Option<String>,
    },

    /// Reconcile chapters with the built-in syllabus
    #[command(display_order = 12)]
    Seed,

    /// Show or change dashboard settings
    #[command(display_order = 20)]
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Manage the wallpaper
    #[command(display_order = 21)]
    Wallpaper {
        #[command(subcommand)]
        action: Option<WallpaperAction>,
    },

    /// Show or change a widget's placement
    #[command(display_order = 22)]
    Widget {
        /// Widget key, e.g. timeDate, focus, neet
        widget: String,
        #[command(subcommand)]
        action: Option<WidgetAction>,
    },

    /// Manage the to-do list
    #[command(display_order = 23)]
    Todo {
        #[command(subcommand)]
        action: Option<TodoAction>,
    },

    /// Time left until each exam
    #[command(display_order = 24)]
    Countdown,

    /// Show configuration
    #[command(display_order = 30)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ChapterArgs {
    /// Only this class, e.g. "Class 11"
    #[arg(long)]
    pub class: Option<String>,

    /// Only this subject, e.g. Physics
    #[arg(long)]
    pub subject: Option<String>,

    #[arg(long, value_enum, default_value_t = Status::All)]
    pub status: Status,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Set a key. Values are read as JSON, falling back to a plain string
    Set { key: String, value: String },
    /// Flip a true/false key
    Toggle { key: String },
    /// Restore every default
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum WallpaperAction {
    /// Use a local video or image file
    Set {
        path: PathBuf,
        #[arg(long, value_enum)]
        kind: Option<Kind>,
    },
    /// Download a video or image
    Fetch {
        url: String,
        #[arg(long, value_enum, default_value_t = Kind::Image)]
        kind: Kind,
    },
    /// Remove the wallpaper
    Clear,
    /// Write the stored wallpaper to a file
    Export { path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum WidgetAction {
    /// Move to x, y
    Move {
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
    },
    /// Resize to width x height
    Resize { width: f64, height: f64 },
    /// Replace the style with a JSON object
    Style { json: String },
    /// Forget the style (or, with --all, everything)
    Reset {
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TodoAction {
    /// Add an item
    Add {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Flip items between open and done
    Toggle {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
    /// Remove items
    #[command(alias = "rm")]
    Remove {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
    /// Remove every finished item
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print one key
    Get { key: String },
    /// Print where the config file is looked up
    Path,
    /// Print a commented tabdesk.toml with every default
    Template,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn done_takes_ranges() {
        let cli = Cli::parse_from(["tabdesk", "done", "1-3", "7"]);
        match cli.command {
            Some(Commands::Done { ids }) => assert_eq!(ids, vec!["1-3", "7"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn revise_parses_date() {
        let cli = Cli::parse_from(["tabdesk", "revise", "4", "--on", "2026-03-02"]);
        match cli.command {
            Some(Commands::Revise { on, .. }) => {
                assert_eq!(on, chrono::NaiveDate::from_ymd_opt(2026, 3, 2))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn widget_move_accepts_negative_coordinates() {
        let cli = Cli::parse_from(["tabdesk", "widget", "focus", "move", "-20", "15.5"]);
        match cli.command {
            Some(Commands::Widget {
                widget,
                action: Some(WidgetAction::Move { x, y }),
            }) => {
                assert_eq!(widget, "focus");
                assert_eq!((x, y), (-20.0, 15.5));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tabdesk", "today", "--json", "--data-dir", "/tmp/x"]);
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }
}
