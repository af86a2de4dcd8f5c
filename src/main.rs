use std::{panic, path::PathBuf, str::FromStr};

use clap::Parser;

use taskboard_grid::{
    cli::{self, RootCommand, ShowArgs},
    logging::{init_logging, print_log_location},
    settings::Settings,
    store::resolve_board_path,
    theme::ThemePreset,
};

#[derive(Parser, Debug)]
#[command(
    name = "taskboard",
    about = "Grouped task board with typed columns",
    long_about = "Manage a board of task groups with typed columns, weighted progress and column/row reordering.",
    version = env!("TASKBOARD_BUILD_VERSION"),
    author
)]
struct Cli {
    /// Board file; defaults to the configured or platform data path
    #[arg(short, long, global = true, value_name = "PATH")]
    board: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PRESET")]
    theme: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<RootCommand>,
}

fn main() {
    let code = run_app();
    std::process::exit(code);
}

fn run_app() -> i32 {
    let logging = match init_logging() {
        Ok(logging) => Some(logging),
        Err(err) => {
            eprintln!("warning: failed to initialize logging: {err}");
            None
        }
    };
    if let Some((path, _)) = logging.as_ref() {
        install_panic_hook_with_log(path.clone());
    }

    let cli = Cli::parse();
    let mut settings = Settings::load();
    if let Some(raw) = cli.theme.as_deref() {
        match ThemePreset::from_str(raw) {
            Ok(preset) => settings.theme = preset.as_str().to_string(),
            Err(()) => {
                eprintln!("error[INVALID_THEME]: unknown theme '{raw}'");
                return 2;
            }
        }
    }

    let board_path = match resolve_board_path(cli.board.as_deref(), settings.board_path.as_deref()) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("error[BOARD_PATH_REQUIRED]: {err}");
            return 2;
        }
    };

    let command = cli.command.unwrap_or_else(|| {
        RootCommand::Show(ShowArgs {
            group: None,
            query: String::new(),
            status: "all".to_string(),
            sort: "none".to_string(),
        })
    });

    let code = cli::run(&board_path, &settings, command, cli.json, cli.quiet);
    if code != 0
        && let Some((path, _)) = logging.as_ref()
    {
        print_log_location(path);
    }
    code
}

fn install_panic_hook_with_log(log_path: PathBuf) {
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        print_log_location(&log_path);
        previous_hook(panic_info);
    }));
}
