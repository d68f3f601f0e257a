use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use gitmarks::app::App;
use gitmarks::config::ConfigStore;
use gitmarks::domain::{ConfigPatch, Response};
use gitmarks::error::{ErrorOrigin, GitmarksError};
use gitmarks::export;
use gitmarks::fetch::HttpFetcher;
use gitmarks::local::LocalReader;
use gitmarks::output::{JsonOutput, OutputMode};
use gitmarks::source::SourceUrl;
use gitmarks::tui::Tui;

#[derive(Parser)]
#[command(name = "gitmarks")]
#[command(about = "View a bookmark collection stored as JSON in a GitHub repository")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Directory holding config.json (defaults to the per-user config dir)
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show or change connection settings")]
    Config(ConfigArgs),
    #[command(about = "Print the URL the current settings resolve to")]
    Url,
    #[command(about = "Load bookmarks and print them as JSON")]
    Load(LoadArgs),
    #[command(about = "Load bookmarks and save a copy to the download directory")]
    Export(ExportArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    #[command(about = "Print the effective settings (token masked)")]
    Show,
    #[command(about = "Update settings; omitted flags keep their current value")]
    Set(SetArgs),
    #[command(about = "Print the config file location")]
    Path,
}

#[derive(Args)]
struct SetArgs {
    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    repo: Option<String>,

    #[arg(long)]
    file_path: Option<String>,

    #[arg(long)]
    token: Option<String>,

    #[arg(long, conflicts_with = "no_mirror")]
    mirror: bool,

    #[arg(long)]
    no_mirror: bool,
}

impl SetArgs {
    fn into_patch(self) -> ConfigPatch {
        let use_mirror = match (self.mirror, self.no_mirror) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        ConfigPatch {
            username: self.username,
            repo: self.repo,
            file_path: self.file_path,
            token: self.token,
            use_mirror,
        }
    }
}

#[derive(Args)]
struct LoadArgs {
    /// Load from this URL instead of the configured repository
    #[arg(long, conflicts_with = "local")]
    url: Option<String>,

    /// Read the bundled local copy instead of fetching
    #[arg(long)]
    local: bool,

    /// Path of the local copy (defaults to bookmarks.json next to the executable)
    #[arg(long, requires = "local")]
    local_path: Option<String>,
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long)]
    dir: Option<String>,
}

impl Cli {
    fn error_origin(&self) -> ErrorOrigin {
        match &self.command {
            Some(Commands::Load(args)) if args.local => ErrorOrigin::Local,
            _ => ErrorOrigin::Remote,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let origin = cli.error_origin();
    if let Err(report) = run(cli) {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<GitmarksError>() {
            return ExitCode::from(err.exit_code(origin));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let output_mode = if cli.non_interactive || !std::io::stdout().is_terminal() {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config_store = match cli.config_dir {
        Some(dir) => ConfigStore::new(Utf8PathBuf::from(dir)),
        None => ConfigStore::from_default_location()?,
    };

    match cli.command {
        Some(Commands::Config(args)) => run_config(args, config_store),
        Some(Commands::Url) => {
            let config = config_store.load();
            if !config.is_configured() {
                return Err(GitmarksError::NotConfigured.into());
            }
            let url = SourceUrl::build(&config)?;
            JsonOutput::print_url(url.as_str()).into_diagnostic()
        }
        Some(Commands::Load(args)) => run_load(args, config_store),
        Some(Commands::Export(args)) => run_export(args, config_store),
        None => match output_mode {
            OutputMode::Interactive => {
                let app = build_app(config_store, LocalReader::bundled_or_relative())?;
                Tui::new(Arc::new(app)).run()
            }
            OutputMode::NonInteractive => Err(miette::Report::msg(
                "command required (try `gitmarks --help`)",
            )),
        },
    }
}

fn build_app(config_store: ConfigStore, local: LocalReader) -> miette::Result<App<HttpFetcher>> {
    let fetcher = HttpFetcher::new()?;
    Ok(App::new(config_store, fetcher, local))
}

fn run_config(args: ConfigArgs, config_store: ConfigStore) -> miette::Result<()> {
    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => JsonOutput::print_config(&config_store.load()).into_diagnostic(),
        ConfigCommand::Set(set) => {
            let next = config_store.load().merged(set.into_patch());
            let saved = config_store.save(next.into())?;
            JsonOutput::print_config(&saved).into_diagnostic()
        }
        ConfigCommand::Path => {
            JsonOutput::print_path(config_store.path().as_str()).into_diagnostic()
        }
    }
}

fn run_load(args: LoadArgs, config_store: ConfigStore) -> miette::Result<()> {
    let local = match (args.local, args.local_path) {
        (_, Some(path)) => LocalReader::new(Utf8PathBuf::from(path)),
        (true, None) => LocalReader::bundled()?,
        (false, None) => LocalReader::bundled_or_relative(),
    };
    let app = build_app(config_store, local)?;
    let result = if args.local {
        app.local_reader().read_local()
    } else if let Some(url) = args.url.as_deref() {
        app.try_load_from_url(url)
    } else {
        app.try_load_from_remote(&app.get_config())
    };

    match result {
        Ok(document) => JsonOutput::print_response(&Response::ok(document)).into_diagnostic(),
        Err(err) => {
            JsonOutput::print_response(&Response::<()>::failed(&err)).into_diagnostic()?;
            Err(err.into())
        }
    }
}

fn run_export(args: ExportArgs, config_store: ConfigStore) -> miette::Result<()> {
    let app = build_app(config_store, LocalReader::bundled_or_relative())?;
    let document = app.try_load_from_remote(&app.get_config())?;
    let dir = match args.dir {
        Some(dir) => Utf8PathBuf::from(dir),
        None => export::default_export_dir()?,
    };
    let response = app.export_bookmarks(&document, &dir);
    JsonOutput::print_response(&response).into_diagnostic()?;
    if !response.success {
        return Err(miette::Report::msg(response.error.unwrap_or_default()));
    }
    Ok(())
}
