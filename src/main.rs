use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use issuedesk::api::HttpClient;
use issuedesk::commands;
use issuedesk::commands::edit::EditArgs;
use issuedesk::commands::vote::Direction;
use issuedesk::config::{self, Config, DB_FILE, DIR_NAME};
use issuedesk::db::Database;
use issuedesk::display::Palette;
use issuedesk::models::{Filter, IssueStatus};
use issuedesk::session::{SessionEvent, SessionStore};
use issuedesk::theme::ThemeStore;
use issuedesk::votes::VoteLedger;

#[derive(Parser)]
#[command(name = "issuedesk")]
#[command(about = "Report, browse and vote on issues from the command line")]
#[command(version)]
struct Cli {
    /// Backend API base URL (overrides the one saved by init)
    #[arg(long, global = true, env = "ISSUEDESK_API_URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "ISSUEDESK_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Workspace directory (defaults to the nearest .issuedesk)
    #[arg(long, global = true, env = "ISSUEDESK_DIR")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize issuedesk in the current directory (or --dir)
    Init {
        /// Rewrite the configuration of an existing workspace
        #[arg(short, long)]
        force: bool,
    },

    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long, env = "ISSUEDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long, env = "ISSUEDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show who is signed in
    Whoami,

    /// List issues
    List {
        /// all, open, in-progress, closed or mine
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },

    /// Show issue details
    Show {
        /// Issue document id
        id: String,
    },

    /// Report a new issue
    Create {
        /// Issue title
        title: String,
        /// Issue description
        #[arg(short, long)]
        description: Option<String>,
        /// Initial status (open or in-progress)
        #[arg(short, long, default_value = "open")]
        status: IssueStatus,
        /// Link to an image of the problem
        #[arg(long)]
        image_url: Option<String>,
    },

    /// Edit one of your issues
    Edit {
        /// Issue document id
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New image URL (empty to remove)
        #[arg(long)]
        image_url: Option<String>,
        /// New status (open, in-progress, closed)
        #[arg(short, long)]
        status: Option<IssueStatus>,
    },

    /// Delete one of your issues
    Delete {
        /// Issue document id
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Vote for an issue
    Vote {
        /// Issue document id
        id: String,
    },

    /// Take back a vote
    Unvote {
        /// Issue document id
        id: String,
    },

    /// List the issues voted on from this workspace
    Votes,

    /// Show or change the colour theme (light, dark, toggle)
    Theme { value: Option<String> },
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_env("ISSUEDESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn workspace(dir: Option<&Path>) -> Result<PathBuf> {
    let cwd = env::current_dir()?;
    config::locate(dir, &cwd)
}

fn get_db(workspace: &Path) -> Result<Database> {
    Database::open(&workspace.join(DB_FILE)).context("Failed to open database")
}

fn read_password(given: Option<String>) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let password = input.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("No password given");
    }
    Ok(password)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    if let Commands::Init { force } = cli.command {
        let target = match &cli.dir {
            Some(dir) => dir.clone(),
            None => env::current_dir()?.join(DIR_NAME),
        };
        return commands::init::run(&target, cli.api_url.as_deref(), force);
    }

    let workspace = workspace(cli.dir.as_deref())?;
    let db = get_db(&workspace)?;
    let config = Config::load(&workspace)?;

    let session = SessionStore::new(&db);
    session.subscribe(|event| match event {
        SessionEvent::SignedIn(user) => debug!(username = %user.username, "session started"),
        SessionEvent::SignedOut => debug!("session ended"),
    });
    let ledger = VoteLedger::new(&db);
    let themes = ThemeStore::new(&db);

    let api_url = config.api_url(cli.api_url.as_deref());
    let client = HttpClient::new(api_url, Duration::from_secs(cli.timeout_secs), &session)?;
    debug!(api_url, workspace = %workspace.display(), "ready");

    match cli.command {
        Commands::Init { .. } => Ok(()),

        Commands::Register {
            username,
            email,
            password,
        } => {
            let password = read_password(password)?;
            commands::register::run(&session, &client, &username, &email, &password)
        }

        Commands::Login { email, password } => {
            let password = read_password(password)?;
            commands::login::run(&session, &client, &email, &password)
        }

        Commands::Logout => commands::logout::run(&session),

        Commands::Whoami => commands::whoami::run(&session),

        Commands::List { filter } => {
            let palette = Palette::for_stdout(themes.get()?);
            commands::list::run(&client, &session, &ledger, palette, filter)
        }

        Commands::Show { id } => {
            let palette = Palette::for_stdout(themes.get()?);
            commands::show::run(&client, &session, &ledger, palette, &id)
        }

        Commands::Create {
            title,
            description,
            status,
            image_url,
        } => commands::create::run(
            &client,
            &session,
            &title,
            description.as_deref().unwrap_or_default(),
            Some(status),
            image_url.as_deref(),
        ),

        Commands::Edit {
            id,
            title,
            description,
            image_url,
            status,
        } => {
            let args = EditArgs {
                title: title.as_deref(),
                description: description.as_deref(),
                image_url: image_url.as_deref(),
                status,
            };
            commands::edit::run(&client, &session, &id, args)
        }

        Commands::Delete { id, force } => commands::delete::run(&client, &session, &ledger, &id, force),

        Commands::Vote { id } => commands::vote::run(&client, &session, &ledger, &id, Direction::Up),

        Commands::Unvote { id } => commands::vote::run(&client, &session, &ledger, &id, Direction::Down),

        Commands::Votes => commands::votes::run(&ledger),

        Commands::Theme { value } => commands::theme::run(&themes, value.as_deref()).map(|_| ()),
    }
}
