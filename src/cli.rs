//! Command-line front end.

use crate::config::Config;
use crate::page::PageRequest;
use crate::sessions::CreateSessionRequest;
use crate::types::{Activity, Session, Source};
use crate::{Client, Error};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::TryStreamExt;
use serde::Serialize;
use std::io::{self, Read};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Command-line client for the Jules API
#[derive(Parser, Debug)]
#[command(name = "jules", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API key (overrides JULES_API_KEY and the config file)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// API base URL including the version path
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short = 'o', long, global = true, default_value = "text", value_enum)]
    pub output_format: OutputFormat,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, inspect and drive sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Inspect session activities
    Activities {
        #[command(subcommand)]
        action: ActivitiesAction,
    },
    /// List connected sources
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionsAction {
    /// List sessions
    List(ListArgs),
    /// Show a session
    Get { id: String },
    /// Start a session
    Create(CreateArgs),
    /// Delete a session
    Delete { id: String },
    /// Send a message to a session (use "-" to read from stdin)
    Continue { id: String, message: String },
    /// Wait for a session to complete or fail
    Wait {
        id: String,
        /// Poll interval in seconds
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ActivitiesAction {
    /// List a session's activities
    List {
        session_id: String,
        #[command(flatten)]
        page: ListArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum SourcesAction {
    /// List sources
    List(ListArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show config file path
    Path,
    /// Show the effective configuration
    Show,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Maximum items per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Continuation token from a previous page
    #[arg(long, conflicts_with = "all")]
    pub page_token: Option<String>,

    /// Follow continuation tokens and list everything
    #[arg(long)]
    pub all: bool,
}

impl ListArgs {
    fn page(&self) -> PageRequest {
        PageRequest::new(self.page_size, self.page_token.clone())
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Task description (use "-" to read from stdin)
    pub prompt: String,

    /// Source resource name, e.g. sources/github/owner/repo
    #[arg(short, long)]
    pub source: String,

    /// Branch to start from
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Wait for the session to finish
    #[arg(long)]
    pub wait: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Apply command-line overrides on top of file and environment config.
    #[must_use]
    pub fn resolve_config(&self, mut config: Config) -> Config {
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            config.base_url.clone_from(url);
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        config
    }
}

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config(Config::load()?);
    let format = cli.output_format;

    match cli.command {
        Commands::Config { action } => run_config(&action, &config, format),
        Commands::Sessions { action } => {
            let client = Client::from_config(&config)?;
            run_sessions(&client, action, &config, format).await
        }
        Commands::Activities {
            action: ActivitiesAction::List { session_id, page },
        } => {
            let client = Client::from_config(&config)?;
            let activities = client.activities();
            if page.all {
                let items: Vec<Activity> = activities
                    .stream(session_id.clone(), page.page_size)
                    .try_collect()
                    .await?;
                print_items(format, &items, activity_line)
            } else {
                let list = activities.list(&session_id, &page.page()).await?;
                print_page(format, &list, &list.activities, list.next_page_token.as_deref(), activity_line)
            }
        }
        Commands::Sources {
            action: SourcesAction::List(page),
        } => {
            let client = Client::from_config(&config)?;
            if page.all {
                let items: Vec<Source> = client.sources().stream(page.page_size).try_collect().await?;
                print_items(format, &items, source_line)
            } else {
                let list = client.sources().list(&page.page()).await?;
                print_page(format, &list, &list.sources, list.next_page_token.as_deref(), source_line)
            }
        }
    }
}

fn run_config(action: &ConfigAction, config: &Config, format: OutputFormat) -> Result<()> {
    match action {
        ConfigAction::Path => println!("{}", Config::path().display()),
        ConfigAction::Show => {
            let key = if config.api_key.is_some() { "set" } else { "unset" };
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "apiKey": key,
                    "baseUrl": config.base_url,
                    "timeoutSecs": config.timeout_secs,
                    "pollIntervalSecs": config.poll_interval_secs,
                }))?,
                OutputFormat::Text => {
                    println!("api_key: {key}");
                    println!("base_url: {}", config.base_url);
                    println!("timeout_secs: {}", config.timeout_secs);
                    println!("poll_interval_secs: {}", config.poll_interval_secs);
                }
            }
        }
    }
    Ok(())
}

async fn run_sessions(
    client: &Client,
    action: SessionsAction,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let sessions = client.sessions();
    match action {
        SessionsAction::List(page) => {
            if page.all {
                let items: Vec<Session> = sessions.stream(page.page_size).try_collect().await?;
                print_items(format, &items, session_line)
            } else {
                let list = sessions.list(&page.page()).await?;
                print_page(format, &list, &list.sessions, list.next_page_token.as_deref(), session_line)
            }
        }
        SessionsAction::Get { id } => {
            let session = sessions.get(&id).await?;
            print_session(format, &session)
        }
        SessionsAction::Create(args) => {
            let prompt = read_arg(&args.prompt)?;
            if prompt.is_empty() {
                anyhow::bail!("Empty prompt");
            }
            let mut request = CreateSessionRequest::new(prompt, args.source);
            request.starting_branch = args.branch;

            let session = sessions.create(request).await?;
            if args.wait {
                if format == OutputFormat::Text {
                    eprintln!("Created {}, waiting for completion...", session.id);
                }
                wait(client, &session.id, config.poll_interval(), format).await
            } else {
                print_session(format, &session)
            }
        }
        SessionsAction::Delete { id } => {
            sessions.delete(&id).await?;
            if format == OutputFormat::Text {
                println!("Deleted {id}");
            }
            Ok(())
        }
        SessionsAction::Continue { id, message } => {
            let message = read_arg(&message)?;
            if message.is_empty() {
                anyhow::bail!("Empty message");
            }
            sessions.continue_session(&id, &message).await?;
            if format == OutputFormat::Text {
                println!("Sent message to {id}");
            }
            Ok(())
        }
        SessionsAction::Wait { id, interval } => {
            let interval = interval.map_or_else(|| config.poll_interval(), Duration::from_secs);
            wait(client, &id, interval, format).await
        }
    }
}

/// Poll until terminal, cancelling on Ctrl-C.
async fn wait(client: &Client, id: &str, interval: Duration, format: OutputFormat) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = client
        .sessions()
        .wait_for_completion(id, interval, &cancel)
        .await;
    interrupt.abort();

    let session = match result {
        Err(Error::Cancelled) => anyhow::bail!("Interrupted while waiting for {id}"),
        other => other.with_context(|| format!("waiting for session {id}"))?,
    };

    print_session(format, &session)?;
    if session.state == crate::types::SessionState::Failed {
        anyhow::bail!("Session {id} failed");
    }
    Ok(())
}

/// Read a positional value, where "-" means stdin.
fn read_arg(value: &str) -> Result<String> {
    if value == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer.trim().to_string())
    } else {
        Ok(value.to_string())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_items<T: Serialize>(format: OutputFormat, items: &[T], line: fn(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Text => {
            for item in items {
                println!("{}", line(item));
            }
            Ok(())
        }
    }
}

fn print_page<P: Serialize, T>(
    format: OutputFormat,
    page: &P,
    items: &[T],
    next_page_token: Option<&str>,
    line: fn(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(page),
        OutputFormat::Text => {
            for item in items {
                println!("{}", line(item));
            }
            if let Some(token) = next_page_token {
                eprintln!("Next page: --page-token {token}");
            }
            Ok(())
        }
    }
}

fn print_session(format: OutputFormat, session: &Session) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(session);
    }

    println!("{}", session_line(session));
    if let Some(ctx) = &session.source_context {
        match ctx.starting_branch() {
            Some(branch) => println!("  source: {} ({branch})", ctx.source),
            None => println!("  source: {}", ctx.source),
        }
    }
    if let Some(created) = session.created_at() {
        println!("  created: {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(url) = &session.url {
        println!("  url: {url}");
    }
    for pr in session.pull_requests() {
        println!("  pull request: {} {}", pr.url, pr.title);
    }
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn session_line(session: &Session) -> String {
    let label = if session.title.is_empty() {
        first_line(&session.prompt)
    } else {
        session.title.as_str()
    };
    format!("{}\t{}\t{label}", session.id, session.state)
}

fn activity_line(activity: &Activity) -> String {
    let summary = activity.event.summary();
    let text = if summary.is_empty() {
        activity.description.as_str()
    } else {
        first_line(&summary)
    };
    format!("{}\t{}\t{text}", activity.id, activity.event.kind())
}

fn source_line(source: &Source) -> String {
    match source.full_name() {
        Some(repo) => format!("{}\t{repo}", source.name),
        None => source.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityEvent, Payload, SessionState};
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "jules", "sessions", "create", "fix the build", "--source", "sources/s1", "-b", "dev",
            "--wait",
        ])
        .unwrap();

        match cli.command {
            Commands::Sessions {
                action: SessionsAction::Create(args),
            } => {
                assert_eq!(args.prompt, "fix the build");
                assert_eq!(args.source, "sources/s1");
                assert_eq!(args.branch.as_deref(), Some("dev"));
                assert!(args.wait);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_all_conflicts_with_token() {
        let result = Cli::try_parse_from([
            "jules", "sources", "list", "--all", "--page-token", "t",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "jules", "--api-key", "flag-key", "--timeout", "3", "sources", "list",
        ])
        .unwrap();
        let config = cli.resolve_config(Config {
            api_key: Some("file-key".into()),
            ..Config::default()
        });
        assert_eq!(config.api_key.as_deref(), Some("flag-key"));
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_list_args_page() {
        let args = ListArgs {
            page_size: Some(5),
            page_token: Some("abc".into()),
            all: false,
        };
        assert_eq!(args.page().query(), "pageSize=5&pageToken=abc");
        assert_eq!(ListArgs::default().page().query(), "");
    }

    #[test]
    fn test_session_line_prefers_title() {
        let mut session = Session {
            id: "s1".into(),
            prompt: "first line\nsecond".into(),
            state: SessionState::InProgress,
            ..Session::default()
        };
        assert_eq!(session_line(&session), "s1\tIN_PROGRESS\tfirst line");
        session.title = "Fix login".into();
        assert_eq!(session_line(&session), "s1\tIN_PROGRESS\tFix login");
    }

    #[test]
    fn test_activity_line_falls_back_to_description() {
        let activity = Activity {
            id: "a1".into(),
            description: "Cloned repository".into(),
            event: ActivityEvent::Unknown(Payload::new()),
            ..Activity::default()
        };
        assert_eq!(activity_line(&activity), "a1\tunknown\tCloned repository");
    }
}
