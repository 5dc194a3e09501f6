//! reqdeck CLI
//!
//! Send requests, run saved ones, and manage workspaces, collections and
//! requests from the shell.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use reqdeck::state::request_state::{HttpMethod, RequestDraft, RequestTab};
use reqdeck::state::response_state::ResponseData;
use reqdeck::view::body::format_body;
use reqdeck::view::summary::{ResponseSummary, export_response};
use reqdeck::{App, Config};

/// reqdeck - send HTTP requests and keep them in collections
#[derive(Parser, Debug)]
#[command(name = "reqdeck")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where workspaces, collections and requests are stored
    #[arg(long, global = true, env = "REQDECK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a request built from flags
    Send {
        /// Optional with --request-id, where the saved URL is used
        #[arg(long, required_unless_present = "request_id")]
        url: Option<String>,

        #[arg(short = 'X', long, default_value = "GET")]
        method: HttpMethod,

        /// Key-value list, e.g. '[{"key":"Accept","value":"*/*"}]'
        #[arg(long)]
        headers: Option<String>,

        /// Key-value list of query parameters
        #[arg(long)]
        params: Option<String>,

        #[arg(long)]
        body: Option<String>,

        /// Link the tab to a saved request
        #[arg(long)]
        request_id: Option<String>,

        /// Treat the linked tab as edited, so the flags are sent as-is
        #[arg(long, requires = "request_id")]
        unsaved: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run a saved request by id
    Run {
        request_id: String,

        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(subcommand)]
    Workspace(WorkspaceCommand),
    #[command(subcommand)]
    Collection(CollectionCommand),
    #[command(subcommand)]
    Request(RequestCommand),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Print the full response as JSON
    #[arg(long)]
    json: bool,

    /// Also write the response to FILE
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum WorkspaceCommand {
    /// Create the default workspace if none exists
    Init,
    Create { name: String },
    List,
    Show { id: String },
}

#[derive(Subcommand, Debug)]
enum CollectionCommand {
    Create { workspace_id: String, name: String },
    List { workspace_id: String },
}

#[derive(Subcommand, Debug)]
enum RequestCommand {
    /// Save a new request into a collection
    Add {
        collection_id: String,
        #[command(flatten)]
        fields: RequestFields,
    },
    /// Overwrite a saved request
    Update {
        id: String,
        #[command(flatten)]
        fields: RequestFields,
    },
    Delete { collection_id: String, id: String },
    List { collection_id: String },
}

#[derive(Args, Debug)]
struct RequestFields {
    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    url: String,

    #[arg(short = 'X', long, default_value = "GET")]
    method: HttpMethod,

    #[arg(long)]
    body: Option<String>,

    #[arg(long)]
    headers: Option<String>,

    #[arg(long)]
    params: Option<String>,
}

impl From<RequestFields> for RequestDraft {
    fn from(fields: RequestFields) -> Self {
        let mut draft = RequestDraft::new(fields.name, fields.method, fields.url);
        draft.body = fields.body;
        draft.headers = fields.headers;
        draft.parameters = fields.params;
        draft
    }
}

/// RUST_LOG wins, then --verbose, then the configured level.
fn setup_logging(verbose: bool, config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { config.log_level.as_str() };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    setup_logging(cli.verbose, &config);
    debug!(?config, "loaded config");

    let mut app = App::from_config(&config).context("Failed to start")?;

    match cli.command {
        Commands::Send {
            url,
            method,
            headers,
            params,
            body,
            request_id,
            unsaved,
            output,
        } => {
            let tab = RequestTab {
                request_id,
                method,
                url: url.unwrap_or_default(),
                body,
                headers,
                parameters: params,
                unsaved_changes: unsaved,
                ..Default::default()
            };
            send_tab(&mut app, tab, &output).await
        }
        Commands::Run { request_id, output } => {
            let tab = RequestTab {
                request_id: Some(request_id),
                ..Default::default()
            };
            send_tab(&mut app, tab, &output).await
        }
        Commands::Workspace(command) => {
            workspace_command(&mut app, command).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Collection(command) => {
            collection_command(&mut app, command).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Request(command) => {
            request_command(&mut app, command).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn send_tab(app: &mut App, tab: RequestTab, output: &OutputArgs) -> Result<ExitCode> {
    let tab_id = app.store.open_with(tab).id.clone();
    let data = match app.send(&tab_id).await {
        Ok(data) => data,
        Err(_) => {
            eprintln!("Failed to send request.");
            return Ok(ExitCode::FAILURE);
        }
    };

    print_response(&data, output.json)?;
    if let Some(path) = &output.save {
        export_response(&data, path).with_context(|| format!("Failed to save {}", path.display()))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn print_response(data: &ResponseData, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(data)?);
        return Ok(());
    }
    println!("{}", ResponseSummary::from(data).line());
    if let Some(headers) = &data.request_run.headers {
        for (name, value) in headers {
            println!("{}: {}", name, value);
        }
    }
    println!();
    println!("{}", format_body(data.request_run.body.as_ref()));
    Ok(())
}

async fn workspace_command(app: &mut App, command: WorkspaceCommand) -> Result<()> {
    match command {
        WorkspaceCommand::Init => {
            let ws = app.initialize_workspace().await?;
            println!("{}\t{}", ws.id, ws.name);
        }
        WorkspaceCommand::Create { name } => {
            let ws = app.create_workspace(&name).await?;
            println!("{}\t{}", ws.id, ws.name);
        }
        WorkspaceCommand::List => {
            for ws in app.workspaces().await? {
                println!("{}\t{}", ws.id, ws.name);
            }
        }
        WorkspaceCommand::Show { id } => {
            let ws = app.workspace(&id).await?;
            println!("{}", serde_json::to_string_pretty(&ws)?);
            for col in app.collections(&ws.id).await? {
                println!("{}\t{}", col.id, col.name);
            }
        }
    }
    Ok(())
}

async fn collection_command(app: &mut App, command: CollectionCommand) -> Result<()> {
    match command {
        CollectionCommand::Create { workspace_id, name } => {
            let col = app.create_collection(&workspace_id, &name).await?;
            println!("{}\t{}", col.id, col.name);
        }
        CollectionCommand::List { workspace_id } => {
            for col in app.collections(&workspace_id).await? {
                println!("{}\t{}", col.id, col.name);
            }
        }
    }
    Ok(())
}

async fn request_command(app: &mut App, command: RequestCommand) -> Result<()> {
    match command {
        RequestCommand::Add { collection_id, fields } => {
            let saved = app.add_request_to_collection(&collection_id, fields.into()).await?;
            println!("{}\t{}\t{}\t{}", saved.id, saved.method, saved.name, saved.url);
        }
        RequestCommand::Update { id, fields } => {
            let saved = app.save_request(&id, fields.into()).await?;
            println!("{}\t{}\t{}\t{}", saved.id, saved.method, saved.name, saved.url);
        }
        RequestCommand::Delete { collection_id, id } => {
            app.delete_request(&collection_id, &id).await?;
        }
        RequestCommand::List { collection_id } => {
            for req in app.list_requests(&collection_id).await? {
                println!("{}\t{}\t{}\t{}", req.id, req.method, req.name, req.url);
            }
        }
    }
    Ok(())
}
