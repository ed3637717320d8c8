//! gateway-console: operator CLI for the gateway configuration graph.
//!
//! ```text
//!   settings (console.toml, env, flags)
//!        │
//!        ▼
//!   GatewayClient ──GET /config or dump──▶ Snapshot
//!        │                                   │
//!        │                    views / audit ◀┤
//!        │                                   ▼
//!        │                      editor ops on EditableConfig
//!        │                                   │
//!        └────────POST /config (If-Match)◀───┘
//!
//!   playground: tools / call-tool / send-message against a listener URL
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use gateway_console::client::{GatewayClient, LegacyResource, Snapshot};
use gateway_console::config::{load_config_or_default, ConfigMode};
use gateway_console::editor::{self, ListenerAddress};
use gateway_console::model::UNNAMED_LISTENER;
use gateway_console::observability::logging::init_logging;
use gateway_console::playground::{A2aClient, McpClient, SendResult};
use gateway_console::policy;

#[derive(Parser)]
#[command(name = "gateway-console")]
#[command(about = "Inspect and edit the gateway configuration", long_about = None)]
struct Cli {
    /// Console settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gateway admin API base URL
    #[arg(short, long)]
    url: Option<String>,

    /// How the gateway exposes its configuration
    #[arg(short, long, value_enum)]
    mode: Option<ConfigMode>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the whole configuration graph as JSON
    Show {
        /// Print the raw config dump instead of the mapped graph
        #[arg(long)]
        raw: bool,
    },
    /// List listeners per bind
    Listeners {
        /// Use the legacy /listeners endpoint
        #[arg(long)]
        legacy: bool,
    },
    /// List routes grouped by bind port
    Routes,
    /// List backends grouped by bind port
    Backends,
    /// Report routes violating the one-backend rule
    Audit,
    /// Delete a backend from an HTTP route
    DeleteBackend {
        #[command(flatten)]
        at: BackendArgs,
    },
    /// Change the weight of a backend
    SetWeight {
        #[command(flatten)]
        at: BackendArgs,
        #[arg(long)]
        weight: String,
    },
    /// List tools exposed by an MCP endpoint
    Tools {
        #[arg(long)]
        endpoint: String,
    },
    /// Invoke a tool on an MCP endpoint
    CallTool {
        #[arg(long)]
        endpoint: String,
        #[arg(long)]
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Send a text message to an A2A agent
    SendMessage {
        #[arg(long)]
        endpoint: String,
        #[arg(long)]
        text: String,
        /// Fetch and print the agent card first
        #[arg(long)]
        card: bool,
    },
}

#[derive(clap::Args)]
struct BackendArgs {
    #[arg(long)]
    port: u16,
    #[arg(long, default_value = UNNAMED_LISTENER)]
    listener: String,
    /// Route index within the listener
    #[arg(long)]
    route: usize,
    /// Backend index within the route
    #[arg(long)]
    backend: usize,
}

impl BackendArgs {
    fn address(&self) -> editor::BackendAddress {
        ListenerAddress::new(self.port, self.listener.clone())
            .route(self.route)
            .backend(self.backend)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = load_config_or_default(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        settings.gateway.api_base_url = url;
    }
    if let Some(mode) = cli.mode {
        settings.gateway.mode = mode;
    }
    if let Some(level) = cli.log_level {
        settings.observability.log_level = level;
    }
    init_logging(&settings.observability.log_level);

    tracing::debug!(
        api_base_url = %settings.gateway.api_base_url,
        mode = ?settings.gateway.mode,
        "gateway-console starting"
    );

    let timeout = settings.gateway.request_timeout();
    let client = GatewayClient::new(&settings.gateway)?;

    match cli.command {
        Commands::Show { raw } => {
            if raw {
                print_json(&client.fetch_raw_dump().await?)?;
            } else {
                let config = client.fetch().await?.into_config();
                print_json(&serde_json::to_value(&config)?)?;
            }
        }
        Commands::Listeners { legacy } => {
            if legacy {
                print_json(&client.list(LegacyResource::Listeners).await?)?;
            } else {
                let snapshot = client.fetch().await?;
                for bind in &snapshot.config().binds {
                    for listener in &bind.listeners {
                        println!(
                            "{:>6}  {:<20} {:<6} routes={} tcpRoutes={}",
                            bind.port,
                            listener.display_name(),
                            listener.protocol,
                            listener.routes().len(),
                            listener.tcp_routes().len()
                        );
                    }
                }
            }
        }
        Commands::Routes => {
            let snapshot = client.fetch().await?;
            print_mode(&snapshot);
            for (port, rows) in editor::routes_by_bind(snapshot.config()) {
                println!("bind {}", port);
                for row in rows {
                    println!(
                        "  {:<20} {:<4} #{:<3} {:<24} hosts=[{}] backends={}",
                        row.listener,
                        row.route.kind(),
                        row.route_index,
                        row.route.name().unwrap_or("-"),
                        row.route.hostnames().join(","),
                        row.route.backend_count()
                    );
                }
            }
        }
        Commands::Backends => {
            let snapshot = client.fetch().await?;
            print_mode(&snapshot);
            for (port, rows) in editor::backends_by_bind(snapshot.config()) {
                println!("bind {}", port);
                for row in rows {
                    println!(
                        "  {:<20} route #{:<3} backend #{:<3} {:<8} weight={:<4} {}",
                        row.listener,
                        row.route_index,
                        row.backend_index,
                        row.backend.backend.kind(),
                        row.backend.weight,
                        row.backend.backend.describe()
                    );
                }
            }
        }
        Commands::Audit => {
            let snapshot = client.fetch().await?;
            let findings = policy::audit(snapshot.config());
            if findings.is_empty() {
                println!("no routes violate the one-backend rule");
            }
            for f in findings {
                println!(
                    "bind {} listener {} {} route #{} ({}): {} backend(s) with {}",
                    f.bind_port,
                    f.listener,
                    f.kind,
                    f.route_index,
                    f.route_name.as_deref().unwrap_or("-"),
                    f.backend_count,
                    f.policies
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        Commands::DeleteBackend { at } => {
            let mut editable = client.fetch().await?.into_editable()?;
            let removed = editor::delete_backend(editable.config_mut(), &at.address())?;
            client.update(&mut editable).await?;
            println!("deleted {} backend {}", removed.backend.kind(), removed.backend.describe());
        }
        Commands::SetWeight { at, weight } => {
            let weight = editor::parse_weight(&weight)?;
            let mut editable = client.fetch().await?.into_editable()?;
            let address = at.address();
            let current = editor::find_backend(editable.config(), &address)?.clone();
            editor::edit_backend(editable.config_mut(), &address, current.with_weight(weight))?;
            client.update(&mut editable).await?;
            println!("weight set to {}", weight);
        }
        Commands::Tools { endpoint } => {
            let mcp = McpClient::connect(&endpoint, timeout).await?;
            let tools = mcp.list_tools().await;
            mcp.close().await;
            for tool in tools? {
                println!("{:<32} {}", tool.name, tool.description.unwrap_or_default());
            }
        }
        Commands::CallTool {
            endpoint,
            name,
            args,
        } => {
            let arguments: Value = serde_json::from_str(&args)?;
            let mcp = McpClient::connect(&endpoint, timeout).await?;
            let result = mcp.call_tool(&name, arguments).await;
            mcp.close().await;
            let result = result?;
            if result.is_error() {
                eprintln!("tool reported an error");
            }
            println!("{}", result.text());
        }
        Commands::SendMessage {
            endpoint,
            text,
            card,
        } => {
            let a2a = A2aClient::new(&endpoint, timeout)?;
            if card {
                let card = a2a.agent_card().await?;
                println!("agent {} ({} skill(s))", card.name, card.skills.len());
            }
            match a2a.send_message(&text, None).await? {
                SendResult::Task(task) => {
                    println!("task {} is {}", task.id, task.status.state);
                }
                SendResult::Message(message) => print_json(&message)?,
            }
        }
    }

    Ok(())
}

fn print_mode(snapshot: &Snapshot) {
    if !snapshot.is_editable() {
        println!("(read-only: configuration is managed externally)");
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
