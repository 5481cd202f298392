//! schemachat - command-line driver for the chat, connection and schema workflows

use clap::{Parser, Subcommand};
use schemachat::api::{RemoteId, RemoteService};
use schemachat::conversation::{self, Message, Role};
use schemachat::provisioning::{self, ConnectionDraft, DbType, ProvisionContext, ProvisionState};
use schemachat::schema_graph::{columns_of, foreign_key_of};
use schemachat::{
    AuthState, ClientConfig, GraphExplorer, HttpRemote, LoggingRemote, Provisioner, SessionManager,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "schemachat")]
#[command(about = "Chat with your databases from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and print an access token for SCHEMACHAT_TOKEN
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SCHEMACHAT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the logged-in user
    Whoami,

    /// Manage database connections
    Connections {
        #[command(subcommand)]
        command: ConnectionCommand,
    },

    /// Chat sessions
    Chat {
        #[command(subcommand)]
        command: ChatCommand,
    },

    /// Explore a connection's schema graph
    Graph {
        #[command(subcommand)]
        command: GraphCommand,
    },
}

#[derive(Subcommand)]
enum ConnectionCommand {
    /// List connections
    List,

    /// Verify a new connection and commit it once the test passes
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "postgresql")]
        db_type: String,
        #[arg(long)]
        host: String,
        /// Defaults to the engine's standard port
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        username: String,
        #[arg(long, env = "SCHEMACHAT_DB_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        database: String,
        /// Also queue a schema scan after committing
        #[arg(long)]
        scan: bool,
    },
}

#[derive(Subcommand)]
enum ChatCommand {
    /// List sessions
    List,

    /// Start a session against a connection
    New {
        #[arg(long)]
        connection: RemoteId,
        message: String,
    },

    /// Send a message to an existing session
    Send { session: RemoteId, message: String },

    /// Print a session's messages
    Show { session: RemoteId },
}

#[derive(Subcommand)]
enum GraphCommand {
    /// Print tables and relationships
    Show {
        connection: RemoteId,
        /// Only describe this table
        #[arg(long)]
        table: Option<String>,
    },

    /// Queue a schema scan
    Scan { connection: RemoteId },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    let auth = AuthState::initialize(config.token.clone());
    let http = HttpRemote::new(&config, auth.clone())?;
    let remote: Arc<dyn RemoteService> = Arc::new(LoggingRemote::new(Arc::new(http)));

    tracing::debug!(api_url = %config.api_url, authenticated = auth.is_authenticated(), "Client configured");

    match cli.command {
        Command::Login { email, password } => {
            auth.login_with_password(remote.as_ref(), &email, &password)
                .await?;
            if let Some(token) = auth.token() {
                println!("{token}");
            }
        }

        Command::Whoami => {
            let user = auth.refresh_user(remote.as_ref()).await?;
            println!(
                "{} <{}>",
                user.full_name.as_deref().unwrap_or("(no name)"),
                user.email
            );
        }

        Command::Connections { command } => run_connections(remote, &config, command).await?,
        Command::Chat { command } => run_chat(remote, command).await?,
        Command::Graph { command } => run_graph(remote, command).await?,
    }

    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "schemachat=info".into());
    let json = std::env::var("SCHEMACHAT_LOG_JSON").is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_connections(
    remote: Arc<dyn RemoteService>,
    config: &ClientConfig,
    command: ConnectionCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ConnectionCommand::List => {
            for c in provisioning::list_connections(remote.as_ref()).await? {
                println!(
                    "{:>5}  {:<20} {}://{}@{}:{}/{}",
                    c.id, c.name, c.db_type, c.username, c.host, c.port, c.database_name
                );
            }
        }

        ConnectionCommand::Add {
            name,
            db_type,
            host,
            port,
            username,
            password,
            database,
            scan,
        } => {
            let db_type: DbType = db_type.parse()?;
            let draft = ConnectionDraft {
                name,
                db_type,
                host,
                port: port.unwrap_or(db_type.default_port()),
                username,
                secret: password,
                database_name: database,
            };
            let context = ProvisionContext {
                scan_on_commit: scan || config.scan_on_commit,
            };
            let provisioner = Provisioner::new(remote, context, draft);

            match provisioner.verify().await? {
                ProvisionState::Verified { connection_id, message } => {
                    println!("Connection {connection_id} verified: {message}");
                }
                ProvisionState::Failed { connection_id, reason, .. } => {
                    if let Some(id) = connection_id {
                        eprintln!("Connection {id} was saved but failed its test");
                    }
                    return Err(format!("verification failed: {reason}").into());
                }
                other => return Err(format!("unexpected state: {}", other.name()).into()),
            }

            let outcome = provisioner.commit().await?;
            println!("Connection {} committed", outcome.connection_id);
            match outcome.scan {
                Some(Ok(receipt)) => println!("Scan {}: {}", receipt.status, receipt.message),
                Some(Err(e)) => eprintln!("Scan not queued: {e}"),
                None => {}
            }
        }
    }
    Ok(())
}

async fn run_chat(
    remote: Arc<dyn RemoteService>,
    command: ChatCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ChatCommand::List => {
            for s in conversation::list_sessions(remote.as_ref()).await? {
                println!(
                    "{:>5}  {}  {}",
                    s.id,
                    s.created_at.format("%Y-%m-%d %H:%M"),
                    s.title.as_deref().unwrap_or("(untitled)")
                );
            }
        }

        ChatCommand::New { connection, message } => {
            let manager = SessionManager::create_session(remote, connection, &message).await?;
            println!("Session {}", manager.session_id());
            print_messages(&manager.messages());
        }

        ChatCommand::Send { session, message } => {
            let manager = SessionManager::open(remote, session).await?;
            if let Some(reply) = manager.send_message(&message).await? {
                print_messages(std::slice::from_ref(&reply));
            }
        }

        ChatCommand::Show { session } => {
            let manager = SessionManager::open(remote, session).await?;
            let snapshot = manager.snapshot();
            if let Some(title) = &snapshot.title {
                println!("# {title}");
            }
            print_messages(&snapshot.messages);
        }
    }
    Ok(())
}

fn print_messages(messages: &[Message]) {
    for m in messages {
        let who = match m.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("[{who}] {}", m.content);
        if let Some(sql) = &m.derived_query {
            println!("    {sql}");
        }
    }
}

async fn run_graph(
    remote: Arc<dyn RemoteService>,
    command: GraphCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        GraphCommand::Show { connection, table } => {
            let mut explorer = GraphExplorer::new();
            let dropped = explorer.load(remote.as_ref(), connection).await?;
            if dropped > 0 {
                eprintln!("{dropped} relationship(s) referenced unknown tables and were skipped");
            }

            let ids: Vec<RemoteId> = match table {
                Some(name) => {
                    let node = explorer
                        .node_by_name(&name)
                        .ok_or_else(|| format!("no table named {name}"))?;
                    vec![node.id]
                }
                None => explorer.graph().nodes().map(|n| n.id).collect(),
            };

            for id in ids {
                explorer.select_node(id);
                let Some(node) = explorer.selected_node() else {
                    continue;
                };
                println!("{} ({})", node.name, node.kind.as_str());
                for column in columns_of(node) {
                    let null = if column.nullable { "" } else { " not null" };
                    println!("    {} {}{null}", column.name, column.data_type);
                }
                for (edge, target) in explorer.outgoing(id) {
                    match foreign_key_of(edge) {
                        Some(fk) => println!(
                            "    -> {}.{} via {}",
                            target.name, fk.target_column, fk.source_column
                        ),
                        None => println!("    -> {} ({})", target.name, edge.kind),
                    }
                }
            }
        }

        GraphCommand::Scan { connection } => {
            let receipt = remote.scan_connection(connection).await?;
            println!("{}: {}", receipt.status, receipt.message);
        }
    }
    Ok(())
}
