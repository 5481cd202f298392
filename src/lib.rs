//! schemachat - client core for a natural-language database chat service
//!
//! Three workflows sit on top of one remote facade:
//! - [`conversation`]: one chat session's message list, optimistic echo first
//! - [`provisioning`]: verify-then-commit for new database connections
//! - [`schema_graph`]: table/relationship graph plus a selection controller
//!
//! [`auth`] holds the process-wide identity the facade authenticates with.

pub mod api;
pub mod auth;
pub mod config;
pub mod conversation;
pub mod error;
pub mod provisioning;
pub mod schema_graph;

pub use api::{ApiError, HttpRemote, LoggingRemote, RemoteService};
pub use auth::AuthState;
pub use config::ClientConfig;
pub use conversation::SessionManager;
pub use error::{ClientError, ClientResult};
pub use provisioning::Provisioner;
pub use schema_graph::{GraphExplorer, SchemaGraph};
