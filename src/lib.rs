pub mod catalog;
pub mod chat;
pub mod config;
pub mod formatter;
pub mod provider;
pub mod session;
pub mod web_server;

pub use catalog::{default_catalog, Catalog, RecommendedItem};
pub use config::{PersonaConfig, ProviderKind};
pub use provider::{ChatRole, ChatTurn, CompletionProvider, ProviderError};
pub use session::{Message, Sender, Session, SubmitOutcome};
