//! Discord Integration - slash command bot for the stream archive
//!
//! This crate turns chat interactions into archive lookups:
//! - **Commands** (`commands`) - `/neuestes`, `/suche`, `/uuid`, `/stats` and the router
//! - **Rendering** (`render`) - archive results to reply text and embeds
//! - **Embeds** (`embeds`) - reply model and builders
//! - **Events** (`events`) - gateway event types and the dispatcher
//! - **Gateway** (`gateway`) - session seam and the event loop
//!
//! # Architecture
//!
//! ```text
//! GatewaySession → GatewayRunner → EventDispatcher → CommandRouter → ArchiveApi
//!                       ↑                                  ↓
//!                 respond(reply)  ←  render::*  ←  archive results
//! ```
//!
//! # Key Types
//!
//! - `GatewayRunner` - event loop, one task per interaction
//! - `CommandRouter` - validates arguments and produces exactly one reply
//! - `MessageBuilder` - constructs embed replies

pub mod commands;
pub mod embeds;
pub mod events;
pub mod gateway;
pub mod render;

pub use commands::{command_definitions, CommandKind, CommandRouter};
pub use embeds::MessageTemplate;
pub use events::{archive_dispatcher, EventDispatcher};
pub use gateway::{GatewayError, GatewayRunner, GatewaySession, NoopGatewaySession};
pub use render::ArchiveLinks;
