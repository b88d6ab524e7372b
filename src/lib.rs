//! Statecraft: session state for LLM agents.
//!
//! Keeps per-conversation variables in a [`session::SessionService`],
//! resolves `{placeholder}` instruction templates from them before every
//! model call, and exposes tools to the model through an [`agent::Agent`]
//! configuration driven by a [`runner::Runner`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use futures::StreamExt;
//! use statecraft::prelude::*;
//!
//! # async fn example() -> statecraft::error::Result<()> {
//! let sessions = Arc::new(InMemorySessionService::new());
//! let session = sessions
//!     .create_session(
//!         "Brandon Bot",
//!         "brandon_hancock",
//!         None,
//!         State::from([("user_name", "Brandon Hancock")]),
//!     )
//!     .await?;
//!
//! let agent = Agent::new("question_answering_agent", "gemini-2.0-flash")
//!     .with_instruction("The user's name is {user_name}.");
//! let runner = Runner::from_config(agent, "Brandon Bot", sessions, &StatecraftConfig::from_env())?;
//!
//! let mut events = runner.run("brandon_hancock", &session.id, Content::user("Who am I?"));
//! while let Some(event) = events.next().await {
//!     let event = event?;
//!     if event.is_final_response() {
//!         println!("{}", event.text().unwrap_or_default());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod runner;
pub mod session;
pub mod template;
pub mod tools;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
