//! consolebot: a chat bot you talk to from the terminal.
//!
//! Console lines become message activities, bot logic answers them, and
//! the console adapter prints what the bot sends back. The default bot
//! forwards questions to a hosted Q&A knowledge base.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod schema;

pub mod adapters;
pub mod bot;
pub mod qna;
