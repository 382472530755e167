// Recovery Coach - Crisis-aware recovery support chat
// Library exports

pub mod cli;
pub mod coach;
pub mod config;
pub mod conversation;
pub mod crisis;
pub mod errors;
pub mod metrics;
pub mod providers;
pub mod responder;
pub mod server;
pub mod store;
