//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod reset;
mod serve;
mod telegram;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use reset::run_reset;
pub use serve::run_serve;
pub use telegram::run_telegram;
