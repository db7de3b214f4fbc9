//! Agent orchestration core.
//!
//! The loop that turns one user message into zero or more tool
//! invocations and a final answer: bounded iteration, dual-dialect
//! tool-call parsing, argument resolution, and failure containment.

mod args;
mod parser;
mod runner;

pub use args::resolve_args;
pub use parser::{extract_calls, strip_tool_markup, Extraction, ToolCall};
pub use runner::{
    Agent, HISTORY_WINDOW, MAX_ITERATIONS, MAX_ITERATIONS_MESSAGE, NO_RESPONSE_MESSAGE,
};
