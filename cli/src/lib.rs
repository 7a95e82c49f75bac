//! Library side of the `shuttle` binary: model construction from settings and console
//! formatting of messages and loop events.

pub mod display;
pub mod model;

pub use display::{format_event, format_history, format_message, truncate_display, StreamedReply};
pub use model::{api_base, build_llm, loop_config, ModelOverrides};
