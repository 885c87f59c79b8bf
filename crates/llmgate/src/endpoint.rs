//! Endpoint selection for OpenAI-compatible gateways.

use serde_json::{Map, Value};

/// Chat-completion endpoint path.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Text-completion endpoint path.
pub const COMPLETIONS_PATH: &str = "/v1/completions";

/// Select the target path from the request payload.
///
/// A `messages` key selects the chat-completion path, otherwise a `prompt`
/// key selects the text-completion path. Payloads with neither default to
/// chat completions. Checked in that order, so a payload carrying both keys
/// always goes to the chat path.
pub fn endpoint_for(params: &Map<String, Value>) -> &'static str {
    if params.contains_key("messages") {
        return CHAT_COMPLETIONS_PATH;
    }
    if params.contains_key("prompt") {
        return COMPLETIONS_PATH;
    }
    CHAT_COMPLETIONS_PATH
}
