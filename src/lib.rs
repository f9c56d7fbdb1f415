pub mod chord;
pub mod clock;
pub mod dsp;
pub mod error;
pub mod parser;
pub mod player;
pub mod voicing;

pub use crate::chord::{ChordEvent, ChordQuality, RootNote, Sequence, Stroke, StrumPattern};
pub use crate::parser::is_valid_sequence;
pub use crate::player::{PlayStyle, PlaybackListener, PlaybackParams, PlaybackState, Player};

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the strumline-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Parse sequence text into a `Sequence`. Total: malformed tokens are
/// logged and skipped, never fatal.
pub fn parse(source: &str) -> Sequence {
    parser::parse(source)
}

/// Parse sequence text and serialize the result as JSON, for hosts that
/// talk over a byte boundary instead of the WASM one.
pub fn parse_to_json(source: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&parse(source))
}

/// WASM-exposed: parse sequence text into a JS `Sequence` value.
#[wasm_bindgen]
pub fn parse_sequence(source: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&parse(source)).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: the permissive validity predicate gating the play button.
#[wasm_bindgen]
pub fn sequence_is_valid(source: &str) -> bool {
    parser::is_valid_sequence(source)
}
