use std::io::{Read, Write};

use crate::foundation::error::{LedError, LedResult};
use crate::pattern::model::Pattern;

/// JSON project load/save. Loading validates every invariant before returning.
impl Pattern {
    pub fn from_json(s: &str) -> LedResult<Self> {
        serde_json::from_str(s).map_err(|e| LedError::serde(format!("invalid project json: {e}")))
    }

    pub fn from_json_reader(r: impl Read) -> LedResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| LedError::serde(format!("invalid project json: {e}")))
    }

    pub fn to_json(&self) -> LedResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LedError::serde(format!("failed to encode project json: {e}")))
    }

    pub fn to_json_writer(&self, w: impl Write) -> LedResult<()> {
        serde_json::to_writer_pretty(w, self)
            .map_err(|e| LedError::serde(format!("failed to encode project json: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/io.rs"]
mod tests;
