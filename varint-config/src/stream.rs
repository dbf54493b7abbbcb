use serde::{Deserialize, Serialize};
use varint_protocol::{uleb128::MAX_U64_SIZE, Codec, Uleb128};

// Reading varints from untrusted input
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StreamConfig {
    /// Most bytes a single varint may span before reading gives up.
    /// 10 fits any `u64`, 19 any `u128`.
    pub max_encoded_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_encoded_size: MAX_U64_SIZE,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=Uleb128::MAX_SIZE).contains(&self.max_encoded_size) {
            return Err(format!(
                "stream.max_encoded_size must be between 1 and {}, got {}",
                Uleb128::MAX_SIZE,
                self.max_encoded_size
            ));
        }
        Ok(())
    }
}
