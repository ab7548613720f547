use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::message::Message;

/// Named instruction presets injected after the system preamble.
///
/// Lookups never fail: a key that is not in the table resolves to no extra
/// instructions at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionPresets {
    presets: HashMap<String, Vec<Message>>,
}

impl InstructionPresets {
    pub fn new(presets: HashMap<String, Vec<Message>>) -> Self {
        Self { presets }
    }

    /// Messages for `key`, or an empty slice when the key is unknown.
    pub fn get_or_empty(&self, key: &str) -> &[Message] {
        self.presets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.presets.contains_key(key)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Vec<Message>)> for InstructionPresets {
    fn from_iter<T: IntoIterator<Item = (String, Vec<Message>)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_key_returns_messages_in_order() {
        let presets: InstructionPresets = [(
            "gpt-dan".to_string(),
            vec![Message::user("first"), Message::assistant("second")],
        )]
        .into_iter()
        .collect();

        let messages = presets.get_or_empty("gpt-dan");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let presets = InstructionPresets::default();
        assert!(presets.get_or_empty("default").is_empty());
        assert!(!presets.contains("default"));
    }

    #[test]
    fn test_deserialize_from_table() {
        let presets: InstructionPresets = serde_json::from_value(json!({
            "concise": [{"role": "system", "content": "Answer briefly."}]
        }))
        .unwrap();

        assert!(presets.contains("concise"));
        assert_eq!(presets.get_or_empty("concise")[0], Message::system("Answer briefly."));
    }
}
