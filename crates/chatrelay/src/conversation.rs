use chrono::NaiveDate;

use crate::errors::{RelayError, RelayResult};
use crate::models::message::Message;
use crate::presets::InstructionPresets;
use crate::prompt_template::{load_prompt, SystemPromptContext, SYSTEM_PROMPT};

pub const DEFAULT_ASSISTANT_NAME: &str = "BeltoAI";

/// Assembles the message list sent to a completion server.
///
/// The order is fixed: system preamble, instruction preset, prior history,
/// latest prompt.
#[derive(Debug, Clone)]
pub struct ConversationBuilder {
    presets: InstructionPresets,
    system_template: String,
    assistant_name: String,
}

impl ConversationBuilder {
    pub fn new(presets: InstructionPresets) -> Self {
        Self {
            presets,
            system_template: SYSTEM_PROMPT.to_string(),
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
        }
    }

    pub fn with_system_template<S: Into<String>>(mut self, template: S) -> Self {
        self.system_template = template.into();
        self
    }

    pub fn with_assistant_name<S: Into<String>>(mut self, name: S) -> Self {
        self.assistant_name = name.into();
        self
    }

    pub fn presets(&self) -> &InstructionPresets {
        &self.presets
    }

    pub fn system_message(&self, date: NaiveDate) -> RelayResult<Message> {
        let context = SystemPromptContext {
            assistant_name: self.assistant_name.clone(),
            current_date: date.format("%Y-%m-%d").to_string(),
        };
        let content = load_prompt(&self.system_template, &context)
            .map_err(|e| RelayError::Prompt(e.to_string()))?;
        Ok(Message::system(content))
    }

    /// Build the outbound conversation. `prompt` goes last, unchanged.
    pub fn build(
        &self,
        history: Vec<Message>,
        prompt: Message,
        preset: &str,
        date: NaiveDate,
    ) -> RelayResult<Vec<Message>> {
        let instructions = self.presets.get_or_empty(preset);

        let mut conversation = Vec::with_capacity(instructions.len() + history.len() + 2);
        conversation.push(self.system_message(date)?);
        conversation.extend_from_slice(instructions);
        conversation.extend(history);
        conversation.push(prompt);

        Ok(conversation)
    }
}
