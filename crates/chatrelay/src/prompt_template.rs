use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

/// Default system preamble. Rendered with [`SystemPromptContext`].
pub const SYSTEM_PROMPT: &str = "You are {{ assistant_name }}, a large language model \
    implemented by experts with Belto. Strictly follow the users instructions. \
    Current date: {{ current_date }}";

/// Variables available to the system preamble template.
#[derive(Debug, Clone, Serialize)]
pub struct SystemPromptContext {
    pub assistant_name: String,
    /// Formatted as `YYYY-MM-DD`
    pub current_date: String,
}

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_prompt() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        context.insert("age".to_string(), 30.to_string());

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "Hello, Alice! You are 30 years old.");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        // 'age' is missing from context
        let result = load_prompt(template, &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_system_prompt() {
        let context = SystemPromptContext {
            assistant_name: "BeltoAI".to_string(),
            current_date: "2024-05-01".to_string(),
        };

        let result = load_prompt(SYSTEM_PROMPT, &context).unwrap();
        assert_eq!(
            result,
            "You are BeltoAI, a large language model implemented by experts with Belto. \
             Strictly follow the users instructions. Current date: 2024-05-01"
        );
    }
}
