//! Prompt templates sent to the text generator.

use serde_json::Value;

use super::GenerateKind;

const BOARD_NAME_INSTRUCTION: &str = "You name kanban boards. Reply with only a JSON object \
of the form {\"name\": string, \"description\": string}. Keep the name under 60 characters \
and the description to one sentence.";

const BOARD_WITH_TASKS_INSTRUCTION: &str = "You plan projects as kanban boards. Reply with \
only a JSON object of the form {\"board\": {\"name\": string, \"description\": string}, \
\"columns\": [string], \"tasks\": [{\"title\": string, \"description\": string, \
\"story_points\": integer, \"priority\": \"low\" | \"medium\" | \"high\"}]}. Use three to five \
columns and five to ten tasks. Story points range from 1 to 13.";

const TASKS_INSTRUCTION: &str = "You break work into kanban tasks. Reply with only a JSON \
object of the form {\"tasks\": [{\"title\": string, \"description\": string, \
\"story_points\": integer, \"priority\": \"low\" | \"medium\" | \"high\"}]}. Suggest three to \
eight tasks. Story points range from 1 to 13.";

const TEXT_INSTRUCTION: &str = "You are a concise assistant for a kanban task board. Reply \
in plain text without markdown headings.";

pub fn system_instruction(kind: GenerateKind) -> &'static str {
    match kind {
        GenerateKind::BoardName => BOARD_NAME_INSTRUCTION,
        GenerateKind::BoardWithTasks => BOARD_WITH_TASKS_INSTRUCTION,
        GenerateKind::Tasks => TASKS_INSTRUCTION,
        GenerateKind::Text => TEXT_INSTRUCTION,
    }
}

/// The user's prompt, followed by the caller's context as JSON when present.
pub fn user_message(prompt: &str, context: Option<&Value>) -> String {
    match context.filter(|c| !c.is_null()) {
        Some(context) => {
            let rendered =
                serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
            format!("{prompt}\n\nContext:\n{rendered}")
        }
        None => prompt.to_string(),
    }
}
