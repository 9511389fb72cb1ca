//! Interpreting a model reply as a [`Suggestion`].

use std::sync::LazyLock;

use db::validation::{MAX_NAME_LENGTH, MAX_STORY_POINTS, MIN_STORY_POINTS};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{
    BoardSuggestion, GenerateKind, GenerateResponse, Priority, Suggestion, SuggestionSource,
    TaskSuggestion, fallback,
};

pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("valid code fence regex")
});

#[derive(Deserialize)]
struct RawBoard {
    #[serde(alias = "title")]
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct RawTask {
    #[serde(alias = "name")]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "storyPoints", alias = "points")]
    story_points: Option<Value>,
    #[serde(default)]
    priority: Option<String>,
}

#[derive(Deserialize)]
struct RawPlan {
    #[serde(default)]
    board: Option<RawBoard>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    columns: Vec<Value>,
    #[serde(default)]
    tasks: Vec<RawTask>,
}

/// Turn a raw reply into a response, trying structured JSON first, then
/// line heuristics, then a canned suggestion for `prompt`.
pub fn interpret(kind: GenerateKind, reply: &str, prompt: &str) -> GenerateResponse {
    if kind == GenerateKind::Text {
        return GenerateResponse {
            source: SuggestionSource::Model,
            suggestion: Suggestion::PlainText {
                text: reply.trim().to_string(),
            },
        };
    }

    if let Some(suggestion) = extract_json(reply).and_then(|value| from_json(kind, value)) {
        return GenerateResponse {
            source: SuggestionSource::Model,
            suggestion,
        };
    }

    if let Some(suggestion) = fallback::heuristic(kind, reply) {
        return GenerateResponse {
            source: SuggestionSource::Heuristic,
            suggestion,
        };
    }

    GenerateResponse {
        source: SuggestionSource::Canned,
        suggestion: fallback::canned(kind, prompt),
    }
}

/// First JSON object or array in `text`, looking inside a code fence when
/// there is one.
pub fn extract_json(text: &str) -> Option<Value> {
    let body = CODE_FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
        .trim();

    if let Ok(value) = serde_json::from_str::<Value>(body)
        && (value.is_object() || value.is_array())
    {
        return Some(value);
    }

    let start = body.find(['{', '['])?;
    serde_json::Deserializer::from_str(&body[start..])
        .into_iter::<Value>()
        .next()?
        .ok()
}

fn from_json(kind: GenerateKind, value: Value) -> Option<Suggestion> {
    match kind {
        GenerateKind::BoardName => {
            let board = match value {
                Value::Object(mut map) if map.contains_key("board") => {
                    serde_json::from_value::<RawBoard>(map.remove("board")?).ok()?
                }
                other => serde_json::from_value::<RawBoard>(other).ok()?,
            };
            let board = normalize_board(board)?;
            Some(Suggestion::Board {
                name: board.name,
                description: board.description,
            })
        }
        GenerateKind::BoardWithTasks => {
            let plan = serde_json::from_value::<RawPlan>(value).ok()?;
            let board = match plan.board {
                Some(board) => normalize_board(board)?,
                None => normalize_board(RawBoard {
                    name: plan.name?,
                    description: plan.description,
                })?,
            };
            let tasks = normalize_tasks(plan.tasks);
            if tasks.is_empty() {
                return None;
            }
            let mut columns: Vec<String> = plan
                .columns
                .iter()
                .filter_map(column_name)
                .collect();
            if columns.is_empty() {
                columns = DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect();
            }
            Some(Suggestion::BoardWithTasks {
                board,
                columns,
                tasks,
            })
        }
        GenerateKind::Tasks => {
            let raw = match value {
                Value::Array(_) => serde_json::from_value::<Vec<RawTask>>(value).ok()?,
                Value::Object(mut map) => {
                    serde_json::from_value::<Vec<RawTask>>(map.remove("tasks")?).ok()?
                }
                _ => return None,
            };
            let tasks = normalize_tasks(raw);
            (!tasks.is_empty()).then_some(Suggestion::TaskList { tasks })
        }
        GenerateKind::Text => None,
    }
}

/// Column entries may be plain strings or `{ "name": ... }` objects.
fn column_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(name) => name.as_str(),
        Value::Object(map) => map.get("name")?.as_str()?,
        _ => return None,
    };
    let name = clean_name(name);
    (!name.is_empty()).then_some(name)
}

fn normalize_board(raw: RawBoard) -> Option<BoardSuggestion> {
    let name = clean_name(&raw.name);
    if name.is_empty() {
        return None;
    }
    Some(BoardSuggestion {
        name,
        description: raw.description.unwrap_or_default().trim().to_string(),
    })
}

fn normalize_tasks(raw: Vec<RawTask>) -> Vec<TaskSuggestion> {
    raw.into_iter()
        .filter_map(|task| {
            let title = clean_name(&task.title);
            if title.is_empty() {
                return None;
            }
            Some(TaskSuggestion {
                title,
                description: task.description.unwrap_or_default().trim().to_string(),
                story_points: task.story_points.as_ref().and_then(story_points),
                priority: task
                    .priority
                    .as_deref()
                    .map(parse_priority)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// Numbers or numeric strings within the accepted story point range.
fn story_points(value: &Value) -> Option<i64> {
    let points = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (MIN_STORY_POINTS..=MAX_STORY_POINTS)
        .contains(&points)
        .then_some(points)
}

pub fn parse_priority(value: &str) -> Priority {
    match value.trim().to_ascii_lowercase().as_str() {
        "high" | "urgent" | "critical" => Priority::High,
        "low" | "minor" => Priority::Low,
        _ => Priority::Medium,
    }
}

/// Trim quotes and markdown emphasis, capped at the name length limit.
pub fn clean_name(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c == '`' || c == '#')
        .trim()
        .chars()
        .take(MAX_NAME_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_block() {
        let reply = "Here you go:\n```json\n{\"name\": \"Roadmap\"}\n```\nEnjoy!";
        let value = extract_json(reply).unwrap();
        assert_eq!(value["name"], "Roadmap");
    }

    #[test]
    fn test_extract_json_ignores_surrounding_text() {
        let reply = "Sure! [{\"title\": \"A\"}, {\"title\": \"B\"}] Let me know.";
        let value = extract_json(reply).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert!(extract_json("no json here").is_none());
    }

    #[test]
    fn test_board_with_tasks_json() {
        let reply = r#"{
            "board": {"name": "Website Redesign", "description": "Refresh the site"},
            "columns": ["Backlog", {"name": "Doing"}, "Done"],
            "tasks": [
                {"title": "Audit pages", "description": "List every page", "story_points": 3, "priority": "HIGH"},
                {"title": "New palette", "story_points": "5"},
                {"title": "Huge", "story_points": 500, "priority": "someday"},
                {"title": "  "}
            ]
        }"#;

        let response = interpret(GenerateKind::BoardWithTasks, reply, "website");
        assert_eq!(response.source, SuggestionSource::Model);
        let Suggestion::BoardWithTasks {
            board,
            columns,
            tasks,
        } = response.suggestion
        else {
            panic!("expected board_with_tasks");
        };
        assert_eq!(board.name, "Website Redesign");
        assert_eq!(columns, vec!["Backlog", "Doing", "Done"]);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[1].story_points, Some(5));
        assert_eq!(tasks[1].description, "");
        assert_eq!(tasks[2].story_points, None);
        assert_eq!(tasks[2].priority, Priority::Medium);
    }

    #[test]
    fn test_board_with_tasks_defaults_columns() {
        let reply = r#"{"name": "Trip", "tasks": [{"title": "Book flights"}]}"#;
        let response = interpret(GenerateKind::BoardWithTasks, reply, "trip");
        let Suggestion::BoardWithTasks { columns, board, .. } = response.suggestion else {
            panic!("expected board_with_tasks");
        };
        assert_eq!(board.name, "Trip");
        assert_eq!(columns, DEFAULT_COLUMNS);
    }

    #[test]
    fn test_tasks_accept_bare_array() {
        let reply = r#"[{"name": "Write tests", "points": 2, "priority": "low"}]"#;
        let response = interpret(GenerateKind::Tasks, reply, "testing");
        assert_eq!(response.source, SuggestionSource::Model);
        assert_eq!(
            response.suggestion,
            Suggestion::TaskList {
                tasks: vec![TaskSuggestion {
                    title: "Write tests".to_string(),
                    description: String::new(),
                    story_points: Some(2),
                    priority: Priority::Low,
                }]
            }
        );
    }

    #[test]
    fn test_text_is_passed_through() {
        let response = interpret(GenerateKind::Text, "  Focus on the login flow.  ", "help");
        assert_eq!(response.source, SuggestionSource::Model);
        assert_eq!(
            response.suggestion,
            Suggestion::PlainText {
                text: "Focus on the login flow.".to_string()
            }
        );
    }

    #[test]
    fn test_wrong_shape_falls_through() {
        // Valid JSON with no usable name: line heuristics take over.
        let response = interpret(GenerateKind::BoardName, r#"{"foo": 1}"#, "website");
        assert_ne!(response.source, SuggestionSource::Model);
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  \"**Sprint Plan**\" "), "Sprint Plan");
        assert_eq!(clean_name(&"a".repeat(300)).len(), MAX_NAME_LENGTH);
    }
}
