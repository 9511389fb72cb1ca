//! Suggestions built without a structured model reply: line heuristics over
//! free text, and canned boards picked by prompt keywords.

use std::sync::LazyLock;

use db::validation::{MAX_STORY_POINTS, MIN_STORY_POINTS};
use regex::Regex;

use super::{
    BoardSuggestion, GenerateKind, Priority, Suggestion, TaskSuggestion,
    parse::{DEFAULT_COLUMNS, clean_name},
};

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*•+]|\d{1,3}[.)])\s+(.+)$").expect("valid list item regex")
});

// "5 points", "(3 pts)", "SP: 8", "story points: 2"
static STORY_POINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\[(]?\s*(?:\b(\d{1,3})\s*(?:story\s*)?(?:points?|pts?|sp)\b|\b(?:story\s*points|sp)\s*[:=]?\s*(\d{1,3})\b)\s*[\])]?",
    )
    .expect("valid story points regex")
});

static HIGH_PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:high|urgent|critical)(?:\s+priority)?\b").expect("valid priority regex")
});

static LOW_PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\blow(?:\s+priority)?\b").expect("valid priority regex")
});

static LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:board\s*name|board|name|title)\s*:\s*").expect("valid label regex")
});

/// Parse a free-text reply line by line; `None` when nothing usable is found.
pub fn heuristic(kind: GenerateKind, reply: &str) -> Option<Suggestion> {
    let lines: Vec<&str> = reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
        .filter(|line| !line.starts_with('{') && !line.starts_with('['))
        .collect();

    match kind {
        GenerateKind::BoardName => {
            let board = board_from_lines(&lines)?;
            Some(Suggestion::Board {
                name: board.name,
                description: board.description,
            })
        }
        GenerateKind::BoardWithTasks => {
            let tasks = tasks_from_lines(&lines);
            if tasks.is_empty() {
                return None;
            }
            let board = board_from_lines(&lines)?;
            Some(Suggestion::BoardWithTasks {
                board,
                columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
                tasks,
            })
        }
        GenerateKind::Tasks => {
            let tasks = tasks_from_lines(&lines);
            (!tasks.is_empty()).then_some(Suggestion::TaskList { tasks })
        }
        GenerateKind::Text => Some(Suggestion::PlainText {
            text: reply.trim().to_string(),
        }),
    }
}

/// First non-list line names the board; the next non-list line describes it.
fn board_from_lines(lines: &[&str]) -> Option<BoardSuggestion> {
    let mut plain = lines.iter().filter(|line| !LIST_ITEM.is_match(line));
    let name = clean_name(&LABEL_PREFIX.replace(plain.next()?, ""));
    if name.is_empty() {
        return None;
    }
    let description = plain
        .next()
        .map(|line| LABEL_PREFIX.replace(line, "").trim().to_string())
        .unwrap_or_default();
    Some(BoardSuggestion { name, description })
}

fn tasks_from_lines(lines: &[&str]) -> Vec<TaskSuggestion> {
    lines
        .iter()
        .filter_map(|line| LIST_ITEM.captures(line))
        .filter_map(|captures| captures.get(1).map(|m| task_from_item(m.as_str())))
        .flatten()
        .collect()
}

/// `Title: description`, `Title - description` or a bare title, with any
/// story point and priority markers lifted out.
fn task_from_item(item: &str) -> Option<TaskSuggestion> {
    let story_points = STORY_POINTS.captures(item).and_then(|c| {
        c.get(1)
            .or_else(|| c.get(2))
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .filter(|p| (MIN_STORY_POINTS..=MAX_STORY_POINTS).contains(p))
    });
    let priority = if HIGH_PRIORITY.is_match(item) {
        Priority::High
    } else if LOW_PRIORITY.is_match(item) {
        Priority::Low
    } else {
        Priority::Medium
    };

    let stripped = STORY_POINTS.replace_all(item, "");
    let stripped = stripped.trim().trim_end_matches([',', ';', '-']).trim();

    let (title, description) = match stripped.split_once(": ") {
        Some((title, description)) => (title, description),
        None => stripped
            .split_once(" - ")
            .or_else(|| stripped.split_once(" – "))
            .unwrap_or((stripped, "")),
    };

    let title = clean_name(title);
    if title.is_empty() {
        return None;
    }
    Some(TaskSuggestion {
        title,
        description: description.trim().to_string(),
        story_points,
        priority,
    })
}

struct CannedTask {
    title: &'static str,
    description: &'static str,
    story_points: i64,
    priority: Priority,
}

struct CannedPlan {
    name: &'static str,
    description: &'static str,
    tasks: &'static [CannedTask],
}

static WEB_PLAN: CannedPlan = CannedPlan {
    name: "Website Project",
    description: "Plan, build and launch the website",
    tasks: &[
        CannedTask {
            title: "Define site map",
            description: "List the pages and how they link together",
            story_points: 3,
            priority: Priority::High,
        },
        CannedTask {
            title: "Design page layouts",
            description: "Create wireframes for the main pages",
            story_points: 5,
            priority: Priority::High,
        },
        CannedTask {
            title: "Build responsive templates",
            description: "Implement layouts that work on desktop and mobile",
            story_points: 8,
            priority: Priority::Medium,
        },
        CannedTask {
            title: "Set up hosting and deployment",
            description: "Configure the domain, hosting and automatic deploys",
            story_points: 3,
            priority: Priority::Medium,
        },
        CannedTask {
            title: "Launch checklist",
            description: "Check links, performance and analytics before going live",
            story_points: 2,
            priority: Priority::Low,
        },
    ],
};

static MOBILE_PLAN: CannedPlan = CannedPlan {
    name: "Mobile App",
    description: "Take the app from idea to store release",
    tasks: &[
        CannedTask {
            title: "Define core user flows",
            description: "Map the screens a user goes through for the main features",
            story_points: 3,
            priority: Priority::High,
        },
        CannedTask {
            title: "Design app screens",
            description: "Create mockups for every screen in the core flows",
            story_points: 5,
            priority: Priority::High,
        },
        CannedTask {
            title: "Implement navigation",
            description: "Build the screen structure and navigation between screens",
            story_points: 8,
            priority: Priority::Medium,
        },
        CannedTask {
            title: "Add user authentication",
            description: "Implement sign up, login and session handling",
            story_points: 8,
            priority: Priority::Medium,
        },
        CannedTask {
            title: "Prepare store listing",
            description: "Write the description and capture screenshots for the app stores",
            story_points: 2,
            priority: Priority::Low,
        },
    ],
};

static MARKETING_PLAN: CannedPlan = CannedPlan {
    name: "Marketing Campaign",
    description: "Plan and run the campaign from research to results",
    tasks: &[
        CannedTask {
            title: "Research target audience",
            description: "Identify who the campaign is for and where to reach them",
            story_points: 3,
            priority: Priority::High,
        },
        CannedTask {
            title: "Set campaign goals",
            description: "Agree on measurable goals and a budget",
            story_points: 2,
            priority: Priority::High,
        },
        CannedTask {
            title: "Create content calendar",
            description: "Schedule posts, emails and announcements",
            story_points: 5,
            priority: Priority::Medium,
        },
        CannedTask {
            title: "Produce campaign assets",
            description: "Write copy and design visuals for each channel",
            story_points: 8,
            priority: Priority::Medium,
        },
        CannedTask {
            title: "Review results",
            description: "Compare the outcome against the goals and note lessons learned",
            story_points: 2,
            priority: Priority::Low,
        },
    ],
};

static DEFAULT_PLAN: CannedPlan = CannedPlan {
    name: "New Project",
    description: "Organize the work from planning to delivery",
    tasks: &[
        CannedTask {
            title: "Define project goals",
            description: "Write down what success looks like",
            story_points: 2,
            priority: Priority::High,
        },
        CannedTask {
            title: "Break down the work",
            description: "Split the project into tasks small enough to finish in a day or two",
            story_points: 3,
            priority: Priority::High,
        },
        CannedTask {
            title: "Set up the workspace",
            description: "Prepare the tools and environment the team needs",
            story_points: 3,
            priority: Priority::Medium,
        },
        CannedTask {
            title: "Review progress",
            description: "Hold a short review and adjust the plan",
            story_points: 1,
            priority: Priority::Low,
        },
    ],
};

static WEB_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:web|website|site|landing\s+page|frontend)\b").expect("valid regex")
});
static MOBILE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:mobile|apps?|ios|android)\b").expect("valid regex")
});
static MARKETING_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:marketing|campaign|launch|social\s+media)\b").expect("valid regex")
});

fn plan_for(prompt: &str) -> &'static CannedPlan {
    if WEB_KEYWORDS.is_match(prompt) {
        &WEB_PLAN
    } else if MOBILE_KEYWORDS.is_match(prompt) {
        &MOBILE_PLAN
    } else if MARKETING_KEYWORDS.is_match(prompt) {
        &MARKETING_PLAN
    } else {
        &DEFAULT_PLAN
    }
}

/// Built-in suggestion for `kind`, chosen by keywords in `prompt`.
pub fn canned(kind: GenerateKind, prompt: &str) -> Suggestion {
    let plan = plan_for(prompt);
    let board = BoardSuggestion {
        name: plan.name.to_string(),
        description: plan.description.to_string(),
    };
    let tasks = || -> Vec<TaskSuggestion> {
        plan.tasks
            .iter()
            .map(|t| TaskSuggestion {
                title: t.title.to_string(),
                description: t.description.to_string(),
                story_points: Some(t.story_points),
                priority: t.priority,
            })
            .collect()
    };

    match kind {
        GenerateKind::BoardName => Suggestion::Board {
            name: board.name,
            description: board.description,
        },
        GenerateKind::BoardWithTasks => Suggestion::BoardWithTasks {
            board,
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            tasks: tasks(),
        },
        GenerateKind::Tasks => Suggestion::TaskList { tasks: tasks() },
        GenerateKind::Text => {
            let steps: Vec<&str> = plan.tasks.iter().map(|t| t.title).collect();
            Suggestion::PlainText {
                text: format!("{}. Suggested next steps: {}.", plan.description, steps.join(", ")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_from_bullets() {
        let reply = "Here are some tasks:\n\
                     - Design login page: Mockups for sign in (5 points)\n\
                     2. Write API - REST endpoints for auth, high priority\n\
                     * **Deploy** SP: 3\n\
                     Thanks!";

        let Some(Suggestion::TaskList { tasks }) = heuristic(GenerateKind::Tasks, reply) else {
            panic!("expected task list");
        };
        assert_eq!(tasks.len(), 3);

        assert_eq!(tasks[0].title, "Design login page");
        assert_eq!(tasks[0].description, "Mockups for sign in");
        assert_eq!(tasks[0].story_points, Some(5));
        assert_eq!(tasks[0].priority, Priority::Medium);

        assert_eq!(tasks[1].title, "Write API");
        assert_eq!(tasks[1].priority, Priority::High);
        assert_eq!(tasks[1].story_points, None);

        assert_eq!(tasks[2].title, "Deploy");
        assert_eq!(tasks[2].story_points, Some(3));
    }

    #[test]
    fn test_board_name_from_first_line() {
        let reply = "Board name: Q3 Roadmap\nEverything planned for the quarter";
        assert_eq!(
            heuristic(GenerateKind::BoardName, reply),
            Some(Suggestion::Board {
                name: "Q3 Roadmap".to_string(),
                description: "Everything planned for the quarter".to_string(),
            })
        );
    }

    #[test]
    fn test_board_with_tasks_needs_tasks() {
        assert!(heuristic(GenerateKind::BoardWithTasks, "Just a title").is_none());

        let reply = "Home Renovation\n- Paint walls\n- Fix sink";
        let Some(Suggestion::BoardWithTasks { board, tasks, columns }) =
            heuristic(GenerateKind::BoardWithTasks, reply)
        else {
            panic!("expected board_with_tasks");
        };
        assert_eq!(board.name, "Home Renovation");
        assert_eq!(tasks.len(), 2);
        assert_eq!(columns.len(), 3);
    }

    #[test]
    fn test_nothing_usable() {
        assert!(heuristic(GenerateKind::Tasks, "I cannot help with that.").is_none());
        assert!(heuristic(GenerateKind::BoardName, "").is_none());
    }

    #[test]
    fn test_canned_picks_plan_by_keyword() {
        let Suggestion::Board { name, .. } = canned(GenerateKind::BoardName, "A new WEBSITE") else {
            panic!("expected board");
        };
        assert_eq!(name, "Website Project");

        let Suggestion::Board { name, .. } = canned(GenerateKind::BoardName, "my iOS app") else {
            panic!("expected board");
        };
        assert_eq!(name, "Mobile App");

        let Suggestion::Board { name, .. } = canned(GenerateKind::BoardName, "approach") else {
            panic!("expected board");
        };
        assert_eq!(name, "New Project");
    }

    #[test]
    fn test_canned_tasks_are_valid() {
        let Suggestion::TaskList { tasks } = canned(GenerateKind::Tasks, "marketing push") else {
            panic!("expected task list");
        };
        assert!(tasks.iter().all(|t| {
            t.story_points
                .is_some_and(|p| (MIN_STORY_POINTS..=MAX_STORY_POINTS).contains(&p))
        }));
        assert!(matches!(
            canned(GenerateKind::Text, "anything"),
            Suggestion::PlainText { .. }
        ));
    }
}
