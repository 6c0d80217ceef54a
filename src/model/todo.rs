//! Todo pages: a flat view over a database row's properties.

use super::{Page, Paginated, Properties, PropertySchema, PropertyValue, Schema, SelectOption};
use super::properties::DateValue;
use crate::constants::{
    TODO_DEFAULT_STATUS, TODO_DESCRIPTION_PROPERTY, TODO_DUE_DATE_PROPERTY,
    TODO_PRIORITY_PROPERTY, TODO_STATUS_PROPERTY, TODO_TAGS_PROPERTY, TODO_TASK_PROPERTY,
};
use crate::types::{Color, PageId, RichText, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    fn color(&self) -> Color {
        match self {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Blue,
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidChoice {
                field: "priority",
                value: s.to_string(),
                expected: "high, medium or low",
            })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for a new todo page. Absent fields are left off the request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTodo {
    pub task: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    pub status: Option<String>,
}

impl NewTodo {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Self::default()
        }
    }
}

/// Builds the property bag of a todo page.
///
/// Only supplied fields appear; empty strings and an empty tag list count
/// as absent.
pub fn create_todo_properties(todo: &NewTodo) -> Result<Properties, ValidationError> {
    let mut properties = Properties::new();
    properties.insert(
        TODO_TASK_PROPERTY.to_string(),
        PropertyValue::Title(vec![RichText::new(&todo.task, None, None)?]),
    );

    if let Some(description) = todo.description.as_deref().filter(|d| !d.is_empty()) {
        properties.insert(
            TODO_DESCRIPTION_PROPERTY.to_string(),
            PropertyValue::RichText(vec![RichText::new(description, None, None)?]),
        );
    }

    if let Some(due) = todo.due_date {
        properties.insert(
            TODO_DUE_DATE_PROPERTY.to_string(),
            PropertyValue::Date(Some(DateValue {
                start: due.format("%Y-%m-%d").to_string(),
                end: None,
                time_zone: None,
            })),
        );
    }

    if let Some(priority) = todo.priority {
        properties.insert(
            TODO_PRIORITY_PROPERTY.to_string(),
            PropertyValue::Select(Some(SelectOption::named(priority.as_str()))),
        );
    }

    if !todo.tags.is_empty() {
        properties.insert(
            TODO_TAGS_PROPERTY.to_string(),
            PropertyValue::MultiSelect(todo.tags.iter().map(SelectOption::named).collect()),
        );
    }

    if let Some(status) = todo.status.as_deref().filter(|s| !s.is_empty()) {
        properties.insert(
            TODO_STATUS_PROPERTY.to_string(),
            PropertyValue::Status(Some(SelectOption::named(status))),
        );
    }

    Ok(properties)
}

/// A todo read back from a database row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Todo {
    pub id: PageId,
    pub url: Option<String>,
    pub task: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn from_page(page: &Page) -> Self {
        let props = &page.properties;
        let text = |name: &str| {
            props
                .get(name)
                .and_then(PropertyValue::as_text)
                .filter(|t| !t.is_empty())
        };

        let due_date = match props.get(TODO_DUE_DATE_PROPERTY) {
            Some(PropertyValue::Date(Some(date))) => {
                let day = date.start.get(..10).unwrap_or(&date.start);
                NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
            }
            _ => None,
        };

        let tags = match props.get(TODO_TAGS_PROPERTY) {
            Some(PropertyValue::MultiSelect(options)) => {
                options.iter().map(|o| o.name.clone()).collect()
            }
            _ => Vec::new(),
        };

        Self {
            id: page.id.clone(),
            url: page.url.clone(),
            task: text(TODO_TASK_PROPERTY).unwrap_or_default(),
            description: text(TODO_DESCRIPTION_PROPERTY),
            due_date,
            priority: props
                .get(TODO_PRIORITY_PROPERTY)
                .and_then(PropertyValue::option_name)
                .map(str::to_string),
            tags,
            // Status may be a status or a select property depending on how
            // the database was created.
            status: props
                .get(TODO_STATUS_PROPERTY)
                .and_then(PropertyValue::option_name)
                .unwrap_or(TODO_DEFAULT_STATUS)
                .to_string(),
            created_time: page.created_time,
            last_edited_time: page.last_edited_time,
        }
    }
}

/// One page of todos from a database query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoList {
    pub todos: Vec<Todo>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl From<Paginated<Page>> for TodoList {
    fn from(pages: Paginated<Page>) -> Self {
        Self {
            todos: pages.results.iter().map(Todo::from_page).collect(),
            next_cursor: pages.next_cursor,
            has_more: pages.has_more,
        }
    }
}

/// Default schema of a todo database.
pub fn todo_database_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert(TODO_TASK_PROPERTY.to_string(), PropertySchema::Title);
    schema.insert(TODO_DESCRIPTION_PROPERTY.to_string(), PropertySchema::RichText);
    schema.insert(TODO_DUE_DATE_PROPERTY.to_string(), PropertySchema::Date);
    schema.insert(
        TODO_PRIORITY_PROPERTY.to_string(),
        PropertySchema::Select {
            options: Priority::ALL
                .iter()
                .map(|p| SelectOption::colored(p.as_str(), p.color()))
                .collect(),
        },
    );
    schema.insert(
        TODO_TAGS_PROPERTY.to_string(),
        PropertySchema::MultiSelect { options: Vec::new() },
    );
    schema.insert(
        TODO_STATUS_PROPERTY.to_string(),
        PropertySchema::Status {
            options: vec![
                SelectOption::colored(TODO_DEFAULT_STATUS, Color::Gray),
                SelectOption::colored("In Progress", Color::Yellow),
                SelectOption::colored("Completed", Color::Green),
            ],
        },
    );
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn todo_properties_omit_absent_fields() {
        let properties = create_todo_properties(&NewTodo::new("Buy milk")).unwrap();
        assert_eq!(
            serde_json::to_value(&properties).unwrap(),
            json!({"Task": {"title": [{"type": "text", "text": {"content": "Buy milk"}}]}})
        );
    }

    #[test]
    fn todo_properties_with_every_field() {
        let todo = NewTodo {
            task: "Release".to_string(),
            description: Some("Cut 1.0".to_string()),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            priority: Some(Priority::High),
            tags: vec!["work".to_string()],
            status: Some("In Progress".to_string()),
        };
        let wire = serde_json::to_value(create_todo_properties(&todo).unwrap()).unwrap();
        assert_eq!(wire["Due Date"], json!({"date": {"start": "2024-03-01"}}));
        assert_eq!(wire["Priority"], json!({"select": {"name": "high"}}));
        assert_eq!(wire["Tags"], json!({"multi_select": [{"name": "work"}]}));
        assert_eq!(wire["Status"], json!({"status": {"name": "In Progress"}}));
        assert_eq!(wire["Description"]["rich_text"][0]["text"]["content"], "Cut 1.0");
    }

    #[test]
    fn blank_task_is_rejected() {
        assert_eq!(
            create_todo_properties(&NewTodo::new("  ")).unwrap_err(),
            ValidationError::EmptyContent
        );
    }

    #[test]
    fn projects_a_page_into_a_todo() {
        let page: Page = serde_json::from_value(json!({
            "id": "b55c9c91384d452b81dbd1ef79372b75",
            "properties": {
                "Task": {"type": "title", "title": [{"type": "text", "text": {"content": "Ship"}}]},
                "Due Date": {"type": "date", "date": {"start": "2024-05-02T09:00:00.000+02:00"}},
                "Tags": {"type": "multi_select", "multi_select": [{"name": "a"}, {"name": "b"}]},
                "Status": {"type": "select", "select": {"name": "Completed"}}
            }
        }))
        .unwrap();

        let todo = Todo::from_page(&page);
        assert_eq!(todo.task, "Ship");
        assert_eq!(todo.due_date, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(todo.tags, vec!["a", "b"]);
        assert_eq!(todo.status, "Completed");
        assert_eq!(todo.description, None);
    }

    #[test]
    fn missing_status_defaults_to_not_started() {
        let page: Page = serde_json::from_value(json!({
            "id": "b55c9c91384d452b81dbd1ef79372b75",
            "properties": {}
        }))
        .unwrap();
        assert_eq!(Todo::from_page(&page).status, TODO_DEFAULT_STATUS);
    }

    #[test]
    fn priority_parsing() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!(matches!(
            "urgent".parse::<Priority>(),
            Err(ValidationError::InvalidChoice { field: "priority", .. })
        ));
    }

    #[test]
    fn schema_lists_the_todo_columns() {
        let schema = todo_database_schema();
        let names: Vec<&str> = schema.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["Task", "Description", "Due Date", "Priority", "Tags", "Status"]
        );
        assert_eq!(schema["Priority"].options().len(), 3);
    }
}
