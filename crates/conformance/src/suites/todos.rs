//! The canonical /todos suite: 20 cases covering the default state, CRUD,
//! relationship reads and links, and the documented server bugs.
//!
//! Expected bodies describe the default state after a server restart (todos
//! "1" and "2", project "1" Office Work, category "1" Office), so this suite
//! should run restart-per-case or against a freshly started server.

use serde_json::json;

use crate::spec::{IdSource, Method, ResourceKind, TestSpec};

fn literal(value: &str) -> IdSource {
    IdSource::Literal(value.to_string())
}

pub fn specs() -> Vec<TestSpec> {
    vec![
        TestSpec::new("test_01_get_all_todos", Method::Get, "/todos")
            .describe("Should see exactly 2 default todos if server restart worked properly")
            .expect_body(json!({
                "todos": [
                    {
                        "id": "2",
                        "title": "file paperwork",
                        "doneStatus": "false",
                        "description": "",
                        "tasksof": [{"id": "1"}]
                    },
                    {
                        "id": "1",
                        "title": "scan paperwork",
                        "doneStatus": "false",
                        "description": "",
                        "tasksof": [{"id": "1"}],
                        "categories": [{"id": "1"}]
                    }
                ]
            })),
        TestSpec::new("test_02_head_todos", Method::Head, "/todos").check_headers(),
        TestSpec::new("test_03_create_todo", Method::Post, "/todos")
            .describe("New todo gets id 3 since the fresh server holds todos 1 and 2")
            .body(json!({
                "title": "Check emails",
                "doneStatus": false,
                "description": "Respond to my important emails"
            }))
            .expect_status(&[201])
            .expect_body(json!({
                "id": "3",
                "title": "Check emails",
                "doneStatus": "false",
                "description": "Respond to my important emails"
            })),
        TestSpec::new("test_04_get_specific_todo", Method::Get, "/todos/{id}")
            .describe("Get specific todo with ID=1")
            .replace("{id}", literal("1"))
            .expect_body(json!({
                "todos": [
                    {
                        "id": "1",
                        "title": "scan paperwork",
                        "doneStatus": "false",
                        "description": "",
                        "tasksof": [{"id": "1"}],
                        "categories": [{"id": "1"}]
                    }
                ]
            })),
        TestSpec::new("test_05_head_specific_todo", Method::Head, "/todos/{id}")
            .replace("{id}", literal("1"))
            .check_headers(),
        TestSpec::new("test_06_update_todo_post", Method::Post, "/todos/{id}")
            .describe("Update todo ID=1 using POST - change doneStatus and description")
            .replace("{id}", literal("1"))
            .body(json!({
                "doneStatus": true,
                "description": "A new description here!"
            }))
            .expect_body(json!({
                "id": "1",
                "title": "scan paperwork",
                "doneStatus": "true",
                "description": "A new description here!",
                "tasksof": [{"id": "1"}],
                "categories": [{"id": "1"}]
            })),
        TestSpec::new("test_07_replace_todo_put", Method::Put, "/todos/{id}")
            .describe("Replace todo ID=1 using PUT - no relationships preserved")
            .replace("{id}", literal("1"))
            .body(json!({
                "title": "Since this one replaces the todo, a new title is required!",
                "description": "Updated the description here!",
                "doneStatus": false
            }))
            .expect_body(json!({
                "id": "1",
                "title": "Since this one replaces the todo, a new title is required!",
                "doneStatus": "false",
                "description": "Updated the description here!"
            })),
        TestSpec::new("test_08_delete_todo", Method::Delete, "/todos/{id}")
            .replace("{id}", literal("1")),
        TestSpec::new("test_09_get_todo_projects", Method::Get, "/todos/{id}/tasksof")
            .describe("Projects that todo ID=1 is a task of - the Office Work project")
            .replace("{id}", literal("1"))
            .expect_body(json!({
                "projects": [
                    {
                        "id": "1",
                        "title": "Office Work",
                        "completed": "false",
                        "active": "false",
                        "description": "",
                        "tasks": [{"id": "1"}, {"id": "2"}]
                    }
                ]
            })),
        // Purposefully no id replacement - the literal {id} path exercises a
        // known server bug that returns the same project twice
        TestSpec::new("test_10_get_todo_projects_bug", Method::Get, "/todos/{id}/tasksof")
            .describe("Bug: /todos/{id}/tasksof with literal {id} returns duplicate projects")
            .expect_body(json!({
                "projects": [
                    {
                        "id": "1",
                        "title": "Office Work",
                        "completed": "false",
                        "active": "false",
                        "description": "",
                        "tasks": [{"id": "2"}, {"id": "1"}]
                    },
                    {
                        "id": "1",
                        "title": "Office Work",
                        "completed": "false",
                        "active": "false",
                        "description": "",
                        "tasks": [{"id": "2"}, {"id": "1"}]
                    }
                ]
            })),
        TestSpec::new("test_11_head_todo_projects", Method::Head, "/todos/{id}/tasksof")
            .replace("{id}", literal("1"))
            .check_headers(),
        TestSpec::new("test_12_link_todo_to_project", Method::Post, "/todos/{id}/tasksof")
            .describe("Link todo ID=1 to the project created in setup (id 2 on a fresh server)")
            .setup(
                ResourceKind::Project,
                json!({"title": "Test Project", "description": "For testing"}),
            )
            .replace("{id}", literal("1"))
            .body(json!({"id": "2"}))
            .expect_status(&[201]),
        TestSpec::new("test_13_create_project_via_todo_bug", Method::Post, "/todos/{id}/tasksof")
            .describe("Bug: POST /todos/1/tasksof with no body creates a default project")
            .replace("{id}", literal("1"))
            .expect_status(&[201])
            .expect_body(json!({
                "id": "2",
                "title": "",
                "completed": "false",
                "active": "false",
                "description": "",
                "tasks": [{"id": "1"}]
            })),
        TestSpec::new(
            "test_14_delete_todo_project_relationship",
            Method::Delete,
            "/todos/{id}/tasksof/{id2}",
        )
        .replace("{id}", literal("1"))
        .replace("{id2}", literal("1")),
        TestSpec::new("test_15_get_todo_categories", Method::Get, "/todos/{id}/categories")
            .describe("Categories that todo ID=1 belongs to - the Office category")
            .replace("{id}", literal("1"))
            .expect_body(json!({
                "categories": [
                    {"id": "1", "title": "Office", "description": ""}
                ]
            })),
        // Again no id replacement on purpose
        TestSpec::new("test_16_get_todo_categories_bug", Method::Get, "/todos/{id}/categories")
            .describe("Bug: /todos/{id}/categories with literal {id} still returns Office")
            .expect_body(json!({
                "categories": [
                    {"id": "1", "title": "Office", "description": ""}
                ]
            })),
        TestSpec::new("test_17_head_todo_categories", Method::Head, "/todos/{id}/categories")
            .replace("{id}", literal("1"))
            .check_headers(),
        TestSpec::new("test_18_link_todo_to_category", Method::Post, "/todos/{id}/categories")
            .describe("Link todo ID=1 to the category created in setup")
            .setup(
                ResourceKind::Category,
                json!({"title": "Test Category", "description": "For testing"}),
            )
            .replace("{id}", literal("1"))
            .body(json!({"id": "2"}))
            .expect_status(&[201]),
        TestSpec::new(
            "test_19_create_category_via_todo_bug",
            Method::Post,
            "/todos/{id}/categories",
        )
        .describe("Bug: POST /todos/1/categories with a title creates a category instead of linking")
        .replace("{id}", literal("1"))
        .body(json!({"title": "Test title"}))
        .expect_status(&[201])
        .expect_body(json!({
            "id": "3",
            "title": "Test title",
            "description": ""
        })),
        TestSpec::new(
            "test_20_delete_todo_category_relationship",
            Method::Delete,
            "/todos/{id}/categories/{id2}",
        )
        .replace("{id}", literal("1"))
        .replace("{id2}", literal("1")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_cases_validate() {
        for spec in specs() {
            spec.validate().unwrap_or_else(|e| panic!("{e}"));
        }
    }

    #[test]
    fn suite_has_the_twenty_canonical_cases() {
        let specs = specs();
        assert_eq!(specs.len(), 20);
        assert_eq!(specs[0].name, "test_01_get_all_todos");
        assert_eq!(specs[19].name, "test_20_delete_todo_category_relationship");
    }

    #[test]
    fn bug_cases_keep_the_literal_placeholder() {
        let specs = specs();
        let bug = specs
            .iter()
            .find(|s| s.name == "test_10_get_todo_projects_bug")
            .unwrap();
        assert!(bug.endpoint.contains("{id}"));
        assert!(bug.id_replacements.is_empty());
    }
}
