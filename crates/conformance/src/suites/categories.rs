//! Method sweep over the /categories surface, mirroring the projects sweep:
//! the API exposes the same collection/item/relationship shape with /todos
//! and /projects sub-resources.

use serde_json::json;

use crate::spec::{IdSource, Method, ResourceKind, TestSpec};

fn category_payload() -> serde_json::Value {
    json!({"title": "Work", "description": "Tasks related to office work"})
}

pub fn specs() -> Vec<TestSpec> {
    vec![
        // /categories
        TestSpec::new("categories_get_all", Method::Get, "/categories")
            .expect_body(json!({"title": "Office"})),
        TestSpec::new("categories_get_all_xml", Method::Get, "/categories")
            .xml()
            .expect_body(json!({"title": "Office"})),
        TestSpec::new("categories_create", Method::Post, "/categories")
            .body(category_payload())
            .expect_status(&[201])
            .expect_body(json!({"title": "Work"})),
        TestSpec::new("categories_put_collection_not_allowed", Method::Put, "/categories")
            .body(category_payload())
            .expect_status(&[405]),
        TestSpec::new(
            "categories_delete_collection_not_allowed",
            Method::Delete,
            "/categories",
        )
        .expect_status(&[405]),
        TestSpec::new("categories_options", Method::Options, "/categories"),
        TestSpec::new("categories_head", Method::Head, "/categories").check_headers(),
        // /categories/{id}
        TestSpec::new("category_get_default", Method::Get, "/categories/1")
            .expect_body(json!({"id": "1", "title": "Office"})),
        TestSpec::new("category_get_default_xml", Method::Get, "/categories/1")
            .xml()
            .expect_body(json!({"title": "Office"})),
        TestSpec::new("category_get_missing", Method::Get, "/categories/99").expect_status(&[404]),
        TestSpec::new("category_amend_post", Method::Post, "/categories/{id}")
            .replace("{id}", IdSource::Fallback)
            .body(json!({"description": "Updated"}))
            .expect_body(json!({"id": "1", "description": "Updated"})),
        TestSpec::new("category_replace_put", Method::Put, "/categories/{id}")
            .setup(ResourceKind::Category, category_payload())
            .replace("{id}", IdSource::Setup(ResourceKind::Category))
            .body(json!({"title": "Replaced", "description": "Replaced body"}))
            .expect_body(json!({"title": "Replaced"})),
        TestSpec::new("category_delete", Method::Delete, "/categories/{id}")
            .setup(ResourceKind::Category, category_payload())
            .replace("{id}", IdSource::Setup(ResourceKind::Category)),
        TestSpec::new("category_patch_not_allowed", Method::Patch, "/categories/1")
            .body(json!({"title": "Patched"}))
            .expect_status(&[405]),
        TestSpec::new("category_options", Method::Options, "/categories/1"),
        TestSpec::new("category_head", Method::Head, "/categories/1").check_headers(),
        // /categories/{id}/todos
        TestSpec::new("category_todos_get", Method::Get, "/categories/1/todos")
            .describe("Office holds the default scan paperwork todo")
            .expect_body(json!({"todos": [{"id": "1"}]})),
        TestSpec::new("category_todos_link", Method::Post, "/categories/1/todos")
            .body(json!({"id": "2"}))
            .expect_status(&[201]),
        TestSpec::new("category_todos_put_not_allowed", Method::Put, "/categories/1/todos")
            .body(json!({"id": "2"}))
            .expect_status(&[405]),
        TestSpec::new("category_todos_delete_not_allowed", Method::Delete, "/categories/1/todos")
            .expect_status(&[405]),
        TestSpec::new("category_todos_patch_not_allowed", Method::Patch, "/categories/1/todos")
            .expect_status(&[405]),
        TestSpec::new("category_todos_options", Method::Options, "/categories/1/todos"),
        TestSpec::new("category_todos_head", Method::Head, "/categories/1/todos").check_headers(),
        // /categories/{id}/todos/{todoId}
        TestSpec::new("category_todo_get_not_found", Method::Get, "/categories/1/todos/1")
            .expect_status(&[404]),
        TestSpec::new("category_todo_unlink", Method::Delete, "/categories/1/todos/1"),
        TestSpec::new("category_todo_options", Method::Options, "/categories/1/todos/1"),
        TestSpec::new("category_todo_head_not_found", Method::Head, "/categories/1/todos/1")
            .expect_status(&[404]),
        // /categories/{id}/projects
        TestSpec::new("category_projects_get", Method::Get, "/categories/1/projects"),
        TestSpec::new("category_projects_link", Method::Post, "/categories/1/projects")
            .body(json!({"id": "1"}))
            .expect_status(&[201]),
        TestSpec::new("category_projects_options", Method::Options, "/categories/1/projects"),
        TestSpec::new("category_projects_head", Method::Head, "/categories/1/projects")
            .check_headers(),
        // /categories/{id}/projects/{projectId}
        TestSpec::new("category_project_unlink", Method::Delete, "/categories/1/projects/1")
            .describe("200 when the link case already ran, 404 from a clean state")
            .expect_status(&[200, 404]),
        TestSpec::new("category_project_options", Method::Options, "/categories/1/projects/1"),
        TestSpec::new(
            "category_project_head_not_found",
            Method::Head,
            "/categories/1/projects/1",
        )
        .expect_status(&[404]),
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
    fn case_names_are_unique() {
        let specs = specs();
        let mut names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), specs.len());
    }
}
