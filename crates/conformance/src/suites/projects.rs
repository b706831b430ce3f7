//! Method sweep over the /projects surface: success shapes, the 404/405
//! contract, OPTIONS/HEAD everywhere, XML accept variants, and malformed
//! payload rejection.
//!
//! Cases that need an id beyond the default project create their own object
//! in setup so they hold on a clean server regardless of execution order.

use serde_json::json;

use crate::spec::{IdSource, Method, ResourceKind, TestSpec};

fn project_payload() -> serde_json::Value {
    json!({"title": "New Project", "description": "Example project description"})
}

fn todo_payload() -> serde_json::Value {
    json!({"title": "Title", "doneStatus": false, "description": "description"})
}

pub fn specs() -> Vec<TestSpec> {
    vec![
        // /projects
        TestSpec::new("projects_get_all", Method::Get, "/projects")
            .expect_body(json!({"title": "Office Work"})),
        TestSpec::new("projects_get_all_xml", Method::Get, "/projects")
            .xml()
            .expect_body(json!({"title": "Office Work"})),
        TestSpec::new("projects_create", Method::Post, "/projects")
            .body(project_payload())
            .expect_status(&[201])
            .expect_body(json!({"title": "New Project"})),
        TestSpec::new("projects_create_unknown_field", Method::Post, "/projects")
            .describe("The server names the offending field in its 400 response")
            .body(json!({"invalidField": 10000}))
            .expect_status(&[400])
            .expect_body(json!({"errorMessages": ["Could not find field: invalidField"]})),
        TestSpec::new("projects_create_malformed_xml", Method::Post, "/projects")
            .xml()
            .raw_body("<project><invalidField>10000</invalidField></project>")
            .expect_status(&[400])
            .tolerate_non_json(),
        TestSpec::new("projects_put_collection_not_allowed", Method::Put, "/projects")
            .body(project_payload())
            .expect_status(&[405]),
        TestSpec::new("projects_delete_collection_not_allowed", Method::Delete, "/projects")
            .expect_status(&[405]),
        TestSpec::new("projects_options", Method::Options, "/projects"),
        TestSpec::new("projects_head", Method::Head, "/projects").check_headers(),
        // /projects/{id}
        TestSpec::new("project_get_default", Method::Get, "/projects/1")
            .expect_body(json!({"id": "1", "title": "Office Work"})),
        TestSpec::new("project_get_default_xml", Method::Get, "/projects/1")
            .xml()
            .expect_body(json!({"title": "Office Work"})),
        TestSpec::new("project_get_missing", Method::Get, "/projects/99").expect_status(&[404]),
        TestSpec::new("project_amend_post", Method::Post, "/projects/{id}")
            .replace("{id}", IdSource::Fallback)
            .body(json!({"description": "Updated"}))
            .expect_body(json!({"id": "1", "description": "Updated"})),
        TestSpec::new("project_replace_put", Method::Put, "/projects/{id}")
            .setup(ResourceKind::Project, project_payload())
            .replace("{id}", IdSource::Setup(ResourceKind::Project))
            .body(json!({"title": "Replaced", "description": "Replaced body"}))
            .expect_body(json!({"title": "Replaced"})),
        TestSpec::new("project_delete", Method::Delete, "/projects/{id}")
            .setup(ResourceKind::Project, project_payload())
            .replace("{id}", IdSource::Setup(ResourceKind::Project)),
        TestSpec::new("project_patch_not_allowed", Method::Patch, "/projects/1")
            .body(json!({"title": "Patched"}))
            .expect_status(&[405]),
        TestSpec::new("project_options", Method::Options, "/projects/1"),
        TestSpec::new("project_head", Method::Head, "/projects/1").check_headers(),
        // /projects/{id}/tasks
        TestSpec::new("project_tasks_get", Method::Get, "/projects/1/tasks")
            .describe("Office Work owns both default todos")
            .expect_body(json!({"todos": [{"id": "1"}, {"id": "2"}]})),
        TestSpec::new("project_tasks_add", Method::Post, "/projects/1/tasks")
            .body(todo_payload())
            .expect_status(&[201]),
        TestSpec::new("project_tasks_put_not_allowed", Method::Put, "/projects/1/tasks")
            .body(todo_payload())
            .expect_status(&[405]),
        TestSpec::new("project_tasks_delete_not_allowed", Method::Delete, "/projects/1/tasks")
            .expect_status(&[405]),
        TestSpec::new("project_tasks_patch_not_allowed", Method::Patch, "/projects/1/tasks")
            .expect_status(&[405]),
        TestSpec::new("project_tasks_options", Method::Options, "/projects/1/tasks"),
        TestSpec::new("project_tasks_head", Method::Head, "/projects/1/tasks").check_headers(),
        // /projects/{id}/tasks/{todoId} - instances are delete-only
        TestSpec::new("project_task_get_not_found", Method::Get, "/projects/1/tasks/1")
            .expect_status(&[404]),
        TestSpec::new("project_task_post_not_found", Method::Post, "/projects/1/tasks/1")
            .body(todo_payload())
            .expect_status(&[404]),
        TestSpec::new("project_task_unlink", Method::Delete, "/projects/1/tasks/1"),
        TestSpec::new("project_task_put_not_allowed", Method::Put, "/projects/1/tasks/1")
            .body(todo_payload())
            .expect_status(&[405]),
        TestSpec::new("project_task_patch_not_allowed", Method::Patch, "/projects/1/tasks/1")
            .expect_status(&[405]),
        TestSpec::new("project_task_options", Method::Options, "/projects/1/tasks/1"),
        TestSpec::new("project_task_head_not_found", Method::Head, "/projects/1/tasks/1")
            .expect_status(&[404]),
        // /projects/{id}/categories
        TestSpec::new("project_categories_get", Method::Get, "/projects/1/categories"),
        TestSpec::new("project_categories_link", Method::Post, "/projects/1/categories")
            .body(json!({"id": "1"}))
            .expect_status(&[201]),
        TestSpec::new("project_categories_put_not_allowed", Method::Put, "/projects/1/categories")
            .body(json!({"id": "1"}))
            .expect_status(&[405]),
        TestSpec::new(
            "project_categories_delete_not_allowed",
            Method::Delete,
            "/projects/1/categories",
        )
        .expect_status(&[405]),
        TestSpec::new(
            "project_categories_patch_not_allowed",
            Method::Patch,
            "/projects/1/categories",
        )
        .expect_status(&[405]),
        TestSpec::new("project_categories_options", Method::Options, "/projects/1/categories"),
        TestSpec::new("project_categories_head", Method::Head, "/projects/1/categories")
            .check_headers(),
        // /projects/{id}/categories/{catId}
        TestSpec::new("project_category_get_not_found", Method::Get, "/projects/1/categories/1")
            .expect_status(&[404]),
        TestSpec::new("project_category_post_not_found", Method::Post, "/projects/1/categories/1")
            .body(json!({"id": "1"}))
            .expect_status(&[404]),
        TestSpec::new("project_category_put_not_allowed", Method::Put, "/projects/1/categories/1")
            .body(json!({"id": "1"}))
            .expect_status(&[405]),
        TestSpec::new("project_category_unlink", Method::Delete, "/projects/1/categories/1")
            .describe("200 when the link case already ran, 404 from a clean state")
            .expect_status(&[200, 404]),
        TestSpec::new(
            "project_category_patch_not_allowed",
            Method::Patch,
            "/projects/1/categories/1",
        )
        .expect_status(&[405]),
        TestSpec::new("project_category_options", Method::Options, "/projects/1/categories/1"),
        TestSpec::new("project_category_head_not_found", Method::Head, "/projects/1/categories/1")
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
