mod common;

use common::{STUDENT_ID, module_ids, spawn_app, token_for};
use lms::models::user::Role;
use serde_json::{Value, json};

#[tokio::test]
async fn health_check_is_public() {
    let app = spawn_app().await;

    let resp = app
        .client
        .get(format!("{}/api/health", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn curriculum_requires_a_valid_token() {
    let app = spawn_app().await;

    let missing = app
        .client
        .get(app.url("/curriculum"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 401);

    let forged = app.get("not-a-jwt", "/curriculum").await;
    assert_eq!(forged.status().as_u16(), 401);

    let ok = app.get(&app.student_token, "/curriculum").await;
    assert_eq!(ok.status().as_u16(), 200);
}

#[tokio::test]
async fn students_cannot_author_content() {
    let app = spawn_app().await;
    let (phase_id, section_id, ids) = app.seed_section(&["Intro"]).await;

    let create = app
        .post(&app.student_token, "/phases", json!({ "title": "Sneaky" }))
        .await;
    assert_eq!(create.status().as_u16(), 403);

    let edit = app
        .put(
            &app.student_token,
            &format!("/modules/{}", ids[0]),
            json!({ "title": "Renamed", "content_type": "markdown" }),
        )
        .await;
    assert_eq!(edit.status().as_u16(), 403);

    let reorder = app
        .post(
            &app.student_token,
            &format!("/phases/{}/sections/reorder", phase_id),
            json!({ "moved_id": section_id, "from_index": 0, "to_index": 0 }),
        )
        .await;
    assert_eq!(reorder.status().as_u16(), 403);

    let dashboard = app.get(&app.student_token, "/dashboard/instructor").await;
    assert_eq!(dashboard.status().as_u16(), 403);
}

#[tokio::test]
async fn created_entities_are_appended_in_order() {
    let app = spawn_app().await;

    let first = app.create_phase("Phase One").await;
    let second = app.create_phase("Phase Two").await;

    let resp = app.get(&app.instructor_token, "/curriculum").await;
    let body: Value = resp.json().await.unwrap();
    let phases = body["phases"].as_array().unwrap();
    assert_eq!(phases.len(), 2);
    assert_eq!(phases[0]["id"].as_i64().unwrap(), first);
    assert_eq!(phases[0]["phase_order"], 1);
    assert_eq!(phases[1]["id"].as_i64().unwrap(), second);
    assert_eq!(phases[1]["phase_order"], 2);

    let section_id = app.create_section(first, "Setup").await;
    let a = app.create_module(section_id, json!({ "title": "  Tools  " })).await;
    let b = app
        .create_module(
            section_id,
            json!({
                "title": "Reading",
                "content_type": "external_link",
                "external_url": "https://doc.rust-lang.org/book/"
            }),
        )
        .await;

    assert_eq!(a["module_order"], 1);
    assert_eq!(a["title"], "Tools");
    assert_eq!(a["content_type"], "markdown");
    assert_eq!(a["is_published"], true);
    assert!(!a["content"].as_str().unwrap().is_empty());

    assert_eq!(b["module_order"], 2);
    assert_eq!(b["content"], "");
    assert_eq!(b["external_url"], "https://doc.rust-lang.org/book/");
}

#[tokio::test]
async fn external_link_modules_need_a_valid_url() {
    let app = spawn_app().await;
    let (_, section_id, _) = app.seed_section(&[]).await;
    let path = format!("/sections/{}/modules", section_id);

    let missing = app
        .post(
            &app.instructor_token,
            &path,
            json!({ "title": "Link", "content_type": "external_link", "external_url": "   " }),
        )
        .await;
    assert_eq!(missing.status().as_u16(), 400);

    let malformed = app
        .post(
            &app.instructor_token,
            &path,
            json!({ "title": "Link", "content_type": "external_link", "external_url": "not a url" }),
        )
        .await;
    assert_eq!(malformed.status().as_u16(), 400);

    let empty_title = app
        .post(&app.instructor_token, &path, json!({ "title": "" }))
        .await;
    assert_eq!(empty_title.status().as_u16(), 400);

    let orphan = app
        .post(&app.instructor_token, "/sections/9999/modules", json!({ "title": "Lost" }))
        .await;
    assert_eq!(orphan.status().as_u16(), 404);
}

#[tokio::test]
async fn moving_last_module_to_front_renumbers_siblings() {
    let app = spawn_app().await;
    let (_, section_id, ids) = app.seed_section(&["M1", "M2", "M3"]).await;

    let resp = app
        .post(
            &app.instructor_token,
            &format!("/sections/{}/modules/reorder", section_id),
            json!({ "moved_id": ids[2], "from_index": 2, "to_index": 0 }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let reordered: Vec<Value> = resp.json().await.unwrap();
    let titles: Vec<&str> = reordered.iter().map(|m| m["title"].as_str().unwrap()).collect();
    let orders: Vec<i64> = reordered.iter().map(|m| m["module_order"].as_i64().unwrap()).collect();
    assert_eq!(titles, vec!["M3", "M1", "M2"]);
    assert_eq!(orders, vec![1, 2, 3]);

    let tree: Value = app
        .get(&app.student_token, "/curriculum")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(module_ids(&tree), vec![ids[2], ids[0], ids[1]]);
}

#[tokio::test]
async fn reorder_from_a_stale_view_is_rejected() {
    let app = spawn_app().await;
    let (_, section_id, ids) = app.seed_section(&["M1", "M2", "M3"]).await;
    let path = format!("/sections/{}/modules/reorder", section_id);

    // Client thinks M1 sits at index 1
    let stale = app
        .post(
            &app.instructor_token,
            &path,
            json!({ "moved_id": ids[0], "from_index": 1, "to_index": 2 }),
        )
        .await;
    assert_eq!(stale.status().as_u16(), 409);

    let out_of_range = app
        .post(
            &app.instructor_token,
            &path,
            json!({ "moved_id": ids[0], "from_index": 0, "to_index": 7 }),
        )
        .await;
    assert_eq!(out_of_range.status().as_u16(), 400);

    let tree: Value = app
        .get(&app.instructor_token, "/curriculum")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(module_ids(&tree), ids);
}

#[tokio::test]
async fn phases_and_sections_can_be_reordered() {
    let app = spawn_app().await;
    let p1 = app.create_phase("P1").await;
    let p2 = app.create_phase("P2").await;
    let s1 = app.create_section(p1, "S1").await;
    let s2 = app.create_section(p1, "S2").await;

    let phases: Vec<Value> = app
        .post(
            &app.instructor_token,
            "/phases/reorder",
            json!({ "moved_id": p2, "from_index": 1, "to_index": 0 }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(phases[0]["id"].as_i64().unwrap(), p2);
    assert_eq!(phases[0]["phase_order"], 1);
    assert_eq!(phases[1]["phase_order"], 2);

    let sections: Vec<Value> = app
        .post(
            &app.instructor_token,
            &format!("/phases/{}/sections/reorder", p1),
            json!({ "moved_id": s1, "from_index": 0, "to_index": 1 }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(sections[0]["id"].as_i64().unwrap(), s2);
    assert_eq!(sections[1]["id"].as_i64().unwrap(), s1);
    assert_eq!(sections[1]["section_order"], 2);
}

#[tokio::test]
async fn deletion_requires_the_exact_title() {
    let app = spawn_app().await;
    let (phase_id, _, ids) = app.seed_section(&["Doomed"]).await;

    let toggled = app
        .post(&app.student_token, &format!("/modules/{}/progress", ids[0]), json!({}))
        .await;
    assert_eq!(toggled.status().as_u16(), 200);

    let wrong = app
        .delete(&app.instructor_token, &format!("/modules/{}", ids[0]), "doomed")
        .await;
    assert_eq!(wrong.status().as_u16(), 412);

    let still_there = app
        .get(&app.instructor_token, &format!("/modules/{}", ids[0]))
        .await;
    assert_eq!(still_there.status().as_u16(), 200);

    let phase_wrong = app
        .delete(&app.instructor_token, &format!("/phases/{}", phase_id), "")
        .await;
    assert_eq!(phase_wrong.status().as_u16(), 412);

    let phase_ok = app
        .delete(&app.instructor_token, &format!("/phases/{}", phase_id), " Foundations ")
        .await;
    assert_eq!(phase_ok.status().as_u16(), 204);

    let gone = app
        .get(&app.instructor_token, &format!("/modules/{}", ids[0]))
        .await;
    assert_eq!(gone.status().as_u16(), 404);

    let tree: Value = app
        .get(&app.student_token, "/curriculum")
        .await
        .json()
        .await
        .unwrap();
    assert!(tree["phases"].as_array().unwrap().is_empty());

    let dashboard: Value = app
        .get(&token_for(STUDENT_ID, Role::Student), "/dashboard/student")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["summary"]["total"], 0);
    assert_eq!(dashboard["summary"]["completed"], 0);
}

#[tokio::test]
async fn module_edits_replace_metadata_and_content() {
    let app = spawn_app().await;
    let (_, _, ids) = app.seed_section(&["Draft"]).await;
    let path = format!("/modules/{}", ids[0]);

    let updated: Value = app
        .put(
            &app.instructor_token,
            &path,
            json!({
                "title": "Final",
                "description": "Now with a link",
                "content_type": "text",
                "external_url": "https://example.com/notes",
                "is_published": false
            }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["content_type"], "text");
    assert_eq!(updated["is_published"], false);
    assert_eq!(updated["module_order"], 1);

    let content: Value = app
        .put(
            &app.instructor_token,
            &format!("{}/content", path),
            json!({ "content": "## Body" }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(content["content"], "## Body");
    assert_eq!(content["title"], "Final");

    let missing = app
        .put(
            &app.instructor_token,
            "/modules/9999/content",
            json!({ "content": "x" }),
        )
        .await;
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn whitespace_only_titles_are_rejected() {
    let app = spawn_app().await;
    let (phase_id, section_id, ids) = app.seed_section(&["Intro"]).await;

    let phase = app
        .post(&app.instructor_token, "/phases", json!({ "title": "   " }))
        .await;
    assert_eq!(phase.status().as_u16(), 400);

    let section = app
        .post(
            &app.instructor_token,
            &format!("/phases/{}/sections", phase_id),
            json!({ "title": "\t" }),
        )
        .await;
    assert_eq!(section.status().as_u16(), 400);

    let module = app
        .post(
            &app.instructor_token,
            &format!("/sections/{}/modules", section_id),
            json!({ "title": " \n " }),
        )
        .await;
    assert_eq!(module.status().as_u16(), 400);

    let phase_edit = app
        .put(
            &app.instructor_token,
            &format!("/phases/{}", phase_id),
            json!({ "title": "  " }),
        )
        .await;
    assert_eq!(phase_edit.status().as_u16(), 400);

    let section_edit = app
        .put(
            &app.instructor_token,
            &format!("/sections/{}", section_id),
            json!({ "title": "  " }),
        )
        .await;
    assert_eq!(section_edit.status().as_u16(), 400);

    let module_edit = app
        .put(
            &app.instructor_token,
            &format!("/modules/{}", ids[0]),
            json!({ "title": "  ", "content_type": "markdown" }),
        )
        .await;
    assert_eq!(module_edit.status().as_u16(), 400);

    // Nothing was stored or renamed, so every entity can still be deleted by title
    let tree: Value = app
        .get(&app.instructor_token, "/curriculum")
        .await
        .json()
        .await
        .unwrap();
    let phases = tree["phases"].as_array().unwrap();
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0]["title"], "Foundations");
    assert_eq!(phases[0]["sections"][0]["title"], "Basics");
    assert_eq!(module_ids(&tree), ids);

    let deleted = app
        .delete(&app.instructor_token, &format!("/phases/{}", phase_id), "Foundations")
        .await;
    assert_eq!(deleted.status().as_u16(), 204);
}
