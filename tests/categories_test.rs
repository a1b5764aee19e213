//! Integration tests for category routes.

mod common;

use common::TestHarness;
use serde_json::{json, Value};

#[tokio::test]
async fn create_and_list_categories() {
    let h = TestHarness::start().await;
    let dessert = h.create_category("Dessert").await;
    let soup = h.create_category("Soup").await;

    let resp = h.get("/api/v1/categories").await;
    assert_eq!(resp.status(), 200);
    let list: Vec<Value> = resp.json().await.unwrap();
    let ids: Vec<i64> = list.iter().map(|c| c["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![dessert, soup]);
}

#[tokio::test]
async fn duplicate_category_is_409() {
    let h = TestHarness::start().await;
    h.create_category("Dessert").await;

    let resp = h
        .post_json("/api/v1/categories", &json!({ "name": "Dessert" }))
        .await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn blank_category_is_400() {
    let h = TestHarness::start().await;
    let resp = h
        .post_json("/api/v1/categories", &json!({ "name": "  " }))
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn recipe_links_category_by_id_or_object() {
    let h = TestHarness::start().await;
    let dessert = h.create_category("Dessert").await;
    let quick = h.create_category("Quick").await;

    let resp = h
        .post_json(
            "/api/v1/recipes",
            &json!({
                "title": "Fruit salad",
                "categories": [dessert, { "name": "Quick" }, { "id": quick }]
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.unwrap();
    let names: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Dessert", "Quick"]);
}

#[tokio::test]
async fn recipe_links_category_by_capitalised_id() {
    let h = TestHarness::start().await;
    let dessert = h.create_category("Dessert").await;

    let resp = h
        .post_json(
            "/api/v1/recipes",
            &json!({ "title": "Flan", "categories": [{ "ID": dessert }] }),
        )
        .await;
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["categories"][0]["id"], dessert);
}
