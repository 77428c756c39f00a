use sea_orm::{EntityTrait, PaginatorTrait};

use sorrel::entity::tag;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn tag_page_lists_only_posts_carrying_that_tag() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;
    app.create_post("Rust tricks", "body", "rust, programming").await;
    app.create_post("Bread recipe", "body", "cooking").await;

    let res = app.get(&routes::tag("rust")).await;
    assert_eq!(res.status, 200);
    assert!(res.text.contains("Rust tricks"));
    assert!(!res.text.contains("Bread recipe"));
}

#[tokio::test]
async fn unknown_tag_slug_renders_404() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;

    let res = app.get(&routes::tag("nope")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn tag_names_are_deduplicated_by_slug() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;
    app.create_post("One", "body", "Rust").await;
    app.create_post("Two", "body", "rust").await;

    // Both spellings resolve to one tag row.
    assert_eq!(tag::Entity::find().count(&app.db).await.unwrap(), 1);

    let res = app.get(&routes::tag("rust")).await;
    assert!(res.text.contains("One"));
    assert!(res.text.contains("Two"));
}

#[tokio::test]
async fn multi_word_tags_get_hyphenated_slugs() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;
    app.create_post("Piece", "body", "Web Development").await;

    let res = app.get(&routes::tag("web-development")).await;
    assert_eq!(res.status, 200);
    assert!(res.text.contains("Piece"));
}

#[tokio::test]
async fn editing_replaces_the_tag_set() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;
    let id = app.create_post("Retagged", "body", "old-tag").await;

    let res = app
        .post_multipart(
            &routes::edit_post(id),
            &[("title", "Retagged"), ("content", "body"), ("tags", "fresh")],
            None,
        )
        .await;
    assert_eq!(res.status, 303);

    let res = app.get(&routes::tag("fresh")).await;
    assert!(res.text.contains("Retagged"));

    // The old link is gone even though the tag row may remain.
    let res = app.get(&routes::tag("old-tag")).await;
    assert!(!res.text.contains("Retagged"));
}

#[tokio::test]
async fn related_posts_share_at_least_one_tag() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;
    let main = app.create_post("Main article", "body", "rust, web").await;
    app.create_post("Also rust", "body", "rust").await;
    app.create_post("Unrelated", "body", "gardening").await;

    let res = app.get(&routes::post(main)).await;
    assert_eq!(res.status, 200);
    assert!(res.text.contains("Also rust"));
    assert!(!res.text.contains("Unrelated"));
}

#[tokio::test]
async fn related_posts_are_deduplicated_across_shared_tags() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;
    let main = app.create_post("Hub", "body", "rust, web").await;
    app.create_post("Twin", "body", "rust, web").await;

    let res = app.get(&routes::post(main)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.text.matches("Twin").count(), 1);
}
