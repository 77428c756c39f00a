use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use sorrel::entity::profile;

use crate::common::{PNG_BYTES, TestApp, routes};

#[tokio::test]
async fn profile_page_shows_the_current_data() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;

    let res = app.get(routes::PROFILE).await;
    assert_eq!(res.status, 200);
    assert!(res.text.contains("alice"));
}

#[tokio::test]
async fn updating_changes_name_age_and_bio() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;

    let res = app
        .post_multipart(
            routes::PROFILE,
            &[
                ("name", "Alice Liddell"),
                ("age", "28"),
                ("bio", "Falls down rabbit holes."),
            ],
            None,
        )
        .await;
    assert_eq!(res.status, 303);
    assert_eq!(res.location.as_deref(), Some("/"));

    let alice = app.user_id("alice").await;
    let own = profile::Entity::find()
        .filter(profile::Column::UserId.eq(alice))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(own.name, "Alice Liddell");
    assert_eq!(own.age, 28);
    assert_eq!(own.bio, "Falls down rabbit holes.");
    assert!(own.image.is_none());
}

#[tokio::test]
async fn avatar_upload_is_stored_under_the_media_root() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;

    let res = app
        .post_multipart(
            routes::PROFILE,
            &[("name", "Alice"), ("age", "28"), ("bio", "")],
            Some(("me.png", PNG_BYTES.to_vec())),
        )
        .await;
    assert_eq!(res.status, 303);

    let alice = app.user_id("alice").await;
    let own = profile::Entity::find()
        .filter(profile::Column::UserId.eq(alice))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let image = own.image.expect("Avatar path not stored");
    assert!(image.starts_with("avatars/"));
    assert!(app.media.path().join(&image).exists());

    // Served back through the media route.
    let res = app.get(&format!("/media/{image}")).await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn invalid_age_is_rejected() {
    let app = TestApp::spawn().await;
    app.register("alice", "securepass").await;

    let res = app
        .post_multipart(
            routes::PROFILE,
            &[("name", "Alice"), ("age", "very old"), ("bio", "")],
            None,
        )
        .await;
    assert_eq!(res.status, 303);
    assert_eq!(res.location.as_deref(), Some(routes::PROFILE));

    let alice = app.user_id("alice").await;
    let own = profile::Entity::find()
        .filter(profile::Column::UserId.eq(alice))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    // Registration default left in place.
    assert_eq!(own.age, 0);
    assert_eq!(own.name, "alice");
}

#[tokio::test]
async fn requires_authentication() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::PROFILE).await;
    assert_eq!(res.status, 303);
    assert_eq!(res.location.as_deref(), Some(routes::LOGIN));
}
