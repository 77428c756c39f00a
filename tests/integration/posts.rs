use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use sorrel::entity::{blog, comment};

use crate::common::{PNG_BYTES, TestApp, routes};

mod listing {
    use super::*;

    #[tokio::test]
    async fn pages_hold_at_most_two_posts_newest_first() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        app.create_post("First post", "body", "").await;
        app.create_post("Second post", "body", "").await;
        app.create_post("Third post", "body", "").await;

        let page1 = app.get("/?page=1").await;
        assert_eq!(page1.status, 200);
        assert!(page1.text.contains("Third post"));
        assert!(page1.text.contains("Second post"));
        assert!(!page1.text.contains("First post"));

        let page2 = app.get("/?page=2").await;
        assert!(page2.text.contains("First post"));
        assert!(!page2.text.contains("Third post"));
    }

    #[tokio::test]
    async fn out_of_range_page_clamps_to_the_last_page() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        app.create_post("Only post", "body", "").await;

        let res = app.get("/?page=99").await;
        assert_eq!(res.status, 200);
        assert!(res.text.contains("Only post"));
    }

    #[tokio::test]
    async fn search_matches_title_or_content_case_insensitively() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        app.create_post("Growing Tomatoes", "in the garden", "").await;
        app.create_post("Sourdough notes", "hydration levels", "").await;

        let res = app.get("/?search=tomatoes").await;
        assert!(res.text.contains("Growing Tomatoes"));
        assert!(!res.text.contains("Sourdough notes"));

        let res = app.get("/?search=HYDRATION").await;
        assert!(res.text.contains("Sourdough notes"));
        assert!(!res.text.contains("Growing Tomatoes"));
    }

    #[tokio::test]
    async fn search_treats_like_wildcards_literally() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        app.create_post("Discounts", "100% real content", "").await;
        app.create_post("Other", "nothing here", "").await;

        let res = app.get("/?search=100%25%20real").await;
        assert!(res.text.contains("Discounts"));
        assert!(!res.text.contains("Other"));

        // A bare "%" must not match everything.
        let res = app.get("/?search=%25zzz").await;
        assert!(!res.text.contains("Discounts"));
        assert!(!res.text.contains("Other"));
    }

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::HOME).await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location.as_deref(), Some(routes::LOGIN));
    }
}

mod create {
    use super::*;

    #[tokio::test]
    async fn create_stores_the_post_with_its_image() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;

        let id = app.create_post("Hello world", "The very first post.", "").await;

        let post = blog::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.title, "Hello world");
        assert!(post.image.starts_with("blog-images/"));
        assert!(app.media.path().join(&post.image).exists());
    }

    #[tokio::test]
    async fn create_without_an_image_is_rejected() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;

        let res = app
            .post_multipart(
                routes::CREATE_BLOG,
                &[("title", "No image"), ("content", "body"), ("tags", "")],
                None,
            )
            .await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location.as_deref(), Some(routes::CREATE_BLOG));

        assert_eq!(blog::Entity::find().count(&app.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_with_a_non_image_upload_is_rejected() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;

        let res = app
            .post_multipart(
                routes::CREATE_BLOG,
                &[("title", "Bad upload"), ("content", "body"), ("tags", "")],
                Some(("script.sh", b"#!/bin/sh".to_vec())),
            )
            .await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location.as_deref(), Some(routes::CREATE_BLOG));

        assert_eq!(blog::Entity::find().count(&app.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;

        let res = app
            .post_multipart(
                routes::CREATE_BLOG,
                &[("title", "   "), ("content", "body"), ("tags", "")],
                Some(("photo.png", PNG_BYTES.to_vec())),
            )
            .await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location.as_deref(), Some(routes::CREATE_BLOG));
        assert_eq!(blog::Entity::find().count(&app.db).await.unwrap(), 0);
    }
}

mod detail {
    use super::*;

    #[tokio::test]
    async fn shows_the_post_and_its_author() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        let id = app.create_post("A day out", "We went hiking.", "").await;

        let res = app.get(&routes::post(id)).await;
        assert_eq!(res.status, 200);
        assert!(res.text.contains("A day out"));
        assert!(res.text.contains("We went hiking."));
        assert!(res.text.contains("alice"));
    }

    #[tokio::test]
    async fn unknown_post_id_renders_404() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;

        let res = app.get(&routes::post(4242)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn last_post_shows_the_newest_post() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        app.create_post("Older", "body", "").await;
        app.create_post("Newest", "body", "").await;

        let res = app.get(routes::LAST_POST).await;
        assert_eq!(res.status, 200);
        assert!(res.text.contains("Newest"));
        assert!(!res.text.contains("Older"));
    }

    #[tokio::test]
    async fn last_post_renders_404_when_there_are_no_posts() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;

        let res = app.get(routes::LAST_POST).await;
        assert_eq!(res.status, 404);
    }
}

mod edit {
    use super::*;

    #[tokio::test]
    async fn author_can_edit_their_post() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        let id = app.create_post("Draft title", "Draft body", "rust").await;

        let res = app
            .post_multipart(
                &routes::edit_post(id),
                &[
                    ("title", "Final title"),
                    ("content", "Final body"),
                    ("tags", "rust, web"),
                ],
                None,
            )
            .await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location.as_deref(), Some("/"));

        let post = blog::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.title, "Final title");
        assert_eq!(post.content, "Final body");
    }

    #[tokio::test]
    async fn non_author_edit_is_rejected_and_leaves_the_post_unchanged() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        let id = app.create_post("Untouched", "original", "").await;
        app.logout().await;

        app.register("mallory", "securepass").await;

        let page = app.get(&routes::edit_post(id)).await;
        assert_eq!(page.status, 303);
        assert_eq!(page.location.as_deref(), Some("/"));

        let res = app
            .post_multipart(
                &routes::edit_post(id),
                &[("title", "Hijacked"), ("content", "changed"), ("tags", "")],
                None,
            )
            .await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location.as_deref(), Some("/"));

        let post = blog::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.title, "Untouched");
        assert_eq!(post.content, "original");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn deleting_a_post_cascades_to_its_comments() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        let id = app.create_post("Doomed", "body", "tagged").await;
        app.add_comment(id, "first!").await;
        app.add_comment(id, "second!").await;

        let res = app.get(&routes::delete_blog(id)).await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location.as_deref(), Some("/"));

        assert!(
            blog::Entity::find_by_id(id)
                .one(&app.db)
                .await
                .unwrap()
                .is_none()
        );
        let remaining = comment::Entity::find()
            .filter(comment::Column::BlogId.eq(id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn non_author_cannot_delete_a_post() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;
        let id = app.create_post("Protected", "body", "").await;
        app.logout().await;

        app.register("mallory", "securepass").await;
        let res = app.get(&routes::delete_blog(id)).await;
        assert_eq!(res.status, 303);
        assert_eq!(res.location.as_deref(), Some("/"));

        assert!(
            blog::Entity::find_by_id(id)
                .one(&app.db)
                .await
                .unwrap()
                .is_some()
        );
    }
}
