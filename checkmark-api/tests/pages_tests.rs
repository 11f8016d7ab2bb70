/// Integration tests for the server-rendered pages
///
/// Browser-style flows: urlencoded forms, redirects and the session cookie.

mod common;

use axum::http::StatusCode;
use common::{body_string, location, session_cookie, TestContext};
use uuid::Uuid;

const SIGNUP_FORM: &str = "email=ada%40example.com&password=secret1&display_name=Ada";
const LOGIN_FORM: &str = "email=ada%40example.com&password=secret1";

/// Signs up and logs in through the forms, returning the cookie
async fn browser_login(ctx: &TestContext) -> String {
    let response = ctx.form("/signup", None, SIGNUP_FORM).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = ctx.form("/login", None, LOGIN_FORM).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/tasks");
    session_cookie(response.headers()).unwrap()
}

#[tokio::test]
async fn test_anonymous_redirected_to_login() {
    let ctx = TestContext::new();

    for uri in ["/tasks", "/tasks/new"] {
        let response = ctx.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    let response = ctx.get("/", None).await;
    assert_eq!(location(&response), "/tasks");
}

#[tokio::test]
async fn test_public_forms_render() {
    let ctx = TestContext::new();

    for uri in ["/signup", "/login"] {
        let response = ctx.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("<form"));
    }
}

#[tokio::test]
async fn test_signup_login_shows_empty_list() {
    let ctx = TestContext::new();
    let cookie = browser_login(&ctx).await;

    let response = ctx.get("/tasks", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Ada"));
    assert!(body.contains("Nothing to do."));
}

#[tokio::test]
async fn test_signup_errors_rerender_form() {
    let ctx = TestContext::new();

    let response = ctx
        .form("/signup", None, "email=bad&password=123&display_name=Ada")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_string(response).await;
    assert!(body.contains("Invalid email format"));
    assert!(body.contains("Password must be at least 6 characters"));

    ctx.form("/signup", None, SIGNUP_FORM).await;
    let response = ctx.form("/signup", None, SIGNUP_FORM).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_string(response).await;
    assert!(body.contains("An account with this email already exists"));
}

#[tokio::test]
async fn test_signup_missing_field_rerenders_form() {
    let ctx = TestContext::new();

    let response = ctx
        .form("/signup", None, "email=a%40x.com&password=secret1")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_string(response).await;
    assert!(body.contains("Display name must be 1 to 100 characters"));
    assert!(body.contains("a@x.com"));

    let response = ctx.form("/login", None, "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.contains("Invalid email or password"));
}

#[tokio::test]
async fn test_bad_login_rerenders_form() {
    let ctx = TestContext::new();
    ctx.form("/signup", None, SIGNUP_FORM).await;

    let response = ctx
        .form("/login", None, "email=ada%40example.com&password=wrong12")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(response.headers()).is_none());

    let body = body_string(response).await;
    assert!(body.contains("Invalid email or password"));
    assert!(body.contains("ada@example.com"));
    assert!(!body.contains("wrong12"));
}

#[tokio::test]
async fn test_task_form_lifecycle() {
    let ctx = TestContext::new();
    let cookie = browser_login(&ctx).await;
    let user_id = ctx.current_user(&cookie).await;

    let response = ctx.get("/tasks/new", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .form("/tasks/new", Some(&cookie), "title=buy+milk&description=")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/tasks");

    let tasks = ctx.state.tasks.list_all(user_id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description, None);
    let id = tasks[0].id;

    let body = body_string(ctx.get("/tasks", Some(&cookie)).await).await;
    assert!(body.contains("buy milk"));

    let edit_uri = format!("/tasks/{}/edit", id);
    let body = body_string(ctx.get(&edit_uri, Some(&cookie)).await).await;
    assert!(body.contains("value=\"buy milk\""));

    let response = ctx
        .form(
            &edit_uri,
            Some(&cookie),
            "title=buy+oat+milk&description=2+litres&done=on",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let task = ctx.state.tasks.get_by_id(id, user_id).await.unwrap();
    assert_eq!(task.title, "buy oat milk");
    assert_eq!(task.description.as_deref(), Some("2 litres"));
    assert!(task.done);

    let response = ctx
        .form(&format!("/tasks/{}/toggle", id), Some(&cookie), "")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(!ctx.state.tasks.get_by_id(id, user_id).await.unwrap().done);

    let response = ctx
        .form(&format!("/tasks/{}/delete", id), Some(&cookie), "")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(ctx.state.tasks.list_all(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_title_rerenders_form() {
    let ctx = TestContext::new();
    let cookie = browser_login(&ctx).await;

    let response = ctx
        .form("/tasks/new", Some(&cookie), "title=+++&description=keep+me")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_string(response).await;
    assert!(body.contains("Title must be 1 to 255 characters"));
    assert!(body.contains("keep me"));
}

#[tokio::test]
async fn test_foreign_task_shows_not_found_page() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com", "Alice").await;
    let bob = browser_login(&ctx).await;

    let id = ctx.create_task(&alice, "alice's secret").await;

    let response = ctx.get(&format!("/tasks/{}/edit", id), Some(&bob)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_string(response).await;
    assert!(body.contains("Task not found"));
    assert!(!body.contains("secret"));

    for action in ["toggle", "delete", "edit"] {
        let response = ctx
            .form(&format!("/tasks/{}/{}", id, action), Some(&bob), "title=mine")
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let owner = ctx.current_user(&alice).await;
    let task = ctx.state.tasks.get_by_id(id, owner).await.unwrap();
    assert_eq!(task.title, "alice's secret");
    assert!(!task.done);
}

#[tokio::test]
async fn test_missing_task_pages_not_found() {
    let ctx = TestContext::new();
    let cookie = browser_login(&ctx).await;

    for uri in [
        format!("/tasks/{}/edit", Uuid::new_v4()),
        "/tasks/not-a-uuid/edit".to_string(),
    ] {
        let response = ctx.get(&uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_logout_ends_page_session() {
    let ctx = TestContext::new();
    let cookie = browser_login(&ctx).await;

    let response = ctx.form("/logout", Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = ctx.get("/tasks", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}
