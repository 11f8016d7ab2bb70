/// End-to-end service scenario over the in-memory repository
///
/// Signup, failed and successful login, then the full life of one task.

use checkmark_shared::auth::password::{Argon2Hasher, PasswordParams};
use checkmark_shared::repository::MemoryRepository;
use checkmark_shared::services::{
    AuthError, AuthService, LoginInput, SignupInput, TaskError, TaskInput, TaskService,
};
use std::sync::Arc;

fn services() -> (AuthService, TaskService) {
    let repo = Arc::new(MemoryRepository::new());
    let hasher = Arc::new(Argon2Hasher::new(PasswordParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }));

    (
        AuthService::new(repo.clone(), hasher),
        TaskService::new(repo.clone(), repo),
    )
}

fn login(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_signup_login_task_lifecycle() {
    let (auth, tasks) = services();

    auth.signup(SignupInput {
        email: "a@x.com".to_string(),
        password: "pw123456".to_string(),
        display_name: "A".to_string(),
    })
    .await
    .unwrap();

    let err = auth.login(login("a@x.com", "wrongpw")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let user = auth.login(login("a@x.com", "pw123456")).await.unwrap();

    let task = tasks
        .create(user.id, TaskInput::titled("buy milk"))
        .await
        .unwrap();
    assert!(!task.done);

    let toggled = tasks.toggle(task.id, user.id).await.unwrap();
    assert!(toggled.done);

    tasks.delete(task.id, user.id).await.unwrap();
    let err = tasks.get_by_id(task.id, user.id).await.unwrap_err();
    assert!(matches!(err, TaskError::TaskNotFound));
}

#[tokio::test]
async fn test_second_signup_with_same_email_fails() {
    let (auth, _) = services();

    for email in ["one@x.com", "two@x.com", "three@x.com"] {
        let input = SignupInput {
            email: email.to_string(),
            password: "pw123456".to_string(),
            display_name: "Someone".to_string(),
        };

        auth.signup(input.clone()).await.unwrap();
        let err = auth.signup(input).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }
}

#[tokio::test]
async fn test_tasks_isolated_between_users() {
    let (auth, tasks) = services();
    let mut ids = Vec::new();
    for email in ["alice@x.com", "bob@x.com"] {
        let user = auth
            .signup(SignupInput {
                email: email.to_string(),
                password: "pw123456".to_string(),
                display_name: email.to_string(),
            })
            .await
            .unwrap();
        ids.push(user.id);
    }
    let (alice, bob) = (ids[0], ids[1]);

    let task = tasks.create(alice, TaskInput::titled("secret")).await.unwrap();

    assert!(tasks.list_all(bob).await.unwrap().is_empty());
    assert!(matches!(
        tasks.get_by_id(task.id, bob).await,
        Err(TaskError::TaskNotFound)
    ));
    assert!(matches!(
        tasks.update(task.id, bob, TaskInput::titled("mine now")).await,
        Err(TaskError::TaskNotFound)
    ));
    assert!(matches!(
        tasks.delete(task.id, bob).await,
        Err(TaskError::TaskNotFound)
    ));
    assert_eq!(tasks.list_all(alice).await.unwrap().len(), 1);
}
