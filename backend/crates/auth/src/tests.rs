//! Use-case and HTTP tests for the auth crate
//!
//! Everything runs against the in-process repository and cache.

#[cfg(test)]
mod fakes {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::domain::notifier::{Notifier, NotifyError};
    use crate::domain::value_object::{email::Email, user_name::UserName};

    /// Notifier that records every message and can be told to fail reset mail
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub welcomes: Mutex<Vec<String>>,
        pub resets: Mutex<Vec<(String, String)>>,
        pub fail_resets: AtomicBool,
    }

    impl RecordingNotifier {
        pub fn fail_resets(&self) {
            self.fail_resets.store(true, Ordering::SeqCst);
        }

        /// Plaintext token of the last reset link
        pub fn last_reset_token(&self) -> Option<String> {
            let resets = self.resets.lock().unwrap();
            let (_, url) = resets.last()?;
            url.split_once("token=").map(|(_, t)| t.to_string())
        }

        pub fn reset_count(&self) -> usize {
            self.resets.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        async fn send_welcome(&self, to: &Email, _user_name: &UserName) -> Result<(), NotifyError> {
            self.welcomes.lock().unwrap().push(to.as_str().to_string());
            Ok(())
        }

        async fn send_password_reset(&self, to: &Email, reset_url: &str) -> Result<(), NotifyError> {
            if self.fail_resets.load(Ordering::SeqCst) {
                return Err(NotifyError::Transport("connection refused".to_string()));
            }
            self.resets
                .lock()
                .unwrap()
                .push((to.as_str().to_string(), reset_url.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod interleaving {
    //! Fakes that run a second request in the middle of the first one

    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Utc};

    use crate::application::config::AuthConfig;
    use crate::application::{ChangePasswordInput, ChangePasswordUseCase};
    use crate::domain::entity::{
        credentials::{Credentials, LockoutPolicy},
        user::User,
    };
    use crate::domain::notifier::{Notifier, NotifyError};
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{
        email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
    };
    use crate::error::AuthResult;
    use crate::infra::memory::MemoryUserRepository;

    /// Deactivates a user the first time its credentials are read
    pub struct DeactivatingRepository {
        pub inner: Arc<MemoryUserRepository>,
        pub target: Mutex<Option<UserId>>,
    }

    impl DeactivatingRepository {
        pub fn new(inner: Arc<MemoryUserRepository>, target: UserId) -> Self {
            Self {
                inner,
                target: Mutex::new(Some(target)),
            }
        }
    }

    impl UserRepository for DeactivatingRepository {
        async fn create(&self, user: &User, credentials: &Credentials) -> AuthResult<()> {
            self.inner.create(user, credentials).await
        }

        async fn count(&self) -> AuthResult<u64> {
            self.inner.count().await
        }

        async fn exists_by_email_or_user_name(
            &self,
            email: &Email,
            user_name: &UserName,
        ) -> AuthResult<bool> {
            self.inner.exists_by_email_or_user_name(email, user_name).await
        }

        async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
            self.inner.find_by_id(user_id).await
        }

        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
            self.inner.find_by_email(email).await
        }

        async fn find_by_reset_token(
            &self,
            token_hash: &str,
            now: DateTime<Utc>,
        ) -> AuthResult<Option<User>> {
            self.inner.find_by_reset_token(token_hash, now).await
        }

        async fn find_credentials(&self, user_id: &UserId) -> AuthResult<Option<Credentials>> {
            let target = self.target.lock().unwrap().take();
            if let Some(target) = target {
                if let Some(mut user) = self.inner.find_by_id(&target).await? {
                    user.set_active(false);
                    self.inner.update(&user).await?;
                }
            }
            self.inner.find_credentials(user_id).await
        }

        async fn list(&self) -> AuthResult<Vec<User>> {
            self.inner.list().await
        }

        async fn update(&self, user: &User) -> AuthResult<()> {
            self.inner.update(user).await
        }

        async fn record_login(&self, user_id: &UserId, now: DateTime<Utc>) -> AuthResult<()> {
            self.inner.record_login(user_id, now).await
        }

        async fn update_password(
            &self,
            user_id: &UserId,
            password_hash: &UserPassword,
            now: DateTime<Utc>,
        ) -> AuthResult<()> {
            self.inner.update_password(user_id, password_hash, now).await
        }

        async fn set_reset_token(
            &self,
            user_id: &UserId,
            token_hash: &str,
            expires_at: DateTime<Utc>,
        ) -> AuthResult<()> {
            self.inner.set_reset_token(user_id, token_hash, expires_at).await
        }

        async fn clear_reset_token(&self, user_id: &UserId, token_hash: &str) -> AuthResult<bool> {
            self.inner.clear_reset_token(user_id, token_hash).await
        }

        async fn record_login_failure(
            &self,
            user_id: &UserId,
            policy: &LockoutPolicy,
            now: DateTime<Utc>,
        ) -> AuthResult<()> {
            self.inner.record_login_failure(user_id, policy, now).await
        }

        async fn reset_login_attempts(&self, user_id: &UserId) -> AuthResult<()> {
            self.inner.reset_login_attempts(user_id).await
        }

        async fn complete_password_reset(
            &self,
            user_id: &UserId,
            token_hash: &str,
            password_hash: &UserPassword,
            now: DateTime<Utc>,
        ) -> AuthResult<bool> {
            self.inner
                .complete_password_reset(user_id, token_hash, password_hash, now)
                .await
        }

        async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
            self.inner.delete(user_id).await
        }
    }

    /// Changes the recipient's password while "sending", then fails to deliver
    pub struct PasswordChangingNotifier {
        pub repo: Arc<MemoryUserRepository>,
        pub config: Arc<AuthConfig>,
        pub current: String,
        pub new: String,
    }

    impl Notifier for PasswordChangingNotifier {
        async fn send_welcome(&self, _to: &Email, _user_name: &UserName) -> Result<(), NotifyError> {
            Ok(())
        }

        async fn send_password_reset(&self, to: &Email, _reset_url: &str) -> Result<(), NotifyError> {
            let user = self
                .repo
                .find_by_email(to)
                .await
                .map_err(|e| NotifyError::Message(e.to_string()))?
                .ok_or_else(|| NotifyError::Message("no such user".to_string()))?;

            ChangePasswordUseCase::new(self.repo.clone(), self.config.clone())
                .execute(
                    &user.user_id,
                    ChangePasswordInput {
                        current_password: Some(self.current.clone()),
                        new_password: Some(self.new.clone()),
                    },
                )
                .await
                .map_err(|e| NotifyError::Message(e.to_string()))?;

            Err(NotifyError::Transport("connection reset".to_string()))
        }
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use platform::cache::MemoryCache;

    use super::fakes::RecordingNotifier;
    use super::interleaving::{DeactivatingRepository, PasswordChangingNotifier};
    use crate::application::config::AuthConfig;
    use crate::application::*;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::user_role::UserRole;
    use crate::error::AuthError;
    use crate::infra::memory::MemoryUserRepository;
    use crate::infra::session_cache::{SessionMirror, reset_key, token_key};

    struct Fixture {
        repo: Arc<MemoryUserRepository>,
        cache: Arc<MemoryCache>,
        notifier: Arc<RecordingNotifier>,
        tokens: Arc<TokenService>,
        config: Arc<AuthConfig>,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_config(AuthConfig::development())
        }

        fn with_config(config: AuthConfig) -> Self {
            Self {
                repo: Arc::new(MemoryUserRepository::new()),
                cache: Arc::new(MemoryCache::new()),
                notifier: Arc::new(RecordingNotifier::default()),
                tokens: Arc::new(TokenService::from_config(&config)),
                config: Arc::new(config),
            }
        }

        fn mirror(&self) -> SessionMirror<MemoryCache> {
            SessionMirror::new(
                self.cache.clone(),
                self.config.cookie_lifetime(),
                self.config.reset_token_ttl,
            )
        }

        async fn register(
            &self,
            user_name: &str,
            email: &str,
            role: Option<&str>,
        ) -> Result<IssuedSession, AuthError> {
            RegisterUseCase::new(
                self.repo.clone(),
                self.mirror(),
                self.notifier.clone(),
                self.tokens.clone(),
                self.config.clone(),
            )
            .execute(RegisterInput {
                user_name: Some(user_name.to_string()),
                email: Some(email.to_string()),
                password: Some("secret1".to_string()),
                requested_role: role.map(str::to_string),
            })
            .await
        }

        async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AuthError> {
            LoginUseCase::new(
                self.repo.clone(),
                self.mirror(),
                self.tokens.clone(),
                self.config.clone(),
            )
            .execute(LoginInput {
                email: Some(email.to_string()),
                password: Some(password.to_string()),
            })
            .await
        }

        async fn forgot(&self, email: &str) -> Result<(), AuthError> {
            ForgotPasswordUseCase::new(
                self.repo.clone(),
                self.mirror(),
                self.notifier.clone(),
                self.config.clone(),
            )
            .execute(Some(email.to_string()))
            .await
        }

        async fn reset(&self, token: &str, password: &str) -> Result<IssuedSession, AuthError> {
            ResetPasswordUseCase::new(
                self.repo.clone(),
                self.mirror(),
                self.tokens.clone(),
                self.config.clone(),
            )
            .execute(ResetPasswordInput {
                token: Some(token.to_string()),
                password: Some(password.to_string()),
            })
            .await
        }
    }

    #[tokio::test]
    async fn test_first_user_is_admin_later_users_are_not() {
        let fx = Fixture::new();

        let first = fx.register("alice", "alice@example.com", None).await.unwrap();
        assert_eq!(first.user.user_role, UserRole::Admin);

        let second = fx
            .register("bob", "bob@example.com", Some("admin"))
            .await
            .unwrap();
        assert_eq!(second.user.user_role, UserRole::User);

        assert_eq!(fx.notifier.welcomes.lock().unwrap().len(), 2);
        assert!(fx.cache.snapshot_keys().contains(&token_key(&second.user.user_id)));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_missing_fields() {
        let fx = Fixture::new();
        fx.register("alice", "alice@example.com", None).await.unwrap();

        let err = fx
            .register("alice2", "ALICE@example.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserExists));

        let err = fx.register("alice", "other@example.com", None).await.unwrap_err();
        assert!(matches!(err, AuthError::UserExists));

        let err = fx.register("  ", "x@example.com", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Username, email, and password are required");
    }

    #[tokio::test]
    async fn test_register_survives_cache_outage() {
        let fx = Fixture::new();
        fx.cache.set_unavailable(true);

        let session = fx.register("alice", "alice@example.com", None).await.unwrap();
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn test_correct_password_resets_attempts() {
        let fx = Fixture::new();
        let session = fx.register("alice", "alice@example.com", None).await.unwrap();

        for _ in 0..2 {
            let err = fx.login("alice@example.com", "wrong-pass").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        let credentials = fx
            .repo
            .find_credentials(&session.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credentials.login_attempts, 2);

        let logged_in = fx.login("alice@example.com", "secret1").await.unwrap();
        assert!(logged_in.user.last_login_at.is_some());

        let credentials = fx
            .repo
            .find_credentials(&session.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credentials.login_attempts, 0);
        assert!(credentials.lock_until.is_none());
    }

    #[tokio::test]
    async fn test_lock_holds_against_correct_password_until_it_elapses() {
        let mut config = AuthConfig::development();
        config.lockout.lock_duration = chrono::Duration::milliseconds(200);
        let fx = Fixture::with_config(config);
        fx.register("alice", "alice@example.com", None).await.unwrap();

        for _ in 0..5 {
            let err = fx.login("alice@example.com", "wrong-pass").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }

        let err = fx.login("alice@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountLocked));

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(fx.login("alice@example.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_email_and_malformed_email_are_invalid_credentials() {
        let fx = Fixture::new();

        let err = fx.login("nobody@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = fx.login("not-an-email", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_reset_round_trip_is_single_use() {
        let fx = Fixture::new();
        let session = fx.register("alice", "alice@example.com", None).await.unwrap();
        let user_id = session.user.user_id;

        fx.forgot("alice@example.com").await.unwrap();
        let token = fx.notifier.last_reset_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(fx.cache.snapshot_keys().contains(&reset_key(&user_id)));

        // Only the digest is stored
        let credentials = fx.repo.find_credentials(&user_id).await.unwrap().unwrap();
        assert_ne!(credentials.reset_token_hash.as_deref(), Some(token.as_str()));

        VerifyResetTokenUseCase::new(fx.repo.clone())
            .execute(&token)
            .await
            .unwrap();

        let reset = fx.reset(&token, "newsecret").await.unwrap();
        assert_eq!(reset.user.user_id, user_id);
        assert_eq!(fx.tokens.verify(&reset.token).unwrap(), user_id);
        assert!(!fx.cache.snapshot_keys().contains(&reset_key(&user_id)));

        assert!(fx.login("alice@example.com", "newsecret").await.is_ok());
        assert!(matches!(
            fx.login("alice@example.com", "secret1").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));

        let err = fx.reset(&token, "another1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidResetToken));
    }

    #[tokio::test]
    async fn test_forgot_password_for_unknown_email_creates_no_token() {
        let fx = Fixture::new();
        let session = fx.register("alice", "alice@example.com", None).await.unwrap();

        fx.forgot("nobody@example.com").await.unwrap();

        assert_eq!(fx.notifier.reset_count(), 0);
        let credentials = fx
            .repo
            .find_credentials(&session.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(credentials.reset_token_hash.is_none());
        assert!(credentials.reset_token_expires_at.is_none());
    }

    #[tokio::test]
    async fn test_undelivered_reset_mail_withdraws_token() {
        let fx = Fixture::new();
        let session = fx.register("alice", "alice@example.com", None).await.unwrap();
        fx.notifier.fail_resets();

        let err = fx.forgot("alice@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::ResetDeliveryFailed(_)));

        let credentials = fx
            .repo
            .find_credentials(&session.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(credentials.reset_token_hash.is_none());
    }

    #[tokio::test]
    async fn test_login_does_not_undo_concurrent_deactivation() {
        let fx = Fixture::new();
        fx.register("alice", "alice@example.com", None).await.unwrap();
        let bob = fx.register("bob", "bob@example.com", None).await.unwrap();
        let user_id = bob.user.user_id;

        let racing = Arc::new(DeactivatingRepository::new(fx.repo.clone(), user_id));
        LoginUseCase::new(racing, fx.mirror(), fx.tokens.clone(), fx.config.clone())
            .execute(LoginInput {
                email: Some("bob@example.com".to_string()),
                password: Some("secret1".to_string()),
            })
            .await
            .unwrap();

        let stored = fx.repo.find_by_id(&user_id).await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(stored.last_login_at.is_some());

        let err = fx.login("bob@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDeactivated));
    }

    #[tokio::test]
    async fn test_failed_reset_mail_keeps_password_changed_meanwhile() {
        let fx = Fixture::new();
        let session = fx.register("alice", "alice@example.com", None).await.unwrap();

        let notifier = Arc::new(PasswordChangingNotifier {
            repo: fx.repo.clone(),
            config: fx.config.clone(),
            current: "secret1".to_string(),
            new: "brandnew1".to_string(),
        });
        let err = ForgotPasswordUseCase::new(
            fx.repo.clone(),
            fx.mirror(),
            notifier,
            fx.config.clone(),
        )
        .execute(Some("alice@example.com".to_string()))
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::ResetDeliveryFailed(_)));

        assert!(fx.login("alice@example.com", "brandnew1").await.is_ok());
        let err = fx.login("alice@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let credentials = fx
            .repo
            .find_credentials(&session.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(credentials.reset_token_hash.is_none());
    }

    #[tokio::test]
    async fn test_withdrawing_a_reset_token_spares_a_newer_one() {
        let fx = Fixture::new();
        let session = fx.register("alice", "alice@example.com", None).await.unwrap();
        let user_id = session.user.user_id;

        fx.forgot("alice@example.com").await.unwrap();
        let newer = fx.notifier.last_reset_token().unwrap();

        assert!(!fx.repo.clear_reset_token(&user_id, "stale-digest").await.unwrap());
        assert!(fx.reset(&newer, "another1").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_to_same_password_changes_nothing() {
        let fx = Fixture::new();
        let session = fx.register("alice", "alice@example.com", None).await.unwrap();
        let user_id = session.user.user_id;
        let before = fx.repo.find_credentials(&user_id).await.unwrap().unwrap();

        let use_case = ChangePasswordUseCase::new(fx.repo.clone(), fx.config.clone());
        let err = use_case
            .execute(
                &user_id,
                ChangePasswordInput {
                    current_password: Some("secret1".to_string()),
                    new_password: Some("secret1".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SamePassword));

        let after = fx.repo.find_credentials(&user_id).await.unwrap().unwrap();
        assert_eq!(
            before.password_hash.as_phc_string(),
            after.password_hash.as_phc_string()
        );

        let err = use_case
            .execute(
                &user_id,
                ChangePasswordInput {
                    current_password: Some("wrong-pass".to_string()),
                    new_password: Some("another1".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CurrentPasswordIncorrect));

        let err = use_case
            .execute(
                &user_id,
                ChangePasswordInput {
                    current_password: Some("secret1".to_string()),
                    new_password: Some("abc".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "New password must be at least 6 characters long"
        );
    }

    #[tokio::test]
    async fn test_deactivated_user_cannot_login_or_authenticate() {
        let fx = Fixture::new();
        let admin = fx.register("alice", "alice@example.com", None).await.unwrap();
        let bob = fx.register("bob", "bob@example.com", None).await.unwrap();

        let manage = ManageUsersUseCase::new(fx.repo.clone(), fx.mirror());
        manage
            .update(
                &bob.user.user_id.to_string(),
                UpdateUserInput {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = fx.login("bob@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDeactivated));

        let auth = AuthenticateUseCase::new(fx.repo.clone(), fx.tokens.clone());
        let err = auth.execute(Some(bob.token.as_str())).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDeactivated));
        assert!(auth.execute(Some(admin.token.as_str())).await.is_ok());

        let err = fx.forgot("bob@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));
    }

    #[tokio::test]
    async fn test_user_administration() {
        let fx = Fixture::new();
        let admin = fx.register("alice", "alice@example.com", None).await.unwrap();
        let bob = fx.register("bob", "bob@example.com", None).await.unwrap();
        let manage = ManageUsersUseCase::new(fx.repo.clone(), fx.mirror());

        let users = manage.list().await.unwrap();
        assert_eq!(users.len(), 2);

        let err = manage
            .update(
                &bob.user.user_id.to_string(),
                UpdateUserInput {
                    role: Some("root".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Role must be either 'user' or 'admin'");

        let err = manage
            .update(
                &bob.user.user_id.to_string(),
                UpdateUserInput {
                    email: Some("alice@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserExists));

        let err = manage
            .delete(&admin.user.user_id, &admin.user.user_id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CannotDeleteSelf));

        manage
            .delete(&admin.user.user_id, &bob.user.user_id.to_string())
            .await
            .unwrap();
        assert!(!fx.cache.snapshot_keys().contains(&token_key(&bob.user.user_id)));

        let err = manage.get(&bob.user.user_id.to_string()).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));

        let err = manage.get("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}

#[cfg(test)]
mod http_tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use platform::cache::MemoryCache;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::fakes::RecordingNotifier;
    use crate::application::config::AuthConfig;
    use crate::infra::memory::MemoryUserRepository;
    use crate::presentation::router::auth_router_generic;

    fn app() -> Router {
        auth_router_generic(
            MemoryUserRepository::new(),
            Arc::new(MemoryCache::new()),
            RecordingNotifier::default(),
            AuthConfig::development(),
        )
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn register(app: &Router, name: &str) -> (String, Value) {
        let (status, _, body) = send(
            app,
            post_json(
                "/register",
                json!({
                    "username": name,
                    "email": format!("{name}@example.com"),
                    "password": "secret1",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let token = body["data"]["token"].as_str().unwrap().to_string();
        (token, body["data"]["user"].clone())
    }

    #[tokio::test]
    async fn test_register_sets_cookie_and_returns_user() {
        let app = app();

        let (status, headers, body) = send(
            &app,
            post_json(
                "/register",
                json!({ "username": "alice", "email": "alice@example.com", "password": "secret1" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["data"]["user"]["role"], "admin");
        assert!(body["data"]["user"]["_id"].is_string());

        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[tokio::test]
    async fn test_register_validation_error_envelope() {
        let app = app();

        let (status, _, body) = send(
            &app,
            post_json("/register", json!({ "username": "alice", "email": "alice@example.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Username, email, and password are required");
    }

    #[tokio::test]
    async fn test_me_accepts_cookie_or_bearer() {
        let app = app();
        let (token, _) = register(&app, "alice").await;

        let (status, _, body) = send(&app, get_with_bearer("/me", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["username"], "alice");
        assert_eq!(body["data"]["user"]["isActive"], true);

        let req = Request::builder()
            .uri("/verify")
            .header(header::COOKIE, format!("token={token}"))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Token is valid");
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let app = app();

        let req = Request::builder().uri("/me").body(Body::empty()).unwrap();
        let (status, _, body) = send(&app, req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Authentication required. Please login.");

        let (status, _, body) = send(&app, get_with_bearer("/me", "garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_login_failure_envelope() {
        let app = app();
        register(&app, "alice").await;

        let (status, _, body) = send(
            &app,
            post_json(
                "/login",
                json!({ "email": "alice@example.com", "password": "wrong-pass" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid email or password");

        let (status, _, body) = send(
            &app,
            post_json(
                "/login",
                json!({ "email": "alice@example.com", "password": "secret1" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert!(body["data"]["user"]["lastLogin"].is_string());
    }

    #[tokio::test]
    async fn test_logout_always_clears_cookie() {
        let app = app();

        let req = Request::builder()
            .method("POST")
            .uri("/logout")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logout successful");
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_admin_routes_and_self_access() {
        let app = app();
        let (admin_token, _) = register(&app, "alice").await;
        let (user_token, bob) = register(&app, "bob").await;
        let (_, carol) = register(&app, "carol").await;
        let bob_id = bob["_id"].as_str().unwrap();
        let carol_id = carol["_id"].as_str().unwrap();

        let (status, _, body) = send(&app, get_with_bearer("/users", &admin_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 3);
        assert_eq!(body["data"]["users"][0]["username"], "carol");

        let (status, _, body) = send(&app, get_with_bearer("/users", &user_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Admin access required");

        let (status, _, _) =
            send(&app, get_with_bearer(&format!("/users/{bob_id}"), &user_token)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, body) =
            send(&app, get_with_bearer(&format!("/users/{carol_id}"), &user_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Access denied");

        let req = Request::builder()
            .method("PUT")
            .uri(format!("/users/{bob_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "role": "admin" }).to_string()))
            .unwrap();
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["role"], "admin");

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/users/{carol_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User deleted successfully");
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_is_generic_success() {
        let app = app();

        let (status, _, body) = send(
            &app,
            post_json("/forgot-password", json!({ "email": "nobody@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "If an account with that email exists, a password reset link has been sent."
        );

        let (status, _, body) = send(&app, post_json("/forgot-password", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email is required");

        let req = Request::builder()
            .uri("/verify-reset-token/deadbeef")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid or expired password reset token");
    }
}
