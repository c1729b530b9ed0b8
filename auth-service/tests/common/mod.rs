use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth_service::domain::authentication::service::AuthService;
use auth_service::domain::email::errors::EmailDeliveryError;
use auth_service::domain::email::models::EmailMessage;
use auth_service::domain::email::models::EmailSettings;
use auth_service::domain::email::ports::EmailSender;
use auth_service::domain::email::service::EmailService;
use auth_service::domain::health::service::HealthCheckService;
use auth_service::domain::token::models::TokenSettings;
use auth_service::domain::token::service::TokenService;
use auth_service::domain::user::models::EmailAddress;
use auth_service::domain::user::models::Role;
use auth_service::domain::user::models::UserChanges;
use auth_service::domain::user::ports::UserRepository;
use auth_service::domain::user::service::UserService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::memory::InMemoryTokenRepository;
use auth_service::outbound::repositories::memory::InMemoryUserRepository;
use serde_json::json;
use serde_json::Value;

const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Email sender that keeps every message so tests can follow the links.
#[derive(Default)]
pub struct RecordingEmailSender {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    /// Token embedded in the most recent message sent to `to`.
    pub fn last_token_for(&self, to: &str) -> Option<String> {
        let outbox = self.outbox.lock().unwrap();
        outbox
            .iter()
            .rev()
            .find(|message| message.to.as_str() == to)
            .and_then(|message| {
                let (_, rest) = message.body.split_once("?token=")?;
                rest.split_whitespace().next().map(str::to_string)
            })
    }

    pub fn sent_count(&self) -> usize {
        self.outbox.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError> {
        self.outbox.lock().unwrap().push(message);
        Ok(())
    }
}

/// Test application that spawns a real server over in-memory storage
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub user_repository: Arc<InMemoryUserRepository>,
    pub token_repository: Arc<InMemoryTokenRepository>,
    pub outbox: Arc<RecordingEmailSender>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let password_hasher = PasswordHasher::with_params(auth::HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let token_repository = Arc::new(InMemoryTokenRepository::new());
        let user_repository = Arc::new(InMemoryUserRepository::with_tokens(Arc::clone(
            &token_repository,
        )));
        let outbox = Arc::new(RecordingEmailSender::default());

        let user_service = Arc::new(UserService::new(
            Arc::clone(&user_repository),
            password_hasher.clone(),
        ));
        let token_service = Arc::new(TokenService::new(
            Arc::clone(&token_repository),
            Arc::new(TokenCodec::new(TEST_SECRET)),
            TokenSettings::default(),
        ));
        let email_service = Arc::new(EmailService::new(
            Arc::clone(&outbox),
            EmailSettings {
                from: "no-reply@example.com".to_string(),
                app_url: "http://localhost:5173".to_string(),
            },
        ));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_service),
            token_service,
            email_service,
            Arc::new(password_hasher),
        ));

        let router = create_router(
            auth_service,
            user_service,
            Arc::new(HealthCheckService::default()),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            user_repository,
            token_repository,
            outbox,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register an account and return the response body's `data`
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Value {
        let response = self
            .post("/v1/auth/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }

    /// Give an existing account the admin role directly in storage
    pub async fn promote_to_admin(&self, email: &str) {
        let email = EmailAddress::new(email.to_string()).unwrap();
        let user = self
            .user_repository
            .find_by_email(&email)
            .await
            .unwrap()
            .expect("User to promote does not exist");

        let changes = UserChanges {
            role: Some(Role::Admin),
            ..UserChanges::at(chrono::Utc::now())
        };
        self.user_repository.update(&user.id, changes).await.unwrap();
    }
}

/// Extract `(access_token, refresh_token)` from a register/login payload
pub fn tokens_of(data: &Value) -> (String, String) {
    (
        data["tokens"]["access_token"].as_str().unwrap().to_string(),
        data["tokens"]["refresh_token"].as_str().unwrap().to_string(),
    )
}
