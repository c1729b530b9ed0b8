use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Owns password hashing: plaintext passwords enter through commands and only
/// hashes leave towards the repository.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    pub fn new(repository: Arc<UR>, password_hasher: auth::PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    /// Argon2 is CPU-bound, so hashing runs on the blocking pool.
    async fn hash(&self, password: &str) -> Result<String, UserError> {
        let hasher = self.password_hasher.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| UserError::Hashing(e.to_string()))?
            .map_err(|e| UserError::Hashing(e.to_string()))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let password_hash = self.hash(command.password.expose()).await?;
        let now = Utc::now();

        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            role: command.role,
            verified_email: false,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, role = %created_user.role, "User created");

        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::NotFoundByEmail(email.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let password_hash = match command.password {
            Some(password) => Some(self.hash(password.expose()).await?),
            None => None,
        };

        let changes = UserChanges {
            name: command.name,
            email: command.email,
            password_hash,
            role: command.role,
            verified_email: command.verified_email,
            ..UserChanges::at(Utc::now())
        };

        self.repository.update(id, changes).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::Password;
    use crate::domain::user::models::Role;
    use crate::domain::user::models::UserName;
    use crate::outbound::repositories::memory::InMemoryUserRepository;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    fn hasher() -> auth::PasswordHasher {
        auth::PasswordHasher::with_params(auth::HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn existing_user(id: UserId) -> User {
        User {
            id,
            name: UserName::new("Old Name".to_string()).unwrap(),
            email: EmailAddress::new("old@example.com".to_string()).unwrap(),
            password_hash: "$argon2id$old_hash".to_string(),
            role: Role::User,
            verified_email: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.name.as_str() == "Ada"
                    && user.email.as_str() == "a@x.com"
                    && user.password_hash.starts_with("$argon2")
                    && user.password_hash != "Secret1"
                    && !user.verified_email
                    && user.role == Role::User
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), hasher());

        let command = CreateUserCommand::new(
            UserName::new("Ada".to_string()).unwrap(),
            EmailAddress::new("a@x.com".to_string()).unwrap(),
            Password::new("Secret1".to_string()).unwrap(),
        );

        let user = service.create_user(command).await.unwrap();
        assert!(hasher().verify("Secret1", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()))
        });

        let service = UserService::new(Arc::new(repository), hasher());

        let command = CreateUserCommand::new(
            UserName::new("Ada".to_string()).unwrap(),
            EmailAddress::new("a@x.com".to_string()).unwrap(),
            Password::new("Secret1".to_string()).unwrap(),
        );

        let result = service.create_user(command).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), hasher());

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_user_by_email_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), hasher());

        let email = EmailAddress::new("nobody@x.com".to_string()).unwrap();
        let result = service.get_user_by_email(&email).await;
        assert!(matches!(result, Err(UserError::NotFoundByEmail(_))));
    }

    #[tokio::test]
    async fn test_update_user_password_and_verification() {
        let mut repository = MockTestUserRepository::new();

        let user_id = UserId::new();
        repository.expect_find_by_id().times(0);
        repository
            .expect_update()
            .withf(move |id, changes| {
                *id == user_id
                    && changes
                        .password_hash
                        .as_deref()
                        .is_some_and(|hash| hash.starts_with("$argon2"))
                    && changes.verified_email == Some(true)
                    && changes.name.is_none()
                    && changes.email.is_none()
            })
            .times(1)
            .returning(|id, changes| {
                let mut user = existing_user(*id);
                changes.apply_to(&mut user);
                Ok(user)
            });

        let service = UserService::new(Arc::new(repository), hasher());

        let command = UpdateUserCommand {
            password: Some(Password::new("NewSecret2".to_string()).unwrap()),
            verified_email: Some(true),
            ..UpdateUserCommand::default()
        };

        let updated = service.update_user(&user_id, command).await.unwrap();
        assert!(hasher().verify("NewSecret2", &updated.password_hash).unwrap());
        assert_eq!(updated.name.as_str(), "Old Name");
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_update()
            .times(1)
            .returning(|id, _| Err(UserError::NotFound(id.to_string())));

        let service = UserService::new(Arc::new(repository), hasher());

        let result = service
            .update_user(&UserId::new(), UpdateUserCommand::verified_email())
            .await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_updates_of_different_fields_both_land() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let service = Arc::new(UserService::new(Arc::clone(&repository), hasher()));

        let user = service
            .create_user(CreateUserCommand::new(
                UserName::new("Ada".to_string()).unwrap(),
                EmailAddress::new("a@x.com".to_string()).unwrap(),
                Password::new("Secret1".to_string()).unwrap(),
            ))
            .await
            .unwrap();

        let (verified, reset) = tokio::join!(
            service.update_user(&user.id, UpdateUserCommand::verified_email()),
            service.update_user(
                &user.id,
                UpdateUserCommand::password(Password::new("NewSecret2".to_string()).unwrap()),
            ),
        );
        verified.unwrap();
        reset.unwrap();

        let stored = service.get_user(&user.id).await.unwrap();
        assert!(stored.verified_email);
        assert!(hasher().verify("NewSecret2", &stored.password_hash).unwrap());
        assert!(!hasher().verify("Secret1", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        let user_id = UserId::new();
        repository
            .expect_delete()
            .times(1)
            .returning(move |_| Err(UserError::NotFound(user_id.to_string())));

        let service = UserService::new(Arc::new(repository), hasher());

        let result = service.delete_user(&user_id).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
