//! User service.

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tubekit_common::{AppError, AppResult, IdGenerator};
use tubekit_db::{entities::user, repositories::UserRepository};

/// Public author/channel summary joined into read views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub user_name: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

impl From<&user::Model> for UserSummary {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id.clone(),
            user_name: u.user_name.clone(),
            full_name: u.full_name.clone(),
            avatar: u.avatar.clone(),
        }
    }
}

impl From<user::Model> for UserSummary {
    fn from(u: user::Model) -> Self {
        Self::from(&u)
    }
}

/// Input for creating a user.
///
/// The credential hash arrives pre-computed from the auth collaborator;
/// this service never sees a plaintext credential.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub user_name: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

/// Input for updating profile fields.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<Option<String>>,
    pub cover_image: Option<Option<String>>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by handle.
    pub async fn get_by_user_name(&self, user_name: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_user_name(user_name).await
    }

    /// Create a user account.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        let user_name = input.user_name.trim();
        if user_name.is_empty() || user_name.len() > 64 {
            return Err(AppError::Validation(
                "User name must be between 1 and 64 characters".to_string(),
            ));
        }

        if !input.email.contains('@') {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }

        if input.full_name.trim().is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }

        if self.user_repo.find_by_user_name(user_name).await?.is_some() {
            return Err(AppError::Conflict("User name already taken".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_name: Set(user_name.to_string()),
            email: Set(input.email),
            full_name: Set(input.full_name),
            avatar: Set(input.avatar),
            cover_image: Set(input.cover_image),
            password_hash: Set(input.password_hash),
            ..Default::default()
        };

        self.user_repo.create(model).await
    }

    /// Update profile fields.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;

        if let Some(ref full_name) = input.full_name
            && full_name.trim().is_empty()
        {
            return Err(AppError::Validation("Full name cannot be empty".to_string()));
        }

        if let Some(ref email) = input.email
            && !email.contains('@')
        {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }

        let mut model: user::ActiveModel = user.into();
        if let Some(full_name) = input.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(email) = input.email {
            model.email = Set(email);
        }
        if let Some(avatar) = input.avatar {
            model.avatar = Set(avatar);
        }
        if let Some(cover_image) = input.cover_image {
            model.cover_image = Set(cover_image);
        }
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(model).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, user_name: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            user_name: user_name.to_string(),
            email: format!("{user_name}@example.com"),
            full_name: user_name.to_string(),
            avatar: None,
            cover_image: None,
            password_hash: "hash".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn input(user_name: &str) -> CreateUserInput {
        CreateUserInput {
            user_name: user_name.to_string(),
            email: format!("{user_name}@example.com"),
            full_name: "Test User".to_string(),
            password_hash: "hash".to_string(),
            avatar: None,
            cover_image: None,
        }
    }

    #[tokio::test]
    async fn test_create_empty_user_name() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(UserRepository::new(db));

        let result = service.create(input("  ")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_invalid_email() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(UserRepository::new(db));

        let mut i = input("alice");
        i.email = "not-an-email".to_string();
        let result = service.create(i).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_taken_user_name() {
        let existing = create_test_user("u1", "alice");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = UserService::new(UserRepository::new(db));

        let result = service.create(input("alice")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_user_summary_from_model() {
        let user = create_test_user("u1", "alice");
        let summary = UserSummary::from(&user);

        assert_eq!(summary.id, "u1");
        assert_eq!(summary.user_name, "alice");
        assert!(summary.avatar.is_none());
    }
}
