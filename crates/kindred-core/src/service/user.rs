//! User and profile management service.
//!
//! Registration, explicit profile edits, and the discovery merge that grows
//! a profile's interests and traits over time.

use chrono::Utc;

use kindred_types::discovery::{Discoveries, MergePolicy};
use kindred_types::error::{RepositoryError, UserError};
use kindred_types::user::{CreateUserRequest, UpdateProfileRequest, UserId, UserProfile};

use crate::repository::user::UserRepository;

/// Service for users, profiles and API key lookups.
pub struct UserService<U: UserRepository> {
    user_repo: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(user_repo: U) -> Self {
        Self { user_repo }
    }

    /// Register a new user.
    ///
    /// The name must be non-blank and the email must look like
    /// `local@domain.tld`. Emails are stored lower-cased and must be unique.
    pub async fn register(&self, request: CreateUserRequest) -> Result<UserProfile, UserError> {
        let full_name = request.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(UserError::InvalidInput("full name is required".to_string()));
        }

        let email = request.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(UserError::InvalidInput(format!("invalid email '{email}'")));
        }

        if self
            .user_repo
            .get_by_email(&email)
            .await
            .map_err(storage)?
            .is_some()
        {
            return Err(UserError::EmailConflict(email));
        }

        let now = Utc::now();
        let user = UserProfile {
            id: UserId::new(),
            full_name,
            email: email.clone(),
            dob: request.dob,
            role: request.role,
            interests: Vec::new(),
            personality_traits: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.user_repo.create(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::EmailConflict(email),
            other => storage(other),
        })
    }

    pub async fn get_user(&self, id: &UserId) -> Result<UserProfile, UserError> {
        self.user_repo
            .get_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(UserError::NotFound)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<UserProfile, UserError> {
        self.user_repo
            .get_by_email(&email.trim().to_lowercase())
            .await
            .map_err(storage)?
            .ok_or(UserError::NotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, UserError> {
        self.user_repo.list().await.map_err(storage)
    }

    /// Apply an explicit profile edit.
    ///
    /// Supplied lists replace the stored ones wholesale; they are still
    /// trimmed and deduplicated, keeping first occurrences.
    pub async fn update_profile(
        &self,
        id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, UserError> {
        let mut user = self.get_user(id).await?;

        if let Some(name) = request.full_name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(UserError::InvalidInput("full name cannot be blank".to_string()));
            }
            user.full_name = name;
        }
        if let Some(dob) = request.dob {
            user.dob = Some(dob);
        }
        if let Some(interests) = request.interests {
            user.interests = merge_unique(&[], &interests, MergePolicy::CaseSensitive);
        }
        if let Some(traits) = request.personality_traits {
            user.personality_traits = merge_unique(&[], &traits, MergePolicy::CaseSensitive);
        }
        user.updated_at = Utc::now();

        self.user_repo.update(&user).await.map_err(storage)
    }

    /// Accept discoveries into a profile.
    ///
    /// Union only: nothing already on the profile is ever removed.
    #[tracing::instrument(skip(self, discoveries), fields(user_id = %id))]
    pub async fn merge_discoveries(
        &self,
        id: &UserId,
        discoveries: &Discoveries,
        policy: MergePolicy,
    ) -> Result<UserProfile, UserError> {
        let mut user = self.get_user(id).await?;

        let added_interests = extend_unique(&mut user.interests, &discoveries.interests, policy);
        let added_traits = extend_unique(
            &mut user.personality_traits,
            &discoveries.personality_traits,
            policy,
        );

        if added_interests == 0 && added_traits == 0 {
            tracing::debug!("Discoveries add nothing new");
            return Ok(user);
        }

        tracing::info!(added_interests, added_traits, "Merged discoveries into profile");

        user.updated_at = Utc::now();
        self.user_repo.update(&user).await.map_err(storage)
    }

    pub async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.user_repo.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => UserError::NotFound,
            other => storage(other),
        })
    }

    pub async fn add_api_key(
        &self,
        id: &UserId,
        key_hash: &str,
        label: &str,
    ) -> Result<(), UserError> {
        self.user_repo
            .add_api_key(id, key_hash, label)
            .await
            .map_err(storage)
    }

    /// Resolve a hashed API key to its user, if any.
    pub async fn authenticate(&self, key_hash: &str) -> Result<Option<UserProfile>, UserError> {
        self.user_repo
            .get_by_api_key_hash(key_hash)
            .await
            .map_err(storage)
    }
}

fn storage(e: RepositoryError) -> UserError {
    UserError::StorageError(e.to_string())
}

/// Ordered union of `existing` then `incoming`.
///
/// `existing` is kept exactly as stored. Incoming entries are trimmed,
/// blanks dropped, and only values not already present are appended.
/// Under `CaseInsensitive` the first-seen spelling is kept.
pub fn merge_unique(existing: &[String], incoming: &[String], policy: MergePolicy) -> Vec<String> {
    let mut out = existing.to_vec();
    extend_unique(&mut out, incoming, policy);
    out
}

/// Append the new values of `incoming` to `target`, returning how many
/// were pushed. Entries already in `target` are never touched.
fn extend_unique(target: &mut Vec<String>, incoming: &[String], policy: MergePolicy) -> usize {
    let key = |item: &str| match policy {
        MergePolicy::CaseSensitive => item.to_string(),
        MergePolicy::CaseInsensitive => item.to_lowercase(),
    };
    let mut seen: std::collections::HashSet<String> =
        target.iter().map(|item| key(item.trim())).collect();

    let mut added = 0;
    for item in incoming {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if seen.insert(key(item)) {
            target.push(item.to_string());
            added += 1;
        }
    }
    added
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}
