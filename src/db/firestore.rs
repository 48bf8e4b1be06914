// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Firestore client wrapper with typed operations.
//!
//! Document layout:
//! - `leaderboard/{userId}` with sub-collection `daily/{dateKey}`
//! - `groups/{groupId}`
//! - `users/{userId}`

use async_trait::async_trait;
use futures_util::{stream, StreamExt};

use crate::db::{collections, Store, IN_QUERY_LIMIT};
use crate::error::AppError;
use crate::models::{DailyStepRecord, Group, LeaderboardUser, UserProfile};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Parent path of a user's `daily` sub-collection.
    fn board_parent(&self, user_id: &str) -> Result<firestore::ParentPathBuilder, AppError> {
        self.client
            .parent_path(collections::LEADERBOARD, user_id)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl Store for FirestoreStore {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_user(&self, user: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn find_user_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<UserProfile>, AppError> {
        let name = display_name.to_string();
        let matches: Vec<UserProfile> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("display_name").eq(name.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(matches.into_iter().next())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Leaderboard Operations ──────────────────────────────────

    async fn list_leaderboard_users(&self) -> Result<Vec<LeaderboardUser>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::LEADERBOARD)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_leaderboard_user(
        &self,
        user_id: &str,
    ) -> Result<Option<LeaderboardUser>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::LEADERBOARD)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_leaderboard_user(&self, user: &LeaderboardUser) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::LEADERBOARD)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_leaderboard_user(&self, user_id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::LEADERBOARD)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Daily Step Operations ───────────────────────────────────

    async fn upsert_daily_steps(
        &self,
        user_id: &str,
        record: &DailyStepRecord,
    ) -> Result<(), AppError> {
        let parent = self.board_parent(user_id)?;
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::DAILY)
            .document_id(&record.date_key)
            .parent(&parent)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn daily_steps_in(
        &self,
        user_id: &str,
        date_keys: &[String],
    ) -> Result<Vec<DailyStepRecord>, AppError> {
        debug_assert!(date_keys.len() <= IN_QUERY_LIMIT);

        // Daily documents are keyed by date key, so a batched get-by-id
        // covers the "value in small set" lookup without a filter query.
        let parent = self.board_parent(user_id)?;
        let found: Vec<(String, Option<DailyStepRecord>)> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::DAILY)
            .parent(&parent)
            .obj()
            .batch(date_keys.to_vec())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .collect()
            .await;

        Ok(found.into_iter().filter_map(|(_, record)| record).collect())
    }

    async fn delete_daily_steps(&self, user_id: &str) -> Result<usize, AppError> {
        let parent = self.board_parent(user_id)?;
        let records: Vec<DailyStepRecord> = self
            .client
            .fluent()
            .select()
            .from(collections::DAILY)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = records.len();
        let client = &self.client;
        let parent = &parent;

        stream::iter(records)
            .map(|record| async move {
                client
                    .fluent()
                    .delete()
                    .from(collections::DAILY)
                    .document_id(&record.date_key)
                    .parent(parent)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(count)
    }

    // ─── Group Operations ────────────────────────────────────────

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::GROUPS)
            .obj()
            .one(group_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_group_by_invite_code(&self, code: &str) -> Result<Option<Group>, AppError> {
        let code = code.to_string();
        let matches: Vec<Group> = self
            .client
            .fluent()
            .select()
            .from(collections::GROUPS)
            .filter(move |q| q.field("invite_code").eq(code.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(matches.into_iter().next())
    }

    async fn upsert_group(&self, group: &Group) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::GROUPS)
            .document_id(&group.id)
            .object(group)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_group(&self, group_id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::GROUPS)
            .document_id(group_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
