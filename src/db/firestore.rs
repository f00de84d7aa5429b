// SPDX-License-Identifier: MIT

//! Firestore implementation of the store capability.
//!
//! Flat collections with composite document IDs; all per-group writes
//! go through a single Firestore transaction so the streak update and
//! its fan-out notifications commit together.

use crate::db::{collections, week_doc_id, GroupCommit, StreakStore};
use crate::error::AppError;
use crate::models::{Group, GroupMember, GroupStreak, GroupStreakWeek};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Firestore-backed store.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
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
}

#[async_trait]
impl StreakStore for FirestoreStore {
    async fn list_active_groups(&self) -> Result<Vec<Group>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::GROUPS)
            .filter(|q| q.field("is_active").eq(true))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_active_members(&self, group_id: &str) -> Result<Vec<GroupMember>, AppError> {
        let group_id = group_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::GROUP_MEMBERS)
            .filter(move |q| {
                q.for_all([
                    q.field("group_id").eq(group_id.clone()),
                    q.field("is_active").eq(true),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_streak(&self, group_id: &str) -> Result<Option<GroupStreak>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::GROUP_STREAKS)
            .obj()
            .one(group_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_streak(&self, group_id: &str, streak: &GroupStreak) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::GROUP_STREAKS)
            .document_id(group_id)
            .object(streak)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_week(
        &self,
        group_id: &str,
        week_start: DateTime<Utc>,
    ) -> Result<Option<GroupStreakWeek>, AppError> {
        let doc_id = week_doc_id(group_id, week_start);
        self.client
            .fluent()
            .select()
            .by_id_in(collections::STREAK_WEEKS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn create_week_if_absent(&self, week: &GroupStreakWeek) -> Result<bool, AppError> {
        let doc_id = week_doc_id(&week.group_id, week.week_start);

        let existing: Option<GroupStreakWeek> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::STREAK_WEEKS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if existing.is_some() {
            return Ok(false);
        }

        // `insert` fails on conflict, so a lost race surfaces as an
        // error and the next scheduled run finds the record in place.
        let _: () = self
            .client
            .fluent()
            .insert()
            .into(collections::STREAK_WEEKS)
            .document_id(&doc_id)
            .object(week)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    async fn commit_group(&self, commit: GroupCommit) -> Result<(), AppError> {
        if commit.is_empty() {
            return Ok(());
        }

        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        if let Some(streak) = &commit.streak {
            self.client
                .fluent()
                .update()
                .in_col(collections::GROUP_STREAKS)
                .document_id(&commit.group_id)
                .object(streak)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add streak to transaction: {}", e))
                })?;
        }

        if let Some(week) = &commit.week {
            let doc_id = week_doc_id(&week.group_id, week.week_start);
            self.client
                .fluent()
                .update()
                .in_col(collections::STREAK_WEEKS)
                .document_id(&doc_id)
                .object(week)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add week to transaction: {}", e))
                })?;
        }

        for notification in &commit.notifications {
            self.client
                .fluent()
                .update()
                .in_col(collections::NOTIFICATIONS)
                .document_id(notification.doc_id())
                .object(notification)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add notification to transaction: {}",
                        e
                    ))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(
            group_id = %commit.group_id,
            notifications = commit.notifications.len(),
            "Group commit applied"
        );

        Ok(())
    }
}
