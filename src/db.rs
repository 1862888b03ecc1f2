use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    calories::{self, repo_types::{DailyCalorieLedger, MealEntry}},
    error::AppResult,
    profiles::{self, repo_types::UserProfile},
    storage::HealthStore,
    weights::{self, repo_types::WeightSample},
    workouts::{self, repo_types::{NewWorkout, WorkoutRecord}},
};

/// PostgreSQL-backed [`HealthStore`].
#[derive(Clone)]
pub struct PgStore {
    pub db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl HealthStore for PgStore {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        profiles::repo::find_by_user(&self.db, user_id).await
    }

    async fn upsert_profile(&self, profile: UserProfile) -> AppResult<UserProfile> {
        profiles::repo::upsert(&self.db, &profile).await
    }

    async fn insert_workout(
        &self,
        user_id: Uuid,
        workout: NewWorkout,
    ) -> AppResult<WorkoutRecord> {
        workouts::repo::insert(&self.db, user_id, &workout).await
    }

    async fn workouts_between(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> AppResult<Vec<WorkoutRecord>> {
        workouts::repo::list_between(&self.db, user_id, from, to).await
    }

    async fn ledger_for_date(
        &self,
        user_id: Uuid,
        date: Date,
    ) -> AppResult<Option<DailyCalorieLedger>> {
        calories::repo::find_by_date(&self.db, user_id, date).await
    }

    async fn ledgers_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> AppResult<Vec<DailyCalorieLedger>> {
        calories::repo::list_between(&self.db, user_id, from, to).await
    }

    async fn merge_meal(
        &self,
        user_id: Uuid,
        date: Date,
        default_goal: i32,
        meal: MealEntry,
    ) -> AppResult<DailyCalorieLedger> {
        calories::repo::merge_meal(&self.db, user_id, date, default_goal, &meal).await
    }

    async fn insert_weight(
        &self,
        user_id: Uuid,
        date: Date,
        weight: f64,
    ) -> AppResult<WeightSample> {
        weights::repo::insert(&self.db, user_id, date, weight).await
    }

    async fn weights_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> AppResult<Vec<WeightSample>> {
        weights::repo::list_between(&self.db, user_id, from, to).await
    }
}
