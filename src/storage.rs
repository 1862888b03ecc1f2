use std::collections::HashMap;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    calories::repo_types::{DailyCalorieLedger, MealEntry},
    error::AppResult,
    profiles::repo_types::UserProfile,
    weights::repo_types::WeightSample,
    workouts::repo_types::{NewWorkout, WorkoutRecord},
};

/// Persistence boundary shared by every feature module.
///
/// Range reads are inclusive on both ends and return rows newest first.
/// Every read and write is scoped to a single user.
#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;

    /// Insert or replace the profile keyed by `profile.user_id`.
    async fn upsert_profile(&self, profile: UserProfile) -> AppResult<UserProfile>;

    async fn insert_workout(&self, user_id: Uuid, workout: NewWorkout)
        -> AppResult<WorkoutRecord>;

    async fn workouts_between(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> AppResult<Vec<WorkoutRecord>>;

    async fn ledger_for_date(&self, user_id: Uuid, date: Date)
        -> AppResult<Option<DailyCalorieLedger>>;

    async fn ledgers_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> AppResult<Vec<DailyCalorieLedger>>;

    /// Append `meal` to the (user, date) ledger, creating it with `default_goal`
    /// when absent. The running total grows by `meal.total_calories`.
    /// Implementations must apply this atomically per (user, date).
    async fn merge_meal(
        &self,
        user_id: Uuid,
        date: Date,
        default_goal: i32,
        meal: MealEntry,
    ) -> AppResult<DailyCalorieLedger>;

    async fn insert_weight(&self, user_id: Uuid, date: Date, weight: f64)
        -> AppResult<WeightSample>;

    async fn weights_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> AppResult<Vec<WeightSample>>;
}

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, UserProfile>,
    workouts: Vec<WorkoutRecord>,
    ledgers: HashMap<(Uuid, Date), DailyCalorieLedger>,
    weights: Vec<WeightSample>,
}

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthStore for MemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.tables.lock().await.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let mut t = self.tables.lock().await;
        t.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn insert_workout(
        &self,
        user_id: Uuid,
        workout: NewWorkout,
    ) -> AppResult<WorkoutRecord> {
        let record = WorkoutRecord {
            id: Uuid::new_v4(),
            user_id,
            title: workout.title,
            level: workout.level,
            duration_minutes: workout.duration_minutes,
            calories_burned: workout.calories_burned,
            exercises: workout.exercises,
            completed_at: OffsetDateTime::now_utc(),
        };
        self.tables.lock().await.workouts.push(record.clone());
        Ok(record)
    }

    async fn workouts_between(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> AppResult<Vec<WorkoutRecord>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<WorkoutRecord> = t
            .workouts
            .iter()
            .rev()
            .filter(|w| w.user_id == user_id && w.completed_at >= from && w.completed_at <= to)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(rows)
    }

    async fn ledger_for_date(
        &self,
        user_id: Uuid,
        date: Date,
    ) -> AppResult<Option<DailyCalorieLedger>> {
        Ok(self.tables.lock().await.ledgers.get(&(user_id, date)).cloned())
    }

    async fn ledgers_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> AppResult<Vec<DailyCalorieLedger>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<DailyCalorieLedger> = t
            .ledgers
            .values()
            .filter(|l| l.user_id == user_id && l.date >= from && l.date <= to)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn merge_meal(
        &self,
        user_id: Uuid,
        date: Date,
        default_goal: i32,
        meal: MealEntry,
    ) -> AppResult<DailyCalorieLedger> {
        // The whole read-modify-write happens under one lock.
        let mut t = self.tables.lock().await;
        let now = OffsetDateTime::now_utc();
        let ledger = t
            .ledgers
            .entry((user_id, date))
            .and_modify(|l| {
                l.calories_consumed += meal.total_calories;
                l.meals.push(meal.clone());
                l.updated_at = now;
            })
            .or_insert_with(|| DailyCalorieLedger {
                id: Uuid::new_v4(),
                user_id,
                date,
                calories_consumed: meal.total_calories,
                calories_goal: default_goal,
                meals: vec![meal.clone()],
                updated_at: now,
            });
        Ok(ledger.clone())
    }

    async fn insert_weight(
        &self,
        user_id: Uuid,
        date: Date,
        weight: f64,
    ) -> AppResult<WeightSample> {
        let sample = WeightSample {
            id: Uuid::new_v4(),
            user_id,
            date,
            weight,
        };
        self.tables.lock().await.weights.push(sample.clone());
        Ok(sample)
    }

    async fn weights_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> AppResult<Vec<WeightSample>> {
        let t = self.tables.lock().await;
        // newest insert first among equal dates; the sort below is stable
        let mut rows: Vec<WeightSample> = t
            .weights
            .iter()
            .rev()
            .filter(|w| w.user_id == user_id && w.date >= from && w.date <= to)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }
}
