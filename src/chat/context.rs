//! Builds the per-user text block embedded in the coaching system prompt.
//!
//! Four sections are always rendered in a fixed order. Each section is read
//! independently; a failing read degrades that section to an "unavailable"
//! sentence without affecting the others.

use std::{future::Future, time::Duration as StdDuration};

use time::{Duration, OffsetDateTime};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    calories::repo_types::DailyCalorieLedger,
    error::{AppError, AppResult},
    profiles::repo_types::UserProfile,
    storage::HealthStore,
    weights::repo_types::WeightSample,
    workouts::repo_types::WorkoutRecord,
};

pub const WORKOUT_WINDOW_DAYS: i64 = 14;
pub const CALORIE_WINDOW_DAYS: i64 = 7;
pub const WEIGHT_WINDOW_DAYS: i64 = 30;

/// Item lines per section; totals and averages still cover every row.
pub const MAX_SECTION_LINES: usize = 15;

pub const CONTEXT_BUDGET: StdDuration = StdDuration::from_secs(5);

pub const FALLBACK_CONTEXT: &str =
    "The user's data could not be loaded right now. Give general guidance and ask for any details you need.";

const NOT_ONBOARDED: &str = "PROFILE: The user has not completed the onboarding questionnaire yet.";
const NO_WORKOUTS: &str = "RECENT WORKOUTS: No workouts recorded in the last 2 weeks.";
const NO_CALORIES: &str = "CALORIE INTAKE: No meals logged in the last week.";
const NO_WEIGHTS: &str = "WEIGHT: No weight measurements in the last month.";

#[derive(Debug, Clone, PartialEq)]
enum Section {
    Present(String),
    Empty(&'static str),
    Unavailable(&'static str),
}

impl Section {
    fn text(&self) -> &str {
        match self {
            Section::Present(s) => s,
            Section::Empty(s) | Section::Unavailable(s) => s,
        }
    }
}

/// Never fails: read errors and slow reads are rendered into the text.
pub async fn build_user_context(
    store: &dyn HealthStore,
    user_id: Uuid,
    now: OffsetDateTime,
    max_chars: usize,
) -> String {
    build_with_budget(store, user_id, now, max_chars, CONTEXT_BUDGET).await
}

/// `budget` bounds each read separately; the reads run concurrently, so it
/// also bounds the whole aggregation.
#[instrument(skip(store), fields(user_id = %user_id))]
async fn build_with_budget(
    store: &dyn HealthStore,
    user_id: Uuid,
    now: OffsetDateTime,
    max_chars: usize,
    budget: StdDuration,
) -> String {
    let sections = gather(store, user_id, now, budget).await;

    if sections
        .iter()
        .all(|s| matches!(s, Section::Unavailable(_)))
    {
        warn!("every user context read failed");
        return FALLBACK_CONTEXT.to_string();
    }

    let joined = sections
        .iter()
        .map(Section::text)
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(joined, max_chars)
}

async fn bounded<T>(
    budget: StdDuration,
    read: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    match tokio::time::timeout(budget, read).await {
        Ok(res) => res,
        Err(_) => Err(AppError::Internal(anyhow::anyhow!(
            "read exceeded {} ms",
            budget.as_millis()
        ))),
    }
}

async fn gather(
    store: &dyn HealthStore,
    user_id: Uuid,
    now: OffsetDateTime,
    budget: StdDuration,
) -> [Section; 4] {
    let today = now.date();
    let (profile, workouts, ledgers, weights) = tokio::join!(
        bounded(budget, store.get_profile(user_id)),
        bounded(
            budget,
            store.workouts_between(user_id, now - Duration::days(WORKOUT_WINDOW_DAYS), now)
        ),
        bounded(
            budget,
            store.ledgers_between(user_id, today - Duration::days(CALORIE_WINDOW_DAYS), today)
        ),
        bounded(
            budget,
            store.weights_between(user_id, today - Duration::days(WEIGHT_WINDOW_DAYS), today)
        ),
    );

    [
        profile_section(profile),
        workout_section(workouts),
        calorie_section(ledgers),
        weight_section(weights),
    ]
}

fn unavailable(section: &'static str, text: &'static str, err: &AppError) -> Section {
    warn!(section, error = %err, "context read failed");
    Section::Unavailable(text)
}

fn profile_section(res: AppResult<Option<UserProfile>>) -> Section {
    let p = match res {
        Ok(Some(p)) => p,
        Ok(None) => return Section::Empty(NOT_ONBOARDED),
        Err(e) => {
            return unavailable("profile", "PROFILE: Profile data is unavailable right now.", &e)
        }
    };

    let mut out = String::from("PROFILE:");
    if !p.onboarding_completed {
        out.push_str("\n(The user skipped the questionnaire; these values are defaults.)");
    }
    let lines = [
        format!("Age: {} years", p.age),
        format!("Gender: {}", p.gender),
        format!("Height: {} cm", num(p.height)),
        format!("Current weight: {} kg", num(p.current_weight)),
        format!("Target weight: {} kg", num(p.target_weight)),
        format!("Activity level: {}", p.activity_level),
        format!("Goal: {}", p.fitness_goal),
        format!("Workout level: {}", p.workout_level),
        format!("Meals per day: {}", p.meals_per_day),
        format!("Water: {} glasses per day", p.water_intake),
        format!("Sleep: {} hours", num(p.sleep_hours)),
        format!("Dietary restrictions: {}", list_or_none(&p.dietary_restrictions)),
        format!("Health conditions: {}", list_or_none(&p.health_conditions)),
    ];
    for line in lines {
        out.push_str("\n- ");
        out.push_str(&line);
    }
    Section::Present(out)
}

fn workout_section(res: AppResult<Vec<WorkoutRecord>>) -> Section {
    let rows = match res {
        Ok(rows) if rows.is_empty() => return Section::Empty(NO_WORKOUTS),
        Ok(rows) => rows,
        Err(e) => {
            return unavailable(
                "workouts",
                "RECENT WORKOUTS: Workout history is unavailable right now.",
                &e,
            )
        }
    };

    let mut out = String::from("RECENT WORKOUTS (last 2 weeks):");
    push_capped(&mut out, &rows, |w| {
        format!(
            "{} ({}) - {} min - {} kcal - {}",
            w.title,
            w.level,
            w.duration_minutes,
            w.calories_burned,
            w.completed_at.date()
        )
    });
    let burned: i64 = rows.iter().map(|w| i64::from(w.calories_burned)).sum();
    out.push_str(&format!(
        "\nTotal: {} workouts, {} kcal burned",
        rows.len(),
        burned
    ));
    Section::Present(out)
}

fn calorie_section(res: AppResult<Vec<DailyCalorieLedger>>) -> Section {
    let rows = match res {
        Ok(rows) if rows.is_empty() => return Section::Empty(NO_CALORIES),
        Ok(rows) => rows,
        Err(e) => {
            return unavailable(
                "calories",
                "CALORIE INTAKE: Calorie history is unavailable right now.",
                &e,
            )
        }
    };

    let mut out = String::from("CALORIE INTAKE (last week):");
    push_capped(&mut out, &rows, |l| {
        format!(
            "{}: {}/{} kcal",
            l.date,
            num(l.calories_consumed),
            l.calories_goal
        )
    });
    let total: f64 = rows.iter().map(|l| l.calories_consumed).sum();
    out.push_str(&format!(
        "\nDaily average: {} kcal",
        round_half_up(total / rows.len() as f64)
    ));
    Section::Present(out)
}

fn weight_section(res: AppResult<Vec<WeightSample>>) -> Section {
    let rows = match res {
        Ok(rows) if rows.is_empty() => return Section::Empty(NO_WEIGHTS),
        Ok(rows) => rows,
        Err(e) => {
            return unavailable("weights", "WEIGHT: Weight history is unavailable right now.", &e)
        }
    };

    // rows are newest first
    let latest = &rows[0];
    let oldest = &rows[rows.len() - 1];
    Section::Present(format!(
        "WEIGHT (last month):\n- Latest: {} kg ({})\n- Change over the period: {} kg\n- Measurements: {}",
        num(latest.weight),
        latest.date,
        signed_delta(latest.weight - oldest.weight),
        rows.len()
    ))
}

fn push_capped<T>(out: &mut String, rows: &[T], line: impl Fn(&T) -> String) {
    for (i, row) in rows.iter().take(MAX_SECTION_LINES).enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, line(row)));
    }
    if rows.len() > MAX_SECTION_LINES {
        out.push_str(&format!("\n... and {} more", rows.len() - MAX_SECTION_LINES));
    }
}

/// One decimal, `+` for non-negative values, never `-0.0`.
pub fn signed_delta(delta: f64) -> String {
    let mut rounded = (delta * 10.0).round() / 10.0;
    if rounded == 0.0 {
        rounded = 0.0;
    }
    let sign = if rounded >= 0.0 { "+" } else { "" };
    format!("{sign}{rounded:.1}")
}

pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

fn num(x: f64) -> String {
    let rounded = (x * 10.0).round() / 10.0;
    format!("{rounded}")
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn truncate_chars(mut s: String, max_chars: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max_chars) {
        s.truncate(idx);
    }
    s
}
