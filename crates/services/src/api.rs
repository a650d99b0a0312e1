//! Typed access to the progress and quiz endpoints.
//!
//! The backend is eventually consistent and loosely schemad: individual
//! records can carry missing or mistyped fields. Decoding is therefore
//! lenient end to end: bad fields coerce to empty defaults, bad records are
//! skipped with a warning, and list bodies that are not lists decode to the
//! empty list. Only transport failures and non-2xx statuses propagate.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use taleem_core::model::{
    Category, CompletedItem, QuizAttempt, QuizCatalogEntry, QuizCategoryProgress,
    QuizProgressSummary,
};

use crate::config::ApiConfig;
use crate::error::ApiError;

//
// ─── API CONTRACT ──────────────────────────────────────────────────────────────
//

/// Contract for the progress backend.
///
/// Services depend on this trait rather than on the HTTP client so tests can
/// run against in-memory fakes.
#[async_trait]
pub trait ProgressApi: Send + Sync {
    /// Completed stories for a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn story_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<CompletedItem>, ApiError>;

    /// Completed kalmas for a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn kalma_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<CompletedItem>, ApiError>;

    /// Completed duas for a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn dua_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<CompletedItem>, ApiError>;

    /// Completed namaz lessons for a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn namaz_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<CompletedItem>, ApiError>;

    /// Server-side pre-aggregated quiz summary for a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn quiz_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<QuizProgressSummary, ApiError>;

    /// Raw quiz attempts for a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn quiz_scores(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<QuizAttempt>, ApiError>;

    /// The quiz catalog, grouped by category. Unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn quiz_catalog(&self) -> Result<Vec<QuizCatalogEntry>, ApiError>;
}

//
// ─── HTTP CLIENT ───────────────────────────────────────────────────────────────
//

/// [`ProgressApi`] implementation over the real backend.
#[derive(Clone)]
pub struct HttpProgressApi {
    client: Client,
    config: ApiConfig,
}

impl HttpProgressApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn get_json(&self, url: String, auth_token: Option<&str>) -> Result<Value, ApiError> {
        let mut request = self.client.get(url);
        if let Some(token) = auth_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn category_items(
        &self,
        category: Category,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Value, ApiError> {
        let url = format!(
            "{}/progress/{}progress/{}",
            self.base(),
            category.as_str(),
            user_id
        );
        self.get_json(url, Some(auth_token)).await
    }
}

#[async_trait]
impl ProgressApi for HttpProgressApi {
    async fn story_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<CompletedItem>, ApiError> {
        let body = self
            .category_items(Category::Story, user_id, auth_token)
            .await?;
        Ok(map_list(body, "storyprogress", LessonItemDto::into_item))
    }

    async fn kalma_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<CompletedItem>, ApiError> {
        let body = self
            .category_items(Category::Kalma, user_id, auth_token)
            .await?;
        Ok(map_list(body, "kalmaprogress", LessonItemDto::into_item))
    }

    async fn dua_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<CompletedItem>, ApiError> {
        let body = self
            .category_items(Category::Dua, user_id, auth_token)
            .await?;
        Ok(map_list(body, "duaprogress", DuaItemDto::into_item))
    }

    async fn namaz_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<CompletedItem>, ApiError> {
        let body = self
            .category_items(Category::Namaz, user_id, auth_token)
            .await?;
        Ok(map_list(body, "namazprogress", NamazItemDto::into_item))
    }

    async fn quiz_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<QuizProgressSummary, ApiError> {
        let body = self
            .category_items(Category::Quiz, user_id, auth_token)
            .await?;
        let dto: QuizSummaryDto = decode_or_default(body, "quizprogress");
        Ok(dto.into_summary())
    }

    async fn quiz_scores(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<QuizAttempt>, ApiError> {
        let url = format!("{}/quiz/scores/{}", self.base(), user_id);
        let body = self.get_json(url, Some(auth_token)).await?;
        let wrapper: ScoresDto = decode_or_default(body, "quiz/scores");
        Ok(map_list(wrapper.scores, "quiz/scores", ScoreDto::into_attempt))
    }

    async fn quiz_catalog(&self) -> Result<Vec<QuizCatalogEntry>, ApiError> {
        let url = format!("{}/quiz/quizzes", self.base());
        let body = self.get_json(url, None).await?;
        Ok(map_list(body, "quiz/quizzes", CatalogEntryDto::into_entry))
    }
}

//
// ─── LENIENT DECODING ──────────────────────────────────────────────────────────
//

fn decode_list<T: DeserializeOwned>(body: Value, endpoint: &'static str) -> Vec<T> {
    let Value::Array(values) = body else {
        if !body.is_null() {
            warn!(endpoint, "expected a list body, treating as empty");
        }
        return Vec::new();
    };
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(error) => {
                warn!(endpoint, %error, "skipping malformed record");
                None
            }
        })
        .collect()
}

fn map_list<T: DeserializeOwned, U>(
    body: Value,
    endpoint: &'static str,
    into_domain: fn(T) -> U,
) -> Vec<U> {
    decode_list::<T>(body, endpoint)
        .into_iter()
        .map(into_domain)
        .collect()
}

fn decode_or_default<T: DeserializeOwned + Default>(body: Value, endpoint: &'static str) -> T {
    match serde_json::from_value(body) {
        Ok(decoded) => decoded,
        Err(error) => {
            warn!(endpoint, %error, "malformed body, using empty defaults");
            T::default()
        }
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(coerce_string(&Value::deserialize(deserializer)?))
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = coerce_string(&Value::deserialize(deserializer)?);
    Ok((!text.is_empty()).then_some(text))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_title<'de, D>(deserializer: D) -> Result<TitleDto, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::String(text) => TitleDto {
            en: text.clone(),
            ur: String::new(),
        },
        Value::Object(map) => TitleDto {
            en: map.get("en").map(coerce_string).unwrap_or_default(),
            ur: map.get("ur").map(coerce_string).unwrap_or_default(),
        },
        _ => TitleDto::default(),
    })
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

/// Story and kalma progress records share one shape.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LessonItemDto {
    #[serde(deserialize_with = "lenient_string")]
    title: String,
    #[serde(deserialize_with = "lenient_opt_string")]
    title_urdu: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    completion_date: Option<String>,
}

impl LessonItemDto {
    fn into_item(self) -> CompletedItem {
        CompletedItem {
            title: self.title,
            title_urdu: self.title_urdu,
            detail: None,
            completed_on: self.completion_date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DuaItemDto {
    #[serde(deserialize_with = "lenient_string")]
    topic: String,
    #[serde(deserialize_with = "lenient_opt_string")]
    topic_urdu: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    completion_date: Option<String>,
}

impl DuaItemDto {
    fn into_item(self) -> CompletedItem {
        CompletedItem {
            title: self.topic,
            title_urdu: self.topic_urdu,
            detail: None,
            completed_on: self.completion_date,
        }
    }
}

/// Namaz records name the memorized dua plus the prayer it belongs to.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NamazItemDto {
    #[serde(deserialize_with = "lenient_string")]
    dua: String,
    #[serde(deserialize_with = "lenient_opt_string")]
    category: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    completion_date: Option<String>,
}

impl NamazItemDto {
    fn into_item(self) -> CompletedItem {
        CompletedItem {
            title: self.dua,
            title_urdu: None,
            detail: self.category,
            completed_on: self.completion_date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct QuizSummaryDto {
    #[serde(deserialize_with = "lenient_u32")]
    total_quizzes: u32,
    #[serde(deserialize_with = "lenient_u32")]
    attempted_quizzes: u32,
    category_progress: Value,
}

impl QuizSummaryDto {
    fn into_summary(self) -> QuizProgressSummary {
        QuizProgressSummary {
            total_quizzes: self.total_quizzes,
            attempted_quizzes: self.attempted_quizzes,
            categories: map_list(
                self.category_progress,
                "quizprogress",
                QuizCategoryDto::into_progress,
            ),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct QuizCategoryDto {
    #[serde(deserialize_with = "lenient_string")]
    category: String,
    #[serde(deserialize_with = "lenient_u32")]
    total_quizzes: u32,
    #[serde(deserialize_with = "lenient_u32")]
    attempted_quizzes: u32,
    #[serde(deserialize_with = "lenient_f64")]
    question_completion_percentage: f64,
}

impl QuizCategoryDto {
    fn into_progress(self) -> QuizCategoryProgress {
        QuizCategoryProgress {
            category: self.category,
            total_quizzes: self.total_quizzes,
            attempted_quizzes: self.attempted_quizzes,
            question_completion_percentage: self.question_completion_percentage,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScoresDto {
    scores: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScoreDto {
    #[serde(deserialize_with = "lenient_string")]
    quiz_id: String,
    #[serde(deserialize_with = "lenient_string")]
    category: String,
    #[serde(deserialize_with = "lenient_u32")]
    score: u32,
    #[serde(deserialize_with = "lenient_u32")]
    total_questions: u32,
    #[serde(deserialize_with = "lenient_f64")]
    percentage: f64,
    #[serde(deserialize_with = "lenient_opt_string")]
    attempt_date: Option<String>,
}

impl ScoreDto {
    fn into_attempt(self) -> QuizAttempt {
        QuizAttempt {
            quiz_id: self.quiz_id,
            category: self.category,
            score: self.score,
            total_questions: self.total_questions,
            percentage: self.percentage,
            attempted_on: self.attempt_date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CatalogEntryDto {
    #[serde(deserialize_with = "lenient_string")]
    quiz_id: String,
    #[serde(deserialize_with = "lenient_string")]
    category: String,
    #[serde(deserialize_with = "lenient_title")]
    title: TitleDto,
}

#[derive(Debug, Default, Deserialize)]
struct TitleDto {
    en: String,
    ur: String,
}

impl CatalogEntryDto {
    fn into_entry(self) -> QuizCatalogEntry {
        QuizCatalogEntry {
            quiz_id: self.quiz_id,
            category: self.category,
            title_en: self.title.en,
            title_ur: self.title.ur,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
