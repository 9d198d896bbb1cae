//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the blob store, the controller and the UI layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel text for descriptive fields nobody filled in
pub const UNKNOWN_TEXT: &str = "未知";

/// Image shown for profiles created without a photo
pub const PLACEHOLDER_IMAGE_URL: &str = "https://picsum.photos/200";

/// Stable identifier of a profile, assigned once at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Generate a fresh, unique identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProfileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gender of a cat
///
/// Serialized with stable keys; older blobs stored the Chinese labels,
/// which are still accepted when loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[serde(alias = "公")]
    Male,
    #[serde(alias = "母")]
    Female,
    #[default]
    #[serde(alias = "未知")]
    Unknown,
}

impl Gender {
    pub const ALL: &'static [Gender] = &[Gender::Male, Gender::Female, Gender::Unknown];

    /// Localized label for rendering
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "公",
            Gender::Female => "母",
            Gender::Unknown => UNKNOWN_TEXT,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Last known condition of a cat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatStatus {
    #[serde(alias = "健康")]
    Healthy,
    #[serde(alias = "生病")]
    Sick,
    #[serde(alias = "受伤")]
    Injured,
    #[serde(alias = "已领养")]
    Adopted,
    #[serde(alias = "失踪")]
    Missing,
    #[default]
    #[serde(alias = "未知")]
    Unknown,
}

impl CatStatus {
    pub const ALL: &'static [CatStatus] = &[
        CatStatus::Healthy,
        CatStatus::Sick,
        CatStatus::Injured,
        CatStatus::Adopted,
        CatStatus::Missing,
        CatStatus::Unknown,
    ];

    /// Localized label for rendering
    pub fn label(self) -> &'static str {
        match self {
            CatStatus::Healthy => "健康",
            CatStatus::Sick => "生病",
            CatStatus::Injured => "受伤",
            CatStatus::Adopted => "已领养",
            CatStatus::Missing => "失踪",
            CatStatus::Unknown => UNKNOWN_TEXT,
        }
    }
}

impl fmt::Display for CatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One known stray cat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatProfile {
    /// Unique, immutable identifier
    pub id: ProfileId,
    /// Nickname (e.g., "大白")
    pub name: String,
    /// Where the cat is usually seen (e.g., "芙蓉隧道口")
    pub location: String,
    pub breed: String,
    pub color: String,
    pub estimated_age: String,
    pub gender: Gender,
    pub status: CatStatus,
    /// Distinctive markings
    pub features: String,
    /// Remote URL or embedded `data:` image
    pub image_url: String,
    /// Unix timestamp in milliseconds; set on creation, not bumped by edits
    pub last_seen: i64,
    pub notes: String,
}

/// Structured attributes proposed by the vision service for one photo
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisResult {
    pub breed: String,
    pub color: String,
    pub estimated_age: String,
    pub features: String,
    pub health_assessment: String,
    pub name_suggestions: Vec<String>,
}

impl AnalysisResult {
    /// Notes text written into the draft: health check plus name ideas
    pub fn notes(&self) -> String {
        format!(
            "{}\n推荐名字: {}",
            self.health_assessment,
            self.name_suggestions.join(", ")
        )
    }
}

/// The two built-in sample profiles used when nothing has been stored yet
pub fn seed_profiles(now_ms: i64) -> Vec<CatProfile> {
    const HOUR_MS: i64 = 3_600_000;
    const DAY_MS: i64 = 24 * HOUR_MS;

    vec![
        CatProfile {
            id: ProfileId::from("1"),
            name: "大白".to_string(),
            location: "芙蓉隧道口".to_string(),
            breed: "中华田园猫（白猫）".to_string(),
            color: "全白".to_string(),
            estimated_age: "3岁".to_string(),
            gender: Gender::Male,
            status: CatStatus::Healthy,
            features: "眼睛异色，左耳微缺".to_string(),
            image_url: "https://picsum.photos/id/40/500/500".to_string(),
            last_seen: now_ms - 2 * DAY_MS,
            notes: "性格温顺，喜欢吃火腿肠".to_string(),
        },
        CatProfile {
            id: ProfileId::from("2"),
            name: "警长".to_string(),
            location: "图书馆东门".to_string(),
            breed: "黑白猫".to_string(),
            color: "黑白".to_string(),
            estimated_age: "1.5岁".to_string(),
            gender: Gender::Female,
            status: CatStatus::Sick,
            features: "鼻子上有黑点，像警长胡子".to_string(),
            image_url: "https://picsum.photos/id/219/500/500".to_string(),
            last_seen: now_ms - 4 * HOUR_MS,
            notes: "最近有点拉肚子，已喂药".to_string(),
        },
    ]
}
