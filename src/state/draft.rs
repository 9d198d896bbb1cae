//! In-progress profile data for the add and edit forms
//!
//! A draft holds every profile field as optional. It starts empty (new cat)
//! or filled from an existing profile (edit), collects user input and
//! analysis results, and is finalized into a `CatProfile` or applied as a
//! shallow patch on save.

use super::data::{
    AnalysisResult, CatProfile, CatStatus, Gender, ProfileId, PLACEHOLDER_IMAGE_URL,
    UNKNOWN_TEXT,
};
use crate::error::ValidationError;

/// Free-text fields a form can edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Location,
    Breed,
    Color,
    EstimatedAge,
    Features,
    Notes,
}

/// Partial profile; `None` means "not provided"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatDraft {
    pub name: Option<String>,
    pub location: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub estimated_age: Option<String>,
    pub gender: Option<Gender>,
    pub status: Option<CatStatus>,
    pub features: Option<String>,
    pub image_url: Option<String>,
    pub last_seen: Option<i64>,
    pub notes: Option<String>,
}

impl CatDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill every field from an existing profile
    pub fn from_profile(profile: &CatProfile) -> Self {
        Self {
            name: Some(profile.name.clone()),
            location: Some(profile.location.clone()),
            breed: Some(profile.breed.clone()),
            color: Some(profile.color.clone()),
            estimated_age: Some(profile.estimated_age.clone()),
            gender: Some(profile.gender),
            status: Some(profile.status),
            features: Some(profile.features.clone()),
            image_url: Some(profile.image_url.clone()),
            last_seen: Some(profile.last_seen),
            notes: Some(profile.notes.clone()),
        }
    }

    /// Current text of a field, empty when unset
    pub fn field(&self, field: DraftField) -> &str {
        self.slot(field).as_deref().unwrap_or("")
    }

    pub fn set_field(&mut self, field: DraftField, value: String) {
        *self.slot_mut(field) = Some(value);
    }

    fn slot(&self, field: DraftField) -> &Option<String> {
        match field {
            DraftField::Name => &self.name,
            DraftField::Location => &self.location,
            DraftField::Breed => &self.breed,
            DraftField::Color => &self.color,
            DraftField::EstimatedAge => &self.estimated_age,
            DraftField::Features => &self.features,
            DraftField::Notes => &self.notes,
        }
    }

    fn slot_mut(&mut self, field: DraftField) -> &mut Option<String> {
        match field {
            DraftField::Name => &mut self.name,
            DraftField::Location => &mut self.location,
            DraftField::Breed => &mut self.breed,
            DraftField::Color => &mut self.color,
            DraftField::EstimatedAge => &mut self.estimated_age,
            DraftField::Features => &mut self.features,
            DraftField::Notes => &mut self.notes,
        }
    }

    /// Copy the vision service's proposal into the draft
    pub fn merge_analysis(&mut self, analysis: &AnalysisResult) {
        self.breed = Some(analysis.breed.clone());
        self.color = Some(analysis.color.clone());
        self.estimated_age = Some(analysis.estimated_age.clone());
        self.features = Some(analysis.features.clone());
        self.notes = Some(analysis.notes());
    }

    /// Name and location must both be present and non-empty
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.name) {
            return Err(ValidationError::MissingName);
        }
        if is_blank(&self.location) {
            return Err(ValidationError::MissingLocation);
        }
        Ok(())
    }

    /// Check only the fields a patch actually sets
    pub fn validate_patch(&self) -> Result<(), ValidationError> {
        if self.name.is_some() && is_blank(&self.name) {
            return Err(ValidationError::MissingName);
        }
        if self.location.is_some() && is_blank(&self.location) {
            return Err(ValidationError::MissingLocation);
        }
        Ok(())
    }

    /// Finalize into a complete profile, filling defaults for absent fields
    pub fn into_profile(self, id: ProfileId, now_ms: i64) -> Result<CatProfile, ValidationError> {
        self.validate()?;

        Ok(CatProfile {
            id,
            name: self.name.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            breed: text_or_unknown(self.breed),
            color: text_or_unknown(self.color),
            estimated_age: text_or_unknown(self.estimated_age),
            gender: self.gender.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            features: self.features.unwrap_or_default(),
            image_url: self
                .image_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            last_seen: now_ms,
            notes: self.notes.unwrap_or_default(),
        })
    }

    /// Shallow merge: every provided field overwrites, the rest is kept
    pub fn apply_to(&self, profile: &mut CatProfile) {
        fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        merge(&mut profile.name, &self.name);
        merge(&mut profile.location, &self.location);
        merge(&mut profile.breed, &self.breed);
        merge(&mut profile.color, &self.color);
        merge(&mut profile.estimated_age, &self.estimated_age);
        merge(&mut profile.gender, &self.gender);
        merge(&mut profile.status, &self.status);
        merge(&mut profile.features, &self.features);
        merge(&mut profile.image_url, &self.image_url);
        merge(&mut profile.last_seen, &self.last_seen);
        merge(&mut profile.notes, &self.notes);
    }

    /// Check if nothing has been entered yet
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drop everything entered so far
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn text_or_unknown(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_TEXT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::seed_profiles;

    fn named(name: &str, location: &str) -> CatDraft {
        let mut draft = CatDraft::new();
        draft.set_field(DraftField::Name, name.to_string());
        draft.set_field(DraftField::Location, location.to_string());
        draft
    }

    #[test]
    fn test_default_is_empty() {
        assert!(CatDraft::default().is_empty());
        assert!(!named("小橘", "西村").is_empty());
    }

    #[test]
    fn test_validation_requires_name_and_location() {
        assert_eq!(CatDraft::new().validate(), Err(ValidationError::MissingName));
        assert_eq!(
            named("小橘", "").validate(),
            Err(ValidationError::MissingLocation)
        );
        // Only the empty string counts as missing
        assert_eq!(named("   ", "西村").validate(), Ok(()));
        assert_eq!(named("小橘", " ").validate(), Ok(()));
        assert_eq!(named("小橘", "西村").validate(), Ok(()));
    }

    #[test]
    fn test_finalize_fills_defaults() {
        let profile = named("小橘", "西村")
            .into_profile(ProfileId::from("x"), 42)
            .unwrap();

        assert_eq!(profile.breed, UNKNOWN_TEXT);
        assert_eq!(profile.color, UNKNOWN_TEXT);
        assert_eq!(profile.estimated_age, UNKNOWN_TEXT);
        assert_eq!(profile.gender, Gender::Unknown);
        assert_eq!(profile.status, CatStatus::Unknown);
        assert_eq!(profile.features, "");
        assert_eq!(profile.notes, "");
        assert_eq!(profile.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(profile.last_seen, 42);
    }

    #[test]
    fn test_patch_only_touches_provided_fields() {
        let original = seed_profiles(1_000).remove(0);
        let mut updated = original.clone();

        let patch = CatDraft {
            status: Some(CatStatus::Sick),
            ..Default::default()
        };
        patch.apply_to(&mut updated);

        assert_eq!(updated.status, CatStatus::Sick);
        updated.status = original.status;
        assert_eq!(updated, original);
    }

    #[test]
    fn test_merge_analysis_keeps_user_fields() {
        let mut draft = named("小橘", "西村");
        draft.image_url = Some("data:image/jpeg;base64,AAAA".to_string());

        draft.merge_analysis(&AnalysisResult {
            breed: "橘猫".to_string(),
            color: "橘白".to_string(),
            estimated_age: "成年".to_string(),
            features: "短尾".to_string(),
            health_assessment: "健康".to_string(),
            name_suggestions: vec!["橘子".to_string()],
        });

        assert_eq!(draft.field(DraftField::Name), "小橘");
        assert_eq!(draft.field(DraftField::Breed), "橘猫");
        assert_eq!(draft.field(DraftField::Notes), "健康\n推荐名字: 橘子");
        assert!(draft.image_url.is_some());
    }

    #[test]
    fn test_from_profile_round_trips_through_patch() {
        let original = seed_profiles(1_000).remove(1);
        let mut copy = original.clone();
        CatDraft::from_profile(&original).apply_to(&mut copy);
        assert_eq!(copy, original);
    }
}
