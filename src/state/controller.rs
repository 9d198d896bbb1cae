//! View-state controller
//!
//! Finite state machine over the catalog's screens. It owns the transient
//! form draft, the search term and the capture status, and calls into the
//! `Library` on save and delete. Asynchronous work (photo preparation,
//! analysis) is requested through returned `Effect`s; the iced shell runs
//! them and reports back with the generation number they were issued with.

use std::path::PathBuf;

use super::data::{AnalysisResult, CatProfile, CatStatus, Gender, ProfileId};
use super::draft::{CatDraft, DraftField};
use super::library::Library;
use crate::analysis::AnalysisError;
use crate::error::StoreError;
use crate::photo::PhotoError;

/// Inline message shown when the photo could not be prepared or analyzed
pub const ANALYSIS_FAILED_MESSAGE: &str = "AI 识别失败，请手动输入信息。";

/// The screens of the application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    /// List and search
    #[default]
    Home,
    /// Photo chooser
    AddPhoto,
    /// New-profile form, possibly while analysis is running
    AddDetails,
    /// Read view of one profile
    Detail(ProfileId),
    /// Form pre-filled from an existing profile
    Edit(ProfileId),
}

/// Background work the shell must run on the controller's behalf
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Read and compress the photo at `path`
    PreparePhoto { path: PathBuf, generation: u64 },
    /// Send the prepared image to the vision service
    Analyze { image: String, generation: u64 },
}

#[derive(Debug, Default)]
pub struct Controller {
    view: View,
    search_term: String,
    draft: CatDraft,
    analyzing: bool,
    analysis_error: Option<String>,
    /// Bumped on every capture and whenever the add form is left;
    /// results tagged with an older value are dropped
    generation: u64,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn draft(&self) -> &CatDraft {
        &self.draft
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn analysis_error(&self) -> Option<&str> {
        self.analysis_error.as_deref()
    }

    /// Whether the form currently holds enough to be saved
    pub fn can_save(&self) -> bool {
        self.draft.validate().is_ok()
    }

    /// The profile shown by the detail or edit view
    pub fn selected<'a>(&self, library: &'a Library) -> Option<&'a CatProfile> {
        match &self.view {
            View::Detail(id) | View::Edit(id) => library.find(id),
            _ => None,
        }
    }

    /// Profiles to show on the home screen
    pub fn visible<'a>(&self, library: &'a Library) -> Vec<&'a CatProfile> {
        library.search(&self.search_term)
    }

    pub fn set_search(&mut self, term: String) {
        self.search_term = term;
    }

    /// Home → AddPhoto
    pub fn register(&mut self) {
        if self.view == View::Home {
            self.transition(View::AddPhoto);
        }
    }

    /// AddPhoto → AddDetails, immediately; preparation and analysis follow.
    /// Also accepted on AddDetails to retry with another photo.
    pub fn photo_selected(&mut self, path: PathBuf) -> Option<Effect> {
        if !matches!(self.view, View::AddPhoto | View::AddDetails) {
            return None;
        }

        self.generation += 1;
        self.analyzing = true;
        self.analysis_error = None;
        self.transition(View::AddDetails);

        Some(Effect::PreparePhoto {
            path,
            generation: self.generation,
        })
    }

    /// The compressed photo is ready (or failed); on success analysis is next
    pub fn photo_prepared(
        &mut self,
        generation: u64,
        result: Result<String, PhotoError>,
    ) -> Option<Effect> {
        if !self.is_current(generation) {
            tracing::debug!(generation, "Dropping stale photo");
            return None;
        }

        match result {
            Ok(image) => {
                self.draft.image_url = Some(image.clone());
                Some(Effect::Analyze { image, generation })
            }
            Err(e) => {
                tracing::error!(error = %e, "Photo preparation failed");
                self.fail_capture();
                None
            }
        }
    }

    /// Merge the analysis into the draft, or surface the failure inline
    pub fn analysis_finished(
        &mut self,
        generation: u64,
        result: Result<AnalysisResult, AnalysisError>,
    ) {
        if !self.is_current(generation) {
            tracing::debug!(generation, "Dropping stale analysis result");
            return;
        }

        match result {
            Ok(analysis) => {
                self.draft.merge_analysis(&analysis);
                self.analyzing = false;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cat analysis failed");
                self.fail_capture();
            }
        }
    }

    /// Home → Detail(id), only for ids present in the library
    pub fn select(&mut self, id: ProfileId, library: &Library) {
        if self.view == View::Home && library.find(&id).is_some() {
            self.transition(View::Detail(id));
        }
    }

    /// Detail → Edit, with the draft pre-filled from the profile
    pub fn start_edit(&mut self, library: &Library) {
        let View::Detail(id) = &self.view else {
            return;
        };
        let Some(profile) = library.find(id) else {
            return;
        };

        self.draft = CatDraft::from_profile(profile);
        let id = id.clone();
        self.transition(View::Edit(id));
    }

    pub fn edit_field(&mut self, field: DraftField, value: String) {
        self.draft.set_field(field, value);
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.draft.gender = Some(gender);
    }

    pub fn set_status(&mut self, status: CatStatus) {
        self.draft.status = Some(status);
    }

    /// Create (AddDetails) or update (Edit) from the draft, then go home.
    /// A draft without name or location is rejected with no change at all.
    pub fn save(&mut self, library: &mut Library) -> Result<(), StoreError> {
        match &self.view {
            View::AddDetails => {
                self.draft.validate()?;
                library.create(self.draft.clone())?;
            }
            View::Edit(id) => {
                self.draft.validate()?;
                library.update(id, self.draft.clone())?;
            }
            _ => return Ok(()),
        }

        self.draft.reset();
        self.go_home();
        Ok(())
    }

    /// Delete the profile on the detail view once the user confirmed.
    /// Returns whether the delete went through.
    pub fn delete_selected(&mut self, confirmed: bool, library: &mut Library) -> bool {
        let View::Detail(id) = &self.view else {
            return false;
        };
        if !confirmed {
            return false;
        }

        library.delete(id);
        self.go_home();
        true
    }

    /// Back/cancel from anywhere; drops the draft and any pending capture
    pub fn go_home(&mut self) {
        if self.view == View::AddDetails {
            self.generation += 1;
        }
        if !self.draft.is_empty() {
            tracing::debug!(view = ?self.view, "Discarding unsaved draft");
        }
        self.draft.reset();
        self.analyzing = false;
        self.analysis_error = None;
        self.transition(View::Home);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.view == View::AddDetails && generation == self.generation
    }

    fn fail_capture(&mut self) {
        self.analyzing = false;
        self.analysis_error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
    }

    fn transition(&mut self, next: View) {
        tracing::debug!(from = ?self.view, to = ?next, "View transition");
        self.view = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CatAnalyzer;
    use crate::error::ValidationError;
    use crate::photo;
    use crate::state::persistence::MemoryBlobStore;
    use async_trait::async_trait;

    fn library() -> Library {
        Library::open(Box::new(MemoryBlobStore::new())).unwrap()
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            breed: "狸花猫".to_string(),
            color: "棕色虎斑".to_string(),
            estimated_age: "幼猫".to_string(),
            features: "耳尖有剪耳标记".to_string(),
            health_assessment: "毛色光亮".to_string(),
            name_suggestions: vec!["花花".to_string(), "虎子".to_string()],
        }
    }

    /// Start a capture and return the generation it was issued with
    fn start_capture(controller: &mut Controller) -> u64 {
        controller.register();
        match controller.photo_selected(PathBuf::from("cat.jpg")) {
            Some(Effect::PreparePhoto { generation, .. }) => generation,
            other => panic!("expected PreparePhoto, got {:?}", other),
        }
    }

    #[test]
    fn test_initial_state_is_home() {
        let controller = Controller::new();
        assert_eq!(controller.view(), &View::Home);
        assert!(controller.draft().is_empty());
        assert!(!controller.is_analyzing());
    }

    #[test]
    fn test_photo_selection_moves_to_form_before_analysis() {
        let mut controller = Controller::new();
        let generation = start_capture(&mut controller);

        assert_eq!(controller.view(), &View::AddDetails);
        assert!(controller.is_analyzing());

        let effect = controller.photo_prepared(generation, Ok("data:image/jpeg;base64,AAAA".into()));
        assert_eq!(
            effect,
            Some(Effect::Analyze {
                image: "data:image/jpeg;base64,AAAA".to_string(),
                generation
            })
        );
        assert_eq!(controller.view(), &View::AddDetails);

        controller.analysis_finished(generation, Ok(analysis()));
        assert!(!controller.is_analyzing());
        assert_eq!(controller.draft().field(DraftField::Breed), "狸花猫");
        assert_eq!(
            controller.draft().field(DraftField::Notes),
            "毛色光亮\n推荐名字: 花花, 虎子"
        );
    }

    #[test]
    fn test_photo_selection_ignored_on_home() {
        let mut controller = Controller::new();
        assert_eq!(controller.photo_selected(PathBuf::from("cat.jpg")), None);
        assert_eq!(controller.view(), &View::Home);
    }

    #[test]
    fn test_analysis_failure_degrades_gracefully() {
        let mut controller = Controller::new();
        let mut library = library();
        let generation = start_capture(&mut controller);

        controller.photo_prepared(generation, Ok("data:image/jpeg;base64,AAAA".into()));
        controller.analysis_finished(
            generation,
            Err(AnalysisError::Network("connection reset".to_string())),
        );

        assert_eq!(controller.view(), &View::AddDetails);
        assert_eq!(controller.analysis_error(), Some(ANALYSIS_FAILED_MESSAGE));
        assert!(!controller.is_analyzing());
        assert_eq!(
            controller.draft().image_url.as_deref(),
            Some("data:image/jpeg;base64,AAAA")
        );

        controller.edit_field(DraftField::Name, "无名".to_string());
        controller.edit_field(DraftField::Location, "思源谷".to_string());
        assert!(controller.can_save());
        controller.save(&mut library).unwrap();

        assert_eq!(controller.view(), &View::Home);
        assert_eq!(library.list()[0].name, "无名");
        assert_eq!(library.list()[0].image_url, "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_photo_failure_keeps_form_usable() {
        let mut controller = Controller::new();
        let generation = start_capture(&mut controller);
        controller.edit_field(DraftField::Name, "小灰".to_string());

        let effect = controller.photo_prepared(
            generation,
            Err(PhotoError::Decode("not an image".to_string())),
        );

        assert_eq!(effect, None);
        assert_eq!(controller.analysis_error(), Some(ANALYSIS_FAILED_MESSAGE));
        assert_eq!(controller.draft().field(DraftField::Name), "小灰");
        assert_eq!(controller.view(), &View::AddDetails);
    }

    #[test]
    fn test_stale_result_after_leaving_is_dropped() {
        let mut controller = Controller::new();
        let generation = start_capture(&mut controller);

        controller.go_home();
        controller.analysis_finished(generation, Ok(analysis()));

        assert_eq!(controller.view(), &View::Home);
        assert!(controller.draft().is_empty());

        // A new capture must not accept the old result either
        let next = start_capture(&mut controller);
        assert_ne!(next, generation);
        controller.analysis_finished(generation, Ok(analysis()));
        assert!(controller.is_analyzing());
        assert_eq!(controller.draft().breed, None);
    }

    #[test]
    fn test_save_rejected_without_required_fields() {
        let mut controller = Controller::new();
        let mut library = library();
        start_capture(&mut controller);
        controller.edit_field(DraftField::Name, "小花".to_string());

        assert!(!controller.can_save());
        assert!(controller.save(&mut library).is_err());
        assert_eq!(controller.view(), &View::AddDetails);
        assert_eq!(library.len(), 2);
        assert_eq!(controller.draft().field(DraftField::Name), "小花");
    }

    #[test]
    fn test_edit_save_rejected_when_required_field_cleared() {
        let mut controller = Controller::new();
        let mut library = library();
        let id = ProfileId::from("2");
        let before = library.find(&id).unwrap().clone();

        controller.select(id.clone(), &library);
        controller.start_edit(&library);
        controller.edit_field(DraftField::Name, String::new());

        assert!(!controller.can_save());
        assert!(matches!(
            controller.save(&mut library),
            Err(StoreError::Validation(ValidationError::MissingName))
        ));
        assert_eq!(controller.view(), &View::Edit(id.clone()));
        assert_eq!(library.find(&id), Some(&before));

        controller.edit_field(DraftField::Name, "警长".to_string());
        controller.edit_field(DraftField::Location, String::new());
        assert!(matches!(
            controller.save(&mut library),
            Err(StoreError::Validation(ValidationError::MissingLocation))
        ));
        assert_eq!(controller.view(), &View::Edit(id.clone()));
        assert_eq!(library.find(&id), Some(&before));
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut controller = Controller::new();
        let mut library = library();
        start_capture(&mut controller);
        controller.edit_field(DraftField::Name, "小花".to_string());
        controller.edit_field(DraftField::Location, "海韵".to_string());

        controller.go_home();

        assert_eq!(controller.view(), &View::Home);
        assert!(controller.draft().is_empty());
        controller.save(&mut library).unwrap();
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn test_edit_flow_updates_in_place() {
        let mut controller = Controller::new();
        let mut library = library();
        let id = ProfileId::from("1");
        let before = library.find(&id).unwrap().clone();

        controller.select(id.clone(), &library);
        assert_eq!(controller.view(), &View::Detail(id.clone()));
        assert_eq!(controller.selected(&library), Some(&before));

        controller.start_edit(&library);
        assert_eq!(controller.view(), &View::Edit(id.clone()));
        assert_eq!(controller.draft().field(DraftField::Name), "大白");

        controller.set_status(CatStatus::Injured);
        controller.save(&mut library).unwrap();

        let after = library.find(&id).unwrap();
        assert_eq!(controller.view(), &View::Home);
        assert_eq!(after.status, CatStatus::Injured);
        assert_eq!(after.last_seen, before.last_seen);
        assert_eq!(library.list()[0].id, id);
    }

    #[test]
    fn test_select_unknown_id_stays_home() {
        let mut controller = Controller::new();
        let library = library();
        controller.select(ProfileId::from("ghost"), &library);
        assert_eq!(controller.view(), &View::Home);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut controller = Controller::new();
        let mut library = library();
        let id = ProfileId::from("2");
        controller.select(id.clone(), &library);

        assert!(!controller.delete_selected(false, &mut library));
        assert_eq!(controller.view(), &View::Detail(id.clone()));
        assert_eq!(library.len(), 2);

        assert!(controller.delete_selected(true, &mut library));
        assert_eq!(controller.view(), &View::Home);
        assert!(library.find(&id).is_none());
    }

    #[test]
    fn test_search_filters_visible_profiles() {
        let mut controller = Controller::new();
        let library = library();

        controller.set_search("图书馆".to_string());
        let visible = controller.visible(&library);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "警长");

        controller.set_search(String::new());
        assert_eq!(controller.visible(&library).len(), 2);
    }

    struct OfflineAnalyzer;

    #[async_trait]
    impl CatAnalyzer for OfflineAnalyzer {
        async fn analyze(&self, _image: &str) -> Result<AnalysisResult, AnalysisError> {
            Err(AnalysisError::Network("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_capture_pipeline_with_failing_service() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        image::RgbImage::from_pixel(64, 48, image::Rgb([200, 120, 40]))
            .save(&path)
            .unwrap();

        let mut controller = Controller::new();
        controller.register();
        let Some(Effect::PreparePhoto { path, generation }) = controller.photo_selected(path)
        else {
            panic!("expected PreparePhoto");
        };

        let prepared = photo::prepare_photo(path, photo::PhotoSettings::default()).await;
        let Some(Effect::Analyze { image, generation }) =
            controller.photo_prepared(generation, prepared)
        else {
            panic!("expected Analyze");
        };

        let result = OfflineAnalyzer.analyze(&image).await;
        controller.analysis_finished(generation, result);

        assert!(controller
            .draft()
            .image_url
            .as_deref()
            .is_some_and(|url| url.starts_with("data:image/jpeg;base64,")));
        assert_eq!(controller.analysis_error(), Some(ANALYSIS_FAILED_MESSAGE));
    }
}
