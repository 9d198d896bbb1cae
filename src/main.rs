use iced::{Element, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analysis;
mod config;
mod error;
mod photo;
mod state;
mod ui;

use analysis::{run_analysis, AnalysisError, CatAnalyzer, GeminiAnalyzer};
use config::Config;
use error::AppError;
use photo::PhotoCache;
use state::controller::{Controller, Effect, View};
use state::data::{AnalysisResult, CatStatus, Gender, ProfileId};
use state::draft::DraftField;
use state::library::Library;
use state::persistence::{BlobStore, SqliteBlobStore};

/// Photo formats offered by the file picker
const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// Main application state
struct XmuCats {
    /// The profile collection
    library: Library,
    /// Current screen, draft and capture status
    controller: Controller,
    /// Decoded photos for display
    photos: PhotoCache,
    /// Vision service client; `None` if the HTTP client could not be built
    analyzer: Option<Arc<dyn CatAnalyzer>>,
    config: Config,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Back / cancel / home tab
    GoHome,
    /// "登记" pressed on the home screen
    Register,
    /// Open the native photo picker
    PickPhoto,
    /// A profile card was clicked
    Select(ProfileId),
    StartEdit,
    /// Delete pressed on the detail view; confirmation follows
    DeleteRequested,
    SearchChanged(String),
    FieldChanged(DraftField, String),
    GenderSelected(Gender),
    StatusSelected(CatStatus),
    Save,
    /// Background photo preparation finished
    PhotoPrepared(u64, Result<String, photo::PhotoError>),
    /// Background analysis finished
    AnalysisFinished(u64, Result<AnalysisResult, AnalysisError>),
    /// A remote photo was downloaded (or failed)
    PhotoLoaded(String, Result<Vec<u8>, photo::PhotoError>),
}

impl XmuCats {
    /// Create a new instance of the application
    fn new(config: Config) -> (Self, Task<Message>) {
        let library = match open_library(&config) {
            Ok(library) => library,
            Err(e) => {
                tracing::error!(error = %e, "Catalog storage unavailable, changes will not be saved");
                Library::in_memory()
            }
        };

        let analyzer = match GeminiAnalyzer::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_endpoint.clone(),
        ) {
            Ok(analyzer) => {
                if !analyzer.has_api_key() {
                    tracing::warn!("GEMINI_API_KEY is not set; photo analysis will fail and details must be entered manually");
                }
                Some(Arc::new(analyzer) as Arc<dyn CatAnalyzer>)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create analysis client");
                None
            }
        };

        tracing::info!(profiles = library.len(), "XMUCat initialized");

        let mut app = XmuCats {
            library,
            controller: Controller::new(),
            photos: PhotoCache::new(photo::cache::get_photo_cache_dir()),
            analyzer,
            config,
        };
        let task = app.load_photos();

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::GoHome => {
                self.controller.go_home();
                self.prune_photos();
            }
            Message::Register => self.controller.register(),
            Message::PickPhoto => {
                let file = FileDialog::new()
                    .set_title("选择猫咪照片")
                    .add_filter("图片", PHOTO_EXTENSIONS)
                    .pick_file();

                if let Some(path) = file {
                    if let Some(effect) = self.controller.photo_selected(path) {
                        return self.run(effect);
                    }
                }
            }
            Message::PhotoPrepared(generation, result) => {
                if let Some(effect) = self.controller.photo_prepared(generation, result) {
                    return Task::batch([self.load_photos(), self.run(effect)]);
                }
            }
            Message::AnalysisFinished(generation, result) => {
                self.controller.analysis_finished(generation, result);
            }
            Message::Select(id) => self.controller.select(id, &self.library),
            Message::StartEdit => self.controller.start_edit(&self.library),
            Message::DeleteRequested => {
                let answer = MessageDialog::new()
                    .set_level(MessageLevel::Warning)
                    .set_title("删除档案")
                    .set_description("确定要删除这份档案吗？")
                    .set_buttons(MessageButtons::YesNo)
                    .show();

                let confirmed = answer == MessageDialogResult::Yes;
                if self.controller.delete_selected(confirmed, &mut self.library) {
                    self.prune_photos();
                }
            }
            Message::SearchChanged(term) => self.controller.set_search(term),
            Message::FieldChanged(field, value) => self.controller.edit_field(field, value),
            Message::GenderSelected(gender) => self.controller.set_gender(gender),
            Message::StatusSelected(status) => self.controller.set_status(status),
            Message::Save => {
                if let Err(e) = self.controller.save(&mut self.library) {
                    tracing::debug!(error = %e, "Save rejected");
                }
                self.prune_photos();
                return self.load_photos();
            }
            Message::PhotoLoaded(url, result) => match result {
                Ok(bytes) => self.photos.insert(url, bytes),
                Err(e) => {
                    tracing::warn!(error = %e, url = %url, "Photo unavailable");
                    self.photos.mark_failed(url);
                }
            },
        }

        Task::none()
    }

    /// Turn a controller effect into a background task
    fn run(&self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::PreparePhoto { path, generation } => Task::perform(
                photo::prepare_photo(path, self.config.photo),
                move |result| Message::PhotoPrepared(generation, result),
            ),
            Effect::Analyze { image, generation } => match &self.analyzer {
                Some(analyzer) => Task::perform(
                    run_analysis(analyzer.clone(), image, self.config.analysis_timeout),
                    move |result| Message::AnalysisFinished(generation, result),
                ),
                None => Task::done(Message::AnalysisFinished(
                    generation,
                    Err(AnalysisError::Network("HTTP client unavailable".to_string())),
                )),
            },
        }
    }

    /// Start downloads for every photo that is not displayable yet
    fn load_photos(&mut self) -> Task<Message> {
        let urls: Vec<String> = self
            .library
            .list()
            .iter()
            .map(|p| p.image_url.clone())
            .chain(self.controller.draft().image_url.clone())
            .collect();

        let mut tasks = Vec::new();
        for url in urls {
            if !self.photos.request(&url) {
                continue;
            }

            let task = match self.photos.fetcher() {
                Some(fetcher) => Task::perform(fetcher.fetch(url.clone()), move |result| {
                    Message::PhotoLoaded(url.clone(), result)
                }),
                None => Task::done(Message::PhotoLoaded(
                    url,
                    Err(photo::PhotoError::Download("HTTP client unavailable".to_string())),
                )),
            };
            tasks.push(task);
        }

        Task::batch(tasks)
    }

    /// Forget photos of discarded drafts and deleted profiles
    fn prune_photos(&mut self) {
        if self.controller.view() != &View::Home {
            return;
        }

        let live = self
            .library
            .list()
            .iter()
            .map(|p| p.image_url.as_str())
            .chain(self.controller.draft().image_url.as_deref());
        self.photos.retain_only(live);
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        ui::view(&self.controller, &self.library, &self.photos)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

/// Open the SQLite-backed library, or a non-persistent one without a data dir
fn open_library(config: &Config) -> Result<Library, AppError> {
    let store: Box<dyn BlobStore> = match config.db_path.clone().or_else(SqliteBlobStore::default_path) {
        Some(path) => Box::new(SqliteBlobStore::open(&path)?),
        None => {
            tracing::warn!("No data directory found, profiles will not persist");
            Box::new(SqliteBlobStore::open_in_memory()?)
        }
    };

    Ok(Library::open(store)?)
}

fn main() -> iced::Result {
    let config = Config::from_env();
    let level = config
        .as_ref()
        .map(|c| c.log_level)
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(level.as_str().to_ascii_lowercase()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %AppError::from(e), "Invalid configuration");
            std::process::exit(1);
        }
    };

    iced::application("XMUCat 厦大猫咪图鉴", XmuCats::update, XmuCats::view)
        .theme(XmuCats::theme)
        .centered()
        .run_with(move || XmuCats::new(config))
}
