/// State management module
///
/// This module handles all application state, including:
/// - The profile collection and its blob store (library.rs, persistence.rs)
/// - Shared data structures (data.rs)
/// - Add/edit drafts (draft.rs)
/// - The view-state machine driving the screens (controller.rs)

pub mod controller;
pub mod data;
pub mod draft;
pub mod library;
pub mod persistence;
