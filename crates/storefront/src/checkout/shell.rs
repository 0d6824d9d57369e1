//! Sidebar UI shell.
//!
//! The shell owns which sidebar panel is showing, whether it is open, the
//! "submitting" loading flag and any notice shown to the shopper. The
//! checkout flow only talks to it through [`UiShell`], so tests can swap in a
//! recording implementation.

use std::future::Future;

use acme_core::SidebarView;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::StateError;
use crate::models::session_keys;

/// Persisted sidebar state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarState {
    pub open: bool,
    pub view: SidebarView,
    /// Advisory loading flag; disables the confirm button while set.
    pub submitting: bool,
    /// Message for the shopper, e.g. a failed purchase.
    pub notice: Option<String>,
}

/// Navigation and status surface the checkout flow drives.
pub trait UiShell: Send + Sync {
    /// Show a sub-view, opening the sidebar if needed.
    fn set_sidebar_view(
        &self,
        view: SidebarView,
    ) -> impl Future<Output = Result<(), StateError>> + Send;

    /// Open the sidebar on its current view.
    fn open_sidebar(&self) -> impl Future<Output = Result<(), StateError>> + Send;

    /// Dismiss the sidebar.
    fn close_sidebar(&self) -> impl Future<Output = Result<(), StateError>> + Send;

    /// Whether a submission is marked as in flight.
    fn is_loading(&self) -> impl Future<Output = Result<bool, StateError>> + Send;

    /// Set or clear the in-flight marker. Other requests on the same session
    /// must see the change before this returns.
    fn set_loading(&self, loading: bool) -> impl Future<Output = Result<(), StateError>> + Send;

    /// Surface a message to the shopper.
    fn show_notice(&self, message: String) -> impl Future<Output = Result<(), StateError>> + Send;
}

/// [`UiShell`] backed by the visitor session.
#[derive(Debug, Clone)]
pub struct SessionShell {
    session: Session,
}

impl SessionShell {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Current sidebar state (default: closed, cart view).
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn state(&self) -> Result<SidebarState, StateError> {
        Ok(self
            .session
            .get::<SidebarState>(session_keys::SIDEBAR)
            .await?
            .unwrap_or_default())
    }

    async fn update<F>(&self, change: F) -> Result<(), StateError>
    where
        F: FnOnce(&mut SidebarState) + Send,
    {
        let mut state = self.state().await?;
        change(&mut state);
        self.session.insert(session_keys::SIDEBAR, &state).await
    }
}

impl UiShell for SessionShell {
    async fn set_sidebar_view(&self, view: SidebarView) -> Result<(), StateError> {
        self.update(|state| {
            state.open = true;
            state.view = view;
            state.notice = None;
        })
        .await
    }

    async fn open_sidebar(&self) -> Result<(), StateError> {
        self.update(|state| state.open = true).await
    }

    async fn close_sidebar(&self) -> Result<(), StateError> {
        self.update(|state| {
            state.open = false;
            state.view = SidebarView::CartView;
            state.notice = None;
        })
        .await
    }

    async fn is_loading(&self) -> Result<bool, StateError> {
        Ok(self.state().await?.submitting)
    }

    async fn set_loading(&self, loading: bool) -> Result<(), StateError> {
        self.update(|state| state.submitting = loading).await?;
        // The layer only persists after the response; write through now.
        self.session.save().await
    }

    async fn show_notice(&self, message: String) -> Result<(), StateError> {
        self.update(|state| state.notice = Some(message)).await
    }
}
