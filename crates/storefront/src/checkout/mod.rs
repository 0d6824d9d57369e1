//! Checkout sidebar: draft form state, UI shell and purchase confirmation.
//!
//! # Pieces
//!
//! - [`CheckoutDraftHandle`] - the visitor's card/address draft, reachable only
//!   through a session (as an extractor or via [`CheckoutDraftHandle::load`])
//! - [`UiShell`] / [`SessionShell`] - sidebar navigation and the loading flag
//! - [`confirm_purchase`] - the submit sequence run when the shopper confirms
//! - [`CheckoutSummary`] - totals and button state derived on every render

pub mod draft;
pub mod flow;
pub mod shell;
pub mod summary;

pub use draft::{CheckoutDraftHandle, DraftRejection};
pub use flow::{SubmitOutcome, confirm_purchase};
pub use shell::{SessionShell, SidebarState, UiShell};
pub use summary::{CheckoutSummary, LineItemView, submit_disabled};

/// Error raised when session-backed checkout state cannot be read or written.
pub type StateError = tower_sessions::session::Error;
