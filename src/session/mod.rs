//! Session lifecycle: establishing, restoring and recovering API sessions.
//!
//! # Architecture
//!
//! * [`manager`]: The [`SessionManager`] state machine (`initialize` / `refresh`).
//! * [`context`]: The validated [`SessionContext`] handed to callers.
//! * [`funding`]: Sandbox funding assist run after initialization.
//! * [`activity`]: Recent payments and requests for `overview`.
//! * [`callback`]: Callback URL registration.
//! * [`error`]: The [`SessionError`] taxonomy.

pub mod activity;
pub mod callback;
pub mod context;
pub mod error;
pub mod funding;
pub mod manager;

pub use activity::{fetch_recent_activity, AccountActivity, OVERVIEW_ACTIVITY_COUNT};
pub use callback::{add_callback_url, validate_callback_url, CallbackError};
pub use context::SessionContext;
pub use error::SessionError;
pub use funding::{FundingOutcome, FundingSettings};
pub use manager::{ManagerSettings, SessionManager};
