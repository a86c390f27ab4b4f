//! Utility functions shared by the service layer.
//!
//! - [`target_url`] - Redirect target validation and canonicalisation
//! - [`date_range`] - Named reporting windows and calendar-month bounds

pub mod date_range;
pub mod target_url;
