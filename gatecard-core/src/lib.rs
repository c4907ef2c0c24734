#![deny(missing_docs)]
//! gatecard core library.
//!
//! This crate turns SonarQube quality-gate webhook payloads into Feishu
//! interactive cards. It performs no I/O.

pub mod card;
pub mod domain;
pub mod error;
pub mod metrics;

pub use card::{
    CardElement, CardOptions, CardTheme, NotificationCard, build_card, build_card_with,
    format_analysed_at,
};
pub use domain::{AnalysisReport, Branch, BranchKind, CheckedReport, Condition, Project, QualityGate};
pub use error::{GateCardError, Result};
pub use metrics::{display_name, format_condition, format_conditions, letter_grade, status_icon};
