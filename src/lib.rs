// ShotSync Core Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod config;
pub mod error;
pub mod project;
pub mod reconcile;
pub mod scan;
pub mod shot_ids;

pub use config::ReconcileConfig;
pub use error::{ReconcileError, ReconcileResult};
pub use project::ProjectDocument;
