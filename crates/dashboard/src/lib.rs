#![doc = include_str!("../README.md")]

pub mod assemble;
pub mod backend;
pub mod convert;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod rule;
pub mod xml;

pub use assemble::{CategoryCounts, Panel, RunStats, SequenceAssembler};
pub use backend::{BackendError, NormalizationPipeline, QueryBackend, SplunkBackend};
pub use convert::{ConversionAdapter, ConversionOutcome, FailureReason};
pub use document::{Dashboard, DocumentBuilder};
pub use error::DashboardError;
pub use pipeline::DashboardPipeline;
pub use rule::{RuleCategory, RuleFile, RuleLoader, SigmaRule, classify};
