pub mod autotagger;
pub mod config;
pub mod corpus;
pub mod doctor;
pub mod error;
pub mod frontmatter;
pub mod models;
pub mod output;
pub mod service;
pub mod support;
pub mod utils;

pub use config::Config;
pub use error::{JTagError, Result};
pub use models::{Post, Tag};
pub use service::{MergeReport, TagService};
