pub mod adapter;
pub mod config;
pub mod error;
pub mod example;
pub mod materializer;
pub mod parser;
pub mod render;
pub mod snapshot;
pub mod templates;

pub use adapter::{scaffold_from_description, ChatCompletionTranslator, TreeTranslator};
pub use config::{Args, Command, Config};
pub use error::{AdapterError, ConfigError, MaterializeError};
pub use materializer::{build_structure, ContentMode, MaterializeReport, Materializer, PlanAction};
pub use parser::{parse_structure, NodeKind, PathNode};
pub use render::TreeRenderer;
pub use snapshot::Snapshot;
pub use templates::TemplateRegistry;
