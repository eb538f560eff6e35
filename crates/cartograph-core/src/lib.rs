//! Cartograph Core - turning finished model output into usable results.
//!
//! - **interpret**: lenient reading of recovered objects into nodes, edges
//!   and reports
//! - **reconcile**: merging recovered graphs with the scanner's file list
//! - **report**: one recovery pass plus reconciliation or typed reading,
//!   by report kind
//! - **export**: JSON document and Mermaid rendering of a graph
//! - **config**: settings, state paths and scan target handling

pub mod config;
pub mod error;
pub mod export;
pub mod interpret;
pub mod reconcile;
pub mod report;

pub use config::{
    env_file, expand_path, exports_dir, is_repository_url, load_env_files, parse_endpoint,
    resolve_target, state_dir, CartographConfig,
};
pub use error::{ConfigError, ExportError};
pub use interpret::{read_file_list, read_metadata};
pub use export::{export_file_name, to_mermaid, write_export, ExportDocument, ExportFormat};
pub use reconcile::{classify, synthesize, Reconciler, Reconciliation, DEFAULT_FALLBACK_RATIO};
pub use report::{interpret, Interpretation, Report};
