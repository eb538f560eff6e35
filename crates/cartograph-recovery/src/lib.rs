//! Best-effort recovery of a structured object from model output.
//!
//! Generated output is often wrapped in prose, truncated at a token limit,
//! or sprinkled with trailing commas and raw newlines. [`recover`] runs an
//! ordered chain of repairs and reports which [`RecoveryStage`] succeeded.
//!
//! ```
//! use cartograph_recovery::{recover, RecoveryStage};
//!
//! let recovered = recover("thinking... {\"nodes\":[{\"id\":\"a\"},]}").unwrap();
//! assert_eq!(recovered.stage, RecoveryStage::TrailingCommas);
//! assert_eq!(recovered.value["nodes"][0]["id"], "a");
//! ```

pub mod engine;
pub mod error;
pub mod repair;

pub use engine::{recover, Recovered, RecoveryStage};
pub use error::{RecoveryError, Result};
