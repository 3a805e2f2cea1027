//! Browse and invoke the operations of an OpenAPI description.
//!
//! Indexes an already-parsed description into categories and operations,
//! turns an operation plus operator-entered values into a request descriptor,
//! sends it, and normalizes whatever comes back into an `InvocationResult`.
//!
//! # Usage
//!
//! ```no_run
//! use api_tester::{classify, DescriptionIndex, RequestExecutor, Session};
//!
//! # async fn run() -> Result<(), api_tester::SessionError> {
//! let raw: serde_json::Value = serde_json::from_str(r#"{"tags":[],"paths":{}}"#).unwrap();
//! let index = DescriptionIndex::build(&raw);
//!
//! let mut session = Session::new("http://localhost:8000");
//! if let Some(op) = index.operations().first() {
//!     session.select_operation(op.clone());
//!     session.set_param("id", "42");
//!
//!     let executor = RequestExecutor::default();
//!     let (request, result) = session.invoke(&executor).await?;
//!     println!("{request} -> {}", classify(result).display_status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod binder;
pub mod builder;
pub mod classify;
pub mod error;
pub mod executor;
pub mod index;
pub mod session;
pub mod synth;

pub use binder::ParameterBinder;
pub use builder::{
    apply_matches, build_commands, describe_index, find_operation, normalize_group,
    normalize_operation_id, CliConfig,
};
pub use classify::{classify, Classification, Outcome};
pub use error::{DescriptionError, SessionError, SynthesisError};
pub use executor::{InvocationResult, RequestExecutor};
pub use index::{DescriptionIndex, HttpMethod, Operation, ParameterLocation, ParameterSpec};
pub use session::Session;
pub use synth::{synthesize, RequestDescriptor, RequestSynthesizer, SynthesisOptions};

// Re-export dependencies for downstream crates
pub use clap;
pub use reqwest;
