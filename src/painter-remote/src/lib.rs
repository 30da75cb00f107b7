//! Remote script execution for the painter's local HTTP control server.
//!
//! The server listens on `localhost:60041` by default and accepts
//! `POST /run.json` with a single-key JSON body whose value is the
//! base64-encoded script:
//!
//! ```text
//! {"python": "cHJpbnQoJ2hpJyk="}
//! {"js": "YWxnLmxvZy5pbmZvKCdoaScp"}
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use painter_remote::{RemotePainter, ScriptKind};
//!
//! let painter = RemotePainter::local()?;
//! painter.check_connection().await?;
//! let result = painter.execute_script("print('hi')", ScriptKind::Python).await?;
//! println!("{result}");
//! ```

mod client;
mod error;
pub mod payload;
pub mod response;

pub use client::{Endpoint, RemotePainter, ScriptExecutor, PAINTER_ROUTE};
pub use error::{PainterError, PainterResult};
pub use payload::{ScriptKind, ScriptPayload};
pub use response::{
    interpret_response, log_submitted_script, ExecutionResult, ExecutionStatus, ScriptOutput,
};
