//! Turn schema editor state into database edit requests.
//!
//! The editor keeps an origin and an edited snapshot of every schema it has
//! open. This crate:
//!
//! - diffs each edited schema against its origin ([`diff_schema`]),
//! - shapes the differences into the contexts the backend edit API expects
//!   (see [`context`]),
//! - folds the per-schema diffs into one [`DatabaseEdit`] per database
//!   ([`collect_database_edits`]),
//! - posts each edit to the backend ([`EditSubmitter`]).
//!
//! ```ignore
//! let store = EditorStore::from_json(&dump)?;
//! let edits = alterkit::collect_database_edits(&store)?;
//!
//! let (config, _) = alterkit_config::load()?;
//! let submitter = EditSubmitter::new(HttpTransport::from_config(&config.api)?);
//! for edit in &edits {
//!     let result = submitter.post_database_edit(edit, RequestMode::Interactive).await?;
//!     println!("{}", result.statement);
//! }
//! ```

pub mod context;
mod diff;
mod edit;
mod error;
mod submit;
mod transport;

pub use context::{
    AddColumnContext, AddForeignKeyContext, AlterTableContext, ChangeColumnContext,
    CreateTableContext, DropColumnContext, DropTableContext, PrimaryKeyContext,
    RenameTableContext,
};
pub use diff::{SchemaDiffResult, diff_schema, merge_diff_results};
pub use edit::{DatabaseEdit, collect_database_edits};
pub use error::{Error, TransportError};
pub use submit::{
    DatabaseEditResult, EditSubmitter, Feedback, NoFeedback, RequestMode, ValidateResult,
    decode_edit_response, edit_path,
};
pub use transport::{EditTransport, HttpTransport};

// Re-export the snapshot model and config for convenience
pub use alterkit_config as config;
pub use alterkit_model::{
    Column, Database, DatabaseSchema, EditorStore, Schema, SchemaSource, StoreError, Table,
};

/// Result type for alterkit operations.
pub type Result<T> = std::result::Result<T, Error>;
