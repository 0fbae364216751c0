//! Submit collected edits to the backend.
//!
//! Every [`DatabaseEdit`] is posted to `/api/database/{databaseId}/edit`; the
//! backend answers with `{ "data": { "attributes": DatabaseEditResult } }`.
//!
//! Requests run in one of two [`RequestMode`]s. Both send the same request;
//! interactive submissions additionally drive a [`Feedback`] sink (loading
//! indicators, error toasts), silent ones leave it alone.

use crate::edit::DatabaseEdit;
use crate::transport::EditTransport;
use crate::{Error, Result};
use facet::Facet;
use tracing::Instrument;

/// What the backend reports after applying an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct DatabaseEditResult {
    /// DDL generated for the edit
    #[facet(default)]
    pub statement: String,
    #[facet(default)]
    pub validate_result_list: Vec<ValidateResult>,
}

/// One finding from the backend's statement validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct ValidateResult {
    #[facet(default, rename = "type")]
    pub kind: String,
    #[facet(default)]
    pub message: String,
}

#[derive(Debug, Facet)]
struct EditResponse {
    #[facet(default)]
    data: Option<EditResponseData>,
}

#[derive(Debug, Facet)]
struct EditResponseData {
    #[facet(default)]
    attributes: Option<DatabaseEditResult>,
}

/// Whether a submission reports progress and failures to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    #[default]
    Interactive,
    Silent,
}

impl RequestMode {
    pub fn from_silent(silent: bool) -> Self {
        if silent {
            RequestMode::Silent
        } else {
            RequestMode::Interactive
        }
    }

    pub fn is_silent(self) -> bool {
        self == RequestMode::Silent
    }
}

/// User-facing side effects of an interactive submission.
pub trait Feedback: Send + Sync {
    fn loading_started(&self, _database_id: i64) {}
    fn loading_finished(&self, _database_id: i64) {}
    fn request_failed(&self, _database_id: i64, _error: &Error) {}
}

/// Feedback sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl Feedback for NoFeedback {}

impl<F: Feedback> Feedback for &F {
    fn loading_started(&self, database_id: i64) {
        (**self).loading_started(database_id)
    }

    fn loading_finished(&self, database_id: i64) {
        (**self).loading_finished(database_id)
    }

    fn request_failed(&self, database_id: i64, error: &Error) {
        (**self).request_failed(database_id, error)
    }
}

/// API path for a database's edit endpoint.
pub fn edit_path(database_id: i64) -> String {
    format!("/api/database/{database_id}/edit")
}

/// Posts [`DatabaseEdit`]s through a transport.
pub struct EditSubmitter<T, F = NoFeedback> {
    transport: T,
    feedback: F,
}

impl<T: EditTransport> EditSubmitter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            feedback: NoFeedback,
        }
    }
}

impl<T: EditTransport, F: Feedback> EditSubmitter<T, F> {
    /// Replace the feedback sink used by interactive submissions.
    pub fn with_feedback<G: Feedback>(self, feedback: G) -> EditSubmitter<T, G> {
        EditSubmitter {
            transport: self.transport,
            feedback,
        }
    }

    /// Submit one edit and return what the backend made of it.
    ///
    /// No retries: a failed request is returned to the caller as-is.
    pub async fn post_database_edit(
        &self,
        edit: &DatabaseEdit,
        mode: RequestMode,
    ) -> Result<DatabaseEditResult> {
        let database_id = edit.database_id;
        let span = tracing::info_span!(
            "database.edit",
            database_id,
            silent = mode.is_silent(),
            changes = edit.change_count(),
            outcome = tracing::field::Empty,
        );

        if !mode.is_silent() {
            self.feedback.loading_started(database_id);
        }

        let result = self.send(edit).instrument(span.clone()).await;

        if !mode.is_silent() {
            self.feedback.loading_finished(database_id);
        }

        match &result {
            Ok(_) => {
                span.record("outcome", "applied");
            }
            Err(error) => {
                span.record("outcome", "failed");
                tracing::warn!(parent: &span, %error, "database edit failed");
                if !mode.is_silent() {
                    self.feedback.request_failed(database_id, error);
                }
            }
        }

        result
    }

    /// Submit edits one after another, stopping at the first failure.
    pub async fn post_database_edits(
        &self,
        edits: &[DatabaseEdit],
        mode: RequestMode,
    ) -> Result<Vec<DatabaseEditResult>> {
        let mut results = Vec::with_capacity(edits.len());
        for edit in edits {
            results.push(self.post_database_edit(edit, mode).await?);
        }
        Ok(results)
    }

    async fn send(&self, edit: &DatabaseEdit) -> Result<DatabaseEditResult> {
        let body = facet_json::to_string(edit).map_err(|e| Error::Encode {
            database_id: edit.database_id,
            message: e.to_string(),
        })?;

        let response = self
            .transport
            .post(&edit_path(edit.database_id), body.into_bytes())
            .await?;

        decode_edit_response(&response)
    }
}

/// Extract `data.attributes` from an edit response body.
pub fn decode_edit_response(body: &[u8]) -> Result<DatabaseEditResult> {
    let text = std::str::from_utf8(body).map_err(|e| Error::Decode(e.to_string()))?;
    let response: EditResponse =
        facet_json::from_str(text).map_err(|e| Error::Decode(e.to_string()))?;

    response
        .data
        .ok_or(Error::MalformedResponse("data"))?
        .attributes
        .ok_or(Error::MalformedResponse("data.attributes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_edit_path() {
        assert_eq!(edit_path(101), "/api/database/101/edit");
    }

    #[test]
    fn test_request_mode_from_silent() {
        assert_eq!(RequestMode::from_silent(false), RequestMode::Interactive);
        assert_eq!(RequestMode::from_silent(true), RequestMode::Silent);
        assert_eq!(RequestMode::default(), RequestMode::Interactive);
    }

    #[test]
    fn test_decode_edit_response() {
        let body = br#"{
            "data": {
                "type": "databaseEditResult",
                "attributes": {
                    "statement": "ALTER TABLE `orders` MODIFY COLUMN `id` bigint NOT NULL;",
                    "validateResultList": [
                        { "type": "warning", "message": "column type narrowed" }
                    ]
                }
            }
        }"#;

        let result = decode_edit_response(body).unwrap();
        assert_eq!(
            result.statement,
            "ALTER TABLE `orders` MODIFY COLUMN `id` bigint NOT NULL;"
        );
        assert_eq!(
            result.validate_result_list,
            vec![ValidateResult {
                kind: "warning".to_string(),
                message: "column type narrowed".to_string(),
            }]
        );
    }

    #[test]
    fn test_decode_missing_attributes() {
        let err = decode_edit_response(br#"{ "data": {} }"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse("data.attributes")));
    }

    #[test]
    fn test_decode_missing_data() {
        let err = decode_edit_response(br#"{ "errors": [] }"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse("data")));
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_edit_response(b"<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
