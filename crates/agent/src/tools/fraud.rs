//! Fraud-desk tools: identity verification and case reporting.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use parley_core::{answers_match, ToolError};
use parley_store::RecordStore;

use crate::tools::{ArgKind, ArgSpec, Tool, ToolSpec};

/// Checks a spoken answer against the stored security answer for a case.
/// The tool only reports the outcome; attempt counting lives in the flow.
pub struct VerifyIdentity {
    store: RecordStore,
}

impl VerifyIdentity {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for VerifyIdentity {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "verify_identity",
            description: "Check a caller's security answer against their case",
            args: vec![
                ArgSpec::required("user_name", ArgKind::String),
                ArgSpec::required("answer", ArgKind::String),
            ],
        }
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let user_name = args["user_name"].as_str().unwrap_or_default();
        let answer = args["answer"].as_str().unwrap_or_default();

        let case = self
            .store
            .find_case(user_name)
            .await
            .ok_or_else(|| ToolError::NotFound(format!("no case for `{user_name}`")))?;

        let verified = answers_match(answer, &case.security_answer);
        info!(user = %case.user_name, verified, "fraud.identity_checked");
        Ok(json!({ "user_name": case.user_name, "verified": verified }))
    }
}

/// Records the final disposition of a fraud case in place.
pub struct SubmitReport {
    store: RecordStore,
}

impl SubmitReport {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SubmitReport {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "submit_report",
            description: "Record the outcome of a fraud case",
            args: vec![
                ArgSpec::required("user_name", ArgKind::String),
                ArgSpec::required("status", ArgKind::String),
                ArgSpec::optional("notes", ArgKind::String),
            ],
        }
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let user_name = args["user_name"].as_str().unwrap_or_default().to_owned();
        let status = args["status"].as_str().unwrap_or_default().to_owned();
        let notes = args["notes"].as_str().unwrap_or_default().to_owned();

        let updated = self
            .store
            .update_case(&user_name, &status, &notes)
            .await
            .map_err(|err| ToolError::Persistence(err.to_string()))?;

        if !updated {
            return Err(ToolError::NotFound(format!("no case for `{user_name}`")));
        }

        info!(user = %user_name, status = %status, "fraud.report_submitted");
        Ok(json!({ "user_name": user_name, "status": status, "updated": true }))
    }
}
