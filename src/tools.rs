//! String-in, string-out operations for the agent/transport layer.
//!
//! Nothing past this boundary sees an `Err`: schema problems come back as
//! their own message, anything unexpected is logged and summarized.

use tracing::error;

use crate::engine::{ChartRequest, OrgChartEngine};
use crate::error::Error;
use crate::render::ChartRenderer;
use crate::session::SessionStore;

fn make_request<S: SessionStore, R: ChartRenderer>(
    engine: &OrgChartEngine<S, R>,
    file_reference: Option<&str>,
    proceed: Option<&str>,
    session_id: Option<&str>,
) -> ChartRequest {
    let session_id = session_id.unwrap_or(&engine.config().default_session);
    ChartRequest::new(file_reference, session_id).with_proceed(proceed)
}

/// Build an org chart and return a message naming the artifact, or a
/// diagnostic.
pub fn build_chart<S: SessionStore, R: ChartRenderer>(
    engine: &OrgChartEngine<S, R>,
    file_reference: Option<&str>,
    proceed: Option<&str>,
    session_id: Option<&str>,
    filter: Option<&str>,
) -> String {
    let request = make_request(engine, file_reference, proceed, session_id).with_filter(filter);
    match engine.build_chart(&request) {
        Ok(outcome) => outcome.to_string(),
        Err(err) => error_message(err, "Error generating organization chart", &request),
    }
}

/// List the values of the grouping column, one per line.
pub fn list_groups<S: SessionStore, R: ChartRenderer>(
    engine: &OrgChartEngine<S, R>,
    file_reference: Option<&str>,
    proceed: Option<&str>,
    session_id: Option<&str>,
) -> String {
    let request = make_request(engine, file_reference, proceed, session_id);
    match engine.list_groups(&request) {
        Ok(outcome) => outcome.to_string(),
        Err(err) => error_message(err, "Error listing groups", &request),
    }
}

/// Message for a failed call. Schema errors are shown as-is.
pub fn error_message(err: Error, context: &str, request: &ChartRequest) -> String {
    if err.is_schema_error() {
        return err.to_string();
    }
    error!(
        file_reference = ?request.file_reference,
        session_id = %request.session_id,
        filter = ?request.filter,
        "{}: {}",
        context,
        err
    );
    format!("Error processing file: {}", err)
}
