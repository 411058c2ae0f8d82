//! The uniform response of every grid operation.
//!
//! ```json
//! {"page": 1, "total": 10, "records": 95, "rows": [...]}   // list
//! {"error": false, "message": "Record 1,234 successfully created", "id": 1234}
//! {"error": true, "message": "Product record 7 not found"}
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer, ser::SerializeMap};
use utoipa::ToSchema;

use crate::RecordId;
use crate::errors::GridError;
use crate::models::PageResult;
use crate::registry::GridColumn;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Page(PageResult),
    /// Record created, updated or deleted by a mutation
    Record { id: RecordId },
    Columns(Vec<GridColumn>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    pub error: bool,
    pub message: String,
    pub payload: Option<Payload>,
}

impl ResultEnvelope {
    pub fn ok(message: impl Into<String>, payload: Option<Payload>) -> Self {
        Self {
            error: false,
            message: message.into(),
            payload,
        }
    }

    #[must_use]
    pub fn fail(error: &GridError) -> Self {
        Self {
            error: true,
            message: error.user_message(),
            payload: None,
        }
    }

    #[must_use]
    pub fn page(page: PageResult) -> Self {
        Self::ok(String::new(), Some(Payload::Page(page)))
    }

    /// Success of a mutation, e.g. `Record 1,234 successfully created`
    #[must_use]
    pub fn record(action: &str, id: RecordId) -> Self {
        Self::ok(
            format!("Record {} successfully {action}", format_id(id)),
            Some(Payload::Record { id }),
        )
    }

    #[must_use]
    pub fn columns(columns: Vec<GridColumn>) -> Self {
        Self::ok(String::new(), Some(Payload::Columns(columns)))
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error
    }

    #[must_use]
    pub fn page_result(&self) -> Option<&PageResult> {
        match &self.payload {
            Some(Payload::Page(page)) => Some(page),
            _ => None,
        }
    }

    #[must_use]
    pub fn record_id(&self) -> Option<RecordId> {
        match self.payload {
            Some(Payload::Record { id }) => Some(id),
            _ => None,
        }
    }
}

impl Serialize for ResultEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(Payload::Page(page)) = &self.payload {
            return page.serialize(serializer);
        }
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("error", &self.error)?;
        map.serialize_entry("message", &self.message)?;
        match &self.payload {
            Some(Payload::Record { id }) => map.serialize_entry("id", id)?,
            Some(Payload::Columns(columns)) => map.serialize_entry("columns", columns)?,
            Some(Payload::Page(_)) | None => {}
        }
        map.end()
    }
}

impl IntoResponse for ResultEnvelope {
    /// The grid reads the `error` flag, so failures are still HTTP 200.
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Schema of a non-list envelope, for the API documentation
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub error: bool,
    pub message: String,
    /// Record a mutation created or touched
    #[schema(nullable = false)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[schema(nullable = false)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<GridColumn>>,
}

/// Format an id with thousands separators: `1234567` becomes `1,234,567`.
#[must_use]
pub fn format_id(id: RecordId) -> String {
    let digits = id.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if id < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
