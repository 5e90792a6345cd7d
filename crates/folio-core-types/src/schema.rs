//! Canonical schema constants for structured logging

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_DOCUMENT_ID: &str = "document_id";
pub const FIELD_CONTENT_TYPE_ID: &str = "content_type_id";
pub const FIELD_CULTURE: &str = "culture";

// Outcome fields
pub const FIELD_RESULT: &str = "result";
pub const FIELD_NODE_COUNT: &str = "node_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
