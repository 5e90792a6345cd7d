//! Operation boundary macros
//!
//! Every record carries `component` (the calling module), `op` and `event`;
//! extra `key = value` fields are passed through to `tracing` unchanged.

#[doc(hidden)]
#[macro_export]
macro_rules! __folio_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        )
    };
}

/// Operation entry
///
/// ```
/// # use folio_core::log_op_start;
/// log_op_start!("save");
/// log_op_start!("save", document_id = 1234);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__folio_op_event!(
            info,
            $op,
            $crate::types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Successful operation exit; `duration_ms` is required
///
/// ```
/// # use folio_core::log_op_end;
/// log_op_end!("sort", duration_ms = 3, node_count = 2u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__folio_op_event!(
            info,
            $op,
            $crate::types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Failed operation exit
///
/// `$err` is anything convertible into `ExError`; the record carries its
/// stable `err_kind` and `err_code`, plus its `request_id` and `trace_id`
/// (empty when unset).
///
/// ```
/// # use folio_core::{log_op_error, errors::FolioError};
/// let err = FolioError::DocumentNotFound { document_id: 9 };
/// log_op_error!("delete", err, duration_ms = 1, document_id = 9);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__folio_op_event!(
            error,
            $op,
            $crate::types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            request_id = ex_err.request_id().map(|r| r.as_str()).unwrap_or_default(),
            trace_id = ex_err.trace_id().map(|t| t.as_str()).unwrap_or_default()
            $(, $($field)*)?
        )
    }};
}
