//! JSON-RPC and session error codes.

/// Invalid JSON was received.
pub const PARSE_ERROR: i32 = -32700;

/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i32 = -32600;

/// The method does not exist.
pub const METHOD_NOT_FOUND: i32 = -32601;

/// Invalid method parameters.
pub const INVALID_PARAMS: i32 = -32602;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i32 = -32603;

/// Server error range start.
pub const SERVER_ERROR_START: i32 = -32000;

/// Server error range end.
pub const SERVER_ERROR_END: i32 = -32099;

// Session-level codes, allocated downward from SERVER_ERROR_START.

/// The transport failed underneath the session.
pub const TRANSPORT_ERROR: i32 = SERVER_ERROR_START;

/// Resource was not found.
pub const RESOURCE_NOT_FOUND: i32 = -32002;

/// The session was torn down before the call resolved.
pub const SESSION_CLOSED: i32 = SERVER_ERROR_START - 4;

/// The initialize exchange failed.
pub const HANDSHAKE_FAILED: i32 = SERVER_ERROR_START - 5;

/// The peer did not advertise the capability.
pub const CAPABILITY_NOT_SUPPORTED: i32 = SERVER_ERROR_START - 6;

/// A call did not resolve in time.
pub const REQUEST_TIMEOUT: i32 = SERVER_ERROR_START - 7;

/// A call or handler was cancelled.
pub const REQUEST_CANCELLED: i32 = SERVER_ERROR_START - 8;

/// Returns true if `code` lies in the implementation-defined server range.
#[must_use]
pub const fn is_server_error(code: i32) -> bool {
    code <= SERVER_ERROR_START && code >= SERVER_ERROR_END
}
