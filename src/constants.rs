pub const ENV_LISTENER_HOST: &str = "LISTENER_HOST";
pub const ENV_LISTENER_PORT: &str = "LISTENER_PORT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9999;
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const ROOT_PATH: &str = "/";
pub const RECEIVE_PUSH_PATH: &str = "/receive_push";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Upper bound on a request body read by the push handler.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub const SERVICE_NAME: &str = "Simple Push Listener";
pub const ALIVE_MESSAGE: &str =
    "Simple Push Listener is alive. Send POST requests with JSON data to /receive_push";
pub const RECEIVED_MESSAGE: &str = "Received and logged payload.";
pub const STATUS_SUCCESS: &str = "success";
pub const INVALID_JSON_DETAIL: &str = "Invalid JSON payload received.";
pub const NOT_FOUND_DETAIL: &str = "Not Found";

pub const DUMP_HEADER: &str = "✅ --- Payload Received --- ✅";
pub const DUMP_FOOTER: &str = "----------------------------";
pub const BANNER_RULE: &str = "-------------------------------------------";
