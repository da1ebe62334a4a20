pub(crate) const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
/// Random bytes behind a generated node identifier (hex-encoded).
pub(crate) const NODE_ID_BYTES: usize = 16;
