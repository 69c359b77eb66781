/// Grepable error code and retryable flag, logged with every rejected
/// document or failed save.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
