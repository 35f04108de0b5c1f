pub mod retryable;
pub mod tls;
pub mod transport;
