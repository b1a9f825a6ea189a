//! Time primitives

use std::fmt;

#[derive(Debug)]
pub struct Expired;

impl std::error::Error for Expired {}

impl From<tokio::time::error::Elapsed> for Expired {
    fn from(_: tokio::time::error::Elapsed) -> Expired {
        Expired
    }
}

impl fmt::Display for Expired {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        write!(f, "timer duration expired")
    }
}

pub use std::time::Duration;

pub async fn timeout<F>(duration: Duration, future: F) -> Result<F::Output, Expired>
where
    F: std::future::IntoFuture,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(Into::into)
}

#[doc(hidden)]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await
}
