//! Set release duration operation.

use tracing::info;

use super::LogicOp;
use crate::{
    types::{DurationKey, MethodologyVersion, Moment},
    Config, Event, Ledger,
};

/// The request of the set release duration operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<Methodology> {
    /// The methodology.
    pub methodology: Methodology,
    /// The methodology version.
    pub version: MethodologyVersion,
    /// The release duration, in seconds.
    pub duration: Moment,
}

/// The response of the set release duration operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The duration that was replaced, if any.
    pub previous: Option<Moment>,
}

/// Errors for the set release duration operation.
#[derive(Debug)]
pub enum Error {}

#[async_trait::async_trait]
impl<T: Config> LogicOp<Request<T::Methodology>> for Ledger<T> {
    type Response = Response;
    type Error = Error;

    async fn call(&self, req: Request<T::Methodology>) -> Result<Self::Response, Self::Error> {
        let Request {
            methodology,
            version,
            duration,
        } = req;
        let key = DurationKey {
            methodology,
            version,
        };

        let previous = self.durations.set(key.clone(), duration).await;
        info!(message = "release duration set", ?key, duration, ?previous);

        self.emit(Event::DurationSet {
            key,
            duration,
            previous,
        });
        Ok(Response { previous })
    }
}
