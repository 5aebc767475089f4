//! Position source contract.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::geo::Position;

/// A device geolocation provider.
///
/// `watch` hands back a receiver; dropping it releases the underlying
/// watch and no further updates are produced.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// One-shot high-accuracy fix.
    async fn current_position(&self) -> Result<Position>;

    /// Opens a continuous watch. Errors are delivered in-band.
    async fn watch(&self) -> Result<mpsc::Receiver<Result<Position>>>;
}
