use async_trait::async_trait;

use crate::{FetchError, SeismicEvent};

use super::{SeismicProvider, SeismicQuery};

const PROVIDER: &str = "emsc";

/// Placeholder integration for the EMSC feed.
///
/// The upstream service publishes RSS/XML rather than a JSON query API, so
/// this provider is recognized but unimplemented: every call yields the
/// not-implemented outcome without touching the network. It is deliberately
/// never an empty success.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmscProvider;

#[async_trait]
impl SeismicProvider for EmscProvider {
    async fn events(&self, _query: &SeismicQuery) -> Result<Vec<SeismicEvent>, FetchError> {
        Err(FetchError::NotImplemented { provider: PROVIDER })
    }
}
