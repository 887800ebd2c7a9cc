use kakijun_core::query::Query;
use kakijun_types::ResultPayload;

use crate::api::{Endpoint, KanjiApi};
use crate::error::ApiError;

/// One attempt in a fallback chain
#[derive(Debug, Clone)]
pub struct FallbackStep {
    pub endpoint: Endpoint,
    recoverable: fn(&ApiError) -> bool,
}

impl FallbackStep {
    /// Step whose errors always end the chain
    pub fn terminal(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            recoverable: |_| false,
        }
    }

    /// Step that hands over to the next one on 404
    pub fn fallthrough_on_not_found(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            recoverable: ApiError::is_not_found,
        }
    }

    pub fn recovers(&self, error: &ApiError) -> bool {
        (self.recoverable)(error)
    }
}

/// Ordered endpoint attempts for one query, each tried at most once
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    steps: Vec<FallbackStep>,
}

impl FallbackPolicy {
    /// Single ideographs go to the exact-match route first and fall back to
    /// search on 404; everything else goes straight to search.
    pub fn for_query(query: &Query) -> Self {
        let search = FallbackStep::terminal(Endpoint::Search(query.as_str().to_string()));

        let steps = match query.single_ideograph() {
            Some(c) => vec![
                FallbackStep::fallthrough_on_not_found(Endpoint::ExactMatch(c)),
                search,
            ],
            None => vec![search],
        };

        Self { steps }
    }

    pub fn steps(&self) -> &[FallbackStep] {
        &self.steps
    }

    pub async fn run<A>(&self, api: &A) -> Result<ResultPayload, ApiError>
    where
        A: KanjiApi + ?Sized,
    {
        let Some((last, rest)) = self.steps.split_last() else {
            return Ok(ResultPayload::empty());
        };

        for step in rest {
            match api.lookup(&step.endpoint).await {
                Ok(payload) => return Ok(payload),
                Err(e) if step.recovers(&e) => {
                    tracing::info!("{} failed ({}), trying next endpoint", step.endpoint, e);
                }
                Err(e) => return Err(e),
            }
        }

        api.lookup(&last.endpoint).await
    }
}
