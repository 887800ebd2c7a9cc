use std::sync::Arc;

use kakijun_core::query::Query;
use kakijun_core::render::{RenderedView, ViewMessage, render_results};
use kakijun_core::view::Generation;
use kakijun_types::ResultPayload;

use crate::api::KanjiApi;
use crate::error::ApiError;
use crate::policy::FallbackPolicy;

#[derive(Debug)]
pub enum DispatchOutcome {
    /// Nothing to search for, no request was made
    EmptyQuery,
    Results {
        query: Query,
        payload: ResultPayload,
    },
    Failed {
        query: Query,
        error: ApiError,
    },
}

impl DispatchOutcome {
    pub fn render(&self, generation: Generation) -> RenderedView {
        match self {
            DispatchOutcome::EmptyQuery => RenderedView::Message(ViewMessage::EmptyQuery),
            DispatchOutcome::Results { query, payload } => {
                render_results(payload, query.as_str(), generation)
            }
            DispatchOutcome::Failed { error, .. } => RenderedView::Message(ViewMessage::Error {
                message: error.to_string(),
            }),
        }
    }
}

/// Runs raw user input through query parsing and the fallback policy
#[derive(Clone)]
pub struct QueryDispatcher {
    api: Arc<dyn KanjiApi>,
}

impl QueryDispatcher {
    pub fn new(api: Arc<dyn KanjiApi>) -> Self {
        Self { api }
    }

    pub async fn dispatch(&self, raw: &str) -> DispatchOutcome {
        let Some(query) = Query::parse(raw) else {
            tracing::debug!("Empty query, skipping request");
            return DispatchOutcome::EmptyQuery;
        };

        let policy = FallbackPolicy::for_query(&query);
        tracing::info!(
            "Dispatching '{}' via {}",
            query,
            policy
                .steps()
                .iter()
                .map(|s| s.endpoint.to_string())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        match policy.run(self.api.as_ref()).await {
            Ok(payload) => {
                tracing::debug!("'{}' returned {} entries", query, payload.len());
                DispatchOutcome::Results { query, payload }
            }
            Err(error) => {
                tracing::warn!("Lookup for '{}' failed: {}", query, error);
                DispatchOutcome::Failed { query, error }
            }
        }
    }
}
