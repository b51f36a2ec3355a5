pub mod actions;
pub mod fixtures;
pub mod graphql;
pub mod latency;
pub mod rest;

use std::sync::Arc;

use lms_common::config::AppConfig;
use lms_common::error::FetchError;
use lms_common::types::Resource;
use lms_engine::{Fetcher, FetcherSet, Mutator};

use crate::actions::MockMutator;
use crate::graphql::{HttpGraphQlSource, MockGraphQlSource};
use crate::latency::SimulatedLatency;
use crate::rest::{HttpRestSource, MockRestSource};

/// Wire every resource to the source that serves it.
///
/// Transactions, KYC applications and limit templates come from the REST
/// API; the dashboard aggregate and risk alerts from GraphQL. Without a
/// GraphQL URL those two fall back to the REST API, and without any URL the
/// built-in mock sources are used.
pub fn build_fetchers(config: &AppConfig) -> anyhow::Result<FetcherSet> {
    let client = http_client()?;

    let rest: Arc<dyn Fetcher> = match &config.lms_rest_base_url {
        Some(url) => Arc::new(HttpRestSource::new(client.clone(), url.as_str())),
        None => Arc::new(MockRestSource::new(SimulatedLatency::rest(
            config.mock_latency_scale,
        ))),
    };

    let graphql: Arc<dyn Fetcher> = match (&config.lms_graphql_url, &config.lms_rest_base_url) {
        (Some(url), _) => Arc::new(HttpGraphQlSource::new(client, url.as_str())),
        (None, Some(_)) => rest.clone(),
        (None, None) => Arc::new(MockGraphQlSource::new(SimulatedLatency::graphql(
            config.mock_latency_scale,
        ))),
    };

    let fetchers = Resource::ALL
        .iter()
        .fold(FetcherSet::new(), |set, resource| match resource {
            Resource::Dashboard | Resource::Alerts => set.register(*resource, graphql.clone()),
            _ => set.register(*resource, rest.clone()),
        });

    fetchers.ensure_complete()?;

    for resource in Resource::ALL {
        if let Some(fetcher) = fetchers.get(resource) {
            tracing::info!(resource = %resource, source = fetcher.name(), "Source registered");
        }
    }

    Ok(fetchers)
}

/// Pick the backend that applies officer actions.
///
/// The REST API covers every action, so it wins when configured. A
/// GraphQL-only backend cannot create templates.
pub fn build_mutator(config: &AppConfig) -> anyhow::Result<Arc<dyn Mutator>> {
    let mutator: Arc<dyn Mutator> = match (&config.lms_rest_base_url, &config.lms_graphql_url) {
        (Some(url), _) => Arc::new(HttpRestSource::new(http_client()?, url.as_str())),
        (None, Some(url)) => Arc::new(HttpGraphQlSource::new(http_client()?, url.as_str())),
        (None, None) => Arc::new(MockMutator::new(SimulatedLatency::mutation(
            config.mock_latency_scale,
        ))),
    };

    tracing::info!(mutator = mutator.name(), "Action backend registered");
    Ok(mutator)
}

fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("lms-sync/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

pub(crate) fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Transport(format!("request timed out: {}", e))
    } else {
        FetchError::Transport(e.to_string())
    }
}
