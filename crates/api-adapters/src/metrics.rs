//! # Metrics
//!
//! Prometheus registry for the HTTP surface. Rendered in the OpenMetrics
//! text format at `GET /metrics`.

use std::fmt;

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct RequestLabels {
    method: String,
    /// `2xx`, `4xx`, ...
    status: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct DenialLabels {
    entity: String,
}

pub struct Metrics {
    registry: Registry,
    http_requests: Family<RequestLabels, Counter>,
    authz_denials: Family<DenialLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("feedback_board");
        let http_requests = Family::<RequestLabels, Counter>::default();
        registry.register(
            "http_requests",
            "HTTP requests by method and status class",
            http_requests.clone(),
        );
        let authz_denials = Family::<DenialLabels, Counter>::default();
        registry.register(
            "authz_denials",
            "Requests refused by an access policy, by entity kind",
            authz_denials.clone(),
        );
        Self {
            registry,
            http_requests,
            authz_denials,
        }
    }

    pub fn record_request(&self, method: &str, status: u16) {
        self.http_requests
            .get_or_create(&RequestLabels {
                method: method.to_string(),
                status: format!("{}xx", status / 100),
            })
            .inc();
    }

    pub fn record_denial(&self, entity: &str) {
        self.authz_denials
            .get_or_create(&DenialLabels {
                entity: entity.to_string(),
            })
            .inc();
    }

    pub fn render(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}
