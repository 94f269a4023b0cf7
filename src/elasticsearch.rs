use std::{future::Future, time::Duration};

use anyhow::{Context, anyhow, bail};
use base64::prelude::*;
use elasticsearch::{
    Elasticsearch,
    cat::{CatAliasesParts, CatIndicesParts},
    cert::CertificateValidation,
    http::{
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesDeleteAliasParts, IndicesDeleteParts, IndicesPutAliasParts},
};
use http::header::{ACCEPT_ENCODING, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::cluster::{AliasBinding, ClusterApi, IndexDescriptor};
use crate::error::{Result, RolloverError, Step};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const MAX_RETRIES: usize = 10;

/// Gateway statuses worth another attempt; anything else goes straight back to the caller.
const RETRYABLE_STATUSES: [u16; 3] = [502, 503, 504];

/// Payload compression on the wire.
///
/// The CLI always uses `Gzip`. `Identity` is a library-only option for
/// callers talking to proxies that mangle compressed traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Gzip request bodies and accept gzip responses
    Gzip,
    /// Send plain bodies and ask for `Accept-Encoding: identity`
    Identity,
}

/// Connection settings for a single cluster node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub node_uri: Url,
    pub request_timeout: Duration,
    pub max_retries: usize,
    pub tls_verify: bool,
    pub compression: Compression,
    pub credentials: Option<(String, String)>,
}

impl ClusterConfig {
    /// Config with the fixed operational defaults: 60s timeout, 10 retries,
    /// no certificate verification, gzip.
    pub fn new(node_uri: Url) -> Self {
        Self {
            node_uri,
            request_timeout: REQUEST_TIMEOUT,
            max_retries: MAX_RETRIES,
            tls_verify: false,
            compression: Compression::Gzip,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<(String, String)>) -> Self {
        self.credentials = credentials;
        self
    }
}

/// Parse the node URI and split it into a bare `scheme://host:port` URL and
/// any basic auth credentials embedded in it.
pub fn parse_node_uri(uri: &str) -> anyhow::Result<(Url, Option<String>, Option<String>)> {
    let input_url = Url::parse(uri).with_context(|| format!("Failed to parse node URI: {}", uri))?;
    log::debug!("Parsed node URI: {}", input_url);

    if !matches!(input_url.scheme(), "http" | "https") {
        bail!(
            "Unsupported scheme '{}' in node URI, expected http or https",
            input_url.scheme()
        );
    }

    // --- Host Extraction ---
    let host_str = input_url
        .host_str()
        .ok_or_else(|| anyhow!("No host specified in node URI: {}", uri))?;
    let port_str = input_url
        .port()
        .map_or("".to_string(), |p| format!(":{}", p));
    let host_url_str = format!("{}://{}{}", input_url.scheme(), host_str, port_str);
    let host_url = Url::parse(&host_url_str)?;
    log::debug!("Extracted host URL: {}", host_url);

    // --- Authentication ---
    let username = Some(input_url.username())
        .filter(|u| !u.is_empty())
        .map(|u| u.to_string());
    let password = input_url.password().map(|p| p.to_string());

    Ok((host_url, username, password))
}

/// Build the cluster client. No request is sent until the first call.
pub fn connect(config: &ClusterConfig) -> Result<ElasticCluster> {
    build_client(config)
        .map(|client| ElasticCluster {
            client,
            max_retries: config.max_retries,
        })
        .map_err(RolloverError::Connection)
}

fn build_client(config: &ClusterConfig) -> anyhow::Result<Elasticsearch> {
    log::debug!(
        "Setting up Elasticsearch client connection to {}",
        config.node_uri.as_str()
    );
    // Single node pool: no sniffing and no dead-node resurrection
    let conn_pool = SingleNodeConnectionPool::new(config.node_uri.clone());
    let mut transport_builder = TransportBuilder::new(conn_pool).timeout(config.request_timeout);

    if !config.tls_verify {
        log::debug!("TLS certificate verification disabled");
        transport_builder = transport_builder.cert_validation(CertificateValidation::None);
    }

    let mut headers = HeaderMap::new();

    if let Some((user, pass)) = &config.credentials {
        log::info!("Using basic authentication for user: {}", user);
        let auth_str = format!("{}:{}", user, pass);
        let auth_val = format!("Basic {}", BASE64_STANDARD.encode(auth_str));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&auth_val)?);
        log::debug!("Adding authorization header");
    }

    match config.compression {
        Compression::Gzip => {
            log::debug!("Enabling gzip request body and response compression");
            transport_builder = transport_builder.request_body_compression(true);
        }
        Compression::Identity => {
            log::debug!("Disabling response compression by setting Accept-Encoding: identity");
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        }
    }

    if !headers.is_empty() {
        transport_builder = transport_builder.headers(headers);
    }

    log::debug!("Building Elasticsearch transport");
    let transport = transport_builder
        .build()
        .context("Failed to build Elasticsearch transport")?;

    log::debug!("Elasticsearch client created successfully");
    Ok(Elasticsearch::new(transport))
}

/// [`ClusterApi`] over the Elasticsearch HTTP API.
#[derive(Debug, Clone)]
pub struct ElasticCluster {
    client: Elasticsearch,
    max_retries: usize,
}

impl ElasticCluster {
    /// Send a request, retrying connection failures and gateway errors up to
    /// `max_retries` times. Non-success statuses become `StepFailed`.
    async fn send<F, Fut>(&self, step: Step, request: F) -> Result<Response>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<Response, elasticsearch::Error>>,
    {
        let mut attempt = 0;
        loop {
            let outcome = request().await;
            let retryable = match &outcome {
                Ok(response) => RETRYABLE_STATUSES.contains(&response.status_code().as_u16()),
                Err(err) => err.status_code().is_none(),
            };

            if retryable && attempt < self.max_retries {
                attempt += 1;
                match &outcome {
                    Ok(response) => log::warn!(
                        "{} request returned {}, retrying ({}/{})",
                        step,
                        response.status_code(),
                        attempt,
                        self.max_retries
                    ),
                    Err(err) => log::warn!(
                        "{} request failed: {}, retrying ({}/{})",
                        step,
                        err,
                        attempt,
                        self.max_retries
                    ),
                }
                continue;
            }

            return match outcome {
                Ok(response) if response.status_code().is_success() => Ok(response),
                Ok(response) => Err(step_failed(step, response).await),
                Err(err) => match err.status_code() {
                    Some(status) => Err(RolloverError::StepFailed {
                        step,
                        status: status.as_u16(),
                        detail: Value::String(err.to_string()),
                    }),
                    None => Err(RolloverError::Client { step, source: err }),
                },
            };
        }
    }

    async fn read_json<T: DeserializeOwned>(step: Step, response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|source| RolloverError::Client { step, source })
    }
}

async fn step_failed(step: Step, response: Response) -> RolloverError {
    let status = response.status_code().as_u16();
    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| Value::String(text));
    log::debug!("{} failed with status {}: {}", step, status, detail);

    RolloverError::StepFailed {
        step,
        status,
        detail,
    }
}

impl ClusterApi for ElasticCluster {
    async fn get_aliases(&self, alias_name: &str) -> Result<Vec<AliasBinding>> {
        let client = &self.client;
        let response = self
            .send(Step::Lookup, move || async move {
                client
                    .cat()
                    .aliases(CatAliasesParts::Name(&[alias_name]))
                    .format("json")
                    .send()
                    .await
            })
            .await?;
        Self::read_json(Step::Lookup, response).await
    }

    async fn delete_alias(&self, binding: &AliasBinding) -> Result<()> {
        let client = &self.client;
        self.send(Step::Remove, move || async move {
            client
                .indices()
                .delete_alias(IndicesDeleteAliasParts::IndexName(
                    &[binding.index_name.as_str()],
                    &[binding.alias_name.as_str()],
                ))
                .send()
                .await
        })
        .await?;
        Ok(())
    }

    async fn put_alias(&self, binding: &AliasBinding) -> Result<()> {
        let client = &self.client;
        self.send(Step::Put, move || async move {
            client
                .indices()
                .put_alias(IndicesPutAliasParts::IndexName(
                    &[binding.index_name.as_str()],
                    &binding.alias_name,
                ))
                .send()
                .await
        })
        .await?;
        Ok(())
    }

    async fn list_indices(&self, prefix: &str) -> Result<Vec<IndexDescriptor>> {
        let client = &self.client;
        let pattern = format!("{}*", prefix);
        let pattern = pattern.as_str();
        let response = self
            .send(Step::List, move || async move {
                client
                    .cat()
                    .indices(CatIndicesParts::Index(&[pattern]))
                    .format("json")
                    .h(&["index"])
                    .send()
                    .await
            })
            .await?;
        Self::read_json(Step::List, response).await
    }

    async fn delete_index(&self, index_name: &str) -> Result<()> {
        let client = &self.client;
        self.send(Step::Delete, move || async move {
            client
                .indices()
                .delete(IndicesDeleteParts::Index(&[index_name]))
                .send()
                .await
        })
        .await?;
        Ok(())
    }

    async fn reindex(&self, source: &str, dest: &str) -> Result<Value> {
        let client = &self.client;
        let response = self
            .send(Step::Reindex, move || async move {
                client
                    .reindex()
                    .wait_for_completion(false)
                    .body(json!({
                        "source": { "index": source },
                        "dest": { "index": dest }
                    }))
                    .send()
                    .await
            })
            .await?;
        Self::read_json(Step::Reindex, response).await
    }
}
