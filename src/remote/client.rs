//! Remote service HTTP client
//!
//! Async REST client for the authoring and runtime APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::debug;
use url::Url;

use super::types::*;
use super::{KnowledgeBaseIdentity, QnaBackend};
use crate::config::ServiceConfig;
use crate::core::reconcile::MutationBatch;
use crate::core::record::AnswerRecord;
use crate::error::{QnaError, Result};

const AUTHORING_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// HTTP backend for the hosted knowledge base service
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    authoring_url: Url,
    authoring_key: String,
}

impl HttpBackend {
    /// Create backend from service config
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(
            &config.authoring_endpoint(),
            &config.authoring_key,
            config.timeout_secs,
        )
    }

    /// Create backend with explicit parameters
    pub fn new(authoring_endpoint: &str, authoring_key: &str, timeout_secs: u64) -> Result<Self> {
        let authoring_url = base_url(authoring_endpoint)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| QnaError::remote("build HTTP client", e))?;

        Ok(Self {
            client,
            authoring_url,
            authoring_key: authoring_key.to_string(),
        })
    }

    /// Build an authoring URL for an endpoint
    fn authoring(&self, path: &str) -> Result<Url> {
        join(&self.authoring_url, path)
    }

    /// Add the subscription key header
    fn authoring_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORING_KEY_HEADER, &self.authoring_key)
    }

    /// Build a runtime URL for a knowledge base
    fn runtime(kb: &KnowledgeBaseIdentity, path: &str) -> Result<Url> {
        join(&base_url(&kb.query_endpoint)?, path)
    }

    fn runtime_auth(kb: &KnowledgeBaseIdentity, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("EndpointKey {}", kb.query_key))
    }

    async fn send(context: &str, builder: RequestBuilder) -> Result<reqwest::Response> {
        let resp = builder
            .send()
            .await
            .map_err(|e| QnaError::remote(context, e))?;

        let status = resp.status();
        if !status.is_success() {
            let err = extract_error(resp).await;
            return Err(QnaError::remote(context, format!("{}: {}", status, err)));
        }

        Ok(resp)
    }

    /// Send and deserialize the JSON body
    async fn send_json<T: serde::de::DeserializeOwned>(
        context: &str,
        builder: RequestBuilder,
    ) -> Result<T> {
        let resp = Self::send(context, builder).await?;
        resp.json()
            .await
            .map_err(|e| QnaError::remote(context, format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl QnaBackend for HttpBackend {
    async fn create_knowledge_base(
        &self,
        name: &str,
        records: &[AnswerRecord],
    ) -> Result<OperationHandle> {
        let url = self.authoring("knowledgebases/create")?;
        debug!(%url, entries = records.len(), "create knowledge base");

        let req = CreateKbRequest {
            name: name.to_string(),
            qna_list: records.iter().map(QnaDto::from).collect(),
        };

        let op: OperationDto = Self::send_json(
            "create knowledge base",
            self.authoring_auth(self.client.post(url)).json(&req),
        )
        .await?;
        Ok(op.into())
    }

    async fn delete_knowledge_base(&self, kb_id: &str) -> Result<()> {
        let url = self.authoring(&format!("knowledgebases/{}", kb_id))?;
        debug!(%url, "delete knowledge base");

        Self::send(
            "delete knowledge base",
            self.authoring_auth(self.client.delete(url)),
        )
        .await?;
        Ok(())
    }

    async fn publish_knowledge_base(&self, kb_id: &str) -> Result<()> {
        let url = self.authoring(&format!("knowledgebases/{}", kb_id))?;
        debug!(%url, "publish knowledge base");

        Self::send(
            "publish knowledge base",
            self.authoring_auth(self.client.post(url)),
        )
        .await?;
        Ok(())
    }

    async fn download_knowledge_base(&self, kb_id: &str, slice: Slice) -> Result<Vec<RemoteEntry>> {
        let url = self.authoring(&format!(
            "knowledgebases/{}/{}/qna",
            kb_id,
            slice.environment()
        ))?;
        debug!(%url, "download knowledge base");

        let docs: QnaDocumentsDto = Self::send_json(
            "download knowledge base",
            self.authoring_auth(self.client.get(url)),
        )
        .await?;
        Ok(docs.qna_documents)
    }

    async fn update_knowledge_base(
        &self,
        kb_id: &str,
        batch: &MutationBatch,
    ) -> Result<OperationHandle> {
        let url = self.authoring(&format!("knowledgebases/{}", kb_id))?;
        debug!(%url, "update knowledge base");

        let op: OperationDto = Self::send_json(
            "update knowledge base",
            self.authoring_auth(self.client.patch(url))
                .json(&UpdateKbRequest::from(batch)),
        )
        .await?;
        Ok(op.into())
    }

    async fn get_operation_status(&self, operation_id: &str) -> Result<OperationHandle> {
        let url = self.authoring(&format!("operations/{}", operation_id))?;

        let op: OperationDto = Self::send_json(
            "get operation status",
            self.authoring_auth(self.client.get(url)),
        )
        .await?;
        Ok(op.into())
    }

    async fn query(
        &self,
        kb: &KnowledgeBaseIdentity,
        question: &str,
        slice: Slice,
        top: usize,
    ) -> Result<Vec<Candidate>> {
        let url = Self::runtime(kb, &format!("knowledgebases/{}/generateAnswer", kb.id))?;
        debug!(%url, top, %slice, "query knowledge base");

        let req = QueryRequest {
            question: question.to_string(),
            top,
            is_test: slice.is_test(),
        };

        let resp: QueryResponse = Self::send_json(
            "query knowledge base",
            Self::runtime_auth(kb, self.client.post(url)).json(&req),
        )
        .await?;
        Ok(resp.answers)
    }

    async fn submit_training_feedback(
        &self,
        kb: &KnowledgeBaseIdentity,
        records: &[FeedbackRecord],
    ) -> Result<()> {
        let url = Self::runtime(kb, &format!("knowledgebases/{}/train", kb.id))?;
        debug!(%url, records = records.len(), "submit training feedback");

        let body = FeedbackRecordsDto {
            feedback_records: records.to_vec(),
        };

        Self::send(
            "submit training feedback",
            Self::runtime_auth(kb, self.client.post(url)).json(&body),
        )
        .await?;
        Ok(())
    }

    async fn get_query_key(&self) -> Result<String> {
        let url = self.authoring("endpointkeys")?;

        let keys: EndpointKeysDto = Self::send_json(
            "get endpoint keys",
            self.authoring_auth(self.client.get(url)),
        )
        .await?;
        Ok(keys.primary_endpoint_key)
    }
}

/// Parse a base URL, keeping its path as a prefix for relative joins
fn base_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| QnaError::config(format!("invalid endpoint {}: {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| QnaError::config(format!("invalid endpoint path {}: {}", path, e)))
}

/// Extract error message from response
async fn extract_error(resp: reqwest::Response) -> String {
    match resp.json::<ErrorResponse>().await {
        Ok(err) => err.to_string(),
        Err(_) => "Unknown error".to_string(),
    }
}
