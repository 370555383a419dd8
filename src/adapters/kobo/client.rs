//! HTTP client for one KoboToolbox deployment
//!
//! Wraps a `reqwest::Client` with the deployment's token, the configured timeout and
//! retry policy. Reads are retried with exponential backoff on transport errors and
//! 5xx responses; submission uploads are sent exactly once.

use super::models::{
    AssetDetail, DataPage, FormSummary, SubmissionPage, SubmissionQuery,
};
use crate::config::{DeploymentConfig, RetryConfig};
use crate::domain::errors::{KoboError, TransferError};
use crate::domain::ids::AssetUid;
use crate::domain::Result;
use reqwest::multipart::Form;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Client for the KPI and KoboCAT APIs of one deployment
///
/// # Example
///
/// ```no_run
/// use kobo_transfer::adapters::kobo::KoboClient;
/// use kobo_transfer::config::load_config;
/// use std::time::Duration;
///
/// # async fn example() -> kobo_transfer::domain::Result<()> {
/// let config = load_config("kobo-transfer.toml")?;
/// let client = KoboClient::new(
///     config.destination.clone(),
///     Duration::from_secs(config.transfer.timeout_seconds),
///     config.transfer.retry.clone(),
/// )?;
/// let forms = client.get_forms().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KoboClient {
    deployment: DeploymentConfig,
    client: Client,
    retry: RetryConfig,
}

impl KoboClient {
    /// Create a client for a deployment
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(deployment: DeploymentConfig, timeout: Duration, retry: RetryConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("kobo-transfer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                TransferError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            deployment,
            client,
            retry,
        })
    }

    /// Deployment this client talks to
    pub fn deployment(&self) -> &DeploymentConfig {
        &self.deployment
    }

    /// Asset uid of the deployment
    pub fn asset_uid(&self) -> &AssetUid {
        &self.deployment.asset_uid
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token: &str = self.deployment.token.expose_secret().as_ref();
        request.header("Authorization", format!("Token {token}"))
    }

    /// Retry a request with exponential backoff
    ///
    /// Only errors for which [`KoboError::is_retryable`] holds are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, KoboError>>,
    {
        let max_retries = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries || !e.is_retryable() {
                        return Err(e.into());
                    }

                    let factor = self.retry.backoff_multiplier.powf((attempt - 1) as f64);
                    let delay_ms = (self.retry.initial_delay_ms as f64 * factor) as u64;
                    let delay_ms = delay_ms.min(self.retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    /// Sends an authorized GET and checks the status
    async fn get(&self, url: &str) -> std::result::Result<Response, KoboError> {
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(KoboError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.retry_request(move || async move {
            let response = self.get(url).await?;
            response
                .json::<T>()
                .await
                .map_err(|e| KoboError::InvalidResponse(format!("{url}: {e}")))
        })
        .await
    }

    /// URL of the first page of the XML submission listing
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the deployment URL cannot be parsed.
    pub fn submissions_start_url(
        &self,
        limit: usize,
        query: Option<&SubmissionQuery>,
    ) -> Result<String> {
        let mut url = Url::parse(&self.deployment.data_xml_url()).map_err(|e| {
            TransferError::Configuration(format!("Invalid kf_url '{}': {e}", self.deployment.kf_url))
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &limit.to_string());
            if let Some(query) = query {
                pairs.append_pair("query", &query.to_json());
            }
        }
        Ok(url.into())
    }

    /// Fetches and parses one page of the XML submission listing
    pub async fn fetch_submission_page(&self, url: &str) -> Result<SubmissionPage> {
        let body = self
            .retry_request(move || async move {
                let response = self.get(url).await?;
                response
                    .text()
                    .await
                    .map_err(|e| KoboError::InvalidResponse(format!("{url}: {e}")))
            })
            .await?;

        let page = SubmissionPage::parse(&body, self.asset_uid())?;
        tracing::debug!(
            url = %url,
            submissions = page.submissions.len(),
            has_next = page.next.is_some(),
            "Fetched submission page"
        );
        Ok(page)
    }

    /// Fetches the asset detail, including its deployed versions
    pub async fn get_asset(&self) -> Result<AssetDetail> {
        let url = format!("{}?format=json", self.deployment.asset_url());
        self.get_json(&url).await
    }

    /// Fetches the form listing of the data collection server
    pub async fn get_forms(&self) -> Result<Vec<FormSummary>> {
        let url = format!("{}?format=json", self.deployment.forms_url());
        self.get_json(&url).await
    }

    /// Fetches one page of the JSON submission listing
    pub async fn get_data_page(&self, url: &str) -> Result<DataPage> {
        self.get_json(url).await
    }

    /// Downloads a file to `destination`
    ///
    /// The parent directory must exist.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        let bytes = self
            .retry_request(move || async move {
                let response = self.get(url).await?;
                response.bytes().await.map_err(transport_error)
            })
            .await?;

        tokio::fs::write(destination, &bytes).await.map_err(|e| {
            TransferError::Staging(format!("Failed to write {}: {e}", destination.display()))
        })?;
        Ok(())
    }

    /// Posts a multipart submission to the ingestion endpoint
    ///
    /// Returns the HTTP status code. Transport failures are returned as errors; any
    /// status, successful or not, is returned as `Ok`.
    pub async fn post_submission(&self, form: Form) -> std::result::Result<u16, KoboError> {
        let url = self.deployment.submission_url();
        let response = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        Ok(response.status().as_u16())
    }
}

fn transport_error(e: reqwest::Error) -> KoboError {
    if e.is_timeout() {
        KoboError::Timeout(e.to_string())
    } else {
        KoboError::ConnectionFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use mockito::{Matcher, Server};

    fn deployment(base: &str) -> DeploymentConfig {
        DeploymentConfig {
            kf_url: base.to_string(),
            kc_url: base.to_string(),
            asset_uid: AssetUid::new("aSrc").unwrap(),
            token: secret_string("secret-token".to_string()),
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        }
    }

    fn client(base: &str) -> KoboClient {
        KoboClient::new(deployment(base), Duration::from_secs(5), fast_retry()).unwrap()
    }

    #[test]
    fn test_submissions_start_url() {
        let client = client("https://kf.example.org/");
        assert_eq!(
            client.submissions_start_url(500, None).unwrap(),
            "https://kf.example.org/api/v2/assets/aSrc/data.xml?limit=500"
        );
    }

    #[test]
    fn test_submissions_start_url_with_query() {
        let client = client("https://kf.example.org");
        let query = SubmissionQuery::for_instances(vec![
            crate::domain::InstanceId::new("a1").unwrap(),
        ]);
        let url = client.submissions_start_url(10, Some(&query)).unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("query".to_string(), r#"{"_uuid":{"$in":["a1"]}}"#.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_forms_sends_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/forms")
            .match_query(Matcher::UrlEncoded("format".into(), "json".into()))
            .match_header("authorization", "Token secret-token")
            .with_status(200)
            .with_body(r#"[{"id_string": "aSrc", "uuid": "hub-1"}]"#)
            .create_async()
            .await;

        let forms = client(&server.url()).get_forms().await.unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].uuid, "hub-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/forms")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let err = client(&server.url()).get_forms().await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::Kobo(KoboError::Upstream { status: 503, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/assets/aSrc/")
            .match_query(Matcher::Any)
            .with_status(403)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server.url()).get_asset().await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::Kobo(KoboError::Upstream { status: 403, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_asset_is_upstream_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/assets/aSrc/")
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server.url()).get_asset().await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::Kobo(KoboError::Upstream { status: 404, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_submission_returns_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/submissions.xml")
            .match_header("authorization", "Token secret-token")
            .match_body(Matcher::Regex("xml_submission_file".to_string()))
            .with_status(202)
            .create_async()
            .await;

        let form = Form::new().part(
            "xml_submission_file",
            reqwest::multipart::Part::bytes(b"<aSrc/>".to_vec()).file_name("a1"),
        );
        let status = client(&server.url()).post_submission(form).await.unwrap();
        assert_eq!(status, 202);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/media/photo.jpg")
            .with_status(200)
            .with_body("jpeg-bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("photo.jpg");
        let url = format!("{}/media/photo.jpg", server.url());
        client(&server.url())
            .download(&url, &destination)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"jpeg-bytes");
    }
}
