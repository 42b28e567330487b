use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{
    error::{NetError, NetResult},
    traits::Net,
    types::{Headers, NetOptions},
};

/// HTTP transport on `reqwest`.
///
/// One roundtrip per call, bounded by `NetOptions::request_timeout`. There is
/// no retry layer; a failed call is reported once and retrying is the
/// caller's decision.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    options: NetOptions,
}

impl HttpClient {
    /// # Panics
    ///
    /// Panics if the `reqwest::Client` builder fails to build.
    #[must_use]
    pub fn new(options: NetOptions) -> Self {
        let inner = Client::builder()
            .pool_max_idle_per_host(options.pool_max_idle_per_host)
            .build()
            .expect("failed to build reqwest client");
        Self { inner, options }
    }

    pub fn options(&self) -> &NetOptions {
        &self.options
    }

    fn apply_headers(
        mut req: reqwest::RequestBuilder,
        headers: Option<Headers>,
    ) -> reqwest::RequestBuilder {
        if let Some(headers) = headers {
            for (k, v) in headers.iter() {
                req = req.header(k, v);
            }
        }
        req
    }

    async fn read_success_body(url: Url, resp: reqwest::Response) -> NetResult<Bytes> {
        let status = resp.status();
        if !status.is_success() {
            return Err(NetError::http_status(status.as_u16(), url));
        }
        resp.bytes().await.map_err(NetError::from)
    }

    /// GET a URL and deserialize the JSON body.
    ///
    /// # Errors
    ///
    /// [`NetError::Decode`] when the body is not valid `T`; transport and
    /// status errors pass through unchanged.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        headers: Option<Headers>,
    ) -> NetResult<T> {
        let bytes = self.get_bytes(url, headers).await?;
        serde_json::from_slice(&bytes).map_err(|e| NetError::Decode(e.to_string()))
    }

    /// POST a JSON body to a URL and deserialize the JSON response.
    ///
    /// # Errors
    ///
    /// [`NetError::Decode`] when either body fails (de)serialization;
    /// transport and status errors pass through unchanged.
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: Url,
        body: &B,
        headers: Option<Headers>,
    ) -> NetResult<T> {
        let payload = serde_json::to_vec(body).map_err(|e| NetError::Decode(e.to_string()))?;
        let bytes = self.post_bytes(url, Bytes::from(payload), headers).await?;
        serde_json::from_slice(&bytes).map_err(|e| NetError::Decode(e.to_string()))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(NetOptions::default())
    }
}

#[async_trait]
impl Net for HttpClient {
    async fn get_bytes(&self, url: Url, headers: Option<Headers>) -> Result<Bytes, NetError> {
        let req = self.inner.get(url.clone());
        let req = Self::apply_headers(req, headers);
        let req = req.timeout(self.options.request_timeout);

        let resp = req.send().await.map_err(NetError::from)?;
        Self::read_success_body(url, resp).await
    }

    async fn post_bytes(
        &self,
        url: Url,
        body: Bytes,
        headers: Option<Headers>,
    ) -> Result<Bytes, NetError> {
        let req = self.inner.post(url.clone()).body(body);
        let req = Self::apply_headers(req, headers);
        let req = req.timeout(self.options.request_timeout);

        let resp = req.send().await.map_err(NetError::from)?;
        Self::read_success_body(url, resp).await
    }
}
