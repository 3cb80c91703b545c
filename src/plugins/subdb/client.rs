use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_DISPOSITION, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use crate::core::model::{Fingerprint, LanguageCode, Subtitle};
use crate::plugins::registry::{ClientContext, LookupClient, LookupError};

pub const DEFAULT_ENDPOINT: &str = "http://api.thesubdb.com/";
pub const DEFAULT_USER_AGENT: &str = "SubDB/1.0 (SubsDownloader/0.1; https://github.com/subs-downloader)";

pub struct SubDbClient {
    client: reqwest::Client,
    ctx: ClientContext,
}

impl SubDbClient {
    pub fn new(ctx: ClientContext) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client, ctx })
    }

    fn build_headers(&self) -> Result<HeaderMap, LookupError> {
        let mut h = HeaderMap::new();
        let ua = HeaderValue::from_str(&self.ctx.user_agent)
            .map_err(|e| LookupError::Protocol(format!("invalid user agent: {e}")))?;
        h.insert(USER_AGENT, ua);
        Ok(h)
    }

    fn query_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.ctx.endpoint.clone();
        {
            let mut q = url.query_pairs_mut();
            q.clear();
            for (k, v) in params {
                q.append_pair(k, v);
            }
        }
        url
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, LookupError> {
        tracing::debug!(%url, "subdb request");
        let mut req = self.client.get(url).headers(self.build_headers()?);
        if self.ctx.timeout_secs > 0 {
            req = req.timeout(Duration::from_secs(self.ctx.timeout_secs));
        }
        Ok(req.send().await?)
    }
}

/// Comma-separated language list; blanks are dropped.
pub fn parse_languages(body: &[u8]) -> Result<Vec<LanguageCode>, LookupError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| LookupError::Protocol(format!("search body is not utf-8: {e}")))?;
    Ok(text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

/// `attachment; filename=abc.srt` => `.srt`
pub fn extension_from_disposition(value: &str) -> Result<String, LookupError> {
    let name = value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|n| n.trim_matches('"'))
        .unwrap_or(value);

    let ext = match name.find('.') {
        Some(i) => &name[i..],
        None => return Err(LookupError::Protocol(format!("no extension in delivered filename {name:?}"))),
    };
    if ext.contains(['/', '\\']) {
        return Err(LookupError::Protocol(format!("path separator in delivered filename {name:?}")));
    }
    Ok(ext.to_string())
}

#[async_trait]
impl LookupClient for SubDbClient {
    fn name(&self) -> &'static str { "subdb" }

    async fn search(&self, fingerprint: &Fingerprint) -> Result<Vec<LanguageCode>, LookupError> {
        let url = self.query_url(&[("action", "search"), ("hash", fingerprint.as_str())]);
        let resp = self.get(url).await?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Ok(vec![]),
            s if !s.is_success() => return Err(LookupError::Status(s)),
            _ => {}
        }

        let body = resp.bytes().await?;
        parse_languages(&body)
    }

    async fn download(&self, fingerprint: &Fingerprint, language: &str) -> Result<Subtitle, LookupError> {
        let url = self.query_url(&[
            ("action", "download"),
            ("hash", fingerprint.as_str()),
            ("language", language),
        ]);
        let resp = self.get(url).await?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(LookupError::NotFound),
            s if !s.is_success() => return Err(LookupError::Status(s)),
            _ => {}
        }

        let disposition = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .ok_or(LookupError::NotFound)?
            .to_str()
            .map_err(|e| LookupError::Protocol(format!("content-disposition: {e}")))?
            .to_string();
        let extension = extension_from_disposition(&disposition)?;

        let content: Bytes = resp.bytes().await?;
        Ok(Subtitle { content, extension })
    }
}
