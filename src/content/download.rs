use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, ClientBuilder, header};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::instrument;
use url::Url;

use crate::content::errors::ExtractionError;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "esg-signals/0.1 (article text extraction)";
const CHARSET_SNIFF_BYTES: usize = 4096;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );

    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(headers)
        .build()
        .expect("Failed to build HTTP client")
});

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;/>]+)"#).unwrap());

/// A downloaded HTML page, decoded to UTF-8.
#[derive(Debug)]
pub struct DownloadedPage {
    pub url_final: Url,
    pub html: String,
    pub encoding: &'static Encoding,
}

#[instrument(skip_all, fields(url = %url))]
pub async fn download(url: &str) -> Result<DownloadedPage, ExtractionError> {
    let parsed_url = Url::parse(url)?;

    let response = HTTP_CLIENT
        .get(parsed_url)
        .send()
        .await
        .map_err(ExtractionError::from_reqwest_error)?;

    if let Some(content_length) = response.content_length()
        && content_length > MAX_BODY_SIZE
    {
        return Err(ExtractionError::BodyTooLarge(content_length));
    }

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractionError::Http { status });
    }

    let url_final = response.url().clone();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
        return Err(ExtractionError::UnsupportedContentType(content_type));
    }

    let body_raw = response
        .bytes()
        .await
        .map_err(ExtractionError::from_reqwest_error)?;

    // Content-Length may be missing or wrong.
    if body_raw.len() as u64 > MAX_BODY_SIZE {
        return Err(ExtractionError::BodyTooLarge(body_raw.len() as u64));
    }

    let encoding = detect_encoding(&content_type, &body_raw);
    let html = decode_body(&body_raw, encoding)?;

    Ok(DownloadedPage {
        url_final,
        html,
        encoding,
    })
}

/// Header charset first, then a `<meta>` declaration, then byte heuristics.
pub fn detect_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = charset_label(content_type) {
        return encoding;
    }

    let head = &body[..body.len().min(CHARSET_SNIFF_BYTES)];
    let head_lower = String::from_utf8_lossy(head).to_ascii_lowercase();
    if let Some(encoding) = meta_charset(&head_lower) {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, false);
    detector.guess(None, true)
}

fn charset_label(text: &str) -> Option<&'static Encoding> {
    CHARSET_REGEX
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|label| Encoding::for_label(label.as_str().to_lowercase().as_bytes()))
}

fn meta_charset(head: &str) -> Option<&'static Encoding> {
    head.match_indices("<meta")
        .filter_map(|(start, _)| {
            let tag_end = head[start..].find('>').map(|end| start + end)?;
            charset_label(&head[start..tag_end])
        })
        .next()
}

fn decode_body(body: &[u8], encoding: &'static Encoding) -> Result<String, ExtractionError> {
    let (decoded, _encoding, had_errors) = encoding.decode(body);
    if had_errors {
        return Err(ExtractionError::Charset(format!(
            "failed to decode content with encoding: {}",
            encoding.name()
        )));
    }
    Ok(decoded.into_owned())
}
