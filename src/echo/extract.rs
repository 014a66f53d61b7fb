//! Request data extraction
//!
//! Turns the parts of a request into the maps echoed back to the caller.

use crate::error::HandlerError;
use crate::handler::RequestContext;
use futures_util::stream;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::http::uri::{Authority, PathAndQuery};
use hyper::HeaderMap;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::convert::Infallible;
use url::{form_urlencoded, Url};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM: &str = "multipart/form-data";
const DEFAULT_HOST: &str = "localhost";
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// One entry per header name; repeated values joined with `", "`
pub fn extract_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match map.entry(name.as_str().to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(value.into_owned());
            }
            Entry::Occupied(mut entry) => {
                let joined: &mut String = entry.get_mut();
                joined.push_str(", ");
                joined.push_str(&value);
            }
        }
    }
    map
}

/// Client address from the trusted proxy header; empty when absent
pub fn extract_origin(headers: &HeaderMap, client_ip_header: &str) -> String {
    headers
        .get(client_ip_header)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Absolute URL of the request as the client addressed it
///
/// A `Host` that is not a valid authority is ignored in favour of the URI
/// authority, then `localhost`.
pub fn request_url(ctx: &RequestContext) -> Result<Url, HandlerError> {
    let scheme = match ctx.header_str(FORWARDED_PROTO) {
        Some("https") => "https",
        _ => "http",
    };
    let host = ctx
        .header_str(HOST)
        .and_then(|host| host.parse::<Authority>().ok())
        .or_else(|| ctx.uri().authority().cloned());
    let host = host.as_ref().map_or(DEFAULT_HOST, Authority::as_str);
    let path_and_query = ctx.uri().path_and_query().map_or("/", PathAndQuery::as_str);

    Ok(Url::parse(&format!("{scheme}://{host}{path_and_query}"))?)
}

/// Decoded query arguments of the request target
///
/// A repeated key keeps its last value.
pub fn query_args(ctx: &RequestContext) -> BTreeMap<String, String> {
    ctx.uri()
        .query()
        .map(|query| form_urlencoded::parse(query.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Decoded form body, urlencoded or multipart
///
/// An empty body yields an empty map. A body without Content-Type is read
/// as urlencoded; any other media type is rejected.
pub async fn form_data(
    ctx: &mut RequestContext,
) -> Result<BTreeMap<String, String>, HandlerError> {
    let content_type = ctx.header_str(CONTENT_TYPE).map(str::to_string);
    let body = ctx.body_bytes().await?;
    if body.is_empty() {
        return Ok(BTreeMap::new());
    }

    match content_type.as_deref().map(media_type).as_deref() {
        None | Some(FORM_URLENCODED) => {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&body)?;
            Ok(pairs.into_iter().collect())
        }
        Some(MULTIPART_FORM) => {
            let boundary = multer::parse_boundary(content_type.as_deref().unwrap_or_default())?;
            multipart_fields(body, boundary).await
        }
        Some(other) => Err(HandlerError::UnsupportedFormType(other.to_string())),
    }
}

/// Named parts of a multipart body; a repeated name keeps its last value
///
/// File parts contribute their content when it is UTF-8, else their filename.
async fn multipart_fields(
    body: Bytes,
    boundary: String,
) -> Result<BTreeMap<String, String>, HandlerError> {
    let chunks = stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::new(chunks, boundary);

    let mut fields = BTreeMap::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_string);
        let content = field.bytes().await?;

        let value = match (String::from_utf8(content.to_vec()), file_name) {
            (Ok(text), _) => text,
            (Err(_), Some(file_name)) => file_name,
            (Err(_), None) => String::from_utf8_lossy(&content).into_owned(),
        };
        fields.insert(name, value);
    }
    Ok(fields)
}

/// `Text/HTML; charset=utf-8` -> `text/html`
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
