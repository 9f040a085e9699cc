//! Format extensions on the final path segment.
//!
//! `/api/v1/devicestatus.csv?count=100` is routed as `/api/v1/devicestatus`
//! with `Accept: text/csv`, so links and spreadsheet imports can pick a
//! format without setting headers.

use axum::extract::Request;
use axum::http::header::ACCEPT;
use axum::http::{HeaderValue, Uri};
use log::debug;
use scout_rs_format::MediaType;

/// Strip a known format extension and replace `Accept` to match.
///
/// Requests without a recognised extension pass through unchanged.
pub fn rewrite_format_extension(mut request: Request) -> Request {
    let Some((path, media_type)) = split_extension(request.uri().path())
        .map(|(path, media_type)| (path.to_string(), media_type))
    else {
        return request;
    };
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.clone(),
    };
    let mut parts = request.uri().clone().into_parts();
    let Ok(rewritten) = path_and_query.parse() else {
        return request;
    };
    parts.path_and_query = Some(rewritten);
    let Ok(uri) = Uri::from_parts(parts) else {
        return request;
    };
    debug!(
        "format extension rewrite (from={}, to={}, accept={})",
        request.uri().path(),
        path,
        media_type.essence()
    );
    *request.uri_mut() = uri;
    request
        .headers_mut()
        .insert(ACCEPT, HeaderValue::from_static(media_type.essence()));
    request
}

fn split_extension(path: &str) -> Option<(&str, MediaType)> {
    let segment_start = path.rfind('/').map_or(0, |idx| idx + 1);
    let segment = &path[segment_start..];
    let dot = segment.rfind('.')?;
    if dot == 0 {
        return None;
    }
    let media_type = MediaType::from_extension(&segment[dot + 1..])?;
    Some((&path[..segment_start + dot], media_type))
}
