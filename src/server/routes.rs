use axum::{
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::channel::{Provider, resolver::sky_livestream_url};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    id: Option<String>,
}

/// Shape of the Sky livestream JSON document.
#[derive(Debug, Deserialize)]
struct SkyLivestream {
    #[serde(default)]
    streaming_url: Option<String>,
}

/**
    `GET /?id=<providerId>`: resolve a proxy-delegated channel on demand.

    Sky ids redirect to the freshly looked-up stream URL; the Paramount id
    returns the upstream master playlist with its broken lines removed.
    Upstream failures are forwarded verbatim so the player sees the real
    status, not an opaque 500.
*/
pub async fn redirect(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Response {
    let Some(id) = query.id else {
        return text_response(StatusCode::BAD_REQUEST, "Missing 'id' query parameter.");
    };

    match state.registry.find_proxied(&id) {
        Some(Provider::Sky) => sky_redirect(&state, &id).await,
        Some(Provider::Paramount) => paramount_rewrite(&state).await,
        _ => {
            debug!("no proxied channel matches id '{id}'");
            text_response(
                StatusCode::NOT_FOUND,
                format!("Could not find streaming id {id}."),
            )
        }
    }
}

/// Look up the current Sky stream URL and answer with a `301`.
async fn sky_redirect(state: &AppState, id: &str) -> Response {
    let url = sky_livestream_url(&state.endpoints.sky_base, id);
    let response = match state.client.get(&url).send().await {
        Ok(response) => response,
        Err(error) => return upstream_failure(&error),
    };

    let status = response.status();
    if !status.is_success() {
        warn!("sky livestream lookup for '{id}' returned HTTP {status}");
        return forward_upstream(status.as_u16(), response.bytes().await.ok());
    }

    let live: SkyLivestream = match response.json().await {
        Ok(live) => live,
        Err(_) => {
            return text_response(
                StatusCode::NOT_FOUND,
                "Could not find \"streaming_url\" in JSON.",
            );
        }
    };

    match live.streaming_url {
        Some(target) => Response::builder()
            .status(StatusCode::MOVED_PERMANENTLY)
            .header(header::LOCATION, target)
            .body(Body::empty())
            .unwrap_or_else(|_| {
                text_response(
                    StatusCode::BAD_GATEWAY,
                    "Upstream returned an invalid redirect target.",
                )
            }),
        None => text_response(
            StatusCode::NOT_FOUND,
            "Could not find \"streaming_url\" in JSON.",
        ),
    }
}

/// Fetch the Paramount master playlist and drop its broken lines.
async fn paramount_rewrite(state: &AppState) -> Response {
    let response = match state
        .client
        .get(&state.endpoints.paramount_master)
        .send()
        .await
    {
        Ok(response) => response,
        Err(error) => return upstream_failure(&error),
    };

    let status = response.status();
    if !status.is_success() {
        warn!("paramount master playlist fetch returned HTTP {status}");
        return forward_upstream(status.as_u16(), response.bytes().await.ok());
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(error) => return upstream_failure(&error),
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/vnd.apple.mpegurl")
        .body(Body::from(strip_lines_after_header(&body, 2)))
        .unwrap()
}

/// Drop `count` lines following the first one. The first two entries of the
/// upstream master playlist are known-broken; the header line stays.
fn strip_lines_after_header(body: &str, count: usize) -> String {
    let mut lines = body.split('\n');
    let mut rewritten = String::new();
    if let Some(header_line) = lines.next() {
        rewritten.push_str(header_line);
        rewritten.push('\n');
    }
    for line in lines.skip(count) {
        rewritten.push_str(line);
        rewritten.push('\n');
    }
    rewritten
}

/// Mirror an upstream error response to the client, same status, same body.
fn forward_upstream(status: u16, body: Option<axum::body::Bytes>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    Response::builder()
        .status(status)
        .body(Body::from(body.unwrap_or_default()))
        .unwrap()
}

fn upstream_failure(error: &reqwest::Error) -> Response {
    if error.is_timeout() {
        warn!("upstream request timed out");
        text_response(StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out.")
    } else {
        warn!("upstream request failed: {error}");
        text_response(
            StatusCode::BAD_GATEWAY,
            format!("Upstream request failed: {error}"),
        )
    }
}

fn text_response(status: StatusCode, body: impl Into<String>) -> Response {
    (status, body.into()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_lines_after_header() {
        let body = "#EXTM3U\n#broken-1\n#broken-2\n#EXT-X-STREAM-INF:ok\nhttp://x/v.m3u8\n";
        assert_eq!(
            strip_lines_after_header(body, 2),
            "#EXTM3U\n#EXT-X-STREAM-INF:ok\nhttp://x/v.m3u8\n\n"
        );
    }

    #[test]
    fn test_strip_lines_short_input() {
        assert_eq!(strip_lines_after_header("#EXTM3U", 2), "#EXTM3U\n");
        assert_eq!(strip_lines_after_header("", 2), "\n");
    }
}
