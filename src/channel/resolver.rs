use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::ResolveError;

use super::types::{ANTENNA_SUD_LIVE_URL, ChannelSpec, Provider};

/// User agent for the crate's own upstream requests.
pub const HTTP_USER_AGENT: &str = concat!("iptv-italy/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with a bounded per-request timeout.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(HTTP_USER_AGENT)
        .timeout(timeout)
        .build()
}

/**
    Base URLs of every upstream the crate talks to.

    Kept together and injectable so tests can point individual providers at
    a mock server; the defaults are the real hosts.
*/
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub rai_base: String,
    pub relinker_base: String,
    pub mediaset_base: String,
    pub sky_base: String,
    pub paramount_master: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            rai_base: "https://www.raiplay.it".to_string(),
            relinker_base: "https://mediapolis.rai.it".to_string(),
            mediaset_base: "https://live3-mediaset-it.akamaized.net".to_string(),
            sky_base: "https://apid.sky.it".to_string(),
            paramount_master: "http://viacomitalytest-lh.akamaihd.net/i/sbshdlive_1@195657/master.m3u8"
                .to_string(),
        }
    }
}

/// Sky livestream lookup URL for a channel id.
pub fn sky_livestream_url(base: &str, id: &str) -> String {
    format!("{base}/vdp/v1/getLivestream?id={id}&isMobile=false")
}

/// Shape of the raiplay `dirette` JSON document, reduced to the one path
/// the resolver needs.
#[derive(Debug, Deserialize)]
struct RaiDirette {
    #[serde(default)]
    video: Option<RaiVideo>,
}

#[derive(Debug, Deserialize)]
struct RaiVideo {
    #[serde(default)]
    content_url: Option<String>,
}

/**
    Build-time stream URL resolution, one strategy per provider.

    `resolve` is a pure function of `(provider, id)` apart from the Rai API
    round-trip, so callers are free to run many resolutions concurrently.
    Sky and Paramount entries are not resolved here at all: their baked URL
    points at the redirect proxy, which resolves live at playback time.
*/
pub struct Resolver {
    client: reqwest::Client,
    endpoints: Endpoints,
    proxy_base: String,
}

impl Resolver {
    /// `proxy_addr` is the `host:port` the redirect proxy will be reachable
    /// at; it is baked into the URLs of proxy-delegated channels.
    pub fn new(
        endpoints: Endpoints,
        proxy_addr: &str,
        timeout: Duration,
    ) -> Result<Self, ResolveError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoints,
            proxy_base: format!("http://{proxy_addr}"),
        })
    }

    /// Resolve one registry entry to a playable stream URL.
    pub async fn resolve(
        &self,
        provider: Provider,
        name: &str,
        spec: &ChannelSpec,
    ) -> Result<String, ResolveError> {
        let id = spec.effective_id(name);
        let url = match provider {
            Provider::Rai => self.resolve_rai(&id).await?,
            Provider::Tgr => self.relinker_url(&id),
            Provider::Mediaset => self.mediaset_url(&id),
            Provider::Sky | Provider::Paramount => self.proxied_url(&id),
            Provider::AntennaSud => ANTENNA_SUD_LIVE_URL.to_string(),
            Provider::Direct => spec.url.clone().ok_or_else(|| ResolveError::MissingUrl {
                name: name.to_string(),
            })?,
        };
        info!("resolved {provider} channel '{name}' to {url}");
        Ok(url)
    }

    /// Look up the current stream URL of a Rai channel.
    async fn resolve_rai(&self, id: &str) -> Result<String, ResolveError> {
        let url = format!("{}/dirette/{id}.json", self.endpoints.rai_base);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Upstream {
                status: status.as_u16(),
            });
        }

        let dirette: RaiDirette = response.json().await.map_err(|_| {
            ResolveError::MalformedResponse {
                field: "video.content_url",
            }
        })?;
        dirette
            .video
            .and_then(|video| video.content_url)
            .ok_or(ResolveError::MalformedResponse {
                field: "video.content_url",
            })
    }

    /// Relinker URL for a regional newscast content id.
    fn relinker_url(&self, id: &str) -> String {
        format!(
            "{}/relinker/relinkerServlet.htm?cont={id}",
            self.endpoints.relinker_base
        )
    }

    /// Mediaset live stream URL, templated from the channel code.
    fn mediaset_url(&self, id: &str) -> String {
        format!(
            "{}/Content/hls_h0_clr_vos/live/channel({id})/index.m3u8",
            self.endpoints.mediaset_base
        )
    }

    /// Redirect-proxy URL baked into the playlist for channels whose real
    /// URL is only obtainable at playback time.
    fn proxied_url(&self, id: &str) -> String {
        format!("{}/?id={id}", self.proxy_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        Resolver::new(
            Endpoints::default(),
            "127.0.0.1:10293",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_mediaset_url_template() {
        assert_eq!(
            resolver().mediaset_url("C5"),
            "https://live3-mediaset-it.akamaized.net/Content/hls_h0_clr_vos/live/channel(C5)/index.m3u8"
        );
    }

    #[test]
    fn test_relinker_url_template() {
        assert_eq!(
            resolver().relinker_url("16862"),
            "https://mediapolis.rai.it/relinker/relinkerServlet.htm?cont=16862"
        );
    }

    #[test]
    fn test_proxied_url_points_at_the_proxy() {
        assert_eq!(resolver().proxied_url("1"), "http://127.0.0.1:10293/?id=1");
    }

    #[test]
    fn test_sky_livestream_url() {
        assert_eq!(
            sky_livestream_url("https://apid.sky.it", "1"),
            "https://apid.sky.it/vdp/v1/getLivestream?id=1&isMobile=false"
        );
    }

    #[tokio::test]
    async fn test_direct_channel_requires_url() {
        let spec = ChannelSpec::default();
        let err = resolver()
            .resolve(Provider::Direct, "Nameless", &spec)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingUrl { .. }));
    }

    #[tokio::test]
    async fn test_template_providers_resolve_without_network() {
        let spec = ChannelSpec {
            id: Some("I1".to_string()),
            ..Default::default()
        };
        let url = resolver()
            .resolve(Provider::Mediaset, "Italia 1", &spec)
            .await
            .unwrap();
        assert!(url.contains("channel(I1)"));

        let url = resolver()
            .resolve(Provider::AntennaSud, "Antenna Sud", &ChannelSpec::default())
            .await
            .unwrap();
        assert_eq!(url, ANTENNA_SUD_LIVE_URL);
    }
}
