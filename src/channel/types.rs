use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// User agent advertised to the Rai stream servers by the player.
///
/// The CDN rejects the default user agent of most media players, so every
/// Rai playlist record carries an `#EXTVLCOPT` directive with this value.
/// This annotates the record; resolution requests do not use it.
pub const RAI_PLAYER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";

/// Antenna Sud transmits one well-known live stream for every listing.
pub const ANTENNA_SUD_LIVE_URL: &str =
    "https://flash5.xdevel.com/antennasud/smil:antennasud.smil/playlist.m3u8";

/// Upstream organization a channel belongs to.
///
/// The variant decides the resolution strategy; see [`crate::channel::Resolver`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Rai live channels, resolved through the raiplay `dirette` JSON API.
    Rai,
    /// Rai regional newscasts, served through the mediapolis relinker.
    Tgr,
    /// Mediaset live channels on the Akamai CDN, URL templated from the id.
    Mediaset,
    /// Paramount Network; the upstream master playlist is broken and is
    /// rewritten on demand by the redirect proxy.
    Paramount,
    /// Sky channels; stream URLs are session-bound, so playback goes through
    /// the redirect proxy.
    Sky,
    /// Antenna Sud, a single fixed live stream for the whole provider.
    AntennaSud,
    /// Channels whose stream URL is written directly in the registry.
    Direct,
}

impl Provider {
    /// Player user agent to annotate this provider's playlist records with.
    pub fn player_user_agent(self) -> Option<&'static str> {
        match self {
            Provider::Rai => Some(RAI_PLAYER_USER_AGENT),
            _ => None,
        }
    }

    /// Whether playback-time resolution is delegated to the redirect proxy.
    pub fn is_proxied(self) -> bool {
        matches!(self, Provider::Sky | Provider::Paramount)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Provider::Rai => "rai",
            Provider::Tgr => "tgr",
            Provider::Mediaset => "mediaset",
            Provider::Paramount => "paramount",
            Provider::Sky => "sky",
            Provider::AntennaSud => "antennasud",
            Provider::Direct => "direct",
        };
        f.write_str(label)
    }
}

/// One registry entry, keyed by display name within its provider group.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChannelSpec {
    /// Provider-specific identifier used in API calls and URL templates.
    #[serde(default)]
    pub id: Option<String>,
    /// Suggested channel number.
    #[serde(default)]
    pub number: Option<u32>,
    /// Fixed stream URL, for `direct` entries.
    #[serde(default)]
    pub url: Option<String>,
}

impl ChannelSpec {
    /// The identifier used for API calls and `tvg-id`: the registry id, or
    /// the display name lower-cased with whitespace stripped.
    pub fn effective_id(&self, name: &str) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => derive_id(name),
        }
    }
}

/// Lower-case a display name and strip all whitespace: `"Rai News 24"`
/// becomes `"rainews24"`.
pub fn derive_id(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A resolved channel, ready to be rendered into the playlist.
///
/// Built transiently per playlist run and discarded afterwards; resolution
/// failure means the channel is never constructed.
#[derive(Debug, Clone)]
pub struct Channel {
    pub provider: Provider,
    pub name: String,
    pub id: String,
    /// Channel number; filled in positionally by the playlist when absent.
    pub number: Option<u32>,
    pub logo: Option<String>,
    pub url: String,
    /// Player user agent directive carried by the rendered record.
    pub user_agent: Option<&'static str>,
}

impl Channel {
    pub fn from_spec(
        provider: Provider,
        name: &str,
        spec: &ChannelSpec,
        url: String,
        logos_url: Option<&str>,
    ) -> Self {
        let id = spec.effective_id(name);
        let logo = logos_url.map(|base| format!("{}/{}.png", base.trim_end_matches('/'), id));
        Self {
            provider,
            name: name.to_string(),
            id,
            number: spec.number,
            logo,
            url,
            user_agent: provider.player_user_agent(),
        }
    }
}
