pub mod m3u;

use std::io::Write;
use std::path::Path;

use futures::stream::{self, StreamExt};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::channel::{Channel, Provider, Registry, Resolver};
use crate::error::{PlaylistError, ResolveError};

/**
    An ordered collection of resolved channels.

    Insertion order is rendering order is file order. Numbering follows a
    first-writer-wins policy: an explicit per-call number beats the registry
    number, which beats the positional fallback; once assigned, a number is
    never recomputed.
*/
#[derive(Debug, Default)]
pub struct Playlist {
    channels: Vec<Channel>,
    auto_numbered: u32,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a channel, with an optional explicit number override.
    ///
    /// Channels that end up with neither an override nor a registry number
    /// are numbered 1, 2, … in the order such channels are added.
    pub fn add(&mut self, mut channel: Channel, number: Option<u32>) {
        if let Some(explicit) = number {
            channel.number = Some(explicit);
        }
        if channel.number.is_none() {
            self.auto_numbered += 1;
            channel.number = Some(self.auto_numbered);
        }
        self.channels.push(channel);
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn render(&self) -> String {
        m3u::render_playlist(&self.channels)
    }

    /// Write the rendered document to `path`.
    ///
    /// Refuses a path that names an existing directory without touching the
    /// filesystem. The document is written to a temporary file next to the
    /// destination and renamed into place, so the output is never observed
    /// half-written.
    pub fn dump(&self, path: &Path) -> Result<(), PlaylistError> {
        if path.is_dir() {
            return Err(PlaylistError::PathIsDirectory(path.to_path_buf()));
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(self.render().as_bytes())?;
        file.persist(path).map_err(|e| PlaylistError::Io(e.error))?;
        Ok(())
    }
}

/// One channel that failed to resolve during assembly.
#[derive(Debug)]
pub struct BuildFailure {
    pub provider: Provider,
    pub name: String,
    pub error: ResolveError,
}

/// Outcome of a playlist assembly: the playlist of every channel that
/// resolved, plus the per-channel failures that were skipped.
#[derive(Debug)]
pub struct BuildReport {
    pub playlist: Playlist,
    pub failures: Vec<BuildFailure>,
}

pub struct AssembleOptions {
    /// Base URL for channel logos (`{base}/{id}.png`); no logos when absent.
    pub logos_url: Option<String>,
    /// Maximum concurrent resolutions.
    pub jobs: usize,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            logos_url: None,
            jobs: 4,
        }
    }
}

/**
    Resolve every registry entry and assemble the playlist.

    Resolutions run on a bounded worker pool but channels are appended in
    registry order regardless of completion order. A failed resolution skips
    that channel only; the remaining entries still make it into the playlist
    and the failure is reported in the build report.
*/
pub async fn assemble(
    registry: &Registry,
    resolver: &Resolver,
    options: &AssembleOptions,
) -> BuildReport {
    let resolutions: Vec<_> = stream::iter(registry.iter())
        .map(|(provider, name, spec)| async move {
            let result = resolver.resolve(provider, name, spec).await;
            (provider, name, spec, result)
        })
        .buffered(options.jobs.max(1))
        .collect()
        .await;

    let mut playlist = Playlist::new();
    let mut failures = Vec::new();
    for (provider, name, spec, result) in resolutions {
        match result {
            Ok(url) => {
                let channel =
                    Channel::from_spec(provider, name, spec, url, options.logos_url.as_deref());
                playlist.add(channel, None);
            }
            Err(error) => {
                warn!("skipping {provider} channel '{name}': {error}");
                failures.push(BuildFailure {
                    provider,
                    name: name.to_string(),
                    error,
                });
            }
        }
    }

    info!(
        "assembled {} channels ({} failed)",
        playlist.channels().len(),
        failures.len()
    );
    BuildReport { playlist, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelSpec;

    fn channel(name: &str, number: Option<u32>) -> Channel {
        let spec = ChannelSpec {
            id: None,
            number,
            url: None,
        };
        Channel::from_spec(
            Provider::Direct,
            name,
            &spec,
            format!("http://x/{name}.m3u8"),
            None,
        )
    }

    #[test]
    fn test_explicit_number_beats_registry_number() {
        let mut playlist = Playlist::new();
        playlist.add(channel("A", Some(5)), Some(9));
        assert_eq!(playlist.channels()[0].number, Some(9));
    }

    #[test]
    fn test_positional_fallback_counts_unnumbered_channels_only() {
        let mut playlist = Playlist::new();
        playlist.add(channel("A", Some(5)), None);
        playlist.add(channel("B", None), None);
        // B is the first channel without an explicit or registry number, so
        // it gets 1 regardless of A's own number.
        assert_eq!(playlist.channels()[1].number, Some(1));

        playlist.add(channel("C", None), None);
        assert_eq!(playlist.channels()[2].number, Some(2));
    }

    #[test]
    fn test_numbers_are_never_recomputed() {
        let mut playlist = Playlist::new();
        playlist.add(channel("A", None), None);
        playlist.add(channel("B", Some(40)), None);
        playlist.add(channel("C", None), None);
        let numbers: Vec<_> = playlist
            .channels()
            .iter()
            .map(|c| c.number.unwrap())
            .collect();
        assert_eq!(numbers, [1, 40, 2]);
    }

    #[test]
    fn test_dump_rejects_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut playlist = Playlist::new();
        playlist.add(channel("A", None), None);

        let err = playlist.dump(dir.path()).unwrap_err();
        assert!(matches!(err, PlaylistError::PathIsDirectory(_)));
        // Nothing was written into the directory.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_dump_writes_header_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.m3u");
        let mut playlist = Playlist::new();
        playlist.add(channel("A", None), None);
        playlist.dump(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("#EXTM3U\n"));
        assert!(written.contains("http://x/A.m3u8\n"));
        assert_eq!(written, playlist.render());
    }
}
