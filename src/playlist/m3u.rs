use crate::channel::Channel;

/// Render one playlist record.
///
/// Line one is the optional player user-agent directive, line two the
/// `#EXTINF` metadata, line three the stream URL. Attribute order is fixed:
/// `tvg-chno`, `tvg-logo`, `tvg-id`, `tvg-name`. The layout must not vary
/// between runs; players parsing the `tvg-*` attributes rely on it.
pub fn render_record(channel: &Channel) -> String {
    let mut record = String::new();

    if let Some(user_agent) = channel.user_agent {
        record.push_str("#EXTVLCOPT:http-user-agent=");
        record.push_str(user_agent);
        record.push('\n');
    }

    record.push_str("#EXTINF: -1");
    if let Some(number) = channel.number {
        record.push_str(&format!(" tvg-chno=\"{number}\""));
    }
    if let Some(logo) = &channel.logo {
        record.push_str(&format!(" tvg-logo=\"{logo}\""));
    }
    record.push_str(&format!(" tvg-id=\"{}\"", channel.id));
    record.push_str(&format!(" tvg-name=\"{}\"", channel.name));
    record.push_str(&format!(" , {}\n", channel.name));

    record.push_str(&channel.url);
    record.push('\n');
    record
}

/// Render the full playlist document: the `#EXTM3U` header followed by one
/// record per channel, in order.
pub fn render_playlist(channels: &[Channel]) -> String {
    let mut document = String::from("#EXTM3U\n");
    for channel in channels {
        document.push_str(&render_record(channel));
    }
    document
}
