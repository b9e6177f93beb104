//! Pure rendering of archive responses into interaction replies.
//!
//! Nothing here performs I/O; the same input always yields the same
//! [`MessageTemplate`].

use archivbot_core::config::ArchiveConfig;
use archivbot_core::{Recording, RecordingId, SearchResult, StatsSnapshot};
use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::embeds::{EmbedBuilder, MessageBuilder, MessageTemplate};

pub const ORDINAL_EMOJI: [&str; 10] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟"];
pub const TOP_CLIPPERS: usize = 3;

const DATE_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Base URLs used to build watch links and preview images.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveLinks {
    frontend: String,
    backend: String,
}

impl ArchiveLinks {
    pub fn new(frontend: impl Into<String>, backend: impl Into<String>) -> Self {
        Self { frontend: frontend.into(), backend: backend.into() }
    }

    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self::new(config.frontend_base(), config.backend_base())
    }

    pub fn watch_url(&self, id: &RecordingId) -> String {
        format!("{}/vods/watch/{}", self.frontend, id.as_str())
    }

    pub fn preview_url(&self, filename: &str) -> String {
        format!("{}/media/vods/{filename}-lg.jpg", self.backend)
    }
}

pub fn format_date(recorded_at: &DateTime<FixedOffset>) -> String {
    recorded_at.format(DATE_FORMAT).to_string()
}

pub fn render_latest(result: &SearchResult, links: &ArchiveLinks) -> MessageTemplate {
    result
        .recordings
        .iter()
        .fold(MessageBuilder::new(), |message, recording| {
            message.embed(|embed| {
                let preview = links.preview_url(&recording.filename);
                recording_embed(embed, recording, links)
                    .thumbnail(preview)
                    .timestamp(recording.recorded_at.to_rfc3339_opts(SecondsFormat::Secs, true));
            })
        })
        .build()
}

pub fn render_search(result: &SearchResult, links: &ArchiveLinks) -> MessageTemplate {
    let found = result.len();
    let noun = if found == 1 { "Vod" } else { "Vods" };
    let mut content = format!("{found} {noun} gefunden\n");

    for (recording, ordinal) in result.recordings.iter().zip(ORDINAL_EMOJI) {
        content.push_str(&format!(
            "\n{ordinal} [**{title}**](<{url}>)",
            title = recording.title,
            url = links.watch_url(&recording.id),
        ));
        content.push_str(&format!(
            "\n_📅 {date} | 👁️ {views}_ | 📊 Search Score: {score:.2} \n",
            date = format_date(&recording.recorded_at),
            views = recording.view_count,
            score = recording.relevance(),
        ));
    }

    MessageTemplate::text(content)
}

pub fn render_lookup(recording: &Recording, links: &ArchiveLinks) -> MessageTemplate {
    MessageBuilder::new()
        .embed(|embed| {
            recording_embed(embed, recording, links);
        })
        .build()
}

pub fn render_stats(stats: &StatsSnapshot) -> MessageTemplate {
    let mut content = String::from("\n**__Statistiken__**\n");

    content.push_str(&format!(
        "\n📈 **Allgemein**\n{} Vods\n{} Clips\n{:.2} Stunden gestreamt\n",
        stats.recordings_total, stats.clips_total, stats.hours_streamed,
    ));
    content.push_str(&format!(
        "\n🗣️ **Wörter**\n{} gesprochene Wörter\n{} einzigartige Wörter\n\
         {} durchschnittliche Wörter pro Stream\n",
        stats.transcript_words, stats.unique_words, stats.average_words,
    ));
    content.push_str(&format!(
        "\n💾 **Größe**\n{:.2}TiB Archivgröße\n{:.2}MiB Datenbankgröße\n",
        stats.size_tib(),
        stats.database_mib(),
    ));

    content.push_str("\n🎬 **Top Clipper**");
    for (creator, ordinal) in stats.top_creators(TOP_CLIPPERS).iter().zip(ORDINAL_EMOJI) {
        content.push_str(&format!(
            "\n{ordinal} **{}**, {} Views, {} Clips",
            creator.name, creator.view_count, creator.clip_count,
        ));
    }

    MessageTemplate::text(content)
}

fn recording_embed<'a>(
    embed: &'a mut EmbedBuilder,
    recording: &Recording,
    links: &ArchiveLinks,
) -> &'a mut EmbedBuilder {
    embed
        .title(recording.title.as_str())
        .url(links.watch_url(&recording.id))
        .image(links.preview_url(&recording.filename))
        .inline_field("Datum", format_date(&recording.recorded_at))
        .inline_field("Views", recording.view_count.to_string())
        .inline_field("Clips", recording.clip_count.to_string())
}
