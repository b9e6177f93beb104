use archivbot_archive::{ArchiveApi, MOST_RECENT_LIMIT, SEARCH_LIMIT};
use archivbot_core::{Argument, CommandError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::embeds::MessageTemplate;
use crate::render::{
    render_latest, render_lookup, render_search, render_stats, ArchiveLinks, TOP_CLIPPERS,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Latest,
    Search,
    Lookup,
    Stats,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [Self::Latest, Self::Search, Self::Lookup, Self::Stats];

    /// Name the command is registered under.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Latest => "neuestes",
            Self::Search => "suche",
            Self::Lookup => "uuid",
            Self::Stats => "stats",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().trim_start_matches('/').to_ascii_lowercase().as_str() {
            "neuestes" | "latest" => Some(Self::Latest),
            "suche" | "search" => Some(Self::Search),
            "uuid" | "lookup" => Some(Self::Lookup),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Latest => "Neuestes Vod anzeigen",
            Self::Search => "Archiv nach Titel oder Transcript durchsuchen",
            Self::Lookup => "Vod anhand der UUID anzeigen",
            Self::Stats => "Archiv Statistiken",
        }
    }

    fn option(self) -> Option<OptionDefinition> {
        let (name, description) = match self {
            Self::Search => ("text", "Titel oder Transcript"),
            Self::Lookup => ("uuid", "UUID des Vods"),
            Self::Latest | Self::Stats => return None,
        };
        Some(OptionDefinition {
            name: name.to_owned(),
            description: description.to_owned(),
            required: false,
        })
    }
}

/// String option attached to a registered command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionDefinition {
    pub name: String,
    pub description: String,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDefinition>,
}

pub fn command_definitions() -> Vec<CommandDefinition> {
    CommandKind::ALL
        .into_iter()
        .map(|kind| CommandDefinition {
            name: kind.wire_name().to_owned(),
            description: kind.description().to_owned(),
            options: kind.option().into_iter().collect(),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionPayload {
    pub interaction_id: String,
    pub command: String,
    pub options: Vec<CommandOption>,
    pub user_id: String,
    pub guild_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRequest {
    pub kind: CommandKind,
    pub argument: Option<String>,
    pub interaction_id: String,
}

impl CommandRequest {
    fn required_argument(&self, argument: Argument) -> Result<&str, CommandError> {
        self.argument
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or(CommandError::EmptyArgument { argument })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),
}

pub fn parse_interaction(
    payload: &InteractionPayload,
) -> Result<CommandRequest, CommandParseError> {
    let kind = CommandKind::from_name(&payload.command)
        .ok_or_else(|| CommandParseError::UnsupportedCommand(payload.command.clone()))?;

    Ok(CommandRequest {
        kind,
        argument: payload.options.first().map(|option| option.value.clone()),
        interaction_id: payload.interaction_id.clone(),
    })
}

pub struct CommandRouter<A> {
    archive: A,
    links: ArchiveLinks,
}

impl<A> CommandRouter<A>
where
    A: ArchiveApi,
{
    pub fn new(archive: A, links: ArchiveLinks) -> Self {
        Self { archive, links }
    }

    /// Produces exactly one reply per request. Failures become short text replies.
    pub async fn route(&self, request: &CommandRequest) -> MessageTemplate {
        match self.execute(request).await {
            Ok(message) => message,
            Err(error) => {
                match &error {
                    CommandError::EmptyArgument { .. } => debug!(
                        event_name = "discord.command.rejected",
                        command = request.kind.wire_name(),
                        interaction_id = %request.interaction_id,
                        error = %error,
                        "command argument missing"
                    ),
                    CommandError::Api(_) => warn!(
                        event_name = "discord.command.failed",
                        command = request.kind.wire_name(),
                        interaction_id = %request.interaction_id,
                        error = %error,
                        "archive request failed"
                    ),
                }
                MessageTemplate::text(error.user_message())
            }
        }
    }

    async fn execute(&self, request: &CommandRequest) -> Result<MessageTemplate, CommandError> {
        match request.kind {
            CommandKind::Latest => {
                let result = self.archive.search("", MOST_RECENT_LIMIT).await?;
                if result.is_empty() {
                    debug!(event_name = "discord.command.latest_empty", "archive has no recordings");
                }
                Ok(render_latest(&result, &self.links))
            }
            CommandKind::Search => {
                let query = request.required_argument(Argument::Query)?;
                let result = self.archive.search(query, SEARCH_LIMIT).await?;
                Ok(render_search(&result, &self.links))
            }
            CommandKind::Lookup => {
                let id = request.required_argument(Argument::Uuid)?;
                let recording = self.archive.lookup(id).await?;
                Ok(render_lookup(&recording, &self.links))
            }
            CommandKind::Stats => {
                let stats = self.archive.stats().await?;
                if stats.clips_per_creator.len() < TOP_CLIPPERS {
                    warn!(
                        event_name = "discord.command.short_leaderboard",
                        creators = stats.clips_per_creator.len(),
                        "fewer top clippers than expected"
                    );
                }
                Ok(render_stats(&stats))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use archivbot_archive::ArchiveApi;
    use archivbot_core::{ApiError, Recording, RecordingId, SearchResult, StatsSnapshot};
    use async_trait::async_trait;
    use chrono::DateTime;

    use super::{
        command_definitions, parse_interaction, CommandKind, CommandOption, CommandParseError,
        CommandRequest, CommandRouter, InteractionPayload,
    };
    use crate::render::ArchiveLinks;

    #[derive(Default)]
    struct RecordingArchive {
        calls: Mutex<Vec<String>>,
        failure: Option<ApiError>,
    }

    impl RecordingArchive {
        fn failing(failure: ApiError) -> Self {
            Self { calls: Mutex::default(), failure: Some(failure) }
        }

        fn record(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().expect("lock").push(call);
            match &self.failure {
                Some(failure) => Err(failure.clone()),
                None => Ok(()),
            }
        }
    }

    fn recording(id: &str) -> Recording {
        Recording {
            id: RecordingId(id.to_owned()),
            title: format!("Stream {id}"),
            recorded_at: DateTime::parse_from_rfc3339("2024-01-02T10:00:00Z").expect("date"),
            filename: id.to_owned(),
            view_count: 42,
            clip_count: 1,
            title_score: 0.0,
            transcript_score: 0.0,
        }
    }

    #[async_trait]
    impl ArchiveApi for RecordingArchive {
        async fn search(&self, query: &str, limit: u32) -> Result<SearchResult, ApiError> {
            self.record(format!("search:{query}:{limit}"))?;
            Ok(SearchResult { error: false, recordings: vec![recording("abc")] })
        }

        async fn lookup(&self, id: &str) -> Result<Recording, ApiError> {
            self.record(format!("lookup:{id}"))?;
            Ok(recording(id))
        }

        async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
            self.record("stats".to_owned())?;
            Ok(StatsSnapshot::default())
        }
    }

    fn router(archive: RecordingArchive) -> CommandRouter<RecordingArchive> {
        CommandRouter::new(
            archive,
            ArchiveLinks::new("https://archiv.example.org", "https://api.example.org"),
        )
    }

    fn request(kind: CommandKind, argument: Option<&str>) -> CommandRequest {
        CommandRequest {
            kind,
            argument: argument.map(str::to_owned),
            interaction_id: "i-1".to_owned(),
        }
    }

    fn calls(router: &CommandRouter<RecordingArchive>) -> Vec<String> {
        router.archive.calls.lock().expect("lock").clone()
    }

    #[test]
    fn command_names_and_aliases_resolve() {
        assert_eq!(CommandKind::from_name("neuestes"), Some(CommandKind::Latest));
        assert_eq!(CommandKind::from_name("latest"), Some(CommandKind::Latest));
        assert_eq!(CommandKind::from_name("/suche"), Some(CommandKind::Search));
        assert_eq!(CommandKind::from_name("Lookup"), Some(CommandKind::Lookup));
        assert_eq!(CommandKind::from_name("stats"), Some(CommandKind::Stats));
        assert_eq!(CommandKind::from_name("help"), None);
    }

    #[test]
    fn definitions_cover_every_command_with_optional_options() {
        let definitions = command_definitions();
        let names: Vec<_> = definitions.iter().map(|definition| definition.name.as_str()).collect();
        assert_eq!(names, ["neuestes", "suche", "uuid", "stats"]);

        let search = &definitions[1];
        assert_eq!(search.options.len(), 1);
        assert_eq!(search.options[0].name, "text");
        assert!(!search.options[0].required);
        assert_eq!(definitions[2].options[0].name, "uuid");
        assert!(definitions[0].options.is_empty());
        assert!(definitions[3].options.is_empty());
    }

    #[test]
    fn parse_interaction_takes_first_option_value() {
        let payload = InteractionPayload {
            interaction_id: "i-9".to_owned(),
            command: "suche".to_owned(),
            options: vec![CommandOption { name: "text".to_owned(), value: "minecraft".to_owned() }],
            user_id: "u-1".to_owned(),
            guild_id: Some("g-1".to_owned()),
        };

        let request = parse_interaction(&payload).expect("parse");
        assert_eq!(request.kind, CommandKind::Search);
        assert_eq!(request.argument.as_deref(), Some("minecraft"));
        assert_eq!(request.interaction_id, "i-9");
    }

    #[test]
    fn parse_interaction_rejects_unknown_commands() {
        let payload = InteractionPayload {
            interaction_id: "i-9".to_owned(),
            command: "ping".to_owned(),
            options: Vec::new(),
            user_id: "u-1".to_owned(),
            guild_id: None,
        };

        assert_eq!(
            parse_interaction(&payload).expect_err("must fail"),
            CommandParseError::UnsupportedCommand("ping".to_owned())
        );
    }

    #[tokio::test]
    async fn empty_search_is_rejected_without_archive_call() {
        let router = router(RecordingArchive::default());

        for argument in [None, Some(""), Some("   ")] {
            let reply = router.route(&request(CommandKind::Search, argument)).await;
            assert_eq!(reply.content(), "Suche darf nicht leer sein");
            assert!(reply.embeds.is_empty());
        }
        assert!(calls(&router).is_empty());
    }

    #[tokio::test]
    async fn empty_uuid_is_rejected_without_archive_call() {
        let router = router(RecordingArchive::default());

        let reply = router.route(&request(CommandKind::Lookup, Some(""))).await;

        assert_eq!(reply.content(), "UUID darf nicht leer sein");
        assert!(calls(&router).is_empty());
    }

    #[tokio::test]
    async fn router_calls_archive_entrypoints() {
        let router = router(RecordingArchive::default());

        router.route(&request(CommandKind::Latest, None)).await;
        router.route(&request(CommandKind::Search, Some(" minecraft "))).await;
        router.route(&request(CommandKind::Lookup, Some("abc"))).await;
        router.route(&request(CommandKind::Stats, None)).await;

        assert_eq!(
            calls(&router),
            ["search::1", "search: minecraft :10000", "lookup:abc", "stats"]
        );
    }

    #[tokio::test]
    async fn successful_commands_render_archive_data() {
        let router = router(RecordingArchive::default());

        let latest = router.route(&request(CommandKind::Latest, None)).await;
        assert_eq!(latest.embeds.len(), 1);
        assert!(latest.embeds[0].thumbnail.is_some());

        let search = router.route(&request(CommandKind::Search, Some("abc"))).await;
        assert!(search.content().starts_with("1 Vod gefunden\n"));

        let lookup = router.route(&request(CommandKind::Lookup, Some("xyz"))).await;
        assert_eq!(lookup.embeds[0].title.as_deref(), Some("Stream xyz"));

        let stats = router.route(&request(CommandKind::Stats, None)).await;
        assert!(stats.content().contains("**__Statistiken__**"));
    }

    #[tokio::test]
    async fn api_failures_reply_with_generic_message() {
        let router = router(RecordingArchive::failing(ApiError::UnexpectedStatus { code: 500 }));

        for kind in CommandKind::ALL {
            let reply = router.route(&request(kind, Some("abc"))).await;
            assert_eq!(reply.content(), "Fehler beim Api Request");
            assert!(reply.embeds.is_empty());
        }
        assert_eq!(calls(&router).len(), 4);
    }

    #[tokio::test]
    async fn missing_recording_replies_with_generic_message() {
        let router =
            router(RecordingArchive::failing(ApiError::NotFound { id: "gone".to_owned() }));

        let reply = router.route(&request(CommandKind::Lookup, Some("gone"))).await;

        assert_eq!(reply.content(), "Fehler beim Api Request");
    }
}
