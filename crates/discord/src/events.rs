use std::{collections::HashMap, sync::Arc};

use archivbot_archive::ArchiveApi;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    commands::{parse_interaction, CommandParseError, CommandRouter, InteractionPayload},
    embeds::MessageTemplate,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayEnvelope {
    pub event_id: String,
    pub event: GatewayEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayEvent {
    Interaction(InteractionPayload),
    Ready(ReadyEvent),
    GuildJoined(GuildEvent),
    GuildLeft(GuildEvent),
    Unsupported { event_type: String },
}

impl GatewayEvent {
    pub fn event_type(&self) -> GatewayEventType {
        match self {
            Self::Interaction(_) => GatewayEventType::Interaction,
            Self::Ready(_) => GatewayEventType::Ready,
            Self::GuildJoined(_) => GatewayEventType::GuildJoined,
            Self::GuildLeft(_) => GatewayEventType::GuildLeft,
            Self::Unsupported { .. } => GatewayEventType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    Interaction,
    Ready,
    GuildJoined,
    GuildLeft,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadyEvent {
    pub user_name: String,
    pub user_id: String,
}

impl ReadyEvent {
    pub fn invite_url(&self) -> String {
        format!(
            "https://discord.com/oauth2/authorize?client_id={}&scope=applications.commands%20bot",
            self.user_id
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuildEvent {
    pub guild_id: String,
    pub guild_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Responded(MessageTemplate),
    Processed,
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Parse(#[from] CommandParseError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> GatewayEventType;
    async fn handle(&self, envelope: &GatewayEnvelope) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<GatewayEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(&self, envelope: &GatewayEnvelope) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Dispatcher wired with the archive commands and the lifecycle log handlers.
pub fn archive_dispatcher<A>(router: CommandRouter<A>) -> EventDispatcher
where
    A: ArchiveApi + 'static,
{
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(InteractionHandler::new(router));
    dispatcher.register(ReadyHandler);
    dispatcher.register(GuildJoinedHandler);
    dispatcher.register(GuildLeftHandler);
    dispatcher
}

pub struct InteractionHandler<A> {
    router: CommandRouter<A>,
}

impl<A> InteractionHandler<A>
where
    A: ArchiveApi,
{
    pub fn new(router: CommandRouter<A>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl<A> EventHandler for InteractionHandler<A>
where
    A: ArchiveApi + 'static,
{
    fn event_type(&self) -> GatewayEventType {
        GatewayEventType::Interaction
    }

    async fn handle(&self, envelope: &GatewayEnvelope) -> Result<HandlerResult, EventHandlerError> {
        let GatewayEvent::Interaction(payload) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let request = parse_interaction(payload)?;
        info!(
            event_name = "discord.command.received",
            command = request.kind.wire_name(),
            interaction_id = %request.interaction_id,
            user_id = %payload.user_id,
            guild_id = payload.guild_id.as_deref().unwrap_or("dm"),
            "handling command"
        );
        Ok(HandlerResult::Responded(self.router.route(&request).await))
    }
}

pub struct ReadyHandler;

#[async_trait]
impl EventHandler for ReadyHandler {
    fn event_type(&self) -> GatewayEventType {
        GatewayEventType::Ready
    }

    async fn handle(&self, envelope: &GatewayEnvelope) -> Result<HandlerResult, EventHandlerError> {
        let GatewayEvent::Ready(ready) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        info!(
            event_name = "discord.gateway.ready",
            user_name = %ready.user_name,
            user_id = %ready.user_id,
            "logged in as {}",
            ready.user_name
        );
        info!(
            event_name = "discord.gateway.invite",
            invite_url = %ready.invite_url(),
            "bot can be added to a server with the invite url"
        );
        Ok(HandlerResult::Processed)
    }
}

pub struct GuildJoinedHandler;

#[async_trait]
impl EventHandler for GuildJoinedHandler {
    fn event_type(&self) -> GatewayEventType {
        GatewayEventType::GuildJoined
    }

    async fn handle(&self, envelope: &GatewayEnvelope) -> Result<HandlerResult, EventHandlerError> {
        let GatewayEvent::GuildJoined(guild) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        info!(
            event_name = "discord.guild.joined",
            guild_id = %guild.guild_id,
            guild_name = %guild.guild_name,
            "joined server"
        );
        Ok(HandlerResult::Processed)
    }
}

pub struct GuildLeftHandler;

#[async_trait]
impl EventHandler for GuildLeftHandler {
    fn event_type(&self) -> GatewayEventType {
        GatewayEventType::GuildLeft
    }

    async fn handle(&self, envelope: &GatewayEnvelope) -> Result<HandlerResult, EventHandlerError> {
        let GatewayEvent::GuildLeft(guild) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        warn!(
            event_name = "discord.guild.left",
            guild_id = %guild.guild_id,
            guild_name = %guild.guild_name,
            "removed from server"
        );
        Ok(HandlerResult::Processed)
    }
}

#[cfg(test)]
mod tests {
    use archivbot_archive::ArchiveApi;
    use archivbot_core::{ApiError, Recording, SearchResult, StatsSnapshot};
    use async_trait::async_trait;

    use super::{
        archive_dispatcher, DispatchError, EventHandlerError, GatewayEnvelope, GatewayEvent,
        GuildEvent, HandlerResult, ReadyEvent,
    };
    use crate::commands::{CommandOption, CommandParseError, CommandRouter, InteractionPayload};
    use crate::render::ArchiveLinks;

    struct UnreachableArchive;

    #[async_trait]
    impl ArchiveApi for UnreachableArchive {
        async fn search(&self, _query: &str, _limit: u32) -> Result<SearchResult, ApiError> {
            Err(ApiError::Transport("connection refused".to_owned()))
        }

        async fn lookup(&self, _id: &str) -> Result<Recording, ApiError> {
            Err(ApiError::Transport("connection refused".to_owned()))
        }

        async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
            Err(ApiError::Transport("connection refused".to_owned()))
        }
    }

    fn dispatcher() -> super::EventDispatcher {
        archive_dispatcher(CommandRouter::new(
            UnreachableArchive,
            ArchiveLinks::new("https://archiv.example.org", "https://api.example.org"),
        ))
    }

    fn envelope(event: GatewayEvent) -> GatewayEnvelope {
        GatewayEnvelope { event_id: "evt-1".to_owned(), event }
    }

    fn interaction(command: &str, value: Option<&str>) -> GatewayEvent {
        GatewayEvent::Interaction(InteractionPayload {
            interaction_id: "i-1".to_owned(),
            command: command.to_owned(),
            options: value
                .map(|value| CommandOption { name: "text".to_owned(), value: value.to_owned() })
                .into_iter()
                .collect(),
            user_id: "u-1".to_owned(),
            guild_id: Some("g-1".to_owned()),
        })
    }

    #[test]
    fn archive_dispatcher_registers_all_handlers() {
        assert_eq!(dispatcher().handler_count(), 4);
    }

    #[test]
    fn invite_url_embeds_the_bot_id() {
        let ready = ReadyEvent { user_name: "archivbot".to_owned(), user_id: "123".to_owned() };
        assert_eq!(
            ready.invite_url(),
            "https://discord.com/oauth2/authorize?client_id=123&scope=applications.commands%20bot"
        );
    }

    #[tokio::test]
    async fn interactions_get_a_reply() {
        let result = dispatcher()
            .dispatch(&envelope(interaction("suche", Some(""))))
            .await
            .expect("dispatch");

        let HandlerResult::Responded(message) = result else {
            panic!("expected a reply, got {result:?}");
        };
        assert_eq!(message.content(), "Suche darf nicht leer sein");
    }

    #[tokio::test]
    async fn unknown_commands_fail_to_parse() {
        let error = dispatcher()
            .dispatch(&envelope(interaction("ping", None)))
            .await
            .expect_err("must fail");

        assert_eq!(
            error,
            DispatchError::Handler(EventHandlerError::Parse(
                CommandParseError::UnsupportedCommand("ping".to_owned())
            ))
        );
    }

    #[tokio::test]
    async fn lifecycle_events_are_processed_without_reply() {
        let dispatcher = dispatcher();
        let guild = GuildEvent { guild_id: "g-1".to_owned(), guild_name: "Archiv".to_owned() };

        for event in [
            GatewayEvent::Ready(ReadyEvent {
                user_name: "archivbot".to_owned(),
                user_id: "123".to_owned(),
            }),
            GatewayEvent::GuildJoined(guild.clone()),
            GatewayEvent::GuildLeft(guild),
        ] {
            let result = dispatcher.dispatch(&envelope(event)).await.expect("dispatch");
            assert_eq!(result, HandlerResult::Processed);
        }
    }

    #[tokio::test]
    async fn unsupported_events_are_ignored() {
        let result = dispatcher()
            .dispatch(&envelope(GatewayEvent::Unsupported { event_type: "TYPING_START".to_owned() }))
            .await
            .expect("dispatch");

        assert_eq!(result, HandlerResult::Ignored);
    }
}
