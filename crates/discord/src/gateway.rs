use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::{
    commands::{command_definitions, CommandDefinition},
    embeds::MessageTemplate,
    events::{EventDispatcher, GatewayEnvelope, GatewayEvent, HandlerResult},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway failed to connect: {0}")]
    Connect(String),
    #[error("command registration failed: {0}")]
    Register(String),
    #[error("gateway read failed: {0}")]
    Receive(String),
    #[error("interaction reply failed: {0}")]
    Respond(String),
    #[error("gateway disconnect failed: {0}")]
    Disconnect(String),
}

/// Connection to the chat platform. `next_event` yields `None` once the stream closes.
#[async_trait]
pub trait GatewaySession: Send + Sync {
    async fn connect(&self) -> Result<(), GatewayError>;
    async fn register_commands(
        &self,
        commands: &[CommandDefinition],
    ) -> Result<Vec<String>, GatewayError>;
    async fn next_event(&self) -> Result<Option<GatewayEnvelope>, GatewayError>;
    async fn respond(
        &self,
        interaction_id: &str,
        message: &MessageTemplate,
    ) -> Result<(), GatewayError>;
    async fn disconnect(&self) -> Result<(), GatewayError>;
}

#[derive(Default)]
pub struct NoopGatewaySession;

#[async_trait]
impl GatewaySession for NoopGatewaySession {
    async fn connect(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn register_commands(
        &self,
        commands: &[CommandDefinition],
    ) -> Result<Vec<String>, GatewayError> {
        Ok(commands.iter().map(|command| command.name.clone()).collect())
    }

    async fn next_event(&self) -> Result<Option<GatewayEnvelope>, GatewayError> {
        Ok(None)
    }

    async fn respond(
        &self,
        _interaction_id: &str,
        _message: &MessageTemplate,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}

pub struct GatewayRunner {
    session: Arc<dyn GatewaySession>,
    dispatcher: Arc<EventDispatcher>,
}

impl GatewayRunner {
    pub fn new(session: Arc<dyn GatewaySession>, dispatcher: EventDispatcher) -> Self {
        Self { session, dispatcher: Arc::new(dispatcher) }
    }

    /// Runs until the event stream closes. Interactions are handled concurrently and
    /// all in-flight replies are sent before the session disconnects.
    pub async fn start(&self) -> Result<(), GatewayError> {
        info!(event_name = "discord.gateway.connecting", "opening gateway session");
        self.session.connect().await?;

        let registered = self.session.register_commands(&command_definitions()).await?;
        for name in &registered {
            info!(event_name = "discord.command.registered", command = %name, "registered command");
        }

        let mut in_flight = JoinSet::new();
        let pumped = self.pump(&mut in_flight).await;

        while let Some(joined) = in_flight.join_next().await {
            if let Err(error) = joined {
                warn!(error = %error, "interaction task aborted");
            }
        }

        match pumped {
            Ok(()) => {
                info!(event_name = "discord.gateway.closed", "gateway stream closed");
                self.session.disconnect().await
            }
            Err(error) => {
                warn!(event_name = "discord.gateway.failed", error = %error, "gateway stream failed");
                if let Err(disconnect_error) = self.session.disconnect().await {
                    warn!(error = %disconnect_error, "disconnect after gateway failure failed");
                }
                Err(error)
            }
        }
    }

    async fn pump(&self, in_flight: &mut JoinSet<()>) -> Result<(), GatewayError> {
        loop {
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(error) = joined {
                    warn!(error = %error, "interaction task aborted");
                }
            }

            let Some(envelope) = self.session.next_event().await? else {
                return Ok(());
            };

            debug!(
                event_name = "discord.gateway.event_received",
                event_id = %envelope.event_id,
                event_type = ?envelope.event.event_type(),
                "received gateway event"
            );

            let interaction_id = match &envelope.event {
                GatewayEvent::Interaction(payload) => Some(payload.interaction_id.clone()),
                _ => None,
            };

            match interaction_id {
                Some(interaction_id) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let session = Arc::clone(&self.session);
                    in_flight.spawn(async move {
                        handle_interaction(&dispatcher, session.as_ref(), &envelope, &interaction_id)
                            .await;
                    });
                }
                None => {
                    if let Err(error) = self.dispatcher.dispatch(&envelope).await {
                        warn!(
                            event_id = %envelope.event_id,
                            error = %error,
                            "event dispatch failed; continuing gateway loop"
                        );
                    }
                }
            }
        }
    }
}

async fn handle_interaction(
    dispatcher: &EventDispatcher,
    session: &dyn GatewaySession,
    envelope: &GatewayEnvelope,
    interaction_id: &str,
) {
    match dispatcher.dispatch(envelope).await {
        Ok(HandlerResult::Responded(message)) => {
            if let Err(error) = session.respond(interaction_id, &message).await {
                warn!(
                    event_name = "discord.interaction.reply_failed",
                    interaction_id,
                    error = %error,
                    "failed to send interaction reply"
                );
            } else {
                debug!(
                    event_name = "discord.interaction.replied",
                    interaction_id,
                    "sent interaction reply"
                );
            }
        }
        Ok(HandlerResult::Processed | HandlerResult::Ignored) => {}
        Err(error) => warn!(
            event_id = %envelope.event_id,
            interaction_id,
            error = %error,
            "event dispatch failed; interaction left unanswered"
        ),
    }
}
