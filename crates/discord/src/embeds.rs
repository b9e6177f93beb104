use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Embed {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|field| field.name == name).map(|field| field.value.as_str())
    }
}

/// One interaction reply: markdown content, rich embeds, or both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

impl MessageTemplate {
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), embeds: Vec::new() }
    }

    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.content().is_empty() && self.embeds.is_empty()
    }
}

#[derive(Default)]
pub struct MessageBuilder {
    embeds: Vec<Embed>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn embed<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut EmbedBuilder),
    {
        let mut builder = EmbedBuilder::default();
        build(&mut builder);
        self.embeds.push(builder.build());
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { content: None, embeds: self.embeds }
    }
}

#[derive(Default)]
pub struct EmbedBuilder {
    embed: Embed,
}

impl EmbedBuilder {
    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.embed.title = Some(title.into());
        self
    }

    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.embed.url = Some(url.into());
        self
    }

    pub fn image(&mut self, url: impl Into<String>) -> &mut Self {
        self.embed.image = Some(EmbedMedia { url: url.into() });
        self
    }

    pub fn thumbnail(&mut self, url: impl Into<String>) -> &mut Self {
        self.embed.thumbnail = Some(EmbedMedia { url: url.into() });
        self
    }

    pub fn inline_field(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.embed.fields.push(EmbedField { name: name.into(), value: value.into(), inline: true });
        self
    }

    pub fn timestamp(&mut self, timestamp: impl Into<String>) -> &mut Self {
        self.embed.timestamp = Some(timestamp.into());
        self
    }

    fn build(self) -> Embed {
        self.embed
    }
}
