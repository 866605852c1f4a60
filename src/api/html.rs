//! Extraction of replies and transcripts from server-rendered pages.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::api::{ServerReply, TranscriptEntry};
use crate::core::message::MessageRole;

static BOT_MESSAGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&MessageRole::Bot.selector()).expect("static selector is valid")
});

static ANY_MESSAGE: LazyLock<Selector> = LazyLock::new(|| {
    let selector = format!(
        "{}, {}",
        MessageRole::User.selector(),
        MessageRole::Bot.selector()
    );
    Selector::parse(&selector).expect("static selector is valid")
});

/// Reduce a full page to its newest bot reply.
///
/// The page lists the whole conversation, so the last `.bot-message` element
/// is the answer to the message just sent. A page without one yields an
/// empty reply rather than an error.
pub fn extract_reply(page: &str) -> ServerReply {
    let document = Html::parse_document(page);
    let reply = document
        .select(&BOT_MESSAGE)
        .last()
        .map(|element| element.inner_html());
    ServerReply { reply, ok: true }
}

/// Every user and bot message of a page, in document order.
pub fn extract_transcript(page: &str) -> Vec<TranscriptEntry> {
    let document = Html::parse_document(page);
    document
        .select(&ANY_MESSAGE)
        .filter_map(|element| {
            let role = MessageRole::from_classes(element.value().classes())?;
            Some(TranscriptEntry {
                role,
                content: element.inner_html(),
            })
        })
        .collect()
}
