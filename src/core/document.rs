//! The owned UI tree: message list, typing indicator and list-level state.
//!
//! Mutation goes through `pub(crate)` methods that only the controller calls.
//! Everything else (renderer, CLI, tests) reads.

use std::time::Instant;

use crate::core::copy::CopyControl;
use crate::core::markup::{Block, CodeBlock};
use crate::core::message::MessageRole;

pub type NodeId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// Literal user text, never interpreted as markup.
    Text {
        text: String,
        copy: Option<CopyControl>,
    },
    /// Server markup and the blocks it was interpreted into.
    Markup { markup: String, blocks: Vec<Block> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageNode {
    pub id: NodeId,
    pub role: MessageRole,
    pub body: MessageBody,
}

impl MessageNode {
    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeBlock> {
        let blocks: &[Block] = match &self.body {
            MessageBody::Markup { blocks, .. } => blocks,
            MessageBody::Text { .. } => &[],
        };
        blocks.iter().filter_map(|block| match block {
            Block::Code(code) => Some(code),
            Block::Text(_) => None,
        })
    }

    pub fn code_blocks_mut(&mut self) -> impl Iterator<Item = &mut CodeBlock> {
        let blocks: &mut [Block] = match &mut self.body {
            MessageBody::Markup { blocks, .. } => blocks,
            MessageBody::Text { .. } => &mut [],
        };
        blocks.iter_mut().filter_map(|block| match block {
            Block::Code(code) => Some(code),
            Block::Text(_) => None,
        })
    }
}

/// Transient "bot is typing" marker. Not a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingIndicator {
    pub started: Instant,
}

/// Address of a copy control: a user message, or the n-th code block of a
/// bot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CopyTarget {
    pub node: NodeId,
    pub code_block: Option<usize>,
}

#[derive(Debug, Default)]
pub struct ChatDocument {
    messages: Vec<MessageNode>,
    typing: Option<TypingIndicator>,
    clear_enabled: bool,
    // Lines scrolled back from the bottom; 0 follows the newest content.
    scroll_back: u16,
    next_id: NodeId,
}

impl ChatDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[MessageNode] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&MessageNode> {
        self.messages.iter().find(|node| node.id == id)
    }

    pub fn last_bot_message(&self) -> Option<&MessageNode> {
        self.messages.iter().rev().find(|node| node.role.is_bot())
    }

    pub fn typing(&self) -> Option<TypingIndicator> {
        self.typing
    }

    pub fn is_clear_enabled(&self) -> bool {
        self.clear_enabled
    }

    pub fn scroll_back(&self) -> u16 {
        self.scroll_back
    }

    pub fn is_following(&self) -> bool {
        self.scroll_back == 0
    }

    /// Every copy control in display order.
    pub fn copy_targets(&self) -> Vec<CopyTarget> {
        let mut targets = Vec::new();
        for node in &self.messages {
            match &node.body {
                MessageBody::Text { copy: Some(_), .. } => targets.push(CopyTarget {
                    node: node.id,
                    code_block: None,
                }),
                MessageBody::Text { copy: None, .. } => {}
                MessageBody::Markup { .. } => {
                    for (index, code) in node.code_blocks().enumerate() {
                        if code.copy.is_some() {
                            targets.push(CopyTarget {
                                node: node.id,
                                code_block: Some(index),
                            });
                        }
                    }
                }
            }
        }
        targets
    }

    /// Text a copy control puts on the clipboard.
    pub fn copy_text(&self, target: CopyTarget) -> Option<String> {
        let node = self.node(target.node)?;
        match (&node.body, target.code_block) {
            (MessageBody::Text { text, .. }, None) => Some(text.clone()),
            (MessageBody::Markup { .. }, Some(index)) => {
                node.code_blocks().nth(index).map(|code| code.text.clone())
            }
            _ => None,
        }
    }

    pub fn copy_control(&self, target: CopyTarget) -> Option<&CopyControl> {
        let node = self.node(target.node)?;
        match (&node.body, target.code_block) {
            (MessageBody::Text { copy, .. }, None) => copy.as_ref(),
            (MessageBody::Markup { .. }, Some(index)) => {
                node.code_blocks().nth(index).and_then(|code| code.copy.as_ref())
            }
            _ => None,
        }
    }

    pub(crate) fn copy_control_mut(&mut self, target: CopyTarget) -> Option<&mut CopyControl> {
        let node = self.node_mut(target.node)?;
        match target.code_block {
            None => match &mut node.body {
                MessageBody::Text { copy, .. } => copy.as_mut(),
                MessageBody::Markup { .. } => None,
            },
            Some(index) => node
                .code_blocks_mut()
                .nth(index)
                .and_then(|code| code.copy.as_mut()),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut MessageNode> {
        self.messages.iter_mut().find(|node| node.id == id)
    }

    pub(crate) fn append_user(&mut self, text: String) -> NodeId {
        self.push(MessageRole::User, MessageBody::Text { text, copy: None })
    }

    pub(crate) fn append_bot(&mut self, markup: String, blocks: Vec<Block>) -> NodeId {
        self.push(MessageRole::Bot, MessageBody::Markup { markup, blocks })
    }

    fn push(&mut self, role: MessageRole, body: MessageBody) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(MessageNode { id, role, body });
        id
    }

    /// Show the typing indicator. A second call keeps the existing one.
    pub(crate) fn show_typing(&mut self, now: Instant) {
        if self.typing.is_none() {
            self.typing = Some(TypingIndicator { started: now });
        }
    }

    pub(crate) fn hide_typing(&mut self) -> bool {
        self.typing.take().is_some()
    }

    /// The clear control turns on with the first message and stays on.
    pub(crate) fn refresh_clear_enabled(&mut self) {
        if !self.messages.is_empty() {
            self.clear_enabled = true;
        }
    }

    pub(crate) fn scroll_to_latest(&mut self) {
        self.scroll_back = 0;
    }

    pub(crate) fn scroll_up(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
    }

    pub(crate) fn scroll_down(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    pub(crate) fn clamp_scroll(&mut self, max_back: u16) {
        self.scroll_back = self.scroll_back.min(max_back);
    }

    /// Expire copy feedback. Returns true if anything changed on screen.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for node in &mut self.messages {
            match &mut node.body {
                MessageBody::Text {
                    copy: Some(copy), ..
                } => changed |= copy.tick(now),
                MessageBody::Text { copy: None, .. } => {}
                MessageBody::Markup { blocks, .. } => {
                    for block in blocks.iter_mut() {
                        if let Block::Code(CodeBlock {
                            copy: Some(copy), ..
                        }) = block
                        {
                            changed |= copy.tick(now);
                        }
                    }
                }
            }
        }
        changed
    }

    /// Empty the conversation. The clear control goes back to disabled
    /// because nothing is left to clear.
    pub(crate) fn reset(&mut self) {
        self.messages.clear();
        self.typing = None;
        self.clear_enabled = false;
        self.scroll_back = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markup::parse_markup;

    #[test]
    fn typing_indicator_is_not_a_message() {
        let mut doc = ChatDocument::new();
        doc.show_typing(Instant::now());
        doc.show_typing(Instant::now());
        assert!(doc.typing().is_some());
        assert_eq!(doc.len(), 0);
        assert!(doc.hide_typing());
        assert!(!doc.hide_typing());
    }

    #[test]
    fn clear_control_stays_enabled_once_on() {
        let mut doc = ChatDocument::new();
        doc.refresh_clear_enabled();
        assert!(!doc.is_clear_enabled());
        doc.append_user("hi".into());
        doc.refresh_clear_enabled();
        assert!(doc.is_clear_enabled());
        doc.refresh_clear_enabled();
        assert!(doc.is_clear_enabled());
    }

    #[test]
    fn copy_targets_follow_display_order() {
        let mut doc = ChatDocument::new();
        let user = doc.append_user("hi".into());
        if let Some(MessageNode {
            body: MessageBody::Text { copy, .. },
            ..
        }) = doc.node_mut(user)
        {
            *copy = Some(CopyControl::new());
        }
        let markup = "<pre>a</pre><p>x</p><pre>b</pre>";
        let bot = doc.append_bot(markup.into(), parse_markup(markup));
        for code in doc.node_mut(bot).into_iter().flat_map(|n| n.code_blocks_mut()) {
            code.copy = Some(CopyControl::new());
        }

        let targets = doc.copy_targets();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].code_block, None);
        assert_eq!(doc.copy_text(targets[2]).as_deref(), Some("b"));
    }

    #[test]
    fn scrolling_back_and_returning_to_latest() {
        let mut doc = ChatDocument::new();
        doc.scroll_up(5);
        assert!(!doc.is_following());
        doc.scroll_down(2);
        assert_eq!(doc.scroll_back(), 3);
        doc.clamp_scroll(1);
        assert_eq!(doc.scroll_back(), 1);
        doc.scroll_to_latest();
        assert!(doc.is_following());
    }
}
