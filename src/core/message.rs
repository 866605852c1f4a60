/// Marker class the server puts on user-authored message elements.
pub const USER_MESSAGE_CLASS: &str = "user-message";
/// Marker class the server puts on bot reply elements.
pub const BOT_MESSAGE_CLASS: &str = "bot-message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageRole {
    User,
    Bot,
}

impl MessageRole {
    pub fn marker_class(self) -> &'static str {
        match self {
            MessageRole::User => USER_MESSAGE_CLASS,
            MessageRole::Bot => BOT_MESSAGE_CLASS,
        }
    }

    /// CSS selector matching elements of this role.
    pub fn selector(self) -> String {
        format!(".{}", self.marker_class())
    }

    /// Resolve a role from an element's class list.
    pub fn from_classes<'a>(mut classes: impl Iterator<Item = &'a str>) -> Option<Self> {
        classes.find_map(|class| match class {
            USER_MESSAGE_CLASS => Some(MessageRole::User),
            BOT_MESSAGE_CLASS => Some(MessageRole::Bot),
            _ => None,
        })
    }

    pub fn is_bot(self) -> bool {
        self == MessageRole::Bot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_resolve_from_marker_classes() {
        let classes = ["message", "bot-message"];
        assert_eq!(
            MessageRole::from_classes(classes.iter().copied()),
            Some(MessageRole::Bot)
        );
        assert_eq!(
            MessageRole::from_classes(["user-message"].iter().copied()),
            Some(MessageRole::User)
        );
        assert_eq!(MessageRole::from_classes(["typing"].iter().copied()), None);
    }

    #[test]
    fn selectors_use_marker_classes() {
        assert_eq!(MessageRole::User.selector(), ".user-message");
        assert_eq!(MessageRole::Bot.selector(), ".bot-message");
    }
}
