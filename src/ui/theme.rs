use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub bot_text_style: Style,
    pub strong_style: Style,
    pub emphasis_style: Style,
    pub inline_code_style: Style,
    pub link_style: Style,

    // Code blocks
    pub code_block_text_style: Style,
    pub code_block_bg: Option<Color>,
    pub badge_style: Style,

    // Copy controls
    pub copy_idle_style: Style,
    pub copy_success_style: Style,
    pub copy_failed_style: Style,
    pub selection_style: Style,

    // Chrome
    pub title_style: Style,
    pub typing_indicator_style: Style,
    pub notice_style: Style,
    pub input_border_style: Style,
    pub input_text_style: Style,
    pub input_disabled_style: Style,
    pub button_enabled_style: Style,
    pub button_disabled_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Rgb(16, 18, 24),
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            bot_text_style: Style::default().fg(Color::White),
            strong_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            emphasis_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::ITALIC),
            inline_code_style: Style::default().fg(Color::Rgb(230, 180, 120)),
            link_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),

            code_block_text_style: Style::default().fg(Color::Rgb(210, 210, 210)),
            code_block_bg: Some(Color::Rgb(30, 32, 40)),
            badge_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(120, 160, 220)),

            copy_idle_style: Style::default().fg(Color::DarkGray),
            copy_success_style: Style::default().fg(Color::Green),
            copy_failed_style: Style::default().fg(Color::Red),
            selection_style: Style::default().add_modifier(Modifier::REVERSED),

            title_style: Style::default().fg(Color::Gray),
            typing_indicator_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            notice_style: Style::default().fg(Color::LightRed),
            input_border_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
            input_disabled_style: Style::default().fg(Color::DarkGray),
            button_enabled_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            button_disabled_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::Rgb(250, 250, 250),
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            bot_text_style: Style::default().fg(Color::Black),
            strong_style: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            emphasis_style: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::ITALIC),
            inline_code_style: Style::default().fg(Color::Rgb(160, 60, 20)),
            link_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            code_block_text_style: Style::default().fg(Color::Rgb(40, 40, 40)),
            code_block_bg: Some(Color::Rgb(235, 235, 240)),
            badge_style: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(60, 100, 170)),

            copy_idle_style: Style::default().fg(Color::Gray),
            copy_success_style: Style::default().fg(Color::Green),
            copy_failed_style: Style::default().fg(Color::Red),
            selection_style: Style::default().add_modifier(Modifier::REVERSED),

            title_style: Style::default().fg(Color::DarkGray),
            typing_indicator_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            notice_style: Style::default().fg(Color::Red),
            input_border_style: Style::default().fg(Color::DarkGray),
            input_text_style: Style::default().fg(Color::Black),
            input_disabled_style: Style::default().fg(Color::Gray),
            button_enabled_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            button_disabled_style: Style::default().fg(Color::Gray),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark_default()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn code_block_style(&self) -> Style {
        match self.code_block_bg {
            Some(bg) => self.code_block_text_style.bg(bg),
            None => self.code_block_text_style,
        }
    }
}
