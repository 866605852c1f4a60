use tui_textarea::{CursorMove, TextArea};

/// Input buffer plus the enabled flags of the input and submit controls.
#[derive(Debug)]
pub struct FormState {
    textarea: TextArea<'static>,
    input_enabled: bool,
    submit_enabled: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        let mut form = Self {
            textarea: TextArea::default(),
            input_enabled: true,
            submit_enabled: false,
        };
        form.update_submit_enabled();
        form
    }

    pub fn value(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// Replace the buffer, leaving the cursor at the end of the text.
    pub(crate) fn set_value(&mut self, text: &str) {
        let lines: Vec<String> = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        self.textarea = TextArea::from(lines);
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
        self.update_submit_enabled();
    }

    pub(crate) fn clear(&mut self) {
        self.set_value("");
    }

    /// Lock both controls while a request is in flight.
    pub(crate) fn disable(&mut self) {
        self.input_enabled = false;
        self.submit_enabled = false;
    }

    pub(crate) fn enable_input(&mut self) {
        self.input_enabled = true;
        self.update_submit_enabled();
    }

    /// Submit is enabled iff the input is enabled and holds non-blank text.
    pub fn update_submit_enabled(&mut self) {
        self.submit_enabled = self.input_enabled && !self.value().trim().is_empty();
    }

    /// Apply an edit to the buffer. Ignored while input is disabled.
    pub(crate) fn apply_edit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut TextArea<'static>),
    {
        if !self.input_enabled {
            return false;
        }
        f(&mut self.textarea);
        self.update_submit_enabled();
        true
    }
}
