use crate::events::AppEvent;
use crate::models::{Message, MessageRole};

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub messages: Vec<Message>,
    pub input_buffer: String,
    pub scroll_offset: usize,
    #[allow(dead_code)]
    pub width: u16,
    #[allow(dead_code)]
    pub height: u16,
    pub is_streaming: bool,
    pub model: String,
    pub shell: String,
}

impl App {
    pub const fn new(model: String, shell: String) -> Self {
        Self {
            should_quit: false,
            messages: Vec::new(),
            input_buffer: String::new(),
            scroll_offset: 0,
            width: 0,
            height: 0,
            is_streaming: false,
            model,
            shell,
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub const fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self) {
        // Set to a very large number; the rendering code clamps this to the
        // maximum possible scroll for the current wrap width
        self.scroll_offset = usize::MAX;
    }

    /// Stage a submission: append the user line and an empty assistant
    /// placeholder, clear the input and return the text to hand to the
    /// requester. Returns None when the input is empty or a response is
    /// still streaming, in which case nothing is appended.
    pub fn begin_submission(&mut self) -> Option<String> {
        if self.is_streaming || self.input_buffer.is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.input_buffer);
        self.messages
            .push(Message::new(MessageRole::User, text.clone()));
        self.messages
            .push(Message::new(MessageRole::Assistant, String::new()));
        self.is_streaming = true;
        self.scroll_to_bottom();

        Some(text)
    }

    /// Apply one requester event to the transcript. The event loop is the
    /// sole caller, so transcript ownership stays on this side of the
    /// channel.
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ResponseFragment(fragment) => {
                // Ignore stragglers after the stream was marked finished
                if !self.is_streaming {
                    return;
                }
                if let Some(last) = self.messages.last_mut() {
                    if last.role == MessageRole::Assistant {
                        last.content.push_str(&fragment);
                    }
                }
                self.scroll_to_bottom();
            }
            AppEvent::ResponseComplete => {
                self.is_streaming = false;
                self.scroll_to_bottom();
            }
            AppEvent::ResponseFailed(error) => {
                self.is_streaming = false;
                // Partial fragments stay in the placeholder above this entry
                self.messages.push(Message::new(
                    MessageRole::Assistant,
                    format!("Error: {error}"),
                ));
                self.scroll_to_bottom();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new("gpt-4o-mini".to_string(), "zsh".to_string())
    }

    #[test]
    fn test_app_new() {
        let app = app();
        assert!(!app.should_quit);
        assert!(!app.is_streaming);
        assert!(app.messages.is_empty());
        assert_eq!(app.model, "gpt-4o-mini");
    }

    #[test]
    fn test_app_quit() {
        let mut app = app();
        app.input_buffer.push_str("unsent draft");
        app.quit();
        assert!(app.should_quit);
        // Quitting mutates nothing but the flag
        assert!(app.messages.is_empty());
        assert_eq!(app.input_buffer, "unsent draft");
    }

    #[test]
    fn test_resize_updates_dimensions_only() {
        let mut app = app();
        app.messages
            .push(Message::new(MessageRole::User, "hi".to_string()));
        app.scroll_offset = 3;
        app.resize(120, 40);
        assert_eq!((app.width, app.height), (120, 40));
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.scroll_offset, 3);
    }

    #[test]
    fn test_begin_submission_appends_pair_and_clears_input() {
        let mut app = app();
        app.input_buffer = "Hello there".to_string();

        let text = app.begin_submission();

        assert_eq!(text.as_deref(), Some("Hello there"));
        assert!(app.input_buffer.is_empty());
        assert!(app.is_streaming);
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[0].role, MessageRole::User);
        assert_eq!(app.messages[0].content, "Hello there");
        assert_eq!(app.messages[1].role, MessageRole::Assistant);
        assert!(app.messages[1].content.is_empty());
        assert_eq!(app.scroll_offset, usize::MAX);
    }

    #[test]
    fn test_begin_submission_rejects_empty_input() {
        let mut app = app();
        assert!(app.begin_submission().is_none());
        assert!(app.messages.is_empty());
        assert!(!app.is_streaming);
    }

    #[test]
    fn test_begin_submission_rejects_while_streaming() {
        let mut app = app();
        app.input_buffer = "first".to_string();
        app.begin_submission().unwrap();

        app.input_buffer = "second".to_string();
        assert!(app.begin_submission().is_none());
        // The rejected text stays in the input box
        assert_eq!(app.input_buffer, "second");
        assert_eq!(app.messages.len(), 2);
    }

    #[test]
    fn test_fragments_concatenate_in_arrival_order() {
        let mut app = app();
        app.input_buffer = "hi".to_string();
        app.begin_submission().unwrap();

        for fragment in ["Hel", "lo", " world"] {
            app.apply_event(AppEvent::ResponseFragment(fragment.to_string()));
        }
        app.apply_event(AppEvent::ResponseComplete);

        assert_eq!(app.messages[1].content, "Hello world");
        assert!(!app.is_streaming);
    }

    #[test]
    fn test_transcript_has_two_lines_per_submission() {
        let mut app = app();
        for i in 0..3 {
            app.input_buffer = format!("question {i}");
            app.begin_submission().unwrap();
            app.apply_event(AppEvent::ResponseFragment(format!("answer {i}")));
            app.apply_event(AppEvent::ResponseComplete);
        }

        assert_eq!(app.messages.len(), 6);
        for i in 0..3 {
            assert_eq!(app.messages[2 * i].content, format!("question {i}"));
            assert_eq!(app.messages[2 * i + 1].content, format!("answer {i}"));
        }
    }

    #[test]
    fn test_error_retains_partial_response() {
        let mut app = app();
        app.input_buffer = "hi".to_string();
        app.begin_submission().unwrap();

        app.apply_event(AppEvent::ResponseFragment("partial ans".to_string()));
        app.apply_event(AppEvent::ResponseFailed("connection reset".to_string()));

        assert!(!app.is_streaming);
        assert_eq!(app.messages.len(), 3);
        assert_eq!(app.messages[1].content, "partial ans");
        assert_eq!(app.messages[2].content, "Error: connection reset");

        // The error is terminal for the cycle, not the session
        app.input_buffer = "again".to_string();
        assert!(app.begin_submission().is_some());
    }

    #[test]
    fn test_fragment_after_completion_is_ignored() {
        let mut app = app();
        app.input_buffer = "hi".to_string();
        app.begin_submission().unwrap();
        app.apply_event(AppEvent::ResponseFragment("done".to_string()));
        app.apply_event(AppEvent::ResponseComplete);

        app.apply_event(AppEvent::ResponseFragment("straggler".to_string()));
        assert_eq!(app.messages[1].content, "done");
    }

    #[test]
    fn test_scroll_up() {
        let mut app = app();
        app.scroll_offset = 10;
        app.scroll_up(3);
        assert_eq!(app.scroll_offset, 7);
        app.scroll_up(10);
        assert_eq!(app.scroll_offset, 0); // saturating_sub
    }

    #[test]
    fn test_scroll_down() {
        let mut app = app();
        app.scroll_down(3);
        assert_eq!(app.scroll_offset, 3);
        // Clamping to content height happens in the UI layer
        app.scroll_down(100);
        assert_eq!(app.scroll_offset, 103);
    }

    #[test]
    fn test_scroll_to_top() {
        let mut app = app();
        app.scroll_offset = 10;
        app.scroll_to_top();
        assert_eq!(app.scroll_offset, 0);
    }
}
