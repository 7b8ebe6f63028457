//! MessageDisplay の実装
//!
//! - **ConsoleMessages**: 標準出力に出す（CLI 用）
//! - **RecordingMessages**: 記録するだけ（テスト用）

use std::cell::RefCell;

use tracing::debug;

use crate::ports::{MessageDisplay, MessageTone};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMessages;

impl ConsoleMessages {
    pub fn new() -> Self {
        Self
    }

    fn badge(tone: MessageTone) -> &'static str {
        match tone {
            MessageTone::Info => "[i]",
            MessageTone::Success => "[+]",
            MessageTone::Warning => "[!]",
            MessageTone::Error => "[x]",
        }
    }
}

impl MessageDisplay for ConsoleMessages {
    fn show_message(&self, message: &str, tone: MessageTone) {
        debug!(?tone, message, "show message");
        println!("{} {}", Self::badge(tone), message);
    }
}

#[derive(Debug, Default)]
pub struct RecordingMessages {
    shown: RefCell<Vec<(String, MessageTone)>>,
}

impl RecordingMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything shown so far, oldest first.
    pub fn messages(&self) -> Vec<(String, MessageTone)> {
        self.shown.borrow().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.shown.borrow().iter().map(|(text, _)| text.clone()).collect()
    }

    pub fn clear(&self) {
        self.shown.borrow_mut().clear();
    }
}

impl MessageDisplay for RecordingMessages {
    fn show_message(&self, message: &str, tone: MessageTone) {
        self.shown.borrow_mut().push((message.to_string(), tone));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_keeps_order_and_tone() {
        let messages = RecordingMessages::new();
        messages.show_message("You feed cow1!", MessageTone::Success);
        messages.show_message("hello", MessageTone::Info);

        assert_eq!(
            messages.messages(),
            vec![
                ("You feed cow1!".to_string(), MessageTone::Success),
                ("hello".to_string(), MessageTone::Info),
            ]
        );
        messages.clear();
        assert!(messages.texts().is_empty());
    }
}
