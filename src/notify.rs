use std::cell::RefCell;
use std::fmt;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Error,
}

/// Fire-and-forget outcome reporting for the user.
pub trait Notifier {
    fn notify(&self, level: NotifyLevel, message: &str);
}

/// Blocking yes/no prompt in front of destructive operations.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: RefCell<Vec<(NotifyLevel, String)>>,
}

#[derive(Debug, Default)]
pub struct PromptConfirm;

#[derive(Debug, Clone, Copy)]
pub struct FixedConfirm(pub bool);

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyLevel::Success => f.write_str("success"),
            NotifyLevel::Error => f.write_str("error"),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Success => println!("{}", message),
            NotifyLevel::Error => eprintln!("error: {}", message),
        }
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        RecordingNotifier::default()
    }

    pub fn entries(&self) -> Vec<(NotifyLevel, String)> {
        self.entries.borrow().clone()
    }

    pub fn last(&self) -> Option<(NotifyLevel, String)> {
        self.entries.borrow().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

impl<N: Notifier + ?Sized> Notifier for std::rc::Rc<N> {
    fn notify(&self, level: NotifyLevel, message: &str) {
        (**self).notify(level, message)
    }
}

impl Confirm for PromptConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

impl Confirm for FixedConfirm {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(NotifyLevel::Success, "one");
        notifier.notify(NotifyLevel::Error, "two");
        assert_eq!(
            notifier.entries(),
            [
                (NotifyLevel::Success, "one".to_string()),
                (NotifyLevel::Error, "two".to_string())
            ]
        );
    }

    #[test]
    fn shared_notifier_records_through_rc() {
        let shared = Rc::new(RecordingNotifier::new());
        let handle: Box<dyn Notifier> = Box::new(Rc::clone(&shared));
        handle.notify(NotifyLevel::Error, "boom");
        assert_eq!(shared.last(), Some((NotifyLevel::Error, "boom".to_string())));
    }

    #[test]
    fn fixed_confirm_answers_as_configured() {
        assert!(FixedConfirm(true).confirm("sure?"));
        assert!(!FixedConfirm(false).confirm("sure?"));
    }
}
