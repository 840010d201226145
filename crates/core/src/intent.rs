//! Intent classification - cheap local pre-filter
//!
//! Decides whether an inbound message is chatter or a scheduling request
//! before any external call is made. Classification is a priority chain over
//! four phrase sets; the first set that matches wins. A message matching
//! nothing is Ambiguous and gets a canned help response without ever touching
//! the extractor.

/// Terminal classification of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Gratitude,
    SmallTalk,
    SchedulingRequest,
    /// No phrase set matched; not treated as a scheduling request.
    Ambiguous,
}

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "namaste",
];

const GRATITUDE: &[&str] = &["thank you", "thanks", "thankyou", "thx", "appreciate it"];

const SMALL_TALK: &[&str] = &[
    "how are you",
    "what's up",
    "whats up",
    "who are you",
    "what can you do",
    "help",
];

const SCHEDULING_KEYWORDS: &[&str] = &[
    // Verbs and event nouns
    "schedule",
    "meeting",
    "meet",
    "block",
    "remind",
    "reminder",
    "book",
    "plan",
    "call",
    "appointment",
    "event",
    "task",
    "focus",
    "deadline",
    "reschedule",
    "cancel",
    // Relative days
    "today",
    "tomorrow",
    "tonight",
    "next week",
    // Day names
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    // Month names
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    // Times and durations
    "am",
    "pm",
    "hour",
    "hours",
    "minute",
    "minutes",
    "morning",
    "afternoon",
    "evening",
    "noon",
];

/// Keyword/phrase-based classifier. Stateless and infallible.
#[derive(Debug, Default, Clone)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a message. Priority order: greeting, gratitude, small talk,
    /// scheduling keywords; anything else is Ambiguous.
    pub fn classify(&self, text: &str) -> Intent {
        let normalized = normalize(text);

        if contains_any(&normalized, GREETINGS) {
            return Intent::Greeting;
        }
        if contains_any(&normalized, GRATITUDE) {
            return Intent::Gratitude;
        }
        if contains_any(&normalized, SMALL_TALK) {
            return Intent::SmallTalk;
        }
        if contains_any(&normalized, SCHEDULING_KEYWORDS) {
            return Intent::SchedulingRequest;
        }

        Intent::Ambiguous
    }
}

/// Lower-case, strip punctuation, and pad with spaces so phrase containment
/// can test on word boundaries ("hi" must not match inside "this").
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    for c in text.chars() {
        if c.is_alphanumeric() || c == '\'' {
            out.extend(c.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.push(' ');
    out
}

fn contains_any(normalized: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| normalized.contains(&format!(" {phrase} ")))
}
