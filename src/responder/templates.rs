// Canned reply catalog for offline (template) mode
//
// A second substring scan, over topics and emotions instead of risk
// phrases. Tables are scanned in order and the first hit wins, so more
// specific entries must come before entries whose phrases they contain
// ("unhappy" contains "happy").

use serde::Serialize;

/// Caller-supplied conversation signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplyContext {
    /// Completed user/assistant exchanges so far
    pub turn_count: usize,
}

impl ReplyContext {
    pub fn new(turn_count: usize) -> Self {
        Self { turn_count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicTag {
    Gambling,
    Money,
    Work,
    Relationships,
    Family,
    Health,
    Sleep,
    Loneliness,
    Greeting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionTag {
    Sad,
    Happy,
    Angry,
    Anxious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationLength {
    Short,
    Long,
    VeryLong,
}

impl ConversationLength {
    pub fn from_turns(turns: usize) -> Self {
        match turns {
            0..=3 => ConversationLength::Short,
            4..=11 => ConversationLength::Long,
            _ => ConversationLength::VeryLong,
        }
    }
}

struct Entry<T: 'static> {
    tag: T,
    phrases: &'static [&'static str],
    replies: &'static [&'static str],
}

const EMOTIONS: &[Entry<EmotionTag>] = &[
    Entry {
        tag: EmotionTag::Sad,
        phrases: &["unhappy", "sad", "depressed", "miserable", "crying", "heartbroken"],
        replies: &[
            "I'm sorry you're feeling so low. It's okay to feel sad, and you don't have to carry it alone. What's weighing on you the most?",
            "That sounds really heavy. Sadness often comes in waves during recovery. Would it help to talk through what set this off?",
        ],
    },
    Entry {
        tag: EmotionTag::Happy,
        phrases: &["happy", "proud", "excited", "grateful", "good news", "great day"],
        replies: &[
            "That's wonderful to hear! Moments like this are worth holding on to. What do you think made today go well?",
            "I'm really glad you're feeling good. Celebrating progress matters. How could you build on this tomorrow?",
        ],
    },
    Entry {
        tag: EmotionTag::Angry,
        phrases: &["angry", "furious", "frustrated", "pissed off", "annoyed", "irritated"],
        replies: &[
            "It makes sense to feel frustrated. Anger can be a strong trigger, so let's slow down for a second. What happened?",
            "That sounds really infuriating. Before anything else, try unclenching your jaw and shoulders. What would help you let some of this out safely?",
        ],
    },
    Entry {
        tag: EmotionTag::Anxious,
        phrases: &["anxious", "anxiety", "nervous", "worried", "panic", "stressed"],
        replies: &[
            "Anxiety can feel overwhelming. Let's ground ourselves: name five things you can see around you right now.",
            "That worry sounds exhausting. Try breathing in for four counts and out for six. What's the thought that keeps coming back?",
        ],
    },
];

const TOPICS: &[Entry<TopicTag>] = &[
    Entry {
        tag: TopicTag::Gambling,
        phrases: &["gambling", "casino", "poker", "lottery", "sportsbook", "betting", "slots"],
        replies: &[
            "Thanks for being honest about gambling. Noticing the pull is a skill in itself. What usually happens right before the urge shows up?",
            "Recovery isn't a straight line. What's one thing that has helped you step away from gambling before?",
        ],
    },
    Entry {
        tag: TopicTag::Money,
        phrases: &["money", "debt", "loan", "bills", "savings", "paycheck", "budget"],
        replies: &[
            "Money stress is one of the hardest parts of recovery. Would it help to break things down into one small, concrete step for this week?",
            "Financial pressure can make everything feel urgent. Have you thought about handing day-to-day money control to someone you trust for a while?",
        ],
    },
    Entry {
        tag: TopicTag::Work,
        phrases: &["work", "job", "boss", "career", "office", "coworker"],
        replies: &[
            "Work can pile on a lot of pressure. What part of it is getting to you the most right now?",
            "It sounds like work has been taking a lot out of you. What would a slightly better day there look like?",
        ],
    },
    Entry {
        tag: TopicTag::Relationships,
        phrases: &["partner", "girlfriend", "boyfriend", "wife", "husband", "relationship", "breakup"],
        replies: &[
            "Relationships can be both a source of support and of stress. How are things between the two of you right now?",
            "It takes courage to talk about this. What do you wish the other person understood about what you're going through?",
        ],
    },
    Entry {
        tag: TopicTag::Family,
        phrases: &["family", "kids", "children", "my mom", "my dad", "mother", "father", "parents"],
        replies: &[
            "Family matters a lot in recovery. Is there someone in your family you feel you can lean on?",
            "Family situations can stir up a lot. What's been happening at home?",
        ],
    },
    Entry {
        tag: TopicTag::Health,
        phrases: &["health", "sick", "doctor", "exercise", "hospital", "headache"],
        replies: &[
            "Looking after your body is part of looking after your recovery. How have you been feeling physically?",
            "Health worries can add a lot of strain. Is there one small thing you could do for your body today, like a short walk or a glass of water?",
        ],
    },
    Entry {
        tag: TopicTag::Sleep,
        phrases: &["sleep", "insomnia", "tired", "exhausted"],
        replies: &[
            "Poor sleep makes urges and low moods harder to handle. What does your evening usually look like before bed?",
            "Being exhausted wears down your defences. Could you try putting your phone away half an hour before sleep tonight?",
        ],
    },
    Entry {
        tag: TopicTag::Loneliness,
        phrases: &["lonely", "alone", "isolated", "no friends"],
        replies: &[
            "Feeling alone is really hard, and I'm glad you're talking to me. Is there one person you could reach out to today, even with a short message?",
            "Isolation can make everything louder. Support groups can be a good place to meet people who get it. Have you ever tried one?",
        ],
    },
    Entry {
        tag: TopicTag::Greeting,
        phrases: &["hello", "good morning", "good afternoon", "good evening", "howdy"],
        replies: &[
            "Hello! I'm glad you checked in. How are you feeling today?",
            "Hi, it's good to hear from you. What's on your mind?",
        ],
    },
];

const SHORT_REPLIES: &[&str] = &[
    "Thanks for sharing that with me. Can you tell me a bit more about what's on your mind?",
    "I'm here and listening. What would be most helpful to talk about right now?",
];

const LONG_REPLIES: &[&str] = &[
    "We've been talking for {turns} exchanges now, and I can see you're putting real effort into this. What feels most important right now?",
    "Across these {turns} exchanges you've shown a lot of honesty. What's one thing you'd like to take away from today?",
];

const VERY_LONG_REPLIES: &[&str] = &[
    "We've covered a lot over {turns} exchanges. It might help to pause and notice one thing that has shifted for you since we started.",
    "That's {turns} exchanges of hard, honest work. Would it help to sum up what we've talked about and pick one next step?",
];

fn first_match<T: Copy>(table: &'static [Entry<T>], normalized: &str) -> Option<&'static Entry<T>> {
    table
        .iter()
        .find(|entry| entry.phrases.iter().any(|p| normalized.contains(p)))
}

fn pick(variants: &'static [&'static str], context: &ReplyContext) -> &'static str {
    variants[context.turn_count % variants.len()]
}

fn interpolate(template: &str, context: &ReplyContext) -> String {
    template.replace("{turns}", &context.turn_count.to_string())
}

/// Topic and emotion keyed canned replies
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCatalog;

impl TemplateCatalog {
    pub fn new() -> Self {
        Self
    }

    /// First emotion whose phrases occur in the text
    pub fn detect_emotion(&self, text: &str) -> Option<EmotionTag> {
        first_match(EMOTIONS, &text.to_lowercase()).map(|e| e.tag)
    }

    /// First topic whose phrases occur in the text
    pub fn detect_topic(&self, text: &str) -> Option<TopicTag> {
        first_match(TOPICS, &text.to_lowercase()).map(|e| e.tag)
    }

    /// Pick a reply: emotion first, then topic, then conversation length
    pub fn reply(&self, text: &str, context: &ReplyContext) -> String {
        let normalized = text.to_lowercase();

        let variants = if let Some(entry) = first_match(EMOTIONS, &normalized) {
            tracing::debug!(emotion = ?entry.tag, "Template reply by emotion");
            entry.replies
        } else if let Some(entry) = first_match(TOPICS, &normalized) {
            tracing::debug!(topic = ?entry.tag, "Template reply by topic");
            entry.replies
        } else {
            self.length_replies(ConversationLength::from_turns(context.turn_count))
        };

        interpolate(pick(variants, context), context)
    }

    fn length_replies(&self, length: ConversationLength) -> &'static [&'static str] {
        match length {
            ConversationLength::Short => SHORT_REPLIES,
            ConversationLength::Long => LONG_REPLIES,
            ConversationLength::VeryLong => VERY_LONG_REPLIES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_beats_topic() {
        let catalog = TemplateCatalog::new();
        let text = "I'm so anxious about work";

        assert_eq!(catalog.detect_emotion(text), Some(EmotionTag::Anxious));
        assert_eq!(catalog.detect_topic(text), Some(TopicTag::Work));
        assert!(catalog
            .reply(text, &ReplyContext::new(0))
            .starts_with("Anxiety can feel overwhelming"));
    }

    #[test]
    fn test_unhappy_is_sad() {
        assert_eq!(
            TemplateCatalog::new().detect_emotion("I've been unhappy"),
            Some(EmotionTag::Sad)
        );
    }

    #[test]
    fn test_topic_reply_variant_follows_turns() {
        let catalog = TemplateCatalog::new();

        let first = catalog.reply("my boss called again", &ReplyContext::new(0));
        let second = catalog.reply("my boss called again", &ReplyContext::new(1));

        assert!(first.starts_with("Work can pile on"));
        assert!(second.starts_with("It sounds like work"));
        assert_eq!(first, catalog.reply("my boss called again", &ReplyContext::new(2)));
    }

    #[test]
    fn test_length_fallback() {
        let catalog = TemplateCatalog::new();

        assert_eq!(catalog.reply("ok", &ReplyContext::new(0)), SHORT_REPLIES[0]);
        assert_eq!(
            catalog.reply("ok", &ReplyContext::new(4)),
            "We've been talking for 4 exchanges now, and I can see you're putting real effort into this. What feels most important right now?"
        );
        assert!(catalog.reply("ok", &ReplyContext::new(13)).contains("13 exchanges"));
    }

    #[test]
    fn test_conversation_length_buckets() {
        assert_eq!(ConversationLength::from_turns(0), ConversationLength::Short);
        assert_eq!(ConversationLength::from_turns(3), ConversationLength::Short);
        assert_eq!(ConversationLength::from_turns(4), ConversationLength::Long);
        assert_eq!(ConversationLength::from_turns(11), ConversationLength::Long);
        assert_eq!(ConversationLength::from_turns(12), ConversationLength::VeryLong);
    }

    #[test]
    fn test_every_entry_has_replies() {
        assert!(EMOTIONS.iter().all(|e| !e.replies.is_empty() && !e.phrases.is_empty()));
        assert!(TOPICS.iter().all(|e| !e.replies.is_empty() && !e.phrases.is_empty()));
    }
}
