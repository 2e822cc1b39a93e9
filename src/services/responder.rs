use std::collections::HashMap;
use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::models::ClassSession;

/// Which canned reply a query gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCase {
    Greeting,
    FreeNoConflict,
    FreeGeneric,
    BusyMorning,
    BusyEvening,
    BusyMany,
    BusyLocation,
    BusyDefault,
    Fallback,
}

/// Coarse reading of what the user typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryIntent {
    pub greeting: bool,
    pub availability: bool,
    pub location: bool,
    pub exam: bool,
}

const GREETING_KEYWORDS: [&str; 4] = ["你好", "hello", "hi", "在吗"];
const AVAILABILITY_KEYWORDS: [&str; 7] = ["冲突", "空闲", "没课", "有时间", "free", "available", "conflict"];
const LOCATION_KEYWORDS: [&str; 5] = ["在哪", "地点", "教室", "where", "room"];
const EXAM_KEYWORDS: [&str; 4] = ["考试", "复习", "exam", "review"];

impl QueryIntent {
    pub fn detect(query: &str) -> Self {
        let lowered = query.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let hit = |keywords: &[&str]| keywords.iter().any(|k| keyword_matches(&lowered, &words, k));

        Self {
            greeting: hit(&GREETING_KEYWORDS),
            availability: hit(&AVAILABILITY_KEYWORDS),
            location: hit(&LOCATION_KEYWORDS),
            exam: hit(&EXAM_KEYWORDS),
        }
    }
}

/// ASCII keywords must match a whole word ("hi" is not in "this"); the
/// rest are plain substrings.
fn keyword_matches(lowered: &str, words: &[&str], keyword: &str) -> bool {
    if keyword.is_ascii() {
        words.contains(&keyword)
    } else {
        lowered.contains(keyword)
    }
}

/// Coarse reading of the matched rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultShape {
    pub count: usize,
    pub morning: bool,
    pub evening: bool,
    pub weekend: bool,
}

impl ResultShape {
    pub fn of(sessions: &[ClassSession]) -> Self {
        let hour_prefix = |prefixes: &[&str]| {
            sessions.iter().any(|s| {
                let times = [s.start_time.format("%H:").to_string(), s.end_time.format("%H:").to_string()];
                times.iter().any(|t| prefixes.contains(&t.as_str()))
            })
        };

        Self {
            count: sessions.len(),
            morning: hour_prefix(&["08:", "09:"]),
            evening: hour_prefix(&["19:", "20:"]),
            weekend: sessions.iter().any(|s| s.day.is_weekend()),
        }
    }

    pub fn has_courses(&self) -> bool {
        self.count > 0
    }
}

/// Dispatch order: greeting, then free time (conflict wording or not),
/// then busy: morning, evening, three or more sessions, location, default.
pub fn select_case(intent: &QueryIntent, shape: &ResultShape) -> ResponseCase {
    if intent.greeting {
        return ResponseCase::Greeting;
    }

    if !shape.has_courses() {
        return if intent.availability {
            ResponseCase::FreeNoConflict
        } else {
            ResponseCase::FreeGeneric
        };
    }

    if shape.morning {
        ResponseCase::BusyMorning
    } else if shape.evening {
        ResponseCase::BusyEvening
    } else if shape.count >= 3 {
        ResponseCase::BusyMany
    } else if intent.location {
        ResponseCase::BusyLocation
    } else {
        ResponseCase::BusyDefault
    }
}

pub const FALLBACK_REPLY: &str =
    "Not sure what you meant, but here is what I found in your timetable.";

/// Reply templates per case. `{count}` is replaced with the number of
/// matched sessions.
#[derive(Debug, Clone)]
pub struct TemplateTable {
    templates: HashMap<ResponseCase, Vec<String>>,
}

impl TemplateTable {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn with_case<I, S>(mut self, case: ResponseCase, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates
            .insert(case, templates.into_iter().map(Into::into).collect());
        self
    }

    pub fn get(&self, case: ResponseCase) -> &[String] {
        self.templates.get(&case).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for TemplateTable {
    fn default() -> Self {
        Self::empty()
            .with_case(ResponseCase::Greeting, [
                "👋 Hi! I'm your timetable assistant, ask me anything about your classes.",
                "Hello! Looking for your schedule or some free time?",
                "I'm here! Just a bot, but I'll keep you company while you study 🤖",
            ])
            .with_case(ResponseCase::FreeNoConflict, [
                "Good news! That slot is completely free, no conflicts 🎉",
                "Scanned it: no classes then. Library or nap? 🛌",
                "Perfect, nothing scheduled. That time is all yours!",
            ])
            .with_case(ResponseCase::FreeGeneric, [
                "No classes found for that. Time for a bubble tea 🥤",
                "Hmm, nothing there. Maybe a class-free day? 😎",
                "No classes. Good time to preview the next lecture (or play a round) 🎮",
            ])
            .with_case(ResponseCase::BusyMorning, [
                "Early bird! {count} class(es) in the morning, don't skip breakfast 🥯",
                "Morning shift: {count} class(es). Bring water and your books 📚",
                "Busy morning ahead, you've got this 💪",
            ])
            .with_case(ResponseCase::BusyEvening, [
                "Hang in there, {count} class(es) in the evening. Late snack afterwards 🍢",
                "Evening classes tonight, get home safe!",
                "Evening classes are tiring but worth it, keep going 🦆",
            ])
            .with_case(ResponseCase::BusyMany, [
                "Wow, {count} classes! A long day, stay strong 🛡️",
                "Packed timetable ({count} classes). Remember to take breaks.",
                "That's a lot of classes... treat yourself afterwards 🍲",
            ])
            .with_case(ResponseCase::BusyLocation, [
                "Found it! The room is in the table below, don't go to the wrong one 🏃",
            ])
            .with_case(ResponseCase::BusyDefault, [
                "Got it! Found {count} class(es), details below 👇",
                "{count} class(es) waiting for you. Ready?",
                "Search done. No slacking today, go grab a seat 💺",
            ])
            .with_case(ResponseCase::Fallback, [FALLBACK_REPLY])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub case: ResponseCase,
    pub intent: QueryIntent,
    pub text: String,
}

/// Picks one template for the selected case. The picker is seedable so
/// replies are reproducible.
pub struct Responder {
    templates: TemplateTable,
    rng: Mutex<StdRng>,
}

impl Responder {
    pub fn new(templates: TemplateTable, rng: StdRng) -> Self {
        Self {
            templates,
            rng: Mutex::new(rng),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(TemplateTable::default(), StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(TemplateTable::default(), StdRng::from_entropy())
    }

    pub fn respond(&self, query: &str, sessions: &[ClassSession]) -> Reply {
        let intent = QueryIntent::detect(query);
        let shape = ResultShape::of(sessions);
        let case = select_case(&intent, &shape);

        let text = self
            .pick(case)
            .or_else(|| self.pick(ResponseCase::Fallback))
            .unwrap_or_else(|| FALLBACK_REPLY.to_string())
            .replace("{count}", &shape.count.to_string());

        Reply { case, intent, text }
    }

    fn pick(&self, case: ResponseCase) -> Option<String> {
        let choices = self.templates.get(case);
        let mut rng = match self.rng.lock() {
            Ok(rng) => rng,
            Err(poisoned) => poisoned.into_inner(),
        };
        choices.choose(&mut *rng).cloned()
    }
}
