use itertools::Itertools;
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// System-role block: the rules of the invented language. Sent verbatim.
pub const LANGUAGE_INSTRUCTIONS: &str = r#"
You are generating a fictional animal language for a lo-fi jungle website.

Language rules:
- Allowed characters: a e i o u k g t r l m n s h ' -
- Common pattern: hyphenated compounds like "gra-tok"
- Word length: 1-3 syllables, syllables are CV or CVC
- Phrase length: 2-6 words
- Word order: Verb-Subject-Object (VSO)
- Suffixes:
  -tok = command/urgent
  -na = question
  -ku = warning
  -mii = friendly/affection
Return JSON only.
"#;

/// The sixteen communicative intents, in the order the batch must cover
/// them. The declaration order is the wire order; the variant count drives
/// the schema's array bounds.
#[derive(Debug, Clone, Copy, Display, EnumCount, EnumIter)]
pub enum Intent {
    Greeting,
    #[strum(serialize = "I am here")]
    IAmHere,
    #[strum(serialize = "Who are you?")]
    WhoAreYou,
    #[strum(serialize = "Predator nearby")]
    PredatorNearby,
    #[strum(serialize = "Storm coming")]
    StormComing,
    #[strum(serialize = "I am hungry")]
    IAmHungry,
    #[strum(serialize = "Food found")]
    FoodFound,
    #[strum(serialize = "Come closer")]
    ComeCloser,
    #[strum(serialize = "Go away")]
    GoAway,
    #[strum(serialize = "Follow me")]
    FollowMe,
    #[strum(serialize = "I am hurt")]
    IAmHurt,
    #[strum(serialize = "Safe place")]
    SafePlace,
    #[strum(serialize = "Night is coming")]
    NightIsComing,
    #[strum(serialize = "Play with me")]
    PlayWithMe,
    #[strum(serialize = "My territory")]
    MyTerritory,
    Farewell,
}

/// How many phrases one batch holds. Single source for both the prompt and
/// the schema's `minItems`/`maxItems`.
pub const PHRASE_COUNT: usize = Intent::COUNT;

/// User-role block: the numbered intent list the batch must answer, one
/// phrase per line entry.
pub fn user_task() -> String {
    let lines = Intent::iter()
        .enumerate()
        .map(|(index, intent)| format!("{} {intent}", index + 1))
        .join("\n");

    format!("\nGenerate {PHRASE_COUNT} phrases for these intents (in order):\n{lines}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_task_renders_the_numbered_intent_list() {
        let expected = r#"
Generate 16 phrases for these intents (in order):
1 Greeting
2 I am here
3 Who are you?
4 Predator nearby
5 Storm coming
6 I am hungry
7 Food found
8 Come closer
9 Go away
10 Follow me
11 I am hurt
12 Safe place
13 Night is coming
14 Play with me
15 My territory
16 Farewell
"#;

        assert_eq!(user_task(), expected);
    }

    #[test]
    fn prompt_blocks_are_stable_across_calls() {
        assert_eq!(user_task(), user_task());
    }

    #[test]
    fn intent_list_holds_sixteen_entries_numbered_in_order() {
        assert_eq!(PHRASE_COUNT, 16);
        assert_eq!(Intent::iter().count(), PHRASE_COUNT);

        let task = user_task();
        for (index, intent) in Intent::iter().enumerate() {
            let line = format!("\n{} {intent}\n", index + 1);
            assert!(task.contains(&line), "missing entry: {line:?}");
        }
    }

    #[test]
    fn instructions_state_the_language_rules() {
        for rule in [
            "Allowed characters: a e i o u k g t r l m n s h ' -",
            "Word order: Verb-Subject-Object (VSO)",
            "-tok = command/urgent",
            "-mii = friendly/affection",
            "Return JSON only.",
        ] {
            assert!(LANGUAGE_INSTRUCTIONS.contains(rule), "missing rule: {rule}");
        }
    }
}
