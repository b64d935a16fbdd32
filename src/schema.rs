use serde_json::{Value, json};

use crate::language::PHRASE_COUNT;

/// Name the structured-output format is registered under on the request.
pub const SCHEMA_NAME: &str = "animal_language_phrases";

/// Strict schema for one phrase batch: an object holding exactly
/// `PHRASE_COUNT` phrase records and nothing else. Enforcement happens on
/// the service side via strict mode; nothing re-validates locally.
pub fn phrase_batch_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "phrases": {
                "type": "array",
                "minItems": PHRASE_COUNT,
                "maxItems": PHRASE_COUNT,
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "intent": { "type": "string" },
                        "animal_text": { "type": "string" },
                        "english_gloss": { "type": "string" },
                        "mood": { "type": "string" }
                    },
                    "required": ["id", "intent", "animal_text", "english_gloss", "mood"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["phrases"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_is_bounded_to_exactly_sixteen_phrases() {
        let schema = phrase_batch_schema();
        let phrases = &schema["properties"]["phrases"];

        assert_eq!(phrases["type"], "array");
        assert_eq!(phrases["minItems"], 16);
        assert_eq!(phrases["maxItems"], 16);
        assert_eq!(phrases["minItems"], PHRASE_COUNT);
    }

    #[test]
    fn top_level_admits_only_the_phrases_field() {
        let schema = phrase_batch_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"], json!(["phrases"]));
        assert_eq!(schema["properties"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn each_item_requires_exactly_the_five_record_fields() {
        let schema = phrase_batch_schema();
        let item = &schema["properties"]["phrases"]["items"];

        assert_eq!(item["type"], "object");
        assert_eq!(item["additionalProperties"], false);
        assert_eq!(
            item["required"],
            json!(["id", "intent", "animal_text", "english_gloss", "mood"])
        );

        let properties = item["properties"].as_object().unwrap();
        assert_eq!(properties.len(), 5);
        assert_eq!(properties["id"]["type"], "integer");
        for field in ["intent", "animal_text", "english_gloss", "mood"] {
            assert_eq!(properties[field]["type"], "string");
        }
    }
}
