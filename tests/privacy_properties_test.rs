//! Integration tests for the observable behavior of each privacy level

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};
use std::collections::HashSet;
use test_case::test_case;
use veil::domain::PrivacyError;
use veil::privacy::{PrivacyLevel, PrivacyProcessor, SecretKey, METADATA_FIELD};

const KEY_B64: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

fn processor() -> PrivacyProcessor {
    let key = SecretKey::from_base64(KEY_B64).expect("valid test key");
    PrivacyProcessor::builder()
        .key(key)
        .build()
        .expect("Failed to create processor")
}

fn is_token(value: &Value) -> bool {
    value.as_str().is_some_and(|s| {
        s.len() == 68
            && s.starts_with("TOK_")
            && s[4..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    })
}

#[test]
fn test_tokenized_event_scenario() {
    let processor = processor();
    let result = processor
        .process(
            &json!({"email": "a@b.com", "age": 42}),
            PrivacyLevel::Tokenized,
            &["email", "age"],
        )
        .unwrap();

    let record = &result.record;
    assert!(is_token(&record["email"]), "{}", record["email"]);
    assert!(is_token(&record["age"]), "{}", record["age"]);
    assert_ne!(record["email"], record["age"]);
    assert_eq!(
        record[METADATA_FIELD]["fields_processed"],
        json!(["email", "age"])
    );
    assert_eq!(record[METADATA_FIELD]["level"], json!("tokenized"));
}

#[test]
fn test_tokenize_is_deterministic() {
    let processor = processor();
    let record = json!({"user_id": "u-1001"});

    let first = processor
        .process(&record, PrivacyLevel::Tokenized, &["user_id"])
        .unwrap();
    let second = processor
        .process(&record, PrivacyLevel::Tokenized, &["user_id"])
        .unwrap();

    assert_eq!(first.record["user_id"], second.record["user_id"]);
}

#[test]
fn test_tokens_differ_across_keys() {
    let other = PrivacyProcessor::builder()
        .key(SecretKey::from_bytes(b"another-secret-of-32-bytes-long!".to_vec()).unwrap())
        .build()
        .unwrap();
    let record = json!({"email": "a@b.com"});

    let a = processor()
        .process(&record, PrivacyLevel::Tokenized, &["email"])
        .unwrap();
    let b = other
        .process(&record, PrivacyLevel::Tokenized, &["email"])
        .unwrap();

    assert_ne!(a.record["email"], b.record["email"]);
}

#[test]
fn test_pseudonyms_are_field_scoped() {
    let processor = processor();
    let result = processor
        .process(
            &json!({"sender": "alice", "recipient": "alice"}),
            PrivacyLevel::Pseudonymized,
            &["sender", "recipient"],
        )
        .unwrap();

    let sender = result.record["sender"].as_str().unwrap();
    let recipient = result.record["recipient"].as_str().unwrap();
    assert!(sender.starts_with("PSEUDO_sender_"));
    assert!(recipient.starts_with("PSEUDO_recipient_"));
    assert_eq!(sender.len(), "PSEUDO_sender_".len() + 12);

    let sender_digest = sender.trim_start_matches("PSEUDO_sender_");
    let recipient_digest = recipient.trim_start_matches("PSEUDO_recipient_");
    assert_ne!(sender_digest, recipient_digest);
}

#[test]
fn test_redact_is_idempotent() {
    let processor = processor();
    let fields = ["email", "ip"];
    let once = processor
        .process(
            &json!({"email": "a@b.com", "ip": "10.0.0.1", "page": "/"}),
            PrivacyLevel::Redacted,
            &fields,
        )
        .unwrap();

    let mut input = once.record.clone();
    input.remove(METADATA_FIELD);
    let twice = processor
        .process(&Value::Object(input), PrivacyLevel::Redacted, &fields)
        .unwrap();

    for field in fields {
        assert_eq!(once.record[field], json!("[REDACTED]"));
        assert_eq!(once.record[field], twice.record[field]);
    }
    assert_eq!(twice.record["page"], json!("/"));
}

#[test_case(json!("a@b.com"), "a@b.com" ; "string")]
#[test_case(json!(42), "42" ; "integer")]
#[test_case(json!(true), "true" ; "boolean")]
#[test_case(json!({"city": "Oslo"}), r#"{"city":"Oslo"}"# ; "object")]
fn test_encrypt_round_trip_yields_text(value: Value, expected: &str) {
    let processor = processor();
    let result = processor
        .process(&json!({"field": value}), PrivacyLevel::Raw, &["field"])
        .unwrap();

    let envelope = result.record["field"].as_str().unwrap();
    assert_eq!(processor.decrypt_field(envelope).unwrap(), expected);
}

#[test]
fn test_encrypt_uses_fresh_nonces() {
    let processor = processor();
    let record = json!({"email": "a@b.com"});
    let a = processor
        .process(&record, PrivacyLevel::Raw, &["email"])
        .unwrap();
    let b = processor
        .process(&record, PrivacyLevel::Raw, &["email"])
        .unwrap();
    assert_ne!(a.record["email"], b.record["email"]);
}

#[test]
fn test_tampered_ciphertext_fails_integrity() {
    let processor = processor();
    let result = processor
        .process(&json!({"email": "a@b.com"}), PrivacyLevel::Raw, &["email"])
        .unwrap();

    let mut bytes = STANDARD
        .decode(result.record["email"].as_str().unwrap())
        .unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let tampered = STANDARD.encode(bytes);

    assert!(matches!(
        processor.decrypt_field(&tampered),
        Err(PrivacyError::Integrity(_))
    ));
}

#[test]
fn test_differential_privacy_is_noisy() {
    let processor = processor();
    let record = json!({"session_seconds": 120});

    let distinct: HashSet<u64> = (0..100)
        .map(|_| {
            processor
                .process(&record, PrivacyLevel::Differential, &["session_seconds"])
                .unwrap()
                .record["session_seconds"]
                .as_f64()
                .unwrap()
                .to_bits()
        })
        .collect();

    assert!(distinct.len() >= 95, "only {} distinct values", distinct.len());
}

#[test]
fn test_differential_privacy_warns_on_text() {
    let processor = processor();
    let result = processor
        .process(
            &json!({"score": 10, "country": "NO"}),
            PrivacyLevel::Differential,
            &["score", "country"],
        )
        .unwrap();

    assert!(result.record["score"].is_f64());
    assert_eq!(result.record["country"], json!("NO"));
    assert_eq!(result.metadata.fields_processed, ["score"]);
    assert_eq!(result.metadata.warnings.len(), 1);
    assert!(result.metadata.warnings[0].starts_with("country"));
}

#[test]
fn test_aggregate_single_numeric_field() {
    let processor = processor();
    let result = processor
        .process(&json!({"age": 30}), PrivacyLevel::Aggregated, &["age"])
        .unwrap();

    let mut record = result.record;
    let metadata = record.remove(METADATA_FIELD).unwrap();
    assert_eq!(
        Value::Object(record),
        json!({"age_summary": {"type": "numeric", "count": 1, "sum": 30, "avg": 30}})
    );
    assert_eq!(metadata["level"], json!("aggregated"));
    assert_eq!(metadata["fields_processed"], json!(["age"]));
}

#[test]
fn test_generalize_recovers_from_bad_values() {
    let processor = processor();
    let result = processor
        .process(
            &json!({"age": "not-a-number"}),
            PrivacyLevel::Generalized,
            &["age"],
        )
        .unwrap();

    assert_eq!(result.record["age"], json!("GENERALIZATION_ERROR"));
    assert!(result.has_warnings());
    assert_eq!(
        result.record[METADATA_FIELD]["warnings"],
        json!(["age: value is not numeric"])
    );
}

#[test]
fn test_generalize_default_rules() {
    let processor = processor();
    let result = processor
        .process(
            &json!({"age": 42, "income": 52000, "location": "Oslo, Norway", "page": "/"}),
            PrivacyLevel::Generalized,
            &["age", "income", "location", "page"],
        )
        .unwrap();

    assert_eq!(result.record["age"], json!("40-49"));
    assert_eq!(result.record["income"], json!("50000-59999"));
    assert_eq!(result.record["location"], json!("Oslo"));
    assert_eq!(result.record["page"], json!("/"));
    assert_eq!(result.metadata.fields_processed, ["age", "income", "location"]);
}

#[test]
fn test_generalize_float_uses_integer_bucket() {
    let processor = processor();
    let result = processor
        .process(
            &json!({"age": 42.7, "income": 51234.5}),
            PrivacyLevel::Generalized,
            &["age", "income"],
        )
        .unwrap();

    assert_eq!(result.record["age"], json!("40-49"));
    assert_eq!(result.record["income"], json!("50000-59999"));
    assert!(!result.has_warnings());
}

#[test_case(PrivacyLevel::Raw)]
#[test_case(PrivacyLevel::Tokenized)]
#[test_case(PrivacyLevel::Pseudonymized)]
fn test_keyed_levels_leave_null_out_of_processed_fields(level: PrivacyLevel) {
    let result = processor()
        .process(&json!({"email": null, "ip": "10.0.0.1"}), level, &["email", "ip"])
        .unwrap();

    assert_eq!(result.record["email"], Value::Null);
    assert_eq!(result.metadata.fields_processed, ["ip"]);
}

#[test]
fn test_synthetic_keeps_shape() {
    let processor = processor();
    let result = processor
        .process(
            &json!({"revenue": 100.0, "plan": "pro"}),
            PrivacyLevel::Synthetic,
            &["revenue", "plan"],
        )
        .unwrap();

    assert!(result.record["revenue"].is_number());
    assert_eq!(result.record["plan"], json!("SYNTHETIC_plan"));
}

#[test]
fn test_unrequested_fields_are_untouched() {
    let processor = processor();
    let input = json!({"email": "a@b.com", "page": "/pricing", "device": {"os": "linux"}});

    for level in PrivacyLevel::ALL {
        if level == PrivacyLevel::Aggregated {
            continue;
        }
        let result = processor.process(&input, level, &["email"]).unwrap();
        assert_eq!(result.record["page"], json!("/pricing"), "{level}");
        assert_eq!(result.record["device"], json!({"os": "linux"}), "{level}");
    }
}

#[test]
fn test_metadata_is_appended_last() {
    let processor = processor();
    let result = processor
        .process(
            &json!({"b": 1, "a": 2}),
            PrivacyLevel::Redacted,
            &["a", "missing"],
        )
        .unwrap();

    let keys: Vec<&String> = result.record.keys().collect();
    assert_eq!(keys, ["b", "a", METADATA_FIELD]);
    assert_eq!(result.metadata.fields_processed, ["a"]);
    assert!(result.record[METADATA_FIELD]["processed_at"]
        .as_str()
        .unwrap()
        .ends_with('Z'));
}
