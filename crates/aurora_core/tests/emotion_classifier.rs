use aurora_core::emotion::{EmotionClassifier, EmotionDirective, EmotionEntry};

#[test]
fn happy_text_maps_to_happy_entry() {
    let classifier = EmotionClassifier::builtin().unwrap();
    let directive = classifier.classify("I feel very happy today");
    assert!(
        directive.emotion.to_lowercase().contains("happy"),
        "got {directive:?}"
    );
    assert_eq!(directive.expression, "smile");
    assert_eq!(directive.motion, "nod");
}

#[test]
fn matching_is_case_insensitive_on_input() {
    let classifier = EmotionClassifier::builtin().unwrap();
    assert_eq!(classifier.classify("MUCHAS GRACIAS").emotion, "happy");
    assert_eq!(classifier.classify("Lo Siento, está agotado").emotion, "sad");
}

#[test]
fn unmatched_text_returns_neutral_default() {
    let classifier = EmotionClassifier::builtin().unwrap();
    let directive = classifier.classify("The package ships on Tuesday");
    assert_eq!(directive, EmotionDirective::neutral());
    assert!(directive.is_neutral());
    assert_eq!(classifier.classify(""), EmotionDirective::neutral());
}

#[test]
fn classification_is_deterministic() {
    let classifier = EmotionClassifier::builtin().unwrap();
    let inputs = [
        "wow, what a deal",
        "sorry, that failed",
        "hmm, maybe",
        "hello there",
        "nothing to see",
    ];
    for input in inputs {
        let first = classifier.classify(input);
        for _ in 0..5 {
            assert_eq!(classifier.classify(input), first);
        }
    }
}

#[test]
fn table_order_breaks_ties() {
    // "sorry, that failed" matches both the sad and angry entries; sad is
    // authored first.
    let classifier = EmotionClassifier::builtin().unwrap();
    assert_eq!(classifier.classify("sorry, that failed").emotion, "sad");

    let reversed = EmotionClassifier::from_entries(
        classifier.entries().iter().rev().cloned().collect(),
    )
    .unwrap();
    assert_eq!(reversed.classify("sorry, that failed").emotion, "angry");
}

#[test]
fn loading_preserves_authored_order_and_duplicates() {
    let classifier = EmotionClassifier::from_json(
        r#"[
            {"keywords":["b"],"emotion":"second","expression":"x","motion":"y"},
            {"keywords":["a"],"emotion":"first","expression":"x","motion":"y"},
            {"keywords":["a"],"emotion":"first","expression":"x","motion":"y"}
        ]"#,
    )
    .unwrap();

    let emotions: Vec<&str> = classifier
        .entries()
        .iter()
        .map(|entry| entry.emotion.as_str())
        .collect();
    assert_eq!(emotions, vec!["second", "first", "first"]);
    assert_eq!(classifier.classify("ab").emotion, "second");
}

#[test]
fn entries_round_trip_through_json_wire_shape() {
    let entry = EmotionEntry {
        keywords: vec!["oferta".to_string()],
        emotion: "surprised".to_string(),
        expression: "surprised".to_string(),
        motion: "jump".to_string(),
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["keywords"][0], "oferta");
    assert_eq!(json["motion"], "jump");
}
