use aurora_core::i18n::Translator;

#[test]
fn resolves_known_keys_per_locale() {
    let translator = Translator::builtin().unwrap();
    assert_eq!(translator.resolve("common.close", "es"), "Cerrar");
    assert_eq!(translator.resolve("common.close", "en"), "Close");
}

#[test]
fn missing_key_returns_key_verbatim() {
    let translator = Translator::builtin().unwrap();
    assert_eq!(
        translator.resolve("non.existent.key", "en"),
        "non.existent.key"
    );
}

#[test]
fn unsupported_locale_falls_back_to_default() {
    let translator = Translator::builtin().unwrap();
    assert_eq!(translator.default_locale(), "es");
    assert_eq!(translator.resolve("common.close", "fr"), "Cerrar");
    assert_eq!(translator.resolve("common.close", ""), "Cerrar");
}

#[test]
fn region_tags_use_language_dictionary() {
    let translator = Translator::builtin().unwrap();
    assert_eq!(translator.resolve("common.close", "en-GB"), "Close");
    assert!(translator.has_locale("EN_us"));
    assert_eq!(translator.supported_locales(), vec!["en", "es"]);
}

#[test]
fn partial_and_overlong_paths_return_key() {
    let translator = Translator::builtin().unwrap();
    // Stops at a branch node.
    assert_eq!(translator.resolve("common", "en"), "common");
    // Walks past a string leaf.
    assert_eq!(
        translator.resolve("common.close.extra", "en"),
        "common.close.extra"
    );
    assert_eq!(translator.resolve("", "en"), "");
    assert_eq!(translator.resolve("common..close", "en"), "common..close");
}

#[test]
fn nested_keys_resolve() {
    let translator = Translator::builtin().unwrap();
    assert_eq!(
        translator.resolve("checkout.errors.card_number", "en"),
        "Invalid card number"
    );
    assert_eq!(
        translator.resolve("a11y.modes.epilepsy", "es"),
        "Modo epilepsia"
    );
}

#[test]
fn no_per_key_fallback_below_selected_locale() {
    let translator = Translator::from_documents(
        [
            ("es", r#"{"only":{"es":"Sólo en español"}}"#),
            ("en", r#"{"other":"Other"}"#),
        ],
        "es",
    )
    .unwrap();

    assert_eq!(translator.resolve("only.es", "en"), "only.es");
    assert_eq!(translator.resolve("only.es", "de"), "Sólo en español");
}

#[test]
fn builtin_locales_share_the_same_key_set() {
    let translator = Translator::builtin().unwrap();
    for key in [
        "common.close",
        "nav.logout",
        "cart.empty",
        "checkout.errors.postal_code",
        "chat.greeting",
        "a11y.reset",
        "a11y.modes.low_vision",
    ] {
        assert_ne!(translator.resolve(key, "es"), key, "es is missing {key}");
        assert_ne!(translator.resolve(key, "en"), key, "en is missing {key}");
    }
}
