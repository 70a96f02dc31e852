//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `aurora_core` linkage.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage:
//! - `aurora_cli` prints ping and version.
//! - `aurora_cli translate <key> [locale]` resolves one dictionary key.
//! - `aurora_cli classify <text...>` prints the avatar directive for a reply.

use aurora_core::{EmotionClassifier, Translator};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("aurora_core ping={}", aurora_core::ping());
    println!("aurora_core version={}", aurora_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        return ExitCode::SUCCESS;
    };

    let result = match command.as_str() {
        "translate" => translate(rest),
        "classify" => classify(rest),
        other => Err(format!("unknown command `{other}`")),
    };
    match result {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn translate(args: &[String]) -> Result<String, String> {
    let key = args.first().ok_or("translate needs a key")?;
    let translator = Translator::builtin().map_err(|err| err.to_string())?;
    let locale = args
        .get(1)
        .map(String::as_str)
        .unwrap_or(translator.default_locale());
    Ok(format!(
        "{locale} {key}={}",
        translator.resolve(key, locale)
    ))
}

fn classify(args: &[String]) -> Result<String, String> {
    let classifier = EmotionClassifier::builtin().map_err(|err| err.to_string())?;
    let directive = classifier.classify(&args.join(" "));
    Ok(format!(
        "emotion={} expression={} motion={}",
        directive.emotion, directive.expression, directive.motion
    ))
}
