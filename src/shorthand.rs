//! Parsers for compact CLI shorthand such as `gemini-3-flash-preview-es`.
//!
//! Three strategies exist and are deliberately kept apart; each flag picks
//! the one it needs:
//!
//! - [`parse_translate_arg`]: split on the last hyphen, accept any suffix.
//! - [`parse_language_arg`]: split on the last hyphen, suffix must be a known
//!   ISO 639-1 code; cloud translation services are matched as a unit.
//! - [`parse_caption_correction_arg`]: scan for the first hyphen split whose
//!   tail looks like a transcript source.

use crate::error::{Result, YtDocsError};

/// Model alias used when only a language code is given.
pub const DEFAULT_TRANSLATION_ALIAS: &str = "gemini";

/// Cloud translation services, matched as a whole before generic splitting.
pub const CLOUD_TRANSLATION_SERVICES: &[&str] = &["aws-translate", "gcp-translate"];

/// Prefixes that mark the start of a transcript source in caption-correction
/// arguments.
pub const KNOWN_SOURCE_PREFIXES: &[&str] =
    &["gcp-", "aws-", "bedrock-", "vertex-", "foundry-", "gemini-"];

/// Language codes accepted by [`parse_language_arg`].
pub const LANGUAGE_CODES: &[&str] = &[
    "af", "am", "ar", "az", "be", "bg", "bn", "bs", "ca", "ceb", "cs", "cy", "da", "de", "el",
    "en", "es", "et", "eu", "fa", "fi", "fr", "ga", "gd", "gl", "gu", "ha", "he", "hi", "hr",
    "ht", "hu", "hy", "id", "ig", "is", "it", "ja", "jv", "ka", "kk", "km", "kn", "ko", "ku",
    "ky", "la", "lb", "lo", "lt", "lv", "mg", "mi", "mk", "ml", "mn", "mr", "ms", "mt", "my",
    "ne", "nl", "no", "ny", "or", "pa", "pl", "ps", "pt", "ro", "ru", "rw", "sd", "si", "sk",
    "sl", "sm", "sn", "so", "sq", "sr", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "tk",
    "tl", "tr", "tt", "ug", "uk", "ur", "uz", "vi", "xh", "yi", "yo", "zh", "zu",
];

/// True if `code` is in the known language code list.
pub fn is_language_code(code: &str) -> bool {
    LANGUAGE_CODES.contains(&code)
}

/// Parse `{model}-{lang}` by splitting on the last hyphen.
///
/// The final segment is taken as the language code without validation.
pub fn parse_translate_arg(arg: &str) -> Result<(String, String)> {
    let invalid = || {
        YtDocsError::InvalidFormat(format!(
            "Invalid --translate format: '{}'. Expected '{{model}}-{{language}}' \
             e.g. 'gemini-3-flash-preview-es'.",
            arg
        ))
    };

    let (model, lang) = arg.rsplit_once('-').ok_or_else(invalid)?;
    if model.is_empty() || lang.is_empty() {
        return Err(invalid());
    }
    Ok((model.to_string(), lang.to_string()))
}

/// Parse `{model}-{lang}` where the language must be a known code.
///
/// A bare known code selects the default Gemini translation model
/// ([`DEFAULT_TRANSLATION_ALIAS`]).
pub fn parse_language_arg(arg: &str) -> Result<(String, String)> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(YtDocsError::InvalidFormat(
            "Language argument cannot be empty".to_string(),
        ));
    }

    for service in CLOUD_TRANSLATION_SERVICES {
        if let Some(suffix) = arg.strip_prefix(service) {
            return match suffix.strip_prefix('-') {
                Some(code) if is_language_code(code) => {
                    Ok((service.to_string(), code.to_string()))
                }
                _ => Err(YtDocsError::UnrecognizedLanguage(format!(
                    "Invalid language code in '{}'. Expected format: {}-{{language_code}}",
                    arg, service
                ))),
            };
        }
    }

    if let Some((model, code)) = arg.rsplit_once('-') {
        if model.is_empty() {
            return Err(YtDocsError::InvalidFormat(format!(
                "Missing model in '{}'. Expected format: {{model}}-{{language_code}}",
                arg
            )));
        }
        if is_language_code(code) {
            return Ok((model.to_string(), code.to_string()));
        }
        return Err(YtDocsError::UnrecognizedLanguage(format!(
            "'{}' is not a recognized language code in '{}'. \
             Expected format: {{model}}-{{language_code}}",
            code, arg
        )));
    }

    if is_language_code(arg) {
        return Ok((DEFAULT_TRANSLATION_ALIAS.to_string(), arg.to_string()));
    }

    Err(YtDocsError::UnrecognizedLanguage(format!(
        "Invalid language argument '{}'. Expected format: {{model}}-{{language_code}} \
         or {{language_code}} (e.g. gemini-3-flash-preview-es, aws-translate-fr, es)",
        arg
    )))
}

/// Parse `{model}[-{source}]` for caption correction.
///
/// Scans hyphen-delimited tokens left to right and splits at the first
/// position whose tail is `youtube` or starts with a known source prefix.
/// Without such a split the whole input is the model.
pub fn parse_caption_correction_arg(arg: &str) -> (String, Option<String>) {
    let tokens: Vec<&str> = arg.split('-').collect();

    for i in 1..tokens.len() {
        let tail = tokens[i..].join("-");
        let is_source = tail == "youtube"
            || KNOWN_SOURCE_PREFIXES.iter().any(|p| tail.starts_with(p));
        if is_source {
            return (tokens[..i].join("-"), Some(tail));
        }
    }

    (arg.to_string(), None)
}
