//! Column naming.
//!
//! Structural columns have fixed names. Artifact columns are composed from
//! the artifact kind, the model that produced it, the transcript source it
//! was generated from, and an optional language suffix:
//!
//! ```text
//! Summary Text {model} from {source}[ ({lang})]
//! One Sentence Summary File {model} from {source}[ ({lang})]
//! Tags {source} {model} model[ ({lang})]
//! Summary Infographic File {model}[ ({lang})]
//! ```
//!
//! English columns never carry a suffix; a translated column is the English
//! name plus ` ({lang})`.

use regex::Regex;
use std::sync::OnceLock;

pub const URL: &str = "URL";
pub const TITLE: &str = "Title";
pub const DESCRIPTION: &str = "Description";
pub const PUBLISHED: &str = "Data Published";
pub const CHANNEL: &str = "Channel";
pub const TAGS: &str = "Tags";
pub const DURATION: &str = "Duration";
pub const TRANSCRIPT_CHARACTERS: &str = "Transcript characters";
pub const VIDEO_FILE: &str = "Video File";

pub const INFOGRAPHIC_PREFIX: &str = "Summary Infographic File ";
pub const AUDIO_PREFIX: &str = "Summary Audio File ";
const SRT_PREFIX: &str = "SRT File ";

/// The platform transcript source.
pub const YOUTUBE_SOURCE: &str = "youtube";
/// The source language. Never written as a suffix.
pub const SOURCE_LANGUAGE: &str = "en";

/// Kind of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Summary,
    OneSentenceSummary,
    Qa,
    Tags,
    Infographic,
    Audio,
}

impl ArtifactKind {
    /// Artifacts that have a text column and are derived from a transcript.
    pub const TEXT_KINDS: [ArtifactKind; 4] = [
        ArtifactKind::Summary,
        ArtifactKind::OneSentenceSummary,
        ArtifactKind::Qa,
        ArtifactKind::Tags,
    ];

    /// Label used in artifact file names.
    pub fn file_label(&self) -> &'static str {
        match self {
            ArtifactKind::Summary => "summary",
            ArtifactKind::OneSentenceSummary => "one-sentence-summary",
            ArtifactKind::Qa => "qa",
            ArtifactKind::Tags => "tags",
            ArtifactKind::Infographic => "infographic",
            ArtifactKind::Audio => "audio",
        }
    }

    /// File extension for artifact files.
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Tags => "txt",
            ArtifactKind::Infographic => "png",
            ArtifactKind::Audio => "m4a",
            _ => "md",
        }
    }

    fn is_file_only(&self) -> bool {
        matches!(self, ArtifactKind::Infographic | ArtifactKind::Audio)
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_label())
    }
}

/// Whether a column holds the artifact itself or the path of its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Text,
    File,
}

/// A parsed artifact column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnName {
    pub kind: ArtifactKind,
    pub field: Field,
    pub model: String,
    /// Transcript source; `None` for infographic and audio columns.
    pub source: Option<String>,
    /// Language suffix; `None` for English.
    pub lang: Option<String>,
}

impl ColumnName {
    /// Text column of a transcript-derived artifact.
    pub fn text(kind: ArtifactKind, model: &str, source: &str) -> Self {
        Self::build_parts(kind, Field::Text, model, Some(source), None)
    }

    /// File column of a transcript-derived artifact.
    pub fn file(kind: ArtifactKind, model: &str, source: &str) -> Self {
        Self::build_parts(kind, Field::File, model, Some(source), None)
    }

    pub fn infographic(model: &str) -> Self {
        Self::build_parts(ArtifactKind::Infographic, Field::File, model, None, None)
    }

    pub fn audio(model: &str) -> Self {
        Self::build_parts(ArtifactKind::Audio, Field::File, model, None, None)
    }

    /// Normalizing constructor: infographic/audio columns are always file
    /// columns without a source, text artifacts default to the youtube source,
    /// and `en` maps to no suffix.
    fn build_parts(
        kind: ArtifactKind,
        field: Field,
        model: &str,
        source: Option<&str>,
        lang: Option<&str>,
    ) -> Self {
        let (field, source) = if kind.is_file_only() {
            (Field::File, None)
        } else {
            (field, Some(source.unwrap_or(YOUTUBE_SOURCE).to_string()))
        };
        Self {
            kind,
            field,
            model: model.to_string(),
            source,
            lang: normalize_lang(lang),
        }
    }

    /// The same column in another language.
    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = normalize_lang(Some(lang));
        self
    }

    /// The file-path column paired with this column.
    pub fn file_column(&self) -> Self {
        Self {
            field: Field::File,
            ..self.clone()
        }
    }

    /// Render the canonical column name.
    pub fn build(&self) -> String {
        let source = self.source.as_deref().unwrap_or(YOUTUBE_SOURCE);
        let base = match (self.kind, self.field) {
            (ArtifactKind::Summary, Field::Text) => {
                format!("Summary Text {} from {}", self.model, source)
            }
            (ArtifactKind::Summary, Field::File) => {
                format!("Summary File {} from {}", self.model, source)
            }
            (ArtifactKind::OneSentenceSummary, Field::Text) => {
                format!("One Sentence Summary {} from {}", self.model, source)
            }
            (ArtifactKind::OneSentenceSummary, Field::File) => {
                format!("One Sentence Summary File {} from {}", self.model, source)
            }
            (ArtifactKind::Qa, Field::Text) => format!("QA Text {} from {}", self.model, source),
            (ArtifactKind::Qa, Field::File) => format!("QA File {} from {}", self.model, source),
            (ArtifactKind::Tags, Field::Text) => format!("Tags {} {} model", source, self.model),
            (ArtifactKind::Tags, Field::File) => {
                format!("Tags File {} {} model", source, self.model)
            }
            (ArtifactKind::Infographic, _) => format!("{}{}", INFOGRAPHIC_PREFIX, self.model),
            (ArtifactKind::Audio, _) => format!("{}{}", AUDIO_PREFIX, self.model),
        };
        match &self.lang {
            Some(lang) => format!("{}{}", base, lang_suffix(lang)),
            None => base,
        }
    }

    /// Parse a column name back into its components. Structural and
    /// unrecognized columns yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let (base, lang) = split_lang_suffix(name);

        let with_source = |kind: ArtifactKind, field: Field, rest: &str| {
            let (model, source) = rest.rsplit_once(" from ")?;
            if model.is_empty() || source.is_empty() || source.contains(' ') {
                return None;
            }
            Some(Self::build_parts(kind, field, model, Some(source), lang))
        };
        let tags = |field: Field, rest: &str| {
            let inner = rest.strip_suffix(" model")?;
            let (source, model) = inner.split_once(' ')?;
            if model.is_empty() || source.is_empty() {
                return None;
            }
            Some(Self::build_parts(ArtifactKind::Tags, field, model, Some(source), lang))
        };
        let file_only = |kind: ArtifactKind, model: &str| {
            if model.is_empty() {
                return None;
            }
            Some(Self::build_parts(kind, Field::File, model, None, lang))
        };

        // Longer prefixes first: "One Sentence Summary File" before
        // "One Sentence Summary", "Summary Infographic File" before "Summary".
        if let Some(rest) = base.strip_prefix("One Sentence Summary File ") {
            with_source(ArtifactKind::OneSentenceSummary, Field::File, rest)
        } else if let Some(rest) = base.strip_prefix("One Sentence Summary ") {
            with_source(ArtifactKind::OneSentenceSummary, Field::Text, rest)
        } else if let Some(rest) = base.strip_prefix(INFOGRAPHIC_PREFIX) {
            file_only(ArtifactKind::Infographic, rest)
        } else if let Some(rest) = base.strip_prefix(AUDIO_PREFIX) {
            file_only(ArtifactKind::Audio, rest)
        } else if let Some(rest) = base.strip_prefix("Summary Text ") {
            with_source(ArtifactKind::Summary, Field::Text, rest)
        } else if let Some(rest) = base.strip_prefix("Summary File ") {
            with_source(ArtifactKind::Summary, Field::File, rest)
        } else if let Some(rest) = base.strip_prefix("QA Text ") {
            with_source(ArtifactKind::Qa, Field::Text, rest)
        } else if let Some(rest) = base.strip_prefix("QA File ") {
            with_source(ArtifactKind::Qa, Field::File, rest)
        } else if let Some(rest) = base.strip_prefix("Tags File ") {
            tags(Field::File, rest)
        } else if let Some(rest) = base.strip_prefix("Tags ") {
            tags(Field::Text, rest)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ColumnName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.build())
    }
}

/// Build a column name from its components.
///
/// Infographic and audio columns ignore `field` and `source`. A text
/// artifact without a source is attributed to the youtube transcript.
pub fn build_column_name(
    kind: ArtifactKind,
    field: Field,
    model: &str,
    source: Option<&str>,
    lang: Option<&str>,
) -> String {
    ColumnName::build_parts(kind, field, model, source, lang).build()
}

/// Inverse of [`build_column_name`].
pub fn parse_column_name(name: &str) -> Option<ColumnName> {
    ColumnName::parse(name)
}

fn normalize_lang(lang: Option<&str>) -> Option<String> {
    lang.filter(|l| !l.is_empty() && *l != SOURCE_LANGUAGE)
        .map(str::to_string)
}

/// The literal suffix appended to translated column names.
pub fn lang_suffix(lang: &str) -> String {
    format!(" ({})", lang)
}

/// Split a trailing ` (xx)` language suffix off a column name.
fn split_lang_suffix(name: &str) -> (&str, Option<&str>) {
    if let Some(inner) = name.strip_suffix(')') {
        if let Some((base, lang)) = inner.rsplit_once(" (") {
            let plausible = (2..=3).contains(&lang.len())
                && lang.chars().all(|c| c.is_ascii_lowercase());
            if plausible {
                return (base, Some(lang));
            }
        }
    }
    (name, None)
}

/// Extract the 2-letter language code embedded as `(xx)` in a column name,
/// defaulting to `en`.
pub fn language_of(column: &str) -> &str {
    static LANG_RE: OnceLock<Regex> = OnceLock::new();
    let re = LANG_RE.get_or_init(|| Regex::new(r"\(([a-z]{2})\)").expect("valid regex"));
    re.captures(column)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(SOURCE_LANGUAGE)
}

/// Column recording the transcript file for a source.
pub fn transcript_file_column(source: &str, is_generated: bool) -> String {
    if source == YOUTUBE_SOURCE {
        if is_generated {
            "Transcript File youtube generated".to_string()
        } else {
            "Transcript File human generated".to_string()
        }
    } else {
        format!("Transcript File {}", source)
    }
}

/// Transcript file columns that may hold a transcript for `source`.
pub fn transcript_file_candidates(source: &str) -> Vec<String> {
    if source == YOUTUBE_SOURCE {
        vec![
            transcript_file_column(source, true),
            transcript_file_column(source, false),
        ]
    } else {
        vec![transcript_file_column(source, true)]
    }
}

/// Column recording the SRT caption file for a source.
pub fn srt_file_column(source: &str) -> String {
    format!("{}{}", SRT_PREFIX, source)
}

/// The source named by an `SRT File {source}` column.
pub fn srt_source(column: &str) -> Option<&str> {
    column.strip_prefix(SRT_PREFIX).filter(|s| !s.is_empty())
}

/// Column recording suggested caption corrections from a model.
pub fn corrected_captions_column(model: &str) -> String {
    format!("Suggested Corrected Captions File ({})", model)
}

/// Output column of the video assembly pass for a language.
pub fn video_file_column(lang: &str) -> String {
    if lang == SOURCE_LANGUAGE {
        VIDEO_FILE.to_string()
    } else {
        format!("{}{}", VIDEO_FILE, lang_suffix(lang))
    }
}

/// Make a title safe for use in a file name.
pub fn safe_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| *c != '\r')
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            '\n' => ' ',
            other => other,
        })
        .collect()
}

/// File name of a stored text artifact:
/// `{model} - {video_id} - {safe_title} - {label} (from {source})[ ({lang})].{ext}`.
pub fn artifact_file_name(
    kind: ArtifactKind,
    model: &str,
    video_id: &str,
    safe_title: &str,
    source: &str,
    lang: Option<&str>,
) -> String {
    let suffix = normalize_lang(lang)
        .map(|l| lang_suffix(&l))
        .unwrap_or_default();
    format!(
        "{} - {} - {} - {} (from {}){}.{}",
        model,
        video_id,
        safe_title,
        kind.file_label(),
        source,
        suffix,
        kind.extension()
    )
}

/// Canonical watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_known_shapes() {
        let m = "gemini-3-flash-preview";
        assert_eq!(
            ColumnName::text(ArtifactKind::Summary, m, "youtube").build(),
            "Summary Text gemini-3-flash-preview from youtube"
        );
        assert_eq!(
            ColumnName::file(ArtifactKind::OneSentenceSummary, m, "youtube")
                .with_lang("es")
                .build(),
            "One Sentence Summary File gemini-3-flash-preview from youtube (es)"
        );
        assert_eq!(
            ColumnName::text(ArtifactKind::Tags, m, "whisper-1").build(),
            "Tags whisper-1 gemini-3-flash-preview model"
        );
        assert_eq!(
            ColumnName::file(ArtifactKind::Tags, m, "youtube").with_lang("fr").build(),
            "Tags File youtube gemini-3-flash-preview model (fr)"
        );
        assert_eq!(
            ColumnName::infographic("gemini-2.5-flash-image").build(),
            "Summary Infographic File gemini-2.5-flash-image"
        );
        assert_eq!(
            ColumnName::audio("tts").with_lang("es").build(),
            "Summary Audio File tts (es)"
        );
    }

    #[test]
    fn test_english_never_suffixed() {
        let col = ColumnName::text(ArtifactKind::Qa, "m", "youtube").with_lang("en");
        assert_eq!(col.lang, None);
        assert_eq!(col.build(), "QA Text m from youtube");
    }

    #[test]
    fn test_round_trip() {
        let models = ["gemini-3-flash-preview", "bedrock-nova-2-lite-v1", "vertex-claude-haiku-4-5@20251001"];
        let sources = ["youtube", "gcp-chirp3", "whisper-1"];
        let langs = [None, Some("es"), Some("zh"), Some("ceb")];

        for model in models {
            for lang in langs {
                for kind in ArtifactKind::TEXT_KINDS {
                    for source in sources {
                        for field in [Field::Text, Field::File] {
                            let name = build_column_name(kind, field, model, Some(source), lang);
                            let parsed = parse_column_name(&name).unwrap();
                            assert_eq!(parsed.kind, kind, "{}", name);
                            assert_eq!(parsed.field, field, "{}", name);
                            assert_eq!(parsed.model, model, "{}", name);
                            assert_eq!(parsed.source.as_deref(), Some(source), "{}", name);
                            assert_eq!(parsed.lang.as_deref(), lang, "{}", name);
                        }
                    }
                }
                for kind in [ArtifactKind::Infographic, ArtifactKind::Audio] {
                    let name = build_column_name(kind, Field::File, model, None, lang);
                    let parsed = parse_column_name(&name).unwrap();
                    assert_eq!(parsed.kind, kind);
                    assert_eq!(parsed.model, model);
                    assert_eq!(parsed.source, None);
                    assert_eq!(parsed.lang.as_deref(), lang);
                }
            }
        }
    }

    #[test]
    fn test_structural_columns_do_not_parse() {
        for name in [URL, TITLE, TAGS, PUBLISHED, VIDEO_FILE, "Transcript File youtube generated"] {
            assert_eq!(parse_column_name(name), None, "{}", name);
        }
    }

    #[test]
    fn test_language_of() {
        assert_eq!(language_of("Summary Audio File tts (es)"), "es");
        assert_eq!(language_of("Summary Infographic File img"), "en");
    }

    #[test]
    fn test_safe_title() {
        assert_eq!(safe_title("A/B: \"test\"?\r\nnext"), "A_B_ _test__ next");
    }

    #[test]
    fn test_video_file_column() {
        assert_eq!(video_file_column("en"), "Video File");
        assert_eq!(video_file_column("es"), "Video File (es)");
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(
            artifact_file_name(ArtifactKind::Summary, "m", "vid", "T", "youtube", None),
            "m - vid - T - summary (from youtube).md"
        );
        assert_eq!(
            artifact_file_name(ArtifactKind::Tags, "m", "vid", "T", "whisper-1", Some("es")),
            "m - vid - T - tags (from whisper-1) (es).txt"
        );
        assert_eq!(
            artifact_file_name(ArtifactKind::Qa, "m", "vid", "T", "youtube", Some("en")),
            "m - vid - T - qa (from youtube).md"
        );
    }
}
