//! Translation of a row's English artifact columns into another language.

use super::Translator;
use crate::config::DirectorySettings;
use crate::storage::{join, Storage};
use crate::table::columns::{
    artifact_file_name, ArtifactKind, ColumnName, SOURCE_LANGUAGE, YOUTUBE_SOURCE,
};
use crate::table::Row;
use tracing::{info, warn};

/// Where translated artifact files are written. A `None` directory means the
/// translated text is stored in the row only.
#[derive(Debug, Clone, Default)]
pub struct ArtifactDirs {
    pub summaries: Option<String>,
    pub one_sentence_summaries: Option<String>,
    pub qa: Option<String>,
    pub tags: Option<String>,
}

impl ArtifactDirs {
    pub fn for_kind(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Summary => self.summaries.as_deref(),
            ArtifactKind::OneSentenceSummary => self.one_sentence_summaries.as_deref(),
            ArtifactKind::Qa => self.qa.as_deref(),
            ArtifactKind::Tags => self.tags.as_deref(),
            ArtifactKind::Infographic | ArtifactKind::Audio => None,
        }
    }
}

impl From<&DirectorySettings> for ArtifactDirs {
    fn from(dirs: &DirectorySettings) -> Self {
        Self {
            summaries: Some(dirs.summaries.clone()),
            one_sentence_summaries: Some(dirs.one_sentence_summaries.clone()),
            qa: Some(dirs.qa.clone()),
            tags: Some(dirs.tags.clone()),
        }
    }
}

/// One translation request against a row.
#[derive(Debug, Clone)]
pub struct TranslationJob<'a> {
    /// Translation backend (LLM model or cloud service).
    pub translate_model: &'a str,
    /// Target language code.
    pub lang: &'a str,
    /// Primary transcript source the artifacts were generated from.
    pub transcript_source: &'a str,
    /// Models whose artifacts should be translated.
    pub models: &'a [String],
    pub dirs: &'a ArtifactDirs,
    pub video_id: &'a str,
    pub safe_title: &'a str,
}

/// Translate every English artifact of `job.models` that has no translation yet.
///
/// For each model, the four text artifacts are considered for the primary
/// transcript source and, when that is not `youtube`, for the secondary
/// `youtube` family too. A column is translated only when its English text is
/// present and the target column is still empty, so running the same job
/// twice makes no further backend calls. Backend and file-write failures are
/// logged and leave the affected columns unset.
///
/// Returns the number of columns translated.
pub async fn process_translate(
    row: &mut Row,
    job: &TranslationJob<'_>,
    translator: &dyn Translator,
    storage: &dyn Storage,
) -> usize {
    let mut sources = vec![job.transcript_source];
    if job.transcript_source != YOUTUBE_SOURCE {
        sources.push(YOUTUBE_SOURCE);
    }

    let mut translated = 0;
    for model in job.models {
        for source in &sources {
            for kind in ArtifactKind::TEXT_KINDS {
                let column = ColumnName::text(kind, model, source);
                if translate_and_store(row, &column, job, translator, storage).await {
                    translated += 1;
                }
            }
        }
    }
    translated
}

async fn translate_and_store(
    row: &mut Row,
    english: &ColumnName,
    job: &TranslationJob<'_>,
    translator: &dyn Translator,
    storage: &dyn Storage,
) -> bool {
    let english_col = english.build();
    let Some(english_text) = row
        .text(&english_col)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
    else {
        return false;
    };

    let target = english.clone().with_lang(job.lang);
    let target_col = target.build();
    if target_col == english_col || row.has_value(&target_col) {
        return false;
    }

    info!("Translating '{}' to {} using {}", english_col, job.lang, job.translate_model);
    let text = match translator
        .translate(&english_text, job.translate_model, job.lang, SOURCE_LANGUAGE)
        .await
    {
        Ok(completion) => completion.text,
        Err(e) => {
            warn!("Translation of '{}' failed: {}", english_col, e);
            return false;
        }
    };
    row.set(target_col.clone(), text.clone());

    let source = english.source.as_deref().unwrap_or(YOUTUBE_SOURCE);
    if let Some(dir) = job.dirs.for_kind(english.kind).filter(|_| !text.is_empty()) {
        let name = artifact_file_name(
            english.kind,
            &english.model,
            job.video_id,
            job.safe_title,
            source,
            Some(job.lang),
        );
        match storage.write_text(&join(dir, &name), &text).await {
            Ok(stored) => {
                info!("Saved translated {}: {}", target_col, stored);
                row.set(target.file_column().build(), stored);
            }
            Err(e) => warn!("Error writing translated file {}: {}", name, e),
        }
    }

    true
}
