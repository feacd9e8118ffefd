//! The documentation run.

use super::preflight::{self, Requirements};
use super::{Cli, Output};
use crate::config::{Prompts, Settings};
use crate::error::Result as YtResult;
use crate::llm::{ArtifactGenerator, LlmRouter};
use crate::media::FfmpegEncoder;
use crate::pipeline::{CaptionCorrection, Pipeline, PipelineOptions, TranslateTarget};
use crate::shorthand::{parse_caption_correction_arg, parse_language_arg};
use crate::storage::LocalStorage;
use crate::table::columns::YOUTUBE_SOURCE;
use crate::transcription::{SpeechToText, TranscriptRouter, YtDlpCaptions};
use crate::translate::TranslationService;
use crate::youtube::YoutubeDataApi;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Turn CLI arguments and settings into pipeline options.
///
/// Shorthand arguments are parsed here so malformed input fails before
/// anything else happens.
pub fn build_options(cli: &Cli, settings: &Settings) -> YtResult<PipelineOptions> {
    let output = cli
        .outfile
        .clone()
        .unwrap_or_else(|| settings.general.output_file.clone());

    let mut options = PipelineOptions::new(cli.video_id.trim(), Settings::expand_path(&output));
    options.models = cli
        .model
        .as_deref()
        .map(|m| {
            m.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    options.transcript_source = cli
        .transcript
        .clone()
        .unwrap_or_else(|| settings.models.transcript_source.clone());

    if let Some(arg) = &cli.translate {
        let (model, lang) = parse_language_arg(arg)?;
        options.translate = Some(TranslateTarget { model, lang });
    }
    if let Some(arg) = &cli.suggest_corrected_captions {
        let (model, source) = parse_caption_correction_arg(arg);
        options.caption_correction = Some(CaptionCorrection { model, source });
    }

    options.no_youtube_summary = cli.no_youtube_summary;
    options.combine_info_audio = cli.combine_info_audio;
    options.delay = Duration::from_millis(settings.general.delay_ms);
    options.directories = settings.directories.clone();
    Ok(options)
}

fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn build_pipeline(options: &PipelineOptions, settings: &Settings) -> YtResult<Pipeline> {
    let endpoints = &settings.endpoints;
    let timeout = Duration::from_secs(endpoints.timeout_secs);

    let videos = YoutubeDataApi::from_env(&endpoints.youtube_api_base, timeout)?;

    let stt = if options.transcript_source != YOUTUBE_SOURCE {
        Some(SpeechToText::new(
            settings.temp_dir(),
            settings.models.stt_chunk_seconds,
            timeout,
        )?)
    } else {
        None
    };
    let transcripts = TranscriptRouter::new(YtDlpCaptions::new(), stt);

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let llm = Arc::new(LlmRouter::new(endpoints)?);
    let generator = Arc::new(ArtifactGenerator::new(llm, prompts));
    let translator =
        TranslationService::new(generator.clone(), endpoints, &settings.models.translation_model)?;

    Ok(Pipeline::new(
        Arc::new(videos),
        Arc::new(transcripts),
        generator,
        Arc::new(translator),
        Arc::new(LocalStorage::new(output_dir(&options.output))),
        Arc::new(FfmpegEncoder::new()),
    ))
}

/// Run the documentation pipeline for the CLI arguments.
pub async fn run_docs(cli: &Cli, settings: Settings) -> Result<()> {
    let options = match build_options(cli, &settings) {
        Ok(options) => options,
        Err(e) => {
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    let requirements = Requirements::for_options(&options, &settings.models.translation_model);
    if let Err(e) = preflight::check(&requirements) {
        Output::error(&e.to_string());
        return Err(e.into());
    }
    Output::info(&format!(
        "Pre-flight checks passed ({} credentials, {} tools)",
        requirements.env.len(),
        requirements.tools.len()
    ));

    std::fs::create_dir_all(settings.temp_dir())?;

    Output::header("ytdocs");
    Output::kv("Input", &options.video_input);
    Output::kv("Output", &options.output.display().to_string());
    Output::kv("Transcript source", &options.transcript_source);
    if !options.models.is_empty() {
        Output::models("Models", &options.models);
    }
    if let Some(target) = &options.translate {
        Output::kv("Translate", &format!("{} -> {}", target.model, target.lang));
    }
    if let Some(correction) = &options.caption_correction {
        Output::kv("Caption review", &correction.model);
    }

    let pipeline = build_pipeline(&options, &settings)?;
    let summary = pipeline.run(&options).await?;

    Output::run_summary(&summary);
    Ok(())
}
