use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::app_config::Config;
use crate::audio::{self, AudioTranscoder};
use crate::condensed;
use crate::file_utils::FileManager;
use crate::matching::{self, MatchResult};
use crate::periods::{self, Period};
use crate::subtitle_processor;

// @module: Application controller for condensing a folder of media

/// Summary of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Matching outcome for every media file, in input order
    pub matches: Vec<MatchResult>,
    /// Files written
    pub written: Vec<PathBuf>,
    /// Media files skipped because their outputs already existed
    pub skipped: Vec<PathBuf>,
    /// Media files that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn unmatched(&self) -> impl Iterator<Item = &MatchResult> {
        self.matches.iter().filter(|m| m.subtitle.is_none())
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Optional audio backend, no condensed audio without one
    transcoder: Option<Arc<dyn AudioTranscoder>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self {
            config,
            transcoder: None,
        })
    }

    /// Attach an audio transcoder used when an audio format is configured
    pub fn with_transcoder(mut self, transcoder: Arc<dyn AudioTranscoder>) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Match every media file in `input_dir` to a subtitle and write condensed
    /// outputs to `output_dir`. A failing file is logged and recorded; it does
    /// not stop the batch.
    pub async fn run_folder(&self, input_dir: &Path, output_dir: &Path, force_overwrite: bool) -> Result<BatchReport> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }
        FileManager::ensure_dir(output_dir)?;

        let (media, subtitles) = FileManager::list_media_and_subtitles(input_dir)?;
        info!("Found {} media file(s) and {} subtitle file(s) in {:?}", media.len(), subtitles.len(), input_dir);

        let media_names: Vec<String> = media.iter().map(|p| file_name(p)).collect();
        let subtitle_names: Vec<String> = subtitles.iter().map(|p| file_name(p)).collect();
        let matches = matching::find_matches_for_batch(&media_names, &subtitle_names, &self.config);

        let mut report = BatchReport::default();
        for (media_path, result) in media.iter().zip(&matches) {
            let Some(subtitle_name) = &result.subtitle else {
                continue;
            };
            let subtitle_path = input_dir.join(subtitle_name);

            match self.condense_pair(media_path, &subtitle_path, output_dir, force_overwrite).await {
                Ok(written) if written.is_empty() => report.skipped.push(media_path.clone()),
                Ok(written) => report.written.extend(written),
                Err(e) => {
                    error!("Failed to condense {:?}: {:#}", media_path, e);
                    report.failed.push((media_path.clone(), format!("{:#}", e)));
                }
            }
        }

        report.matches = matches;
        info!(
            "Finished: {} file(s) written, {} skipped, {} failed, {} unmatched",
            report.written.len(),
            report.skipped.len(),
            report.failed.len(),
            report.unmatched().count()
        );
        Ok(report)
    }

    /// Condense one media/subtitle pair. Returns the paths written, empty when
    /// everything already existed and `force_overwrite` is off.
    pub async fn condense_pair(
        &self,
        media_path: &Path,
        subtitle_path: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<Vec<PathBuf>> {
        let output = &self.config.output;
        let subtitle_out = FileManager::generate_output_path(
            media_path,
            output_dir,
            &output.output_suffix,
            output.subtitle_format.extension(),
        );
        let audio_out = output.audio_format.map(|format| {
            FileManager::generate_output_path(media_path, output_dir, &output.output_suffix, format.extension())
        });

        let pending_subtitle = force_overwrite || !subtitle_out.exists();
        let pending_audio = audio_out.as_ref().is_some_and(|p| force_overwrite || !p.exists());
        if !pending_subtitle && !pending_audio {
            warn!("Outputs for {:?} already exist. Use -f to force overwrite.", media_path);
            return Ok(Vec::new());
        }

        let subtitle_text = FileManager::read_to_string(subtitle_path)?;
        let entries = subtitle_processor::parse_subtitles(&subtitle_text)
            .with_context(|| format!("Failed to parse {:?}", subtitle_path))?;
        let periods = periods::periods_from_entries(&entries, &self.config)
            .with_context(|| format!("No speech periods in {:?}", subtitle_path))?;
        debug!(
            "{:?}: {} periods, {} ms of speech",
            subtitle_path,
            periods.len(),
            periods::total_duration_ms(&periods)
        );

        let mut written = Vec::new();
        if pending_subtitle {
            let rebuilt = condensed::rebuild_entries(&periods, &entries);
            let text = condensed::render(&rebuilt, output.subtitle_format);
            FileManager::write_to_file(&subtitle_out, text.as_bytes())?;
            written.push(subtitle_out);
        }

        if let (true, Some(audio_out), Some(format)) = (pending_audio, audio_out, output.audio_format) {
            self.write_condensed_audio(media_path, &periods, format, &audio_out).await?;
            written.push(audio_out);
        }

        Ok(written)
    }

    async fn write_condensed_audio(
        &self,
        media_path: &Path,
        periods: &[Period],
        format: audio::AudioFormat,
        audio_out: &Path,
    ) -> Result<()> {
        let transcoder = self
            .transcoder
            .as_ref()
            .ok_or_else(|| anyhow!("An audio format is configured but no transcoder is available"))?;

        let bytes = audio::condense_audio(transcoder.as_ref(), media_path, periods, format)
            .await
            .with_context(|| format!("Failed to condense audio for {:?}", media_path))?;
        FileManager::write_to_file(audio_out, &bytes)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
