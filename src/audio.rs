/*!
 * Boundary with the audio transcoder.
 *
 * Decoding and encoding are delegated to an `AudioTranscoder`. Slicing and
 * concatenation are plain arithmetic over interleaved 16-bit PCM and come as
 * provided methods. `FfmpegTranscoder` drives the `ffmpeg` binary.
 */

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use anyhow::anyhow;
use async_trait::async_trait;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use crate::errors::AudioError;
use crate::periods::Period;

/// Decoded, interleaved 16-bit PCM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channel_count: u16,
    pub samples: Vec<i16>,
}

impl DecodedAudio {
    /// Number of sample frames (samples per channel)
    pub fn total_samples(&self) -> usize {
        self.samples.len() / usize::from(self.channel_count.max(1))
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.total_samples() as u64 * 1000 / u64::from(self.sample_rate)
    }
}

/// A slice of decoded audio covering one period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmSegment {
    pub sample_rate: u32,
    pub channel_count: u16,
    pub samples: Vec<i16>,
}

/// Encoded output formats
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
    Opus,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
        }
    }

    fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Wav => "pcm_s16le",
            Self::Mp3 => "libmp3lame",
            Self::Opus => "libopus",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "wav" => Ok(Self::Wav),
            "mp3" => Ok(Self::Mp3),
            "opus" => Ok(Self::Opus),
            _ => Err(anyhow!("Unsupported audio format: {}", s)),
        }
    }
}

/// Decodes media to PCM and encodes PCM back to bytes
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Decode the audio track of a media file
    async fn extract(&self, media: &Path) -> Result<DecodedAudio, AudioError>;

    /// Encode PCM audio into the given format
    async fn encode(&self, audio: &DecodedAudio, format: AudioFormat) -> Result<Vec<u8>, AudioError>;

    /// Cut one segment per period. Periods past the end of the audio are
    /// clipped to it and may come back empty.
    fn slice(&self, audio: &DecodedAudio, periods: &[Period]) -> Vec<PcmSegment> {
        let channels = usize::from(audio.channel_count.max(1));
        let total = audio.total_samples();
        let frame_at = |ms: u64| ((ms * u64::from(audio.sample_rate) / 1000) as usize).min(total);

        periods
            .iter()
            .map(|period| {
                let start = frame_at(period.start_ms);
                let end = frame_at(period.end_ms).max(start);
                PcmSegment {
                    sample_rate: audio.sample_rate,
                    channel_count: audio.channel_count,
                    samples: audio.samples[start * channels..end * channels].to_vec(),
                }
            })
            .collect()
    }

    /// Join segments end to end. All segments must share a sample layout.
    fn concatenate(&self, segments: &[PcmSegment]) -> Result<DecodedAudio, AudioError> {
        let first = segments
            .first()
            .ok_or_else(|| AudioError::Encode("no audio segments to concatenate".to_string()))?;

        let mut samples = Vec::with_capacity(segments.iter().map(|s| s.samples.len()).sum());
        for segment in segments {
            if segment.sample_rate != first.sample_rate || segment.channel_count != first.channel_count {
                return Err(AudioError::Encode(format!(
                    "segment layout {} Hz/{} ch does not match {} Hz/{} ch",
                    segment.sample_rate, segment.channel_count, first.sample_rate, first.channel_count
                )));
            }
            samples.extend_from_slice(&segment.samples);
        }

        Ok(DecodedAudio {
            sample_rate: first.sample_rate,
            channel_count: first.channel_count,
            samples,
        })
    }
}

/// Decode, keep only the given periods, and encode the result
pub async fn condense_audio(
    transcoder: &dyn AudioTranscoder,
    media: &Path,
    periods: &[Period],
    format: AudioFormat,
) -> Result<Vec<u8>, AudioError> {
    let audio = transcoder.extract(media).await?;
    debug!("Decoded {} ms of audio from {:?}", audio.duration_ms(), media);

    let segments = transcoder.slice(&audio, periods);
    let condensed = transcoder.concatenate(&segments)?;
    debug!("Condensed audio down to {} ms", condensed.duration_ms());

    transcoder.encode(&condensed, format).await
}

/// Transcoder backed by the `ffmpeg` command line tool
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    // @field: ffmpeg executable
    pub ffmpeg_path: String,
    // @field: Output sample rate for decoding
    pub sample_rate: u32,
    // @field: Output channel count for decoding
    pub channel_count: u16,
    // @field: Per-invocation timeout
    pub timeout: Duration,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            sample_rate: 44_100,
            channel_count: 2,
            timeout: Duration::from_secs(300),
        }
    }
}

impl FfmpegTranscoder {
    async fn run(&self, args: &[String]) -> Result<Vec<u8>, AudioError> {
        let ffmpeg_future = Command::new(&self.ffmpeg_path).args(args).output();

        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| AudioError::Process(format!("failed to run {}: {}", self.ffmpeg_path, e)))?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(AudioError::Process(format!("ffmpeg timed out after {:?}", self.timeout)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffmpeg failed: {}", stderr.trim());
            return Err(AudioError::Process(stderr.trim().to_string()));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn extract(&self, media: &Path) -> Result<DecodedAudio, AudioError> {
        if !media.exists() {
            return Err(AudioError::Decode(format!("media file does not exist: {:?}", media)));
        }

        let args = vec![
            "-v".to_string(), "error".to_string(),
            "-i".to_string(), media.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-f".to_string(), "s16le".to_string(),
            "-acodec".to_string(), "pcm_s16le".to_string(),
            "-ac".to_string(), self.channel_count.to_string(),
            "-ar".to_string(), self.sample_rate.to_string(),
            "pipe:1".to_string(),
        ];
        let bytes = self.run(&args).await.map_err(|e| AudioError::Decode(e.to_string()))?;

        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(DecodedAudio {
            sample_rate: self.sample_rate,
            channel_count: self.channel_count,
            samples,
        })
    }

    async fn encode(&self, audio: &DecodedAudio, format: AudioFormat) -> Result<Vec<u8>, AudioError> {
        let encode_error = |e: std::io::Error| AudioError::Encode(e.to_string());

        let raw_input = tempfile::Builder::new().suffix(".pcm").tempfile().map_err(encode_error)?;
        let raw_bytes: Vec<u8> = audio.samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        tokio::fs::write(raw_input.path(), &raw_bytes).await.map_err(encode_error)?;

        let output = tempfile::Builder::new()
            .suffix(&format!(".{}", format.extension()))
            .tempfile()
            .map_err(encode_error)?;

        let args = vec![
            "-v".to_string(), "error".to_string(),
            "-y".to_string(),
            "-f".to_string(), "s16le".to_string(),
            "-ar".to_string(), audio.sample_rate.to_string(),
            "-ac".to_string(), audio.channel_count.to_string(),
            "-i".to_string(), raw_input.path().to_string_lossy().to_string(),
            "-c:a".to_string(), format.ffmpeg_codec().to_string(),
            output.path().to_string_lossy().to_string(),
        ];
        self.run(&args).await.map_err(|e| AudioError::Encode(e.to_string()))?;

        tokio::fs::read(output.path()).await.map_err(encode_error)
    }
}
