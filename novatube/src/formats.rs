//! Turns a provider's stream list into the downloadable options shown to the
//! user: one representative stream per container and quality cell, plus
//! audio-only tracks.

use std::time::Duration;

use crate::error::CoreError;
use crate::models::{Container, FormatOption, Platform, VideoReference};
use crate::providers::{ProviderStream, StreamProvider};

const TARGET_CONTAINERS: [Container; 2] = [Container::Mp4, Container::Webm];
const TARGET_QUALITIES: [&str; 6] = ["144p", "240p", "360p", "480p", "720p", "1080p"];
const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Fresh provider call on every invocation; results are not cached.
pub async fn resolve_formats(
    provider: &dyn StreamProvider,
    reference: &VideoReference,
    timeout: Duration
) -> Result<Vec<FormatOption>, CoreError> {
    if reference.platform != Platform::YouTube {
        return Err(CoreError::PlatformNotImplemented(reference.platform));
    }

    let streams = tokio::time::timeout(timeout, provider.streams(reference))
        .await
        .map_err(|_| CoreError::FormatsUnavailable(format!("{} timed out after {timeout:?}", provider.name())))?
        .map_err(|e| CoreError::FormatsUnavailable(e.to_string()))?;

    let options = select_formats(&streams);
    if options.is_empty() {
        return Err(CoreError::FormatsUnavailable(format!(
            "none of the {} streams reported for {} is downloadable",
            streams.len(),
            reference.native_id
        )));
    }

    tracing::info!(
        "Resolved {} of {} streams for {}",
        options.len(),
        streams.len(),
        reference.native_id
    );

    Ok(options)
}

pub fn select_formats(streams: &[ProviderStream]) -> Vec<FormatOption> {
    let mut options = scan_grid(streams, true);

    if options.is_empty() {
        options = scan_grid(streams, false);
    }

    for container in TARGET_CONTAINERS {
        let audio = streams
            .iter()
            .find(|s| s.has_audio && !s.has_video && matches_container(s, container));

        if let Some(stream) = audio {
            options.push(build_option(
                stream,
                container,
                format!("{container}-audio"),
                "audio".to_string(),
                format!("{} - Audio Only", container.as_str().to_uppercase())
            ));
        }
    }

    options
}

/// First stream in provider order per (container, quality) cell. With
/// `require_audio` unset, video-only streams qualify and are labelled as such.
fn scan_grid(streams: &[ProviderStream], require_audio: bool) -> Vec<FormatOption> {
    let mut options = Vec::new();

    for container in TARGET_CONTAINERS {
        for quality in TARGET_QUALITIES {
            let found = streams.iter().find(|s| {
                s.has_video
                    && (s.has_audio || !require_audio)
                    && matches_container(s, container)
                    && s.quality_label.as_deref() == Some(quality)
            });

            let Some(stream) = found else {
                continue;
            };

            let upper = container.as_str().to_uppercase();
            let (quality_label, label) = if require_audio {
                (quality.to_string(), format!("{upper} - {quality}"))
            } else {
                (format!("{quality} (Video Only)"), format!("{upper} - {quality} (Video Only)"))
            };

            options.push(build_option(
                stream,
                container,
                format!("{container}-{quality}"),
                quality_label,
                label
            ));
        }
    }

    options
}

fn matches_container(stream: &ProviderStream, container: Container) -> bool {
    stream.container.eq_ignore_ascii_case(container.as_str())
}

fn build_option(
    stream: &ProviderStream,
    container: Container,
    id: String,
    quality_label: String,
    label: String
) -> FormatOption {
    let approximate_size_bytes = stream
        .content_length
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok());

    FormatOption {
        id,
        label,
        container,
        quality_label,
        approximate_size_bytes,
        size: format_size(approximate_size_bytes),
        source_url: stream.url.clone().filter(|u| !u.is_empty())
    }
}

pub fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(bytes) => format_bytes(bytes),
        None => String::from("Unknown")
    }
}

/// Base-1024 size rounded to the nearest whole unit, e.g. `1 MB`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return String::from("0 Byte");
    }

    let mut unit = 0;
    let mut divisor = 1u64;
    while unit < SIZE_UNITS.len() - 1 && bytes / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let value = (bytes as f64 / divisor as f64).round() as u64;
    format!("{value} {}", SIZE_UNITS[unit])
}
