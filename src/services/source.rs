use crate::core::{Fingerprint, HashSettings, Raster, majority_vote};
use crate::error::MediaError;
#[cfg(feature = "video-ffmpeg")]
use crate::services::ffmpeg::FfmpegVideo;
use crate::services::sampling::frame_indices;
use image::codecs::gif::GifDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, Frames, ImageReader};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

/// Something that can be decoded into a sequence of grayscale frames.
pub trait FrameSource {
    fn frame_count(&self) -> Result<usize, MediaError>;

    /// Decode frames in order and hand the ones listed in `indices` to
    /// `visit`, stopping early when it breaks.
    fn visit_frames(
        &self,
        indices: &BTreeSet<usize>,
        visit: &mut dyn FnMut(Raster) -> ControlFlow<()>,
    ) -> Result<(), MediaError>;
}

/// A still image; the single frame has index 0.
pub struct StillImage {
    path: PathBuf,
}

impl StillImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn decode(&self) -> Result<Raster, MediaError> {
        let image = ImageReader::open(&self.path)?
            .with_guessed_format()?
            .decode()?;
        Ok(Raster::from_image(image)?)
    }
}

impl FrameSource for StillImage {
    fn frame_count(&self) -> Result<usize, MediaError> {
        Ok(1)
    }

    fn visit_frames(
        &self,
        indices: &BTreeSet<usize>,
        visit: &mut dyn FnMut(Raster) -> ControlFlow<()>,
    ) -> Result<(), MediaError> {
        if indices.contains(&0) {
            let _ = visit(self.decode()?);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationFormat {
    Gif,
    WebP,
}

/// Animated GIF or WebP, decoded frame by frame.
pub struct AnimatedImage {
    path: PathBuf,
    format: AnimationFormat,
}

impl AnimatedImage {
    pub fn new(path: impl Into<PathBuf>, format: AnimationFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Frames in the animation, or 0 for a file that is not animated.
    fn animation_frames(&self) -> Result<usize, MediaError> {
        let reader = BufReader::new(File::open(&self.path)?);
        match self.format {
            AnimationFormat::Gif => {
                let mut options = gif::DecodeOptions::new();
                options.skip_frame_decoding(true);
                let mut decoder = options.read_info(reader)?;
                let mut count = 0;
                while decoder.next_frame_info()?.is_some() {
                    count += 1;
                }
                Ok(count)
            }
            AnimationFormat::WebP => {
                let decoder = image_webp::WebPDecoder::new(reader)?;
                Ok(if decoder.is_animated() {
                    decoder.num_frames() as usize
                } else {
                    0
                })
            }
        }
    }

    fn frames(&self) -> Result<Frames<'static>, MediaError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let frames = match self.format {
            AnimationFormat::Gif => GifDecoder::new(reader)?.into_frames(),
            AnimationFormat::WebP => WebPDecoder::new(reader)?.into_frames(),
        };
        Ok(frames)
    }
}

impl FrameSource for AnimatedImage {
    /// Counted from the container headers; GIF frame data is skipped, not
    /// decompressed. A WebP without animation is one still frame.
    fn frame_count(&self) -> Result<usize, MediaError> {
        Ok(self.animation_frames()?.max(1))
    }

    fn visit_frames(
        &self,
        indices: &BTreeSet<usize>,
        visit: &mut dyn FnMut(Raster) -> ControlFlow<()>,
    ) -> Result<(), MediaError> {
        let Some(&last_wanted) = indices.last() else {
            return Ok(());
        };
        if self.animation_frames()? == 0 {
            return StillImage::new(&self.path).visit_frames(indices, visit);
        }

        for (index, frame) in self.frames()?.enumerate() {
            if index > last_wanted {
                break;
            }
            let frame = frame?;
            if !indices.contains(&index) {
                continue;
            }
            let raster = Raster::from_image(DynamicImage::ImageRgba8(frame.into_buffer()))?;
            if visit(raster).is_break() {
                break;
            }
        }
        Ok(())
    }
}

/// Pick a frame source for a video-mode file by its extension.
pub fn open_video(path: &Path) -> Result<Box<dyn FrameSource + Send + Sync>, MediaError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("gif") => Ok(Box::new(AnimatedImage::new(path, AnimationFormat::Gif))),
        Some("webp") => Ok(Box::new(AnimatedImage::new(path, AnimationFormat::WebP))),
        #[cfg(feature = "video-ffmpeg")]
        Some("mp4" | "avi" | "mov" | "mkv" | "m4v") => Ok(Box::new(FfmpegVideo::new(path))),
        _ => Err(MediaError::Unsupported {
            path: path.to_path_buf(),
        }),
    }
}

pub fn hash_still(path: &Path, settings: &HashSettings) -> Result<Fingerprint, MediaError> {
    let raster = StillImage::new(path).decode()?;
    Ok(settings.compute(&raster)?)
}

/// Hash up to `frames_to_sample` evenly spaced frames and merge them by
/// majority vote.
pub fn hash_frames<S>(
    source: &S,
    settings: &HashSettings,
    frames_to_sample: usize,
) -> Result<Fingerprint, MediaError>
where
    S: FrameSource + ?Sized,
{
    let total = source.frame_count()?;
    let indices = frame_indices(total, frames_to_sample);

    let mut hashes = Vec::with_capacity(indices.len());
    let mut failure = None;
    source.visit_frames(&indices, &mut |raster| {
        match settings.compute(&raster) {
            Ok(fingerprint) => hashes.push(fingerprint),
            Err(e) => {
                failure = Some(e);
                return ControlFlow::Break(());
            }
        }
        if hashes.len() >= frames_to_sample {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    if let Some(e) = failure {
        return Err(e.into());
    }
    if hashes.is_empty() {
        return Err(MediaError::NoFrames);
    }
    log::trace!("Sampled {} of {} frames", hashes.len(), total);
    Ok(majority_vote(&hashes)?)
}
