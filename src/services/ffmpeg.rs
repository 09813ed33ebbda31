//! Container video (mp4, avi, mov, mkv, m4v) decoded through FFmpeg.

use crate::core::Raster;
use crate::error::MediaError;
use crate::services::source::FrameSource;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::media::Type;
use ffmpeg_next::software::scaling::{Context as Scaler, Flags};
use ffmpeg_next::util::frame::video::Video;
use image::{GrayImage, Luma};
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use std::path::PathBuf;

/// The best video stream of a container file.
pub struct FfmpegVideo {
    path: PathBuf,
}

impl FfmpegVideo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stream frame count from the container, 0 when it does not say.
    fn declared_frames(&self) -> Result<usize, MediaError> {
        ffmpeg::init()?;
        let input = ffmpeg::format::input(&self.path)?;
        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(ffmpeg::Error::StreamNotFound)?;
        Ok(usize::try_from(stream.frames()).unwrap_or(0))
    }

    /// Decode the stream in order, handing each frame and its index to
    /// `on_frame` until it breaks or the stream ends.
    fn decode<F>(&self, mut on_frame: F) -> Result<(), MediaError>
    where
        F: FnMut(usize, &Video) -> Result<ControlFlow<()>, MediaError>,
    {
        ffmpeg::init()?;
        let mut input = ffmpeg::format::input(&self.path)?;
        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(ffmpeg::Error::StreamNotFound)?;
        let stream_index = stream.index();
        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
        let mut decoder = context.decoder().video()?;

        let mut index = 0;
        let mut frame = Video::empty();
        for (stream, packet) in input.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut frame).is_ok() {
                if on_frame(index, &frame)?.is_break() {
                    return Ok(());
                }
                index += 1;
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut frame).is_ok() {
            if on_frame(index, &frame)?.is_break() {
                return Ok(());
            }
            index += 1;
        }
        Ok(())
    }
}

fn to_raster(scaler: &mut Scaler, frame: &Video) -> Result<Raster, MediaError> {
    let mut gray = Video::empty();
    scaler.run(frame, &mut gray)?;

    let stride = gray.stride(0);
    let data = gray.data(0);
    let image = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([data[y as usize * stride + x as usize]])
    });
    Ok(Raster::new(image)?)
}

impl FrameSource for FfmpegVideo {
    /// Falls back to decoding the whole stream when the container has no
    /// frame count.
    fn frame_count(&self) -> Result<usize, MediaError> {
        let declared = self.declared_frames()?;
        if declared > 0 {
            return Ok(declared);
        }

        let mut count = 0;
        self.decode(|_, _| {
            count += 1;
            Ok(ControlFlow::Continue(()))
        })?;
        log::debug!("Counted {} frames in {}", count, self.path.display());
        Ok(count)
    }

    fn visit_frames(
        &self,
        indices: &BTreeSet<usize>,
        visit: &mut dyn FnMut(Raster) -> ControlFlow<()>,
    ) -> Result<(), MediaError> {
        let Some(&last_wanted) = indices.last() else {
            return Ok(());
        };

        let mut scaler: Option<Scaler> = None;
        self.decode(|index, frame| {
            if index > last_wanted {
                return Ok(ControlFlow::Break(()));
            }
            if !indices.contains(&index) {
                return Ok(ControlFlow::Continue(()));
            }
            if scaler.is_none() {
                scaler = Some(Scaler::get(
                    frame.format(),
                    frame.width(),
                    frame.height(),
                    Pixel::GRAY8,
                    frame.width(),
                    frame.height(),
                    Flags::BILINEAR,
                )?);
            }
            let Some(scaler) = scaler.as_mut() else {
                return Ok(ControlFlow::Break(()));
            };
            Ok(visit(to_raster(scaler, frame)?))
        })
    }
}
