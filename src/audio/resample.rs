//! Band-limited sample rate conversion of decoded tracks.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::decode::DecodedTrack;
use crate::error::AudioError;

/// Convert `track` to `to_rate` with a windowed sinc resampler.
///
/// Every channel is processed in one chunk, so playback can step through the
/// result one frame per output frame. Tracks already at `to_rate` are
/// returned untouched.
pub fn resample_track(track: DecodedTrack, to_rate: u32) -> Result<DecodedTrack, AudioError> {
    let channels = track.channels.max(1);
    let frames = track.frames();
    if track.sample_rate == to_rate || to_rate == 0 || frames == 0 {
        return Ok(track);
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = f64::from(to_rate) / f64::from(track.sample_rate.max(1));
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, frames, channels)?;

    let planar: Vec<Vec<f32>> = (0..channels)
        .map(|channel| (0..frames).map(|frame| track.sample(frame, channel)).collect())
        .collect();
    let output = resampler.process(&planar, None)?;

    let out_frames = output.iter().map(Vec::len).min().unwrap_or(0);
    let mut samples = Vec::with_capacity(out_frames * channels);
    for frame in 0..out_frames {
        samples.extend(output.iter().map(|wave| wave[frame]));
    }

    log::debug!(
        "Resampled {}: {}Hz -> {}Hz, {} -> {} frames",
        track.path.display(),
        track.sample_rate,
        to_rate,
        frames,
        out_frames
    );

    Ok(DecodedTrack {
        path: track.path,
        samples,
        channels,
        sample_rate: to_rate,
    })
}
