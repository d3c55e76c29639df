//! Channel mixing and resampling to the 16 kHz mono input Whisper expects.

/// Sample rate required by the recognizer.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Average interleaved channels down to mono.  `channels == 0` yields an
/// empty vector.
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Linear-interpolation resampler from `source_rate` to 16 kHz.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == WHISPER_SAMPLE_RATE || samples.is_empty() || source_rate == 0 {
        return samples.to_vec();
    }

    let ratio = WHISPER_SAMPLE_RATE as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let pos = i as f64 / ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            match (samples.get(idx), samples.get(idx + 1)) {
                (Some(a), Some(b)) => a * (1.0 - frac) + b * frac,
                (Some(a), None) => *a,
                _ => 0.0,
            }
        })
        .collect()
}

/// Downmix then resample one captured buffer.
pub fn to_whisper_input(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<f32> {
    resample_to_16k(&downmix(samples, channels), sample_rate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
