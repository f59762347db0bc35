/// Encodes mono `f32` samples in [-1, 1] as a 16-bit PCM RIFF/WAV file.
pub fn encode_wav_mono_pcm16(samples: &[f32], sample_rate_hz: u32) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let audio_format: u16 = 1; // PCM

    let byte_rate = sample_rate_hz * num_channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = num_channels * (bits_per_sample / 8);

    let data_bytes_len = samples.len() as u32 * 2;

    let mut out = Vec::with_capacity((44 + data_bytes_len) as usize);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_bytes_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&audio_format.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate_hz.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_bytes_len.to_le_bytes());

    for s in samples {
        out.extend_from_slice(&to_pcm16(*s).to_le_bytes());
    }

    out
}

pub fn duration_ms(sample_count: usize, sample_rate_hz: u32) -> u64 {
    if sample_rate_hz == 0 {
        return 0;
    }
    (sample_count as u64 * 1_000) / sample_rate_hz as u64
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WavError {
    #[error("not a RIFF/WAVE file")]
    NotWav,

    #[error("missing {0} chunk")]
    MissingChunk(&'static str),

    #[error("invalid fmt chunk")]
    BadFormat,
}

/// Reads the playback length from a RIFF/WAVE header without decoding samples.
///
/// Chunks are walked in order, so files with `LIST` or other metadata chunks
/// before `data` are accepted. A `data` chunk that claims more bytes than the
/// file holds is measured by what is actually there.
pub fn read_wav_duration_ms(bytes: &[u8]) -> Result<u64, WavError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(WavError::NotWav);
    }

    let mut byte_rate: Option<u32> = None;
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let len = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]])
            as usize;
        let body = pos + 8;

        match id {
            b"fmt " => {
                if len < 16 || body + 16 > bytes.len() {
                    return Err(WavError::BadFormat);
                }
                let rate = u32::from_le_bytes([
                    bytes[body + 8],
                    bytes[body + 9],
                    bytes[body + 10],
                    bytes[body + 11],
                ]);
                if rate == 0 {
                    return Err(WavError::BadFormat);
                }
                byte_rate = Some(rate);
            }
            b"data" => {
                let rate = byte_rate.ok_or(WavError::MissingChunk("fmt"))?;
                let available = len.min(bytes.len() - body) as u64;
                return Ok(available * 1_000 / rate as u64);
            }
            _ => {}
        }

        // Chunks are word aligned.
        pos = body.saturating_add(len).saturating_add(len & 1);
    }

    Err(WavError::MissingChunk(if byte_rate.is_some() {
        "data"
    } else {
        "fmt"
    }))
}

fn to_pcm16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}
