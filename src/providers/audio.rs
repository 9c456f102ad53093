use std::io::{Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::ProviderError;

/// Mono 16-bit PCM audio, the shape speech recognizers expect.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn from_wav_file(path: &Path) -> Result<Self, ProviderError> {
        let reader = WavReader::open(path)
            .map_err(|e| ProviderError::Audio(format!("{}: {e}", path.display())))?;
        Self::from_reader(reader)
    }

    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, ProviderError> {
        let reader =
            WavReader::new(Cursor::new(bytes)).map_err(|e| ProviderError::Audio(e.to_string()))?;
        Self::from_reader(reader)
    }

    fn from_reader<R: Read>(mut reader: WavReader<R>) -> Result<Self, ProviderError> {
        let spec = reader.spec();
        let interleaved: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .collect::<Result<_, _>>()
                .map_err(|e| ProviderError::Audio(e.to_string()))?,
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(float_to_i16))
                .collect::<Result<_, _>>()
                .map_err(|e| ProviderError::Audio(e.to_string()))?,
            (format, bits) => {
                return Err(ProviderError::Audio(format!(
                    "Unsupported WAV sample format: {format:?} {bits}-bit"
                )))
            }
        };

        let samples = downmix(&interleaved, spec.channels);
        tracing::debug!(
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            samples = samples.len(),
            "Decoded WAV"
        );
        Ok(Self::new(samples, spec.sample_rate))
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Little-endian PCM bytes (LINEAR16).
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Average interleaved frames down to one channel.
fn downmix(interleaved: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn wav_bytes(spec: WavSpec, write: impl FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn mono_int16_roundtrip() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |w| {
            for s in [0i16, 100, -100, i16::MAX] {
                w.write_sample(s).unwrap();
            }
        });

        let clip = AudioClip::from_wav_bytes(&bytes).unwrap();
        assert_eq!(clip.sample_rate, 16000);
        assert_eq!(clip.samples, vec![0, 100, -100, i16::MAX]);
    }

    #[test]
    fn stereo_is_downmixed() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |w| {
            for s in [100i16, 300, -50, 50] {
                w.write_sample(s).unwrap();
            }
        });

        let clip = AudioClip::from_wav_bytes(&bytes).unwrap();
        assert_eq!(clip.samples, vec![200, 0]);
    }

    #[test]
    fn float_samples_converted() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let bytes = wav_bytes(spec, |w| {
            for s in [0.0f32, 1.0, -1.0, 2.0] {
                w.write_sample(s).unwrap();
            }
        });

        let clip = AudioClip::from_wav_bytes(&bytes).unwrap();
        assert_eq!(clip.samples, vec![0, i16::MAX, -i16::MAX, i16::MAX]);
    }

    #[test]
    fn unsupported_bit_depth_rejected() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 8,
            sample_format: SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |w| {
            w.write_sample(1i8).unwrap();
        });
        assert!(matches!(
            AudioClip::from_wav_bytes(&bytes),
            Err(ProviderError::Audio(_))
        ));
    }

    #[test]
    fn garbage_is_audio_error() {
        assert!(AudioClip::from_wav_bytes(b"not a wav").is_err());
    }

    #[test]
    fn le_bytes_and_duration() {
        let clip = AudioClip::new(vec![1, -1], 2);
        assert_eq!(clip.to_le_bytes(), vec![0x01, 0x00, 0xFF, 0xFF]);
        assert!((clip.duration_secs() - 1.0).abs() < f32::EPSILON);
    }
}
