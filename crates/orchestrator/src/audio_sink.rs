//! Writes a synthesized turn's audio to a WAV file so operators can recover
//! it from disk, and encodes the same audio as an in-memory WAV buffer for
//! the wire layer to send inline to the client.

use std::io::Cursor;
use std::path::PathBuf;
use voice_agent_core::AudioFrame;

fn wav_spec(audio: &AudioFrame) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn write_samples<W: std::io::Write + std::io::Seek>(
    writer: &mut hound::WavWriter<W>,
    audio: &AudioFrame,
) -> Result<(), hound::Error> {
    for &sample in &audio.samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let value = (clamped * i16::MAX as f32) as i16;
        writer.write_sample(value)?;
    }
    Ok(())
}

pub fn write_turn_audio(audio: &AudioFrame, dir: &std::path::Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("turn-{}.wav", uuid::Uuid::new_v4()));
    let mut writer = hound::WavWriter::create(&path, wav_spec(audio))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    write_samples(&mut writer, audio).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    writer
        .finalize()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    Ok(path)
}

/// Encodes `audio` as a complete WAV file in memory, for handing straight to
/// the client over the wire without a round trip through disk.
pub fn encode_wav_bytes(audio: &AudioFrame) -> std::io::Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, wav_spec(audio))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        write_samples(&mut writer, audio).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        writer
            .finalize()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    }
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_readable_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let audio = AudioFrame::new(vec![0.0, 0.5, -0.5, 1.0], 16_000);
        let path = write_turn_audio(&audio, dir.path()).unwrap();
        assert!(path.exists());
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 16_000);
    }

    #[test]
    fn encodes_wav_bytes_readable_back_from_memory() {
        let audio = AudioFrame::new(vec![0.0, 0.25, -0.25, 0.9], 24_000);
        let bytes = encode_wav_bytes(&audio).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 24_000);
    }
}
