//! Finding out how long a song is from its media.

use std::io::Cursor;

use lofty::{file::AudioFile, probe::Probe};
use log::debug;

/// The length of an audio file, in seconds.
///
/// `None` if the format isn't recognized, or the file doesn't report a length.
#[must_use]
pub fn duration_of(bytes: &[u8]) -> Option<f64> {
    let tagged_file = match Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .map_err(lofty::error::LoftyError::from)
        .and_then(Probe::read)
    {
        Ok(tagged_file) => tagged_file,
        Err(e) => {
            debug!("Could not probe media: {e}");
            return None;
        }
    };

    let seconds = tagged_file.properties().duration().as_secs_f64();
    (seconds > 0.0).then_some(seconds)
}

#[cfg(test)]
pub(crate) fn wav(sample_rate: u32, seconds: u32) -> Vec<u8> {
    // 8 bit mono pcm, so one byte per sample
    let data_len = sample_rate * seconds;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&8u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 128);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_of_wav() {
        let seconds = duration_of(&wav(8000, 2)).unwrap();
        assert!((seconds - 2.0).abs() < 0.01, "got {seconds}");
    }

    #[test]
    fn test_duration_of_garbage() {
        assert_eq!(duration_of(b"ID3 fake mp3"), None);
        assert_eq!(duration_of(&[]), None);
    }
}
