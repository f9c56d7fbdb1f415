use std::fmt;

/// Errors from loading audio sample data into a bank.
///
/// Parse failures in the sequence mini-language are deliberately not
/// error-typed: the parser is total and recovers per token (see
/// `parser::parse`). Playback control operations fail silently with a
/// logged warning, so the only fallible surface left is sample loading.
#[derive(Debug)]
pub enum SampleError {
    /// The WAV container could not be decoded.
    Wav(hound::Error),
    /// Decoded to zero frames.
    EmptySample,
    /// Only mono and stereo sources are accepted.
    UnsupportedChannels(u16),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::Wav(e) => write!(f, "WAV decode error: {e}"),
            SampleError::EmptySample => write!(f, "sample decoded to zero frames"),
            SampleError::UnsupportedChannels(n) => {
                write!(f, "unsupported channel count: {n}")
            }
        }
    }
}

impl std::error::Error for SampleError {}

impl From<hound::Error> for SampleError {
    fn from(e: hound::Error) -> Self {
        SampleError::Wav(e)
    }
}
