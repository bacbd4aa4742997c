//! [`SoundPlayer`] – named audio cues and text-to-speech.

use pupos_types::PupError;

/// Speaker driver.
///
/// Both operations are synchronous: [`SoundPlayer::play_file`] blocks the
/// calling thread until the cue has finished playing. Callers that cannot
/// afford to block (the dispatcher, for bark cues) run it on a blocking
/// worker.
pub trait SoundPlayer: Send + Sync {
    /// Play a named cue file (e.g. `"angry_bark.wav"`) to completion.
    fn play_file(&self, name: &str) -> Result<(), PupError>;

    /// Speak a text phrase to completion.
    fn speak(&self, text: &str) -> Result<(), PupError>;
}
