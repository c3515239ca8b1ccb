/// I/O operations for handing extracted tones to other programs

/// WAV writer for extracted tones
pub mod wav;

pub use wav::{encode_wav, save_wav, write_wav};
