/// Fatal errors of a sampling run. None of them is recoverable per sample.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cryptographic generator could not supply entropy: {0}")]
    Entropy(#[from] rand::Error),

    #[error("malformed sample {hex:?}: expected {bits} bits as 0x-prefixed lowercase hex")]
    MalformedSample { hex: String, bits: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
