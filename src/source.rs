//! Bit-string sources: every draw yields a fresh, independent B-bit sample.

use crate::config::{BitWidth, RngMode, RunConfig};
use crate::error::{Error, Result};
use crate::rng::FastRng;
use rand::rngs::OsRng;
use rand::RngCore;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";
const MAX_BYTES: usize = BitWidth::B256.bytes();

/// One B-bit value, as `0x` + B/4 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    hex: String,
    bytes: Vec<u8>,
    bits: BitWidth,
}

impl Sample {
    pub fn from_bytes(bytes: &[u8], bits: BitWidth) -> Result<Self> {
        if bytes.len() != bits.bytes() {
            return Err(Error::MalformedSample {
                hex: hex::encode(bytes),
                bits: bits.bits(),
            });
        }

        Ok(Self {
            hex: format!("0x{}", hex::encode(bytes)),
            bytes: bytes.to_vec(),
            bits,
        })
    }

    /// Parses a `0x`-prefixed lowercase hex string of exactly B/4 digits.
    pub fn from_hex(hex: &str, bits: BitWidth) -> Result<Self> {
        let malformed = || Error::MalformedSample {
            hex: hex.to_owned(),
            bits: bits.bits(),
        };

        let digits = hex.strip_prefix("0x").ok_or_else(malformed)?;

        if digits.len() != bits.hex_digits() || digits.bytes().any(|b| !HEX_DIGITS.contains(&b)) {
            return Err(malformed());
        }

        let bytes = hex::decode(digits).map_err(|_| malformed())?;

        Ok(Self {
            hex: hex.to_owned(),
            bytes,
            bits,
        })
    }

    #[inline]
    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    /// Big-endian bytes: the first hex digit is the most significant nibble.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn bits(&self) -> BitWidth {
        self.bits
    }
}

pub trait BitSource {
    fn next_sample(&mut self) -> Result<Sample>;
}

enum Generator {
    Crypto(OsRng),
    Fast(FastRng),
}

/// The configured source of random hashes.
pub struct HexSource {
    bits: BitWidth,
    generator: Generator,
}

impl HexSource {
    pub fn new(config: &RunConfig) -> Self {
        let generator = match config.rng {
            RngMode::Crypto => Generator::Crypto(OsRng),
            RngMode::Fast => Generator::Fast(match config.seed {
                Some(seed) => FastRng::new_seeded(seed),
                None => FastRng::from_clock(),
            }),
        };

        Self {
            bits: config.bits,
            generator,
        }
    }

    pub fn crypto(bits: BitWidth) -> Self {
        Self {
            bits,
            generator: Generator::Crypto(OsRng),
        }
    }

    pub fn fast(bits: BitWidth, rng: FastRng) -> Self {
        Self {
            bits,
            generator: Generator::Fast(rng),
        }
    }
}

impl BitSource for HexSource {
    fn next_sample(&mut self) -> Result<Sample> {
        match &mut self.generator {
            Generator::Crypto(os) => {
                let mut buf = [0u8; MAX_BYTES];
                let buf = &mut buf[..self.bits.bytes()];

                // NOTE: no fallback, an entropy failure ends the run
                os.try_fill_bytes(buf)?;

                Sample::from_bytes(buf, self.bits)
            }

            Generator::Fast(rng) => {
                let mut hex = String::with_capacity(2 + self.bits.hex_digits());
                hex.push_str("0x");

                for _ in 0..self.bits.hex_digits() {
                    hex.push(HEX_DIGITS[rng.range_u32(0..16) as usize] as char);
                }

                Sample::from_hex(&hex, self.bits)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(sample: &Sample, bits: BitWidth) {
        let hex = sample.as_hex();

        assert!(hex.starts_with("0x"), "sample must be 0x-prefixed: {hex}");
        assert_eq!(hex.len(), 2 + bits.hex_digits(), "wrong length for {bits} bits");
        assert!(hex[2..].bytes().all(|b| HEX_DIGITS.contains(&b)), "not lowercase hex: {hex}");
        assert_eq!(sample.as_bytes().len(), bits.bytes());
    }

    #[test]
    fn test_crypto_source_yields_well_formed_samples() {
        for bits in [BitWidth::B160, BitWidth::B256] {
            let mut src = HexSource::crypto(bits);
            let a = src.next_sample().expect("os entropy should be available");
            let b = src.next_sample().expect("os entropy should be available");

            assert_well_formed(&a, bits);
            assert_well_formed(&b, bits);
            assert_ne!(a, b, "independent draws should differ");
        }
    }

    #[test]
    fn test_fast_source_is_reproducible_with_seed() {
        let mut a = HexSource::fast(BitWidth::B160, FastRng::new_seeded(99));
        let mut b = HexSource::fast(BitWidth::B160, FastRng::new_seeded(99));

        for _ in 0..16 {
            let sa = a.next_sample().unwrap();
            let sb = b.next_sample().unwrap();

            assert_well_formed(&sa, BitWidth::B160);
            assert_eq!(sa, sb);
        }
    }

    #[test]
    fn test_config_selects_generator() {
        let config = RunConfig {
            rng: RngMode::Fast,
            seed: Some(5),
            ..RunConfig::default()
        };

        let mut src = HexSource::new(&config);
        let mut reference = HexSource::fast(BitWidth::B256, FastRng::new_seeded(5));

        assert_eq!(src.next_sample().unwrap(), reference.next_sample().unwrap());
    }

    #[test]
    fn test_from_hex_rejects_malformed_input() {
        let ok = format!("0x{}", "ab".repeat(20));
        assert!(Sample::from_hex(&ok, BitWidth::B160).is_ok());

        let upper = format!("0x{}", "AB".repeat(20));
        let short = format!("0x{}", "ab".repeat(19));
        let unprefixed = "ab".repeat(20);

        assert!(Sample::from_hex(&upper, BitWidth::B160).is_err());
        assert!(Sample::from_hex(&short, BitWidth::B160).is_err());
        assert!(Sample::from_hex(&unprefixed, BitWidth::B160).is_err());
        assert!(Sample::from_hex(&ok, BitWidth::B256).is_err());
    }

    #[test]
    fn test_from_bytes_renders_lowercase_hex() {
        let sample = Sample::from_bytes(&[0xAB; 20], BitWidth::B160).unwrap();

        assert_eq!(sample.as_hex(), format!("0x{}", "ab".repeat(20)));
    }
}
