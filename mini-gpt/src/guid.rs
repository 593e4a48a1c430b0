use crate::Error;
use std::fmt;
use std::str::FromStr;

pub const GUID_SIZE: usize = 16;
const STRING_LENGTH: usize = 36;
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

// Position in the raw bytes of each byte of the canonical string form. The
// mapping is its own inverse.
const CANONICAL_ORDER: [usize; GUID_SIZE] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];

/// A GUID stored in on-disk (mixed-endian) byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid([u8; GUID_SIZE]);

impl Guid {
    pub const NULL: Self = Self([0; GUID_SIZE]);

    /// c12a7328-f81f-11d2-ba4b-00a0c93ec93b
    pub const ESP: Self = Self([
        0x28, 0x73, 0x2a, 0xc1, 0x1f, 0xf8, 0xd2, 0x11, 0xba, 0x4b, 0x00, 0xa0, 0xc9, 0x3e, 0xc9,
        0x3b,
    ]);

    pub const fn new(raw: [u8; GUID_SIZE]) -> Self {
        Self(raw)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        use std::convert::TryInto;
        bytes.try_into().map(Self).map_err(|_| Error::Length {
            capacity: GUID_SIZE,
            actual: bytes.len(),
        })
    }

    pub fn as_bytes(&self) -> &[u8; GUID_SIZE] {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl FromStr for Guid {
    type Err = Error;

    /// Parses the canonical `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form.
    fn from_str(s: &str) -> Result<Self, Error> {
        let format_error = || Error::Format(s.to_string());
        let chars = s.as_bytes();
        if chars.len() != STRING_LENGTH {
            return Err(format_error());
        }
        let mut digits = Vec::with_capacity(GUID_SIZE * 2);
        for (i, &c) in chars.iter().enumerate() {
            if HYPHEN_POSITIONS.contains(&i) {
                if c != b'-' {
                    return Err(format_error());
                }
            } else {
                let digit = (c as char).to_digit(16).ok_or_else(format_error)?;
                digits.push(digit as u8);
            }
        }
        let mut raw = [0; GUID_SIZE];
        for (pair, &index) in digits.chunks(2).zip(CANONICAL_ORDER.iter()) {
            raw[index] = (pair[0] << 4) | pair[1];
        }
        Ok(Self(raw))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, &index) in CANONICAL_ORDER.iter().enumerate() {
            if let 4 | 6 | 8 | 10 = i {
                write!(f, "-")?;
            }
            write!(f, "{:02x}", self.0[index])?;
        }
        Ok(())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_guid_string() {
        assert_eq!(
            Guid::NULL.to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
        assert!(Guid::NULL.is_null());
        assert!(!Guid::ESP.is_null());
    }

    #[test]
    fn esp_guid_string() {
        assert_eq!(
            Guid::ESP.to_string(),
            "c12a7328-f81f-11d2-ba4b-00a0c93ec93b"
        );
        let parsed: Guid = "C12A7328-F81F-11D2-BA4B-00A0C93EC93B".parse().unwrap();
        assert_eq!(parsed, Guid::ESP);
    }

    #[test]
    fn mixed_endian_byte_order() {
        let guid = Guid::new([
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ]);
        assert_eq!(guid.to_string(), "33221100-5544-7766-8899-aabbccddeeff");
    }

    #[test]
    fn string_round_trip() {
        let check = |raw: &[u8]| {
            let guid = Guid::from_bytes(raw).unwrap();
            let s = guid.to_string();
            assert_eq!(s.len(), 36);
            assert_eq!(s, s.to_lowercase());
            assert_eq!(s.parse::<Guid>().unwrap(), guid, "{}", s);
        };
        // every byte value in every position
        for position in 0..GUID_SIZE {
            for value in 0..=255u8 {
                let mut raw = [0; GUID_SIZE];
                raw[position] = value;
                check(&raw);
            }
        }
        // pseudo-random patterns from a fixed xorshift seed
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        for _ in 0..4096 {
            let mut raw = [0; GUID_SIZE];
            for chunk in raw.chunks_mut(8) {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                chunk.copy_from_slice(&state.to_le_bytes());
            }
            check(&raw);
        }
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        assert!(matches!(
            Guid::from_bytes(&[0; 15]),
            Err(Error::Length {
                capacity: 16,
                actual: 15
            })
        ));
        assert!(matches!(
            Guid::from_bytes(&[0; 17]),
            Err(Error::Length { .. })
        ));
    }

    #[test]
    fn parse_rejects_malformed_strings() {
        for s in [
            "",
            "c12a7328f81f11d2ba4b00a0c93ec93b",
            "c12a7328-f81f-11d2-ba4b-00a0c93ec93",
            "c12a7328-f81f-11d2-ba4b-00a0c93ec93b0",
            "c12a7328-f81f-11d2-ba4b_00a0c93ec93b",
            "g12a7328-f81f-11d2-ba4b-00a0c93ec93b",
            "+12a7328-f81f-11d2-ba4b-00a0c93ec93b",
            "c12a7328-f81f-11d2-ba4b-00a0c93ec9\u{e9}",
        ]
        .iter()
        {
            assert!(
                matches!(s.parse::<Guid>(), Err(Error::Format(_))),
                "{:?} should not parse",
                s
            );
        }
    }

    #[test]
    fn equality_is_bytewise() {
        let mut raw = *Guid::ESP.as_bytes();
        assert_eq!(Guid::new(raw), Guid::ESP);
        raw[15] ^= 1;
        assert_ne!(Guid::new(raw), Guid::ESP);
    }
}
