use crate::error::{Error, Structure};
use crate::guid::Guid;
use crate::LOGICAL_BLOCK_SIZE;
use std::fmt;
use std::io;

/// "EFI PART" read as a little-endian u64
pub const REQUIRED_SIGNATURE: u64 = 0x5452415020494645;
pub const THIS_REVISION: u32 = 0x10000;
pub const HEADER_SIZE: u32 = 92;
pub const RESERVED_TAIL_SIZE: usize = LOGICAL_BLOCK_SIZE - HEADER_SIZE as usize;

const HEADER_CRC32_RANGE: std::ops::Range<usize> = 16..20;

#[derive(Debug, Clone, Copy)]
pub struct GptHeader {
    pub signature: u64,
    pub revision: u32,
    pub header_size: u32,
    pub header_crc32: u32,
    pub reserved: u32,
    pub my_lba: u64,
    pub alternate_lba: u64,
    pub first_usable_lba: u64,
    pub last_usable_lba: u64,
    pub disk_guid: Guid,
    pub partition_entry_lba: u64,
    pub number_of_partition_entries: u32,
    pub size_of_partition_entry: u32,
    pub partition_entry_array_crc32: u32,
    pub reserved_tail: [u8; RESERVED_TAIL_SIZE],
}

/// Reason a decoded header fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentError {
    InvalidSignature(u64),
    ChecksumMismatch { computed: u32, read: u32 },
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContentError::InvalidSignature(signature) => {
                write!(f, "invalid signature {:#018X}", signature)
            }
            ContentError::ChecksumMismatch { computed, read } => write!(
                f,
                "header CRC32 mismatch (computed {:#010X}, read {:#010X})",
                computed, read
            ),
        }
    }
}

impl GptHeader {
    pub fn from_logical_block(logical_block: &[u8; LOGICAL_BLOCK_SIZE]) -> Self {
        use std::convert::TryInto;
        let mut reserved_tail = [0; RESERVED_TAIL_SIZE];
        reserved_tail.copy_from_slice(&logical_block[HEADER_SIZE as usize..]);
        Self {
            signature: u64::from_le_bytes(logical_block[0..8].try_into().unwrap()),
            revision: u32::from_le_bytes(logical_block[8..12].try_into().unwrap()),
            header_size: u32::from_le_bytes(logical_block[12..16].try_into().unwrap()),
            header_crc32: u32::from_le_bytes(logical_block[16..20].try_into().unwrap()),
            reserved: u32::from_le_bytes(logical_block[20..24].try_into().unwrap()),
            my_lba: u64::from_le_bytes(logical_block[24..32].try_into().unwrap()),
            alternate_lba: u64::from_le_bytes(logical_block[32..40].try_into().unwrap()),
            first_usable_lba: u64::from_le_bytes(logical_block[40..48].try_into().unwrap()),
            last_usable_lba: u64::from_le_bytes(logical_block[48..56].try_into().unwrap()),
            disk_guid: Guid::new(logical_block[56..72].try_into().unwrap()),
            partition_entry_lba: u64::from_le_bytes(logical_block[72..80].try_into().unwrap()),
            number_of_partition_entries: u32::from_le_bytes(
                logical_block[80..84].try_into().unwrap(),
            ),
            size_of_partition_entry: u32::from_le_bytes(logical_block[84..88].try_into().unwrap()),
            partition_entry_array_crc32: u32::from_le_bytes(
                logical_block[88..92].try_into().unwrap(),
            ),
            reserved_tail,
        }
    }

    /// Reads a 512 byte header from the current position of `handle`. No
    /// validation is performed; see `is_valid`.
    pub fn read<R: io::Read>(handle: &mut R) -> Result<Self, Error> {
        let mut logical_block = [0; LOGICAL_BLOCK_SIZE];
        handle
            .read_exact(&mut logical_block)
            .map_err(Error::read(Structure::GptHeader))?;
        Ok(Self::from_logical_block(&logical_block))
    }

    pub fn to_bytes(&self) -> [u8; LOGICAL_BLOCK_SIZE] {
        let mut b = [0; LOGICAL_BLOCK_SIZE];
        b[0..8].copy_from_slice(&self.signature.to_le_bytes());
        b[8..12].copy_from_slice(&self.revision.to_le_bytes());
        b[12..16].copy_from_slice(&self.header_size.to_le_bytes());
        b[16..20].copy_from_slice(&self.header_crc32.to_le_bytes());
        b[20..24].copy_from_slice(&self.reserved.to_le_bytes());
        b[24..32].copy_from_slice(&self.my_lba.to_le_bytes());
        b[32..40].copy_from_slice(&self.alternate_lba.to_le_bytes());
        b[40..48].copy_from_slice(&self.first_usable_lba.to_le_bytes());
        b[48..56].copy_from_slice(&self.last_usable_lba.to_le_bytes());
        b[56..72].copy_from_slice(self.disk_guid.as_bytes());
        b[72..80].copy_from_slice(&self.partition_entry_lba.to_le_bytes());
        b[80..84].copy_from_slice(&self.number_of_partition_entries.to_le_bytes());
        b[84..88].copy_from_slice(&self.size_of_partition_entry.to_le_bytes());
        b[88..92].copy_from_slice(&self.partition_entry_array_crc32.to_le_bytes());
        b[HEADER_SIZE as usize..].copy_from_slice(&self.reserved_tail);
        b
    }

    /// CRC32 of the first `header_size` bytes of the header with its CRC field
    /// zeroed. A `header_size` beyond the logical block is clamped to it.
    pub fn compute_crc32(&self) -> u32 {
        let mut copy = self.to_bytes();
        // zero-out the crc field of the copy
        copy[HEADER_CRC32_RANGE].iter_mut().for_each(|b| *b = 0);
        let len = (self.header_size as usize).min(LOGICAL_BLOCK_SIZE);
        crc32fast::hash(&copy[0..len])
    }

    pub fn check(&self) -> Result<(), ContentError> {
        if self.signature != REQUIRED_SIGNATURE {
            return Err(ContentError::InvalidSignature(self.signature));
        }
        let computed = self.compute_crc32();
        if computed != self.header_crc32 {
            return Err(ContentError::ChecksumMismatch {
                computed,
                read: self.header_crc32,
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(e) => {
                log::debug!("GPT header at LBA {} is invalid: {}", self.my_lba, e);
                false
            }
        }
    }
}

impl fmt::Display for GptHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "Signature: {:#018X}", self.signature)?;
        writeln!(f, "Revision: {:#X}", self.revision)?;
        writeln!(f, "Header Size: {}", self.header_size)?;
        write!(f, "Header CRC32: {:#010X}", self.header_crc32)?;
        match self.check() {
            Ok(()) => writeln!(f, " (valid)")?,
            Err(e) => writeln!(f, " ({})", e)?,
        }
        writeln!(f, "My LBA: {}", self.my_lba)?;
        writeln!(f, "Alternate LBA: {}", self.alternate_lba)?;
        writeln!(
            f,
            "Usable LBAs: {}..={}",
            self.first_usable_lba, self.last_usable_lba
        )?;
        writeln!(f, "Disk GUID: {}", self.disk_guid)?;
        writeln!(f, "Partition Entry LBA: {}", self.partition_entry_lba)?;
        writeln!(
            f,
            "Partition Entries: {} x {} bytes",
            self.number_of_partition_entries, self.size_of_partition_entry
        )?;
        writeln!(
            f,
            "Partition Entry Array CRC32: {:#010X}",
            self.partition_entry_array_crc32
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> GptHeader {
        let mut header = GptHeader {
            signature: REQUIRED_SIGNATURE,
            revision: THIS_REVISION,
            header_size: HEADER_SIZE,
            header_crc32: 0,
            reserved: 0,
            my_lba: 1,
            alternate_lba: 2047,
            first_usable_lba: 34,
            last_usable_lba: 2014,
            disk_guid: "0f6b4c27-6a37-4e43-9d6c-5b9a1f1b2f0e".parse().unwrap(),
            partition_entry_lba: 2,
            number_of_partition_entries: 128,
            size_of_partition_entry: 128,
            partition_entry_array_crc32: 0x1234_5678,
            reserved_tail: [0; RESERVED_TAIL_SIZE],
        };
        header.header_crc32 = header.compute_crc32();
        header
    }

    #[test]
    fn signature_constant_is_efi_part() {
        assert_eq!(REQUIRED_SIGNATURE.to_le_bytes(), *b"EFI PART");
    }

    #[test]
    fn valid_header() {
        let header = sample_header();
        assert!(header.is_valid());
        assert_eq!(header.check(), Ok(()));
    }

    #[test]
    fn crc_is_computed_over_header_size_bytes() {
        let header = sample_header();
        let mut bytes = header.to_bytes();
        bytes[16..20].copy_from_slice(&[0; 4]);
        assert_eq!(header.header_crc32, crc32fast::hash(&bytes[0..92]));
        // the reserved tail lies outside the checksummed range
        let mut tail_modified = header;
        tail_modified.reserved_tail[0] = 0xFF;
        assert!(tail_modified.is_valid());
    }

    #[test]
    fn zeroed_signature_is_invalid() {
        let mut header = sample_header();
        header.signature = 0;
        assert_eq!(header.check(), Err(ContentError::InvalidSignature(0)));
        assert!(!header.is_valid());
    }

    #[test]
    fn modified_revision_is_invalid() {
        let header = sample_header();
        for bit in 0..32 {
            let mut modified = header;
            modified.revision ^= 1 << bit;
            assert!(!modified.is_valid(), "bit {}", bit);
        }
        let mut zeroed = header;
        zeroed.revision = 0;
        assert!(matches!(
            zeroed.check(),
            Err(ContentError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn oversized_header_size_does_not_panic() {
        let mut header = sample_header();
        header.header_size = u32::MAX;
        assert!(!header.is_valid());
        header.header_crc32 = header.compute_crc32();
        assert!(header.is_valid());
        header.header_size = 0;
        header.header_crc32 = header.compute_crc32();
        assert_eq!(header.header_crc32, crc32fast::hash(&[]));
        assert!(header.is_valid());
    }

    #[test]
    fn decode_re_encode() {
        let header = sample_header();
        let bytes = header.to_bytes();
        let decoded = GptHeader::read(&mut &bytes[..]).unwrap();
        assert_eq!(decoded.to_bytes()[..], bytes[..]);
        assert_eq!(decoded.alternate_lba, 2047);
        assert_eq!(decoded.number_of_partition_entries, 128);
        assert_eq!(decoded.disk_guid, header.disk_guid);
        assert!(decoded.is_valid());
    }

    #[test]
    fn short_read_fails() {
        let bytes = sample_header().to_bytes();
        assert!(matches!(
            GptHeader::read(&mut &bytes[..100]),
            Err(Error::Read {
                structure: Structure::GptHeader,
                ..
            })
        ));
    }
}
