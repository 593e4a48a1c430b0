use crate::error::{Error, Structure};
use crate::guid::Guid;
use std::fmt;
use std::io;

/// Bytes read per entry. The header's `size_of_partition_entry` is not
/// consulted.
pub const PARTITION_ENTRY_SIZE: usize = 128;
pub const PARTITION_NAME_LENGTH: usize = 36;
const PARTITION_NAME_OFFSET: usize = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionEntry {
    pub partition_type_guid: Guid,
    pub unique_partition_guid: Guid,
    pub starting_lba: u64,
    pub ending_lba: u64,
    pub attributes: u64,
    /// UTF-16 code units, zero padded.
    pub partition_name: [u16; PARTITION_NAME_LENGTH],
}

impl PartitionEntry {
    pub fn from_bytes(bytes: &[u8; PARTITION_ENTRY_SIZE]) -> Self {
        use std::convert::TryInto;
        let mut partition_name = [0; PARTITION_NAME_LENGTH];
        for (unit, c) in partition_name
            .iter_mut()
            .zip(bytes[PARTITION_NAME_OFFSET..].chunks(2))
        {
            *unit = u16::from_le_bytes([c[0], c[1]]);
        }
        Self {
            partition_type_guid: Guid::new(bytes[0..16].try_into().unwrap()),
            unique_partition_guid: Guid::new(bytes[16..32].try_into().unwrap()),
            starting_lba: u64::from_le_bytes(bytes[32..40].try_into().unwrap()),
            ending_lba: u64::from_le_bytes(bytes[40..48].try_into().unwrap()),
            attributes: u64::from_le_bytes(bytes[48..56].try_into().unwrap()),
            partition_name,
        }
    }

    /// Reads one 128 byte entry from the current position of `handle`.
    pub fn read<R: io::Read>(handle: &mut R) -> Result<Self, Error> {
        let mut bytes = [0; PARTITION_ENTRY_SIZE];
        handle
            .read_exact(&mut bytes)
            .map_err(Error::read(Structure::PartitionEntry))?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn to_bytes(&self) -> [u8; PARTITION_ENTRY_SIZE] {
        let mut bytes = [0; PARTITION_ENTRY_SIZE];
        bytes[0..16].copy_from_slice(self.partition_type_guid.as_bytes());
        bytes[16..32].copy_from_slice(self.unique_partition_guid.as_bytes());
        bytes[32..40].copy_from_slice(&self.starting_lba.to_le_bytes());
        bytes[40..48].copy_from_slice(&self.ending_lba.to_le_bytes());
        bytes[48..56].copy_from_slice(&self.attributes.to_le_bytes());
        for (c, unit) in bytes[PARTITION_NAME_OFFSET..]
            .chunks_mut(2)
            .zip(self.partition_name.iter())
        {
            c.copy_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    pub fn is_blank(&self) -> bool {
        self.partition_type_guid.is_null() && self.unique_partition_guid.is_null()
    }

    /// Decodes the name, dropping every null code unit. Unpaired surrogates
    /// are replaced with U+FFFD.
    pub fn read_name(&self) -> String {
        String::from_utf16_lossy(&self.partition_name).replace('\0', "")
    }

    pub fn write_name(&mut self, name: &str) -> Result<(), Error> {
        let units = name.encode_utf16().collect::<Vec<_>>();
        if units.len() > PARTITION_NAME_LENGTH {
            return Err(Error::Length {
                capacity: PARTITION_NAME_LENGTH,
                actual: units.len(),
            });
        }
        self.partition_name = [0; PARTITION_NAME_LENGTH];
        self.partition_name[..units.len()].copy_from_slice(&units);
        Ok(())
    }

    pub fn type_label(&self) -> &'static str {
        if self.is_blank() {
            "Unused"
        } else if self.partition_type_guid == Guid::ESP {
            "EFI System"
        } else {
            "Unknown"
        }
    }
}

impl fmt::Display for PartitionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "{:?} type={} ({}) guid={} lba={}..={} attributes={:#018X}",
            self.read_name(),
            self.partition_type_guid,
            self.type_label(),
            self.unique_partition_guid,
            self.starting_lba,
            self.ending_lba,
            self.attributes,
        )
    }
}
