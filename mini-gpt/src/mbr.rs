use crate::chs::Chs;
use crate::error::{Error, Structure};
use crate::hex_dump::HexDump;
use crate::LOGICAL_BLOCK_SIZE;
use std::fmt;
use std::io;

pub const BOOT_CODE_SIZE: usize = 446;
pub const PARTITION_RECORD_COUNT: usize = 4;
pub const PARTITION_RECORD_SIZE: usize = 16;
const PARTITION_RECORD_OFFSET: usize = BOOT_CODE_SIZE;
const SIGNATURE_OFFSET: usize = 510;

pub const REQUIRED_SIGNATURE: u16 = 0xAA55;

pub const OS_TYPE_LINUX_SWAP: u8 = 0x82;
pub const OS_TYPE_LINUX: u8 = 0x83;
pub const OS_TYPE_GPT_PROTECTIVE: u8 = 0xEE;
pub const OS_TYPE_ESP: u8 = 0xEF;

#[derive(Debug, Clone)]
pub struct Mbr {
    pub boot_code: [u8; BOOT_CODE_SIZE],
    pub partition_record: [MbrPartitionRecord; PARTITION_RECORD_COUNT],
    pub signature: u16,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MbrPartitionRecord {
    pub boot_indicator: u8,
    pub starting_chs: Chs,
    pub os_type: u8,
    pub ending_chs: Chs,
    pub starting_lba: u32,
    pub size_in_lba: u32,
}

impl MbrPartitionRecord {
    pub fn from_bytes(bytes: &[u8; PARTITION_RECORD_SIZE]) -> Self {
        use std::convert::TryInto;
        Self {
            boot_indicator: bytes[0],
            starting_chs: Chs::from_bytes([bytes[1], bytes[2], bytes[3]]),
            os_type: bytes[4],
            ending_chs: Chs::from_bytes([bytes[5], bytes[6], bytes[7]]),
            starting_lba: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            size_in_lba: u32::from_le_bytes(bytes[12..16].try_into().unwrap()),
        }
    }

    pub fn to_bytes(&self) -> [u8; PARTITION_RECORD_SIZE] {
        let mut bytes = [0; PARTITION_RECORD_SIZE];
        bytes[0] = self.boot_indicator;
        bytes[1..4].copy_from_slice(self.starting_chs.as_bytes());
        bytes[4] = self.os_type;
        bytes[5..8].copy_from_slice(self.ending_chs.as_bytes());
        bytes[8..12].copy_from_slice(&self.starting_lba.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.size_in_lba.to_le_bytes());
        bytes
    }

    pub fn os_type_label(&self) -> &'static str {
        match self.os_type {
            OS_TYPE_LINUX_SWAP => "Linux Swap",
            OS_TYPE_LINUX => "Linux",
            OS_TYPE_GPT_PROTECTIVE => "GPT",
            OS_TYPE_ESP => "ESP",
            _ => "Unknown",
        }
    }
}

impl Mbr {
    pub fn from_logical_block(logical_block: &[u8; LOGICAL_BLOCK_SIZE]) -> Self {
        use std::convert::TryInto;
        let mut boot_code = [0; BOOT_CODE_SIZE];
        boot_code.copy_from_slice(&logical_block[0..BOOT_CODE_SIZE]);
        let mut partition_record = [MbrPartitionRecord::default(); PARTITION_RECORD_COUNT];
        for (i, record) in partition_record.iter_mut().enumerate() {
            let base = PARTITION_RECORD_OFFSET + i * PARTITION_RECORD_SIZE;
            *record = MbrPartitionRecord::from_bytes(
                logical_block[base..(base + PARTITION_RECORD_SIZE)]
                    .try_into()
                    .unwrap(),
            );
        }
        let signature = u16::from_le_bytes([
            logical_block[SIGNATURE_OFFSET],
            logical_block[SIGNATURE_OFFSET + 1],
        ]);
        Self {
            boot_code,
            partition_record,
            signature,
        }
    }

    /// Reads the 512 byte MBR from the current position of `handle`. The
    /// signature is not checked; see `is_valid`.
    pub fn read<R: io::Read>(handle: &mut R) -> Result<Self, Error> {
        let mut logical_block = [0; LOGICAL_BLOCK_SIZE];
        handle
            .read_exact(&mut logical_block)
            .map_err(Error::read(Structure::Mbr))?;
        Ok(Self::from_logical_block(&logical_block))
    }

    pub fn to_bytes(&self) -> [u8; LOGICAL_BLOCK_SIZE] {
        let mut logical_block = [0; LOGICAL_BLOCK_SIZE];
        logical_block[0..BOOT_CODE_SIZE].copy_from_slice(&self.boot_code);
        for (i, record) in self.partition_record.iter().enumerate() {
            let base = PARTITION_RECORD_OFFSET + i * PARTITION_RECORD_SIZE;
            logical_block[base..(base + PARTITION_RECORD_SIZE)].copy_from_slice(&record.to_bytes());
        }
        logical_block[SIGNATURE_OFFSET..].copy_from_slice(&self.signature.to_le_bytes());
        logical_block
    }

    pub fn is_valid(&self) -> bool {
        self.signature == REQUIRED_SIGNATURE
    }
}

impl fmt::Display for Mbr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "Boot Code:")?;
        write!(f, "{}", HexDump::new(&self.boot_code, 32))?;
        for (i, record) in self.partition_record.iter().enumerate() {
            writeln!(
                f,
                "Partition Record {}: boot={:#04X} type={:#04X} ({}) first={} last={} lba={} sectors={}",
                i,
                record.boot_indicator,
                record.os_type,
                record.os_type_label(),
                record.starting_chs,
                record.ending_chs,
                record.starting_lba,
                record.size_in_lba,
            )?;
        }
        writeln!(
            f,
            "Signature: {:X}{}",
            self.signature,
            if self.is_valid() { "" } else { " (invalid)" }
        )?;
        Ok(())
    }
}
