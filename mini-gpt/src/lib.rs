//! Decoding of GPT partitioned disk images: the protective MBR, the primary
//! and backup GPT headers, and both partition entry arrays.
//!
//! Decoding never validates. Call `is_valid` on each structure to check it,
//! so that a damaged disk can still be inspected.

pub mod chs;
pub mod error;
pub mod gpt_header;
pub mod guid;
pub mod hex_dump;
pub mod mbr;
pub mod partition_entry;

use std::fmt;
use std::io;

pub const LOGICAL_BLOCK_SIZE: usize = 512;

pub use chs::Chs;
pub use error::{Error, Stage, Structure};
pub use gpt_header::GptHeader;
pub use guid::Guid;
pub use mbr::{Mbr, MbrPartitionRecord};
pub use partition_entry::PartitionEntry;

#[derive(Debug, Clone)]
pub struct Gpt {
    pub mbr: Mbr,
    pub header: GptHeader,
    pub entries: Vec<PartitionEntry>,
    pub backup_header: GptHeader,
    pub backup_entries: Vec<PartitionEntry>,
}

fn seek_to_lba<H>(handle: &mut H, lba: u64, structure: Structure) -> Result<(), Error>
where
    H: io::Seek,
{
    let offset = lba
        .checked_mul(LOGICAL_BLOCK_SIZE as u64)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("LBA {} is beyond the addressable range", lba),
            )
        })
        .map_err(Error::read(structure))?;
    log::debug!("reading {} at byte offset {:#X}", structure, offset);
    handle
        .seek(io::SeekFrom::Start(offset))
        .map_err(Error::read(structure))?;
    Ok(())
}

fn read_header<H>(handle: &mut H, lba: u64) -> Result<GptHeader, Error>
where
    H: io::Seek + io::Read,
{
    seek_to_lba(handle, lba, Structure::GptHeader)?;
    GptHeader::read(handle)
}

/// Reads the entries a header describes, in disk order. Entries are always
/// 128 bytes apart.
pub fn read_partition_entries<H>(
    handle: &mut H,
    header: &GptHeader,
) -> Result<Vec<PartitionEntry>, Error>
where
    H: io::Seek + io::Read,
{
    seek_to_lba(handle, header.partition_entry_lba, Structure::PartitionEntry)?;
    log::debug!(
        "reading {} partition entries",
        header.number_of_partition_entries
    );
    let mut entries = Vec::new();
    for index in 0..header.number_of_partition_entries {
        let entry = PartitionEntry::read(handle)?;
        if !entry.is_blank() {
            log::trace!("partition entry {}: {}", index, entry);
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Reads the MBR, primary header and entries, then the backup header and
/// entries located by the primary header. Field values of a corrupt header
/// are still used to locate the structures that follow it.
pub fn read_gpt<H>(handle: &mut H) -> Result<Gpt, Error>
where
    H: io::Seek + io::Read,
{
    seek_to_lba(handle, 0, Structure::Mbr).map_err(Error::at_stage(Stage::Mbr))?;
    let mbr = Mbr::read(handle).map_err(Error::at_stage(Stage::Mbr))?;
    let header = read_header(handle, 1).map_err(Error::at_stage(Stage::PrimaryHeader))?;
    let entries =
        read_partition_entries(handle, &header).map_err(Error::at_stage(Stage::PrimaryEntries))?;
    let backup_header = read_header(handle, header.alternate_lba)
        .map_err(Error::at_stage(Stage::BackupHeader))?;
    let backup_entries = read_partition_entries(handle, &backup_header)
        .map_err(Error::at_stage(Stage::BackupEntries))?;
    Ok(Gpt {
        mbr,
        header,
        entries,
        backup_header,
        backup_entries,
    })
}

impl Gpt {
    /// Non-blank entries of the primary array with their indices.
    pub fn used_entries(&self) -> impl Iterator<Item = (usize, &PartitionEntry)> {
        self.entries.iter().enumerate().filter(|(_, e)| !e.is_blank())
    }
}

fn display_entries(entries: &[PartitionEntry], f: &mut fmt::Formatter) -> fmt::Result {
    for (i, entry) in entries.iter().enumerate() {
        if !entry.is_blank() {
            writeln!(f, "{} => {}", i, entry)?;
        }
    }
    Ok(())
}

impl fmt::Display for Gpt {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "MBR:\n{}", self.mbr)?;
        writeln!(f, "Primary Header:\n{}", self.header)?;
        writeln!(f, "Primary Entries:")?;
        display_entries(&self.entries, f)?;
        writeln!(f, "\nBackup Header:\n{}", self.backup_header)?;
        writeln!(f, "Backup Entries:")?;
        display_entries(&self.backup_entries, f)?;
        Ok(())
    }
}
