//! String-centric views of the decoded structures, for serialization.

use mini_gpt::{Chs, Gpt, GptHeader, Mbr, MbrPartitionRecord, PartitionEntry};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadableChs {
    pub head: u32,
    pub sector: u32,
    pub cylinder: u32,
}

impl From<&Chs> for ReadableChs {
    fn from(chs: &Chs) -> Self {
        Self {
            head: chs.head(),
            sector: chs.sector(),
            cylinder: chs.cylinder(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadableMbrEntry {
    pub boot_flag: u8,
    pub first_chs: ReadableChs,
    pub id: u8,
    pub id_label: &'static str,
    pub last_chs: ReadableChs,
    #[serde(rename = "FirstLBA")]
    pub first_lba: u32,
    #[serde(rename = "AllLBA")]
    pub all_lba: u32,
}

impl From<&MbrPartitionRecord> for ReadableMbrEntry {
    fn from(record: &MbrPartitionRecord) -> Self {
        Self {
            boot_flag: record.boot_indicator,
            first_chs: (&record.starting_chs).into(),
            id: record.os_type,
            id_label: record.os_type_label(),
            last_chs: (&record.ending_chs).into(),
            first_lba: record.starting_lba,
            all_lba: record.size_in_lba,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadableMbr {
    pub entries: Vec<ReadableMbrEntry>,
    pub signature: u16,
    pub valid: bool,
}

impl From<&Mbr> for ReadableMbr {
    fn from(mbr: &Mbr) -> Self {
        Self {
            entries: mbr.partition_record.iter().map(Into::into).collect(),
            signature: mbr.signature,
            valid: mbr.is_valid(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadableHeader {
    pub signature: u64,
    pub revision: u32,
    pub size: u32,
    pub crc32_of_header: u32,
    pub reserved: u32,
    #[serde(rename = "CurrentLBA")]
    pub current_lba: u64,
    #[serde(rename = "BackupLBA")]
    pub backup_lba: u64,
    #[serde(rename = "FirstUsableLBA")]
    pub first_usable_lba: u64,
    #[serde(rename = "LastUsableLBA")]
    pub last_usable_lba: u64,
    pub disk_guid: String,
    #[serde(rename = "StartingLBA")]
    pub starting_lba: u64,
    pub num_of_entries: u32,
    pub size_of_entry: u32,
    pub crc32_of_entries: u32,
    pub valid: bool,
}

impl From<&GptHeader> for ReadableHeader {
    fn from(header: &GptHeader) -> Self {
        Self {
            signature: header.signature,
            revision: header.revision,
            size: header.header_size,
            crc32_of_header: header.header_crc32,
            reserved: header.reserved,
            current_lba: header.my_lba,
            backup_lba: header.alternate_lba,
            first_usable_lba: header.first_usable_lba,
            last_usable_lba: header.last_usable_lba,
            disk_guid: header.disk_guid.to_string(),
            starting_lba: header.partition_entry_lba,
            num_of_entries: header.number_of_partition_entries,
            size_of_entry: header.size_of_partition_entry,
            crc32_of_entries: header.partition_entry_array_crc32,
            valid: header.is_valid(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadableEntry {
    pub type_guid: String,
    pub type_label: &'static str,
    pub unique_guid: String,
    #[serde(rename = "FirstLBA")]
    pub first_lba: u64,
    #[serde(rename = "LastLBA")]
    pub last_lba: u64,
    pub attr_flags: u64,
    pub name: String,
}

impl From<&PartitionEntry> for ReadableEntry {
    fn from(entry: &PartitionEntry) -> Self {
        Self {
            type_guid: entry.partition_type_guid.to_string(),
            type_label: entry.type_label(),
            unique_guid: entry.unique_partition_guid.to_string(),
            first_lba: entry.starting_lba,
            last_lba: entry.ending_lba,
            attr_flags: entry.attributes,
            name: entry.read_name(),
        }
    }
}

/// Blank entries are omitted; the rest are keyed by their index in the array.
fn readable_entries(entries: &[PartitionEntry]) -> BTreeMap<usize, ReadableEntry> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| !entry.is_blank())
        .map(|(i, entry)| (i, entry.into()))
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadableGpt {
    pub mbr: ReadableMbr,
    pub header: ReadableHeader,
    pub entries: BTreeMap<usize, ReadableEntry>,
    pub backup_entries: BTreeMap<usize, ReadableEntry>,
    pub backup_header: ReadableHeader,
}

impl From<&Gpt> for ReadableGpt {
    fn from(gpt: &Gpt) -> Self {
        Self {
            mbr: (&gpt.mbr).into(),
            header: (&gpt.header).into(),
            entries: readable_entries(&gpt.entries),
            backup_entries: readable_entries(&gpt.backup_entries),
            backup_header: (&gpt.backup_header).into(),
        }
    }
}
