use std::{error, fmt, io};

/// The on-disk structure being decoded when a read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    Mbr,
    GptHeader,
    PartitionEntry,
}

/// The step of `read_gpt` that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Mbr,
    PrimaryHeader,
    PrimaryEntries,
    BackupHeader,
    BackupEntries,
}

#[derive(Debug)]
pub enum Error {
    Read {
        structure: Structure,
        source: io::Error,
    },
    Format(String),
    Length {
        capacity: usize,
        actual: usize,
    },
    Range {
        component: &'static str,
        value: u32,
        max: u32,
    },
    Assemble {
        stage: Stage,
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn read(structure: Structure) -> impl FnOnce(io::Error) -> Self {
        move |source| Error::Read { structure, source }
    }

    pub(crate) fn at_stage(stage: Stage) -> impl FnOnce(Self) -> Self {
        move |source| Error::Assemble {
            stage,
            source: Box::new(source),
        }
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Structure::Mbr => write!(f, "MBR"),
            Structure::GptHeader => write!(f, "GPT header"),
            Structure::PartitionEntry => write!(f, "partition entry"),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stage::Mbr => write!(f, "MBR"),
            Stage::PrimaryHeader => write!(f, "primary header"),
            Stage::PrimaryEntries => write!(f, "primary partition entries"),
            Stage::BackupHeader => write!(f, "backup header"),
            Stage::BackupEntries => write!(f, "backup partition entries"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { structure, source } => {
                write!(f, "failed to read {}: {}", structure, source)
            }
            Error::Format(s) => write!(f, "malformed GUID string {:?}", s),
            Error::Length { capacity, actual } => write!(
                f,
                "invalid length {} for a field of {} elements",
                actual, capacity
            ),
            Error::Range {
                component,
                value,
                max,
            } => write!(f, "CHS {} = {:#x} > {:#x}", component, value, max),
            Error::Assemble { stage, .. } => write!(f, "failed to read GPT at {}", stage),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Read { source, .. } => Some(source),
            Error::Assemble { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
