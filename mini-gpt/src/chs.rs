use crate::Error;
use std::fmt;

pub const MAX_HEAD: u32 = 0xFF;
pub const MAX_SECTOR: u32 = 0x3F;
pub const MAX_CYLINDER: u32 = 0x3FF;

/// Packed Cylinder-Head-Sector address as found in MBR partition records.
///
/// Byte 0 holds the head. Byte 1 holds the sector in its low 6 bits and bits
/// 8-9 of the cylinder in its high 2 bits. Byte 2 holds the low 8 bits of the
/// cylinder.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Chs([u8; 3]);

impl Chs {
    pub fn new(head: u32, sector: u32, cylinder: u32) -> Result<Self, Error> {
        for &(component, value, max) in &[
            ("head", head, MAX_HEAD),
            ("sector", sector, MAX_SECTOR),
            ("cylinder", cylinder, MAX_CYLINDER),
        ] {
            if value > max {
                return Err(Error::Range {
                    component,
                    value,
                    max,
                });
            }
        }
        Ok(Self([
            head as u8,
            sector as u8 | ((cylinder & 0x300) >> 2) as u8,
            (cylinder & 0xFF) as u8,
        ]))
    }

    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    pub fn head(&self) -> u32 {
        self.0[0] as u32
    }

    pub fn sector(&self) -> u32 {
        (self.0[1] & 0x3F) as u32
    }

    pub fn cylinder(&self) -> u32 {
        self.0[2] as u32 | ((self.0[1] as u32 & 0xC0) << 2)
    }
}

impl fmt::Display for Chs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{cylinder:{:#x} head:{:#x} sector:{:#x}}}",
            self.cylinder(),
            self.head(),
            self.sector()
        )
    }
}

impl fmt::Debug for Chs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Chs")
            .field("cylinder", &self.cylinder())
            .field("head", &self.head())
            .field("sector", &self.sector())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_and_unpack() {
        let chs = Chs::new(0x3f, 0x33, 0x200).unwrap();
        assert_eq!(chs.head(), 0x3f);
        assert_eq!(chs.sector(), 0x33);
        assert_eq!(chs.cylinder(), 0x200);
        assert_eq!(chs.as_bytes(), &[0x3f, 0xb3, 0x00]);
    }

    #[test]
    fn maximum_values() {
        let chs = Chs::new(MAX_HEAD, MAX_SECTOR, MAX_CYLINDER).unwrap();
        assert_eq!(chs.as_bytes(), &[0xff, 0xff, 0xff]);
        assert_eq!(chs.cylinder(), 0x3ff);
    }

    #[test]
    fn out_of_range_components() {
        assert!(matches!(
            Chs::new(0x100, 0, 0),
            Err(Error::Range {
                component: "head",
                ..
            })
        ));
        assert!(matches!(
            Chs::new(0, 0x40, 0),
            Err(Error::Range {
                component: "sector",
                ..
            })
        ));
        assert!(matches!(
            Chs::new(0, 0, 0x400),
            Err(Error::Range {
                component: "cylinder",
                value: 0x400,
                max: 0x3ff,
            })
        ));
    }

    #[test]
    fn arbitrary_bytes_unpack() {
        let chs = Chs::from_bytes([0xfe, 0xff, 0xff]);
        assert_eq!(chs.head(), 0xfe);
        assert_eq!(chs.sector(), 0x3f);
        assert_eq!(chs.cylinder(), 0x3ff);
        assert_eq!(
            chs.to_string(),
            "{cylinder:0x3ff head:0xfe sector:0x3f}"
        );
    }
}
