use std::fmt;

/// Hex dump of an opaque byte region. A run of rows repeating the previous
/// row is collapsed into a single `*` line.
pub struct HexDump<'a> {
    bytes: &'a [u8],
    bytes_per_row: usize,
}

impl<'a> HexDump<'a> {
    pub fn new(bytes: &'a [u8], bytes_per_row: usize) -> Self {
        Self {
            bytes,
            bytes_per_row: bytes_per_row.max(1),
        }
    }

    // number of hex digits needed for the largest row offset
    fn offset_width(&self) -> usize {
        let max_offset = self.bytes.len().saturating_sub(1) as u64;
        let num_bits = 64 - max_offset.leading_zeros() as usize;
        ((num_bits + 3) / 4).max(1)
    }
}

impl<'a> fmt::Display for HexDump<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self.offset_width();
        let mut previous: Option<&[u8]> = None;
        let mut collapsed = false;
        for (row_index, row) in self.bytes.chunks(self.bytes_per_row).enumerate() {
            if previous == Some(row) {
                if !collapsed {
                    writeln!(f, "*")?;
                    collapsed = true;
                }
                continue;
            }
            collapsed = false;
            previous = Some(row);
            write!(f, "0x{:0>width$X}:", row_index * self.bytes_per_row, width = width)?;
            for byte in row {
                write!(f, " {:02X}", byte)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
