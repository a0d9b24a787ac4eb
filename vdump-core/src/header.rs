pub mod elf;

use crate::error::Result;
use crate::tables::{SectionEntry, SegmentEntry, TableSpan};

/// Class-independent view of an ELF file header.
///
/// Implemented once per bit-width so the extent walk is written a single
/// time and works over 32- and 64-bit objects alike.
pub trait FileHeader: std::fmt::Debug + Sized {
    /// Parses the file header at the start of `data`.
    fn parse(data: &[u8]) -> Result<Self>;

    /// Returns the program header table span this header declares.
    fn program_headers(&self) -> TableSpan;

    /// Returns the section header table span this header declares.
    fn section_headers(&self) -> TableSpan;

    /// Decodes one program header table row.
    fn segment(row: &[u8]) -> Result<SegmentEntry>;

    /// Decodes one section header table row.
    fn section(row: &[u8]) -> Result<SectionEntry>;
}
