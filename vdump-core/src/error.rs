use thiserror::Error;

/// Errors produced while inspecting or copying a mapped ELF object.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The bytes at the base address do not form a usable ELF header, or a
    /// declared offset/size pair cannot be honored without overflowing or
    /// leaving the mapped window.
    #[error("malformed ELF header: {0}")]
    MalformedHeader(&'static str),

    /// The class byte declares something other than a 32- or 64-bit object.
    #[error("unsupported ELF class {0:#x}")]
    UnsupportedClass(u8),

    /// A header table was indexed at or past its declared entry count.
    #[error("{table} header index {index} out of range (table declares {count} entries)")]
    IndexOutOfRange {
        table: &'static str,
        index: u64,
        count: u64,
    },

    /// The destination sink did not accept the full byte count.
    #[error("writing image to sink: {0}")]
    Sink(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImageError>;
