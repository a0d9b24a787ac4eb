use goblin::elf::header::{EI_CLASS, ELFCLASS32, ELFCLASS64, ELFMAG, SELFMAG};

use crate::error::{ImageError, Result};
use crate::header::elf::{Elf32Ehdr, Elf64Ehdr};
use crate::header::FileHeader;
use crate::tables::{SectionEntry, SegmentEntry, TableSpan};

/// Declared bit-width class of a mapped object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Elf32,
    Elf64,
}

#[derive(Debug)]
enum AnyHeader {
    Elf32(Elf32Ehdr),
    Elf64(Elf64Ehdr),
}

/// Borrowed, bounds-checked view over an ELF object mapped at some base
/// address.
///
/// Every header and table read goes through this view, so a corrupt or
/// adversarial header (absurd counts or offsets) surfaces as an error
/// instead of a stray read of process memory. The view does not allocate
/// and holds no state beyond the parsed file header.
pub struct Image<'a> {
    data: &'a [u8],
    class: Class,
    header: AnyHeader,
}

impl<'a> Image<'a> {
    /// Validates the magic bytes and class byte at the start of `data` and
    /// parses the file header.
    pub fn parse(data: &'a [u8]) -> Result<Image<'a>> {
        let magic = data
            .get(..SELFMAG)
            .ok_or(ImageError::MalformedHeader("window shorter than the ELF magic"))?;
        if magic != &ELFMAG[..] {
            return Err(ImageError::MalformedHeader("bad ELF magic"));
        }

        let class = match data.get(EI_CLASS).copied() {
            Some(ELFCLASS32) => Class::Elf32,
            Some(ELFCLASS64) => Class::Elf64,
            Some(other) => return Err(ImageError::UnsupportedClass(other)),
            None => return Err(ImageError::MalformedHeader("window shorter than e_ident")),
        };
        log::debug!("ELF object, class {:?}", class);

        let header = match class {
            Class::Elf32 => AnyHeader::Elf32(Elf32Ehdr::parse(data)?),
            Class::Elf64 => AnyHeader::Elf64(Elf64Ehdr::parse(data)?),
        };

        Ok(Image {
            data,
            class,
            header,
        })
    }

    /// The resolved bit-width class.
    pub fn class(&self) -> Class {
        self.class
    }

    /// The underlying window this view was constructed over.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Program header table span, as declared by the file header.
    pub fn program_headers(&self) -> TableSpan {
        match &self.header {
            AnyHeader::Elf32(hdr) => hdr.program_headers(),
            AnyHeader::Elf64(hdr) => hdr.program_headers(),
        }
    }

    /// Section header table span, as declared by the file header.
    pub fn section_headers(&self) -> TableSpan {
        match &self.header {
            AnyHeader::Elf32(hdr) => hdr.section_headers(),
            AnyHeader::Elf64(hdr) => hdr.section_headers(),
        }
    }

    /// End offset of the further of the two header tables.
    ///
    /// A window this large, computed from the file header alone, is enough
    /// for every access the extent walk performs.
    pub fn tables_end(&self) -> Result<u64> {
        Ok(self
            .program_headers()
            .end()?
            .max(self.section_headers().end()?))
    }

    /// Decodes program header `index`.
    pub fn segment(&self, index: u64) -> Result<SegmentEntry> {
        let span = self.program_headers();
        if index >= span.count {
            return Err(ImageError::IndexOutOfRange {
                table: "program",
                index,
                count: span.count,
            });
        }
        let row = span.row(self.data, index)?;
        match self.class {
            Class::Elf32 => Elf32Ehdr::segment(row),
            Class::Elf64 => Elf64Ehdr::segment(row),
        }
    }

    /// Decodes section header `index`.
    pub fn section(&self, index: u64) -> Result<SectionEntry> {
        let span = self.section_headers();
        if index >= span.count {
            return Err(ImageError::IndexOutOfRange {
                table: "section",
                index,
                count: span.count,
            });
        }
        let row = span.row(self.data, index)?;
        match self.class {
            Class::Elf32 => Elf32Ehdr::section(row),
            Class::Elf64 => Elf64Ehdr::section(row),
        }
    }
}
