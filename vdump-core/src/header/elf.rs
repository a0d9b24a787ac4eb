use std::io::{self, Cursor};

use byteorder::{ReadBytesExt, LE};

use crate::error::{ImageError, Result};
use crate::header::FileHeader;
use crate::tables::{SectionEntry, SegmentEntry, TableSpan};

/// The ELF file header of a 64-bit object, `Elf64_Ehdr` in the ELF
/// specification.
///
/// It sits at the very start of the mapping and is the only place the
/// locations of the two header tables are recorded.
///
/// Reference: [ELF Specification v1.2](https://refspecs.linuxfoundation.org/elf/elf.pdf)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Ehdr {
    /// Identification bytes: magic number, class, endianness, version.
    ///
    /// The first 4 bytes must be `0x7F`, `'E'`, `'L'`, `'F'`.
    pub e_ident: [u8; 16],

    /// Object file type (relocatable, executable, shared, core).
    ///
    /// The vDSO presents itself as `ET_DYN` (3), a shared object.
    pub e_type: u16,

    /// Target architecture, e.g. `EM_X86_64` (62) or `EM_AARCH64` (183).
    pub e_machine: u16,

    /// ELF version, `EV_CURRENT` (1) in practice.
    pub e_version: u32,

    /// Virtual address of the program entry point; unused for the vDSO.
    pub e_entry: u64,

    /// File offset of the program header table.
    pub e_phoff: u64,

    /// File offset of the section header table.
    pub e_shoff: u64,

    /// Processor-specific flags.
    pub e_flags: u32,

    /// Size of this header in bytes.
    pub e_ehsize: u16,

    /// Size of one program header table entry.
    pub e_phentsize: u16,

    /// Number of entries in the program header table.
    pub e_phnum: u16,

    /// Size of one section header table entry.
    pub e_shentsize: u16,

    /// Number of entries in the section header table.
    pub e_shnum: u16,

    /// Index of the section header string table.
    pub e_shstrndx: u16,
}

impl Elf64Ehdr {
    fn from_reader<R: io::Read>(cur: &mut R) -> io::Result<Elf64Ehdr> {
        let mut e_ident = [0u8; 16];
        cur.read_exact(&mut e_ident)?;

        Ok(Elf64Ehdr {
            e_ident,
            e_type: cur.read_u16::<LE>()?,
            e_machine: cur.read_u16::<LE>()?,
            e_version: cur.read_u32::<LE>()?,
            e_entry: cur.read_u64::<LE>()?,
            e_phoff: cur.read_u64::<LE>()?,
            e_shoff: cur.read_u64::<LE>()?,
            e_flags: cur.read_u32::<LE>()?,
            e_ehsize: cur.read_u16::<LE>()?,
            e_phentsize: cur.read_u16::<LE>()?,
            e_phnum: cur.read_u16::<LE>()?,
            e_shentsize: cur.read_u16::<LE>()?,
            e_shnum: cur.read_u16::<LE>()?,
            e_shstrndx: cur.read_u16::<LE>()?,
        })
    }
}

impl FileHeader for Elf64Ehdr {
    fn parse(data: &[u8]) -> Result<Elf64Ehdr> {
        Elf64Ehdr::from_reader(&mut Cursor::new(data))
            .map_err(|_| ImageError::MalformedHeader("truncated 64-bit file header"))
    }

    fn program_headers(&self) -> TableSpan {
        TableSpan {
            offset: self.e_phoff,
            count: self.e_phnum.into(),
            entry_size: self.e_phentsize.into(),
        }
    }

    fn section_headers(&self) -> TableSpan {
        TableSpan {
            offset: self.e_shoff,
            count: self.e_shnum.into(),
            entry_size: self.e_shentsize.into(),
        }
    }

    fn segment(row: &[u8]) -> Result<SegmentEntry> {
        let phdr = Elf64Phdr::from_reader(&mut Cursor::new(row))
            .map_err(|_| ImageError::MalformedHeader("truncated 64-bit program header entry"))?;
        Ok(SegmentEntry {
            offset: phdr.p_offset,
            file_size: phdr.p_filesz,
        })
    }

    fn section(row: &[u8]) -> Result<SectionEntry> {
        let shdr = Elf64Shdr::from_reader(&mut Cursor::new(row))
            .map_err(|_| ImageError::MalformedHeader("truncated 64-bit section header entry"))?;
        Ok(SectionEntry {
            offset: shdr.sh_offset,
            size: shdr.sh_size,
        })
    }
}

/// One program header table entry of a 64-bit object, `Elf64_Phdr`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Phdr {
    /// Segment type, e.g. `PT_LOAD` (1) or `PT_DYNAMIC` (2).
    pub p_type: u32,
    /// Segment permission flags.
    pub p_flags: u32,
    /// File offset of the segment's first byte.
    pub p_offset: u64,
    /// Virtual address the segment is mapped at.
    pub p_vaddr: u64,
    /// Physical address, unused on the platforms this tool runs on.
    pub p_paddr: u64,
    /// Number of segment bytes present in the file.
    pub p_filesz: u64,
    /// Number of segment bytes once mapped (may exceed `p_filesz`).
    pub p_memsz: u64,
    /// Alignment of the segment in file and memory.
    pub p_align: u64,
}

impl Elf64Phdr {
    fn from_reader<R: io::Read>(cur: &mut R) -> io::Result<Elf64Phdr> {
        Ok(Elf64Phdr {
            p_type: cur.read_u32::<LE>()?,
            p_flags: cur.read_u32::<LE>()?,
            p_offset: cur.read_u64::<LE>()?,
            p_vaddr: cur.read_u64::<LE>()?,
            p_paddr: cur.read_u64::<LE>()?,
            p_filesz: cur.read_u64::<LE>()?,
            p_memsz: cur.read_u64::<LE>()?,
            p_align: cur.read_u64::<LE>()?,
        })
    }
}

/// One section header table entry of a 64-bit object, `Elf64_Shdr`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf64Shdr {
    /// Offset of the section's name in the section name string table.
    pub sh_name: u32,
    /// Section type, e.g. `SHT_PROGBITS` (1).
    pub sh_type: u32,
    /// Section attribute flags.
    pub sh_flags: u64,
    /// Virtual address of the section when mapped.
    pub sh_addr: u64,
    /// File offset of the section's first byte.
    pub sh_offset: u64,
    /// Section size in bytes.
    pub sh_size: u64,
    /// Section index link, meaning depends on the type.
    pub sh_link: u32,
    /// Extra type-dependent information.
    pub sh_info: u32,
    /// Required alignment.
    pub sh_addralign: u64,
    /// Entry size for sections holding fixed-size records.
    pub sh_entsize: u64,
}

impl Elf64Shdr {
    fn from_reader<R: io::Read>(cur: &mut R) -> io::Result<Elf64Shdr> {
        Ok(Elf64Shdr {
            sh_name: cur.read_u32::<LE>()?,
            sh_type: cur.read_u32::<LE>()?,
            sh_flags: cur.read_u64::<LE>()?,
            sh_addr: cur.read_u64::<LE>()?,
            sh_offset: cur.read_u64::<LE>()?,
            sh_size: cur.read_u64::<LE>()?,
            sh_link: cur.read_u32::<LE>()?,
            sh_info: cur.read_u32::<LE>()?,
            sh_addralign: cur.read_u64::<LE>()?,
            sh_entsize: cur.read_u64::<LE>()?,
        })
    }
}

/// 32-bit counterpart of [`Elf64Ehdr`].
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Ehdr {
    pub e_ident: [u8; 16],
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u32,
    pub e_phoff: u32,
    pub e_shoff: u32,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl Elf32Ehdr {
    fn from_reader<R: io::Read>(cur: &mut R) -> io::Result<Elf32Ehdr> {
        let mut e_ident = [0u8; 16];
        cur.read_exact(&mut e_ident)?;

        Ok(Elf32Ehdr {
            e_ident,
            e_type: cur.read_u16::<LE>()?,
            e_machine: cur.read_u16::<LE>()?,
            e_version: cur.read_u32::<LE>()?,
            e_entry: cur.read_u32::<LE>()?,
            e_phoff: cur.read_u32::<LE>()?,
            e_shoff: cur.read_u32::<LE>()?,
            e_flags: cur.read_u32::<LE>()?,
            e_ehsize: cur.read_u16::<LE>()?,
            e_phentsize: cur.read_u16::<LE>()?,
            e_phnum: cur.read_u16::<LE>()?,
            e_shentsize: cur.read_u16::<LE>()?,
            e_shnum: cur.read_u16::<LE>()?,
            e_shstrndx: cur.read_u16::<LE>()?,
        })
    }
}

impl FileHeader for Elf32Ehdr {
    fn parse(data: &[u8]) -> Result<Elf32Ehdr> {
        Elf32Ehdr::from_reader(&mut Cursor::new(data))
            .map_err(|_| ImageError::MalformedHeader("truncated 32-bit file header"))
    }

    fn program_headers(&self) -> TableSpan {
        TableSpan {
            offset: self.e_phoff.into(),
            count: self.e_phnum.into(),
            entry_size: self.e_phentsize.into(),
        }
    }

    fn section_headers(&self) -> TableSpan {
        TableSpan {
            offset: self.e_shoff.into(),
            count: self.e_shnum.into(),
            entry_size: self.e_shentsize.into(),
        }
    }

    fn segment(row: &[u8]) -> Result<SegmentEntry> {
        let phdr = Elf32Phdr::from_reader(&mut Cursor::new(row))
            .map_err(|_| ImageError::MalformedHeader("truncated 32-bit program header entry"))?;
        Ok(SegmentEntry {
            offset: phdr.p_offset.into(),
            file_size: phdr.p_filesz.into(),
        })
    }

    fn section(row: &[u8]) -> Result<SectionEntry> {
        let shdr = Elf32Shdr::from_reader(&mut Cursor::new(row))
            .map_err(|_| ImageError::MalformedHeader("truncated 32-bit section header entry"))?;
        Ok(SectionEntry {
            offset: shdr.sh_offset.into(),
            size: shdr.sh_size.into(),
        })
    }
}

/// 32-bit counterpart of [`Elf64Phdr`]. Note the different position of
/// `p_flags` relative to the 64-bit layout.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Phdr {
    pub p_type: u32,
    pub p_offset: u32,
    pub p_vaddr: u32,
    pub p_paddr: u32,
    pub p_filesz: u32,
    pub p_memsz: u32,
    pub p_flags: u32,
    pub p_align: u32,
}

impl Elf32Phdr {
    fn from_reader<R: io::Read>(cur: &mut R) -> io::Result<Elf32Phdr> {
        Ok(Elf32Phdr {
            p_type: cur.read_u32::<LE>()?,
            p_offset: cur.read_u32::<LE>()?,
            p_vaddr: cur.read_u32::<LE>()?,
            p_paddr: cur.read_u32::<LE>()?,
            p_filesz: cur.read_u32::<LE>()?,
            p_memsz: cur.read_u32::<LE>()?,
            p_flags: cur.read_u32::<LE>()?,
            p_align: cur.read_u32::<LE>()?,
        })
    }
}

/// 32-bit counterpart of [`Elf64Shdr`].
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Elf32Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u32,
    pub sh_addr: u32,
    pub sh_offset: u32,
    pub sh_size: u32,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u32,
    pub sh_entsize: u32,
}

impl Elf32Shdr {
    fn from_reader<R: io::Read>(cur: &mut R) -> io::Result<Elf32Shdr> {
        Ok(Elf32Shdr {
            sh_name: cur.read_u32::<LE>()?,
            sh_type: cur.read_u32::<LE>()?,
            sh_flags: cur.read_u32::<LE>()?,
            sh_addr: cur.read_u32::<LE>()?,
            sh_offset: cur.read_u32::<LE>()?,
            sh_size: cur.read_u32::<LE>()?,
            sh_link: cur.read_u32::<LE>()?,
            sh_info: cur.read_u32::<LE>()?,
            sh_addralign: cur.read_u32::<LE>()?,
            sh_entsize: cur.read_u32::<LE>()?,
        })
    }
}
