use crate::error::Result;
use crate::image::Image;

/// Inferred total byte length of a mapped object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub length: u64,
}

/// Computes the in-memory extent of the object behind `image`.
///
/// The kernel provides no interface for the size of this mapping, so it has
/// to be inferred: the object ends one byte past the last region its own
/// metadata references. Four sources can hold that tail, and ELF makes no
/// ordering promise between them, so the walk folds all four into a single
/// running maximum: every segment's file end, every section's file end, and
/// the end of each of the two header tables.
pub fn compute_extent(image: &Image) -> Result<Extent> {
    let mut max_offset = 0u64;

    let phdrs = image.program_headers();
    for index in 0..phdrs.count {
        max_offset = max_offset.max(image.segment(index)?.end()?);
    }

    let shdrs = image.section_headers();
    for index in 0..shdrs.count {
        max_offset = max_offset.max(image.section(index)?.end()?);
    }

    // Either table can extend past everything it describes.
    max_offset = max_offset.max(phdrs.end()?);
    max_offset = max_offset.max(shdrs.end()?);

    log::debug!(
        "extent {:#x} over {} segments and {} sections",
        max_offset,
        phdrs.count,
        shdrs.count
    );
    Ok(Extent { length: max_offset })
}
