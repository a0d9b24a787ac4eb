//! Locating the vDSO mapping through the auxiliary vector.

use anyhow::Result;

/// The ELF file header sits at the start of the mapping and is well inside
/// the first page on every supported target.
pub const PAGE_SIZE: usize = 4096;

/// Upper bound on any window taken over the mapping. Real vDSO images are a
/// few pages; a header declaring spans anywhere near this is corrupt and is
/// refused before its offsets are dereferenced.
pub const MAX_WINDOW: usize = 1 << 24;

/// Base address of the vDSO, from the `AT_SYSINFO_EHDR` auxiliary vector
/// entry. The kernel keeps this mapping at a fixed address for the life of
/// the process.
#[cfg(all(target_os = "linux", target_endian = "little"))]
pub fn locate() -> Result<*const u8> {
    // SAFETY: getauxval has no preconditions; an absent entry yields 0.
    let base = unsafe { libc::getauxval(libc::AT_SYSINFO_EHDR) };
    if base == 0 {
        anyhow::bail!("no vDSO: the auxiliary vector has no AT_SYSINFO_EHDR entry");
    }
    Ok(base as *const u8)
}

#[cfg(not(all(target_os = "linux", target_endian = "little")))]
pub fn locate() -> Result<*const u8> {
    anyhow::bail!("unsupported platform: the vDSO can only be dumped on little-endian Linux")
}

/// Borrows `len` bytes of the mapping at `base`.
///
/// # Safety
///
/// `base..base + len` must stay mapped and unmodified for the lifetime of
/// the returned slice.
pub unsafe fn view(base: *const u8, len: usize) -> &'static [u8] {
    unsafe { std::slice::from_raw_parts(base, len) }
}
