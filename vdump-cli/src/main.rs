use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use vdump_core::{compute_extent, write_image, Image};

mod vdso;

/// Copy the vDSO shared object mapped into this process to a file
#[derive(Parser)]
#[command(
    name = "vdump",
    about = "Copy the vDSO shared object mapped into this process to a file",
    version,
    author
)]
struct Cli {
    /// Path the vDSO image is written to
    #[arg(required = true)]
    output: std::path::PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let written = dump_vdso(&cli.output)?;
    log::info!("wrote {written} bytes to {}", cli.output.display());
    Ok(())
}

/// Locates the vDSO, infers its extent from its own headers, and copies
/// exactly that many bytes to `output`.
fn dump_vdso(output: &Path) -> Result<u64> {
    let base = vdso::locate()?;
    log::info!("vDSO mapped at {base:p}");

    // The first page is enough for the file header; the view is then
    // widened to cover both header tables before the walk touches them.
    let probe = unsafe { vdso::view(base, vdso::PAGE_SIZE) };
    let span = Image::parse(probe)?.tables_end()?;
    if span > vdso::MAX_WINDOW as u64 {
        bail!("vDSO header declares an implausible table span of {span} bytes");
    }
    let window = unsafe { vdso::view(base, (span as usize).max(vdso::PAGE_SIZE)) };
    let image = Image::parse(window)?;

    let extent = compute_extent(&image)?;
    log::info!("vDSO class {:?}, extent {} bytes", image.class(), extent.length);
    if extent.length > vdso::MAX_WINDOW as u64 {
        bail!(
            "vDSO header declares an implausible extent of {} bytes",
            extent.length
        );
    }

    let bytes = unsafe { vdso::view(base, extent.length as usize) };
    write_image(bytes, output)
        .with_context(|| format!("writing vDSO image to {}", output.display()))?;
    Ok(extent.length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(all(target_os = "linux", target_endian = "little"))]
    #[test]
    fn dumps_the_live_vdso() {
        let Ok(_) = vdso::locate() else {
            eprintln!("no vDSO in this process, nothing to dump");
            return;
        };

        let path = std::env::temp_dir().join(format!("vdump-live-{}.so", std::process::id()));
        let written = dump_vdso(&path).unwrap();
        assert!(written > 0);

        let dumped = std::fs::read(&path).unwrap();
        assert_eq!(dumped.len() as u64, written);
        assert_eq!(&dumped[..4], b"\x7fELF");

        std::fs::remove_file(&path).unwrap();
    }
}
