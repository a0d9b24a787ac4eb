use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Streams `bytes` to `sink` in full, in one sequential pass. No
/// transformation, framing, or checksum is added.
pub fn copy_image<W: Write>(bytes: &[u8], sink: &mut W) -> Result<u64> {
    sink.write_all(bytes)?;
    Ok(bytes.len() as u64)
}

/// Writes `bytes` to `path` through a sibling temporary file, renamed into
/// place once the full image is on disk. A failed run removes the
/// temporary and leaves nothing at `path`.
pub fn write_image(bytes: &[u8], path: &Path) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    if let Err(err) = write_then_rename(bytes, &tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}

fn write_then_rename(bytes: &[u8], tmp: &Path, path: &Path) -> Result<()> {
    let mut file = fs::File::create(tmp)?;
    copy_image(bytes, &mut file)?;
    drop(file);
    fs::rename(tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageError;

    #[test]
    fn copy_is_byte_identical() {
        let source: Vec<u8> = (0..=255).collect();
        let mut sink = Vec::new();
        let written = copy_image(&source, &mut sink).unwrap();
        assert_eq!(written, source.len() as u64);
        assert_eq!(sink, source);
    }

    #[test]
    fn write_image_round_trips_through_the_filesystem() {
        let source = b"\x7fELF and then some image bytes".to_vec();
        let path = std::env::temp_dir().join(format!("vdump-dump-{}.bin", std::process::id()));

        write_image(&source, &path).unwrap();
        let read_back = fs::read(&path).unwrap();
        assert_eq!(read_back, source);

        // The temporary must be gone once the rename happened.
        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        assert!(!PathBuf::from(tmp_name).exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failed_write_leaves_no_output_file() {
        let dir = std::env::temp_dir().join(format!("vdump-missing-{}", std::process::id()));
        let path = dir.join("out.bin");

        let err = write_image(b"bytes", &path).unwrap_err();
        assert!(matches!(err, ImageError::Sink(_)));
        assert!(!path.exists());
    }
}
