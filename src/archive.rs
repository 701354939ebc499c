use std::fs::{self, File};
use std::io::{self, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

pub const ARCHIVE_FILENAME: &str = "all-feedback.zip";

/// Pack every regular file directly inside `dir` into a zip written to `out`.
/// Subdirectories and files whose names are not UTF-8 are skipped. Returns
/// the number of entries written.
pub fn write_archive<W: Write + Seek>(dir: &Path, out: W) -> Result<usize> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            entries.push(entry.path());
        }
    }
    entries.sort();

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(out);
    let mut written = 0;

    for path in &entries {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        zip.start_file(name, options)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut zip)?;
        written += 1;
    }

    zip.finish()?;
    Ok(written)
}
