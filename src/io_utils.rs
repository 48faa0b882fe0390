use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Open a text input, decoding gzip transparently.
///
/// A path ending in `.gz` is always decoded. Otherwise the plain file is
/// opened if it exists, falling back to `<path>.gz` so compressed inputs can
/// sit next to the prefix without renaming.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let is_gz = path.extension().and_then(|e| e.to_str()) == Some("gz");

    if is_gz || path.exists() {
        let file =
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        return Ok(if is_gz {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        });
    }

    let mut gz: PathBuf = path.to_path_buf();
    gz.as_mut_os_string().push(".gz");
    if gz.exists() {
        let file = File::open(&gz).with_context(|| format!("cannot open {}", gz.display()))?;
        return Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))));
    }

    bail!("cannot open {} (also tried {})", path.display(), gz.display());
}
