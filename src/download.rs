//! Cached download of backing archives. An adapter's first construction may
//! fetch its archive over HTTP into a local cache directory; later
//! constructions reuse the cached file untouched.

use std::{fs, path::Path};

use crate::{DatasetError, Result};

/// Downloads `url` to `dest`, skipping the request entirely if `dest` already
/// exists. The parent directory must already exist; callers set up the cache
/// layout themselves.
pub fn fetch(url: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        log::debug!("{} already cached; skipping download", dest.display());
        return Ok(());
    }

    log::info!("Downloading {url}...");

    let resp = reqwest::blocking::get(url)?;
    if !resp.status().is_success() {
        return Err(DatasetError::Archive(format!(
            "Failed to download {url}: {}",
            resp.status()
        )));
    }

    let bytes = resp.bytes()?;
    fs::write(dest, &bytes)?;

    log::info!("Saved {}", dest.display());

    Ok(())
}
