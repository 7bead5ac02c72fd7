//! Fetches the SPICE kernels named in the catalog into a local kernel directory.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use deflector_ephem_spice::kernels::{self, KERNEL_CATALOG, KernelDescriptor};
use log::{info, warn};
use reqwest::blocking::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),
    #[error("kernel `{name}` is not in the kernel catalog")]
    UnknownKernel { name: String },
    #[error("download of `{name}` returned no data")]
    EmptyDownload { name: &'static str },
}

/// What happened to one kernel during an import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelStatus {
    Downloaded { path: PathBuf, bytes: u64 },
    AlreadyPresent(PathBuf),
}

impl KernelStatus {
    pub fn path(&self) -> &Path {
        match self {
            Self::Downloaded { path, .. } | Self::AlreadyPresent(path) => path,
        }
    }
}

/// Catalog entries for the given file names, or the whole catalog when `names` is empty.
pub fn select_kernels(names: &[String]) -> Result<Vec<&'static KernelDescriptor>, ImportError> {
    if names.is_empty() {
        return Ok(KERNEL_CATALOG.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            kernels::find(name).ok_or_else(|| ImportError::UnknownKernel { name: name.clone() })
        })
        .collect()
}

/// Download every kernel in `descriptors` into `dir`, skipping files already present.
pub fn download_kernels(
    dir: &Path,
    descriptors: &[&'static KernelDescriptor],
) -> Result<Vec<KernelStatus>, ImportError> {
    fs::create_dir_all(dir)?;
    let client = Client::builder().build()?;

    descriptors
        .iter()
        .map(|descriptor| {
            let dest = descriptor.path_in(dir);
            if dest.exists() {
                return Ok(KernelStatus::AlreadyPresent(dest));
            }
            info!("downloading {} from {}", descriptor.filename, descriptor.url);
            let bytes = fetch_to(&client, descriptor, &dest)?;
            Ok(KernelStatus::Downloaded { path: dest, bytes })
        })
        .collect()
}

/// Stream one kernel into `<dest>.part`, then move it into place.
fn fetch_to(client: &Client, descriptor: &KernelDescriptor, dest: &Path) -> Result<u64, ImportError> {
    let partial = dest.with_extension("part");
    let result = stream_response(client, descriptor, &partial);
    match result {
        Ok(0) => {
            fs::remove_file(&partial)?;
            Err(ImportError::EmptyDownload {
                name: descriptor.filename,
            })
        }
        Ok(bytes) => {
            fs::rename(&partial, dest)?;
            Ok(bytes)
        }
        Err(err) => {
            if partial.exists() {
                if let Err(cleanup) = fs::remove_file(&partial) {
                    warn!("could not remove {}: {cleanup}", partial.display());
                }
            }
            Err(err)
        }
    }
}

fn stream_response(
    client: &Client,
    descriptor: &KernelDescriptor,
    partial: &Path,
) -> Result<u64, ImportError> {
    let mut response = client.get(descriptor.url).send()?.error_for_status()?;
    let mut writer = BufWriter::new(File::create(partial)?);
    let bytes = io::copy(&mut response, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}
