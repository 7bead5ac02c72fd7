use std::fs;
use std::path::{Path, PathBuf};

use crate::EphemerisError;

/// Location where the project's helpers expect SPICE kernels to live.
pub const LOCAL_SPICE_DIR: &str = "data/spice";

/// Enumerates the SPICE kernel families the trajectory engine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// SPK: Solar System ephemerides (positions and velocities).
    Spk,
    /// LSK: Leap seconds kernel (UTC ↔ TDB/ET conversions).
    Lsk,
    /// Text PCK: body orientation models (IAU_EARTH) and radii.
    Pck,
    /// Binary PCK: high-precision Earth orientation (ITRF93).
    BinaryPck,
}

impl KernelKind {
    /// Returns a human-readable label for this kernel type.
    pub fn label(self) -> &'static str {
        match self {
            Self::Spk => "SPK (ephemeris)",
            Self::Lsk => "LSK (leap seconds)",
            Self::Pck => "PCK (planetary constants)",
            Self::BinaryPck => "BPC (Earth orientation)",
        }
    }
}

/// Metadata describing a SPICE kernel we expect to manage.
#[derive(Debug, Clone, Copy)]
pub struct KernelDescriptor {
    pub filename: &'static str,
    pub url: &'static str,
    pub kind: KernelKind,
    pub description: &'static str,
}

impl KernelDescriptor {
    /// Path of this kernel inside an arbitrary kernel directory.
    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.filename)
    }
}

/// Canonical kernel set for launch, frame conversion, and heliocentric hand-off.
pub const KERNEL_CATALOG: &[KernelDescriptor] = &[
    KernelDescriptor {
        filename: "naif0012.tls",
        url: "https://naif.jpl.nasa.gov/pub/naif/generic_kernels/lsk/naif0012.tls",
        kind: KernelKind::Lsk,
        description: "NAIF leap seconds kernel: UTC↔TDB conversion table with historical and predicted leap seconds.",
    },
    KernelDescriptor {
        filename: "de440s.bsp",
        url: "https://naif.jpl.nasa.gov/pub/naif/generic_kernels/spk/planets/de440s.bsp",
        kind: KernelKind::Spk,
        description: "JPL DE440 short ephemeris: Sun, Earth-Moon barycentre, and Earth states (1550–2650).",
    },
    KernelDescriptor {
        filename: "pck00011.tpc",
        url: "https://naif.jpl.nasa.gov/pub/naif/generic_kernels/pck/pck00011.tpc",
        kind: KernelKind::Pck,
        description: "Planetary constants kernel: IAU_EARTH orientation model and Earth radii.",
    },
    KernelDescriptor {
        filename: "earth_latest_high_prec.bpc",
        url: "https://naif.jpl.nasa.gov/pub/naif/generic_kernels/pck/earth_latest_high_prec.bpc",
        kind: KernelKind::BinaryPck,
        description: "High-precision ITRF93 Earth orientation (covers the recent past and a short predict window only).",
    },
];

/// Look up a catalog entry by file name.
pub fn find(filename: &str) -> Option<&'static KernelDescriptor> {
    KERNEL_CATALOG
        .iter()
        .find(|descriptor| descriptor.filename.eq_ignore_ascii_case(filename))
}

/// Basic metadata describing a local SPICE kernel.
#[derive(Debug)]
pub struct KernelSummary {
    pub descriptor: &'static KernelDescriptor,
    pub path: PathBuf,
    pub file_size_bytes: u64,
}

/// Ensure every kernel in `descriptors` exists under `dir` with a UTF-8 path.
pub fn validate_kernel_paths(
    dir: &Path,
    descriptors: &[&'static KernelDescriptor],
) -> Result<(), EphemerisError> {
    for descriptor in descriptors {
        let path = descriptor.path_in(dir);
        if !path.exists() {
            return Err(EphemerisError::MissingKernel {
                name: descriptor.filename,
                path,
            });
        }
        if path.to_str().is_none() {
            return Err(EphemerisError::InvalidKernelPath {
                name: descriptor.filename,
                path,
            });
        }
    }
    Ok(())
}

/// Summarize the local kernel set with file sizes and descriptions.
pub fn kernel_summaries(dir: &Path) -> Result<Vec<KernelSummary>, EphemerisError> {
    let descriptors: Vec<&'static KernelDescriptor> = KERNEL_CATALOG.iter().collect();
    validate_kernel_paths(dir, &descriptors)?;
    descriptors
        .into_iter()
        .map(|descriptor| {
            let path = descriptor.path_in(dir);
            let metadata = fs::metadata(&path).map_err(|source| EphemerisError::Io {
                name: descriptor.filename,
                source,
            })?;
            Ok(KernelSummary {
                descriptor,
                path,
                file_size_bytes: metadata.len(),
            })
        })
        .collect()
}
