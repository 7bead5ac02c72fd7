//! CSPICE-backed provider.
//!
//! CSPICE keeps its kernel pool in process-global state, so sessions are
//! serialised behind one mutex. A session furnishes its kernels on creation
//! and clears the pool when dropped.

use std::ffi::{CStr, CString};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use cspice_sys::{
    SpiceBoolean, SpiceDouble, SpiceInt, erract_c, et2utc_c, failed_c, furnsh_c, getmsg_c,
    kclear_c, reset_c, spkezr_c, str2et_c, sxform_c,
};
use deflector_core::matrix::Matrix6;
use deflector_core::state::{Inertial, StateVector};
use log::{debug, info};

use crate::kernels::{self, KERNEL_CATALOG, KernelDescriptor};
use crate::{EphemerisError, EphemerisProvider, EphemerisSession};

static SESSION_LOCK: Mutex<()> = Mutex::new(());

/// Provider that furnishes a kernel set from a directory for each session.
#[derive(Debug, Clone)]
pub struct SpiceEphemeris {
    kernel_dir: PathBuf,
    kernels: Vec<&'static KernelDescriptor>,
}

impl SpiceEphemeris {
    /// Use the full catalog from `kernel_dir`.
    pub fn new(kernel_dir: impl Into<PathBuf>) -> Self {
        Self {
            kernel_dir: kernel_dir.into(),
            kernels: KERNEL_CATALOG.iter().collect(),
        }
    }

    /// Use only the named catalog kernels (e.g. skip the ITRF93 binary PCK).
    pub fn with_kernels(
        kernel_dir: impl Into<PathBuf>,
        filenames: &[String],
    ) -> Result<Self, EphemerisError> {
        let kernels = filenames
            .iter()
            .map(|name| {
                kernels::find(name).ok_or_else(|| EphemerisError::UnknownKernel {
                    name: name.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kernel_dir: kernel_dir.into(),
            kernels,
        })
    }
}

impl EphemerisProvider for SpiceEphemeris {
    type Session<'a> = SpiceSession<'a>;

    fn load(&self) -> Result<Self::Session<'_>, EphemerisError> {
        kernels::validate_kernel_paths(&self.kernel_dir, &self.kernels)?;
        let guard = SESSION_LOCK
            .lock()
            .map_err(|_| EphemerisError::SessionPoisoned)?;
        // Constructed before furnishing so a failed load still clears the pool on drop.
        let session = SpiceSession { _guard: guard };
        unsafe {
            kclear_c();
        }
        configure_error_handling();
        for descriptor in &self.kernels {
            let c_path = path_to_cstring(&self.kernel_dir, descriptor)?;
            unsafe {
                furnsh_c(c_path.as_ptr() as *mut i8);
            }
            check_for_spice_error()?;
        }
        info!(
            "SPICE session loaded {} kernels from {}",
            self.kernels.len(),
            self.kernel_dir.display()
        );
        Ok(session)
    }

    fn name(&self) -> &'static str {
        "spice"
    }
}

/// Exclusive handle on the CSPICE kernel pool.
pub struct SpiceSession<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl Drop for SpiceSession<'_> {
    fn drop(&mut self) {
        unsafe {
            kclear_c();
            reset_c();
        }
        debug!("SPICE session cleared kernel pool");
    }
}

impl EphemerisSession for SpiceSession<'_> {
    fn state_transform(&self, from: &str, to: &str, et: f64) -> Result<Matrix6, EphemerisError> {
        let from_c = to_cstring(from)?;
        let to_c = to_cstring(to)?;
        let mut xform: [[SpiceDouble; 6]; 6] = [[0.0; 6]; 6];
        unsafe {
            sxform_c(
                from_c.as_ptr() as *mut i8,
                to_c.as_ptr() as *mut i8,
                et,
                xform.as_mut_ptr(),
            );
        }
        check_for_spice_error()?;
        Ok(xform)
    }

    fn relative_state(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        et: f64,
    ) -> Result<StateVector<Inertial>, EphemerisError> {
        let target_c = to_cstring(target)?;
        let observer_c = to_cstring(observer)?;
        let frame_c = to_cstring(frame)?;
        let aberration_c = to_cstring("NONE")?;
        let mut state: [SpiceDouble; 6] = [0.0; 6];
        let mut light_time: SpiceDouble = 0.0;
        unsafe {
            spkezr_c(
                target_c.as_ptr() as *mut i8,
                et,
                frame_c.as_ptr() as *mut i8,
                aberration_c.as_ptr() as *mut i8,
                observer_c.as_ptr() as *mut i8,
                state.as_mut_ptr(),
                &mut light_time,
            );
        }
        check_for_spice_error()?;
        Ok(StateVector::new(
            [state[0], state[1], state[2]],
            [state[3], state[4], state[5]],
            observer.trim().to_ascii_uppercase(),
        ))
    }

    fn epoch_from_text(&self, text: &str) -> Result<f64, EphemerisError> {
        let epoch_c = CString::new(text).map_err(|_| EphemerisError::InvalidEpoch {
            epoch: text.to_string(),
        })?;
        let mut et: SpiceDouble = 0.0;
        unsafe {
            str2et_c(epoch_c.as_ptr() as *mut i8, &mut et);
        }
        check_for_spice_error().map_err(|err| err.for_epoch_text(text))?;
        Ok(et)
    }

    fn format_epoch(&self, et: f64) -> Result<String, EphemerisError> {
        let mut buffer = vec![0i8; 64];
        let fmt = to_cstring("ISOC")?;
        unsafe {
            et2utc_c(
                et,
                fmt.as_ptr() as *mut i8,
                3,
                buffer.len() as SpiceInt,
                buffer.as_mut_ptr(),
            );
        }
        check_for_spice_error()?;
        let c_str = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        Ok(c_str.to_string_lossy().trim().to_string())
    }
}

fn to_cstring(value: &str) -> Result<CString, EphemerisError> {
    CString::new(value).map_err(|_| EphemerisError::Spice {
        short: "SPICE(INVALIDARGUMENT)".to_string(),
        message: format!("argument `{value}` contains an interior NUL byte"),
    })
}

fn path_to_cstring(
    dir: &std::path::Path,
    descriptor: &KernelDescriptor,
) -> Result<CString, EphemerisError> {
    let path = descriptor.path_in(dir);
    let path_str = path
        .to_str()
        .ok_or_else(|| EphemerisError::InvalidKernelPath {
            name: descriptor.filename,
            path: path.clone(),
        })?;
    CString::new(path_str).map_err(|_| EphemerisError::InvalidKernelPath {
        name: descriptor.filename,
        path,
    })
}

fn configure_error_handling() {
    const SET: &[u8] = b"SET\0";
    const RETURN_MODE: &[u8] = b"RETURN\0";
    unsafe {
        erract_c(
            SET.as_ptr() as *mut i8,
            0 as SpiceInt,
            RETURN_MODE.as_ptr() as *mut i8,
        );
    }
}

fn check_for_spice_error() -> Result<(), EphemerisError> {
    unsafe {
        if failed_c() != 0 as SpiceBoolean {
            let short = spice_message(b"SHORT\0", 64);
            let message = spice_message(b"LONG\0", 1024);
            reset_c();
            return Err(EphemerisError::Spice { short, message });
        }
    }
    Ok(())
}

/// Read the pending CSPICE error message of the given kind (`SHORT` or `LONG`).
unsafe fn spice_message(option: &[u8], capacity: usize) -> String {
    let mut buffer = vec![0i8; capacity];
    unsafe {
        getmsg_c(
            option.as_ptr() as *mut i8,
            buffer.len() as SpiceInt,
            buffer.as_mut_ptr(),
        );
        CStr::from_ptr(buffer.as_ptr())
            .to_string_lossy()
            .trim()
            .to_string()
    }
}
