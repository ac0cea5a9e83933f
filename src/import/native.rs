// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Native SOSI library backend
//!
//! The library exposes two entry points. `get_SosiInputObjects` takes the
//! host's scene units, writes the survey origin and returns the number of
//! input files. `process_SosiFiles` enumerates those files and calls back
//! once per feature with raw buffers. The callback carries no user data,
//! so the active sink is parked in a thread-local for the duration of the
//! enumeration.

use super::backend::BackendRun;
use super::pipeline::{FeatureSink, FeatureStatus};
use super::report::{Diagnostic, Severity, SurveyOrigin};
use crate::config::SceneUnits;
use crate::error::{SosiError, SosiResult};
use crate::geometry::{GeometryKind, GeometryRecord, ResultFlags};
use libloading::{Library, Symbol};
use std::cell::Cell;
use std::ffi::{c_char, c_double, c_int, c_void, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::ptr;
use tracing::{debug, error, info, warn};

/// Base name of the native reader library
pub const LIBRARY_NAME: &str = "SosiImporter";

const DISCOVER_SYMBOL: &str = "get_SosiInputObjects";
const PROCESS_SYMBOL: &str = "process_SosiFiles";

/// Status handed back to the library when a feature handler panics
pub const PANIC_STATUS: c_int = -1;

/// Per-feature callback handed to the library
pub type FeatureCallback = extern "C" fn(
    kind: c_int,
    reference_number: c_int,
    result_flags: c_int,
    name: *const c_char,
    dimensionality: c_int,
    point_count: c_int,
    coordinates: *const c_double,
    source_label: *const c_char,
) -> c_int;

type DiscoverFn = unsafe extern "system" fn(
    easting: *mut c_double,
    northing: *mut c_double,
    unity: *mut c_double,
    scene_scale: c_double,
    clip_end: c_double,
    unit_system: c_int,
    unit_length: c_int,
    unit_scale: c_double,
) -> c_int;

type ProcessFn = unsafe extern "system" fn(file_count: c_int, callback: FeatureCallback) -> c_int;

thread_local! {
    static ACTIVE_SINK: Cell<*mut c_void> = const { Cell::new(ptr::null_mut()) };
    static ABORT_STATUS: Cell<c_int> = const { Cell::new(0) };
}

/// Platform file name of the reader library in the working directory
pub fn default_library_path() -> PathBuf {
    PathBuf::from(libloading::library_filename(LIBRARY_NAME))
}

/// Backend driving the native SOSI reader library
#[derive(Debug, Clone, PartialEq)]
pub struct NativeBackend {
    library_path: PathBuf,
    units: SceneUnits,
}

impl NativeBackend {
    pub fn new(library_path: PathBuf, units: SceneUnits) -> Self {
        Self {
            library_path,
            units,
        }
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    /// Load the library, enumerate all features and release the library.
    ///
    /// The library is closed on every path out of a loaded run.
    pub fn run(&self, sink: &mut dyn FeatureSink) -> SosiResult<BackendRun> {
        // SAFETY: loading runs the library's initialisers; the path is the
        // configured SOSI reader and nothing else.
        let library = unsafe { Library::new(&self.library_path) }.map_err(|source| {
            SosiError::LibraryLoad {
                path: self.library_path.clone(),
                source,
            }
        })?;
        info!(path = %self.library_path.display(), "loaded SOSI library");

        let result = self.drive(&library, sink);

        match library.close() {
            Ok(()) => debug!("released SOSI library"),
            Err(err) => warn!(error = %err, "failed to release SOSI library"),
        }
        result
    }

    fn drive(&self, library: &Library, sink: &mut dyn FeatureSink) -> SosiResult<BackendRun> {
        // SAFETY: the signatures match the library's exported prototypes.
        let discover: Symbol<DiscoverFn> = unsafe { library.get(DISCOVER_SYMBOL.as_bytes()) }
            .map_err(|source| SosiError::MissingSymbol {
                symbol: DISCOVER_SYMBOL,
                source,
            })?;
        let process: Symbol<ProcessFn> = unsafe { library.get(PROCESS_SYMBOL.as_bytes()) }
            .map_err(|source| SosiError::MissingSymbol {
                symbol: PROCESS_SYMBOL,
                source,
            })?;

        let mut origin = SurveyOrigin::default();
        let units = &self.units;
        // SAFETY: the out pointers refer to live locals for the whole call.
        let file_count = unsafe {
            discover(
                &mut origin.easting,
                &mut origin.northing,
                &mut origin.unity,
                units.scene_scale,
                units.clip_end,
                units.unit_system.code(),
                units.unit_length.code(),
                units.unit_scale,
            )
        };
        info!(
            files = file_count,
            easting = origin.easting,
            northing = origin.northing,
            "SOSI input discovered"
        );

        if file_count > 0 {
            let mut slot: &mut dyn FeatureSink = sink;
            let guard = SinkGuard::install(&mut slot);
            // SAFETY: the trampoline only dereferences the sink parked by
            // `guard`, which outlives this call.
            let status = unsafe { process(file_count, feature_trampoline) };
            let aborted = guard.abort_status();
            drop(guard);

            debug!(status, "SOSI enumeration finished");
            if aborted != 0 {
                return Err(SosiError::Aborted(aborted));
            }
        }

        Ok(BackendRun {
            file_count: usize::try_from(file_count).unwrap_or(0),
            origin: Some(origin),
        })
    }
}

/// Parks a sink for the trampoline and clears it on drop
struct SinkGuard;

impl SinkGuard {
    fn install(slot: &mut &mut dyn FeatureSink) -> Self {
        let raw = slot as *mut &mut dyn FeatureSink as *mut c_void;
        ACTIVE_SINK.with(|s| s.set(raw));
        ABORT_STATUS.with(|s| s.set(0));
        SinkGuard
    }

    fn abort_status(&self) -> c_int {
        ABORT_STATUS.with(Cell::get)
    }
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        ACTIVE_SINK.with(|s| s.set(ptr::null_mut()));
    }
}

/// Callback entry point for the library; never unwinds
#[allow(clippy::too_many_arguments)]
extern "C" fn feature_trampoline(
    kind: c_int,
    reference_number: c_int,
    result_flags: c_int,
    name: *const c_char,
    dimensionality: c_int,
    point_count: c_int,
    coordinates: *const c_double,
    source_label: *const c_char,
) -> c_int {
    let raw = ACTIVE_SINK.with(Cell::get);
    if raw.is_null() {
        return 0;
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: the library passes NUL-terminated strings and a buffer of
        // `point_count * dimensionality` doubles, valid for this call.
        let record = unsafe {
            marshal_record(
                kind,
                reference_number,
                result_flags,
                name,
                dimensionality,
                point_count,
                coordinates,
                source_label,
            )
        };
        // SAFETY: `raw` was parked by a live `SinkGuard` on this thread.
        let sink = unsafe { &mut *(raw as *mut &mut dyn FeatureSink) };
        match record {
            Ok(Some(record)) => Some(sink.accept(record)),
            Ok(None) => None,
            Err(rejected) => {
                sink.reject(rejected);
                None
            }
        }
    }));

    let code = match outcome {
        Ok(Some(status)) => status.code(),
        Ok(None) => FeatureStatus::Continue.code(),
        Err(_) => {
            error!(reference = reference_number, "feature handler panicked");
            PANIC_STATUS
        }
    };
    if code != 0 {
        ABORT_STATUS.with(|s| s.set(code));
    }
    code
}

/// Copy raw callback arguments into an owned record.
///
/// Unknown kinds yield `Ok(None)`. A null or empty name becomes a
/// placeholder derived from the reference number. Names are object
/// identities, so a name that is not valid UTF-8 rejects the feature
/// instead of being patched up.
///
/// # Safety
///
/// String pointers must be null or NUL-terminated. When `coordinates` is
/// non-null and the dimensionality is 2 or 3, it must point to at least
/// `point_count * dimensionality` doubles.
#[allow(clippy::too_many_arguments)]
pub unsafe fn marshal_record(
    kind: c_int,
    reference_number: c_int,
    result_flags: c_int,
    name: *const c_char,
    dimensionality: c_int,
    point_count: c_int,
    coordinates: *const c_double,
    source_label: *const c_char,
) -> Result<Option<GeometryRecord>, Diagnostic> {
    let Some(kind) = GeometryKind::from_code(kind) else {
        warn!(code = kind, reference = reference_number, "unknown SOSI object kind");
        return Ok(None);
    };

    let name = match c_bytes(name).map(std::str::from_utf8) {
        None => GeometryRecord::placeholder_name(reference_number),
        Some(Ok(name)) => name.to_owned(),
        Some(Err(_)) => {
            return Err(Diagnostic {
                severity: Severity::Error,
                kind,
                reference_number,
                name: String::from_utf8_lossy(c_bytes(name).unwrap_or_default()).into_owned(),
                message: "feature name is not valid UTF-8".to_string(),
            });
        }
    };
    let source_label = c_bytes(source_label)
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .unwrap_or_default();
    let dimensionality = u32::try_from(dimensionality).unwrap_or(0);
    let point_count = usize::try_from(point_count).unwrap_or(0);

    let len = match dimensionality {
        2 | 3 => point_count * dimensionality as usize,
        _ => 0,
    };
    let coordinates = if coordinates.is_null() || len == 0 {
        Vec::new()
    } else {
        std::slice::from_raw_parts(coordinates, len).to_vec()
    };

    Ok(Some(GeometryRecord {
        kind,
        reference_number,
        result_flags: ResultFlags::from_bits_truncate(result_flags as u32),
        name,
        dimensionality,
        point_count,
        coordinates,
        source_label,
    }))
}

/// Bytes of a NUL-terminated string; `None` when null or empty
unsafe fn c_bytes<'a>(ptr: *const c_char) -> Option<&'a [u8]> {
    if ptr.is_null() {
        return None;
    }
    let bytes = CStr::from_ptr(ptr).to_bytes();
    (!bytes.is_empty()).then_some(bytes)
}
