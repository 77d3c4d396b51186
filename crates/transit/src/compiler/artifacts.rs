//! Writing the route and stop documents.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::compiler::CompiledSchedule;
use crate::models::types::{Result, TransitError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub routes: PathBuf,
    pub stops: PathBuf,
}

impl ArtifactPaths {
    pub const DEFAULT_ROUTES_FILE: &'static str = "routes.json";
    pub const DEFAULT_STOPS_FILE: &'static str = "stops.json";

    pub fn in_directory(dir: &Path) -> Self {
        Self {
            routes: dir.join(Self::DEFAULT_ROUTES_FILE),
            stops: dir.join(Self::DEFAULT_STOPS_FILE),
        }
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<Vec<u8>> {
    let encoded = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    encoded.map_err(|e| TransitError::SerializationError(e.to_string()))
}

/// Serialize both documents, stage each in a temporary sibling file, then
/// rename both into place. Nothing is renamed unless both documents were
/// serialized and staged, and staged files are removed on failure.
pub fn write_artifacts(compiled: &CompiledSchedule, paths: &ArtifactPaths, pretty: bool) -> Result<()> {
    let routes = to_json(&compiled.routes, pretty)?;
    let stops = to_json(&compiled.stops, pretty)?;

    let routes_temp = temp_path(&paths.routes)?;
    let stops_temp = temp_path(&paths.stops)?;
    let staged = write_file(&routes_temp, &routes).and_then(|()| write_file(&stops_temp, &stops));
    if let Err(err) = staged {
        discard(&[&routes_temp, &stops_temp]);
        return Err(err);
    }

    if let Err(err) = rename(&routes_temp, &paths.routes) {
        discard(&[&routes_temp, &stops_temp]);
        return Err(err);
    }
    if let Err(err) = rename(&stops_temp, &paths.stops) {
        discard(&[&stops_temp]);
        return Err(err);
    }

    tracing::info!(
        "wrote {} routes to {} and {} stops to {}",
        compiled.routes.len(),
        paths.routes.display(),
        compiled.stops.len(),
        paths.stops.display()
    );
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let Some(file_name) = path.file_name() else {
        return Err(TransitError::InvalidData(format!(
            "output path {} has no file name",
            path.display()
        )));
    };
    let mut temp_name = OsString::from(file_name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| TransitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|source| TransitError::Io {
        path: to.to_path_buf(),
        source,
    })
}

fn discard(paths: &[&Path]) {
    for path in paths {
        // Absent when staging never got that far
        let _ = fs::remove_file(path);
    }
}
