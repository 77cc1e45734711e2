use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve an archive entry name beneath `base`, rejecting names that are
/// absolute or climb out of it.
pub fn sanitize_path(entry: &Path, base: &Path) -> Result<PathBuf> {
    let normalized = normalize_path(&separators(entry));
    if normalized.as_os_str().is_empty() {
        return Err(Error::InvalidPath);
    }
    if normalized.has_root() || escapes(&separators(entry)) {
        return Err(Error::ZipSlip {
            entry: entry.to_path_buf(),
            resolved: normalized,
        });
    }

    let resolved = base.join(&normalized);
    if !resolved.starts_with(base) {
        return Err(Error::ZipSlip {
            entry: entry.to_path_buf(),
            resolved,
        });
    }
    Ok(resolved)
}

/// Treat `\` as a separator too. Bundles built on Windows use it.
fn separators(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().replace('\\', "/"))
}

fn escapes(path: &Path) -> bool {
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            Component::Normal(_) => depth += 1,
            Component::Prefix(_) => return true,
            Component::RootDir | Component::CurDir => {}
        }
    }
    false
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push("/"),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }
    result
}
