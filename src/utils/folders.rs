use std::fs;
use std::path::Path;

use tracing::{info, warn};

/// Remove the contents of `folder`, keeping the folder itself.
///
/// Subdirectories are only removed when `recurse` is set. A missing folder
/// is a no-op. Entries that cannot be removed are logged and skipped.
/// Returns the number of removed entries.
pub fn clean_folder(folder: &Path, recurse: bool) -> usize {
    if !folder.exists() {
        return 0;
    }

    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read {}: {}", folder.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot read entry in {}: {}", folder.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            if !recurse {
                continue;
            }
            removed += clean_folder(&path, true);
            match fs::remove_dir(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        } else {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }

    removed
}

pub fn check_path_exists(path: &Path) -> bool {
    let exists = path.exists();
    if exists {
        info!("Path {} accessible", path.display());
    } else {
        warn!("Cannot access path: {}", path.display());
    }
    exists
}
