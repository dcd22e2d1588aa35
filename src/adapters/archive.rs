use crate::domain::ports::ConflictPolicy;
use crate::utils::error::{NotifierError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Moves `path` into `processed_dir`, resolving name collisions with `policy`.
pub fn archive_file(path: &Path, processed_dir: &Path, policy: ConflictPolicy) -> Result<PathBuf> {
    fs::create_dir_all(processed_dir)?;

    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not a file path: {}", path.display()),
        )
    })?;
    let mut dest = processed_dir.join(file_name);

    if dest.exists() {
        if is_same_file(path, &dest)? {
            return Err(NotifierError::ArchiveConflict {
                path: dest.display().to_string(),
            });
        }
        match policy {
            // rename 會直接取代舊檔，移動失敗時舊檔仍在
            ConflictPolicy::Overwrite => {
                tracing::debug!("Overwriting archived file {}", dest.display());
            }
            ConflictPolicy::Rename => dest = free_name(&dest),
            ConflictPolicy::Error => {
                return Err(NotifierError::ArchiveConflict {
                    path: dest.display().to_string(),
                })
            }
        }
    }

    move_file(path, &dest)?;
    tracing::info!("File moved to {}", dest.display());
    Ok(dest)
}

fn is_same_file(a: &Path, b: &Path) -> Result<bool> {
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

/// `name_1.xlsx`, `name_2.xlsx`, ... whichever is free first.
fn free_name(taken: &Path) -> PathBuf {
    let stem = taken
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = taken
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = taken.with_file_name(format!("{}_{}{}", stem, n, extension));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // rename 跨檔案系統會失敗，改用複製後刪除
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}
