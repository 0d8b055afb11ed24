use crate::error::ValidationError;
use crate::models::UploadFile;

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "pdf"];

/// 10 MiB per file
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Check every file of a batch. The first violation rejects the whole batch.
pub fn validate_batch(files: &[UploadFile]) -> Result<(), ValidationError> {
    if let Some(file) = files.iter().find(|f| !has_allowed_extension(f)) {
        return Err(ValidationError::InvalidFileType {
            filename: file.filename.clone(),
        });
    }

    if let Some(file) = files.iter().find(|f| f.size() > MAX_FILE_SIZE) {
        return Err(ValidationError::FileTooLarge {
            filename: file.filename.clone(),
            size: file.size(),
            limit: MAX_FILE_SIZE,
        });
    }

    Ok(())
}

fn has_allowed_extension(file: &UploadFile) -> bool {
    file.extension()
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
