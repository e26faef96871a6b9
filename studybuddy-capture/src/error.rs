use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("unsupported input: {0}")]
    Unsupported(String),

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode jpeg: {0}")]
    Encode(#[source] image::ImageError),

    #[error("invalid transcript line {line}: {message}")]
    Transcript { line: usize, message: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CaptureError {
    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CaptureError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => {
                CaptureError::PermissionDenied(path.to_path_buf())
            }
            _ => CaptureError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    pub(crate) fn from_decode(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(u) => CaptureError::Unsupported(u.to_string()),
            other => CaptureError::Decode(other),
        }
    }
}
