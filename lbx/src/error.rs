#[derive(Debug, thiserror::Error)]
pub enum LbxError {
    #[error("Invalid LBX file: {reason}")]
    InvalidContainer { reason: String },
    #[error("Smacker video, not an LBX archive")]
    SmackerVideo,
    #[error("Asset index {index} out of range ({count} assets)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Invalid asset: {reason}")]
    InvalidAsset { reason: String },
    #[error("Image lacks palette, provide a default one")]
    MissingPalette,
    #[error("Scan line overflow at {x}:{y}")]
    ScanLineOverflow { x: usize, y: usize },
    #[error("IOError: {source}")]
    IOError {
        #[from]
        source: std::io::Error,
    },
}

impl LbxError {
    pub(crate) fn invalid_asset(reason: impl Into<String>) -> Self {
        Self::InvalidAsset {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_container(reason: impl Into<String>) -> Self {
        Self::InvalidContainer {
            reason: reason.into(),
        }
    }

    /// Whether an archive walk can skip the failing asset and carry on.
    ///
    /// Container level errors and byte source failures stop the walk.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidAsset { .. } | Self::MissingPalette | Self::ScanLineOverflow { .. }
        )
    }
}

pub type LbxResult<T> = Result<T, LbxError>;
