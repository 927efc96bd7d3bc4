use thiserror::Error;

use crate::host::{AnnotationId, ContentBufferId, FloatingId, HostWindowId, SurfaceId};

/// A host object disappeared between two operations.
///
/// Renderers never surface these: the object is pruned and the next update
/// re-evaluates liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("console surface {0:?} no longer exists")]
    SurfaceGone(SurfaceId),
    #[error("annotation {0:?} no longer exists")]
    AnnotationGone(AnnotationId),
    #[error("host window {0:?} no longer exists")]
    WindowGone(HostWindowId),
    #[error("floating window {0:?} no longer exists")]
    FloatingGone(FloatingId),
    #[error("content buffer {0:?} no longer exists")]
    ContentBufferGone(ContentBufferId),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("text scale factor must be finite and positive, got {0}")]
    InvalidScale(f32),
    #[error("update interval must be non-zero")]
    ZeroInterval,
}
