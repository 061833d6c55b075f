// Video mode negotiation
//
// A requested mode may be unavailable on the host. Negotiation walks a
// bounded fallback ladder: reduce the colour depth first, then drop to the
// next smaller resolution and try the depths again. Exhausting the ladder is
// an initialization failure reported to the caller; there are no retries.

use crate::pack::Depth;

/// A host surface mode request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMode {
    pub width: usize,
    pub height: usize,
    pub depth: Depth,
}

impl VideoMode {
    pub fn new(width: usize, height: usize, depth: Depth) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

impl std::fmt::Display for VideoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth.bits())
    }
}

/// Answers whether the host can provide a given mode
///
/// Implemented by the presentation layer; tests use closures.
pub trait ModeProbe {
    fn supports(&mut self, mode: &VideoMode) -> bool;
}

impl<F: FnMut(&VideoMode) -> bool> ModeProbe for F {
    fn supports(&mut self, mode: &VideoMode) -> bool {
        self(mode)
    }
}

/// Errors raised during display initialization
#[derive(Debug)]
pub enum VideoError {
    /// No usable mode after walking the full fallback ladder
    ModeUnavailable { requested: VideoMode },
}

impl std::fmt::Display for VideoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoError::ModeUnavailable { requested } => {
                write!(f, "no usable video mode (requested {})", requested)
            }
        }
    }
}

impl std::error::Error for VideoError {}

/// Next depth down the ladder
fn lower_depth(depth: Depth) -> Option<Depth> {
    match depth {
        Depth::Rgba8888 => Some(Depth::Rgb888),
        Depth::Rgb888 => Some(Depth::Rgb565),
        Depth::Rgb565 => Some(Depth::Indexed8),
        Depth::Indexed8 => None,
    }
}

/// Negotiate a usable mode, preferring the request
///
/// For the requested resolution and then each fallback resolution in order,
/// the requested depth is tried followed by every lower depth. The first
/// supported mode wins.
pub fn negotiate(
    probe: &mut dyn ModeProbe,
    requested: VideoMode,
    fallback_sizes: &[(usize, usize)],
) -> Result<VideoMode, VideoError> {
    let sizes = std::iter::once((requested.width, requested.height)).chain(fallback_sizes.iter().copied());

    for (width, height) in sizes {
        let mut depth = Some(requested.depth);
        while let Some(d) = depth {
            let mode = VideoMode::new(width, height, d);
            if probe.supports(&mode) {
                return Ok(mode);
            }
            depth = lower_depth(d);
        }
    }

    Err(VideoError::ModeUnavailable { requested })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_mode_wins() {
        let requested = VideoMode::new(640, 480, Depth::Rgba8888);
        let mode = negotiate(&mut |_: &VideoMode| true, requested, &[(320, 240)]).unwrap();
        assert_eq!(mode, requested);
    }

    #[test]
    fn test_depth_reduced_before_resolution() {
        let requested = VideoMode::new(640, 480, Depth::Rgba8888);
        let mut probe = |m: &VideoMode| m.depth == Depth::Rgb565;
        let mode = negotiate(&mut probe, requested, &[(320, 240)]).unwrap();
        assert_eq!(mode, VideoMode::new(640, 480, Depth::Rgb565));
    }

    #[test]
    fn test_resolution_fallback_retries_depths() {
        let requested = VideoMode::new(640, 480, Depth::Rgba8888);
        let mut probe = |m: &VideoMode| m.width == 320 && m.depth == Depth::Rgb888;
        let mode = negotiate(&mut probe, requested, &[(320, 240)]).unwrap();
        assert_eq!(mode, VideoMode::new(320, 240, Depth::Rgb888));
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let requested = VideoMode::new(640, 480, Depth::Rgba8888);
        let mut attempts = 0usize;
        let err = negotiate(
            &mut |_: &VideoMode| {
                attempts += 1;
                false
            },
            requested,
            &[(320, 240)],
        )
        .unwrap_err();

        // Bounded: 4 depths x 2 resolutions, then done
        assert_eq!(attempts, 8);
        assert!(matches!(err, VideoError::ModeUnavailable { .. }));
        assert!(err.to_string().contains("640x480x32"));
    }
}
