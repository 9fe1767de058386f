// SPDX-License-Identifier: Apache-2.0

//! Compile-time codec limits.
//!
//! Every engine in this crate is generic over a [`CodecConfig`], defaulting to
//! [`DefaultConfig`]. A custom set of limits can be spelled inline with
//! [`CodecLimits`]:
//!
//! ```
//! use hostjson::{CodecConfig, CodecLimits};
//! type Shallow = CodecLimits<4, 64, 2>;
//! assert_eq!(Shallow::MAX_DEPTH, 4);
//! ```

/// Configuration trait for the codec - defines nesting and buffer limits
pub trait CodecConfig {
    /// Maximum number of nested containers (objects/arrays) in a single call.
    /// The synthetic holder that wraps the root value is not counted.
    const MAX_DEPTH: usize;
    /// Minimum size of a freshly allocated output chunk.
    const CHUNK_MIN_SIZE: usize;
    /// Maximum number of indentation characters taken from a `space` argument.
    const MAX_INDENT: usize;
}

/// Default configuration: 32 levels, 128 byte chunks, 10 indentation characters
pub struct DefaultConfig;

impl CodecConfig for DefaultConfig {
    const MAX_DEPTH: usize = 32;
    const CHUNK_MIN_SIZE: usize = 128;
    const MAX_INDENT: usize = 10;
}

/// User-facing configuration struct
/// Usage: `CodecLimits<64, 256, 10>` for deeper nesting and larger chunks
pub struct CodecLimits<const DEPTH: usize, const CHUNK: usize, const INDENT: usize>;

impl<const DEPTH: usize, const CHUNK: usize, const INDENT: usize> CodecConfig
    for CodecLimits<DEPTH, CHUNK, INDENT>
{
    const MAX_DEPTH: usize = DEPTH;
    const CHUNK_MIN_SIZE: usize = CHUNK;
    const MAX_INDENT: usize = INDENT;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits<C: CodecConfig>() -> (usize, usize, usize) {
        (C::MAX_DEPTH, C::CHUNK_MIN_SIZE, C::MAX_INDENT)
    }

    #[test]
    fn test_default_limits() {
        assert_eq!(limits::<DefaultConfig>(), (32, 128, 10));
    }

    #[test]
    fn test_custom_limits() {
        assert_eq!(limits::<CodecLimits<3, 16, 4>>(), (3, 16, 4));
    }
}
