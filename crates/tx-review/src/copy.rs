//! Byte-copy policies applied to everything written into display buffers.

/// Copies bytes from the document into a display buffer.
///
/// `dest` and `src` always have the same length; implementations copy
/// exactly `src.len()` bytes.
pub trait CopyDelegate {
    fn copy(&self, dest: &mut [u8], src: &[u8]);
}

impl<C: CopyDelegate + ?Sized> CopyDelegate for &C {
    fn copy(&self, dest: &mut [u8], src: &[u8]) {
        (**self).copy(dest, src)
    }
}

/// Verbatim copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCopy;

impl CopyDelegate for PlainCopy {
    fn copy(&self, dest: &mut [u8], src: &[u8]) {
        dest.copy_from_slice(src);
    }
}

/// Replaces every byte outside printable ASCII with `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizingCopy;

impl SanitizingCopy {
    pub const REPLACEMENT: u8 = b'?';
}

impl CopyDelegate for SanitizingCopy {
    fn copy(&self, dest: &mut [u8], src: &[u8]) {
        for (d, &s) in dest.iter_mut().zip(src) {
            *d = if (0x20..0x7f).contains(&s) {
                s
            } else {
                Self::REPLACEMENT
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_copy() {
        let mut dest = [0u8; 3];
        PlainCopy.copy(&mut dest, b"a\x01c");
        assert_eq!(&dest, b"a\x01c");
    }

    #[test]
    fn test_sanitizing_copy() {
        let mut dest = [0u8; 5];
        SanitizingCopy.copy(&mut dest, "a\u{7f}\té".as_bytes());
        assert_eq!(&dest, b"a????");
    }
}
