use std::iter::Copied;
use std::slice::Iter;

use crate::font::PrintDirection;

pub(crate) trait StrExt {
    /// Whether this argument names a PNG output file. Matching is exact and case-sensitive.
    fn is_png_path(&self) -> bool;
}

impl StrExt for str {
    fn is_png_path(&self) -> bool {
        self.ends_with(".png")
    }
}

pub(crate) trait RowExt {
    /// The sub-characters of a glyph row, in the order they are laid out for `direction`.
    fn bidi_chars(&self, direction: PrintDirection) -> BidiChars<'_>;
}

impl RowExt for [char] {
    fn bidi_chars(&self, direction: PrintDirection) -> BidiChars<'_> {
        BidiChars {
            chars: self.iter().copied(),
            direction,
        }
    }
}

pub(crate) struct BidiChars<'a> {
    chars: Copied<Iter<'a, char>>,
    direction: PrintDirection,
}

impl Iterator for BidiChars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        match self.direction {
            PrintDirection::LeftToRight => self.chars.next(),
            PrintDirection::RightToLeft => self.chars.next_back(),
        }
    }
}

impl DoubleEndedIterator for BidiChars<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        match self.direction {
            PrintDirection::LeftToRight => self.chars.next_back(),
            PrintDirection::RightToLeft => self.chars.next(),
        }
    }
}
