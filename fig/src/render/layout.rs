use enumset::{EnumSet, EnumSetType};
use thiserror::Error;

use crate::font::Hardblank;

/// Combination of a horizontal layout mode and a set of smushing rules
pub type HorizontalLayout = Layout<HorizontalSmushing>;

/// Combination of a layout mode and a set of smushing rules
///
/// The smushing rules only matter if the layout mode is [`LayoutMode::Smushing`].
#[derive(Clone, Copy, Debug)]
pub struct Layout<S: EnumSetType> {
    mode: LayoutMode,
    smushing: EnumSet<S>,
}

impl<S: EnumSetType> Layout<S> {
    /// Returns the layout mode.
    pub const fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Returns true if the given smushing rule is active.
    pub fn smushing_mode_active(&self, mode: S) -> bool {
        self.smushing.contains(mode)
    }

    /// Returns true if *universal smushing* is active.
    ///
    /// When universal smushing, a sub-character of the earlier FIGcharacter is replaced by the
    /// overlapping one of the later FIGcharacter, unless the later one is a [hardblank](Hardblank).
    pub fn universal_smushing(&self) -> bool {
        self.smushing.is_empty()
    }
}

impl HorizontalLayout {
    /// Decodes the `Old_Layout` and `Full_Layout` header parameters.
    ///
    /// `old_layout` is either `-1` for [`LayoutMode::FullSize`], `0` for [`LayoutMode::Fitting`],
    /// or a set of smushing rules in bits 0 to 5 (see [`HorizontalSmushing`]), implying
    /// [`LayoutMode::Smushing`].
    ///
    /// Only the low byte of `full_layout` is used: bits 0 to 5 are the smushing rules, bit 6
    /// selects fitting and bit 7 smushing, taking precedence over bit 6. With neither bit set the
    /// layout is full size. Smushing without any rule is universal smushing. When both parameters
    /// are present they must agree.
    ///
    /// ```
    /// # use fig::render::{HorizontalLayout, HorizontalSmushing, LayoutMode};
    /// let layout = HorizontalLayout::decode(15, Some(24463)).unwrap();
    /// assert_eq!(layout.mode(), LayoutMode::Smushing);
    /// assert!(layout.smushing_mode_active(HorizontalSmushing::OppositePair));
    /// assert!(!layout.smushing_mode_active(HorizontalSmushing::BigX));
    /// ```
    ///
    /// # Errors
    /// See [`LayoutDecodeError`].
    pub fn decode(old_layout: i8, full_layout: Option<u16>) -> Result<Self, LayoutDecodeError> {
        let layout = if let Some(full_layout) = full_layout {
            let [_, low] = full_layout.to_be_bytes();
            let mode = match low >> 6 {
                0 => LayoutMode::FullSize,
                1 => LayoutMode::Fitting,
                _ => LayoutMode::Smushing,
            };
            match (old_layout, mode) {
                (0..=63, LayoutMode::Smushing)
                | (0, LayoutMode::Fitting)
                | (-1, LayoutMode::FullSize) => (),
                (-1..=63, _) => {
                    return Err(LayoutDecodeError::Inconsistent(old_layout, full_layout));
                }
                _ => return Err(LayoutDecodeError::InvalidOld(old_layout)),
            }
            let smushing = match u8::try_from(old_layout) {
                // an old layout of 0 with smushing asks for universal smushing
                Ok(0) => HorizontalSmushing::decode(low & 63),
                Ok(smushing) if smushing == low & 63 => HorizontalSmushing::decode(smushing),
                Err(_) => HorizontalSmushing::decode(low & 63),
                Ok(_) => return Err(LayoutDecodeError::Inconsistent(old_layout, full_layout)),
            };
            Self { mode, smushing }
        } else {
            match old_layout {
                -1 => Self {
                    mode: LayoutMode::FullSize,
                    smushing: EnumSet::empty(),
                },
                0 => Self {
                    mode: LayoutMode::Fitting,
                    smushing: EnumSet::empty(),
                },
                1..=63 => Self {
                    mode: LayoutMode::Smushing,
                    smushing: HorizontalSmushing::decode(old_layout.unsigned_abs()),
                },
                _ => return Err(LayoutDecodeError::InvalidOld(old_layout)),
            }
        };
        Ok(layout)
    }

    /// The sub-character replacing `end` and `start` when they overlap, if they can be smushed.
    pub(crate) fn smush(self, end: char, start: char, hardblank: Hardblank) -> Option<char> {
        if let LayoutMode::FullSize | LayoutMode::Fitting = self.mode {
            return None;
        }
        if self.smushing.is_empty() {
            return if hardblank == start {
                Some(end)
            } else {
                Some(start)
            };
        }
        self.smushing
            .iter()
            .find_map(|smushing| smushing.smush(end, start, hardblank))
    }
}

/// How adjacent FIGcharacters are joined
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    /// No kerning, the FIGcharacters are laid out as rectangles.
    FullSize,
    /// FIGcharacters are moved closer until they touch, that is until two non-blank
    /// sub-characters are adjacent. Hardblanks count as non-blank.
    Fitting,
    /// FIGcharacters are moved one column closer after they touch, if every pair of overlapping
    /// sub-characters can be smushed into one. Otherwise they are only fitted.
    Smushing,
}

/// Controlled smushing rules for horizontal layout
#[derive(EnumSetType, Debug)]
#[enumset(repr = "u8")]
pub enum HorizontalSmushing {
    /// Smush two equal sub-characters, unless they are [hardblanks](Hardblank).
    EqualCharacter = 0,
    /// An underscore (`_`) is replaced by any of: `|`, `/`, `\`, `[`, `]`, `{`, `}`, `(`, `)`,
    /// `<` or `>`.
    Underscore = 1,
    /// Of the classes `|`, `/\`, `[]`, `{}`, `()` and `<>`, the later class wins when two
    /// sub-characters from different classes meet.
    Hierarchy = 2,
    /// Opposing brackets (`[]`), braces (`{}`) or parentheses (`()`) become a vertical bar (`|`),
    /// in either order.
    OppositePair = 3,
    /// `/\` becomes `|`, `\/` becomes `Y` and `><` becomes `X`. Order matters here.
    BigX = 4,
    /// Two [hardblanks](Hardblank) become one.
    Hardblank = 5,
}

impl HorizontalSmushing {
    fn decode(bits: u8) -> EnumSet<Self> {
        EnumSet::from_repr_truncated(bits)
    }

    fn smush(self, end: char, start: char, hardblank: Hardblank) -> Option<char> {
        match self {
            Self::EqualCharacter => (end == start && hardblank != start).then_some(start),
            Self::Underscore => underscore(start, end).or_else(|| underscore(end, start)),
            Self::Hierarchy => hierarchy(start, end).or_else(|| hierarchy(end, start)),
            Self::OppositePair => matches!(
                (end, start),
                ('[', ']') | (']', '[') | ('{', '}') | ('}', '{') | ('(', ')') | (')', '(')
            )
            .then_some('|'),
            Self::BigX => match (end, start) {
                ('/', '\\') => Some('|'),
                ('\\', '/') => Some('Y'),
                ('>', '<') => Some('X'),
                _ => None,
            },
            Self::Hardblank => (hardblank == end && end == start).then_some(start),
        }
    }
}

fn underscore(a: char, b: char) -> Option<char> {
    (a == '_'
        && matches!(
            b,
            '|' | '/' | '\\' | '[' | ']' | '{' | '}' | '(' | ')' | '<' | '>'
        ))
    .then_some(b)
}

fn hierarchy(a: char, b: char) -> Option<char> {
    matches!(
        (a, b),
        ('|', '/' | '\\' | '[' | ']' | '{' | '}' | '(' | ')' | '<' | '>')
            | ('/' | '\\', '[' | ']' | '{' | '}' | '(' | ')' | '<' | '>')
            | ('[' | ']', '{' | '}' | '(' | ')' | '<' | '>')
            | ('{' | '}', '(' | ')' | '<' | '>')
            | ('(' | ')', '<' | '>')
    )
    .then_some(b)
}

/// Layout parameters that cannot be decoded
#[derive(Error, Debug)]
pub enum LayoutDecodeError {
    /// `Old_Layout` and `Full_Layout` describe different layouts.
    #[error("inconsistent layout parameters: {0} and {1}")]
    Inconsistent(i8, u16),
    /// `Old_Layout` is outside `-1..=63`.
    #[error("invalid `Old_Layout` {0}")]
    InvalidOld(i8),
}

#[cfg(test)]
mod tests {
    use enumset::EnumSet;

    use super::{HorizontalLayout, HorizontalSmushing, LayoutDecodeError, LayoutMode};
    use crate::font::Hardblank;

    fn hardblank() -> Hardblank {
        Hardblank::try_from(b'$').unwrap()
    }

    #[test]
    fn decode_old_layout_only() {
        let layout = HorizontalLayout::decode(-1, None).unwrap();
        assert_eq!(layout.mode(), LayoutMode::FullSize);
        let layout = HorizontalLayout::decode(0, None).unwrap();
        assert_eq!(layout.mode(), LayoutMode::Fitting);
        let layout = HorizontalLayout::decode(15, None).unwrap();
        assert_eq!(layout.mode(), LayoutMode::Smushing);
        assert_eq!(
            layout.smushing,
            HorizontalSmushing::EqualCharacter
                | HorizontalSmushing::Underscore
                | HorizontalSmushing::Hierarchy
                | HorizontalSmushing::OppositePair
        );
        assert!(matches!(
            HorizontalLayout::decode(64, None),
            Err(LayoutDecodeError::InvalidOld(64))
        ));
    }

    #[test]
    fn decode_full_layout() {
        let layout = HorizontalLayout::decode(0, Some(128)).unwrap();
        assert_eq!(layout.mode(), LayoutMode::Smushing);
        assert!(layout.universal_smushing());
        let layout = HorizontalLayout::decode(-1, Some(0)).unwrap();
        assert_eq!(layout.mode(), LayoutMode::FullSize);
        let layout = HorizontalLayout::decode(8, Some(136)).unwrap();
        assert_eq!(layout.smushing, EnumSet::only(HorizontalSmushing::OppositePair));
        assert!(matches!(
            HorizontalLayout::decode(-1, Some(64)),
            Err(LayoutDecodeError::Inconsistent(-1, 64))
        ));
        assert!(matches!(
            HorizontalLayout::decode(3, Some(129)),
            Err(LayoutDecodeError::Inconsistent(3, 129))
        ));
    }

    #[test]
    fn controlled_smushing() {
        let layout = HorizontalLayout::decode(63, None).unwrap();
        let smush = |end, start| layout.smush(end, start, hardblank());
        assert_eq!(smush('|', '|'), Some('|'));
        assert_eq!(smush('_', '/'), Some('/'));
        assert_eq!(smush('\\', '_'), Some('\\'));
        assert_eq!(smush('|', '('), Some('('));
        assert_eq!(smush('}', '{'), Some('|'));
        assert_eq!(smush('\\', '/'), Some('Y'));
        assert_eq!(smush('>', '<'), Some('X'));
        assert_eq!(smush('$', '$'), Some('$'));
        assert_eq!(smush('a', 'b'), None);
        assert_eq!(smush('<', '>'), None);
    }

    #[test]
    fn universal_smushing_prefers_later_character() {
        let layout = HorizontalLayout::decode(0, Some(128)).unwrap();
        assert_eq!(layout.smush('a', 'b', hardblank()), Some('b'));
        assert_eq!(layout.smush('a', '$', hardblank()), Some('a'));
        let fitting = HorizontalLayout::decode(0, None).unwrap();
        assert_eq!(fitting.smush('|', '|', hardblank()), None);
    }
}
