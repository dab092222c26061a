//! FIGfont decoding
//!
//! A FIGfont (`.flf` file) is a header line, some comment lines, and then the FIGcharacters: the
//! 102 [required characters](REQUIRED_CHARACTERS) in a fixed order, followed by any number of
//! characters introduced by a *code tag*. Each FIGcharacter is `height` rows of sub-characters,
//! every row terminated by one or more *endmarks*.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::str::{self, FromStr};

use bstr::{BString, ByteSlice as _};
use fig_fonts::FontFile;
use itertools::Itertools as _;
use thiserror::Error;

use crate::render::{HorizontalLayout, LayoutDecodeError};

/// The characters every FIGfont provides, in file order
///
/// The 95 printable ASCII characters followed by the 7 Deutsch characters from Latin-1.
pub const REQUIRED_CHARACTERS: [u8; 102] = *b" !\"#$%&'()*+,-./0123456789:;<=>?@\
                                              ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`\
                                              abcdefghijklmnopqrstuvwxyz{|}~\
                                              \xc4\xd6\xdc\xe4\xf6\xfc\xdf";

/// A decoded FIGfont
#[derive(Debug)]
pub struct Font {
    header: Header,
    comments: String,
    glyphs: HashMap<u32, Glyph>,
}

impl Font {
    /// Decodes the contents of an `.flf` file, also returning any non-fatal problems.
    ///
    /// # Errors
    /// Returns `Err` if the header is unusable or a character cannot be decoded.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<(Self, Vec<FontWarning>), FontError> {
        let mut warnings = Vec::new();
        let mut lines = bytes.as_ref().lines();
        let header_line = lines.next().ok_or(HeaderError::Missing)?;
        let header = Header::decode(header_line, &mut warnings)?;
        let comments = lines
            .by_ref()
            .take(header.comment_lines)
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .join("\n");
        let mut font = Self {
            header,
            comments,
            glyphs: HashMap::new(),
        };
        font.decode_glyphs(lines, &mut warnings)?;
        Ok((font, warnings))
    }

    /// Decodes one of the fonts compiled into the binary.
    ///
    /// # Errors
    /// Only if the bundled data is corrupt, which the tests rule out.
    pub fn bundled(font: FontFile) -> Result<Self, FontError> {
        Self::from_bytes(font.as_bytes()).map(|(font, _)| font)
    }

    /// The decoded header.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// The comment lines, usually credits for the font.
    #[must_use]
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// Whether the font can draw `c`, possibly with its missing-character glyph (code 0).
    #[must_use]
    pub fn can_render(&self, c: char) -> bool {
        self.glyph(c).is_some()
    }

    pub(crate) fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs
            .get(&u32::from(c))
            .or_else(|| self.glyphs.get(&0))
    }

    fn decode_glyphs<'a>(
        &mut self,
        mut lines: impl Iterator<Item = &'a [u8]>,
        warnings: &mut Vec<FontWarning>,
    ) -> Result<(), FontError> {
        let height = self.header.height.get();
        for code in REQUIRED_CHARACTERS.map(u32::from) {
            let rows: Vec<&[u8]> = lines.by_ref().take(height).collect();
            if rows.len() < height {
                warnings.push(FontWarning::MissingRequired(self.glyphs.len()));
                return Ok(());
            }
            let glyph = Glyph::parse(&rows, code, &self.header, warnings)?;
            drop(self.glyphs.insert(code, glyph));
        }

        let mut tagged = 0;
        while let Some(tag) = lines.next() {
            if tag.trim().is_empty() {
                warnings.push(FontWarning::AfterCharacters(tag.into()));
                break;
            }
            let code = tag.split_str(" ").next().unwrap_or(tag);
            let code = str::from_utf8(code)
                .map_err(|_| FontError::InvalidCode(code.into()))
                .and_then(parse_code)?;
            let rows: Vec<&[u8]> = lines.by_ref().take(height).collect();
            if rows.len() < height {
                warnings.push(FontWarning::Truncated(code.unsigned_abs()));
                break;
            }
            // negative codes label translation tables, not characters
            if let Ok(code) = u32::try_from(code) {
                let glyph = Glyph::parse(&rows, code, &self.header, warnings)?;
                // a later definition replaces an earlier one
                drop(self.glyphs.insert(code, glyph));
            }
            tagged += 1;
        }
        if tagged < self.header.code_tag_count {
            warnings.push(FontWarning::TooFewCodeTags {
                found: tagged,
                expected: self.header.code_tag_count,
            });
        }
        Ok(())
    }
}

/// Parses a code tag in decimal, octal (leading `0`) or hexadecimal (leading `0x`).
fn parse_code(code: &str) -> Result<i64, FontError> {
    let (sign, digits) = code.strip_prefix('-').map_or((1, code), |digits| (-1, digits));
    let parsed = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse()
    };
    let code = parsed.map_err(|_| FontError::InvalidCode(code.into()))? * sign;
    if (-0x8000_0000..=0x7FFF_FFFF).contains(&code) && code != -1 {
        Ok(code)
    } else {
        Err(FontError::CodeOutOfRange(code))
    }
}

/// The first line of a FIGfont
#[derive(Debug, Clone, Copy)]
pub struct Header {
    /// Drawn as a blank, but never overlapped by neighbouring characters
    pub hardblank: Hardblank,
    /// Rows per FIGcharacter
    pub height: NonZeroUsize,
    /// Rows from the top to the baseline, ignoring descenders
    pub baseline: usize,
    /// Upper bound for the length of a row, endmarks included
    pub max_length: usize,
    /// Number of comment lines following the header
    pub comment_lines: usize,
    /// How FIGcharacters are joined horizontally
    pub horizontal_layout: HorizontalLayout,
    /// Reading order of the characters in a line
    pub print_direction: PrintDirection,
    /// Number of code-tagged characters, if given
    pub code_tag_count: usize,
}

impl Header {
    fn decode(line: &[u8], warnings: &mut Vec<FontWarning>) -> Result<Self, HeaderError> {
        let mut parameters = line.split_str(" ").filter(|parameter| !parameter.is_empty());
        let Some([signature, height, baseline, max_length, old_layout, comment_lines]) =
            parameters.next_array()
        else {
            return Err(HeaderError::TooFewParameters(line.into()));
        };
        let print_direction = parameters.next();
        let full_layout = parameters.next();
        let code_tag_count = parameters.next();

        let hardblank = signature
            .strip_prefix(b"flf2a")
            .ok_or_else(|| HeaderError::Signature(signature.into()))?;
        let Ok(&hardblank) = hardblank.iter().exactly_one() else {
            return Err(HeaderError::HardblankLength(hardblank.into()));
        };
        let hardblank = Hardblank::try_from(hardblank).map_err(HeaderError::Hardblank)?;

        let height = NonZeroUsize::new(Parameter::Height.parse(height)?)
            .ok_or(HeaderError::ZeroHeight)?;
        let baseline = Parameter::Baseline.parse(baseline).unwrap_or(height.get());
        if !(1..=height.get()).contains(&baseline) {
            warnings.push(FontWarning::Baseline { baseline, height });
        }
        let max_length = Parameter::MaxLength.parse(max_length)?;
        let old_layout = Parameter::OldLayout.parse(old_layout)?;
        let comment_lines = Parameter::CommentLines.parse(comment_lines)?;
        let print_direction = PrintDirection::decode(print_direction)?;
        let full_layout = full_layout
            .map(|full_layout| Parameter::FullLayout.parse(full_layout))
            .transpose()?;
        let code_tag_count = code_tag_count
            .map(|count| Parameter::CodeTagCount.parse(count))
            .transpose()?
            .unwrap_or(0);

        Ok(Self {
            hardblank,
            height,
            baseline,
            max_length,
            comment_lines,
            horizontal_layout: HorizontalLayout::decode(old_layout, full_layout)?,
            print_direction,
            code_tag_count,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Parameter {
    Height,
    Baseline,
    MaxLength,
    OldLayout,
    CommentLines,
    FullLayout,
    CodeTagCount,
}

impl Parameter {
    fn parse<T: FromStr>(self, bytes: &[u8]) -> Result<T, HeaderError> {
        str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| HeaderError::Parameter(self.name(), bytes.into()))
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Height => "Height",
            Self::Baseline => "Baseline",
            Self::MaxLength => "Max_Length",
            Self::OldLayout => "Old_Layout",
            Self::CommentLines => "Comment_Lines",
            Self::FullLayout => "Full_Layout",
            Self::CodeTagCount => "Codetag_Count",
        }
    }
}

/// Reading order of a line of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintDirection {
    /// Left to right
    #[default]
    LeftToRight,
    /// Right to left
    RightToLeft,
}

impl PrintDirection {
    fn decode(parameter: Option<&[u8]>) -> Result<Self, HeaderError> {
        match parameter {
            None | Some(b"0") => Ok(Self::LeftToRight),
            Some(b"1") => Ok(Self::RightToLeft),
            Some(other) => Err(HeaderError::PrintDirection(other.into())),
        }
    }
}

/// The hardblank sub-character of a font
///
/// Drawn as a blank, but treated as visible when joining characters horizontally, so it keeps
/// neighbouring characters apart. Any single byte except a blank, carriage return, newline or
/// NUL; the usual choice is `$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hardblank(char);

impl PartialEq<char> for Hardblank {
    fn eq(&self, other: &char) -> bool {
        self.0 == *other
    }
}

impl TryFrom<u8> for Hardblank {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b' ' | b'\r' | b'\n' | 0 => Err(value),
            _ => Ok(Self(char::from(value))),
        }
    }
}

/// One FIGcharacter, endmarks removed
///
/// Rows that are valid UTF-8 are decoded as such; any other row is read as Latin-1.
#[derive(Debug)]
pub(crate) struct Glyph {
    pub(crate) width: usize,
    pub(crate) rows: Vec<Vec<char>>,
}

impl Glyph {
    fn parse(
        lines: &[&[u8]],
        code: u32,
        header: &Header,
        warnings: &mut Vec<FontWarning>,
    ) -> Result<Self, FontError> {
        let mut too_long = false;
        let mut rows = lines
            .iter()
            .map(|line| {
                let mut row: Vec<char> = match str::from_utf8(line) {
                    Ok(line) => line.chars().collect(),
                    Err(_) => line.iter().copied().map(char::from).collect(),
                };
                too_long |= row.len() > header.max_length;
                let &endmark = row.last()?;
                while row.last() == Some(&endmark) {
                    drop(row.pop());
                }
                Some(row)
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(FontError::EmptyRow(code))?;
        if too_long {
            warnings.push(FontWarning::TooLong(code));
        }
        let width = match rows.iter().map(Vec::len).all_equal_value() {
            Ok(width) => width,
            Err(_) => {
                warnings.push(FontWarning::InconsistentWidth(code));
                let width = rows.iter().map(Vec::len).max().unwrap_or(0);
                for row in &mut rows {
                    row.resize(width, ' ');
                }
                width
            }
        };
        Ok(Self { width, rows })
    }
}

/// A FIGfont that cannot be decoded
#[derive(Debug, Error)]
pub enum FontError {
    /// The header line is unusable.
    #[error("bad header: {0}")]
    Header(#[from] HeaderError),
    /// A code tag is not a number.
    #[error(r#""{0}" is not a valid character code"#)]
    InvalidCode(BString),
    /// A code tag is outside the 32-bit signed range, or is -1.
    #[error("character code {0} is out of range")]
    CodeOutOfRange(i64),
    /// A row of a FIGcharacter is missing its endmark.
    #[error("empty row in the character with code {0}")]
    EmptyRow(u32),
}

/// A FIGfont header line that cannot be decoded
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The font is empty.
    #[error("missing header")]
    Missing,
    /// Fewer than the six required fields.
    #[error(r#""{0}" has too few parameters"#)]
    TooFewParameters(BString),
    /// The signature is not `flf2a`.
    #[error(r#""{0}" does not start with "flf2a""#)]
    Signature(BString),
    /// The hardblank is missing or longer than one byte.
    #[error(r#"hardblank "{0}" is not a single character"#)]
    HardblankLength(BString),
    /// The hardblank is a byte that cannot be one.
    #[error("byte {0:#04x} cannot be the hardblank")]
    Hardblank(u8),
    /// A numeric parameter cannot be parsed.
    #[error(r#""{1}" is not a valid {0}"#)]
    Parameter(&'static str, BString),
    /// The height is 0.
    #[error("height is 0")]
    ZeroHeight,
    /// The print direction is not 0 or 1.
    #[error(r#"print direction "{0}" is not 0 or 1"#)]
    PrintDirection(BString),
    /// The layout parameters are invalid or contradict each other.
    #[error(transparent)]
    Layout(#[from] LayoutDecodeError),
}

/// A problem with a FIGfont that still allows rendering
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FontWarning {
    /// The baseline is not between 1 and the height.
    #[error("baseline {baseline} is not between 1 and the height {height}")]
    Baseline {
        /// The baseline parameter
        baseline: usize,
        /// The height parameter
        height: NonZeroUsize,
    },
    /// The file ends before all 102 required characters.
    #[error("only {0} of the 102 required characters are present")]
    MissingRequired(usize),
    /// The file ends in the middle of a code-tagged character.
    #[error("the character with code {0} is cut short")]
    Truncated(u64),
    /// Fewer code-tagged characters than the header announces.
    #[error("found {found} code-tagged characters, the header announces {expected}")]
    TooFewCodeTags {
        /// Characters found
        found: usize,
        /// Characters announced
        expected: usize,
    },
    /// The rows of a character differ in width.
    #[error("the character with code {0} has rows of different widths")]
    InconsistentWidth(u32),
    /// A row is longer than `max_length`.
    #[error("the character with code {0} is longer than the maximum length")]
    TooLong(u32),
    /// Text after the last character.
    #[error("unexpected content after the characters: {0:?}")]
    AfterCharacters(BString),
}
