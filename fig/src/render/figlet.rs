use std::fs;
use std::iter::repeat_n;

use itertools::{izip, Itertools as _};
use log::debug;

use super::{ArtRenderer, HorizontalLayout, LayoutMode, RenderError};
use crate::catalog::FontSource;
use crate::font::{Font, Hardblank, PrintDirection};
use crate::str_ext::RowExt as _;

/// Characters that end a line of FIGcharacters: newline, carriage return, vertical tab and form
/// feed. A carriage return directly followed by a newline ends one line only.
const LINE_BREAKS: [char; 4] = ['\n', '\r', '\x0b', '\x0c'];

/// Lays out text with one font
///
/// Horizontally, FIGcharacters are joined according to the font's layout: side by side, fitted
/// until they touch, or smushed into each other. Lines of FIGcharacters are stacked at full
/// height.
///
/// ```
/// # use fig::font::Font;
/// # use fig::render::Renderer;
/// # use fig_fonts::FontFile;
/// let font = Font::bundled(FontFile::Standard)?;
/// let art = Renderer::new(&font).render("Hi");
/// let expected = concat!(
///     r" _   _ _ ", "\n",
///     r"| | | (_)", "\n",
///     r"| |_| | |", "\n",
///     r"|  _  | |", "\n",
///     r"|_| |_|_|", "\n",
///     r"         ",
/// );
/// assert_eq!(art, expected);
/// # Ok::<(), fig::font::FontError>(())
/// ```
#[must_use]
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'font> {
    font: &'font Font,
    layout: HorizontalLayout,
    direction: PrintDirection,
    max_width: Option<usize>,
}

impl<'font> Renderer<'font> {
    /// Creates a renderer with the layout and print direction of `font` and no width limit.
    pub const fn new(font: &'font Font) -> Self {
        let header = font.header();
        Self {
            font,
            layout: header.horizontal_layout,
            direction: header.print_direction,
            max_width: None,
        }
    }

    /// Sets the print direction.
    pub const fn print_direction(mut self, direction: PrintDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Limits the width of the output, in sub-characters.
    ///
    /// A line that would be wider is broken after its last run of blanks, or else between
    /// FIGcharacters. A single FIGcharacter wider than `width` still gets a line of its own.
    pub const fn max_width(mut self, width: Option<usize>) -> Self {
        self.max_width = width;
        self
    }

    /// Renders `text`, one row of sub-characters per output line.
    ///
    /// Every row is padded to the width of the widest line. Tabs are drawn as blanks, and
    /// characters the font lacks are skipped.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n");
        let mut string = text.as_str();
        let mut lines = Vec::new();
        let mut width = 0;
        while !string.is_empty() {
            let (line, line_width, rest) = self.render_line(string);
            lines.push(line);
            width = width.max(line_width);
            string = rest;
        }
        let hardblank = self.font.header().hardblank;
        lines
            .into_iter()
            .flatten()
            .map(|mut row| {
                row.resize(width.max(row.len()), ' ');
                let row = row
                    .into_iter()
                    .map(|c| if hardblank == c { ' ' } else { c });
                match self.direction {
                    PrintDirection::LeftToRight => row.collect::<String>(),
                    PrintDirection::RightToLeft => row.rev().collect(),
                }
            })
            .join("\n")
    }

    fn render_line<'a>(&self, mut string: &'a str) -> (Vec<Vec<char>>, usize, &'a str) {
        let mut line: Vec<Vec<char>> = vec![Vec::new(); self.font.header().height.get()];
        let mut width = 0;
        let mut chars = string.chars();
        let mut before_space = None;
        let mut saved = false;
        let mut overfull = false;
        while let Some(c) = chars.next() {
            let c = if c == '\t' { ' ' } else { c };
            if c == ' ' && !saved {
                before_space = Some((line.clone(), width, string));
                saved = true;
            }
            if LINE_BREAKS.contains(&c) {
                string = chars.as_str();
                break;
            }
            if !self.append(&mut line, &mut width, c) {
                overfull = true;
                break;
            }
            string = chars.as_str();
            if c != ' ' {
                saved = false;
            }
        }
        if overfull {
            if let Some(saved) = before_space {
                (line, width, string) = saved;
                string = string.trim_start_matches([' ', '\t']);
            }
        }
        if self.fitted() {
            let end_trim = trimming(line.iter().map(|row| row.iter().rev().copied()));
            width -= end_trim;
            for row in &mut line {
                row.truncate(row.len() - end_trim);
            }
        }
        (line, width, string)
    }

    /// Adds `c` to the end of `line`, returning false if it does not fit within the width limit.
    fn append(&self, line: &mut [Vec<char>], width: &mut usize, c: char) -> bool {
        let Some(glyph) = self.font.glyph(c) else {
            return true;
        };
        let smush_data = self.row_smush_data(line, &glyph.rows);
        let (shift, trim) = if self.fitted() {
            let shift = smush_data
                .iter()
                .map(|row| row.shift(*width, glyph.width))
                .min()
                .unwrap_or_else(|| (*width).min(glyph.width));
            let trim = trimming(
                glyph
                    .rows
                    .iter()
                    .map(|row| row.bidi_chars(self.direction).rev()),
            );
            (shift, trim)
        } else {
            (0, 0)
        };
        if *width > 0
            && self.max_width.is_some_and(|max_width| {
                (*width + glyph.width).saturating_sub(trim + shift) > max_width
            })
        {
            return false;
        }
        *width = *width + glyph.width - shift;
        for (buffer_row, glyph_row, smush) in izip!(line, &glyph.rows, smush_data) {
            smush.combine(shift, buffer_row, glyph_row, self.direction);
        }
        true
    }

    fn row_smush_data(&self, buffer: &[Vec<char>], glyph_rows: &[Vec<char>]) -> Vec<RowSmush> {
        buffer
            .iter()
            .zip(glyph_rows)
            .map(|(end, start)| {
                let end = RowSmush::count_blanks(end.iter().rev().copied());
                let start = RowSmush::count_blanks(start.bidi_chars(self.direction));
                RowSmush::new(end, start, self.layout, self.font.header().hardblank)
            })
            .collect()
    }

    fn fitted(&self) -> bool {
        self.layout.mode() != LayoutMode::FullSize
    }
}

/// The number of blank columns shared by all rows, counted from the start of each row.
fn trimming(line: impl IntoIterator<Item = impl IntoIterator<Item = char>>) -> usize {
    line.into_iter()
        .map(|row| row.into_iter().take_while(|&c| c == ' ').count())
        .min()
        .unwrap_or(0)
}

/// How one row of the line so far meets the same row of the next FIGcharacter
#[derive(Debug)]
enum RowSmush {
    /// The new row is blank.
    Keep { end_blanks: usize },
    /// The row so far is blank.
    Overwrite { start_blanks: usize },
    Smush {
        end_blanks: usize,
        start_blanks: usize,
        smush: Option<char>,
    },
}

impl RowSmush {
    fn new(
        end: (usize, Option<char>),
        start: (usize, Option<char>),
        layout: HorizontalLayout,
        hardblank: Hardblank,
    ) -> Self {
        match (end.1, start.1) {
            (_, None) => Self::Keep { end_blanks: end.0 },
            (None, _) => Self::Overwrite {
                start_blanks: start.0,
            },
            (Some(end_char), Some(start_char)) => Self::Smush {
                end_blanks: end.0,
                start_blanks: start.0,
                smush: layout.smush(end_char, start_char, hardblank),
            },
        }
    }

    /// How far the next FIGcharacter may move into the line, as seen from this row.
    fn shift(&self, end: usize, start: usize) -> usize {
        match self {
            Self::Keep { end_blanks } => end_blanks + start,
            Self::Overwrite { start_blanks } => end + start_blanks,
            Self::Smush {
                end_blanks,
                start_blanks,
                smush,
            } => end_blanks + start_blanks + usize::from(smush.is_some()),
        }
    }

    fn combine(
        &self,
        shift: usize,
        buffer_row: &mut Vec<char>,
        glyph_row: &[char],
        direction: PrintDirection,
    ) {
        match self {
            Self::Keep { .. } => {
                if glyph_row.len() <= shift {
                    buffer_row.truncate(buffer_row.len() + glyph_row.len() - shift);
                } else {
                    buffer_row.extend(repeat_n(' ', glyph_row.len() - shift));
                }
            }
            Self::Overwrite { .. } => {
                let skip = shift.saturating_sub(buffer_row.len());
                buffer_row.truncate(buffer_row.len().saturating_sub(shift));
                buffer_row.extend(glyph_row.bidi_chars(direction).skip(skip));
            }
            &Self::Smush {
                end_blanks,
                start_blanks,
                smush: Some(smush),
            } if shift > start_blanks + end_blanks => {
                buffer_row.truncate(buffer_row.len() - end_blanks - 1);
                buffer_row.push(smush);
                buffer_row.extend(glyph_row.bidi_chars(direction).skip(start_blanks + 1));
            }
            &Self::Smush { start_blanks, .. } => {
                if shift <= start_blanks {
                    buffer_row.extend(glyph_row.bidi_chars(direction).skip(shift));
                } else {
                    buffer_row.truncate(buffer_row.len() + start_blanks - shift);
                    buffer_row.extend(glyph_row.bidi_chars(direction).skip(start_blanks));
                }
            }
        }
    }

    fn count_blanks(chars: impl Iterator<Item = char>) -> (usize, Option<char>) {
        let mut blanks = 0;
        for c in chars {
            if c == ' ' {
                blanks += 1;
            } else {
                return (blanks, Some(c));
            }
        }
        (blanks, None)
    }
}

/// [`ArtRenderer`] for FIGfonts, wrapping lines at a maximum width
#[derive(Debug, Clone, Copy)]
pub struct Figlet {
    max_width: Option<usize>,
}

impl Figlet {
    /// Width that output lines are wrapped at, unless changed with [`Figlet::max_width`]
    pub const DEFAULT_WIDTH: usize = 80;

    /// Creates a renderer wrapping at [`Figlet::DEFAULT_WIDTH`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_width: Some(Self::DEFAULT_WIDTH),
        }
    }

    /// Sets the width that lines are wrapped at, or disables wrapping with `None`.
    #[must_use]
    pub const fn max_width(mut self, width: Option<usize>) -> Self {
        self.max_width = width;
        self
    }

    /// Loads and decodes the font at `source`.
    ///
    /// # Errors
    /// Returns `Err` if the font file cannot be read or is not a valid FIGfont.
    pub fn load(&self, source: &FontSource) -> Result<Font, RenderError> {
        let decoded = match source {
            FontSource::Bundled(file) => Font::from_bytes(file.as_bytes()),
            FontSource::File(path) => {
                debug!("loading font from {}", path.display());
                let bytes = fs::read(path).map_err(|source| RenderError::ReadFont {
                    path: path.clone(),
                    source,
                })?;
                Font::from_bytes(bytes)
            }
        };
        let (font, warnings) = decoded.map_err(|error| RenderError::DecodeFont {
            font: source.to_string(),
            source: error,
        })?;
        for warning in warnings {
            debug!("{source}: {warning}");
        }
        Ok(font)
    }
}

impl Default for Figlet {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtRenderer for Figlet {
    fn render_text(&self, font: &FontSource, text: &str) -> Result<String, RenderError> {
        let figfont = self.load(font)?;
        let mut drawable = text.chars().filter(|c| !LINE_BREAKS.contains(c)).peekable();
        if drawable.peek().is_some() && !drawable.any(|c| figfont.can_render(c) || c == '\t') {
            return Err(RenderError::Unrenderable {
                font: font.to_string(),
                text: text.to_owned(),
            });
        }
        Ok(Renderer::new(&figfont)
            .max_width(self.max_width)
            .render(text))
    }
}
