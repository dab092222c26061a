//! Font discovery
//!
//! A font is available if it is compiled into the binary ([`FontFile`]) or is an `.flf` file
//! somewhere below one of the font directories. The font name is the file stem, so
//! `/usr/share/figlet/slant.flf` provides `slant`. A font file takes precedence over the bundled
//! font of the same name.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use fig_fonts::FontFile;
use log::debug;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::Setting;

/// Directories searched when `FIGLET_FONTDIR` is not set; missing ones are skipped.
pub const SYSTEM_FONT_DIRS: [&str; 4] = [
    "/usr/share/figlet",
    "/usr/local/share/figlet",
    "/usr/share/figlet/fonts",
    "/opt/homebrew/share/figlet/fonts",
];

/// Enumerates and finds available fonts
pub trait FontCatalog {
    /// All available font names, sorted and without duplicates.
    ///
    /// # Errors
    /// Returns `Err` if the fonts cannot be enumerated.
    fn list_fonts(&self) -> Result<Vec<String>, CatalogError>;

    /// Where the font called `name` is, if it is one of the
    /// [listed](FontCatalog::list_fonts) fonts.
    ///
    /// # Errors
    /// Returns `Err` if the fonts cannot be enumerated.
    fn locate(&self, name: &str) -> Result<Option<FontSource>, CatalogError>;
}

/// Where the data for a font comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A font compiled into the binary
    Bundled(FontFile),
    /// An `.flf` file
    File(PathBuf),
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled(file) => f.write_str(file.name()),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The font search path
#[derive(Debug, Clone)]
pub struct FontDirs {
    dirs: Vec<PathBuf>,
    required: bool,
}

impl FontDirs {
    /// Searches the given directories, which must all exist.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            required: true,
        }
    }

    /// Searches [`SYSTEM_FONT_DIRS`], skipping those that do not exist.
    #[must_use]
    pub fn system() -> Self {
        Self {
            dirs: SYSTEM_FONT_DIRS.iter().map(PathBuf::from).collect(),
            required: false,
        }
    }

    /// Uses `FIGLET_FONTDIR` from the process environment, see [`FontDirs::from_lookup`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Searches the directories listed in `FIGLET_FONTDIR` (separated like `PATH`) if it is set
    /// and non-empty, otherwise the [system directories](FontDirs::system).
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match Setting::FontDir.read(lookup) {
            Some(paths) => Self::new(env::split_paths(&paths)),
            None => Self::system(),
        }
    }

    /// The directories searched, in order of precedence.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn scan(&self) -> Result<BTreeMap<String, FontSource>, CatalogError> {
        let mut fonts = BTreeMap::new();
        for dir in &self.dirs {
            if !dir.is_dir() {
                if self.required {
                    return Err(CatalogError::MissingDir(dir.clone()));
                }
                debug!("skipping missing font directory {}", dir.display());
                continue;
            }
            for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
                let entry = entry.map_err(|source| CatalogError::Walk {
                    dir: dir.clone(),
                    source,
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(name) = font_name(entry.path()) else {
                    continue;
                };
                fonts
                    .entry(name)
                    .or_insert_with(|| FontSource::File(entry.into_path()));
            }
        }
        debug!("found {} font files in {:?}", fonts.len(), self.dirs);
        for file in FontFile::ALL {
            fonts
                .entry(file.name().to_owned())
                .or_insert(FontSource::Bundled(file));
        }
        Ok(fonts)
    }
}

impl FontCatalog for FontDirs {
    fn list_fonts(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.scan()?.into_keys().collect())
    }

    fn locate(&self, name: &str) -> Result<Option<FontSource>, CatalogError> {
        Ok(self.scan()?.remove(name))
    }
}

fn font_name(path: &Path) -> Option<String> {
    let is_flf = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("flf"));
    if !is_flf {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_owned)
}

/// A font directory that cannot be searched
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A directory from `FIGLET_FONTDIR` does not exist.
    #[error("font directory {} does not exist", .0.display())]
    MissingDir(PathBuf),
    /// A directory could not be read while searching for fonts.
    #[error("failed to search font directory {}", .dir.display())]
    Walk {
        /// The font directory being searched
        dir: PathBuf,
        /// The underlying error
        #[source]
        source: walkdir::Error,
    },
}
