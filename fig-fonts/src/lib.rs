//! `.flf` fonts compiled into [`fig`](https://crates.io/crates/fig), so that it works without any
//! FIGlet installation.

macro_rules! fonts {
    ($($name:ident => $file_name:literal,)*) => {

        /// Fonts compiled into the binary
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        pub enum FontFile {
            $(
                #[doc = concat!("Font `", $file_name, ".flf`")]
                $name,
            )*
        }

        impl FontFile {
            /// Every bundled font, sorted by name
            pub const ALL: [Self; const{0 $(+ {_ = $file_name; 1} )*}] = [$(Self::$name),*];

            /// The raw `.flf` data
            #[must_use]
            pub const fn as_bytes(self) -> &'static [u8] {
                match self {
                    $(Self::$name => include_bytes!(concat!("../fonts/", $file_name, ".flf")),)*
                }
            }

            /// The name the font is listed and requested under
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => $file_name,)*
                }
            }

            /// Finds the bundled font called `name`.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($file_name => Some(Self::$name),)*
                    _ => None,
                }
            }
        }
    };
}

fonts! {
    Bubble => "bubble",
    Digital => "digital",
    Larry3d => "larry3d",
    Slant => "slant",
    Standard => "standard",
    Term => "term",
}
