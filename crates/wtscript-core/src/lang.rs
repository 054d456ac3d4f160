//! Language tags carried by import targets.

use std::fmt;

/// Language of an imported file.
///
/// Only [`Lang::Script`] files are compiled by this crate. The others are
/// compiled by separate front ends and are only reported as dependency edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Lang {
    #[default]
    Script,
    Template,
    Stylesheet,
    Shader,
}

impl Lang {
    /// File extension of this language, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Lang::Script => "wts",
            Lang::Template => "wtt",
            Lang::Stylesheet => "wtcss",
            Lang::Shader => "wtsl",
        }
    }

    /// Guess a language from a path's extension.
    pub fn from_path(path: &str) -> Option<Lang> {
        let ext = path.rsplit_once('.').map(|(_, ext)| ext)?;
        [Lang::Script, Lang::Template, Lang::Stylesheet, Lang::Shader]
            .into_iter()
            .find(|lang| lang.extension() == ext)
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
