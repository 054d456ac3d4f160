use wtscript_core::Lang;

use crate::Stmt;

/// One parsed source file.
#[derive(Debug, Clone)]
pub struct Script {
    /// Absolute path of the file.
    pub path: String,
    pub lang: Lang,
    pub body: Vec<Stmt>,
}

impl Script {
    pub fn new(path: impl Into<String>, body: Vec<Stmt>) -> Self {
        Self {
            path: path.into(),
            lang: Lang::Script,
            body,
        }
    }
}
