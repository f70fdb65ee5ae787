//! TemplateSource port - テンプレート本文の取得

use crate::domain::LookupError;

pub trait TemplateSource: Send + Sync {
    /// Raw text of the template file `name` (e.g. `greet.txt`).
    fn load(&self, name: &str) -> Result<String, LookupError>;
}
