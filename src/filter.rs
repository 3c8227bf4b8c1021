//! Importance filter: keeps processes whose name or command line mentions a
//! configured keyword.

use crate::collectors::ProcessSnapshot;

#[derive(Debug, Clone)]
pub struct ImportanceFilter {
    /// Lowercased, non-empty
    keywords: Vec<String>,
}

impl ImportanceFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_important(&self, proc_: &ProcessSnapshot) -> bool {
        let name = proc_.name.to_lowercase();
        let cmd = proc_.cmdline.to_lowercase();
        self.keywords
            .iter()
            .any(|k| name.contains(k.as_str()) || cmd.contains(k.as_str()))
    }
}
