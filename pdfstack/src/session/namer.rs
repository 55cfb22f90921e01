//! Output file naming.

/// Produces `dot.pdf`, `dot(1).pdf`, `dot(2).pdf`, ... for successive merges.
///
/// The counter lives only as long as the namer; it is never persisted and
/// never reset.
#[derive(Debug, Clone)]
pub struct SessionNamer {
    base: String,
    extension: String,
    completed: u64,
}

impl SessionNamer {
    /// Create a namer for `{base}.{extension}` names.
    pub fn new(base: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            extension: extension.into(),
            completed: 0,
        }
    }

    /// Name the next successful merge will get.
    pub fn peek(&self) -> String {
        match self.completed {
            0 => format!("{}.{}", self.base, self.extension),
            k => format!("{}({k}).{}", self.base, self.extension),
        }
    }

    /// Take the name for a merge that has succeeded and advance the counter.
    pub fn commit(&mut self) -> String {
        let name = self.peek();
        self.completed += 1;
        name
    }

    /// Number of merges committed so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }
}
