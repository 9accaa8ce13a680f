//! Small text helpers shared by the emitters.

/// Byte-offset to line/column mapping for a source text.
///
/// Built once per emission; lookups binary-search the line-start table.
/// Lines and columns are 1-based, matching `#line` directive semantics.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing the byte offset.
    pub fn line(&self, offset: usize) -> u32 {
        self.line_col(offset).0
    }

    /// 1-based (line, column) of the byte offset.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col as u32 + 1)
    }
}

/// Mangle an output filename into an include-guard macro: the basename with
/// every run of non-word characters replaced by `_`, upcased.
pub fn include_guard(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let mut guard = String::with_capacity(basename.len());
    let mut in_run = false;
    for c in basename.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            guard.push(c.to_ascii_uppercase());
            in_run = false;
        } else if !in_run {
            guard.push('_');
            in_run = true;
        }
    }
    guard
}
