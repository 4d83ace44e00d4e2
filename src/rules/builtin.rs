//! Built-in rules for common flake8 codes.
use crate::constants::MAX_LINE_LENGTH;
use crate::types::{RuleApplicationError, Violation};

use super::{split_terminator, Edit, LineContext, Rule, SafetyTier};

pub(crate) fn all() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(TrailingWhitespace),
        Box::new(BlankLineWhitespace),
        Box::new(MissingFinalNewline),
        Box::new(WhitespaceAfterBracket),
        Box::new(WhitespaceBeforeBracket),
        Box::new(ExpectedTwoBlankLines::before_definition()),
        Box::new(ExpectedTwoBlankLines::after_definition()),
        Box::new(TooManyBlankLines),
        Box::new(BlankLineAtEof),
        Box::new(LongAssignment),
        Box::new(UnusedImport),
    ]
}

fn is_hspace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn indent_of(body: &str) -> &str {
    &body[..body.len() - body.trim_start().len()]
}

/// Walk `body` outside string literals, calling `f(byte_index, char)` for each char.
fn for_each_code_char(body: &str, mut f: impl FnMut(usize, char)) {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '#' {
                    return;
                }
                if c == '\'' || c == '"' {
                    quote = Some(c);
                } else {
                    f(i, c);
                }
            }
        }
    }
}

/// W291: trailing whitespace.
pub struct TrailingWhitespace;

impl Rule for TrailingWhitespace {
    fn code(&self) -> &str {
        "W291"
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Trivial
    }
    fn apply(
        &self,
        line: &str,
        _v: &Violation,
        _cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        let (body, term) = split_terminator(line);
        let trimmed = body.trim_end_matches(|c: char| is_hspace(c) || c == '\x0c');
        if trimmed.len() == body.len() {
            return Ok(None);
        }
        Ok(Some(Edit::replace(format!("{trimmed}{term}"))))
    }
}

/// W293: whitespace on an otherwise blank line.
pub struct BlankLineWhitespace;

impl Rule for BlankLineWhitespace {
    fn code(&self) -> &str {
        "W293"
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Trivial
    }
    fn apply(
        &self,
        line: &str,
        _v: &Violation,
        _cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        let (body, term) = split_terminator(line);
        if body.is_empty() || !body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Edit::replace(term)))
    }
}

/// W292: no newline at end of file.
pub struct MissingFinalNewline;

impl Rule for MissingFinalNewline {
    fn code(&self) -> &str {
        "W292"
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Trivial
    }
    fn apply(
        &self,
        line: &str,
        _v: &Violation,
        cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        if !cx.is_last() || line.is_empty() || line.ends_with('\n') {
            return Ok(None);
        }
        Ok(Some(Edit::replace(format!("{line}\n"))))
    }
}

/// E201: whitespace after `(`, `[` or `{`.
pub struct WhitespaceAfterBracket;

impl Rule for WhitespaceAfterBracket {
    fn code(&self) -> &str {
        "E201"
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Trivial
    }
    fn apply(
        &self,
        line: &str,
        _v: &Violation,
        _cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        let (body, term) = split_terminator(line);
        let bytes = body.as_bytes();
        // Byte ranges of whitespace runs that follow an opening bracket
        let mut cut: Vec<(usize, usize)> = Vec::new();
        for_each_code_char(body, |i, c| {
            if matches!(c, '(' | '[' | '{') {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
                    end += 1;
                }
                // A run that reaches the end of the line or a comment is not E201
                if end > start && end < bytes.len() && bytes[end] != b'#' {
                    cut.push((start, end));
                }
            }
        });
        Ok(remove_ranges(body, term, &cut))
    }
}

/// E202: whitespace before `)`, `]` or `}`.
pub struct WhitespaceBeforeBracket;

impl Rule for WhitespaceBeforeBracket {
    fn code(&self) -> &str {
        "E202"
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Trivial
    }
    fn apply(
        &self,
        line: &str,
        _v: &Violation,
        _cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        let (body, term) = split_terminator(line);
        let bytes = body.as_bytes();
        let indent = indent_of(body).len();
        let mut cut: Vec<(usize, usize)> = Vec::new();
        for_each_code_char(body, |i, c| {
            if matches!(c, ')' | ']' | '}') && i > indent {
                let end = i;
                let mut start = end;
                while start > indent && (bytes[start - 1] == b' ' || bytes[start - 1] == b'\t') {
                    start -= 1;
                }
                // Keep the space in `x, )`
                if start < end && start > indent && bytes[start - 1] != b',' {
                    cut.push((start, end));
                }
            }
        });
        Ok(remove_ranges(body, term, &cut))
    }
}

fn remove_ranges(body: &str, term: &str, cut: &[(usize, usize)]) -> Option<Edit> {
    if cut.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(body.len() + term.len());
    let mut pos = 0;
    for &(start, end) in cut {
        out.push_str(&body[pos..start]);
        pos = end;
    }
    out.push_str(&body[pos..]);
    out.push_str(term);
    Some(Edit::replace(out))
}

fn starts_definition(stripped: &str) -> bool {
    ["def ", "class ", "async def ", "@"]
        .iter()
        .any(|p| stripped.starts_with(p))
}

/// E302 / E305: expected two blank lines before a definition, or after one ends.
pub struct ExpectedTwoBlankLines {
    code: &'static str,
    after: bool,
}

impl ExpectedTwoBlankLines {
    pub fn before_definition() -> Self {
        Self {
            code: "E302",
            after: false,
        }
    }

    pub fn after_definition() -> Self {
        Self {
            code: "E305",
            after: true,
        }
    }
}

impl Rule for ExpectedTwoBlankLines {
    fn code(&self) -> &str {
        self.code
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Structural
    }
    fn apply(
        &self,
        line: &str,
        _v: &Violation,
        cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        let (body, _) = split_terminator(line);
        if body.trim().is_empty() || body.contains('\n') || cx.is_first() {
            return Ok(None);
        }
        let applies = if self.after {
            indent_of(body).is_empty()
        } else {
            starts_definition(body.trim_start())
        };
        let blank = cx.blank_lines_before();
        if !applies || blank >= 2 {
            return Ok(None);
        }
        Ok(Some(Edit::replace(format!("{}{line}", "\n".repeat(2 - blank)))))
    }
}

/// E303: too many blank lines.
pub struct TooManyBlankLines;

impl Rule for TooManyBlankLines {
    fn code(&self) -> &str {
        "E303"
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Structural
    }
    fn apply(
        &self,
        line: &str,
        _v: &Violation,
        cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        let (body, _) = split_terminator(line);
        if body.trim().is_empty() {
            return Ok(None);
        }
        let allowed = if indent_of(body).is_empty() { 2 } else { 1 };
        let blank = cx.blank_lines_before();
        if blank <= allowed {
            return Ok(None);
        }
        Ok(Some(
            Edit::replace(line).clearing_blank_before(blank - allowed),
        ))
    }
}

/// W391: blank line at end of file.
pub struct BlankLineAtEof;

impl Rule for BlankLineAtEof {
    fn code(&self) -> &str {
        "W391"
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Structural
    }
    fn apply(
        &self,
        line: &str,
        _v: &Violation,
        cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        if line.is_empty() || !line.trim().is_empty() || !cx.rest_blank() {
            return Ok(None);
        }
        Ok(Some(
            Edit::replace("").clearing_blank_before(cx.blank_lines_before()),
        ))
    }
}

/// Byte index of the first plain assignment `=` (not `==`, `<=`, `+=`, ...).
fn assignment_eq(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut found = None;
    for_each_code_char(body, |i, c| {
        if found.is_some() || c != '=' {
            return;
        }
        let prev = if i > 0 { bytes[i - 1] } else { b' ' };
        let next = bytes.get(i + 1).copied().unwrap_or(b' ');
        if next != b'=' && !b"=!<>+-*/%&|^:@".contains(&prev) {
            found = Some(i);
        }
    });
    found
}

/// E501: line too long. Splits a simple assignment after `=` with a continuation.
pub struct LongAssignment;

impl Rule for LongAssignment {
    fn code(&self) -> &str {
        "E501"
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::ContentAltering
    }
    fn apply(
        &self,
        line: &str,
        _v: &Violation,
        _cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        let (body, term) = split_terminator(line);
        if body.contains('\n') || body.chars().count() <= MAX_LINE_LENGTH {
            return Ok(None);
        }
        let stripped = body.trim_start();
        if stripped.starts_with("import ")
            || stripped.starts_with("from ")
            || body.trim_end().ends_with('\\')
        {
            return Ok(None);
        }
        let Some(eq) = assignment_eq(body) else {
            return Ok(None);
        };
        let lhs = body[..eq].trim();
        let rhs = body[eq + 1..].trim();
        if lhs.is_empty()
            || rhs.is_empty()
            || lhs.chars().count() >= 40
            || lhs.contains(['(', '[', '{', '"', '\''])
        {
            return Ok(None);
        }
        let indent = indent_of(body);
        Ok(Some(Edit::replace(format!(
            "{indent}{lhs} = \\\n{indent}    {rhs}{term}"
        ))))
    }
}

/// First quoted name in a message such as `'os.path' imported but unused`.
fn quoted_name(message: &str) -> Option<&str> {
    let start = message.find(['\'', '"'])?;
    let q = message[start..].chars().next()?;
    let rest = &message[start + 1..];
    let end = rest.find(q)?;
    Some(&rest[..end])
}

/// F401: module imported but unused. Removes a top-level single-name import line.
pub struct UnusedImport;

impl Rule for UnusedImport {
    fn code(&self) -> &str {
        "F401"
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::ContentAltering
    }
    fn apply(
        &self,
        line: &str,
        v: &Violation,
        _cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        let (body, _) = split_terminator(line);
        if body.contains('\n') || !indent_of(body).is_empty() {
            return Ok(None);
        }
        let stmt = body.split_whitespace().collect::<Vec<_>>().join(" ");
        if !(stmt.starts_with("import ") || stmt.starts_with("from ")) {
            return Ok(None);
        }
        let name = quoted_name(&v.message).ok_or_else(|| RuleApplicationError::Rejected {
            code: "F401".into(),
            reason: "message does not name the unused import".into(),
        })?;
        if stmt.contains([',', '(', '\\', ';']) {
            return Ok(None);
        }
        let matches = if let Some(module) = stmt.strip_prefix("import ") {
            module == name
        } else if let Some((module, item)) = stmt
            .strip_prefix("from ")
            .and_then(|r| r.split_once(" import "))
        {
            item == name || format!("{module}.{item}") == name
        } else {
            false
        };
        Ok(matches.then(|| Edit::replace("")))
    }
}
