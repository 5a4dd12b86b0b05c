//! Inline markup: emphasis, code spans, links and inline images.

use crate::diagnostics::{Diagnostic, DiagnosticKind};

use super::types::{runs_text, TextRun};

/// Split `text` into runs with flat bold/italic flags.
///
/// Markers without a matching close stay literal. Whitespace at the edges of
/// an emphasized span is moved into neighbouring plain runs.
pub fn parse_inline(text: &str, line: usize, diagnostics: &mut Vec<Diagnostic>) -> Vec<TextRun> {
    let chars: Vec<char> = text.chars().collect();
    let mut runs = RunBuilder::default();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match c {
            '\\' if next.is_some_and(|n| n.is_ascii_punctuation()) => {
                runs.push_char(chars[i + 1]);
                i += 2;
            }
            '`' => match find_char(&chars, i + 1, '`') {
                Some(end) => {
                    runs.push_str(&chars[i + 1..end].iter().collect::<String>());
                    i = end + 1;
                }
                None => {
                    runs.push_char('`');
                    i += 1;
                }
            },
            '!' if next == Some('[') => match match_link(&chars, i + 1) {
                Some(link) => {
                    let target: String = chars[link.target.0..link.target.1].iter().collect();
                    diagnostics.push(Diagnostic::at_line(
                        DiagnosticKind::ImageDropped,
                        line,
                        format!("inline image '{target}' removed"),
                    ));
                    i = link.end;
                }
                None => {
                    runs.push_char('!');
                    i += 1;
                }
            },
            '[' => match match_link(&chars, i) {
                Some(link) => {
                    runs.push_str(&chars[link.label.0..link.label.1].iter().collect::<String>());
                    i = link.end;
                }
                None => {
                    runs.push_char('[');
                    i += 1;
                }
            },
            '*' | '_' if next == Some(c) => {
                if runs.bold == Some(c) {
                    runs.set_bold(None);
                } else if runs.bold.is_none()
                    && (c == '*' || left_boundary(&chars, i))
                    && has_double_closer(&chars, i + 2, c)
                {
                    runs.set_bold(Some(c));
                } else {
                    runs.push_char(c);
                    runs.push_char(c);
                }
                i += 2;
            }
            '*' | '_' => {
                if runs.italic == Some(c) {
                    runs.set_italic(None);
                } else if runs.italic.is_none() && opens_italic(&chars, i, c) {
                    runs.set_italic(Some(c));
                } else {
                    runs.push_char(c);
                }
                i += 1;
            }
            other => {
                runs.push_char(other);
                i += 1;
            }
        }
    }

    runs.finish()
}

/// Display text of `text` with all inline markup removed.
pub fn plain_text(text: &str, line: usize, diagnostics: &mut Vec<Diagnostic>) -> String {
    runs_text(&parse_inline(text, line, diagnostics))
}

#[derive(Default)]
struct RunBuilder {
    runs: Vec<TextRun>,
    buf: String,
    bold: Option<char>,
    italic: Option<char>,
}

impl RunBuilder {
    fn push_char(&mut self, c: char) {
        self.buf.push(c);
    }

    fn push_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn set_bold(&mut self, marker: Option<char>) {
        self.flush();
        self.bold = marker;
    }

    fn set_italic(&mut self, marker: Option<char>) {
        self.flush();
        self.italic = marker;
    }

    fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buf);
        let (bold, italic) = (self.bold.is_some(), self.italic.is_some());

        if (!bold && !italic) || text.trim().is_empty() {
            self.append(TextRun::plain(text));
            return;
        }

        let core_start = text.len() - text.trim_start().len();
        let core_end = text.trim_end().len();
        self.append(TextRun::plain(&text[..core_start]));
        self.append(TextRun {
            text: text[core_start..core_end].to_string(),
            bold,
            italic,
        });
        self.append(TextRun::plain(&text[core_end..]));
    }

    fn append(&mut self, run: TextRun) {
        if run.text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut() {
            if last.bold == run.bold && last.italic == run.italic {
                last.text.push_str(&run.text);
                return;
            }
        }
        self.runs.push(run);
    }

    fn finish(mut self) -> Vec<TextRun> {
        self.flush();
        self.runs
    }
}

struct Link {
    label: (usize, usize),
    target: (usize, usize),
    end: usize,
}

/// `[label](target)` starting at `start` (which holds `[`).
fn match_link(chars: &[char], start: usize) -> Option<Link> {
    let close = find_char(chars, start + 1, ']')?;
    if chars.get(close + 1) != Some(&'(') {
        return None;
    }
    let paren = find_char(chars, close + 2, ')')?;
    Some(Link {
        label: (start + 1, close),
        target: (close + 2, paren),
        end: paren + 1,
    })
}

fn find_char(chars: &[char], from: usize, target: char) -> Option<usize> {
    (from..chars.len()).find(|&j| chars[j] == target)
}

fn left_boundary(chars: &[char], i: usize) -> bool {
    i == 0 || !chars[i - 1].is_alphanumeric()
}

fn right_boundary(chars: &[char], i: usize) -> bool {
    chars.get(i).map_or(true, |c| !c.is_alphanumeric())
}

/// End of the escape, code span, link or image starting at `j`. Closers
/// inside these never count, since the main loop consumes them whole.
fn opaque_end(chars: &[char], j: usize) -> Option<usize> {
    match chars[j] {
        '\\' if chars.get(j + 1).is_some_and(|n| n.is_ascii_punctuation()) => Some(j + 2),
        '`' => find_char(chars, j + 1, '`').map(|end| end + 1),
        '!' if chars.get(j + 1) == Some(&'[') => match_link(chars, j + 1).map(|link| link.end),
        '[' => match_link(chars, j).map(|link| link.end),
        _ => None,
    }
}

fn has_double_closer(chars: &[char], from: usize, c: char) -> bool {
    let mut j = from;
    while j + 1 < chars.len() {
        if let Some(end) = opaque_end(chars, j) {
            j = end;
        } else if chars[j] == c && chars[j + 1] == c {
            return true;
        } else {
            j += 1;
        }
    }
    false
}

/// A single `*`/`_` opens emphasis only when a lone closer follows.
fn opens_italic(chars: &[char], i: usize, c: char) -> bool {
    match chars.get(i + 1) {
        Some(n) if !n.is_whitespace() => {}
        _ => return false,
    }
    if c == '_' && !left_boundary(chars, i) {
        return false;
    }

    let mut j = i + 1;
    while j < chars.len() {
        if let Some(end) = opaque_end(chars, j) {
            j = end;
            continue;
        }
        if chars[j] == c {
            if chars.get(j + 1) == Some(&c) {
                j += 2;
                continue;
            }
            let closes = !chars[j - 1].is_whitespace() && (c == '*' || right_boundary(chars, j + 1));
            if closes {
                return true;
            }
        }
        j += 1;
    }
    false
}
