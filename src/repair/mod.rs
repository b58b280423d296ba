//! Quote-corruption repair.
//!
//! A lexer-level scanner walks the text, skipping comments, template literals (including
//! nested `${}` code), regex literals and ordinary strings. Only quote runs that open a string
//! literal at a value position are candidates for a fix, so prose that happens to contain
//! repeated quotes is left alone.
//!
//! Every fix deletes at least one quote character and passes repeat until none applies, so
//! the output is a fixed point: `repair(&repair(t).text).fix_count == 0`.

use serde::Serialize;
use std::fmt;

/// Result of [`repair`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RepairOutcome {
    /// Repaired text.
    pub text: String,
    /// Number of fixes applied across all passes.
    pub fix_count: usize,
    /// Individual fixes in application order.
    pub fixes: Vec<RepairFix>,
}

impl RepairOutcome {
    /// Human-readable audit lines, one per fix.
    pub fn audit(&self) -> Vec<String> {
        self.fixes.iter().map(ToString::to_string).collect()
    }
}

/// One applied fix. `offset` refers to the text as it was at the start of the pass that
/// applied the fix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RepairFix {
    /// Byte offset of the first removed character.
    pub offset: usize,
    /// Literal text before the fix.
    pub before: String,
    /// Literal text after the fix.
    pub after: String,
    /// Which rule fired.
    pub rule: RepairRule,
}

impl fmt::Display for RepairFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at byte {}: {} -> {}",
            self.rule, self.offset, self.before, self.after
        )
    }
}

/// Repair rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairRule {
    /// `''text'` becomes `'text'`.
    DoubledOpeningQuote,
    /// Three or more quotes collapse to one, or to `''` before a terminator.
    QuoteRun,
    /// `'text''` before a terminator becomes `'text'`.
    StrayTrailingQuote,
}

impl fmt::Display for RepairRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DoubledOpeningQuote => "collapsed doubled opening quote",
            Self::QuoteRun => "collapsed quote run",
            Self::StrayTrailingQuote => "dropped stray trailing quote",
        })
    }
}

/// Repair malformed string-literal quoting until no rule applies.
pub fn repair(text: &str) -> RepairOutcome {
    let mut current = text.to_owned();
    let mut fixes = Vec::new();
    let mut passes = 0usize;
    loop {
        let pass = Scanner::new(&current).run();
        if pass.is_empty() {
            break;
        }
        passes += 1;
        let next = apply(&current, &pass);
        fixes.extend(pass.into_iter().map(|p| p.fix));
        current = next;
    }
    tracing::debug!(passes, fixes = fixes.len(), "repair converged");
    RepairOutcome {
        text: current,
        fix_count: fixes.len(),
        fixes,
    }
}

struct Deletion {
    start: usize,
    end: usize,
    fix: RepairFix,
}

fn apply(text: &str, deletions: &[Deletion]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at = 0;
    for d in deletions {
        out.push_str(&text[at..d.start]);
        at = d.end;
    }
    out.push_str(&text[at..]);
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Code { depth: u32 },
    Template,
}

/// Last significant token seen in code.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    Punct(u8),
    Word(WordClass),
    Operand,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum WordClass {
    Return,
    OperandKeyword,
    Other,
}

fn is_terminator(b: Option<u8>) -> bool {
    matches!(
        b,
        None | Some(b',' | b';' | b')' | b']' | b'}' | b'\n' | b'\r')
    )
}

fn is_content(b: Option<u8>) -> bool {
    !is_terminator(b)
        && !matches!(
            b,
            Some(
                b' ' | b'\t'
                    | b'+'
                    | b':'
                    | b'?'
                    | b'&'
                    | b'|'
                    | b'='
                    | b'<'
                    | b'>'
                    | b'.'
            )
        )
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    stack: Vec<Ctx>,
    last: Last,
    out: Vec<Deletion>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            stack: vec![Ctx::Code { depth: 0 }],
            last: Last::Start,
            out: Vec::new(),
        }
    }

    fn at(&self, i: usize) -> Option<u8> {
        self.bytes.get(i).copied()
    }

    fn run(mut self) -> Vec<Deletion> {
        while self.pos < self.bytes.len() {
            match self.stack.last().copied() {
                Some(Ctx::Template) => self.template_step(),
                Some(Ctx::Code { .. }) | None => self.code_step(),
            }
        }
        self.out
    }

    fn value_position(&self) -> bool {
        match self.last {
            Last::Start => true,
            Last::Punct(p) => matches!(
                p,
                b':' | b'=' | b'(' | b',' | b'[' | b'?' | b'{' | b'!' | b'&' | b'|' | b'+'
            ),
            Last::Word(w) => w == WordClass::Return,
            Last::Operand => false,
        }
    }

    fn regex_allowed(&self) -> bool {
        match self.last {
            Last::Start => true,
            Last::Punct(p) => !matches!(p, b')' | b']' | b'}'),
            Last::Word(w) => w != WordClass::Other,
            Last::Operand => false,
        }
    }

    fn code_step(&mut self) {
        let b = self.bytes[self.pos];
        match b {
            b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
            b'/' if self.at(self.pos + 1) == Some(b'/') => {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            }
            b'/' if self.at(self.pos + 1) == Some(b'*') => {
                self.pos += 2;
                while self.pos < self.bytes.len()
                    && !(self.bytes[self.pos] == b'*' && self.at(self.pos + 1) == Some(b'/'))
                {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(self.bytes.len());
            }
            // `</tag>` closes JSX; it never starts a regex.
            b'/' if self.regex_allowed() && self.last != Last::Punct(b'<') => {
                self.skip_regex();
                self.last = Last::Operand;
            }
            b'`' => {
                self.pos += 1;
                self.stack.push(Ctx::Template);
            }
            b'\'' | b'"' => {
                if self.value_position() {
                    self.value_string(b);
                } else {
                    self.plain_string(b);
                }
                self.last = Last::Operand;
            }
            b'{' => {
                if let Some(Ctx::Code { depth }) = self.stack.last_mut() {
                    *depth += 1;
                }
                self.pos += 1;
                self.last = Last::Punct(b);
            }
            b'}' => {
                self.pos += 1;
                let open = match self.stack.last() {
                    Some(Ctx::Code { depth }) => *depth,
                    _ => 0,
                };
                if open > 0 {
                    self.stack.pop();
                    self.stack.push(Ctx::Code { depth: open - 1 });
                    self.last = Last::Punct(b);
                } else if self.stack.len() > 1 {
                    // Closes a `${` substitution.
                    self.stack.pop();
                } else {
                    self.last = Last::Punct(b);
                }
            }
            b if b == b'_' || b == b'$' || b.is_ascii_alphanumeric() || b >= 0x80 => {
                let start = self.pos;
                while self.pos < self.bytes.len() {
                    let c = self.bytes[self.pos];
                    if c == b'_' || c == b'$' || c.is_ascii_alphanumeric() || c >= 0x80 {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                let word = &self.src[start..self.pos];
                self.last = Last::Word(match word {
                    "return" => WordClass::Return,
                    "typeof" | "case" | "in" | "of" | "new" | "delete" | "void" | "throw"
                    | "else" | "do" | "yield" | "await" | "instanceof" => {
                        WordClass::OperandKeyword
                    }
                    _ => WordClass::Other,
                });
            }
            _ => {
                self.pos += 1;
                self.last = Last::Punct(b);
            }
        }
    }

    fn template_step(&mut self) {
        match self.bytes[self.pos] {
            b'\\' => self.pos += 2,
            b'`' => {
                self.pos += 1;
                self.stack.pop();
                self.last = Last::Operand;
            }
            b'$' if self.at(self.pos + 1) == Some(b'{') => {
                self.pos += 2;
                self.stack.push(Ctx::Code { depth: 0 });
                self.last = Last::Punct(b'{');
            }
            _ => self.pos += 1,
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    fn skip_regex(&mut self) {
        self.pos += 1;
        let mut in_class = false;
        while let Some(b) = self.at(self.pos) {
            match b {
                b'\n' | b'\r' => return,
                b'\\' => self.pos += 1,
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }
            self.pos += 1;
        }
        while self
            .at(self.pos)
            .is_some_and(|b| b.is_ascii_alphanumeric())
        {
            self.pos += 1;
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    /// Index of the closing `quote` for a literal whose body starts at `from`, on the same line.
    fn find_close(&self, from: usize, quote: u8) -> Option<usize> {
        let mut i = from;
        while let Some(b) = self.at(i) {
            match b {
                b'\\' => i += 2,
                b'\n' | b'\r' => return None,
                b if b == quote => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    fn plain_string(&mut self, quote: u8) {
        match self.find_close(self.pos + 1, quote) {
            Some(close) => self.pos = close + 1,
            None => {
                while self.at(self.pos).is_some_and(|b| b != b'\n') {
                    self.pos += 1;
                }
            }
        }
    }

    fn run_len(&self, from: usize, quote: u8) -> usize {
        self.bytes[from..].iter().take_while(|&&b| b == quote).count()
    }

    fn value_string(&mut self, quote: u8) {
        let start = self.pos;
        let n = self.run_len(start, quote);
        let after = self.at(start + n);

        if n == 1 {
            match self.find_close(start + 1, quote) {
                Some(close) => self.trailing(start, close, quote),
                None => self.plain_string(quote),
            }
            return;
        }

        let close = if is_content(after) {
            self.find_close(start + n, quote)
        } else {
            None
        };
        match (n, close) {
            (2, Some(close)) => {
                self.delete(start, start + 1, close + 1, RepairRule::DoubledOpeningQuote);
                self.trailing(start + 1, close, quote);
            }
            (2, None) => self.pos = start + 2,
            (_, Some(close)) => {
                self.delete(start, start + n - 1, close + 1, RepairRule::QuoteRun);
                self.trailing(start + n - 1, close, quote);
            }
            (_, None) if is_content(after) => {
                self.delete(start, start + n - 1, start + n, RepairRule::QuoteRun);
                self.pos = start + n;
                self.plain_string_body(quote);
            }
            (_, None) => {
                self.delete(start, start + n - 2, start + n, RepairRule::QuoteRun);
                self.pos = start + n;
            }
        }
    }

    /// Skip the unterminated body of a literal whose opening quote was already consumed.
    fn plain_string_body(&mut self, quote: u8) {
        match self.find_close(self.pos, quote) {
            Some(close) => self.pos = close + 1,
            None => {
                while self.at(self.pos).is_some_and(|b| b != b'\n') {
                    self.pos += 1;
                }
            }
        }
    }

    /// After the literal closing at `close`, drop same-quote characters before a terminator.
    fn trailing(&mut self, kept_open: usize, close: usize, quote: u8) {
        let stray_start = close + 1;
        let m = self.run_len(stray_start, quote);
        let mut next = stray_start + m;
        while matches!(self.at(next), Some(b' ' | b'\t')) {
            next += 1;
        }
        if m > 0 && is_terminator(self.at(next)) {
            let before = self.src[kept_open..stray_start + m].to_owned();
            let after = self.src[kept_open..stray_start].to_owned();
            self.out.push(Deletion {
                start: stray_start,
                end: stray_start + m,
                fix: RepairFix {
                    offset: stray_start,
                    before,
                    after,
                    rule: RepairRule::StrayTrailingQuote,
                },
            });
            self.pos = stray_start + m;
        } else {
            self.pos = stray_start;
        }
    }

    /// Record deletion of `[start, end)`; `literal_end` bounds the audit snippet.
    fn delete(&mut self, start: usize, end: usize, literal_end: usize, rule: RepairRule) {
        let before = self.src[start..literal_end].to_owned();
        let after = self.src[end..literal_end].to_owned();
        self.out.push(Deletion {
            start,
            end,
            fix: RepairFix {
                offset: start,
                before,
                after,
                rule,
            },
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/repair/mod.rs"]
mod tests;
