use crate::syntax::error::SyntaxError;

/// Half-open byte range `[start, end)` into the artifact source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct Span {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl Span {
    /// Create a span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Return `true` when `other` lies inside `self`.
    pub fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Byte length.
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Return `true` for zero-length spans.
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
    /// A line terminator occurred between the previous token and this one.
    pub(crate) newline_before: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// Identifiers and keywords; private class names keep their leading `#`.
    Ident(String),
    Number(f64),
    Str(String),
    Regex,
    /// One template chunk, from the opening backtick (or closing `}`) to the next `${` or
    /// closing backtick. `tail` marks the final chunk.
    Template {
        cooked: String,
        tail: bool,
    },
    Punct(&'static str),
    Eof,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => format!("'{s}'"),
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Str(_) => "string literal".to_owned(),
            TokenKind::Regex => "regex literal".to_owned(),
            TokenKind::Template { .. } => "template literal".to_owned(),
            TokenKind::Punct(p) => format!("'{p}'"),
            TokenKind::Eof => "end of input".to_owned(),
        }
    }
}

// Longest first so greedy matching picks `>>>=` over `>`.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

/// JSX tag-mode punctuation; single characters only so `>=` inside text is never merged.
const JSX_TAG_PUNCT: &[&str] = &["<", ">", "/", "=", "{", "}", ":", "."];

pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric() || c == '\u{200c}' || c == '\u{200d}'
}

/// On-demand lexer. The parser picks the mode for every token, which is how regex literals,
/// JSX text and template continuations are told apart from ordinary punctuation.
pub(crate) struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.bytes.len());
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// Skip whitespace and comments; report whether a line terminator was crossed.
    fn skip_trivia(&mut self) -> Result<bool, SyntaxError> {
        let mut newline = false;
        while let Some(c) = self.peek_char() {
            match c {
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                    newline = true;
                    self.pos += c.len_utf8();
                }
                c if c.is_whitespace() || c == '\u{feff}' => self.pos += c.len_utf8(),
                '/' if self.peek_byte(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte(0) {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                '/' if self.peek_byte(1) == Some(b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match self.peek_byte(0) {
                            None => {
                                return Err(SyntaxError::new(
                                    Span::new(start, self.pos),
                                    "unterminated block comment",
                                ));
                            }
                            Some(b'*') if self.peek_byte(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(b) => {
                                if b == b'\n' {
                                    newline = true;
                                }
                                self.pos += 1;
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(newline)
    }

    /// Lex the next ordinary token. `regex_ok` is true where an expression operand may start.
    pub(crate) fn next_token(&mut self, regex_ok: bool) -> Result<Token, SyntaxError> {
        let newline_before = self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
                newline_before,
            });
        };

        let kind = if is_ident_start(c) {
            TokenKind::Ident(self.ident())
        } else if c == '#' && self.src[self.pos + 1..].chars().next().is_some_and(is_ident_start)
        {
            self.pos += 1;
            TokenKind::Ident(format!("#{}", self.ident()))
        } else if c.is_ascii_digit()
            || (c == '.' && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()))
        {
            TokenKind::Number(self.number()?)
        } else if c == '\'' || c == '"' {
            TokenKind::Str(self.string(c as u8)?)
        } else if c == '`' {
            self.pos += 1;
            return self.template_chunk(start, newline_before);
        } else if c == '/' && regex_ok {
            self.regex()?;
            TokenKind::Regex
        } else {
            let rest = &self.src[self.pos..];
            let p = PUNCTUATORS
                .iter()
                .copied()
                .find(|p| rest.starts_with(p))
                .ok_or_else(|| {
                    SyntaxError::new(
                        Span::new(start, start + c.len_utf8()),
                        format!("unexpected character '{c}'"),
                    )
                })?;
            // `a?.5:b` is a conditional, not optional chaining.
            let p = if p == "?." && self.peek_byte(2).is_some_and(|b| b.is_ascii_digit()) {
                "?"
            } else {
                p
            };
            self.pos += p.len();
            TokenKind::Punct(p)
        };

        Ok(Token {
            kind,
            span: Span::new(start, self.pos),
            newline_before,
        })
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if is_ident_continue(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_owned()
    }

    fn number(&mut self) -> Result<f64, SyntaxError> {
        let start = self.pos;
        if self.peek_byte(0) == Some(b'0')
            && matches!(
                self.peek_byte(1),
                Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
            )
        {
            let radix = match self.peek_byte(1) {
                Some(b'x' | b'X') => 16,
                Some(b'o' | b'O') => 8,
                _ => 2,
            };
            self.pos += 2;
            let digits_start = self.pos;
            while let Some(b) = self.peek_byte(0) {
                if (b as char).is_digit(radix) || b == b'_' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let digits: String = self.src[digits_start..self.pos]
                .chars()
                .filter(|c| *c != '_')
                .collect();
            if self.peek_byte(0) == Some(b'n') {
                self.pos += 1;
            }
            return u64::from_str_radix(&digits, radix)
                .map(|v| v as f64)
                .map_err(|_| SyntaxError::new(Span::new(start, self.pos), "invalid number"));
        }

        let digits = |lx: &mut Self| {
            while let Some(b) = lx.peek_byte(0) {
                if b.is_ascii_digit() || b == b'_' {
                    lx.pos += 1;
                } else {
                    break;
                }
            }
        };
        digits(self);
        if self.peek_byte(0) == Some(b'.') {
            self.pos += 1;
            digits(self);
        }
        if matches!(self.peek_byte(0), Some(b'e' | b'E')) {
            let e_pos = self.pos;
            self.pos += 1;
            if matches!(self.peek_byte(0), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            digits(self);
            if exp_start == self.pos {
                return Err(SyntaxError::at(
                    e_pos,
                    "invalid number exponent (expected digits)",
                ));
            }
        }
        let text: String = self.src[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        if self.peek_byte(0) == Some(b'n') {
            self.pos += 1;
        }
        if self.peek_char().is_some_and(is_ident_start) {
            return Err(SyntaxError::at(
                self.pos,
                "identifier starts immediately after numeric literal",
            ));
        }
        text.parse::<f64>()
            .map_err(|_| SyntaxError::new(Span::new(start, self.pos), "invalid number"))
    }

    fn string(&mut self, quote: u8) -> Result<String, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.peek_char() else {
                return Err(SyntaxError::new(
                    Span::new(start, self.pos),
                    "unterminated string literal",
                ));
            };
            match c {
                '\n' | '\r' => {
                    return Err(SyntaxError::new(
                        Span::new(start, self.pos),
                        "unterminated string literal",
                    ));
                }
                '\\' => {
                    self.pos += 1;
                    self.escape(&mut out, start)?;
                }
                c if c as u32 == u32::from(quote) => {
                    self.pos += 1;
                    return Ok(out);
                }
                c => {
                    out.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    /// Decode one escape sequence; `self.pos` sits just after the backslash.
    fn escape(&mut self, out: &mut String, lit_start: usize) -> Result<(), SyntaxError> {
        let Some(c) = self.peek_char() else {
            return Err(SyntaxError::new(
                Span::new(lit_start, self.pos),
                "unterminated escape sequence",
            ));
        };
        self.pos += c.len_utf8();
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            '\r' => {
                if self.peek_byte(0) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let hex = self.src.get(self.pos..self.pos + 2).unwrap_or("");
                let v = u32::from_str_radix(hex, 16)
                    .map_err(|_| SyntaxError::at(self.pos, "invalid hex escape"))?;
                self.pos += 2;
                out.push(char::from_u32(v).unwrap_or('\u{fffd}'));
            }
            'u' => {
                let v = if self.peek_byte(0) == Some(b'{') {
                    let close = self.src[self.pos..]
                        .find('}')
                        .ok_or_else(|| SyntaxError::at(self.pos, "invalid unicode escape"))?;
                    let hex = &self.src[self.pos + 1..self.pos + close];
                    self.pos += close + 1;
                    u32::from_str_radix(hex, 16)
                } else {
                    let hex = self.src.get(self.pos..self.pos + 4).unwrap_or("");
                    self.pos += 4;
                    u32::from_str_radix(hex, 16)
                }
                .map_err(|_| SyntaxError::at(self.pos, "invalid unicode escape"))?;
                out.push(char::from_u32(v).unwrap_or('\u{fffd}'));
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn regex(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek_byte(0) {
                None | Some(b'\n') | Some(b'\r') => {
                    return Err(SyntaxError::new(
                        Span::new(start, self.pos),
                        "unterminated regex literal",
                    ));
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if let Some(c) = self.peek_char() {
                        self.pos += c.len_utf8();
                    }
                }
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    let c = self.peek_char().unwrap_or(' ');
                    self.pos += c.len_utf8();
                }
            }
        }
        while let Some(c) = self.peek_char() {
            if is_ident_continue(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Scan a template chunk starting at `self.pos` (just past a backtick or a closing `}`).
    pub(crate) fn template_chunk(
        &mut self,
        start: usize,
        newline_before: bool,
    ) -> Result<Token, SyntaxError> {
        let mut cooked = String::new();
        loop {
            let Some(c) = self.peek_char() else {
                return Err(SyntaxError::new(
                    Span::new(start, self.pos),
                    "unterminated template literal",
                ));
            };
            match c {
                '`' => {
                    self.pos += 1;
                    return Ok(Token {
                        kind: TokenKind::Template { cooked, tail: true },
                        span: Span::new(start, self.pos),
                        newline_before,
                    });
                }
                '$' if self.peek_byte(1) == Some(b'{') => {
                    self.pos += 2;
                    return Ok(Token {
                        kind: TokenKind::Template {
                            cooked,
                            tail: false,
                        },
                        span: Span::new(start, self.pos),
                        newline_before,
                    });
                }
                '\\' => {
                    self.pos += 1;
                    self.escape(&mut cooked, start)?;
                }
                c => {
                    cooked.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    /// Raw JSX text up to the next `<` or `{`. Returns `None` when empty.
    pub(crate) fn jsx_text(&mut self) -> Option<(String, Span)> {
        let start = self.pos;
        while let Some(b) = self.peek_byte(0) {
            if b == b'<' || b == b'{' {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some((
            self.src[start..self.pos].to_owned(),
            Span::new(start, self.pos),
        ))
    }

    /// Token inside a JSX tag: names may contain `-`, strings span lines without escapes.
    pub(crate) fn jsx_tag_token(&mut self) -> Result<Token, SyntaxError> {
        let newline_before = self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
                newline_before,
            });
        };
        let kind = if is_ident_start(c) {
            while let Some(c) = self.peek_char() {
                if is_ident_continue(c) || c == '-' {
                    self.pos += c.len_utf8();
                } else {
                    break;
                }
            }
            TokenKind::Ident(self.src[start..self.pos].to_owned())
        } else if c == '\'' || c == '"' {
            self.pos += 1;
            let body_start = self.pos;
            loop {
                match self.peek_byte(0) {
                    None => {
                        return Err(SyntaxError::new(
                            Span::new(start, self.pos),
                            "unterminated JSX attribute string",
                        ));
                    }
                    Some(b) if b == c as u8 => break,
                    Some(_) => {
                        let ch = self.peek_char().unwrap_or(' ');
                        self.pos += ch.len_utf8();
                    }
                }
            }
            let value = self.src[body_start..self.pos].to_owned();
            self.pos += 1;
            TokenKind::Str(value)
        } else if self.src[self.pos..].starts_with("...") {
            self.pos += 3;
            TokenKind::Punct("...")
        } else if let Some(p) = JSX_TAG_PUNCT
            .iter()
            .copied()
            .find(|p| self.src[self.pos..].starts_with(p))
        {
            self.pos += 1;
            TokenKind::Punct(p)
        } else {
            return Err(SyntaxError::new(
                Span::new(start, start + c.len_utf8()),
                format!("unexpected character '{c}' in JSX tag"),
            ));
        };
        Ok(Token {
            kind,
            span: Span::new(start, self.pos),
            newline_before,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/syntax/lexer.rs"]
mod tests;
