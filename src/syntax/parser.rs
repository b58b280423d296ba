use crate::syntax::ast::*;
use crate::syntax::error::SyntaxError;
use crate::syntax::lexer::{Lexer, Span, Token, TokenKind};

type PResult<T> = Result<T, SyntaxError>;

pub(crate) fn parse_module(src: &str) -> PResult<StructuralTree> {
    let mut p = Parser::new(src)?;
    let mut body = Vec::new();
    while !p.at_eof() {
        body.push(p.parse_statement()?);
    }
    Ok(StructuralTree {
        source: src.to_owned(),
        body,
    })
}

const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with",
];

// Keywords after which a `/` starts a regex literal rather than a division.
const OPERAND_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

const ASSIGN_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=",
];

const CLASS_MODIFIERS: &[&str] = &[
    "static",
    "public",
    "private",
    "protected",
    "readonly",
    "abstract",
    "override",
    "declare",
    "accessor",
];

fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

fn regex_allowed_after(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Ident(w) => OPERAND_KEYWORDS.contains(&w.as_str()),
        TokenKind::Number(_) | TokenKind::Str(_) | TokenKind::Regex | TokenKind::Eof => false,
        TokenKind::Template { tail, .. } => !tail,
        TokenKind::Punct(p) => !matches!(*p, ")" | "]" | "}" | "++" | "--"),
    }
}

fn binary_precedence(op: &str) -> Option<u8> {
    Some(match op {
        "??" => 1,
        "||" => 2,
        "&&" => 3,
        "|" => 4,
        "^" => 5,
        "&" => 6,
        "==" | "!=" | "===" | "!==" => 7,
        "<" | ">" | "<=" | ">=" => 8,
        "<<" | ">>" | ">>>" => 9,
        "+" | "-" => 10,
        "*" | "/" | "%" => 11,
        "**" => 12,
        _ => return None,
    })
}

struct Snapshot {
    cur: Token,
    pos: usize,
    last_end: usize,
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    last_end: usize,
    in_generator: bool,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> PResult<Self> {
        let mut lexer = Lexer::new(src);
        let cur = lexer.next_token(true)?;
        Ok(Self {
            lexer,
            cur,
            last_end: 0,
            in_generator: false,
        })
    }

    // ---- token plumbing ----

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            cur: self.cur.clone(),
            pos: self.lexer.pos(),
            last_end: self.last_end,
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.cur = snap.cur;
        self.lexer.seek(snap.pos);
        self.last_end = snap.last_end;
    }

    fn advance(&mut self) -> PResult<Token> {
        let regex_ok = regex_allowed_after(&self.cur.kind);
        let next = self.lexer.next_token(regex_ok)?;
        let prev = std::mem::replace(&mut self.cur, next);
        self.last_end = prev.span.end;
        Ok(prev)
    }

    /// Token after the current one, without consuming anything.
    fn peek_next(&mut self) -> PResult<Token> {
        let snap = self.snapshot();
        self.advance()?;
        let next = self.cur.clone();
        self.restore(snap);
        Ok(next)
    }

    /// Re-lex from `pos` in ordinary mode, making the result the current token.
    fn resume_at(&mut self, pos: usize, regex_ok: bool) -> PResult<()> {
        self.lexer.seek(pos);
        self.last_end = pos;
        self.cur = self.lexer.next_token(regex_ok)?;
        Ok(())
    }

    fn at_eof(&self) -> bool {
        self.cur.kind == TokenKind::Eof
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(&self.cur.kind, TokenKind::Punct(q) if *q == p)
    }

    fn is_kw(&self, kw: &str) -> bool {
        matches!(&self.cur.kind, TokenKind::Ident(w) if w == kw)
    }

    fn cur_word(&self) -> Option<String> {
        match &self.cur.kind {
            TokenKind::Ident(w) => Some(w.clone()),
            _ => None,
        }
    }

    fn eat_punct(&mut self, p: &str) -> PResult<bool> {
        if self.is_punct(p) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn eat_kw(&mut self, kw: &str) -> PResult<bool> {
        if self.is_kw(kw) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_punct(&mut self, p: &str) -> PResult<Span> {
        if self.is_punct(p) {
            Ok(self.advance()?.span)
        } else {
            Err(self.unexpected(format!("expected '{p}'")))
        }
    }

    fn expect_kw(&mut self, kw: &str) -> PResult<Span> {
        if self.is_kw(kw) {
            Ok(self.advance()?.span)
        } else {
            Err(self.unexpected(format!("expected '{kw}'")))
        }
    }

    fn unexpected(&self, what: impl Into<String>) -> SyntaxError {
        SyntaxError::new(
            self.cur.span,
            format!("{}, found {}", what.into(), self.cur.kind.describe()),
        )
    }

    fn consume_semicolon(&mut self) -> PResult<()> {
        if self.eat_punct(";")? {
            return Ok(());
        }
        if self.is_punct("}") || self.at_eof() || self.cur.newline_before {
            return Ok(());
        }
        Err(self.unexpected("expected ';'"))
    }

    fn expect_string(&mut self) -> PResult<String> {
        match &self.cur.kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance()?;
                Ok(s)
            }
            _ => Err(self.unexpected("expected string literal")),
        }
    }

    /// Any identifier, keywords included (property names, export aliases).
    fn ident_name(&mut self) -> PResult<Ident> {
        match &self.cur.kind {
            TokenKind::Ident(w) => {
                let ident = Ident {
                    name: w.clone(),
                    span: self.cur.span,
                };
                self.advance()?;
                Ok(ident)
            }
            _ => Err(self.unexpected("expected identifier")),
        }
    }

    fn binding_ident(&mut self) -> PResult<Ident> {
        match &self.cur.kind {
            TokenKind::Ident(w) if !is_reserved(w) && !w.starts_with('#') => self.ident_name(),
            _ => Err(self.unexpected("expected identifier")),
        }
    }

    fn at_binding_ident(&self) -> bool {
        matches!(&self.cur.kind, TokenKind::Ident(w) if !is_reserved(w) && !w.starts_with('#'))
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> PResult<Stmt> {
        let start = self.cur.span.start;
        let kind = self.parse_statement_kind(start)?;
        Ok(Stmt {
            kind,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_statement_kind(&mut self, start: usize) -> PResult<StmtKind> {
        if self.is_punct("{") {
            let (body, _) = self.parse_block()?;
            return Ok(StmtKind::Block(body));
        }
        if self.eat_punct(";")? {
            return Ok(StmtKind::Empty);
        }
        let Some(word) = self.cur_word() else {
            return self.parse_expression_statement();
        };
        let next = self.peek_next()?;
        let next_is = |p: &str| matches!(&next.kind, TokenKind::Punct(q) if *q == p);
        let next_word = match &next.kind {
            TokenKind::Ident(w) => Some(w.as_str()),
            _ => None,
        };

        match word.as_str() {
            "const" if next_word == Some("enum") => {
                self.advance()?;
                self.parse_enum()
            }
            "var" | "const" => {
                let decl = self.parse_var_decl(false)?;
                self.consume_semicolon()?;
                Ok(StmtKind::Var(decl))
            }
            "let" if next_word.is_some() || next_is("[") || next_is("{") => {
                let decl = self.parse_var_decl(false)?;
                self.consume_semicolon()?;
                Ok(StmtKind::Var(decl))
            }
            "function" => Ok(StmtKind::Function(self.parse_function(start, false, true)?)),
            "async" if next_word == Some("function") && !next.newline_before => {
                self.advance()?;
                Ok(StmtKind::Function(self.parse_function(start, true, true)?))
            }
            "class" => Ok(StmtKind::Class(self.parse_class(true)?)),
            "abstract" if next_word == Some("class") => {
                self.advance()?;
                Ok(StmtKind::Class(self.parse_class(true)?))
            }
            "if" => {
                self.advance()?;
                self.expect_punct("(")?;
                let test = self.parse_expression(false)?;
                self.expect_punct(")")?;
                let cons = Box::new(self.parse_statement()?);
                let alt = if self.eat_kw("else")? {
                    Some(Box::new(self.parse_statement()?))
                } else {
                    None
                };
                Ok(StmtKind::If { test, cons, alt })
            }
            "for" => self.parse_for(),
            "while" => {
                self.advance()?;
                self.expect_punct("(")?;
                let test = self.parse_expression(false)?;
                self.expect_punct(")")?;
                let body = Box::new(self.parse_statement()?);
                Ok(StmtKind::While { test, body })
            }
            "do" => {
                self.advance()?;
                let body = Box::new(self.parse_statement()?);
                self.expect_kw("while")?;
                self.expect_punct("(")?;
                let test = self.parse_expression(false)?;
                self.expect_punct(")")?;
                self.eat_punct(";")?;
                Ok(StmtKind::DoWhile { body, test })
            }
            "return" => {
                self.advance()?;
                let arg = if self.is_punct(";")
                    || self.is_punct("}")
                    || self.at_eof()
                    || self.cur.newline_before
                {
                    None
                } else {
                    Some(self.parse_expression(false)?)
                };
                self.consume_semicolon()?;
                Ok(StmtKind::Return(arg))
            }
            "throw" => {
                self.advance()?;
                let arg = self.parse_expression(false)?;
                self.consume_semicolon()?;
                Ok(StmtKind::Throw(arg))
            }
            "break" | "continue" => {
                self.advance()?;
                let label = if self.at_binding_ident() && !self.cur.newline_before {
                    Some(self.binding_ident()?)
                } else {
                    None
                };
                self.consume_semicolon()?;
                Ok(if word == "break" {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                })
            }
            "try" => self.parse_try(),
            "switch" => self.parse_switch(),
            "debugger" => {
                self.advance()?;
                self.consume_semicolon()?;
                Ok(StmtKind::Debugger)
            }
            "import" if !next_is("(") && !next_is(".") => self.parse_import(),
            "export" => self.parse_export(start),
            "interface" if next_word.is_some() && !next.newline_before => {
                self.advance()?;
                let name = self.binding_ident()?;
                self.skip_type_params()?;
                if self.eat_kw("extends")? {
                    loop {
                        self.skip_type()?;
                        if !self.eat_punct(",")? {
                            break;
                        }
                    }
                }
                self.skip_balanced("{", "}")?;
                Ok(StmtKind::TypeOnly { name: Some(name) })
            }
            "type" if next_word.is_some() && !next.newline_before => {
                self.advance()?;
                let name = self.binding_ident()?;
                self.skip_type_params()?;
                self.expect_punct("=")?;
                self.skip_type()?;
                self.consume_semicolon()?;
                Ok(StmtKind::TypeOnly { name: Some(name) })
            }
            "enum" if next_word.is_some() => self.parse_enum(),
            "declare" if next_word.is_some() && !next.newline_before => {
                self.advance()?;
                if self.is_kw("module") || self.is_kw("namespace") || self.is_kw("global") {
                    self.skip_namespace()?;
                    return Ok(StmtKind::TypeOnly { name: None });
                }
                let inner = self.parse_statement()?;
                Ok(inner.kind)
            }
            "namespace" | "module"
                if (next_word.is_some() || matches!(next.kind, TokenKind::Str(_)))
                    && !next.newline_before =>
            {
                self.skip_namespace()?;
                Ok(StmtKind::TypeOnly { name: None })
            }
            w if !is_reserved(w) && next_is(":") => {
                let label = self.binding_ident()?;
                self.advance()?;
                let body = Box::new(self.parse_statement()?);
                Ok(StmtKind::Labeled { label, body })
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> PResult<StmtKind> {
        let expr = self.parse_expression(false)?;
        self.consume_semicolon()?;
        Ok(StmtKind::Expr(expr))
    }

    fn parse_block(&mut self) -> PResult<(Vec<Stmt>, Span)> {
        let open = self.expect_punct("{")?;
        let mut body = Vec::new();
        while !self.is_punct("}") {
            if self.at_eof() {
                return Err(SyntaxError::new(
                    self.cur.span,
                    format!("unclosed '{{' opened at byte {}", open.start),
                ));
            }
            body.push(self.parse_statement()?);
        }
        self.advance()?;
        Ok((body, Span::new(open.start, self.last_end)))
    }

    fn parse_var_decl(&mut self, no_in: bool) -> PResult<VarDecl> {
        let kind = match self.ident_name()?.name.as_str() {
            "const" => VarKind::Const,
            "let" => VarKind::Let,
            _ => VarKind::Var,
        };
        let mut decls = Vec::new();
        loop {
            let start = self.cur.span.start;
            let pattern = self.parse_binding_target()?;
            self.eat_punct("!")?;
            if self.eat_punct(":")? {
                self.skip_type()?;
            }
            let init = if self.eat_punct("=")? {
                Some(self.parse_assign(no_in)?)
            } else {
                None
            };
            decls.push(VarDeclarator {
                pattern,
                init,
                span: Span::new(start, self.last_end),
            });
            if !self.eat_punct(",")? {
                break;
            }
        }
        Ok(VarDecl { kind, decls })
    }

    fn parse_for(&mut self) -> PResult<StmtKind> {
        self.advance()?;
        self.eat_kw("await")?;
        self.expect_punct("(")?;
        let init = if self.is_punct(";") {
            None
        } else if self.is_kw("var") || self.is_kw("const") {
            Some(ForInit::Var(self.parse_var_decl(true)?))
        } else if self.is_kw("let") {
            let next = self.peek_next()?;
            if matches!(next.kind, TokenKind::Ident(_) | TokenKind::Punct("[" | "{")) {
                Some(ForInit::Var(self.parse_var_decl(true)?))
            } else {
                Some(ForInit::Expr(self.parse_expression(true)?))
            }
        } else {
            Some(ForInit::Expr(self.parse_expression(true)?))
        };

        if self.is_kw("of") || self.is_kw("in") {
            let of = self.is_kw("of");
            self.advance()?;
            let left = match init {
                Some(ForInit::Expr(e)) => ForInit::Pattern(self.expr_to_pattern(e)?),
                Some(other) => other,
                None => return Err(self.unexpected("expected loop variable")),
            };
            let right = if of {
                self.parse_assign(false)?
            } else {
                self.parse_expression(false)?
            };
            self.expect_punct(")")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(StmtKind::ForIn {
                left,
                right,
                body,
                of,
            });
        }

        self.expect_punct(";")?;
        let test = if self.is_punct(";") {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect_punct(";")?;
        let update = if self.is_punct(")") {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect_punct(")")?;
        let body = Box::new(self.parse_statement()?);
        Ok(StmtKind::For {
            init,
            test,
            update,
            body,
        })
    }

    fn parse_try(&mut self) -> PResult<StmtKind> {
        self.advance()?;
        let (block, _) = self.parse_block()?;
        let mut param = None;
        let mut handler = None;
        if self.eat_kw("catch")? {
            if self.eat_punct("(")? {
                param = Some(self.parse_binding_target()?);
                if self.eat_punct(":")? {
                    self.skip_type()?;
                }
                self.expect_punct(")")?;
            }
            handler = Some(self.parse_block()?.0);
        }
        let finalizer = if self.eat_kw("finally")? {
            Some(self.parse_block()?.0)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected("expected 'catch' or 'finally'"));
        }
        Ok(StmtKind::Try {
            block,
            param,
            handler,
            finalizer,
        })
    }

    fn parse_switch(&mut self) -> PResult<StmtKind> {
        self.advance()?;
        self.expect_punct("(")?;
        let disc = self.parse_expression(false)?;
        self.expect_punct(")")?;
        self.expect_punct("{")?;
        let mut cases = Vec::new();
        while !self.eat_punct("}")? {
            let test = if self.eat_kw("case")? {
                Some(self.parse_expression(false)?)
            } else if self.eat_kw("default")? {
                None
            } else {
                return Err(self.unexpected("expected 'case' or 'default'"));
            };
            self.expect_punct(":")?;
            let mut body = Vec::new();
            while !(self.is_kw("case") || self.is_kw("default") || self.is_punct("}")) {
                if self.at_eof() {
                    return Err(self.unexpected("unterminated switch"));
                }
                body.push(self.parse_statement()?);
            }
            cases.push(SwitchCase { test, body });
        }
        Ok(StmtKind::Switch { disc, cases })
    }

    fn parse_enum(&mut self) -> PResult<StmtKind> {
        self.expect_kw("enum")?;
        let name = self.binding_ident()?;
        self.skip_balanced("{", "}")?;
        Ok(StmtKind::Enum { name })
    }

    fn skip_namespace(&mut self) -> PResult<()> {
        self.advance()?;
        while !self.is_punct("{") {
            if self.at_eof() || self.is_punct(";") {
                self.eat_punct(";")?;
                return Ok(());
            }
            self.advance()?;
        }
        self.skip_balanced("{", "}")
    }

    fn parse_import(&mut self) -> PResult<StmtKind> {
        self.expect_kw("import")?;
        let mut type_only = false;
        if self.is_kw("type") {
            let next = self.peek_next()?;
            let starts_clause = match &next.kind {
                TokenKind::Ident(w) => w != "from",
                TokenKind::Punct(p) => *p == "{" || *p == "*",
                _ => false,
            };
            if starts_clause {
                self.advance()?;
                type_only = true;
            }
        }

        if let TokenKind::Str(_) = self.cur.kind {
            let source = self.expect_string()?;
            self.skip_import_attributes()?;
            self.consume_semicolon()?;
            return Ok(StmtKind::Import(ImportDecl {
                specifiers: Vec::new(),
                source,
                type_only,
            }));
        }

        let mut specifiers = Vec::new();
        let mut more = true;
        if self.at_binding_ident() {
            let local = self.binding_ident()?;
            specifiers.push(ImportSpec {
                local,
                imported: None,
                namespace: false,
            });
            more = self.eat_punct(",")?;
        }
        if more {
            if self.eat_punct("*")? {
                self.expect_kw("as")?;
                let local = self.binding_ident()?;
                specifiers.push(ImportSpec {
                    local,
                    imported: None,
                    namespace: true,
                });
            } else if self.eat_punct("{")? {
                while !self.eat_punct("}")? {
                    if self.is_kw("type") {
                        let next = self.peek_next()?;
                        if matches!(&next.kind, TokenKind::Ident(w) if w != "as") {
                            self.advance()?;
                        }
                    }
                    let imported = match &self.cur.kind {
                        TokenKind::Str(s) => {
                            let s = s.clone();
                            let span = self.advance()?.span;
                            Ident { name: s, span }
                        }
                        _ => self.ident_name()?,
                    };
                    let local = if self.eat_kw("as")? {
                        self.binding_ident()?
                    } else {
                        imported.clone()
                    };
                    specifiers.push(ImportSpec {
                        local,
                        imported: Some(imported.name),
                        namespace: false,
                    });
                    if !self.is_punct("}") {
                        self.expect_punct(",")?;
                    }
                }
            } else {
                return Err(self.unexpected("expected import clause"));
            }
        }
        self.expect_kw("from")?;
        let source = self.expect_string()?;
        self.skip_import_attributes()?;
        self.consume_semicolon()?;
        Ok(StmtKind::Import(ImportDecl {
            specifiers,
            source,
            type_only,
        }))
    }

    fn skip_import_attributes(&mut self) -> PResult<()> {
        if (self.is_kw("with") || self.is_kw("assert")) && !self.cur.newline_before {
            self.advance()?;
            self.skip_balanced("{", "}")?;
        }
        Ok(())
    }

    fn parse_export(&mut self, start: usize) -> PResult<StmtKind> {
        self.expect_kw("export")?;
        if self.eat_kw("default")? {
            let fn_start = self.cur.span.start;
            if self.is_kw("function") {
                return Ok(StmtKind::ExportDefault(ExportDefault::Function(
                    self.parse_function(fn_start, false, false)?,
                )));
            }
            if self.is_kw("async") {
                let next = self.peek_next()?;
                if next.kind == TokenKind::Ident("function".to_owned()) && !next.newline_before {
                    self.advance()?;
                    return Ok(StmtKind::ExportDefault(ExportDefault::Function(
                        self.parse_function(fn_start, true, false)?,
                    )));
                }
            }
            if self.is_kw("class") {
                return Ok(StmtKind::ExportDefault(ExportDefault::Class(
                    self.parse_class(false)?,
                )));
            }
            let expr = self.parse_assign(false)?;
            self.consume_semicolon()?;
            return Ok(StmtKind::ExportDefault(ExportDefault::Expr(expr)));
        }

        if self.eat_punct("*")? {
            let alias = if self.eat_kw("as")? {
                Some(self.ident_name()?)
            } else {
                None
            };
            self.expect_kw("from")?;
            let source = self.expect_string()?;
            self.consume_semicolon()?;
            return Ok(StmtKind::ExportAll { alias, source });
        }

        if self.is_kw("type") && self.peek_next()?.kind == TokenKind::Punct("{") {
            self.advance()?;
        }
        if self.eat_punct("{")? {
            let mut specifiers = Vec::new();
            while !self.eat_punct("}")? {
                let local = self.ident_name()?;
                let exported = if self.eat_kw("as")? {
                    match &self.cur.kind {
                        TokenKind::Str(s) => {
                            let s = s.clone();
                            self.advance()?;
                            s
                        }
                        _ => self.ident_name()?.name,
                    }
                } else {
                    local.name.clone()
                };
                specifiers.push(ExportSpec { local, exported });
                if !self.is_punct("}") {
                    self.expect_punct(",")?;
                }
            }
            let source = if self.eat_kw("from")? {
                Some(self.expect_string()?)
            } else {
                None
            };
            self.consume_semicolon()?;
            return Ok(StmtKind::ExportNamed { specifiers, source });
        }

        let decl = self.parse_statement()?;
        match decl.kind {
            StmtKind::Var(_)
            | StmtKind::Function(_)
            | StmtKind::Class(_)
            | StmtKind::TypeOnly { .. }
            | StmtKind::Enum { .. } => Ok(StmtKind::ExportDecl(Box::new(decl))),
            _ => Err(SyntaxError::new(
                Span::new(start, decl.span.end),
                "expected declaration after 'export'",
            )),
        }
    }

    // ---- functions and classes ----

    fn with_generator<T>(
        &mut self,
        generator: bool,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        let saved = std::mem::replace(&mut self.in_generator, generator);
        let out = f(self);
        self.in_generator = saved;
        out
    }

    /// `function` keyword at the current token; `start` covers any `async` prefix.
    fn parse_function(
        &mut self,
        start: usize,
        is_async: bool,
        require_name: bool,
    ) -> PResult<Function> {
        self.expect_kw("function")?;
        let is_generator = self.eat_punct("*")?;
        let name = if self.at_binding_ident() {
            Some(self.binding_ident()?)
        } else if require_name {
            return Err(self.unexpected("expected function name"));
        } else {
            None
        };
        self.function_rest(start, name, is_async, is_generator)
    }

    /// Type parameters, parameters, return type and body.
    fn function_rest(
        &mut self,
        start: usize,
        name: Option<Ident>,
        is_async: bool,
        is_generator: bool,
    ) -> PResult<Function> {
        self.skip_type_params()?;
        let params = self.with_generator(is_generator, |p| p.parse_params())?;
        if self.eat_punct(":")? {
            self.skip_type()?;
        }
        let (body, body_span) = self.with_generator(is_generator, |p| p.parse_block())?;
        Ok(Function {
            name,
            params,
            body,
            body_span,
            is_async,
            is_generator,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_params(&mut self) -> PResult<Vec<Pattern>> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        while !self.is_punct(")") {
            while let Some(w) = self.cur_word() {
                if !matches!(
                    w.as_str(),
                    "public" | "private" | "protected" | "readonly" | "override"
                ) {
                    break;
                }
                let next = self.peek_next()?;
                if !matches!(next.kind, TokenKind::Ident(_) | TokenKind::Punct("{" | "[")) {
                    break;
                }
                self.advance()?;
            }
            let start = self.cur.span.start;
            if self.eat_punct("...")? {
                let target = self.parse_binding_target()?;
                if self.eat_punct(":")? {
                    self.skip_type()?;
                }
                params.push(Pattern {
                    kind: PatKind::Rest(Box::new(target)),
                    span: Span::new(start, self.last_end),
                });
            } else if self.is_kw("this") {
                // TypeScript `this` parameter carries only a type.
                self.advance()?;
                if self.eat_punct(":")? {
                    self.skip_type()?;
                }
            } else {
                let target = self.parse_binding_target()?;
                self.eat_punct("?")?;
                if self.eat_punct(":")? {
                    self.skip_type()?;
                }
                let param = if self.eat_punct("=")? {
                    let value = self.parse_assign(false)?;
                    Pattern {
                        kind: PatKind::Default {
                            target: Box::new(target),
                            value: Box::new(value),
                        },
                        span: Span::new(start, self.last_end),
                    }
                } else {
                    target
                };
                params.push(param);
            }
            if !self.is_punct(")") {
                self.expect_punct(",")?;
            }
        }
        self.advance()?;
        Ok(params)
    }

    fn parse_class(&mut self, require_name: bool) -> PResult<Class> {
        let start = self.expect_kw("class")?.start;
        let name = if self.at_binding_ident() && !self.is_kw("implements") {
            Some(self.binding_ident()?)
        } else if require_name {
            return Err(self.unexpected("expected class name"));
        } else {
            None
        };
        self.skip_type_params()?;
        let super_class = if self.eat_kw("extends")? {
            let sup = self.parse_call_member()?;
            if self.is_punct("<") {
                self.skip_angle()?;
            }
            Some(Box::new(sup))
        } else {
            None
        };
        if self.eat_kw("implements")? {
            loop {
                self.skip_type()?;
                if !self.eat_punct(",")? {
                    break;
                }
            }
        }

        self.expect_punct("{")?;
        let mut members = Vec::new();
        while !self.is_punct("}") {
            if self.at_eof() {
                return Err(self.unexpected("unterminated class body"));
            }
            if self.eat_punct(";")? {
                continue;
            }
            members.push(self.parse_class_member()?);
        }
        self.advance()?;
        Ok(Class {
            name,
            super_class,
            members,
            span: Span::new(start, self.last_end),
        })
    }

    /// Whether the current word is a modifier rather than the member key itself.
    fn word_is_modifier(&mut self) -> PResult<bool> {
        let next = self.peek_next()?;
        Ok(!next.newline_before
            && !matches!(
                next.kind,
                TokenKind::Punct("(" | "=" | ";" | ":" | "?" | "!" | "}" | "<") | TokenKind::Eof
            ))
    }

    fn parse_class_member(&mut self) -> PResult<ClassMember> {
        let start = self.cur.span.start;
        let mut is_static = false;
        while let Some(w) = self.cur_word() {
            if !CLASS_MODIFIERS.contains(&w.as_str()) {
                break;
            }
            if w == "static" && self.peek_next()?.kind == TokenKind::Punct("{") {
                self.advance()?;
                let (body, _) = self.parse_block()?;
                return Ok(ClassMember {
                    key: PropKey::Ident(Ident {
                        name: "static".to_owned(),
                        span: Span::new(start, start + 6),
                    }),
                    value: ClassMemberValue::StaticBlock(body),
                    is_static: true,
                    span: Span::new(start, self.last_end),
                });
            }
            if !self.word_is_modifier()? {
                break;
            }
            is_static |= w == "static";
            self.advance()?;
        }

        let mut is_async = false;
        if self.is_kw("async") && self.word_is_modifier()? {
            self.advance()?;
            is_async = true;
        }
        let is_generator = self.eat_punct("*")?;
        if (self.is_kw("get") || self.is_kw("set")) && self.word_is_modifier()? {
            self.advance()?;
        }

        let key = self.parse_prop_key()?;
        let value = if self.is_punct("(") || self.is_punct("<") {
            ClassMemberValue::Method(self.function_rest(start, None, is_async, is_generator)?)
        } else {
            if !self.eat_punct("?")? {
                self.eat_punct("!")?;
            }
            if self.eat_punct(":")? {
                self.skip_type()?;
            }
            let init = if self.eat_punct("=")? {
                Some(self.parse_assign(false)?)
            } else {
                None
            };
            self.consume_semicolon()?;
            ClassMemberValue::Field(init)
        };
        Ok(ClassMember {
            key,
            value,
            is_static,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_prop_key(&mut self) -> PResult<PropKey> {
        let span = self.cur.span;
        match self.cur.kind.clone() {
            TokenKind::Ident(name) if name.starts_with('#') => {
                self.advance()?;
                Ok(PropKey::Private(Ident { name, span }))
            }
            TokenKind::Ident(name) => {
                self.advance()?;
                Ok(PropKey::Ident(Ident { name, span }))
            }
            TokenKind::Str(s) => {
                self.advance()?;
                Ok(PropKey::Str(s, span))
            }
            TokenKind::Number(n) => {
                self.advance()?;
                Ok(PropKey::Num(n, span))
            }
            TokenKind::Punct("[") => {
                self.advance()?;
                let expr = self.parse_assign(false)?;
                self.expect_punct("]")?;
                Ok(PropKey::Computed(Box::new(expr)))
            }
            _ => Err(self.unexpected("expected property name")),
        }
    }

    // ---- patterns ----

    fn parse_binding_target(&mut self) -> PResult<Pattern> {
        let start = self.cur.span.start;
        if self.eat_punct("[")? {
            let mut elems = Vec::new();
            while !self.is_punct("]") {
                if self.eat_punct(",")? {
                    elems.push(None);
                    continue;
                }
                let el_start = self.cur.span.start;
                let el = if self.eat_punct("...")? {
                    let target = self.parse_binding_target()?;
                    Pattern {
                        kind: PatKind::Rest(Box::new(target)),
                        span: Span::new(el_start, self.last_end),
                    }
                } else {
                    self.parse_binding_element()?
                };
                elems.push(Some(el));
                if !self.is_punct("]") {
                    self.expect_punct(",")?;
                }
            }
            self.advance()?;
            return Ok(Pattern {
                kind: PatKind::Array(elems),
                span: Span::new(start, self.last_end),
            });
        }
        if self.eat_punct("{")? {
            let mut props = Vec::new();
            while !self.is_punct("}") {
                if self.eat_punct("...")? {
                    props.push(PatProp::Rest(self.parse_binding_target()?));
                } else {
                    let key_start = self.cur.span.start;
                    let key = self.parse_prop_key()?;
                    let value = if self.eat_punct(":")? {
                        self.parse_binding_element()?
                    } else {
                        let PropKey::Ident(ident) = &key else {
                            return Err(self.unexpected("expected ':'"));
                        };
                        let target = Pattern {
                            kind: PatKind::Ident(ident.clone()),
                            span: ident.span,
                        };
                        if self.eat_punct("=")? {
                            let value = self.parse_assign(false)?;
                            Pattern {
                                kind: PatKind::Default {
                                    target: Box::new(target),
                                    value: Box::new(value),
                                },
                                span: Span::new(key_start, self.last_end),
                            }
                        } else {
                            target
                        }
                    };
                    props.push(PatProp::KeyValue { key, value });
                }
                if !self.is_punct("}") {
                    self.expect_punct(",")?;
                }
            }
            self.advance()?;
            return Ok(Pattern {
                kind: PatKind::Object(props),
                span: Span::new(start, self.last_end),
            });
        }
        let ident = self
            .binding_ident()
            .map_err(|_| self.unexpected("expected binding pattern"))?;
        Ok(Pattern {
            span: ident.span,
            kind: PatKind::Ident(ident),
        })
    }

    fn parse_binding_element(&mut self) -> PResult<Pattern> {
        let start = self.cur.span.start;
        let target = self.parse_binding_target()?;
        if !self.eat_punct("=")? {
            return Ok(target);
        }
        let value = self.parse_assign(false)?;
        Ok(Pattern {
            kind: PatKind::Default {
                target: Box::new(target),
                value: Box::new(value),
            },
            span: Span::new(start, self.last_end),
        })
    }

    /// Reinterpret a parsed expression as an assignment target.
    fn expr_to_pattern(&self, e: Expr) -> PResult<Pattern> {
        let span = e.span;
        if matches!(e.kind, ExprKind::Member { .. }) {
            return Ok(Pattern {
                kind: PatKind::Expr(Box::new(e)),
                span,
            });
        }
        let kind = match e.kind {
            ExprKind::Ident(i) => PatKind::Ident(i),
            ExprKind::Paren(inner) | ExprKind::TsAs(inner) => return self.expr_to_pattern(*inner),
            ExprKind::Array(elems) => PatKind::Array(
                elems
                    .into_iter()
                    .map(|el| el.map(|x| self.element_to_pattern(x)).transpose())
                    .collect::<PResult<_>>()?,
            ),
            ExprKind::Object(props) => {
                let mut out = Vec::with_capacity(props.len());
                for prop in props {
                    out.push(match prop.kind {
                        PropKind::KeyValue { key, value } => PatProp::KeyValue {
                            key,
                            value: self.expr_to_pattern(value)?,
                        },
                        PropKind::Shorthand(ident) => PatProp::KeyValue {
                            key: PropKey::Ident(ident.clone()),
                            value: Pattern {
                                span: ident.span,
                                kind: PatKind::Ident(ident),
                            },
                        },
                        PropKind::Spread(inner) => PatProp::Rest(self.expr_to_pattern(inner)?),
                        PropKind::Method { .. } => {
                            return Err(SyntaxError::new(prop.span, "invalid destructuring target"));
                        }
                    });
                }
                PatKind::Object(out)
            }
            ExprKind::Assign {
                op: "=",
                target,
                value,
            } => PatKind::Default { target, value },
            _ => return Err(SyntaxError::new(span, "invalid assignment target")),
        };
        Ok(Pattern { kind, span })
    }

    fn element_to_pattern(&self, e: Expr) -> PResult<Pattern> {
        let span = e.span;
        match e.kind {
            ExprKind::Spread(inner) => Ok(Pattern {
                kind: PatKind::Rest(Box::new(self.expr_to_pattern(*inner)?)),
                span,
            }),
            kind => self.expr_to_pattern(Expr { kind, span }),
        }
    }

    fn simple_target(&self, e: Expr) -> PResult<Pattern> {
        let span = e.span;
        if matches!(
            e.unwrap_parens().kind,
            ExprKind::Ident(_) | ExprKind::Member { .. }
        ) {
            self.expr_to_pattern(e)
        } else {
            Err(SyntaxError::new(span, "invalid assignment target"))
        }
    }

    // ---- expressions ----

    fn parse_expression(&mut self, no_in: bool) -> PResult<Expr> {
        let start = self.cur.span.start;
        let first = self.parse_assign(no_in)?;
        if !self.is_punct(",") {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_punct(",")? {
            items.push(self.parse_assign(no_in)?);
        }
        Ok(Expr {
            kind: ExprKind::Seq(items),
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_assign(&mut self, no_in: bool) -> PResult<Expr> {
        if let Some(arrow) = self.try_arrow(no_in)? {
            return Ok(arrow);
        }
        let start = self.cur.span.start;
        if self.in_generator && self.is_kw("yield") {
            self.advance()?;
            let ends = self.cur.newline_before
                || self.at_eof()
                || matches!(
                    self.cur.kind,
                    TokenKind::Punct(")" | "]" | "}" | "," | ";" | ":")
                );
            let arg = if ends {
                None
            } else {
                self.eat_punct("*")?;
                Some(Box::new(self.parse_assign(no_in)?))
            };
            return Ok(Expr {
                kind: ExprKind::Yield(arg),
                span: Span::new(start, self.last_end),
            });
        }

        let left = self.parse_conditional(no_in)?;
        let op = match &self.cur.kind {
            TokenKind::Punct(op) if ASSIGN_OPS.contains(op) => *op,
            _ => return Ok(left),
        };
        let target = if op == "=" {
            self.expr_to_pattern(left)?
        } else {
            self.simple_target(left)?
        };
        self.advance()?;
        let value = self.parse_assign(no_in)?;
        Ok(Expr {
            kind: ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span: Span::new(start, self.last_end),
        })
    }

    /// Speculatively parse an arrow function head; restores the position when it is not one.
    fn try_arrow(&mut self, no_in: bool) -> PResult<Option<Expr>> {
        let start = self.cur.span.start;
        let snap = self.snapshot();
        let mut is_async = false;
        if self.is_kw("async") {
            let next = self.peek_next()?;
            let head = match &next.kind {
                TokenKind::Punct("(") => true,
                TokenKind::Ident(w) => !is_reserved(w),
                _ => false,
            };
            if head && !next.newline_before {
                self.advance()?;
                is_async = true;
            }
        }

        let params = if self.at_binding_ident() {
            let next = self.peek_next()?;
            if next.kind != TokenKind::Punct("=>") || next.newline_before {
                self.restore(snap);
                return Ok(None);
            }
            let ident = self.binding_ident()?;
            vec![Pattern {
                span: ident.span,
                kind: PatKind::Ident(ident),
            }]
        } else if self.is_punct("(") || (self.is_punct("<") && self.looks_like_type_params()?) {
            let head = (|| -> PResult<Vec<Pattern>> {
                self.skip_type_params()?;
                let params = self.parse_params()?;
                if self.eat_punct(":")? {
                    self.skip_type()?;
                }
                Ok(params)
            })();
            match head {
                Ok(params) if self.is_punct("=>") && !self.cur.newline_before => params,
                _ => {
                    self.restore(snap);
                    return Ok(None);
                }
            }
        } else {
            self.restore(snap);
            return Ok(None);
        };

        self.expect_punct("=>")?;
        let body = if self.is_punct("{") {
            let (body, span) = self.with_generator(false, |p| p.parse_block())?;
            ArrowBody::Block { body, span }
        } else {
            ArrowBody::Expr(Box::new(self.parse_assign(no_in)?))
        };
        Ok(Some(Expr {
            kind: ExprKind::Arrow(Arrow {
                params,
                body,
                is_async,
            }),
            span: Span::new(start, self.last_end),
        }))
    }

    /// `<T,>` or `<T extends ...>`: a generic arrow head rather than JSX.
    fn looks_like_type_params(&mut self) -> PResult<bool> {
        let snap = self.snapshot();
        let verdict = (|| -> PResult<bool> {
            self.advance()?;
            if !self.at_binding_ident() {
                return Ok(false);
            }
            self.advance()?;
            Ok(self.is_punct(",") || self.is_kw("extends"))
        })()
        .unwrap_or(false);
        self.restore(snap);
        Ok(verdict)
    }

    fn parse_conditional(&mut self, no_in: bool) -> PResult<Expr> {
        let start = self.cur.span.start;
        let test = self.parse_binary(1, no_in)?;
        if !self.eat_punct("?")? {
            return Ok(test);
        }
        let cons = self.parse_assign(false)?;
        self.expect_punct(":")?;
        let alt = self.parse_assign(no_in)?;
        Ok(Expr {
            kind: ExprKind::Cond {
                test: Box::new(test),
                cons: Box::new(cons),
                alt: Box::new(alt),
            },
            span: Span::new(start, self.last_end),
        })
    }

    fn binary_op(&self, no_in: bool) -> Option<(&'static str, u8)> {
        match &self.cur.kind {
            TokenKind::Punct(p) => binary_precedence(p).map(|prec| (*p, prec)),
            TokenKind::Ident(w) if w == "instanceof" => Some(("instanceof", 8)),
            TokenKind::Ident(w) if w == "in" && !no_in => Some(("in", 8)),
            TokenKind::Ident(w)
                if (w == "as" || w == "satisfies") && !self.cur.newline_before =>
            {
                Some(("as", 8))
            }
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_prec: u8, no_in: bool) -> PResult<Expr> {
        let start = self.cur.span.start;
        let mut left = self.parse_unary()?;
        while let Some((op, prec)) = self.binary_op(no_in) {
            if prec < min_prec {
                break;
            }
            self.advance()?;
            if op == "as" {
                if !self.eat_kw("const")? {
                    self.skip_type()?;
                }
                left = Expr {
                    kind: ExprKind::TsAs(Box::new(left)),
                    span: Span::new(start, self.last_end),
                };
                continue;
            }
            let next_min = if op == "**" { prec } else { prec + 1 };
            let right = self.parse_binary(next_min, no_in)?;
            left = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span: Span::new(start, self.last_end),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.cur.span.start;
        let kind = match &self.cur.kind {
            TokenKind::Punct(op @ ("!" | "~" | "+" | "-")) => {
                let op = *op;
                self.advance()?;
                ExprKind::Unary {
                    op,
                    arg: Box::new(self.parse_unary()?),
                }
            }
            TokenKind::Punct(op @ ("++" | "--")) => {
                let op = *op;
                self.advance()?;
                ExprKind::Update {
                    op,
                    prefix: true,
                    arg: Box::new(self.parse_unary()?),
                }
            }
            TokenKind::Ident(w) if matches!(w.as_str(), "typeof" | "void" | "delete") => {
                let op = match w.as_str() {
                    "typeof" => "typeof",
                    "void" => "void",
                    _ => "delete",
                };
                self.advance()?;
                ExprKind::Unary {
                    op,
                    arg: Box::new(self.parse_unary()?),
                }
            }
            TokenKind::Ident(w) if w == "await" => {
                let next = self.peek_next()?;
                let operand = !matches!(
                    next.kind,
                    TokenKind::Punct(")" | "]" | "}" | "," | ";" | ":" | "=" | "=>" | ".")
                        | TokenKind::Eof
                );
                if !operand {
                    return self.parse_postfix();
                }
                self.advance()?;
                ExprKind::Await(Box::new(self.parse_unary()?))
            }
            _ => return self.parse_postfix(),
        };
        Ok(Expr {
            kind,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let start = self.cur.span.start;
        let expr = self.parse_call_member()?;
        let op = match &self.cur.kind {
            TokenKind::Punct(op @ ("++" | "--")) if !self.cur.newline_before => *op,
            _ => return Ok(expr),
        };
        self.advance()?;
        Ok(Expr {
            kind: ExprKind::Update {
                op,
                prefix: false,
                arg: Box::new(expr),
            },
            span: Span::new(start, self.last_end),
        })
    }

    fn member_prop(&mut self) -> PResult<MemberProp> {
        let ident = self.ident_name()?;
        Ok(if ident.name.starts_with('#') {
            MemberProp::Private(ident)
        } else {
            MemberProp::Ident(ident)
        })
    }

    fn parse_call_member(&mut self) -> PResult<Expr> {
        let start = self.cur.span.start;
        let mut expr = if self.is_kw("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            if self.is_punct("<") {
                if self.try_call_type_args()? {
                    continue;
                }
                break;
            }
            let kind = match &self.cur.kind {
                TokenKind::Punct(".") => {
                    self.advance()?;
                    ExprKind::Member {
                        object: Box::new(expr),
                        prop: self.member_prop()?,
                        optional: false,
                    }
                }
                TokenKind::Punct("?.") => {
                    self.advance()?;
                    if self.is_punct("(") {
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args: self.parse_args()?,
                            optional: true,
                        }
                    } else if self.eat_punct("[")? {
                        let index = self.parse_expression(false)?;
                        self.expect_punct("]")?;
                        ExprKind::Member {
                            object: Box::new(expr),
                            prop: MemberProp::Computed(Box::new(index)),
                            optional: true,
                        }
                    } else {
                        ExprKind::Member {
                            object: Box::new(expr),
                            prop: self.member_prop()?,
                            optional: true,
                        }
                    }
                }
                TokenKind::Punct("[") => {
                    self.advance()?;
                    let index = self.parse_expression(false)?;
                    self.expect_punct("]")?;
                    ExprKind::Member {
                        object: Box::new(expr),
                        prop: MemberProp::Computed(Box::new(index)),
                        optional: false,
                    }
                }
                TokenKind::Punct("(") => ExprKind::Call {
                    callee: Box::new(expr),
                    args: self.parse_args()?,
                    optional: false,
                },
                TokenKind::Template { .. } => ExprKind::TaggedTemplate {
                    tag: Box::new(expr),
                    tpl: self.parse_template()?,
                },
                TokenKind::Punct("!")
                    if !self.cur.newline_before && self.cur.span.start == self.last_end =>
                {
                    self.advance()?;
                    ExprKind::TsAs(Box::new(expr))
                }
                _ => break,
            };
            expr = Expr {
                kind,
                span: Span::new(start, self.last_end),
            };
        }
        Ok(expr)
    }

    /// `f<T>(...)`: skip explicit type arguments when a call follows.
    fn try_call_type_args(&mut self) -> PResult<bool> {
        let snap = self.snapshot();
        if self.skip_angle().is_ok()
            && (self.is_punct("(") || matches!(self.cur.kind, TokenKind::Template { .. }))
        {
            return Ok(true);
        }
        self.restore(snap);
        Ok(false)
    }

    fn parse_new(&mut self) -> PResult<Expr> {
        let start = self.expect_kw("new")?.start;
        if self.eat_punct(".")? {
            self.ident_name()?;
            return Ok(Expr {
                kind: ExprKind::Meta,
                span: Span::new(start, self.last_end),
            });
        }
        let callee_start = self.cur.span.start;
        let mut callee = if self.is_kw("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            let kind = if self.eat_punct(".")? {
                ExprKind::Member {
                    object: Box::new(callee),
                    prop: self.member_prop()?,
                    optional: false,
                }
            } else if self.eat_punct("[")? {
                let index = self.parse_expression(false)?;
                self.expect_punct("]")?;
                ExprKind::Member {
                    object: Box::new(callee),
                    prop: MemberProp::Computed(Box::new(index)),
                    optional: false,
                }
            } else {
                break;
            };
            callee = Expr {
                kind,
                span: Span::new(callee_start, self.last_end),
            };
        }
        if self.is_punct("<") {
            self.try_call_type_args()?;
        }
        let args = if self.is_punct("(") {
            self.parse_args()?
        } else {
            Vec::new()
        };
        Ok(Expr {
            kind: ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        while !self.is_punct(")") {
            args.push(self.parse_spread_or_assign()?);
            if !self.is_punct(")") {
                self.expect_punct(",")?;
            }
        }
        self.advance()?;
        Ok(args)
    }

    fn parse_spread_or_assign(&mut self) -> PResult<Expr> {
        let start = self.cur.span.start;
        if self.eat_punct("...")? {
            let inner = self.parse_assign(false)?;
            return Ok(Expr {
                kind: ExprKind::Spread(Box::new(inner)),
                span: Span::new(start, self.last_end),
            });
        }
        self.parse_assign(false)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let start = self.cur.span.start;
        let kind = match self.cur.kind.clone() {
            TokenKind::Ident(word) => match word.as_str() {
                "function" => ExprKind::Function(self.parse_function(start, false, false)?),
                "async"
                    if self.peek_next()?.kind == TokenKind::Ident("function".to_owned()) =>
                {
                    self.advance()?;
                    ExprKind::Function(self.parse_function(start, true, false)?)
                }
                "class" => ExprKind::Class(self.parse_class(false)?),
                "this" => {
                    self.advance()?;
                    ExprKind::This
                }
                "super" => {
                    self.advance()?;
                    ExprKind::Super
                }
                "null" => {
                    self.advance()?;
                    ExprKind::Null
                }
                "true" | "false" => {
                    self.advance()?;
                    ExprKind::Bool(word == "true")
                }
                "import" => {
                    self.advance()?;
                    if self.eat_punct(".")? {
                        self.ident_name()?;
                    }
                    ExprKind::Meta
                }
                "new" => return self.parse_new(),
                w if is_reserved(w) => {
                    return Err(SyntaxError::new(
                        self.cur.span,
                        format!("unexpected keyword '{w}'"),
                    ));
                }
                _ => ExprKind::Ident(self.ident_name()?),
            },
            TokenKind::Number(n) => {
                self.advance()?;
                ExprKind::Num(n)
            }
            TokenKind::Str(s) => {
                self.advance()?;
                ExprKind::Str(s)
            }
            TokenKind::Regex => {
                self.advance()?;
                ExprKind::Regex
            }
            TokenKind::Template { .. } => ExprKind::Template(self.parse_template()?),
            TokenKind::Punct("(") => {
                self.advance()?;
                let inner = self.parse_expression(false)?;
                self.expect_punct(")")?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::Punct("[") => self.parse_array()?,
            TokenKind::Punct("{") => self.parse_object()?,
            TokenKind::Punct("<") => return self.parse_jsx_expr(),
            TokenKind::Eof => {
                return Err(SyntaxError::new(self.cur.span, "unexpected end of input"));
            }
            _ => return Err(self.unexpected("expected expression")),
        };
        Ok(Expr {
            kind,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_array(&mut self) -> PResult<ExprKind> {
        self.expect_punct("[")?;
        let mut elems = Vec::new();
        while !self.is_punct("]") {
            if self.at_eof() {
                return Err(self.unexpected("expected ']'"));
            }
            if self.eat_punct(",")? {
                elems.push(None);
                continue;
            }
            elems.push(Some(self.parse_spread_or_assign()?));
            if !self.is_punct("]") {
                self.expect_punct(",")?;
            }
        }
        self.advance()?;
        Ok(ExprKind::Array(elems))
    }

    fn parse_object(&mut self) -> PResult<ExprKind> {
        self.expect_punct("{")?;
        let mut props = Vec::new();
        while !self.is_punct("}") {
            if self.at_eof() {
                return Err(self.unexpected("expected '}'"));
            }
            let start = self.cur.span.start;
            let kind = if self.eat_punct("...")? {
                PropKind::Spread(self.parse_assign(false)?)
            } else {
                let mut is_async = false;
                if let Some(w) = self.cur_word()
                    && matches!(w.as_str(), "async" | "get" | "set")
                {
                    let next = self.peek_next()?;
                    if !matches!(next.kind, TokenKind::Punct("," | ":" | "(" | "}" | "=" | "<")) {
                        self.advance()?;
                        is_async = w == "async";
                    }
                }
                let is_generator = self.eat_punct("*")?;
                let key = self.parse_prop_key()?;
                if self.is_punct("(") || self.is_punct("<") {
                    PropKind::Method {
                        key,
                        func: self.function_rest(start, None, is_async, is_generator)?,
                    }
                } else if self.eat_punct(":")? {
                    PropKind::KeyValue {
                        key,
                        value: self.parse_assign(false)?,
                    }
                } else if let PropKey::Ident(ident) = key {
                    if self.is_punct("=") {
                        // Cover grammar for `({ a = 1 } = obj)`.
                        self.advance()?;
                        let value = self.parse_assign(false)?;
                        let span = Span::new(start, self.last_end);
                        PropKind::KeyValue {
                            key: PropKey::Ident(ident.clone()),
                            value: Expr {
                                kind: ExprKind::Assign {
                                    op: "=",
                                    target: Box::new(Pattern {
                                        span: ident.span,
                                        kind: PatKind::Ident(ident),
                                    }),
                                    value: Box::new(value),
                                },
                                span,
                            },
                        }
                    } else {
                        PropKind::Shorthand(ident)
                    }
                } else {
                    return Err(self.unexpected("expected ':'"));
                }
            };
            props.push(Prop {
                kind,
                span: Span::new(start, self.last_end),
            });
            if !self.is_punct("}") {
                self.expect_punct(",")?;
            }
        }
        self.advance()?;
        Ok(ExprKind::Object(props))
    }

    /// Current token is the head chunk of a template literal.
    fn parse_template(&mut self) -> PResult<Template> {
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        loop {
            let TokenKind::Template { cooked, tail } = self.cur.kind.clone() else {
                return Err(self.unexpected("expected template literal"));
            };
            quasis.push(cooked);
            if tail {
                self.advance()?;
                return Ok(Template { quasis, exprs });
            }
            self.last_end = self.cur.span.end;
            self.cur = self.lexer.next_token(true)?;
            exprs.push(self.parse_expression(false)?);
            if !self.is_punct("}") {
                return Err(self.unexpected("expected '}' to close template substitution"));
            }
            let close = self.cur.span;
            self.lexer.seek(close.end);
            self.cur = self.lexer.template_chunk(close.start, false)?;
        }
    }

    // ---- JSX ----

    fn parse_jsx_expr(&mut self) -> PResult<Expr> {
        let start = self.cur.span.start;
        let el = self.jsx_element(start)?;
        let end = el.span.end;
        self.resume_at(end, false)?;
        self.last_end = end;
        Ok(Expr {
            kind: ExprKind::Jsx(el),
            span: Span::new(start, end),
        })
    }

    /// Element whose `<` sits at `start`; leaves the lexer just past the element.
    fn jsx_element(&mut self, start: usize) -> PResult<JsxElement> {
        self.lexer.seek(start + 1);
        let mut tok = self.lexer.jsx_tag_token()?;
        if tok.kind == TokenKind::Punct(">") {
            let (children, end) = self.jsx_children(None, start)?;
            return Ok(JsxElement {
                name: None,
                attrs: Vec::new(),
                children,
                span: Span::new(start, end),
            });
        }
        let name = self.jsx_name(&mut tok)?;
        let mut attrs = Vec::new();
        loop {
            match tok.kind.clone() {
                TokenKind::Punct("/") => {
                    let close = self.lexer.jsx_tag_token()?;
                    if close.kind != TokenKind::Punct(">") {
                        return Err(SyntaxError::new(close.span, "expected '>' after '/'"));
                    }
                    return Ok(JsxElement {
                        name: Some(name),
                        attrs,
                        children: Vec::new(),
                        span: Span::new(start, close.span.end),
                    });
                }
                TokenKind::Punct(">") => {
                    let (children, end) = self.jsx_children(Some(&name), start)?;
                    return Ok(JsxElement {
                        name: Some(name),
                        attrs,
                        children,
                        span: Span::new(start, end),
                    });
                }
                TokenKind::Ident(first) => {
                    let attr_start = tok.span.start;
                    let mut attr_end = tok.span.end;
                    let mut attr_name = first;
                    let mut next = self.lexer.jsx_tag_token()?;
                    if next.kind == TokenKind::Punct(":") {
                        let local = self.lexer.jsx_tag_token()?;
                        let TokenKind::Ident(local_name) = local.kind else {
                            return Err(SyntaxError::new(local.span, "expected attribute name"));
                        };
                        attr_name = format!("{attr_name}:{local_name}");
                        attr_end = local.span.end;
                        next = self.lexer.jsx_tag_token()?;
                    }
                    if next.kind == TokenKind::Punct("=") {
                        let value = self.jsx_attr_value()?;
                        attrs.push(JsxAttr {
                            kind: JsxAttrKind::Named {
                                name: attr_name,
                                value: Some(value),
                            },
                            span: Span::new(attr_start, self.lexer.pos()),
                        });
                        tok = self.lexer.jsx_tag_token()?;
                    } else {
                        attrs.push(JsxAttr {
                            kind: JsxAttrKind::Named {
                                name: attr_name,
                                value: None,
                            },
                            span: Span::new(attr_start, attr_end),
                        });
                        tok = next;
                    }
                }
                TokenKind::Punct("{") => {
                    let spread = self.jsx_spread(tok.span.end)?;
                    attrs.push(JsxAttr {
                        kind: JsxAttrKind::Spread(spread),
                        span: Span::new(tok.span.start, self.lexer.pos()),
                    });
                    tok = self.lexer.jsx_tag_token()?;
                }
                TokenKind::Eof => {
                    return Err(SyntaxError::new(
                        Span::new(start, start + 1),
                        format!("unterminated JSX tag <{}>", name.text()),
                    ));
                }
                _ => {
                    return Err(SyntaxError::new(
                        tok.span,
                        format!("unexpected {} in JSX tag", tok.kind.describe()),
                    ));
                }
            }
        }
    }

    fn jsx_attr_value(&mut self) -> PResult<JsxAttrValue> {
        let tok = self.lexer.jsx_tag_token()?;
        match tok.kind {
            TokenKind::Str(s) => Ok(JsxAttrValue::Str(s, tok.span)),
            TokenKind::Punct("{") => match self.jsx_container(tok.span.end)? {
                (Some(expr), _) => Ok(JsxAttrValue::Expr(expr)),
                (None, end) => Err(SyntaxError::new(
                    Span::new(tok.span.start, end),
                    "JSX attribute value must not be empty",
                )),
            },
            TokenKind::Punct("<") => {
                let el = self.jsx_element(tok.span.start)?;
                self.lexer.seek(el.span.end);
                Ok(JsxAttrValue::Element(el))
            }
            _ => Err(SyntaxError::new(tok.span, "expected JSX attribute value")),
        }
    }

    /// `{ expr }` container whose `{` ends at `pos`; returns the expression and the end offset.
    fn jsx_container(&mut self, pos: usize) -> PResult<(Option<Expr>, usize)> {
        self.resume_at(pos, true)?;
        if self.is_punct("}") {
            let end = self.cur.span.end;
            self.lexer.seek(end);
            return Ok((None, end));
        }
        let expr = self.parse_expression(false)?;
        if !self.is_punct("}") {
            return Err(self.unexpected("expected '}' to close JSX expression"));
        }
        let end = self.cur.span.end;
        self.lexer.seek(end);
        Ok((Some(expr), end))
    }

    /// `{...expr}` whose `{` ends at `pos`.
    fn jsx_spread(&mut self, pos: usize) -> PResult<Expr> {
        self.resume_at(pos, true)?;
        self.expect_punct("...")?;
        let expr = self.parse_assign(false)?;
        if !self.is_punct("}") {
            return Err(self.unexpected("expected '}' after JSX spread"));
        }
        self.lexer.seek(self.cur.span.end);
        Ok(expr)
    }

    fn jsx_children(
        &mut self,
        name: Option<&JsxName>,
        start: usize,
    ) -> PResult<(Vec<JsxChild>, usize)> {
        let open_text = name.map(JsxName::text).unwrap_or_default();
        let mut children = Vec::new();
        loop {
            if let Some((text, span)) = self.lexer.jsx_text() {
                children.push(JsxChild::Text(text, span));
            }
            let pos = self.lexer.pos();
            let rest = self.lexer.rest();
            if rest.is_empty() {
                return Err(SyntaxError::new(
                    Span::new(start, start + 1),
                    format!("unclosed JSX element <{open_text}>"),
                ));
            }
            if rest.starts_with('{') {
                let after = pos + 1;
                let is_spread = {
                    self.resume_at(after, true)?;
                    self.is_punct("...")
                };
                if is_spread {
                    let expr = self.jsx_spread(after)?;
                    children.push(JsxChild::Spread(expr));
                } else {
                    let (expr, end) = self.jsx_container(after)?;
                    children.push(JsxChild::Expr(expr, Span::new(pos, end)));
                }
                continue;
            }

            self.lexer.seek(pos + 1);
            let tok = self.lexer.jsx_tag_token()?;
            if tok.kind != TokenKind::Punct("/") {
                let el = self.jsx_element(pos)?;
                self.lexer.seek(el.span.end);
                children.push(JsxChild::Element(el));
                continue;
            }

            let mut close = self.lexer.jsx_tag_token()?;
            let close_start = close.span.start;
            let close_text = if close.kind == TokenKind::Punct(">") {
                String::new()
            } else {
                self.jsx_name(&mut close)?.text()
            };
            if close.kind != TokenKind::Punct(">") {
                return Err(SyntaxError::new(close.span, "expected '>' in closing tag"));
            }
            if close_text != open_text {
                return Err(SyntaxError::new(
                    Span::new(close_start, close.span.start),
                    format!("expected closing tag </{open_text}>, found </{close_text}>"),
                ));
            }
            return Ok((children, close.span.end));
        }
    }

    /// Tag name starting at `tok`; leaves the token after the name in `tok`.
    fn jsx_name(&mut self, tok: &mut Token) -> PResult<JsxName> {
        let TokenKind::Ident(first) = tok.kind.clone() else {
            return Err(SyntaxError::new(tok.span, "expected JSX tag name"));
        };
        let first = Ident {
            name: first,
            span: tok.span,
        };
        let mut next = self.lexer.jsx_tag_token()?;
        let name = match next.kind {
            TokenKind::Punct(".") => {
                let mut parts = vec![first];
                while next.kind == TokenKind::Punct(".") {
                    let part = self.lexer.jsx_tag_token()?;
                    let TokenKind::Ident(part_name) = part.kind else {
                        return Err(SyntaxError::new(part.span, "expected JSX member name"));
                    };
                    parts.push(Ident {
                        name: part_name,
                        span: part.span,
                    });
                    next = self.lexer.jsx_tag_token()?;
                }
                JsxName::Member(parts)
            }
            TokenKind::Punct(":") => {
                let local = self.lexer.jsx_tag_token()?;
                let TokenKind::Ident(local_name) = local.kind else {
                    return Err(SyntaxError::new(local.span, "expected JSX name"));
                };
                next = self.lexer.jsx_tag_token()?;
                JsxName::Namespaced(
                    format!("{}:{local_name}", first.name),
                    Span::new(first.span.start, local.span.end),
                )
            }
            _ => JsxName::Ident(first),
        };
        *tok = next;
        Ok(name)
    }

    // ---- TypeScript type skipping ----

    fn skip_type_params(&mut self) -> PResult<()> {
        if self.is_punct("<") {
            self.skip_angle()?;
        }
        Ok(())
    }

    /// Consume one `>` from the current token, splitting `>>`, `>=` and friends.
    fn eat_type_close(&mut self) -> PResult<()> {
        let remainder = match self.cur.kind {
            TokenKind::Punct(">") => None,
            TokenKind::Punct(">>") => Some(">"),
            TokenKind::Punct(">>>") => Some(">>"),
            TokenKind::Punct(">=") => Some("="),
            TokenKind::Punct(">>=") => Some(">="),
            TokenKind::Punct(">>>=") => Some(">>="),
            _ => return Err(self.unexpected("expected '>'")),
        };
        match remainder {
            None => {
                self.advance()?;
            }
            Some(rest) => {
                let split = self.cur.span.start + 1;
                self.last_end = split;
                self.cur = Token {
                    kind: TokenKind::Punct(rest),
                    span: Span::new(split, self.cur.span.end),
                    newline_before: false,
                };
            }
        }
        Ok(())
    }

    fn skip_angle(&mut self) -> PResult<()> {
        self.expect_punct("<")?;
        let mut depth = 1usize;
        while depth > 0 {
            match &self.cur.kind {
                TokenKind::Eof => return Err(self.unexpected("expected '>'")),
                TokenKind::Punct(">" | ">>" | ">>>" | ">=" | ">>=" | ">>>=") => {
                    self.eat_type_close()?;
                    depth -= 1;
                }
                TokenKind::Punct("<") => {
                    self.advance()?;
                    depth += 1;
                }
                TokenKind::Punct("(") => self.skip_balanced("(", ")")?,
                TokenKind::Punct("[") => self.skip_balanced("[", "]")?,
                TokenKind::Punct("{") => self.skip_balanced("{", "}")?,
                TokenKind::Punct(";" | ")" | "]" | "}" | "&&" | "||" | "=" | "+" | "-") => {
                    return Err(self.unexpected("expected type argument"));
                }
                TokenKind::Template { .. } => {
                    self.parse_template()?;
                }
                _ => {
                    self.advance()?;
                }
            }
        }
        Ok(())
    }

    fn skip_balanced(&mut self, open: &str, close: &str) -> PResult<()> {
        let open_span = self.expect_punct(open)?;
        let mut depth = 1usize;
        loop {
            if self.at_eof() {
                return Err(SyntaxError::new(
                    self.cur.span,
                    format!("unclosed '{open}' opened at byte {}", open_span.start),
                ));
            }
            if matches!(self.cur.kind, TokenKind::Template { .. }) {
                self.parse_template()?;
                continue;
            }
            if self.is_punct(open) {
                depth += 1;
            } else if self.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    self.advance()?;
                    return Ok(());
                }
            }
            self.advance()?;
        }
    }

    /// Skip a type annotation, stopping at the first token that cannot continue it.
    fn skip_type(&mut self) -> PResult<()> {
        let mut expect_operand = true;
        let mut after_group = false;
        loop {
            let group = after_group;
            after_group = false;
            match self.cur.kind.clone() {
                TokenKind::Punct("(") if expect_operand => {
                    self.skip_balanced("(", ")")?;
                    expect_operand = false;
                    after_group = true;
                }
                TokenKind::Punct("=>") if group => {
                    self.advance()?;
                    expect_operand = true;
                }
                TokenKind::Punct("{") if expect_operand => {
                    self.skip_balanced("{", "}")?;
                    expect_operand = false;
                }
                TokenKind::Punct("[") if expect_operand || !self.cur.newline_before => {
                    self.skip_balanced("[", "]")?;
                    expect_operand = false;
                }
                TokenKind::Punct("<") => {
                    self.skip_angle()?;
                }
                TokenKind::Punct("|" | "&") => {
                    self.advance()?;
                    expect_operand = true;
                }
                TokenKind::Punct(".") if !expect_operand => {
                    self.advance()?;
                    expect_operand = true;
                }
                TokenKind::Punct("-") if expect_operand => {
                    self.advance()?;
                }
                TokenKind::Ident(w) if expect_operand => {
                    self.advance()?;
                    expect_operand = matches!(
                        w.as_str(),
                        "keyof" | "typeof" | "readonly" | "unique" | "infer" | "new" | "asserts"
                    );
                }
                TokenKind::Ident(w) if w == "is" || w == "extends" => {
                    self.advance()?;
                    expect_operand = true;
                }
                TokenKind::Str(_) | TokenKind::Number(_) if expect_operand => {
                    self.advance()?;
                    expect_operand = false;
                }
                TokenKind::Template { .. } if expect_operand => {
                    self.parse_template()?;
                    expect_operand = false;
                }
                _ => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/syntax/parser.rs"]
mod tests;
