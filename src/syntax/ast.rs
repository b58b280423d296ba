//! Structural tree produced by [`crate::syntax::parse`].
//!
//! Every statement, expression, pattern and JSX node records the byte span it was parsed
//! from, so later passes can both report diagnostics and splice replacement text into the
//! original source without re-printing it.

use crate::syntax::lexer::Span;

/// Parsed artifact: the module body plus the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralTree {
    /// Source text the spans refer to.
    pub source: String,
    /// Top-level statements in source order.
    pub body: Vec<Stmt>,
}

impl StructuralTree {
    /// Source slice covered by `span`.
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or("")
    }
}

/// Identifier occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// Name as written.
    pub name: String,
    /// Location.
    pub span: Span,
}

/// Statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// Statement shape.
    pub kind: StmtKind,
    /// Location, including any trailing semicolon.
    pub span: Span,
}

/// Statement shapes.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum StmtKind {
    Import(ImportDecl),
    /// `export <declaration>`.
    ExportDecl(Box<Stmt>),
    ExportDefault(ExportDefault),
    ExportNamed {
        specifiers: Vec<ExportSpec>,
        source: Option<String>,
    },
    ExportAll {
        alias: Option<Ident>,
        source: String,
    },
    Var(VarDecl),
    Function(Function),
    Class(Class),
    /// TypeScript `interface`/`type`/`declare` forms; only the bound name survives.
    TypeOnly {
        name: Option<Ident>,
    },
    /// TypeScript `enum`; binds a value name.
    Enum {
        name: Ident,
    },
    Expr(Expr),
    Block(Vec<Stmt>),
    If {
        test: Expr,
        cons: Box<Stmt>,
        alt: Option<Box<Stmt>>,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    /// `for..in` and `for..of` (`of` set).
    ForIn {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
        of: bool,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    Return(Option<Expr>),
    Throw(Expr),
    Try {
        block: Vec<Stmt>,
        param: Option<Pattern>,
        handler: Option<Vec<Stmt>>,
        finalizer: Option<Vec<Stmt>>,
    },
    Switch {
        disc: Expr,
        cases: Vec<SwitchCase>,
    },
    Labeled {
        label: Ident,
        body: Box<Stmt>,
    },
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Empty,
    Debugger,
}

/// One `case`/`default` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default`.
    pub test: Option<Expr>,
    /// Arm body.
    pub body: Vec<Stmt>,
}

/// Head of a `for` statement.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
    Pattern(Pattern),
}

/// `import ... from '...'`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Bound names.
    pub specifiers: Vec<ImportSpec>,
    /// Module specifier.
    pub source: String,
    /// `import type`.
    pub type_only: bool,
}

/// One imported binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// Local name.
    pub local: Ident,
    /// Exported name in the source module; `None` for default and namespace imports.
    pub imported: Option<String>,
    /// `import * as local`.
    pub namespace: bool,
}

/// One `export { local as exported }` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpec {
    /// Local name (or re-exported name when a source module is present).
    pub local: Ident,
    /// Exported name.
    pub exported: String,
}

/// `export default ...` payloads.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ExportDefault {
    Expr(Expr),
    Function(Function),
    Class(Class),
}

/// `const`/`let`/`var` kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum VarKind {
    Const,
    Let,
    Var,
}

/// A variable declaration statement (without the trailing semicolon in `span`).
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    /// Declaration keyword.
    pub kind: VarKind,
    /// Declarators in order.
    pub decls: Vec<VarDeclarator>,
}

/// `pattern = init`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    /// Bound pattern.
    pub pattern: Pattern,
    /// Initializer.
    pub init: Option<Expr>,
    /// Location of the declarator.
    pub span: Span,
}

/// Function declaration, expression, method or accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Name when declared with one.
    pub name: Option<Ident>,
    /// Parameters.
    pub params: Vec<Pattern>,
    /// Body statements.
    pub body: Vec<Stmt>,
    /// Span of the `{ ... }` body.
    pub body_span: Span,
    /// `async`.
    pub is_async: bool,
    /// `function*`.
    pub is_generator: bool,
    /// Whole function.
    pub span: Span,
}

/// Arrow function.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    /// Parameters.
    pub params: Vec<Pattern>,
    /// Body.
    pub body: ArrowBody,
    /// `async`.
    pub is_async: bool,
}

/// Arrow function body.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block { body: Vec<Stmt>, span: Span },
}

/// Class declaration or expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    /// Name when present.
    pub name: Option<Ident>,
    /// `extends` clause.
    pub super_class: Option<Box<Expr>>,
    /// Members.
    pub members: Vec<ClassMember>,
    /// Whole class.
    pub span: Span,
}

/// One class member.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    /// Member key.
    pub key: PropKey,
    /// Member body.
    pub value: ClassMemberValue,
    /// `static`.
    pub is_static: bool,
    /// Location.
    pub span: Span,
}

/// Class member bodies.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ClassMemberValue {
    Method(Function),
    Field(Option<Expr>),
    StaticBlock(Vec<Stmt>),
}

/// Binding or assignment pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    /// Pattern shape.
    pub kind: PatKind,
    /// Location.
    pub span: Span,
}

/// Pattern shapes.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum PatKind {
    Ident(Ident),
    Array(Vec<Option<Pattern>>),
    Object(Vec<PatProp>),
    /// `target = value` default.
    Default {
        target: Box<Pattern>,
        value: Box<Expr>,
    },
    Rest(Box<Pattern>),
    /// Member expression as an assignment target.
    Expr(Box<Expr>),
}

/// Object pattern entries.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum PatProp {
    KeyValue { key: PropKey, value: Pattern },
    Rest(Pattern),
}

/// Property keys in object literals, patterns and classes.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum PropKey {
    Ident(Ident),
    Str(String, Span),
    Num(f64, Span),
    Computed(Box<Expr>),
    Private(Ident),
}

impl PropKey {
    /// Static key name, when the key is not computed.
    pub fn name(&self) -> Option<&str> {
        match self {
            PropKey::Ident(i) | PropKey::Private(i) => Some(&i.name),
            PropKey::Str(s, _) => Some(s),
            PropKey::Num(..) | PropKey::Computed(_) => None,
        }
    }
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Expression shape.
    pub kind: ExprKind,
    /// Location.
    pub span: Span,
}

/// Expression shapes.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ExprKind {
    Ident(Ident),
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
    Regex,
    This,
    Super,
    /// `import.meta`, `new.target` and the callee of dynamic `import(...)`.
    Meta,
    Template(Template),
    TaggedTemplate {
        tag: Box<Expr>,
        tpl: Template,
    },
    Array(Vec<Option<Expr>>),
    Object(Vec<Prop>),
    Function(Function),
    Arrow(Arrow),
    Class(Class),
    Unary {
        op: &'static str,
        arg: Box<Expr>,
    },
    Update {
        op: &'static str,
        prefix: bool,
        arg: Box<Expr>,
    },
    Binary {
        op: &'static str,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: &'static str,
        target: Box<Pattern>,
        value: Box<Expr>,
    },
    Cond {
        test: Box<Expr>,
        cons: Box<Expr>,
        alt: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        prop: MemberProp,
        optional: bool,
    },
    Seq(Vec<Expr>),
    Paren(Box<Expr>),
    Spread(Box<Expr>),
    Await(Box<Expr>),
    Yield(Option<Box<Expr>>),
    /// `expr as T`, `expr satisfies T`, `expr!`.
    TsAs(Box<Expr>),
    Jsx(JsxElement),
}

impl Expr {
    /// Identifier name when this is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(i) => Some(&i.name),
            _ => None,
        }
    }

    /// Strip parentheses and TypeScript assertions.
    pub fn unwrap_parens(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(e) | ExprKind::TsAs(e) => e.unwrap_parens(),
            _ => self,
        }
    }

    /// `obj.prop` dotted name for simple member chains (`Math.random`, `React.useState`).
    pub fn dotted_name(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Ident(i) => Some(i.name.clone()),
            ExprKind::Member {
                object,
                prop: MemberProp::Ident(p),
                ..
            } => object.dotted_name().map(|o| format!("{o}.{}", p.name)),
            _ => None,
        }
    }

    /// Numeric literal value, allowing a leading unary minus.
    pub fn as_number(&self) -> Option<f64> {
        match &self.unwrap_parens().kind {
            ExprKind::Num(v) => Some(*v),
            ExprKind::Unary { op: "-", arg } => arg.as_number().map(|v| -v),
            ExprKind::Unary { op: "+", arg } => arg.as_number(),
            _ => None,
        }
    }
}

/// Member access property.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum MemberProp {
    Ident(Ident),
    Private(Ident),
    Computed(Box<Expr>),
}

/// Object literal entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    /// Entry shape.
    pub kind: PropKind,
    /// Location.
    pub span: Span,
}

/// Object literal entry shapes.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum PropKind {
    KeyValue { key: PropKey, value: Expr },
    Shorthand(Ident),
    Spread(Expr),
    Method { key: PropKey, func: Function },
}

/// Template literal: `quasis.len() == exprs.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Cooked text chunks.
    pub quasis: Vec<String>,
    /// Substitutions.
    pub exprs: Vec<Expr>,
}

/// JSX element or fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    /// Tag name; `None` for fragments.
    pub name: Option<JsxName>,
    /// Attributes in order.
    pub attrs: Vec<JsxAttr>,
    /// Children in order.
    pub children: Vec<JsxChild>,
    /// Whole element including closing tag.
    pub span: Span,
}

/// JSX tag names.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum JsxName {
    /// `div`, `Card`, `my-element`.
    Ident(Ident),
    /// `Foo.Bar.Baz`.
    Member(Vec<Ident>),
    /// `svg:rect`.
    Namespaced(String, Span),
}

impl JsxName {
    /// Name as written in source.
    pub fn text(&self) -> String {
        match self {
            JsxName::Ident(i) => i.name.clone(),
            JsxName::Member(parts) => parts
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join("."),
            JsxName::Namespaced(s, _) => s.clone(),
        }
    }
}

/// JSX attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxAttr {
    /// Attribute shape.
    pub kind: JsxAttrKind,
    /// Location.
    pub span: Span,
}

/// JSX attribute shapes.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum JsxAttrKind {
    Named {
        name: String,
        value: Option<JsxAttrValue>,
    },
    Spread(Expr),
}

/// JSX attribute values.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum JsxAttrValue {
    Str(String, Span),
    Expr(Expr),
    Element(JsxElement),
}

/// JSX children.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum JsxChild {
    Text(String, Span),
    /// `{expr}`; `None` for empty or comment-only containers.
    Expr(Option<Expr>, Span),
    Spread(Expr),
    Element(JsxElement),
}
