use super::*;
use crate::syntax::lexer::Span;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WrightError::config("x")
            .to_string()
            .contains("config error:")
    );
    assert!(
        WrightError::project("x")
            .to_string()
            .contains("project error:")
    );
    assert!(
        WrightError::oracle("x")
            .to_string()
            .contains("oracle error:")
    );
    assert!(
        WrightError::render("x")
            .to_string()
            .contains("render error:")
    );
}

#[test]
fn syntax_error_converts_and_keeps_offset() {
    let err: WrightError = SyntaxError::new(Span { start: 7, end: 8 }, "unexpected '}'").into();
    let s = err.to_string();
    assert!(s.starts_with("syntax error:"));
    assert!(s.contains("byte 7"));
}

#[test]
fn recovery_exhausted_lists_paths() {
    let err = WrightError::RecoveryExhausted {
        attempts: 3,
        missing: vec!["src/".to_owned(), "public/".to_owned()],
    };
    let s = err.to_string();
    assert!(s.contains("3 attempt(s)"));
    assert!(s.contains("src/, public/"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WrightError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
