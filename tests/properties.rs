//! Property-based checks of the compiler's semantic rules.

use proptest::prelude::*;
use teenyc::{ErrorKind, generate_c};

/// Lower-case names never collide with the upper-case keywords.
fn ident() -> impl Strategy<Value = String> {
  "[a-z][a-z0-9]{0,6}"
}

proptest! {
  /// However often a variable is assigned or read, it is declared once.
  #[test]
  fn declarations_are_unique(
    names in prop::collection::vec(ident(), 1..8),
    repeats in 1usize..4,
  ) {
    let mut program = String::new();
    for _ in 0..repeats {
      for name in &names {
        program.push_str(&format!("LET {name} = 1\nINPUT {name}\nPRINT {name}\n"));
      }
    }
    let out = generate_c("prop.tt", &program).unwrap();
    for name in &names {
      let decl = format!("\nfloat {name};\n");
      prop_assert_eq!(out.matches(&decl).count(), 1);
    }
  }

  /// A jump compiles exactly when its label is declared once, wherever the
  /// label sits relative to the jump.
  #[test]
  fn goto_needs_exactly_one_label(
    label in ident(),
    before in any::<bool>(),
    declared in 0usize..3,
  ) {
    let labels = format!("LABEL {label}\n").repeat(declared);
    let jump = format!("GOTO {label}\n");
    let program = if before {
      format!("{labels}{jump}")
    } else {
      format!("{jump}{labels}")
    };

    match (declared, generate_c("prop.tt", &program)) {
      (1, result) => {
        prop_assert!(result.is_ok());
      }
      (0, result) => {
        let err = result.unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Semantic);
        let expected = format!("undeclared label: {label}");
        prop_assert!(err.to_string().contains(&expected));
      }
      (_, result) => {
        let err = result.unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Semantic);
        prop_assert!(err.to_string().contains("label already declared"));
      }
    }
  }

  /// Reading a name before any LET/INPUT of it fails, in every position
  /// that takes an expression.
  #[test]
  fn use_before_definition_fails(name in ident(), form in 0usize..4) {
    let program = match form {
      0 => format!("PRINT {name}\n"),
      1 => format!("IF {name} > 1 THEN\nENDIF\n"),
      2 => format!("WHILE 1 < {name} REPEAT\nENDWHILE\n"),
      _ => format!("LET {name} = 2 * {name}\n"),
    };
    let err = generate_c("prop.tt", &program).unwrap_err();
    prop_assert_eq!(err.kind(), ErrorKind::Semantic);
    prop_assert!(err.to_string().contains("referencing variable before assignment"));
  }

  /// Characters that mean something to printf never make it through the
  /// lexer, wherever they appear in a string.
  #[test]
  fn strings_reject_format_characters(
    prefix in "[a-zA-Z ]{0,8}",
    bad in prop::sample::select(vec!['%', '\\', '\t', '\n', '\r']),
    suffix in "[a-zA-Z ]{0,8}",
  ) {
    let program = format!("PRINT \"{prefix}{bad}{suffix}\"\n");
    let err = generate_c("prop.tt", &program).unwrap_err();
    prop_assert_eq!(err.kind(), ErrorKind::Lexical);
  }

  /// A decimal point must be followed by a digit.
  #[test]
  fn trailing_decimal_point_is_rejected(whole in 0u32..100_000, tail in "[ a-z]?") {
    let program = format!("PRINT {whole}.{tail}");
    let err = generate_c("prop.tt", &program).unwrap_err();
    prop_assert_eq!(err.kind(), ErrorKind::Lexical);
  }

  /// Well-formed decimals pass through to the C text unchanged.
  #[test]
  fn decimals_are_copied_verbatim(whole in 0u32..100_000, frac in "[0-9]{1,4}") {
    let literal = format!("{whole}.{frac}");
    let out = generate_c("prop.tt", &format!("LET x = {literal}\n")).unwrap();
    let expected = format!("x = {literal};\n");
    prop_assert!(out.contains(&expected));
  }

  /// Integer literals become float constants; leading zeros never read as
  /// octal.
  #[test]
  fn integers_become_float_constants(whole in 0u32..100_000, zeros in 0usize..3) {
    let literal = format!("{}{whole}", "0".repeat(zeros));
    let out = generate_c("prop.tt", &format!("LET x = {literal}\n")).unwrap();
    let expected = format!("x = {whole}.0;\n");
    prop_assert!(out.contains(&expected));
  }
}
