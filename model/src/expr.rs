// Licensed under the Apache-2.0 license

//! Offset-expression parser.
//!
//! Register offsets are written either as a plain hex literal (`0x010`) or as
//! an index-parameterized expression `0x010 + idx*0x4`, where `idx` must be
//! declared in the variable-range table. The grammar is fixed:
//!
//! ```text
//! BASE_HEX ( '+' VAR '*' STEP_HEX )?
//! ```
//!
//! with case-insensitive `0x` prefixes and no other characters permitted
//! before or after. Anything else is a [`FormatError::Offset`].

use crate::error::FormatError;
use winnow::ascii::{hex_digit1, multispace0};
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::token::{one_of, take_while};
use winnow::{ModalResult, Parser};

/// A parsed offset expression: a base address plus an optional
/// variable-index step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetExpr {
    /// Base byte offset within the module window.
    pub base: u64,
    /// Variable name and step, present only for indexed registers.
    pub var: Option<(String, u64)>,
}

fn hex_literal(input: &mut &str) -> ModalResult<u64> {
    preceded(alt(("0x", "0X")), hex_digit1)
        .try_map(|digits: &str| u64::from_str_radix(digits, 16))
        .parse_next(input)
}

fn identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn offset_expr(input: &mut &str) -> ModalResult<OffsetExpr> {
    delimited(
        multispace0,
        (
            hex_literal,
            opt((
                delimited(multispace0, '+', multispace0),
                identifier,
                delimited(multispace0, '*', multispace0),
                hex_literal,
            )),
        ),
        multispace0,
    )
    .map(|(base, tail)| OffsetExpr {
        base,
        var: tail.map(|(_, name, _, step)| (name.to_string(), step)),
    })
    .parse_next(input)
}

/// Parse an offset-expression cell.
///
/// The whole input must match the grammar; trailing garbage, a missing
/// operand, or a malformed hex literal all fail.
pub fn parse_offset_expr(expr: &str) -> Result<OffsetExpr, FormatError> {
    offset_expr
        .parse(expr)
        .map_err(|_| FormatError::Offset(expr.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_base() {
        assert_eq!(
            parse_offset_expr("0x004").unwrap(),
            OffsetExpr {
                base: 4,
                var: None
            }
        );
        assert_eq!(parse_offset_expr("0XFF").unwrap().base, 0xff);
        assert_eq!(parse_offset_expr("  0x10  ").unwrap().base, 0x10);
    }

    #[test]
    fn indexed_expression() {
        let expr = parse_offset_expr("0x010 + idx*0x4").unwrap();
        assert_eq!(expr.base, 0x10);
        assert_eq!(expr.var, Some(("idx".to_string(), 4)));

        let tight = parse_offset_expr("0x20+ch_id * 0x08").unwrap();
        assert_eq!(tight.var, Some(("ch_id".to_string(), 8)));
    }

    #[test]
    fn rejects_deviations() {
        for bad in [
            "",
            "004",
            "0x",
            "0x10 +",
            "0x10 + idx",
            "0x10 + idx *",
            "0x10 + idx * 4",
            "0x10 + 3 * 0x4",
            "0x10 junk",
            "idx * 0x4",
            "0xzz",
        ] {
            assert!(
                parse_offset_expr(bad).is_err(),
                "`{bad}` should be rejected"
            );
        }
    }

    #[test]
    fn variable_names_start_alpha() {
        assert!(parse_offset_expr("0x0 + _idx * 0x4").is_ok());
        assert!(parse_offset_expr("0x0 + idx2 * 0x4").is_ok());
        assert!(parse_offset_expr("0x0 + 2idx * 0x4").is_err());
    }
}
