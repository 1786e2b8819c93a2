use crate::{
    radical,
    syntax::{BinaryOperator, SyntaxNode, UnaryOperator},
};
use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
    ops::Range,
};

/// Parse a [`SyntaxNode`] tree from some text.
///
/// Every `^` is treated as the power operator, `**`. Spans in any
/// [`ParseError`] refer to the text after that substitution.
pub fn parse(s: &str) -> Result<SyntaxNode, ParseError> {
    let normalized = s.replace('^', "**");
    Parser::new(&normalized).parse()
}

/// How deeply expressions may nest. Each bracket, unary operator, `**` and
/// chained binary operator counts as one level.
const MAX_DEPTH: usize = 256;

/// A simple recursive descent parser (`LL(1)`) for converting a string into a
/// syntax tree.
///
/// The grammar:
///
/// ```text
/// expression     := term (("+" | "-") term)*
///
/// term           := unary (("*" | "/" | "//" | "%") unary)*
///
/// unary          := "-" unary
///                 | "+" unary
///                 | power
///
/// power          := atom "**" unary
///                 | atom
///
/// atom           := variable_or_function_call
///                 | "(" expression ")"
///                 | NUMBER
///
/// variable_or_function_call = IDENTIFIER "(" arguments ")"
///                           | IDENTIFIER
///
/// arguments      := (expression ("," expression)*)?
/// ```
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
    depth: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
            depth: 0,
            end: src.len(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<SyntaxNode, ParseError> {
        let expr = self.expression()?;

        match self.tokens.next() {
            None => Ok(expr),
            Some(Ok(token)) => Err(ParseError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected: &[],
            }),
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens
            .peek()
            .and_then(|result| result.as_ref().ok())
            .map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    /// Go one level deeper into the tree.
    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;

        if self.depth <= MAX_DEPTH {
            return Ok(());
        }

        let index = match self.tokens.peek() {
            Some(Ok(token)) => token.span.start,
            _ => self.end,
        };
        Err(ParseError::TooDeeplyNested { index })
    }

    fn expression(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut left = self.term()?;
        let mut chained = 0;

        while let Some(op) =
            self.binary_operator(&[TokenKind::Plus, TokenKind::Minus])?
        {
            self.descend()?;
            chained += 1;
            let right = self.term()?;
            left = SyntaxNode::binary(op, left, right);
        }

        self.depth -= chained;
        Ok(left)
    }

    fn term(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut left = self.unary()?;
        let mut chained = 0;

        while let Some(op) = self.binary_operator(&[
            TokenKind::Times,
            TokenKind::Divide,
            TokenKind::FloorDivide,
            TokenKind::Percent,
        ])? {
            self.descend()?;
            chained += 1;
            let right = self.unary()?;
            left = SyntaxNode::binary(op, left, right);
        }

        self.depth -= chained;
        Ok(left)
    }

    /// Skip past the next token if it's one of the `expected` operators.
    fn binary_operator(
        &mut self,
        expected: &[TokenKind],
    ) -> Result<Option<BinaryOperator>, ParseError> {
        match self.peek() {
            Some(kind) if expected.contains(&kind) => {
                let _ = self.advance()?;
                Ok(Some(kind.as_binary_op()))
            },
            _ => Ok(None),
        }
    }

    fn unary(&mut self) -> Result<SyntaxNode, ParseError> {
        self.descend()?;
        let node = self.unary_operand()?;
        self.depth -= 1;

        Ok(node)
    }

    fn unary_operand(&mut self) -> Result<SyntaxNode, ParseError> {
        let op = match self.peek() {
            Some(TokenKind::Minus) => UnaryOperator::Negate,
            Some(TokenKind::Plus) => UnaryOperator::Plus,
            _ => return self.power(),
        };

        let _ = self.advance()?;
        let operand = self.unary()?;

        Ok(SyntaxNode::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn power(&mut self) -> Result<SyntaxNode, ParseError> {
        let base = self.atom()?;

        if self.peek() == Some(TokenKind::DoubleStar) {
            let _ = self.advance()?;
            // right associative, and the exponent may be negated
            let exponent = self.unary()?;
            return Ok(SyntaxNode::binary(BinaryOperator::Power, base, exponent));
        }

        Ok(base)
    }

    fn atom(&mut self) -> Result<SyntaxNode, ParseError> {
        let expected = &[
            TokenKind::Number,
            TokenKind::Identifier,
            TokenKind::OpenParen,
        ];

        match self.peek() {
            Some(TokenKind::Number) => {
                return self.number();
            },
            Some(TokenKind::Identifier) => {
                return self.variable_or_function_call()
            },
            Some(TokenKind::OpenParen) => {
                let _ = self.advance()?;
                let expr = self.expression()?;
                self.expect_close_paren()?;
                return Ok(expr);
            },
            _ => {},
        }

        // we couldn't parse the atom, return a nice error
        match self.tokens.next() {
            Some(Ok(Token { span, kind, .. })) => {
                Err(ParseError::UnexpectedToken {
                    found: kind,
                    expected,
                    span,
                })
            },
            Some(Err(e)) => Err(e),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn expect_close_paren(&mut self) -> Result<(), ParseError> {
        let Token { kind, span, .. } = self.advance()?;

        if kind == TokenKind::CloseParen {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                found: kind,
                span,
                expected: &[TokenKind::CloseParen],
            })
        }
    }

    fn variable_or_function_call(&mut self) -> Result<SyntaxNode, ParseError> {
        let ident = self.advance()?;
        debug_assert_eq!(ident.kind, TokenKind::Identifier);

        if self.peek() == Some(TokenKind::OpenParen) {
            self.function_call(ident)
        } else {
            Ok(SyntaxNode::Variable(ident.text.into()))
        }
    }

    fn function_call(
        &mut self,
        identifier: Token<'a>,
    ) -> Result<SyntaxNode, ParseError> {
        let open_paren = self.advance()?;
        debug_assert_eq!(open_paren.kind, TokenKind::OpenParen);

        let mut arguments = Vec::new();

        if self.peek() != Some(TokenKind::CloseParen) {
            arguments.push(self.expression()?);

            while self.peek() == Some(TokenKind::Comma) {
                let _ = self.advance()?;
                arguments.push(self.expression()?);
            }
        }

        self.expect_close_paren()?;

        Ok(SyntaxNode::Call {
            function: identifier.text.into(),
            arguments,
        })
    }

    fn number(&mut self) -> Result<SyntaxNode, ParseError> {
        let token = self.advance()?;
        debug_assert_eq!(token.kind, TokenKind::Number);

        match radical::parse_decimal(token.text) {
            Some(number) => Ok(SyntaxNode::Literal(number)),
            None => Err(ParseError::InvalidNumber { span: token.span }),
        }
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("invalid number at index {}", span.start)]
    InvalidNumber { span: Range<usize> },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("the expression is nested too deeply at index {index}")]
    TooDeeplyNested { index: usize },
    #[error("unexpected {found} at index {}", span.start)]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(
        &mut self,
        kind: TokenKind,
    ) -> Option<Result<Token<'a>, ParseError>> {
        let start = self.cursor;
        self.advance()?;
        let end = self.cursor;

        Some(Ok(Token::from_text(self.src, start..end, kind)))
    }

    /// Chomp either a single-character operator or, if it is immediately
    /// followed by `second`, the two-character operator.
    fn chomp_one_or_two(
        &mut self,
        second: char,
        single: TokenKind,
        double: TokenKind,
    ) -> Option<Result<Token<'a>, ParseError>> {
        let start = self.cursor;
        self.advance()?;

        let kind = if self.peek() == Some(second) {
            self.advance();
            double
        } else {
            single
        };

        Some(Ok(Token::from_text(self.src, start..self.cursor, kind)))
    }

    fn take_while<P>(
        &mut self,
        mut predicate: P,
    ) -> Option<(&'a str, Range<usize>)>
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        let end = self.cursor;

        if start != end {
            let text = &self.src[start..end];
            Some((text, start..end))
        } else {
            None
        }
    }

    fn chomp_integer(&mut self) { self.take_while(|c| c.is_ascii_digit()); }

    fn chomp_number(&mut self) -> Token<'a> {
        let start = self.cursor;
        self.chomp_integer();

        if self.peek() == Some('.') {
            // skip past the decimal
            self.advance();
            self.chomp_integer();
        }

        let end = self.cursor;

        Token::from_text(self.src, start..end, TokenKind::Number)
    }

    fn chomp_identifier(&mut self) -> Token<'a> {
        let start = self.cursor;
        let mut seen_first_character = false;

        self.take_while(|c| {
            if seen_first_character {
                c.is_ascii_alphanumeric() || c == '_'
            } else {
                seen_first_character = true;
                c.is_ascii_alphabetic() || c == '_'
            }
        });

        Token::from_text(self.src, start..self.cursor, TokenKind::Identifier)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '(' => self.chomp(TokenKind::OpenParen),
                ')' => self.chomp(TokenKind::CloseParen),
                ',' => self.chomp(TokenKind::Comma),
                '+' => self.chomp(TokenKind::Plus),
                '-' => self.chomp(TokenKind::Minus),
                '%' => self.chomp(TokenKind::Percent),
                '*' => self.chomp_one_or_two(
                    '*',
                    TokenKind::Times,
                    TokenKind::DoubleStar,
                ),
                '/' => self.chomp_one_or_two(
                    '/',
                    TokenKind::Divide,
                    TokenKind::FloorDivide,
                ),
                '_' | 'a'..='z' | 'A'..='Z' => {
                    Some(Ok(self.chomp_identifier()))
                },
                '0'..='9' => Some(Ok(self.chomp_number())),
                other => {
                    let index = self.cursor;
                    // make sure we don't keep yielding the same error
                    self.advance();
                    Some(Err(ParseError::InvalidCharacter {
                        character: other,
                        index,
                    }))
                },
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(
        src: &'a str,
        span: Range<usize>,
        kind: TokenKind,
    ) -> Self {
        Token {
            text: &src[span.clone()],
            span,
            kind,
        }
    }
}

/// The kinds of token that can appear in an expression's text form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    Number,
    OpenParen,
    CloseParen,
    Comma,
    Plus,
    Minus,
    Times,
    Divide,
    FloorDivide,
    Percent,
    DoubleStar,
}

impl TokenKind {
    fn as_binary_op(self) -> BinaryOperator {
        match self {
            TokenKind::Plus => BinaryOperator::Plus,
            TokenKind::Minus => BinaryOperator::Minus,
            TokenKind::Times => BinaryOperator::Times,
            TokenKind::Divide => BinaryOperator::Divide,
            TokenKind::FloorDivide => BinaryOperator::FloorDivide,
            TokenKind::Percent => BinaryOperator::Modulo,
            TokenKind::DoubleStar => BinaryOperator::Power,
            other => unreachable!("{:?} is not a binary op", other),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::OpenParen => "\"(\"",
            TokenKind::CloseParen => "\")\"",
            TokenKind::Comma => "\",\"",
            TokenKind::Plus => "\"+\"",
            TokenKind::Minus => "\"-\"",
            TokenKind::Times => "\"*\"",
            TokenKind::Divide => "\"/\"",
            TokenKind::FloorDivide => "\"//\"",
            TokenKind::Percent => "\"%\"",
            TokenKind::DoubleStar => "\"**\"",
        };

        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    macro_rules! tokenize_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let mut tokens = Tokens::new($src);

                let got = tokens.next().unwrap().unwrap();

                let Range { start, end } = got.span;
                assert_eq!(start, 0);
                assert_eq!(end, $src.len());
                assert_eq!(got.kind, $should_be);

                assert!(
                    tokens.next().is_none(),
                    "{:?} should be empty",
                    tokens
                );
            }
        };
    }

    tokenize_test!(open_paren, "(", TokenKind::OpenParen);
    tokenize_test!(close_paren, ")", TokenKind::CloseParen);
    tokenize_test!(comma, ",", TokenKind::Comma);
    tokenize_test!(plus, "+", TokenKind::Plus);
    tokenize_test!(minus, "-", TokenKind::Minus);
    tokenize_test!(times, "*", TokenKind::Times);
    tokenize_test!(double_star, "**", TokenKind::DoubleStar);
    tokenize_test!(divide, "/", TokenKind::Divide);
    tokenize_test!(floor_divide, "//", TokenKind::FloorDivide);
    tokenize_test!(percent, "%", TokenKind::Percent);
    tokenize_test!(single_digit_integer, "3", TokenKind::Number);
    tokenize_test!(multi_digit_integer, "31", TokenKind::Number);
    tokenize_test!(number_with_trailing_dot, "31.", TokenKind::Number);
    tokenize_test!(simple_decimal, "3.14", TokenKind::Number);
    tokenize_test!(simple_identifier, "x", TokenKind::Identifier);
    tokenize_test!(longer_identifier, "hello", TokenKind::Identifier);
    tokenize_test!(
        identifiers_can_have_underscores,
        "hello_world",
        TokenKind::Identifier
    );
    tokenize_test!(
        identifiers_can_start_with_underscores,
        "_hello_world",
        TokenKind::Identifier
    );
    tokenize_test!(
        identifiers_can_contain_numbers,
        "var5",
        TokenKind::Identifier
    );

    #[test]
    fn invalid_characters_are_reported_once() {
        let mut tokens = Tokens::new("$3");

        assert_eq!(
            tokens.next(),
            Some(Err(ParseError::InvalidCharacter {
                character: '$',
                index: 0
            }))
        );
        assert_eq!(tokens.next().unwrap().unwrap().kind, TokenKind::Number);
    }
}

#[cfg(test)]
mod parser_tests {
    use super::*;

    macro_rules! parser_test {
        ($name:ident, $src:expr) => {
            parser_test!($name, $src, $src);
        };
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let got = parse($src).unwrap();

                let round_tripped = got.to_string();
                assert_eq!(round_tripped, $should_be);
            }
        };
    }

    parser_test!(simple_integer, "1");
    parser_test!(one_plus_one, "1 + 1");
    parser_test!(one_plus_one_plus_negative_one, "1 + -1");
    parser_test!(one_plus_one_times_three, "1 + 1*3");
    parser_test!(one_plus_one_all_times_three, "(1 + 1)*3");
    parser_test!(negative_one, "-1");
    parser_test!(negative_one_plus_x, "-1 + x");
    parser_test!(number_in_parens, "(1)", "1");
    parser_test!(bimdas, "1*2 + 3*4/(5 - 2)*1 - 3");
    parser_test!(subtraction_is_left_associative, "1 - 2 - 3");
    parser_test!(explicit_grouping_is_kept, "1 - (2 - 3)");
    parser_test!(division_is_left_associative, "8/4/2");
    parser_test!(caret_is_power, "2^3", "2**3");
    parser_test!(power_is_right_associative, "2^3^2", "2**3**2");
    parser_test!(explicit_power_grouping_is_kept, "(2^3)^2", "(2**3)**2");
    parser_test!(power_binds_tighter_than_negation, "-2^2", "-2**2");
    parser_test!(negated_base, "(-2)^2", "(-2)**2");
    parser_test!(negative_exponent, "2^-1", "2**-1");
    parser_test!(decimals_are_exact, "0.5", "1/2");
    parser_test!(floor_division, "7 // 2", "7//2");
    parser_test!(modulo, "7 % 2", "7%2");
    parser_test!(function_call, "sin(1)", "sin(1)");
    parser_test!(function_call_with_expression, "sin(1/0)");
    parser_test!(function_call_with_many_arguments, "max(1, x, 3)");
    parser_test!(
        function_calls_function_calls_function_with_variable,
        "foo(bar(baz(pi)))"
    );

    #[test]
    fn products_bind_tighter_than_sums() {
        let got = parse("5 + 3 * (2 - 1)").unwrap();

        match got {
            SyntaxNode::Binary {
                op: BinaryOperator::Plus,
                right,
                ..
            } => assert!(matches!(
                *right,
                SyntaxNode::Binary {
                    op: BinaryOperator::Times,
                    ..
                }
            )),
            other => panic!("Expected an addition, found {}", other),
        }
    }

    #[test]
    fn invalid_token() {
        let got = parse("5 $ 3").unwrap_err();

        assert_eq!(
            got,
            ParseError::InvalidCharacter {
                character: '$',
                index: 2
            }
        );
    }

    #[test]
    fn malformed_input() {
        let inputs = vec!["", "   ", "(1 + 2", "1 + 2)", "5 3", "1 +", "*2"];

        for src in inputs {
            assert!(parse(src).is_err(), "{:?} should fail", src);
        }
    }

    #[test]
    fn deeply_nested_brackets_are_rejected() {
        let src = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));

        let got = parse(&src).unwrap_err();

        assert_eq!(got, ParseError::TooDeeplyNested { index: MAX_DEPTH });
    }

    #[test]
    fn long_chains_of_operators_are_rejected() {
        let inputs = vec![
            "-".repeat(1000) + "1",
            vec!["2"; 1000].join("^"),
            vec!["1"; 1000].join(" + "),
        ];

        for src in inputs {
            let got = parse(&src).unwrap_err();
            assert!(
                matches!(got, ParseError::TooDeeplyNested { .. }),
                "{:?}",
                got
            );
        }
    }

    #[test]
    fn reasonable_nesting_is_fine() {
        let src = format!("{}x{}", "(".repeat(200), ")".repeat(200));

        let got = parse(&src).unwrap();

        assert_eq!(got, SyntaxNode::Variable("x".into()));
    }

    #[test]
    fn unbalanced_brackets_say_what_was_expected() {
        let got = parse("(1 + 2 3").unwrap_err();

        assert_eq!(
            got,
            ParseError::UnexpectedToken {
                found: TokenKind::Number,
                span: 7..8,
                expected: &[TokenKind::CloseParen],
            }
        );
    }
}
