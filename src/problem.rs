use std::fmt;

use itertools::Itertools;
use rand::Rng;

use crate::operator::Operator;

/// Which component of the statement the player has to fill in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blank {
    First,
    Second,
    Result,
}

impl Blank {
    const ALL: [Blank; 3] = [Blank::First, Blank::Second, Blank::Result];
}

/// Whether the statement reads `A op B = C` or `C = A op B`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOrder {
    OperandsFirst,
    ResultFirst,
}

/// One displayable piece of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Number(i64),
    Operator(Operator),
    Equals,
    Blank,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::Equals => f.write_str("="),
            Token::Blank => f.write_str("_"),
        }
    }
}

/// A single arithmetic statement with one component blanked out.
///
/// The layout (blank position and display order) is fixed at construction,
/// so the same instance always reads the same way when it is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    first: i64,
    second: i64,
    operator: Operator,
    result: i64,
    blank: Blank,
    order: DisplayOrder,
    tokens: Vec<Token>,
}

impl Problem {
    /// Build a problem with a blank position and display order drawn from `rng`.
    ///
    /// `None` if the result overflows.
    pub fn new<R: Rng + ?Sized>(
        first: i64,
        second: i64,
        operator: Operator,
        rng: &mut R,
    ) -> Option<Self> {
        let blank = Blank::ALL[rng.gen_range(0..Blank::ALL.len())];
        let order = if rng.gen_bool(0.5) {
            DisplayOrder::OperandsFirst
        } else {
            DisplayOrder::ResultFirst
        };
        Self::with_layout(first, second, operator, blank, order)
    }

    pub fn with_layout(
        first: i64,
        second: i64,
        operator: Operator,
        blank: Blank,
        order: DisplayOrder,
    ) -> Option<Self> {
        let result = operator.apply(first, second)?;

        let component = |which: Blank, value: i64| {
            if which == blank {
                Token::Blank
            } else {
                Token::Number(value)
            }
        };
        let a = component(Blank::First, first);
        let b = component(Blank::Second, second);
        let c = component(Blank::Result, result);
        let op = Token::Operator(operator);

        let tokens = match order {
            DisplayOrder::OperandsFirst => vec![a, op, b, Token::Equals, c],
            DisplayOrder::ResultFirst => vec![c, Token::Equals, a, op, b],
        };

        Some(Self {
            first,
            second,
            operator,
            result,
            blank,
            order,
            tokens,
        })
    }

    pub fn first(&self) -> i64 {
        self.first
    }

    pub fn second(&self) -> i64 {
        self.second
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn result(&self) -> i64 {
        self.result
    }

    pub fn blank(&self) -> Blank {
        self.blank
    }

    pub fn order(&self) -> DisplayOrder {
        self.order
    }

    /// The value hidden behind the blank
    pub fn answer(&self) -> i64 {
        match self.blank {
            Blank::First => self.first,
            Blank::Second => self.second,
            Blank::Result => self.result,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_correct(&self, answer: i64) -> bool {
        answer == self.answer()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.iter().join(" "))
    }
}
