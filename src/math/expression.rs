use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use pest::Parser;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::error::{EvaluationError, ExpressionSyntaxError};

#[derive(Parser)]
#[grammar = "math/expression.pest"]
struct FormulaParser;

// Later entries bind tighter, so `-x^2` reads as `-(x^2)`.
static PRATT: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::subtract, Assoc::Left))
        .op(Op::infix(Rule::multiply, Assoc::Left) | Op::infix(Rule::divide, Assoc::Left))
        .op(Op::prefix(Rule::negate) | Op::prefix(Rule::plus))
        .op(Op::infix(Rule::power, Assoc::Right))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    X,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Subtract => lhs - rhs,
            BinaryOp::Multiply => lhs * rhs,
            BinaryOp::Divide => lhs / rhs,
            BinaryOp::Power => lhs.powf(rhs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Named functions callable from a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Cbrt,
    Abs,
    Sign,
    Exp,
    Log,
    Log10,
    Log2,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
    Pow,
    Atan2,
    Hypot,
    Mod,
}

impl Function {
    pub fn lookup(name: &str) -> Option<Self> {
        let function = match name {
            "sqrt" => Function::Sqrt,
            "cbrt" => Function::Cbrt,
            "abs" => Function::Abs,
            "sign" => Function::Sign,
            "exp" => Function::Exp,
            "log" | "ln" => Function::Log,
            "log10" => Function::Log10,
            "log2" => Function::Log2,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "round" => Function::Round,
            "min" => Function::Min,
            "max" => Function::Max,
            "pow" => Function::Pow,
            "atan2" => Function::Atan2,
            "hypot" => Function::Hypot,
            "mod" => Function::Mod,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Cbrt => "cbrt",
            Function::Abs => "abs",
            Function::Sign => "sign",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Log10 => "log10",
            Function::Log2 => "log2",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Round => "round",
            Function::Min => "min",
            Function::Max => "max",
            Function::Pow => "pow",
            Function::Atan2 => "atan2",
            Function::Hypot => "hypot",
            Function::Mod => "mod",
        }
    }

    fn arity(self) -> Arity {
        match self {
            Function::Min | Function::Max => Arity::AtLeast(1),
            Function::Pow | Function::Atan2 | Function::Hypot | Function::Mod => Arity::Exactly(2),
            Function::Sqrt
            | Function::Cbrt
            | Function::Abs
            | Function::Sign
            | Function::Exp
            | Function::Log
            | Function::Log10
            | Function::Log2
            | Function::Sin
            | Function::Cos
            | Function::Tan
            | Function::Asin
            | Function::Acos
            | Function::Atan
            | Function::Sinh
            | Function::Cosh
            | Function::Tanh
            | Function::Floor
            | Function::Ceil
            | Function::Round => Arity::Exactly(1),
        }
    }

    /// `args` has already been checked against `arity`, so it is never empty.
    fn apply(self, args: &[f64]) -> f64 {
        let v = args[0];
        match self {
            Function::Sqrt => v.sqrt(),
            Function::Cbrt => v.cbrt(),
            Function::Abs => v.abs(),
            Function::Sign => {
                if v > 0.0 {
                    1.0
                } else if v < 0.0 {
                    -1.0
                } else {
                    v
                }
            }
            Function::Exp => v.exp(),
            Function::Log => v.ln(),
            Function::Log10 => v.log10(),
            Function::Log2 => v.log2(),
            Function::Sin => v.sin(),
            Function::Cos => v.cos(),
            Function::Tan => v.tan(),
            Function::Asin => v.asin(),
            Function::Acos => v.acos(),
            Function::Atan => v.atan(),
            Function::Sinh => v.sinh(),
            Function::Cosh => v.cosh(),
            Function::Tanh => v.tanh(),
            Function::Floor => v.floor(),
            Function::Ceil => v.ceil(),
            Function::Round => v.round(),
            Function::Min => args
                .iter()
                .copied()
                .fold(f64::INFINITY, |acc, v| if v < acc || v.is_nan() { v } else { acc }),
            Function::Max => args
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, |acc, v| if v > acc || v.is_nan() { v } else { acc }),
            Function::Pow => v.powf(args[1]),
            Function::Atan2 => v.atan2(args[1]),
            Function::Hypot => v.hypot(args[1]),
            Function::Mod => {
                let b = args[1];
                if b == 0.0 { v } else { v - b * (v / b).floor() }
            }
        }
    }
}

/// Syntax tree of a compiled formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(f64),
    Variable(Variable),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Function, Vec<Node>),
}

impl Node {
    fn eval(&self, x: f64, z: f64) -> Result<f64, EvaluationError> {
        match self {
            Node::Literal(value) => Ok(*value),
            Node::Variable(Variable::X) => Ok(x),
            Node::Variable(Variable::Z) => Ok(z),
            Node::Unary(UnaryOp::Negate, operand) => Ok(-operand.eval(x, z)?),
            Node::Binary(op, lhs, rhs) => {
                let a = lhs.eval(x, z)?;
                let b = rhs.eval(x, z)?;
                let value = op.apply(a, b);
                if *op == BinaryOp::Power && value.is_nan() && a.is_finite() && b.is_finite() {
                    return Err(EvaluationError::NonReal {
                        operation: "^",
                        x,
                        z,
                    });
                }
                Ok(value)
            }
            Node::Call(function, args) => {
                let values = args
                    .iter()
                    .map(|arg| arg.eval(x, z))
                    .collect::<Result<Vec<_>, _>>()?;
                let value = function.apply(&values);
                if value.is_nan() && values.iter().all(|v| v.is_finite()) {
                    return Err(EvaluationError::NonReal {
                        operation: function.name(),
                        x,
                        z,
                    });
                }
                Ok(value)
            }
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Node::Literal(value) => write!(f, "{value}"),
            Node::Variable(Variable::X) => f.write_str("x"),
            Node::Variable(Variable::Z) => f.write_str("z"),
            Node::Unary(UnaryOp::Negate, operand) => {
                if nested {
                    f.write_str("(")?;
                }
                f.write_str("-")?;
                operand.write(f, true)?;
                if nested {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Node::Binary(op, lhs, rhs) => {
                if nested {
                    f.write_str("(")?;
                }
                lhs.write(f, true)?;
                write!(f, " {} ", op.symbol())?;
                rhs.write(f, true)?;
                if nested {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Node::Call(function, args) => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.write(f, false)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A formula over `x` and `z`, compiled once and evaluated many times.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    pub fn compile(text: &str) -> Result<Self, ExpressionSyntaxError> {
        if text.trim().is_empty() {
            return Err(ExpressionSyntaxError::Empty);
        }

        let formula = FormulaParser::parse(Rule::formula, text)
            .map_err(syntax_error)?
            .next()
            .and_then(|formula| formula.into_inner().next())
            .ok_or(ExpressionSyntaxError::Empty)?;

        let root = build_expr(formula.into_inner())?;

        Ok(Self {
            source: text.to_string(),
            root,
        })
    }

    /// Height at `(x, z)`. Fails instead of returning NaN or an infinity.
    pub fn evaluate(&self, x: f64, z: f64) -> Result<f64, EvaluationError> {
        let value = self.root.eval(x, z)?;
        if !value.is_finite() {
            return Err(EvaluationError::NonFinite { value, x, z });
        }
        Ok(value)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write(f, false)
    }
}

impl FromStr for Expression {
    type Err = ExpressionSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::compile(s)
    }
}

pub fn compile(text: &str) -> Result<Expression, ExpressionSyntaxError> {
    Expression::compile(text)
}

pub fn evaluate(expr: &Expression, x: f64, z: f64) -> Result<f64, EvaluationError> {
    expr.evaluate(x, z)
}

fn syntax_error(err: pest::error::Error<Rule>) -> ExpressionSyntaxError {
    let (line, column) = match err.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    ExpressionSyntaxError::Parse {
        line,
        column,
        message: err.variant.message().into_owned(),
    }
}

fn build_expr(pairs: Pairs<'_, Rule>) -> Result<Node, ExpressionSyntaxError> {
    PRATT
        .map_primary(build_primary)
        .map_prefix(|op, operand| {
            let operand = operand?;
            Ok(match op.as_rule() {
                Rule::negate => Node::Unary(UnaryOp::Negate, Box::new(operand)),
                _ => operand,
            })
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::add => BinaryOp::Add,
                Rule::subtract => BinaryOp::Subtract,
                Rule::multiply => BinaryOp::Multiply,
                Rule::divide => BinaryOp::Divide,
                Rule::power => BinaryOp::Power,
                rule => unreachable!("grammar produced infix {rule:?}"),
            };
            Ok(Node::Binary(op, Box::new(lhs?), Box::new(rhs?)))
        })
        .parse(pairs)
}

fn build_primary(pair: Pair<'_, Rule>) -> Result<Node, ExpressionSyntaxError> {
    match pair.as_rule() {
        Rule::number => parse_number(pair.as_str()),
        Rule::ident => resolve_identifier(pair.as_str()),
        Rule::call => build_call(pair),
        Rule::expr => build_expr(pair.into_inner()),
        rule => unreachable!("grammar produced primary {rule:?}"),
    }
}

fn parse_number(text: &str) -> Result<Node, ExpressionSyntaxError> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Node::Literal(value)),
        _ => Err(ExpressionSyntaxError::InvalidNumber(text.to_string())),
    }
}

fn resolve_identifier(name: &str) -> Result<Node, ExpressionSyntaxError> {
    let node = match name {
        "x" => Node::Variable(Variable::X),
        "z" => Node::Variable(Variable::Z),
        "pi" | "PI" => Node::Literal(std::f64::consts::PI),
        "tau" => Node::Literal(std::f64::consts::TAU),
        "e" | "E" => Node::Literal(std::f64::consts::E),
        _ => return Err(ExpressionSyntaxError::UnknownVariable(name.to_string())),
    };
    Ok(node)
}

fn build_call(pair: Pair<'_, Rule>) -> Result<Node, ExpressionSyntaxError> {
    let mut inner = pair.into_inner();
    let name = inner.next().map(|ident| ident.as_str()).unwrap_or_default();
    let function = Function::lookup(name)
        .ok_or_else(|| ExpressionSyntaxError::UnknownFunction(name.to_string()))?;

    let args = inner
        .map(|arg| build_expr(arg.into_inner()))
        .collect::<Result<Vec<_>, _>>()?;

    let arity = function.arity();
    if !arity.accepts(args.len()) {
        return Err(ExpressionSyntaxError::Arity {
            name: name.to_string(),
            expected: arity.to_string(),
            found: args.len(),
        });
    }

    Ok(Node::Call(function, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eval(text: &str, x: f64, z: f64) -> f64 {
        compile(text).unwrap().evaluate(x, z).unwrap()
    }

    #[test]
    fn evaluates_variables() {
        assert_eq!(eval("x", 3.0, 7.0), 3.0);
        assert_eq!(eval("z", 3.0, 7.0), 7.0);
    }

    #[test]
    fn evaluates_default_surface() {
        assert_eq!(eval("sqrt(abs(x) + abs(z))", -9.0, 16.0), 5.0);
    }

    #[test]
    fn respects_precedence() {
        assert_eq!(eval("1 + 2 * 3", 0.0, 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0, 0.0), 9.0);
        assert_eq!(eval("10 - 4 - 3", 0.0, 0.0), 3.0);
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0, 0.0), 512.0);
        assert_eq!(eval("-x^2", 3.0, 0.0), -9.0);
        assert_eq!(eval("(-x)^2", 3.0, 0.0), 9.0);
        assert_eq!(eval("2^-1", 0.0, 0.0), 0.5);
        assert_eq!(eval("-2 * 3", 0.0, 0.0), -6.0);
        assert_eq!(eval("+x - -z", 1.0, 2.0), 3.0);
    }

    #[test]
    fn parses_number_forms() {
        assert_eq!(eval("1.5e2", 0.0, 0.0), 150.0);
        assert_eq!(eval(".25", 0.0, 0.0), 0.25);
        assert_eq!(eval("3.", 0.0, 0.0), 3.0);
        assert!(matches!(
            compile("1e999"),
            Err(ExpressionSyntaxError::InvalidNumber(_))
        ));
    }

    #[test]
    fn knows_constants_and_functions() {
        assert_relative_eq!(eval("sin(pi / 2)", 0.0, 0.0), 1.0);
        assert_relative_eq!(eval("log(e)", 0.0, 0.0), 1.0);
        assert_relative_eq!(eval("ln(e^2)", 0.0, 0.0), 2.0);
        assert_eq!(eval("max(x, z, 4)", 1.0, 9.0), 9.0);
        assert_eq!(eval("min(x, z)", 1.0, 9.0), 1.0);
        assert_eq!(eval("hypot(x, z)", 3.0, 4.0), 5.0);
        assert_eq!(eval("mod(x, 3)", -1.0, 0.0), 2.0);
        assert_eq!(eval("mod(x, 0)", 5.0, 0.0), 5.0);
        assert_eq!(eval("sign(x)", 0.0, 0.0), 0.0);
        assert_eq!(eval("sign(x)", -4.0, 0.0), -1.0);
    }

    #[test]
    fn rejects_incomplete_input() {
        match compile("x +") {
            Err(ExpressionSyntaxError::Parse { line, column, .. }) => {
                assert_eq!(line, 1);
                assert!(column >= 3, "column {column}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(compile("   "), Err(ExpressionSyntaxError::Empty));
        assert!(compile("2x").is_err());
        assert!(compile("sin(x").is_err());
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            compile("x + y"),
            Err(ExpressionSyntaxError::UnknownVariable("y".into()))
        );
        assert_eq!(
            compile("gamma(x)"),
            Err(ExpressionSyntaxError::UnknownFunction("gamma".into()))
        );
        assert!(matches!(
            compile("atan2(x)"),
            Err(ExpressionSyntaxError::Arity { found: 1, .. })
        ));
        assert!(matches!(
            compile("max()"),
            Err(ExpressionSyntaxError::Arity { found: 0, .. })
        ));
    }

    #[test]
    fn reports_non_real_results() {
        let expr = compile("sqrt(x)").unwrap();
        assert_eq!(
            expr.evaluate(-1.0, 0.0),
            Err(EvaluationError::NonReal {
                operation: "sqrt",
                x: -1.0,
                z: 0.0
            })
        );

        let expr = compile("x ^ 0.5").unwrap();
        assert!(matches!(
            expr.evaluate(-4.0, 0.0),
            Err(EvaluationError::NonReal { operation: "^", .. })
        ));
    }

    #[test]
    fn reports_non_finite_results() {
        let expr = compile("1 / x").unwrap();
        assert!(matches!(
            expr.evaluate(0.0, 0.0),
            Err(EvaluationError::NonFinite { .. })
        ));
        assert!(matches!(
            compile("x / z").unwrap().evaluate(0.0, 0.0),
            Err(EvaluationError::NonFinite { .. })
        ));
        assert_eq!(eval("1 / (1 / x)", 0.0, 0.0), 0.0);
    }

    #[test]
    fn every_function_evaluates() {
        let cases = [
            ("sqrt(x)", 2.0),
            ("cbrt(x)", 2.0_f64.cbrt()),
            ("abs(-x)", 2.0),
            ("sign(-x)", -1.0),
            ("exp(0 * x)", 1.0),
            ("log(x)", std::f64::consts::LN_2),
            ("ln(x)", std::f64::consts::LN_2),
            ("log10(x * 50)", 2.0),
            ("log2(x)", 1.0),
            ("sin(0 * x)", 0.0),
            ("cos(0 * x)", 1.0),
            ("tan(0 * x)", 0.0),
            ("asin(x / 2)", std::f64::consts::FRAC_PI_2),
            ("acos(x / 2)", 0.0),
            ("atan(0 * x)", 0.0),
            ("sinh(0 * x)", 0.0),
            ("cosh(0 * x)", 1.0),
            ("tanh(0 * x)", 0.0),
            ("floor(x + 0.5)", 2.0),
            ("ceil(x + 0.5)", 3.0),
            ("round(x + 0.4)", 2.0),
            ("min(x, 1, 3)", 1.0),
            ("max(x, 1, 3)", 3.0),
            ("pow(x, 3)", 8.0),
            ("atan2(0, x)", 0.0),
            ("hypot(x, 0)", 2.0),
            ("mod(x + 5, 3)", 1.0),
        ];
        for (text, expected) in cases {
            let value = compile(text).unwrap().evaluate(2.0, 0.0).unwrap();
            assert_relative_eq!(value, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn display_reparses_to_same_tree() {
        for text in ["-x^2 + 3 * z", "(-x)^2", "sqrt(abs(x) + abs(z))", "1 - (2 - z)"] {
            let expr = compile(text).unwrap();
            let again = compile(&expr.to_string()).unwrap();
            assert_eq!(expr.root(), again.root(), "{text} -> {expr}");
        }
    }

    #[test]
    fn keeps_source_text() {
        let expr: Expression = "sin(x) * cos(z)".parse().unwrap();
        assert_eq!(expr.source(), "sin(x) * cos(z)");
    }
}
