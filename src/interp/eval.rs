//! Tree-walking interpreter

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::Deserialize;

use crate::ast::*;
use crate::diagnostics::{EvalError, TallyError};
use crate::render;

use super::env::Environment;
use super::value::Value;

/// Upper bounds on operands whose results grow without limit
///
/// The defaults are the widest operands the big-integer routines accept,
/// which leaves everything else to available memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest `n` accepted by `!n`
    pub max_factorial: u64,
    /// Largest `b` accepted by `a ^ b` when `a` is not -1, 0 or 1
    pub max_exponent: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_factorial: u64::MAX,
            max_exponent: u32::MAX,
        }
    }
}

/// Evaluate `expr` against `env` with default limits
///
/// Assignments write into `env`; a failed evaluation leaves it untouched.
pub fn evaluate(expr: &Expr, env: &mut Environment) -> Result<BigInt, EvalError> {
    let limits = Limits::default();
    Evaluator {
        env,
        limits: &limits,
    }
    .eval_expr(expr)
}

/// Tree-walking interpreter
///
/// Owns the environment, so one instance is one session.
#[derive(Debug, Default)]
pub struct Interpreter {
    /// Variable environment
    env: Environment,
    limits: Limits,
}

impl Interpreter {
    /// Create a new interpreter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            env: Environment::new(),
            limits,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Forget every binding
    pub fn reset(&mut self) {
        self.env.clear();
    }

    /// Lex, parse and execute one line of source
    pub fn run(&mut self, source: &str) -> Result<Value, TallyError> {
        let stmt = crate::parse_source(source)?;
        let value = self.execute(&stmt)?;
        Ok(value)
    }

    /// Execute a statement
    ///
    /// `render(...)` short-circuits: the expression is dumped, not evaluated.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Value, EvalError> {
        match stmt {
            Stmt::Render(expr) => Ok(Value::Tree(render::render(expr))),
            Stmt::Expr(expr) => self.evaluate(expr).map(Value::Int),
        }
    }

    /// Evaluate an expression to an integer
    pub fn evaluate(&mut self, expr: &Expr) -> Result<BigInt, EvalError> {
        let result = Evaluator {
            env: &mut self.env,
            limits: &self.limits,
        }
        .eval_expr(expr);

        if let Err(e) = &result {
            tracing::debug!("evaluation failed: {}", e);
        }
        result
    }
}

struct Evaluator<'a> {
    env: &'a mut Environment,
    limits: &'a Limits,
}

impl Evaluator<'_> {
    fn eval_expr(&mut self, expr: &Expr) -> Result<BigInt, EvalError> {
        match expr {
            Expr::Number(n) => Ok(n.clone()),

            Expr::Variable(name) => {
                self.env
                    .get(name)
                    .cloned()
                    .ok_or_else(|| EvalError::UndefinedVariable { name: name.clone() })
            }

            Expr::Assign { name, value } => {
                let val = self.eval_expr(value)?;
                tracing::debug!("bind {} = {}", name, val);
                self.env.assign(name.clone(), val.clone());
                Ok(val)
            }

            Expr::Unary { op, operand } => {
                let val = self.eval_expr(operand)?;
                self.eval_unary(*op, val)
            }

            Expr::Binary { op, left, right } => {
                let lhs = self.eval_expr(left)?;
                let rhs = self.eval_expr(right)?;
                self.eval_binary(*op, lhs, rhs)
            }
        }
    }

    fn eval_unary(&self, op: UnaryOp, val: BigInt) -> Result<BigInt, EvalError> {
        match op {
            UnaryOp::Plus => Ok(val),
            UnaryOp::Minus => Ok(-val),
            UnaryOp::Factorial => self.factorial(val),
        }
    }

    fn eval_binary(&self, op: BinaryOp, lhs: BigInt, rhs: BigInt) -> Result<BigInt, EvalError> {
        match op {
            BinaryOp::Add => Ok(lhs + rhs),
            BinaryOp::Sub => Ok(lhs - rhs),
            BinaryOp::Mul => Ok(lhs * rhs),
            BinaryOp::Div => {
                if rhs.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(lhs.div_floor(&rhs))
            }
            BinaryOp::Mod => {
                if rhs.is_zero() {
                    return Err(EvalError::ModuloByZero);
                }
                Ok(lhs.mod_floor(&rhs))
            }
            BinaryOp::Pow => self.power(lhs, rhs),
        }
    }

    /// `n!` as the running product 1 * 2 * ... * n
    fn factorial(&self, n: BigInt) -> Result<BigInt, EvalError> {
        if n.is_negative() {
            return Err(EvalError::NegativeFactorial { value: n });
        }

        let limit = self.limits.max_factorial;
        let Some(n) = n.to_u64().filter(|&n| n <= limit) else {
            return Err(EvalError::FactorialTooLarge { value: n, limit });
        };

        let mut acc = BigInt::one();
        for i in 2..=n {
            acc *= i;
        }
        Ok(acc)
    }

    fn power(&self, base: BigInt, exponent: BigInt) -> Result<BigInt, EvalError> {
        if exponent.is_negative() {
            return Err(EvalError::NegativeExponent { exponent });
        }

        // 0, 1 and -1 have closed forms for any exponent
        if base.is_zero() {
            return Ok(if exponent.is_zero() {
                BigInt::one()
            } else {
                BigInt::zero()
            });
        }
        if base.is_one() {
            return Ok(base);
        }
        if base == -BigInt::one() {
            return Ok(if exponent.is_even() { BigInt::one() } else { base });
        }

        let limit = self.limits.max_exponent;
        let Some(e) = exponent.to_u32().filter(|&e| e <= limit) else {
            return Err(EvalError::ExponentTooLarge { exponent, limit });
        };
        Ok(base.pow(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &Expr) -> Result<BigInt, EvalError> {
        evaluate(expr, &mut Environment::new())
    }

    #[test]
    fn test_floor_division_and_modulo_signs() {
        let cases = [(7, 2, 3, 1), (-7, 2, -4, 1), (7, -2, -4, -1), (-7, -2, 3, -1)];
        for (a, b, q, r) in cases {
            let div = Expr::binary(BinaryOp::Div, Expr::number(a), Expr::number(b));
            let rem = Expr::binary(BinaryOp::Mod, Expr::number(a), Expr::number(b));
            assert_eq!(eval(&div), Ok(BigInt::from(q)), "{} / {}", a, b);
            assert_eq!(eval(&rem), Ok(BigInt::from(r)), "{} % {}", a, b);
        }
    }

    #[test]
    fn test_power_closed_forms_ignore_limit() {
        let limits = Limits {
            max_exponent: 2,
            ..Limits::default()
        };
        let mut interp = Interpreter::with_limits(limits);
        let huge = Expr::number(BigInt::from(u64::MAX));

        let minus_one = Expr::unary(UnaryOp::Minus, Expr::number(1));
        let e = Expr::binary(BinaryOp::Pow, minus_one, huge.clone());
        assert_eq!(interp.evaluate(&e), Ok(BigInt::from(-1)));

        let e = Expr::binary(BinaryOp::Pow, Expr::number(0), huge.clone());
        assert_eq!(interp.evaluate(&e), Ok(BigInt::zero()));

        let e = Expr::binary(BinaryOp::Pow, Expr::number(2), huge.clone());
        assert_eq!(
            interp.evaluate(&e),
            Err(EvalError::ExponentTooLarge {
                exponent: BigInt::from(u64::MAX),
                limit: 2
            })
        );
    }

    #[test]
    fn test_zero_to_the_zero_is_one() {
        let e = Expr::binary(BinaryOp::Pow, Expr::number(0), Expr::number(0));
        assert_eq!(eval(&e), Ok(BigInt::one()));
    }

    #[test]
    fn test_factorial_limit() {
        let mut interp = Interpreter::with_limits(Limits {
            max_factorial: 10,
            ..Limits::default()
        });
        let ok = Expr::unary(UnaryOp::Factorial, Expr::number(10));
        assert_eq!(interp.evaluate(&ok), Ok(BigInt::from(3_628_800)));

        let too_big = Expr::unary(UnaryOp::Factorial, Expr::number(11));
        assert_eq!(
            interp.evaluate(&too_big),
            Err(EvalError::FactorialTooLarge {
                value: BigInt::from(11),
                limit: 10
            })
        );
    }

    #[test]
    fn test_failed_assignment_leaves_env_untouched() {
        let mut env = Environment::new();
        let e = Expr::assign(
            "x",
            Expr::binary(BinaryOp::Div, Expr::number(1), Expr::number(0)),
        );
        assert_eq!(evaluate(&e, &mut env), Err(EvalError::DivisionByZero));
        assert!(!env.contains("x"));
    }

    #[test]
    fn test_render_statement_skips_evaluation() {
        let mut interp = Interpreter::new();
        let stmt = Stmt::Render(Expr::variable("missing"));
        assert_eq!(
            interp.execute(&stmt),
            Ok(Value::Tree("└── VARIABLE(missing)".to_string()))
        );
    }
}
