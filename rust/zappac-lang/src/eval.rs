//! Expression evaluation.

use std::collections::BTreeMap;

use crate::ast::{BinOp, Expr};
use crate::error::ExecError;
use crate::value::Value;

pub type Variables = BTreeMap<String, Value>;

pub fn eval(expr: &Expr, vars: &Variables) -> Result<Value, ExecError> {
    match expr {
        Expr::Number(v) => Ok(*v),
        Expr::Var(name) => vars
            .get(name)
            .copied()
            .ok_or_else(|| ExecError::UndefinedVariable(name.clone())),
        Expr::Neg(inner) => match eval(inner, vars)? {
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| ExecError::Overflow("-".into())),
            Value::Float(f) => Ok(Value::Float(-f)),
        },
        Expr::Not(inner) => match eval(inner, vars)? {
            Value::Int(n) => Ok(Value::Int(!n)),
            Value::Float(_) => Err(ExecError::IntegerRequired("~".into())),
        },
        Expr::Abs(inner) => match eval(inner, vars)? {
            Value::Int(n) => n
                .checked_abs()
                .map(Value::Int)
                .ok_or_else(|| ExecError::Overflow("abs".into())),
            Value::Float(f) => Ok(Value::Float(f.abs())),
        },
        Expr::Binary(op, lhs, rhs) => {
            let a = eval(lhs, vars)?;
            let b = eval(rhs, vars)?;
            apply(*op, a, b)
        }
    }
}

pub fn apply(op: BinOp, a: Value, b: Value) -> Result<Value, ExecError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => int_op(op, x, y),
        _ => match op {
            BinOp::And | BinOp::Or | BinOp::Xor | BinOp::Shl | BinOp::Shr => {
                Err(ExecError::IntegerRequired(op.to_string()))
            }
            _ => float_op(op, a.as_f64(), b.as_f64()),
        },
    }
}

fn int_op(op: BinOp, x: i64, y: i64) -> Result<Value, ExecError> {
    let overflow = || ExecError::Overflow(op.to_string());
    let n = match op {
        BinOp::Add => x.checked_add(y).ok_or_else(overflow)?,
        BinOp::Sub => x.checked_sub(y).ok_or_else(overflow)?,
        BinOp::Mul => x.checked_mul(y).ok_or_else(overflow)?,
        BinOp::Div => {
            if y == 0 {
                return Err(ExecError::DivisionByZero);
            }
            if x.checked_rem(y).ok_or_else(overflow)? != 0 {
                return float_op(op, x as f64, y as f64);
            }
            x.checked_div(y).ok_or_else(overflow)?
        }
        BinOp::Fdiv => {
            if y == 0 {
                return Err(ExecError::DivisionByZero);
            }
            let q = x.checked_div(y).ok_or_else(overflow)?;
            if x.checked_rem(y).ok_or_else(overflow)? != 0 && ((x < 0) != (y < 0)) {
                q - 1
            } else {
                q
            }
        }
        BinOp::Mod => {
            if y == 0 {
                return Err(ExecError::DivisionByZero);
            }
            let r = x.checked_rem(y).ok_or_else(overflow)?;
            if r != 0 && ((r < 0) != (y < 0)) {
                r + y
            } else {
                r
            }
        }
        BinOp::Exp => {
            if y < 0 {
                return float_op(op, x as f64, y as f64);
            }
            match (x, u32::try_from(y)) {
                (_, Ok(exp)) => x.checked_pow(exp).ok_or_else(overflow)?,
                // Only these bases stay in range past a u32 exponent.
                (0 | 1, Err(_)) => x,
                (-1, Err(_)) => {
                    if y % 2 == 0 {
                        1
                    } else {
                        -1
                    }
                }
                (_, Err(_)) => return Err(overflow()),
            }
        }
        BinOp::And => x & y,
        BinOp::Or => x | y,
        BinOp::Xor => x ^ y,
        BinOp::Shl | BinOp::Shr => {
            if !(0..64).contains(&y) {
                return Err(ExecError::ShiftOutOfRange(y));
            }
            let shift = y as u32;
            if op == BinOp::Shr {
                x >> shift
            } else {
                let shifted = x << shift;
                if shifted >> shift != x {
                    return Err(overflow());
                }
                shifted
            }
        }
    };
    Ok(Value::Int(n))
}

fn float_op(op: BinOp, x: f64, y: f64) -> Result<Value, ExecError> {
    let r = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div | BinOp::Fdiv | BinOp::Mod if y == 0.0 => {
            return Err(ExecError::DivisionByZero)
        }
        BinOp::Div => x / y,
        BinOp::Fdiv => (x / y).floor(),
        BinOp::Mod => x - y * (x / y).floor(),
        BinOp::Exp => x.powf(y),
        BinOp::And | BinOp::Or | BinOp::Xor | BinOp::Shl | BinOp::Shr => {
            return Err(ExecError::IntegerRequired(op.to_string()))
        }
    };
    if r.is_finite() {
        Ok(Value::Float(r))
    } else {
        Err(ExecError::NotFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stmt;
    use crate::lexer::tokenize;
    use crate::parser::parse_statement;

    fn calc(source: &str) -> Result<Value, ExecError> {
        let mut vars = Variables::new();
        vars.insert("x".into(), Value::Int(6));
        vars.insert("half".into(), Value::Float(0.5));
        let nodes = tokenize(source).expect("lexes");
        match parse_statement(&nodes).expect("parses") {
            Stmt::Expr(expr) => eval(&expr, &vars),
            other => panic!("not an expression: {:?}", other),
        }
    }

    #[test]
    fn integer_arithmetic() {
        assert_eq!(calc("1 + 2 * 3"), Ok(Value::Int(7)));
        assert_eq!(calc("x - 10"), Ok(Value::Int(-4)));
        assert_eq!(calc("2 ** 10"), Ok(Value::Int(1024)));
        assert_eq!(calc("abs(-x)"), Ok(Value::Int(6)));
        assert_eq!(calc("(1 + 2) * 3"), Ok(Value::Int(9)));
    }

    #[test]
    fn division_flavours() {
        assert_eq!(calc("x / 2"), Ok(Value::Int(3)));
        assert_eq!(calc("7 / 2"), Ok(Value::Float(3.5)));
        assert_eq!(calc("7 // 2"), Ok(Value::Int(3)));
        assert_eq!(calc("-7 // 2"), Ok(Value::Int(-4)));
        assert_eq!(calc("-7 % 3"), Ok(Value::Int(2)));
        assert_eq!(calc("7 % -3"), Ok(Value::Int(-2)));
        assert_eq!(calc("7.5 // 2"), Ok(Value::Float(3.0)));
        assert_eq!(calc("1 / 0"), Err(ExecError::DivisionByZero));
        assert_eq!(calc("1 % 0"), Err(ExecError::DivisionByZero));
        assert_eq!(calc("half // 0"), Err(ExecError::DivisionByZero));
    }

    #[test]
    fn bitwise_and_shifts() {
        assert_eq!(calc("0xf0 | 0x0f"), Ok(Value::Int(255)));
        assert_eq!(calc("0xff & b1010"), Ok(Value::Int(10)));
        assert_eq!(calc("5 ^ 1"), Ok(Value::Int(4)));
        assert_eq!(calc("~0"), Ok(Value::Int(-1)));
        assert_eq!(calc("1 << 4"), Ok(Value::Int(16)));
        assert_eq!(calc("256 >> 4"), Ok(Value::Int(16)));
        assert_eq!(calc("1 << 64"), Err(ExecError::ShiftOutOfRange(64)));
        assert_eq!(calc("0x4000000000000000 << 2"), Err(ExecError::Overflow("<<".into())));
        assert_eq!(calc("half | 1"), Err(ExecError::IntegerRequired("|".into())));
        assert_eq!(calc("~half"), Err(ExecError::IntegerRequired("~".into())));
    }

    #[test]
    fn mixed_and_float_arithmetic() {
        assert_eq!(calc("x * half"), Ok(Value::Float(3.0)));
        assert_eq!(calc("2 ** -1"), Ok(Value::Float(0.5)));
        assert_eq!(calc("-half"), Ok(Value::Float(-0.5)));
        assert_eq!(calc("10.0 ** 400"), Err(ExecError::NotFinite));
    }

    #[test]
    fn failures() {
        assert_eq!(calc("y + 1"), Err(ExecError::UndefinedVariable("y".into())));
        assert_eq!(
            calc("9223372036854775807 + 1"),
            Err(ExecError::Overflow("+".into()))
        );
        assert_eq!(calc("2 ** 64"), Err(ExecError::Overflow("**".into())));
        assert_eq!(calc("2 ** 5000000000"), Err(ExecError::Overflow("**".into())));
    }

    #[test]
    fn huge_exponents_on_unit_bases() {
        assert_eq!(calc("1 ** 5000000000"), Ok(Value::Int(1)));
        assert_eq!(calc("0 ** 4294967296"), Ok(Value::Int(0)));
        assert_eq!(calc("(-1) ** 5000000000"), Ok(Value::Int(1)));
        assert_eq!(calc("(-1) ** 5000000001"), Ok(Value::Int(-1)));
        assert_eq!(calc("0 ** 0"), Ok(Value::Int(1)));
    }
}
