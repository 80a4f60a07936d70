//! The evaluator.
//!
//! `eval` dispatches on the expression: null and numeric atoms are
//! self-evaluating, other atoms are environment lookups, and pairs
//! branch on their head, first against the special forms and otherwise
//! as applications.
//!
//! Control flow is a trampoline. The current expression and
//! environment live in two registry slots; a tail position overwrites
//! the slots and restarts the dispatch loop, so unbounded tail
//! recursion costs no host stack and no registry growth. Each helper
//! brackets its own transient slots between a mark and a release, and
//! the outer `eval` releases everything it owns on both the value and
//! the error path, keeping the registry balanced.

use sgc::{Cell, CellRef, PrimId, Slot};
use skema_util::symbol::{KW_BEGIN, KW_COND, KW_DEFINE, KW_LAMBDA, KW_OR, KW_QUOTE};

use crate::env;
use crate::error::EvalError;
use crate::machine::Machine;
use crate::value::reverse_in_place;

/// Evaluate `expr` in `env`.
pub fn eval(m: &mut Machine, expr: CellRef, env: CellRef) -> Result<CellRef, EvalError> {
    let mark = m.heap.mark();
    let out = eval_protected(m, expr, env);
    m.heap.release(mark);
    out
}

fn eval_protected(m: &mut Machine, expr: CellRef, env: CellRef) -> Result<CellRef, EvalError> {
    let expr_slot = m.heap.protect(expr);
    let env_slot = m.heap.protect(env);

    loop {
        let expr = m.heap.root(expr_slot);
        if expr.is_nil() {
            return Ok(CellRef::NIL);
        }
        let (head, tail) = match m.heap.get(expr) {
            Cell::Atom(sym) => {
                if sym.is_number() {
                    return Ok(expr);
                }
                let env = m.heap.root(env_slot);
                return Ok(env::lookup(&m.heap, expr, env));
            }
            Cell::Pair(head, tail) => (head, tail),
            // Lambdas and primitives evaluate to themselves.
            _ => return Ok(expr),
        };

        let head_sym = if head.is_nil() {
            None
        } else if let Cell::Atom(sym) = m.heap.get(head) {
            Some(sym)
        } else {
            None
        };

        match head_sym {
            Some(sym) if sym == KW_QUOTE => return Ok(m.heap.first(tail)),
            Some(sym) if sym == KW_COND => match eval_cond_tests(m, tail, env_slot)? {
                Some(body) => {
                    m.heap.set_root(expr_slot, body);
                    continue;
                }
                None => return Ok(CellRef::NIL),
            },
            Some(sym) if sym == KW_BEGIN => match eval_sequence(m, tail, env_slot)? {
                Some(last) => {
                    m.heap.set_root(expr_slot, last);
                    continue;
                }
                None => return Ok(CellRef::NIL),
            },
            Some(sym) if sym == KW_OR => return eval_or(m, tail, env_slot),
            Some(sym) if sym == KW_DEFINE => return eval_define(m, tail, env_slot),
            Some(sym) if sym == KW_LAMBDA => {
                // The lambda's tail already has the right shape,
                // (params . body); it only needs the callable tag.
                m.heap.retag_lambda(tail);
                return Ok(tail);
            }
            _ => {}
        }

        // Application: the head names the callee.
        let env = m.heap.root(env_slot);
        let callee = eval(m, head, env)?;
        let operands = m.heap.rest(m.heap.root(expr_slot));
        if callee.is_nil() {
            return Ok(CellRef::NIL);
        }
        match m.heap.get(callee) {
            Cell::Primitive(id) => return apply_primitive(m, id, operands, env_slot),
            Cell::Lambda(_, _) => match apply_lambda(m, callee, operands, env_slot)? {
                Some((last_body, call_env)) => {
                    m.heap.set_root(expr_slot, last_body);
                    m.heap.set_root(env_slot, call_env);
                    continue;
                }
                None => return Ok(CellRef::NIL),
            },
            // Applying a non-callable is a silent null.
            _ => return Ok(CellRef::NIL),
        }
    }
}

/// Walk `cond` clauses, evaluating tests. Returns the body expression
/// of the first clause whose test is non-null, for tail execution.
fn eval_cond_tests(
    m: &mut Machine,
    clauses: CellRef,
    env_slot: Slot,
) -> Result<Option<CellRef>, EvalError> {
    let mark = m.heap.mark();
    let out = cond_tests_protected(m, clauses, env_slot);
    m.heap.release(mark);
    out
}

fn cond_tests_protected(
    m: &mut Machine,
    clauses: CellRef,
    env_slot: Slot,
) -> Result<Option<CellRef>, EvalError> {
    let item_slot = m.heap.protect(clauses);
    loop {
        let item = m.heap.root(item_slot);
        if item.is_nil() {
            return Ok(None);
        }
        let clause = m.heap.first(item);
        let test = m.heap.first(clause);
        let env = m.heap.root(env_slot);
        let value = eval(m, test, env)?;
        if !value.is_nil() {
            let clause = m.heap.first(m.heap.root(item_slot));
            return Ok(Some(m.heap.first(m.heap.rest(clause))));
        }
        let next = m.heap.rest(m.heap.root(item_slot));
        m.heap.set_root(item_slot, next);
    }
}

/// Evaluate every form but the last; return the last for tail
/// execution, or `None` for an empty sequence.
fn eval_sequence(
    m: &mut Machine,
    body: CellRef,
    env_slot: Slot,
) -> Result<Option<CellRef>, EvalError> {
    let mark = m.heap.mark();
    let out = sequence_protected(m, body, env_slot);
    m.heap.release(mark);
    out
}

fn sequence_protected(
    m: &mut Machine,
    body: CellRef,
    env_slot: Slot,
) -> Result<Option<CellRef>, EvalError> {
    let item_slot = m.heap.protect(body);
    loop {
        let item = m.heap.root(item_slot);
        if item.is_nil() {
            return Ok(None);
        }
        if m.heap.rest(item).is_nil() {
            return Ok(Some(m.heap.first(item)));
        }
        let form = m.heap.first(item);
        let env = m.heap.root(env_slot);
        eval(m, form, env)?;
        let next = m.heap.rest(m.heap.root(item_slot));
        m.heap.set_root(item_slot, next);
    }
}

/// `or`: first non-null operand value, else null. Short-circuits.
fn eval_or(m: &mut Machine, operands: CellRef, env_slot: Slot) -> Result<CellRef, EvalError> {
    let mark = m.heap.mark();
    let out = or_protected(m, operands, env_slot);
    m.heap.release(mark);
    out
}

fn or_protected(
    m: &mut Machine,
    operands: CellRef,
    env_slot: Slot,
) -> Result<CellRef, EvalError> {
    let item_slot = m.heap.protect(operands);
    loop {
        let item = m.heap.root(item_slot);
        if item.is_nil() {
            return Ok(CellRef::NIL);
        }
        let form = m.heap.first(item);
        let env = m.heap.root(env_slot);
        let value = eval(m, form, env)?;
        if !value.is_nil() {
            return Ok(value);
        }
        let next = m.heap.rest(m.heap.root(item_slot));
        m.heap.set_root(item_slot, next);
    }
}

/// `define`: evaluate the value form, bind the name in the innermost
/// frame of the current environment, return the value.
fn eval_define(
    m: &mut Machine,
    operands: CellRef,
    env_slot: Slot,
) -> Result<CellRef, EvalError> {
    let mark = m.heap.mark();
    let out = define_protected(m, operands, env_slot);
    m.heap.release(mark);
    out
}

fn define_protected(
    m: &mut Machine,
    operands: CellRef,
    env_slot: Slot,
) -> Result<CellRef, EvalError> {
    let name = m.heap.first(operands);
    let value_form = m.heap.first(m.heap.rest(operands));
    let name_slot = m.heap.protect(name);
    let env = m.heap.root(env_slot);
    let value = eval(m, value_form, env)?;
    let value_slot = m.heap.protect(value);

    let env = m.heap.root(env_slot);
    let name = m.heap.root(name_slot);
    let value = m.heap.root(value_slot);
    env::bind(&mut m.heap, env, name, value)?;
    Ok(m.heap.root(value_slot))
}

/// Apply a primitive: evaluate operands left to right, reverse the
/// accumulated list into source order, call through the table.
fn apply_primitive(
    m: &mut Machine,
    id: PrimId,
    operands: CellRef,
    env_slot: Slot,
) -> Result<CellRef, EvalError> {
    let mark = m.heap.mark();
    let out = primitive_protected(m, id, operands, env_slot);
    m.heap.release(mark);
    out
}

fn primitive_protected(
    m: &mut Machine,
    id: PrimId,
    operands: CellRef,
    env_slot: Slot,
) -> Result<CellRef, EvalError> {
    let args_slot = m.heap.protect(CellRef::NIL);
    let item_slot = m.heap.protect(operands);
    loop {
        let item = m.heap.root(item_slot);
        if item.is_nil() {
            break;
        }
        let form = m.heap.first(item);
        let env = m.heap.root(env_slot);
        let value = eval(m, form, env)?;
        let args = m.heap.root(args_slot);
        let pair = m.heap.alloc(Cell::Pair(value, args))?;
        m.heap.set_root(args_slot, pair);
        let next = m.heap.rest(m.heap.root(item_slot));
        m.heap.set_root(item_slot, next);
    }
    // Arguments accumulated newest-first; hand them over in source
    // order.
    let args = m.heap.root(args_slot);
    let args = reverse_in_place(&mut m.heap, args);
    m.heap.set_root(args_slot, args);
    let func = m.primitive(id);
    let args = m.heap.root(args_slot);
    func(m, args)
}

/// Apply a lambda: build the call environment on the call-site
/// environment, bind parameters to evaluated operands in lockstep, run
/// all body forms but the last, and return the last with the call
/// environment for tail execution. `None` for an empty body.
fn apply_lambda(
    m: &mut Machine,
    callee: CellRef,
    operands: CellRef,
    env_slot: Slot,
) -> Result<Option<(CellRef, CellRef)>, EvalError> {
    let mark = m.heap.mark();
    let out = lambda_protected(m, callee, operands, env_slot);
    m.heap.release(mark);
    out
}

fn lambda_protected(
    m: &mut Machine,
    callee: CellRef,
    operands: CellRef,
    env_slot: Slot,
) -> Result<Option<(CellRef, CellRef)>, EvalError> {
    let callee_slot = m.heap.protect(callee);
    let actual_slot = m.heap.protect(operands);

    // The call environment extends the environment at the call site.
    let env = m.heap.root(env_slot);
    let call_env = m.heap.alloc(Cell::Pair(CellRef::NIL, env))?;
    let call_env_slot = m.heap.protect(call_env);

    let params = m.heap.first(m.heap.root(callee_slot));
    let param_slot = m.heap.protect(params);

    loop {
        let actual = m.heap.root(actual_slot);
        let param = m.heap.root(param_slot);
        if actual.is_nil() || param.is_nil() {
            break;
        }
        let form = m.heap.first(actual);
        let env = m.heap.root(env_slot);
        let value = eval(m, form, env)?;
        let call_env = m.heap.root(call_env_slot);
        let key = m.heap.first(m.heap.root(param_slot));
        env::bind(&mut m.heap, call_env, key, value)?;

        let next_actual = m.heap.rest(m.heap.root(actual_slot));
        m.heap.set_root(actual_slot, next_actual);
        let next_param = m.heap.rest(m.heap.root(param_slot));
        m.heap.set_root(param_slot, next_param);
    }

    let body = m.heap.rest(m.heap.root(callee_slot));
    match eval_sequence(m, body, call_env_slot)? {
        Some(last) => {
            let call_env = m.heap.root(call_env_slot);
            Ok(Some((last, call_env)))
        }
        None => Ok(None),
    }
}
