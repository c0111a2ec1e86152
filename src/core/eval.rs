use crate::{
    JSError,
    core::number::{to_int32, to_uint32},
    core::{
        AssignOp, BinaryOp, Closure, DeclKind, Environment, Expr, FunctionBody, FunctionDef, JSObject, LogicalOp, ObjectMember,
        Pattern, PatternElement, PropertyKey, Statement, StatementKind, SwitchCase, UnaryOp, Value, global_binding, inspect,
        is_truthy, loose_equal, strict_equal, to_number, to_primitive, to_property_key, value_to_string,
    },
    js_array, js_console, js_date, js_error, js_json, js_math, js_number, js_object, js_string, raise_eval_error,
    raise_reference_error, raise_thrown_value, raise_type_error,
};
use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;

/// Iterations a single loop may run before it is treated as runaway.
pub const MAX_LOOP_ITERATIONS: usize = 1_000_000;
/// Nested closure calls allowed before evaluation is aborted.
pub const MAX_CALL_DEPTH: usize = 256;

thread_local! {
    static CALL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

struct CallDepthGuard;

impl CallDepthGuard {
    fn enter() -> Result<Self, JSError> {
        CALL_DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > MAX_CALL_DEPTH {
                return Err(raise_eval_error!(format!(
                    "RangeError: Maximum call stack size exceeded (depth {MAX_CALL_DEPTH})"
                )));
            }
            depth.set(next);
            Ok(CallDepthGuard)
        })
    }
}

impl Drop for CallDepthGuard {
    fn drop(&mut self) {
        CALL_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

#[derive(Clone, Debug)]
pub enum ControlFlow {
    Normal(Value),
    Return(Value),
    Break,
    Continue,
}

pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

/// Canonical array index: `"2"` is an index, `"02"` and `"-1"` are plain keys.
pub(crate) fn array_index(key: &str) -> Option<usize> {
    let idx = key.parse::<usize>().ok()?;
    (idx.to_string() == key).then_some(idx)
}

fn lookup_variable(env: &Environment, name: &str) -> Option<Value> {
    env.get(name).or_else(|| global_binding(name))
}

fn evaluate_var(env: &Environment, name: &str) -> Result<Value, JSError> {
    lookup_variable(env, name).ok_or_else(|| raise_reference_error!(name))
}

fn make_closure(env: &Environment, def: &Rc<FunctionDef>) -> Value {
    Value::Closure(Rc::new(Closure {
        def: def.clone(),
        env: env.clone(),
        name: def.name.clone(),
    }))
}

// `const add = () => ...` names the function `add`.
fn name_anonymous_function(value: Value, name: &str) -> Value {
    match &value {
        Value::Closure(c) if c.name.is_none() => Value::Closure(Rc::new(Closure {
            name: Some(name.to_string()),
            ..(**c).clone()
        })),
        _ => value,
    }
}

fn hoist_declarations(env: &Environment, statements: &[Statement]) -> Result<(), JSError> {
    for stmt in statements {
        if let StatementKind::FunctionDeclaration(def) = &stmt.kind
            && let Some(name) = &def.name
        {
            env.declare(name, make_closure(env, def), DeclKind::Var)?;
        }
    }
    Ok(())
}

/// Run a statement list and return its completion value.
pub fn evaluate_statements(env: &Environment, statements: &[Statement]) -> Result<Value, JSError> {
    match evaluate_statements_with_context(env, statements)? {
        ControlFlow::Normal(val) | ControlFlow::Return(val) => Ok(val),
        ControlFlow::Break | ControlFlow::Continue => Ok(Value::Undefined),
    }
}

pub fn evaluate_statements_with_context(env: &Environment, statements: &[Statement]) -> Result<ControlFlow, JSError> {
    let mut last_value = Value::Undefined;
    match run_block(env, statements, &mut last_value)? {
        Some(cf) => Ok(cf),
        None => Ok(ControlFlow::Normal(last_value)),
    }
}

fn run_block(env: &Environment, statements: &[Statement], last_value: &mut Value) -> Result<Option<ControlFlow>, JSError> {
    hoist_declarations(env, statements)?;
    for stmt in statements {
        if let Some(cf) = eval_res(env, stmt, last_value)? {
            return Ok(Some(cf));
        }
    }
    Ok(None)
}

struct LoopCounter(usize);

impl LoopCounter {
    fn tick(&mut self) -> Result<(), JSError> {
        self.0 += 1;
        if self.0 > MAX_LOOP_ITERATIONS {
            return Err(raise_eval_error!(format!(
                "Infinite loop detected (executed {MAX_LOOP_ITERATIONS} iterations)"
            )));
        }
        Ok(())
    }
}

enum LoopStep {
    Next,
    Exit,
    Propagate(ControlFlow),
}

fn run_loop_body(env: &Environment, body: &[Statement], last_value: &mut Value) -> Result<LoopStep, JSError> {
    Ok(match run_block(env, body, last_value)? {
        None | Some(ControlFlow::Continue) => LoopStep::Next,
        Some(ControlFlow::Break) => LoopStep::Exit,
        Some(cf) => LoopStep::Propagate(cf),
    })
}

fn eval_res(env: &Environment, stmt: &Statement, last_value: &mut Value) -> Result<Option<ControlFlow>, JSError> {
    log::trace!("eval_res line {} column {}", stmt.line, stmt.column);
    match &stmt.kind {
        StatementKind::Declare(kind, decls) => {
            for (target, init) in decls {
                let value = match (target.identifier(), init) {
                    (Some(name), Some(expr)) => name_anonymous_function(evaluate_expr(env, expr)?, name),
                    (_, Some(expr)) => evaluate_expr(env, expr)?,
                    (Some(name), None) if *kind == DeclKind::Var && env.names().iter().any(|n| n == name) => continue,
                    (_, None) => Value::Undefined,
                };
                bind_pattern(env, target, value, *kind)?;
            }
            Ok(None)
        }
        StatementKind::FunctionDeclaration(_) => Ok(None),
        StatementKind::Expr(expr) => {
            *last_value = evaluate_expr(env, expr)?;
            Ok(None)
        }
        StatementKind::Return(expr) => {
            let value = match expr {
                Some(expr) => evaluate_expr(env, expr)?,
                None => Value::Undefined,
            };
            Ok(Some(ControlFlow::Return(value)))
        }
        StatementKind::If(condition, then_body, else_body) => {
            if is_truthy(&evaluate_expr(env, condition)?) {
                run_block(&env.child(), then_body, last_value)
            } else if let Some(else_body) = else_body {
                run_block(&env.child(), else_body, last_value)
            } else {
                Ok(None)
            }
        }
        StatementKind::While(condition, body) => {
            let mut counter = LoopCounter(0);
            while is_truthy(&evaluate_expr(env, condition)?) {
                counter.tick()?;
                match run_loop_body(&env.child(), body, last_value)? {
                    LoopStep::Next => {}
                    LoopStep::Exit => break,
                    LoopStep::Propagate(cf) => return Ok(Some(cf)),
                }
            }
            Ok(None)
        }
        StatementKind::DoWhile(body, condition) => {
            let mut counter = LoopCounter(0);
            loop {
                counter.tick()?;
                match run_loop_body(&env.child(), body, last_value)? {
                    LoopStep::Next => {}
                    LoopStep::Exit => break,
                    LoopStep::Propagate(cf) => return Ok(Some(cf)),
                }
                if !is_truthy(&evaluate_expr(env, condition)?) {
                    break;
                }
            }
            Ok(None)
        }
        StatementKind::For(init, condition, update, body) => {
            let loop_env = env.child();
            if let Some(init) = init {
                let mut ignored = Value::Undefined;
                eval_res(&loop_env, init, &mut ignored)?;
            }
            let mut counter = LoopCounter(0);
            loop {
                if let Some(condition) = condition
                    && !is_truthy(&evaluate_expr(&loop_env, condition)?)
                {
                    break;
                }
                counter.tick()?;
                match run_loop_body(&loop_env.child(), body, last_value)? {
                    LoopStep::Next => {}
                    LoopStep::Exit => break,
                    LoopStep::Propagate(cf) => return Ok(Some(cf)),
                }
                if let Some(update) = update {
                    evaluate_expr(&loop_env, update)?;
                }
            }
            Ok(None)
        }
        StatementKind::ForOf(kind, target, iterable, body) => {
            let items = iterate_values(&evaluate_expr(env, iterable)?)?;
            for_each_binding(env, (*kind, target), items, body, last_value)
        }
        StatementKind::ForIn(kind, target, object, body) => {
            let keys = enumerable_keys(&evaluate_expr(env, object)?).into_iter().map(Value::String).collect();
            for_each_binding(env, (*kind, target), keys, body, last_value)
        }
        StatementKind::Switch(discriminant, cases) => {
            let value = evaluate_expr(env, discriminant)?;
            run_switch(env, &value, cases, last_value)
        }
        StatementKind::Throw(expr) => {
            let value = evaluate_expr(env, expr)?;
            log::debug!("throw {}", inspect(&value, true));
            let message = format!("Uncaught {}", js_error::describe_thrown(&value));
            Err(raise_thrown_value!(value, message))
        }
        StatementKind::Try(block, handler, finalizer) => {
            let mut outcome = run_block(&env.child(), block, last_value);
            if let Some(handler) = handler
                && let Err(err) = &outcome
                && let Some(caught) = js_error::caught_value(err)
            {
                log::debug!("catch: {err}");
                let scope = env.child();
                outcome = match &handler.param {
                    Some(param) => bind_pattern(&scope, param, caught, DeclKind::Let),
                    None => Ok(()),
                }
                .and_then(|()| run_block(&scope, &handler.body, last_value));
            }
            if let Some(finalizer) = finalizer {
                let mut ignored = Value::Undefined;
                // break, continue or return inside `finally` replace the outcome
                if let Some(cf) = run_block(&env.child(), finalizer, &mut ignored)? {
                    return Ok(Some(cf));
                }
            }
            outcome
        }
        StatementKind::Break => Ok(Some(ControlFlow::Break)),
        StatementKind::Continue => Ok(Some(ControlFlow::Continue)),
    }
}

fn for_each_binding(
    env: &Environment,
    (kind, target): (DeclKind, &Pattern),
    items: Vec<Value>,
    body: &[Statement],
    last_value: &mut Value,
) -> Result<Option<ControlFlow>, JSError> {
    let mut counter = LoopCounter(0);
    for item in items {
        counter.tick()?;
        let iteration_env = env.child();
        bind_pattern(&iteration_env, target, item, kind)?;
        match run_loop_body(&iteration_env, body, last_value)? {
            LoopStep::Next => {}
            LoopStep::Exit => break,
            LoopStep::Propagate(cf) => return Ok(Some(cf)),
        }
    }
    Ok(None)
}

// Cases are tried in order with `===`; execution falls through from the
// first match (or `default`) until a `break`.
fn run_switch(env: &Environment, value: &Value, cases: &[SwitchCase], last_value: &mut Value) -> Result<Option<ControlFlow>, JSError> {
    let mut start = None;
    for (i, case) in cases.iter().enumerate() {
        if let Some(test) = &case.test
            && strict_equal(value, &evaluate_expr(env, test)?)
        {
            start = Some(i);
            break;
        }
    }
    let Some(start) = start.or_else(|| cases.iter().position(|case| case.test.is_none())) else {
        return Ok(None);
    };
    let scope = env.child();
    for case in &cases[start..] {
        match run_block(&scope, &case.body, last_value)? {
            None => {}
            Some(ControlFlow::Break) => break,
            Some(cf) => return Ok(Some(cf)),
        }
    }
    Ok(None)
}

/// Bind the names in `pattern`, destructuring `value` where the pattern asks for it.
pub(crate) fn bind_pattern(env: &Environment, pattern: &Pattern, value: Value, kind: DeclKind) -> Result<(), JSError> {
    match pattern {
        Pattern::Identifier(name) => env.declare(name, value, kind),
        Pattern::Array(elements, rest) => {
            let items = iterate_values(&value)?;
            for (i, element) in elements.iter().enumerate() {
                if let Some(element) = element {
                    bind_element(env, element, items.get(i).cloned().unwrap_or(Value::Undefined), kind)?;
                }
            }
            if let Some(rest) = rest {
                let tail = items.get(elements.len()..).map(<[Value]>::to_vec).unwrap_or_default();
                bind_pattern(env, rest, Value::array(tail), kind)?;
            }
            Ok(())
        }
        Pattern::Object(props, rest) => {
            if value.is_nullish() {
                let shown = value_to_string(&value);
                return Err(raise_type_error!(format!("Cannot destructure '{shown}' as it is {shown}.")));
            }
            let mut used = Vec::with_capacity(props.len());
            for (key, element) in props {
                let key = match key {
                    PropertyKey::Static(k) => k.clone(),
                    PropertyKey::Computed(k) => to_property_key(&evaluate_expr(env, k)?),
                };
                bind_element(env, element, get_property(&value, &key)?, kind)?;
                used.push(key);
            }
            if let Some(rest) = rest {
                let remaining = enumerable_keys(&value)
                    .into_iter()
                    .filter(|k| !used.contains(k))
                    .map(|k| get_property(&value, &k).map(|v| (k, v)))
                    .collect::<Result<JSObject, JSError>>()?;
                env.declare(rest, Value::object(remaining), kind)?;
            }
            Ok(())
        }
    }
}

fn bind_element(env: &Environment, element: &PatternElement, value: Value, kind: DeclKind) -> Result<(), JSError> {
    let value = match (&value, &element.default) {
        (Value::Undefined, Some(default)) => {
            let value = evaluate_expr(env, default)?;
            match element.target.identifier() {
                Some(name) => name_anonymous_function(value, name),
                None => value,
            }
        }
        _ => value,
    };
    bind_pattern(env, &element.target, value, kind)
}

/// Values produced by iterating `val` with `for...of` or spread.
pub(crate) fn iterate_values(val: &Value) -> Result<Vec<Value>, JSError> {
    match val {
        Value::Array(items) => Ok(items.to_vec()),
        Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
        other => Err(raise_type_error!(format!("{} is not iterable", inspect(other, true)))),
    }
}

fn enumerable_keys(val: &Value) -> Vec<String> {
    match val {
        Value::Object(props) => props.keys().cloned().collect(),
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        Value::String(s) => (0..s.encode_utf16().count()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Evaluate one expression node. Errors raised underneath carry this node as context.
pub fn evaluate_expr(env: &Environment, expr: &Expr) -> Result<Value, JSError> {
    eval_expr_inner(env, expr).map_err(|e| e.with_context(expr))
}

fn eval_expr_inner(env: &Environment, expr: &Expr) -> Result<Value, JSError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::StringLit(s) => Ok(Value::String(s.clone())),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Null => Ok(Value::Null),
        Expr::Var(name) => evaluate_var(env, name),
        Expr::Template(parts) => {
            let mut out = String::new();
            for part in parts {
                out.push_str(&value_to_string(&to_primitive(&evaluate_expr(env, part)?)));
            }
            Ok(Value::String(out))
        }
        Expr::Binary(left, op, right) => {
            let l = evaluate_expr(env, left)?;
            let r = evaluate_expr(env, right)?;
            binary_op(*op, &l, &r)
        }
        Expr::Logical(left, op, right) => {
            let l = evaluate_expr(env, left)?;
            if logical_short_circuits(*op, &l) {
                Ok(l)
            } else {
                evaluate_expr(env, right)
            }
        }
        Expr::Unary(op, operand) => match (op, operand.as_ref()) {
            // typeof of an undeclared identifier is not an error
            (UnaryOp::TypeOf, Expr::Var(name)) => Ok(Value::string(lookup_variable(env, name).map_or("undefined", |v| v.type_of()))),
            _ => unary_op(*op, &evaluate_expr(env, operand)?),
        },
        Expr::Update(target, delta, prefix) => evaluate_update(env, target, *delta, *prefix),
        Expr::Assign(target, op, value) => evaluate_assign(env, target, *op, value),
        Expr::Conditional(condition, then_expr, else_expr) => {
            if is_truthy(&evaluate_expr(env, condition)?) {
                evaluate_expr(env, then_expr)
            } else {
                evaluate_expr(env, else_expr)
            }
        }
        Expr::Property(..) | Expr::Index(..) | Expr::Call(..) => Ok(evaluate_chain(env, expr)?.unwrap_or(Value::Undefined)),
        Expr::OptionalChain(inner) => Ok(evaluate_chain(env, inner)?.unwrap_or(Value::Undefined)),
        Expr::New(callee, args) => {
            let ctor = evaluate_expr(env, callee)?;
            let args = evaluate_arguments(env, args)?;
            construct(&ctor, &args, callee)
        }
        Expr::Array(items) => Ok(Value::array(evaluate_arguments(env, items)?)),
        Expr::Object(members) => evaluate_object_literal(env, members),
        Expr::Spread(_) => Err(raise_eval_error!("SyntaxError: Unexpected spread element")),
        Expr::Function(def) => Ok(make_closure(env, def)),
    }
}

fn logical_short_circuits(op: LogicalOp, left: &Value) -> bool {
    match op {
        LogicalOp::And => !is_truthy(left),
        LogicalOp::Or => is_truthy(left),
        LogicalOp::Nullish => !left.is_nullish(),
    }
}

fn assignment_target(target: &Expr) -> Result<&str, JSError> {
    match target {
        Expr::Var(name) => Ok(name),
        other => Err(raise_eval_error!(format!(
            "SyntaxError: Invalid assignment target `{other}`; values are immutable"
        ))),
    }
}

fn evaluate_update(env: &Environment, target: &Expr, delta: f64, prefix: bool) -> Result<Value, JSError> {
    let name = assignment_target(target)?;
    let old = to_number(&evaluate_var(env, name)?);
    let new = old + delta;
    env.assign(name, Value::Number(new))?;
    Ok(Value::Number(if prefix { new } else { old }))
}

fn evaluate_assign(env: &Environment, target: &Expr, op: AssignOp, value: &Expr) -> Result<Value, JSError> {
    let name = assignment_target(target)?;
    let new_value = match op {
        AssignOp::Assign => name_anonymous_function(evaluate_expr(env, value)?, name),
        AssignOp::Compound(bin) => {
            let current = evaluate_var(env, name)?;
            binary_op(bin, &current, &evaluate_expr(env, value)?)?
        }
        AssignOp::Logical(logical) => {
            let current = evaluate_var(env, name)?;
            if logical_short_circuits(logical, &current) {
                return Ok(current);
            }
            name_anonymous_function(evaluate_expr(env, value)?, name)
        }
    };
    env.assign(name, new_value.clone())?;
    Ok(new_value)
}

fn evaluate_arguments(env: &Environment, args: &[Expr]) -> Result<Vec<Value>, JSError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Expr::Spread(inner) => values.extend(iterate_values(&evaluate_expr(env, inner)?)?),
            other => values.push(evaluate_expr(env, other)?),
        }
    }
    Ok(values)
}

fn evaluate_object_literal(env: &Environment, members: &[ObjectMember]) -> Result<Value, JSError> {
    let mut props = JSObject::new();
    for member in members {
        match member {
            ObjectMember::Property(key, value) => {
                let key = match key {
                    PropertyKey::Static(k) => k.clone(),
                    PropertyKey::Computed(k) => to_property_key(&evaluate_expr(env, k)?),
                };
                let value = name_anonymous_function(evaluate_expr(env, value)?, &key);
                props.insert(key, value);
            }
            ObjectMember::Spread(source) => match evaluate_expr(env, source)? {
                Value::Object(src) => props.extend(src.iter().map(|(k, v)| (k.clone(), v.clone()))),
                Value::Array(items) => props.extend(items.iter().enumerate().map(|(i, v)| (i.to_string(), v.clone()))),
                Value::String(s) => props.extend(s.chars().enumerate().map(|(i, c)| (i.to_string(), Value::String(c.to_string())))),
                _ => {}
            },
        }
    }
    Ok(Value::object(props))
}

/// Evaluate a member/call chain. `None` means an optional link met null or
/// undefined and the rest of the chain was skipped.
pub fn evaluate_chain(env: &Environment, expr: &Expr) -> Result<Option<Value>, JSError> {
    match expr {
        Expr::Property(object, name, optional) => {
            let Some(base) = evaluate_chain_base(env, object, *optional)? else {
                return Ok(None);
            };
            get_property(&base, name).map(Some).map_err(|e| e.with_context(expr))
        }
        Expr::Index(object, key, optional) => {
            let Some(base) = evaluate_chain_base(env, object, *optional)? else {
                return Ok(None);
            };
            let key = to_property_key(&evaluate_expr(env, key)?);
            get_property(&base, &key).map(Some).map_err(|e| e.with_context(expr))
        }
        Expr::Call(callee, args, optional) => {
            let (receiver, func) = match callee.as_ref() {
                Expr::Property(object, name, member_optional) => {
                    let Some(base) = evaluate_chain_base(env, object, *member_optional)? else {
                        return Ok(None);
                    };
                    let func = get_property(&base, name).map_err(|e| e.with_context(callee.as_ref()))?;
                    (Some(base), func)
                }
                Expr::Index(object, key, member_optional) => {
                    let Some(base) = evaluate_chain_base(env, object, *member_optional)? else {
                        return Ok(None);
                    };
                    let key = to_property_key(&evaluate_expr(env, key)?);
                    let func = get_property(&base, &key).map_err(|e| e.with_context(callee.as_ref()))?;
                    (Some(base), func)
                }
                other => match evaluate_chain(env, other)? {
                    Some(func) => (None, func),
                    None => return Ok(None),
                },
            };
            if *optional && func.is_nullish() {
                return Ok(None);
            }
            let args = evaluate_arguments(env, args)?;
            call_value(receiver.as_ref(), &func, &args, callee).map(Some)
        }
        other => evaluate_expr(env, other).map(Some),
    }
}

fn evaluate_chain_base(env: &Environment, object: &Expr, optional: bool) -> Result<Option<Value>, JSError> {
    match evaluate_chain(env, object)? {
        Some(base) if optional && base.is_nullish() => Ok(None),
        other => Ok(other),
    }
}

/// Property read with JS semantics: missing keys are `undefined`, reading
/// from `null`/`undefined` is a TypeError.
pub fn get_property(base: &Value, key: &str) -> Result<Value, JSError> {
    let method = |prefix: &str| Value::Function(format!("{prefix}.prototype.{key}"));
    Ok(match base {
        Value::Null | Value::Undefined => {
            return Err(raise_type_error!(format!(
                "Cannot read properties of {} (reading '{key}')",
                value_to_string(base)
            )));
        }
        Value::String(s) => match key {
            "length" => Value::Number(s.encode_utf16().count() as f64),
            _ if js_string::is_string_method(key) => method("String"),
            _ => match array_index(key) {
                Some(i) => js_string::code_unit_at(s, i).map_or(Value::Undefined, Value::String),
                None => Value::Undefined,
            },
        },
        Value::Array(items) => match key {
            "length" => Value::Number(items.len() as f64),
            _ if js_array::is_array_method(key) => method("Array"),
            _ => array_index(key).and_then(|i| items.get(i).cloned()).unwrap_or(Value::Undefined),
        },
        Value::Object(props) => match props.get(key) {
            Some(v) => v.clone(),
            None if js_object::is_object_method(key) => method("Object"),
            None => Value::Undefined,
        },
        Value::Number(_) if js_number::is_number_method(key) => method("Number"),
        Value::Boolean(_) if matches!(key, "toString" | "valueOf") => method("Boolean"),
        Value::Date(_) if js_date::is_date_method(key) => method("Date"),
        Value::Function(name) => match static_member(name, key) {
            Some(v) => v,
            None if key == "name" => Value::string(name.rsplit('.').next().unwrap_or(name)),
            None => Value::Undefined,
        },
        Value::Closure(c) => match key {
            "name" => Value::string(c.name.clone().unwrap_or_default()),
            "length" => Value::Number(c.def.params.iter().take_while(|p| !p.rest && p.default.is_none()).count() as f64),
            _ => Value::Undefined,
        },
        _ => Value::Undefined,
    })
}

fn static_member(ctor: &str, key: &str) -> Option<Value> {
    match ctor {
        "Object" => js_object::object_static_property(key),
        "Array" => js_array::array_static_property(key),
        "Number" => js_number::number_static_property(key),
        "String" => js_string::string_static_property(key),
        "Date" => js_date::date_static_property(key),
        _ => None,
    }
}

fn call_value(receiver: Option<&Value>, func: &Value, args: &[Value], callee: &Expr) -> Result<Value, JSError> {
    if let Value::Function(name) = func
        && name.contains(".prototype.")
    {
        let method = name.rsplit('.').next().unwrap_or(name);
        return match receiver {
            Some(base) => call_builtin_method(base, method, args),
            None => Err(raise_type_error!(format!("Method {name} called on incompatible receiver undefined"))),
        };
    }
    if !func.is_callable() {
        return Err(raise_type_error!(format!("{callee} is not a function")));
    }
    call_function(func, args)
}

/// Call a function value with already-evaluated arguments.
pub fn call_function(func: &Value, args: &[Value]) -> Result<Value, JSError> {
    match func {
        Value::Closure(closure) => call_closure(closure, args),
        Value::Function(name) => call_native_function(name, args),
        other => Err(raise_type_error!(format!("{} is not a function", inspect(other, true)))),
    }
}

pub fn call_closure(closure: &Rc<Closure>, args: &[Value]) -> Result<Value, JSError> {
    let _guard = CallDepthGuard::enter()?;
    let def = &closure.def;
    log::debug!("call_closure {} with {} args", closure.name.as_deref().unwrap_or("(anonymous)"), args.len());

    let scope = closure.env.child();
    if !def.is_arrow
        && let Some(name) = &def.name
    {
        scope.declare(name, Value::Closure(closure.clone()), DeclKind::Var)?;
    }
    for (i, param) in def.params.iter().enumerate() {
        let value = if param.rest {
            Value::array(args.get(i..).map(<[Value]>::to_vec).unwrap_or_default())
        } else {
            arg(args, i)
        };
        let value = match (&value, &param.default) {
            (Value::Undefined, Some(default)) => evaluate_expr(&scope, default)?,
            _ => value,
        };
        bind_pattern(&scope, &param.pattern, value, DeclKind::Var)?;
    }

    match &def.body {
        FunctionBody::Expr(body) => evaluate_expr(&scope, body),
        FunctionBody::Block(statements) => {
            let mut ignored = Value::Undefined;
            match run_block(&scope, statements, &mut ignored)? {
                Some(ControlFlow::Return(value)) => Ok(value),
                Some(ControlFlow::Break | ControlFlow::Continue) => {
                    Err(raise_eval_error!("SyntaxError: Illegal break or continue outside a loop"))
                }
                Some(ControlFlow::Normal(_)) | None => Ok(Value::Undefined),
            }
        }
    }
}

/// Dispatch a builtin by its qualified name, e.g. `Math.floor` or `parseInt`.
fn call_native_function(name: &str, args: &[Value]) -> Result<Value, JSError> {
    log::trace!("call_native_function {name}");
    if name.contains(".prototype.") {
        return Err(raise_type_error!(format!("Method {name} called on incompatible receiver undefined")));
    }
    match name.split_once('.') {
        Some(("Math", method)) => js_math::handle_math_call(method, args),
        Some(("JSON", method)) => js_json::handle_json_method(method, args),
        Some(("Object", method)) => js_object::handle_object_static_method(method, args),
        Some(("Array", method)) => js_array::handle_array_static_method(method, args),
        Some(("Number", method)) => js_number::handle_number_static_method(method, args),
        Some(("String", method)) => js_string::handle_string_static_method(method, args),
        Some(("Date", method)) => js_date::handle_date_static_method(method, args),
        Some(("console", method)) => js_console::handle_console_method(method, args),
        _ => match name {
            "String" => Ok(Value::String(args.first().map(value_to_string).unwrap_or_default())),
            "Number" => Ok(Value::Number(args.first().map_or(0.0, to_number))),
            "Boolean" => Ok(Value::Boolean(is_truthy(&arg(args, 0)))),
            "Array" => js_array::construct_array(args),
            "Object" => Ok(js_object::construct_object(args)),
            "Date" => Ok(Value::String(js_date::date_to_string(js_date::now_millis()))),
            "parseInt" | "parseFloat" | "isNaN" | "isFinite" => js_number::handle_global_function(name, args),
            _ if js_error::is_error_constructor(name) => Ok(js_error::construct_error(name, args)),
            _ => Err(raise_eval_error!(format!("Unknown builtin function {name}"))),
        },
    }
}

fn call_builtin_method(receiver: &Value, method: &str, args: &[Value]) -> Result<Value, JSError> {
    match receiver {
        Value::String(s) => js_string::handle_string_method(s, method, args),
        Value::Array(items) => js_array::handle_array_method(items, method, args),
        Value::Object(props) => js_object::handle_object_method(props, method, args),
        Value::Number(n) => js_number::handle_number_method(*n, method, args),
        Value::Boolean(b) => js_number::handle_boolean_method(*b, method),
        Value::Date(date) => js_date::handle_date_method(date, method, args),
        other => Err(raise_type_error!(format!("{}.{method} is not a function", inspect(other, true)))),
    }
}

fn construct(ctor: &Value, args: &[Value], callee: &Expr) -> Result<Value, JSError> {
    match ctor {
        Value::Function(name) if name == "Date" => js_date::construct_date(args),
        Value::Function(name) if name == "Array" => js_array::construct_array(args),
        Value::Function(name) if name == "Object" => Ok(js_object::construct_object(args)),
        Value::Function(name) if js_error::is_error_constructor(name) => Ok(js_error::construct_error(name, args)),
        _ => Err(raise_type_error!(format!("{callee} is not a constructor"))),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (to_primitive(left), to_primitive(right)) {
        (Value::String(a), Value::String(b)) => Some(a.encode_utf16().cmp(b.encode_utf16())),
        (a, b) => to_number(&a).partial_cmp(&to_number(&b)),
    }
}

pub fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, JSError> {
    let num = |v: &Value| to_number(v);
    Ok(match op {
        BinaryOp::Add => {
            let (l, r) = (to_primitive(left), to_primitive(right));
            if matches!(l, Value::String(_)) || matches!(r, Value::String(_)) {
                Value::String(value_to_string(&l) + &value_to_string(&r))
            } else {
                Value::Number(num(&l) + num(&r))
            }
        }
        BinaryOp::Sub => Value::Number(num(left) - num(right)),
        BinaryOp::Mul => Value::Number(num(left) * num(right)),
        BinaryOp::Div => Value::Number(num(left) / num(right)),
        BinaryOp::Mod => Value::Number(num(left) % num(right)),
        BinaryOp::Pow => Value::Number(js_math::js_pow(num(left), num(right))),
        BinaryOp::Equal => Value::Boolean(loose_equal(left, right)),
        BinaryOp::NotEqual => Value::Boolean(!loose_equal(left, right)),
        BinaryOp::StrictEqual => Value::Boolean(strict_equal(left, right)),
        BinaryOp::StrictNotEqual => Value::Boolean(!strict_equal(left, right)),
        BinaryOp::LessThan => Value::Boolean(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::GreaterThan => Value::Boolean(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::LessEqual => Value::Boolean(matches!(compare(left, right), Some(Ordering::Less | Ordering::Equal))),
        BinaryOp::GreaterEqual => Value::Boolean(matches!(compare(left, right), Some(Ordering::Greater | Ordering::Equal))),
        BinaryOp::In => {
            let key = to_property_key(left);
            match right {
                Value::Object(props) => Value::Boolean(props.contains_key(&key)),
                Value::Array(items) => Value::Boolean(key == "length" || array_index(&key).is_some_and(|i| i < items.len())),
                other => {
                    return Err(raise_type_error!(format!(
                        "Cannot use 'in' operator to search for '{key}' in {}",
                        inspect(other, true)
                    )));
                }
            }
        }
        BinaryOp::BitAnd => Value::Number((to_int32(num(left)) & to_int32(num(right))) as f64),
        BinaryOp::BitOr => Value::Number((to_int32(num(left)) | to_int32(num(right))) as f64),
        BinaryOp::BitXor => Value::Number((to_int32(num(left)) ^ to_int32(num(right))) as f64),
        BinaryOp::LeftShift => Value::Number(to_int32(num(left)).wrapping_shl(to_uint32(num(right)) & 31) as f64),
        BinaryOp::RightShift => Value::Number((to_int32(num(left)) >> (to_uint32(num(right)) & 31)) as f64),
        BinaryOp::UnsignedRightShift => Value::Number((to_uint32(num(left)) >> (to_uint32(num(right)) & 31)) as f64),
    })
}

pub fn unary_op(op: UnaryOp, operand: &Value) -> Result<Value, JSError> {
    Ok(match op {
        UnaryOp::Neg => Value::Number(-to_number(operand)),
        UnaryOp::Plus => Value::Number(to_number(operand)),
        UnaryOp::Not => Value::Boolean(!is_truthy(operand)),
        UnaryOp::BitNot => Value::Number(!to_int32(to_number(operand)) as f64),
        UnaryOp::TypeOf => Value::string(operand.type_of()),
        UnaryOp::Void => Value::Undefined,
    })
}
