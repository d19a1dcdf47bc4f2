use std::collections::{HashMap, HashSet};

use log::trace;

use super::ast::{DeclarationKind, Expr, LogicalOp, Stmt};
use super::value::{Native, Value, binary, get_property, unary};
use super::{OutputSink, RuntimeError};

type ExecResult<T> = std::result::Result<T, RuntimeError>;

/// A binding; `value` stays `None` until the declaration runs.
struct Slot {
    value: Option<Value>,
    mutable: bool,
}

/// Block-scoped variable environment. Scope 0 is the script scope and also
/// receives every `var` binding.
pub(super) struct Environment {
    scopes: Vec<HashMap<String, Slot>>,
}

impl Environment {
    pub(super) fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Registers the `let`/`const` declarations of a block as uninitialized.
    fn hoist_lexical(&mut self, statements: &[Stmt]) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        for statement in statements {
            if let Stmt::Declare { kind, name, .. } = statement
                && kind.is_lexical()
            {
                scope.insert(
                    name.clone(),
                    Slot {
                        value: None,
                        mutable: *kind != DeclarationKind::Const,
                    },
                );
            }
        }
    }

    fn hoist_vars(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.hoist_var(statement);
        }
    }

    fn hoist_var(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Declare {
                kind: DeclarationKind::Var,
                name,
                ..
            } => {
                self.scopes[0].entry(name.clone()).or_insert(Slot {
                    value: Some(Value::Undefined),
                    mutable: true,
                });
            }
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.hoist_var(then_branch);
                if let Some(else_branch) = else_branch {
                    self.hoist_var(else_branch);
                }
            }
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    self.hoist_var(init);
                }
                self.hoist_var(body);
            }
            Stmt::While { body, .. } => self.hoist_var(body),
            Stmt::Block(body) => self.hoist_vars(body),
            Stmt::Declare { .. } | Stmt::Expr(_) | Stmt::Empty => {}
        }
    }

    fn initialize(&mut self, name: &str, value: Value, mutable: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name.to_string(),
                Slot {
                    value: Some(value),
                    mutable,
                },
            );
        }
    }

    fn set_var(&mut self, name: &str, value: Value) {
        self.scopes[0].insert(
            name.to_string(),
            Slot {
                value: Some(value),
                mutable: true,
            },
        );
    }

    fn load(&self, name: &str) -> ExecResult<Value> {
        if let Some(slot) = self.scopes.iter().rev().find_map(|scope| scope.get(name)) {
            return slot
                .value
                .clone()
                .ok_or_else(|| RuntimeError::UninitializedBinding {
                    name: name.to_string(),
                });
        }
        match name {
            "undefined" => Ok(Value::Undefined),
            "NaN" => Ok(Value::Number(f64::NAN)),
            "Infinity" => Ok(Value::Number(f64::INFINITY)),
            "console" => Ok(Value::Native(Native::Console)),
            _ => Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
            }),
        }
    }

    fn assign(&mut self, name: &str, value: Value) -> ExecResult<()> {
        let slot = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })?;
        if slot.value.is_none() {
            return Err(RuntimeError::UninitializedBinding {
                name: name.to_string(),
            });
        }
        if !slot.mutable {
            return Err(RuntimeError::ConstantAssignment {
                name: name.to_string(),
            });
        }
        slot.value = Some(value);
        Ok(())
    }
}

/// Rejects duplicate lexical declarations within one block before anything
/// runs.
pub(super) fn check_declarations(statements: &[Stmt]) -> ExecResult<()> {
    let mut lexical = HashSet::new();
    let mut vars = HashSet::new();
    for statement in statements {
        if let Stmt::Declare { kind, name, .. } = statement {
            let clash = if kind.is_lexical() {
                !lexical.insert(name.as_str()) || vars.contains(name.as_str())
            } else {
                vars.insert(name.as_str());
                lexical.contains(name.as_str())
            };
            if clash {
                return Err(RuntimeError::Redeclaration { name: name.clone() });
            }
        }
        check_nested(statement)?;
    }
    Ok(())
}

fn check_nested(statement: &Stmt) -> ExecResult<()> {
    match statement {
        Stmt::Block(body) => check_declarations(body),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            check_nested(then_branch)?;
            match else_branch {
                Some(else_branch) => check_nested(else_branch),
                None => Ok(()),
            }
        }
        Stmt::For { body, .. } | Stmt::While { body, .. } => check_nested(body),
        Stmt::Declare { .. } | Stmt::Expr(_) | Stmt::Empty => Ok(()),
    }
}

/// Tree-walking executor writing `console.log` lines into a sink.
pub(super) struct InterpreterRuntime<'s> {
    environment: Environment,
    sink: &'s mut dyn OutputSink,
    max_steps: Option<u64>,
    steps: u64,
}

impl<'s> InterpreterRuntime<'s> {
    pub(super) fn new(sink: &'s mut dyn OutputSink, max_steps: Option<u64>) -> Self {
        Self {
            environment: Environment::new(),
            sink,
            max_steps,
            steps: 0,
        }
    }

    pub(super) fn run_program(&mut self, program: &[Stmt]) -> ExecResult<()> {
        self.environment.hoist_vars(program);
        self.exec_statements(program)?;
        trace!("host program finished after {} steps", self.steps);
        Ok(())
    }

    fn tick(&mut self) -> ExecResult<()> {
        self.steps += 1;
        if let Some(limit) = self.max_steps
            && self.steps > limit
        {
            return Err(RuntimeError::StepLimitExceeded { limit });
        }
        Ok(())
    }

    fn exec_statements(&mut self, statements: &[Stmt]) -> ExecResult<()> {
        self.environment.hoist_lexical(statements);
        for statement in statements {
            self.exec_statement(statement)?;
        }
        Ok(())
    }

    fn exec_block(&mut self, statements: &[Stmt]) -> ExecResult<()> {
        self.environment.push_scope();
        let result = self.exec_statements(statements);
        self.environment.pop_scope();
        result
    }

    fn exec_statement(&mut self, statement: &Stmt) -> ExecResult<()> {
        self.tick()?;
        match statement {
            Stmt::Declare { kind, name, init } => {
                let value = match init {
                    Some(init) => Some(self.eval(init)?),
                    None => None,
                };
                if kind.is_lexical() {
                    self.environment.initialize(
                        name,
                        value.unwrap_or(Value::Undefined),
                        *kind != DeclarationKind::Const,
                    );
                } else if let Some(value) = value {
                    self.environment.set_var(name, value);
                }
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.exec_statement(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.exec_statement(else_branch)?;
                }
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                self.environment.push_scope();
                let result = self.exec_for(init.as_deref(), condition.as_ref(), update.as_ref(), body);
                self.environment.pop_scope();
                result?;
            }
            Stmt::While { condition, body } => loop {
                self.tick()?;
                if !self.eval(condition)?.is_truthy() {
                    break;
                }
                self.exec_statement(body)?;
            },
            Stmt::Block(body) => self.exec_block(body)?,
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::Empty => {}
        }
        Ok(())
    }

    fn exec_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> ExecResult<()> {
        if let Some(init) = init {
            self.environment.hoist_lexical(std::slice::from_ref(init));
            self.exec_statement(init)?;
        }
        loop {
            self.tick()?;
            if let Some(condition) = condition
                && !self.eval(condition)?.is_truthy()
            {
                return Ok(());
            }
            self.exec_statement(body)?;
            if let Some(update) = update {
                self.eval(update)?;
            }
        }
    }

    fn eval(&mut self, expr: &Expr) -> ExecResult<Value> {
        match expr {
            Expr::Number(value) => Ok(Value::Number(*value)),
            Expr::String(value) => Ok(Value::String(value.clone())),
            Expr::Boolean(value) => Ok(Value::Boolean(*value)),
            Expr::Null => Ok(Value::Null),
            Expr::Identifier(name) => self.environment.load(name),
            Expr::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                Ok(unary(*op, &operand))
            }
            Expr::Binary { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(binary(*op, &left, &right))
            }
            Expr::Logical { left, op, right } => {
                let left = self.eval(left)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            Expr::Assign { name, op, value } => {
                let value = match op {
                    Some(op) => {
                        let current = self.environment.load(name)?;
                        let operand = self.eval(value)?;
                        binary(*op, &current, &operand)
                    }
                    None => self.eval(value)?,
                };
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Update {
                name,
                increment,
                prefix,
            } => {
                let old = self.environment.load(name)?.to_number();
                let new = if *increment { old + 1.0 } else { old - 1.0 };
                self.environment.assign(name, Value::Number(new))?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                get_property(&object, property)
            }
            Expr::Call { callee, args } => {
                let target = self.eval(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<ExecResult<Vec<_>>>()?;
                match target {
                    Value::Native(Native::ConsoleLog) => {
                        self.console_log(&args);
                        Ok(Value::Undefined)
                    }
                    _ => Err(RuntimeError::NotCallable {
                        callee: callee.describe(),
                    }),
                }
            }
        }
    }

    fn console_log(&mut self, args: &[Value]) {
        let line = args
            .iter()
            .map(Value::to_console_string)
            .collect::<Vec<_>>()
            .join(" ");
        trace!("console.log -> {line:?}");
        self.sink.write_line(&line);
    }
}
