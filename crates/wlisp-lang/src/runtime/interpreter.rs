//! Tree-walking evaluator. Each node kind executes against an environment;
//! all state lives in the environment chain.

use crate::error::Result;
use crate::runtime::environment::Environment;
use crate::runtime::variant::{CallSite, Callable, Closure, Variant};
use crate::syntax::ast::{Ast, BinOp};

use std::rc::Rc;

impl Ast {
    /// Evaluate this node. `arguments` is the argument list of the call that
    /// entered the enclosing body; it is passed down unchanged and no node
    /// kind reads it.
    pub fn execute(&self, env: &Environment, arguments: &[Variant]) -> Result<Variant> {
        match self {
            Ast::Atomic { value, .. } => Ok(value.clone()),

            Ast::Variable(token) => env.get(&token.text).map_err(|e| e.at(token.span())),

            Ast::Set { identifier, value } => {
                let value = value.execute(env, arguments)?;
                env.set(&identifier.text, value);
                Ok(Variant::Nil)
            }

            Ast::If { test, consequent, alternate, span } => {
                let tested = test.execute(env, arguments)?;
                if tested.boolean().map_err(|e| e.at(*span))? {
                    consequent.execute(env, arguments)
                } else {
                    alternate.execute(env, arguments)
                }
            }

            Ast::List(items, _) => {
                let values = items.iter()
                    .map(|item| item.execute(env, arguments))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Variant::List(values))
            }

            Ast::Lambda { parameters, body, .. } => {
                Ok(Variant::Callable(Callable::Lambda(Rc::new(Closure {
                    parameters: parameters.clone(),
                    body: body.clone(),
                    scope: env.clone(),
                }))))
            }

            Ast::Procedure { identifier, arguments: args } => {
                let span = identifier.span();
                let target = env.get(&identifier.text).map_err(|e| e.at(span))?;
                let callable = target.callable().map_err(|e| e.at(span))?;
                let values = args.execute(env, arguments)?;
                let values = values.list().map_err(|e| e.at(span))?;

                let site = CallSite::from_token(identifier);
                log::trace!("call `{}` at {}:{} with {} args", site.name, span.line, span.column, values.len());
                callable.call(&site, env, values)
            }

            Ast::Operator { op, operation, left, right } => {
                let l = left.execute(env, arguments)?;
                let r = right.execute(env, arguments)?;
                eval_binop(*op, &l, &r).map_err(|e| e.at(operation.span()))
            }

            Ast::PrintLine(expr, span) => {
                let value = expr.execute(env, arguments)?;
                env.write_line(&value.render()).map_err(|e| e.at(*span))?;
                Ok(Variant::Nil)
            }
        }
    }
}

// ─── Call dispatch ────────────────────────────────────────────────────────────

impl Callable {
    /// Invoke with already-evaluated arguments. `env` is the caller's scope;
    /// natives may use it, lambdas ignore it in favour of their captured scope.
    pub fn call(&self, site: &CallSite, env: &Environment, args: &[Variant]) -> Result<Variant> {
        match self {
            Callable::Native { func, .. } => func(site, env, args).map_err(|e| e.at(site.span)),
            Callable::Lambda(closure) => closure.invoke(site, args),
        }
    }
}

impl Closure {
    fn invoke(&self, site: &CallSite, args: &[Variant]) -> Result<Variant> {
        site.check_argc(args, self.parameters.len())?;

        let local = Environment::with_parent(&self.scope);
        for (param, value) in self.parameters.iter().zip(args) {
            local.define(&param.text, value.clone());
        }
        log::trace!("enter `{}` with fresh scope of {} params", site.name, self.parameters.len());
        self.body.execute(&local, args)
    }
}

// ─── Binary operators ─────────────────────────────────────────────────────────

fn eval_binop(op: BinOp, l: &Variant, r: &Variant) -> Result<Variant> {
    match op {
        BinOp::Add  => l.add(r),
        BinOp::Sub  => l.sub(r),
        BinOp::Mul  => l.mul(r),
        BinOp::Div  => l.div(r),
        BinOp::Lt   => l.lt(r),
        BinOp::Gt   => l.gt(r),
        BinOp::LtEq => l.le(r),
        BinOp::GtEq => l.ge(r),
        // structural, defined for every case
        BinOp::Eq   => Ok(Variant::Boolean(l == r)),
    }
}
