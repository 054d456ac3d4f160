//! Output generation.
//!
//! The [`Emitter`] prints checked modules as plain JavaScript. Type
//! annotations, interfaces without a runtime form, imports and exports are
//! erased; every identifier is printed under the name the naming pass gave
//! its variable. Expressions are parenthesized by precedence only where the
//! output would otherwise parse differently.
//!
//! Compact mode drops indentation, newlines and optional spaces.

use std::fmt::Write;

use wtscript_core::{TypeHash, primitives};
use wtscript_registry::{TypeEntry, Value};
use wtscript_syntax::{
    ClassDecl, ClassMember, ClassMemberKind, EnumDecl, ExportDecl, Expr, Function, Ident,
    InterfaceDecl, MemberModifiers, Stmt, TypeExpr,
};

use crate::context::CompilationContext;

// Binding strength of output expressions, higher binds tighter.
const ASSIGN: u8 = 1;
const CONDITIONAL: u8 = 2;
const BINARY: u8 = 2;
const UNARY: u8 = 13;
const POSTFIX: u8 = 14;
const PRIMARY: u8 = 15;

pub struct Emitter<'a> {
    ctx: &'a CompilationContext,
    out: String,
    depth: usize,
}

impl<'a> Emitter<'a> {
    pub fn new(ctx: &'a CompilationContext) -> Self {
        Self {
            ctx,
            out: String::new(),
            depth: 0,
        }
    }

    fn compact(&self) -> bool {
        self.ctx.config.compact
    }

    /// An optional space.
    fn sp(&self) -> &'static str {
        if self.compact() { "" } else { " " }
    }

    fn nl(&self) -> &'static str {
        self.ctx.config.newline()
    }

    fn indent(&self) -> String {
        self.ctx.config.indent().repeat(self.depth)
    }

    /// A full output line at the current depth.
    fn line(&self, text: &str) -> String {
        format!("{}{text}{}", self.indent(), self.nl())
    }

    /// The target comment, readable output only.
    pub fn header(&mut self) {
        if !self.compact() {
            let _ = writeln!(self.out, "// target: {}", self.ctx.config.target);
        }
    }

    /// Command line defines as string constants, in key order.
    pub fn defines(&mut self) {
        let sp = self.sp();
        for (name, value) in &self.ctx.config.defines {
            let line = self.line(&format!("const {name}{sp}={sp}{};", quote(value)));
            self.out.push_str(&line);
        }
    }

    pub fn module(&mut self, body: &[Stmt]) {
        let text = self.stmts(body);
        self.out.push_str(&text);
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn name(&self, ident: &Ident) -> String {
        match ident.binding() {
            Some(var) => self.ctx.variables.name(var).to_string(),
            None => ident.name.clone(),
        }
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn stmts(&mut self, body: &[Stmt]) -> String {
        body.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    /// `{ .. }` around `body`, one level deeper.
    fn block(&mut self, body: &[Stmt]) -> String {
        if body.is_empty() {
            return "{}".to_string();
        }
        self.depth += 1;
        let inner = self.stmts(body);
        self.depth -= 1;
        format!("{{{}{inner}{}}}", self.nl(), self.indent())
    }

    fn stmt(&mut self, stmt: &Stmt) -> String {
        let sp = self.sp();
        match stmt {
            Stmt::Var(_) => {
                let text = self.inline_stmt(stmt);
                self.line(&format!("{text};"))
            }
            Stmt::Function(func) => {
                let text = self.function(func);
                self.line(&text)
            }
            Stmt::Class(class) => self.class(class),
            Stmt::Interface(interface) => self.interface(interface),
            Stmt::Enum(decl) => self.enumeration(decl),
            Stmt::Expr(expr) => {
                let mut text = self.expr(expr, 0);
                if starts_with_function(expr) {
                    text = format!("({text})");
                }
                self.line(&format!("{text};"))
            }
            Stmt::Return { value, .. } => match value {
                Some(value) => {
                    let value = self.expr(value, 0);
                    self.line(&format!("return {value};"))
                }
                None => self.line("return;"),
            },
            Stmt::If {
                branches,
                otherwise,
                ..
            } => {
                let mut text = String::new();
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        let _ = write!(text, "{sp}else ");
                    }
                    let cond = self.expr(&branch.cond, 0);
                    let body = self.block(&branch.body);
                    let _ = write!(text, "if{sp}({cond}){sp}{body}");
                }
                if let Some(otherwise) = otherwise {
                    let body = self.block(otherwise);
                    let _ = write!(text, "{sp}else{sp}{body}");
                }
                self.line(&text)
            }
            Stmt::While { cond, body, .. } => {
                let cond = self.expr(cond, 0);
                let body = self.block(body);
                self.line(&format!("while{sp}({cond}){sp}{body}"))
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
                ..
            } => {
                let init = init
                    .as_deref()
                    .map(|init| self.inline_stmt(init))
                    .unwrap_or_default();
                let cond = cond.as_ref().map(|c| self.expr(c, 0)).unwrap_or_default();
                let step = step.as_ref().map(|s| self.expr(s, 0)).unwrap_or_default();
                let body = self.block(body);
                self.line(&format!("for{sp}({init};{sp}{cond};{sp}{step}){sp}{body}"))
            }
            Stmt::Switch { subject, cases, .. } => {
                let subject = self.expr(subject, 0);
                let mut text = format!("switch{sp}({subject}){sp}{{{}", self.nl());
                self.depth += 1;
                for case in cases {
                    let label = match &case.test {
                        Some(test) => format!("case {}:", self.expr(test, 0)),
                        None => "default:".to_string(),
                    };
                    text.push_str(&self.line(&label));
                    self.depth += 1;
                    text.push_str(&self.stmts(&case.body));
                    self.depth -= 1;
                }
                self.depth -= 1;
                let _ = write!(text, "{}}}", self.indent());
                self.line(&text)
            }
            Stmt::Block { body, .. } => {
                let body = self.block(body);
                self.line(&body)
            }
            Stmt::Break { .. } => self.line("break;"),
            Stmt::Continue { .. } => self.line("continue;"),
            Stmt::Throw { value, .. } => {
                let value = self.expr(value, 0);
                self.line(&format!("throw {value};"))
            }
            Stmt::Try {
                body,
                catch,
                finally,
                ..
            } => {
                let mut text = format!("try{sp}{}", self.block(body));
                if let Some(catch) = catch {
                    let body = self.block(&catch.body);
                    match &catch.param {
                        Some(param) => {
                            let _ = write!(text, "{sp}catch{sp}({}){sp}{body}", self.name(param));
                        }
                        None => {
                            let _ = write!(text, "{sp}catch{sp}{body}");
                        }
                    }
                }
                if let Some(finally) = finally {
                    let body = self.block(finally);
                    let _ = write!(text, "{sp}finally{sp}{body}");
                }
                self.line(&text)
            }
            Stmt::Import(_) => String::new(),
            Stmt::Export(ExportDecl::Declaration { stmt, .. }) => self.stmt(stmt),
            Stmt::Export(_) => String::new(),
        }
    }

    /// A declaration or expression without the trailing `;`, as used in
    /// `for` headers.
    fn inline_stmt(&mut self, stmt: &Stmt) -> String {
        let sp = self.sp();
        match stmt {
            Stmt::Var(decl) => {
                let decls: Vec<String> = decl
                    .decls
                    .iter()
                    .map(|d| match &d.init {
                        Some(init) => {
                            format!("{}{sp}={sp}{}", self.name(&d.name), self.expr(init, ASSIGN))
                        }
                        None => self.name(&d.name),
                    })
                    .collect();
                format!("{} {}", decl.kind.as_str(), decls.join(&format!(",{sp}")))
            }
            Stmt::Expr(expr) => self.expr(expr, 0),
            _ => String::new(),
        }
    }

    /// A function declaration or expression. Arrow functions keep their form.
    fn function(&mut self, func: &Function) -> String {
        let sp = self.sp();
        let mut text = String::new();
        if func.is_async {
            text.push_str("async ");
        }
        let params = self.params(func);
        let body = self.block(&func.body);
        if func.is_arrow {
            let _ = write!(text, "({params}){sp}=>{sp}{body}");
        } else {
            text.push_str("function");
            if let Some(name) = &func.name {
                let _ = write!(text, " {}", self.name(name));
            }
            let _ = write!(text, "({params}){sp}{body}");
        }
        text
    }

    fn params(&mut self, func: &Function) -> String {
        let sp = self.sp();
        let params: Vec<String> = func
            .params
            .iter()
            .map(|param| match &param.default {
                Some(default) => format!(
                    "{}{sp}={sp}{}",
                    self.name(&param.name),
                    self.expr(default, ASSIGN)
                ),
                None => self.name(&param.name),
            })
            .collect();
        params.join(&format!(",{sp}"))
    }

    // ==========================================================================
    // Classes, Interfaces and Enums
    // ==========================================================================

    /// Wrap member lines into a class body at the current depth.
    fn class_body(&self, header: &str, members: Vec<String>) -> String {
        let sp = self.sp();
        if members.is_empty() {
            return self.line(&format!("{header}{sp}{{}}"));
        }
        let mut text = self.line(&format!("{header}{sp}{{"));
        for member in members {
            text.push_str(&member);
        }
        text.push_str(&self.line("}"));
        text
    }

    fn class(&mut self, class: &ClassDecl) -> String {
        let sp = self.sp();
        let name = self.name(&class.name);
        let mut header = format!("class {name}");
        if let Some(TypeExpr::Named { name: parent, .. }) = &class.parent {
            let _ = write!(header, " extends {}", self.name(parent));
        }

        let ctx = self.ctx;
        let entry = class
            .name
            .binding()
            .and_then(|var| ctx.variables.get(var).object)
            .and_then(|hash| ctx.registry.class(hash));

        self.depth += 1;
        let mut members = Vec::new();
        if let Some(entry) = entry.filter(|entry| entry.is_universal()) {
            let props: Vec<String> = entry
                .properties()
                .map(|prop| format!("{}:{sp}{}", prop.name, self.type_ref(&prop.value)))
                .collect();
            members.push(self.line(&format!(
                "static __propertyTypes__{sp}={sp}{{{}}};",
                props.join(&format!(",{sp}"))
            )));
        }
        if let Some(ctor) = &class.constructor {
            let params = self.params(ctor);
            let body = self.block(&ctor.body);
            members.push(self.line(&format!("constructor({params}){sp}{body}")));
        }
        for member in &class.members {
            if let Some(text) = self.class_member(member) {
                members.push(text);
            }
        }
        self.depth -= 1;

        let mut text = self.class_body(&header, members);
        if let Some(entry) = entry.filter(|entry| entry.is_universal()) {
            for (interface, _) in ctx.registry.class_interfaces(entry.type_hash) {
                let universal = ctx
                    .registry
                    .interface(interface)
                    .is_some_and(|i| i.is_universal);
                if universal && let Some(interface) = self.type_name(interface) {
                    text.push_str(&self.line(&format!("{interface}.__implementations__.push({name});")));
                }
            }
        }
        text
    }

    fn class_member(&mut self, member: &ClassMember) -> Option<String> {
        if member.is_abstract() {
            return None;
        }
        let sp = self.sp();
        let prefix = if member.is_static() { "static " } else { "" };
        match &member.kind {
            ClassMemberKind::Property { init, .. } => match init {
                Some(init) => {
                    let init = self.expr(init, ASSIGN);
                    Some(self.line(&format!("{prefix}{}{sp}={sp}{init};", member.name)))
                }
                None if member.is_static() => Some(self.line(&format!("{prefix}{};", member.name))),
                None => None,
            },
            ClassMemberKind::Method(func) => {
                let mut head = prefix.to_string();
                if func.is_async {
                    head.push_str("async ");
                }
                if member.modifiers.contains(MemberModifiers::GETTER) {
                    head.push_str("get ");
                } else if member.modifiers.contains(MemberModifiers::SETTER) {
                    head.push_str("set ");
                }
                let params = self.params(func);
                let body = self.block(&func.body);
                Some(self.line(&format!("{head}{}({params}){sp}{body}", member.name)))
            }
        }
    }

    /// Universal and rpc interfaces exist at runtime as empty classes.
    fn interface(&mut self, interface: &InterfaceDecl) -> String {
        let ctx = self.ctx;
        let entry = interface
            .name
            .binding()
            .and_then(|var| ctx.variables.get(var).object)
            .and_then(|hash| ctx.registry.interface(hash));
        let Some(entry) = entry.filter(|entry| entry.is_universal || entry.is_rpc) else {
            return String::new();
        };
        let sp = self.sp();
        let header = format!("class {}", self.name(&interface.name));
        let mut members = Vec::new();
        if entry.is_universal {
            self.depth += 1;
            members.push(self.line(&format!("static __implementations__{sp}={sp}[];")));
            self.depth -= 1;
        }
        self.class_body(&header, members)
    }

    /// An enum becomes a class that can't be instantiated, with one static
    /// getter per member and lookups between keys and values.
    fn enumeration(&mut self, decl: &EnumDecl) -> String {
        let sp = self.sp();
        let name = self.name(&decl.name);
        let ctx = self.ctx;
        let entry = decl
            .name
            .binding()
            .and_then(|var| ctx.variables.get(var).object)
            .and_then(|hash| ctx.registry.enumeration(hash));
        let members = entry.map(|entry| entry.members.as_slice()).unwrap_or_default();

        let values: Vec<String> = members.iter().map(|m| literal(&m.value)).collect();
        let keys: Vec<String> = members.iter().map(|m| quote(&m.name)).collect();
        let comma = format!(",{sp}");

        self.depth += 1;
        let mut lines = vec![self.method_lines(
            "constructor()",
            &format!("throw new Error({});", quote(&format!("enum {name} can't be instantiated"))),
        )];
        for (member, value) in members.iter().zip(&values) {
            lines.push(self.method_lines(
                &format!("static get {}()", member.name),
                &format!("return {value};"),
            ));
        }
        lines.push(self.method_lines(
            "static get values()",
            &format!("return [{}];", values.join(&comma)),
        ));
        lines.push(self.method_lines(
            "static get keys()",
            &format!("return [{}];", keys.join(&comma)),
        ));
        lines.push(self.method_lines(
            "static value(key)",
            &format!("return {name}.values[{name}.keys.indexOf(key)];"),
        ));
        lines.push(self.method_lines(
            "static key(value)",
            &format!("return {name}.keys[{name}.values.indexOf(value)];"),
        ));
        self.depth -= 1;

        self.class_body(&format!("class {name}"), lines)
    }

    /// A one-statement method at the current depth.
    fn method_lines(&mut self, head: &str, body: &str) -> String {
        let sp = self.sp();
        let mut text = self.line(&format!("{head}{sp}{{"));
        self.depth += 1;
        text.push_str(&self.line(body));
        self.depth -= 1;
        text.push_str(&self.line("}"));
        text
    }

    /// Runtime description of a property type: a class reference, a quoted
    /// primitive name, or a list for arrays and tuples.
    fn type_ref(&self, value: &Value) -> String {
        let sp = self.sp();
        if let Value::Tuple(tuple) = value.peel() {
            let items: Vec<String> = tuple.items.iter().map(|item| self.type_ref(item)).collect();
            return format!("[{}]", items.join(&format!(",{sp}")));
        }
        match value.instance_of() {
            Some(instance) if instance.interface == primitives::ARRAY => match instance.arg() {
                Some(item) => format!("[{}]", self.type_ref(item)),
                None => "[]".to_string(),
            },
            Some(instance) => self
                .type_name(instance.interface)
                .map(str::to_string)
                .unwrap_or_else(|| quote(self.ctx.registry.type_name(instance.interface))),
            None => quote("Any"),
        }
    }

    /// The emitted name of a declared type. `None` for primitives.
    fn type_name(&self, hash: TypeHash) -> Option<&'a str> {
        let ctx = self.ctx;
        match ctx.registry.get(hash)? {
            TypeEntry::Primitive(_) => None,
            entry => entry.variable().map(|var| ctx.variables.name(var)),
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    /// Print `expr`, parenthesized if it binds looser than `min`.
    fn expr(&mut self, expr: &Expr, min: u8) -> String {
        let text = self.expr_inner(expr);
        if precedence(expr) < min {
            format!("({text})")
        } else {
            text
        }
    }

    fn expr_inner(&mut self, expr: &Expr) -> String {
        let sp = self.sp();
        match expr {
            Expr::Int { value, .. } => value.to_string(),
            Expr::Float { value, .. } => number(value.0),
            Expr::Str { value, .. } => quote(value),
            Expr::Bool { value, .. } => value.to_string(),
            Expr::Null { .. } => "null".to_string(),
            Expr::Ident(ident) => self.name(ident),
            Expr::This(_) => "this".to_string(),
            Expr::Super(_) => "super".to_string(),
            Expr::Array { items, .. } => {
                let items = self.list(items);
                format!("[{items}]")
            }
            Expr::Member {
                object, property, ..
            } => {
                let object = match &**object {
                    Expr::Int { .. } | Expr::Float { .. } => format!("({})", self.expr(object, 0)),
                    other => self.expr(other, POSTFIX),
                };
                format!("{object}.{property}")
            }
            Expr::Index { object, index, .. } => {
                let object = self.expr(object, POSTFIX);
                let index = self.expr(index, 0);
                format!("{object}[{index}]")
            }
            Expr::Call { callee, args, .. } => {
                let callee = self.expr(callee, POSTFIX);
                let args = self.list(args);
                format!("{callee}({args})")
            }
            Expr::New { class, args, .. } => {
                let class = match &**class {
                    call @ Expr::Call { .. } => format!("({})", self.expr(call, 0)),
                    other => self.expr(other, POSTFIX),
                };
                let args = self.list(args);
                format!("new {class}({args})")
            }
            Expr::Unary { op, operand, .. } => {
                let operand = self.expr(operand, UNARY);
                join_sign(op.as_str(), &operand)
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                let level = BINARY + op.precedence();
                let lhs = self.expr(lhs, level);
                let rhs = self.expr(rhs, level + 1);
                format!("{lhs}{sp}{}", join_sign(&format!("{}{sp}", op.as_str()), &rhs))
            }
            Expr::Assign {
                op, target, value, ..
            } => {
                let target = self.expr(target, POSTFIX);
                let value = self.expr(value, ASSIGN);
                format!("{target}{sp}{}{sp}{value}", op.as_str())
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
                ..
            } => {
                let cond = self.expr(cond, CONDITIONAL + 1);
                let then = self.expr(then, ASSIGN);
                let otherwise = self.expr(otherwise, CONDITIONAL);
                format!("{cond}{sp}?{sp}{then}{sp}:{sp}{otherwise}")
            }
            Expr::Function(func) => self.function(func),
            Expr::Await { operand, .. } => {
                let operand = self.expr(operand, UNARY);
                format!("await {operand}")
            }
        }
    }

    fn list(&mut self, items: &[Expr]) -> String {
        let items: Vec<String> = items.iter().map(|item| self.expr(item, ASSIGN)).collect();
        items.join(&format!(",{}", self.sp()))
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Int { value, .. } if *value < 0 => UNARY,
        Expr::Float { value, .. } if value.0 < 0.0 => UNARY,
        Expr::Assign { .. } => ASSIGN,
        Expr::Function(func) if func.is_arrow => ASSIGN,
        Expr::Conditional { .. } => CONDITIONAL,
        Expr::Binary { op, .. } => BINARY + op.precedence(),
        Expr::Unary { .. } | Expr::Await { .. } => UNARY,
        Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. } | Expr::New { .. } => POSTFIX,
        _ => PRIMARY,
    }
}

/// Whether an expression statement would start with `function` and be read
/// as a declaration.
fn starts_with_function(expr: &Expr) -> bool {
    match expr {
        Expr::Function(func) => !func.is_arrow,
        Expr::Call { callee: inner, .. }
        | Expr::Member { object: inner, .. }
        | Expr::Index { object: inner, .. }
        | Expr::Binary { lhs: inner, .. }
        | Expr::Assign { target: inner, .. }
        | Expr::Conditional { cond: inner, .. } => {
            precedence(inner) >= precedence(expr) && starts_with_function(inner)
        }
        _ => false,
    }
}

/// Append an operand to an operator, keeping `- -x` and `+ +x` apart.
fn join_sign(op: &str, operand: &str) -> String {
    let clash = match (op.chars().last(), operand.chars().next()) {
        (Some('-'), Some('-')) | (Some('+'), Some('+')) => true,
        _ => false,
    };
    if clash {
        format!("{op} {operand}")
    } else {
        format!("{op}{operand}")
    }
}

fn number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        value.to_string()
    }
}

/// A double-quoted string literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{2028}' || c == '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Source text of an enum member value.
fn literal(value: &Value) -> String {
    match value.peel() {
        Value::LiteralInt(value) => value.to_string(),
        Value::LiteralString(value) => quote(value),
        Value::LiteralBool(value) => value.to_string(),
        _ => "undefined".to_string(),
    }
}
