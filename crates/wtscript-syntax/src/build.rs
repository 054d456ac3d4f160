//! Programmatic construction of syntax trees.
//!
//! Front ends that generate code, and the test suites, build trees through
//! these helpers instead of spelling out every node. Nodes get default spans
//! unless an identifier is given with a position as `("name", line, col)`.
//!
//! ```
//! use wtscript_syntax::build::{expr, func, stmt, ty};
//!
//! let body = vec![
//!     func::function("add")
//!         .param("a", ty::named("Int"))
//!         .param("b", ty::named("Int"))
//!         .returns(ty::named("Int"))
//!         .body(vec![stmt::ret(Some(expr::add(expr::var("a"), expr::var("b"))))])
//!         .stmt(),
//!     stmt::expr(expr::call(expr::var("add"), vec![expr::int(1), expr::int(2)])),
//! ];
//! assert_eq!(body.len(), 2);
//! ```

pub mod ty {
    use crate::{Ident, TypeExpr};
    use wtscript_core::Span;

    pub fn named(name: impl Into<Ident>) -> TypeExpr {
        let name = name.into();
        TypeExpr::Named {
            span: name.span,
            name,
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<Ident>, args: Vec<TypeExpr>) -> TypeExpr {
        let name = name.into();
        TypeExpr::Named {
            span: name.span,
            name,
            args,
        }
    }

    pub fn array(item: TypeExpr) -> TypeExpr {
        generic("Array", vec![item])
    }

    pub fn promise(item: TypeExpr) -> TypeExpr {
        generic("Promise", vec![item])
    }

    pub fn tuple(items: Vec<TypeExpr>) -> TypeExpr {
        TypeExpr::Tuple {
            items,
            span: Span::default(),
        }
    }

    pub fn function(params: Vec<TypeExpr>, ret: Option<TypeExpr>) -> TypeExpr {
        TypeExpr::Function {
            params,
            ret: ret.map(Box::new),
            span: Span::default(),
        }
    }

    pub fn any() -> TypeExpr {
        named("any")
    }
}

pub mod expr {
    use ordered_float::OrderedFloat;
    use wtscript_core::Span;

    use crate::{AssignOp, BinaryOp, Expr, Function, Ident, UnaryOp};

    pub fn int(value: i64) -> Expr {
        Expr::Int {
            value,
            span: Span::default(),
        }
    }

    pub fn float(value: f64) -> Expr {
        Expr::Float {
            value: OrderedFloat(value),
            span: Span::default(),
        }
    }

    pub fn string(value: &str) -> Expr {
        Expr::Str {
            value: value.to_string(),
            span: Span::default(),
        }
    }

    pub fn boolean(value: bool) -> Expr {
        Expr::Bool {
            value,
            span: Span::default(),
        }
    }

    pub fn null() -> Expr {
        Expr::Null {
            span: Span::default(),
        }
    }

    pub fn var(name: impl Into<Ident>) -> Expr {
        Expr::Ident(name.into())
    }

    pub fn this() -> Expr {
        Expr::This(Ident::from("this"))
    }

    pub fn super_() -> Expr {
        Expr::Super(Ident::from("super"))
    }

    pub fn array(items: Vec<Expr>) -> Expr {
        Expr::Array {
            items,
            span: Span::default(),
        }
    }

    pub fn member(object: Expr, property: &str) -> Expr {
        let span = object.span();
        Expr::Member {
            object: Box::new(object),
            property: property.to_string(),
            property_span: span,
            span,
        }
    }

    /// `this.property`
    pub fn this_member(property: &str) -> Expr {
        member(this(), property)
    }

    pub fn index(object: Expr, index: Expr) -> Expr {
        let span = object.span();
        Expr::Index {
            object: Box::new(object),
            index: Box::new(index),
            span,
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
        let span = callee.span();
        Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        }
    }

    /// `object.method(args)`
    pub fn method_call(object: Expr, method: &str, args: Vec<Expr>) -> Expr {
        call(member(object, method), args)
    }

    pub fn new(class: Expr, args: Vec<Expr>) -> Expr {
        let span = class.span();
        Expr::New {
            class: Box::new(class),
            args,
            span,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        let span = operand.span();
        Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let span = lhs.span();
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        }
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Expr {
        binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn assign(target: Expr, value: Expr) -> Expr {
        assign_op(AssignOp::Assign, target, value)
    }

    pub fn assign_op(op: AssignOp, target: Expr, value: Expr) -> Expr {
        let span = target.span();
        Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
            span,
        }
    }

    pub fn conditional(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        let span = cond.span();
        Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
            span,
        }
    }

    pub fn function(func: Function) -> Expr {
        Expr::Function(Box::new(func))
    }

    pub fn await_(operand: Expr) -> Expr {
        let span = operand.span();
        Expr::Await {
            operand: Box::new(operand),
            span,
        }
    }
}

pub mod func {
    use wtscript_core::Span;

    use crate::{Expr, Function, Ident, Param, Stmt, TypeExpr};

    /// Builder for functions, methods and constructors.
    #[derive(Debug, Clone)]
    pub struct FunctionBuilder {
        func: Function,
    }

    /// A named function declaration.
    pub fn function(name: impl Into<Ident>) -> FunctionBuilder {
        let name = name.into();
        let span = name.span;
        FunctionBuilder {
            func: Function {
                name: Some(name),
                params: Vec::new(),
                ret: None,
                body: Vec::new(),
                is_async: false,
                is_arrow: false,
                span,
            },
        }
    }

    /// An anonymous function, also used for methods and constructors.
    pub fn anonymous() -> FunctionBuilder {
        FunctionBuilder {
            func: Function {
                name: None,
                params: Vec::new(),
                ret: None,
                body: Vec::new(),
                is_async: false,
                is_arrow: false,
                span: Span::default(),
            },
        }
    }

    pub fn arrow() -> FunctionBuilder {
        let mut builder = anonymous();
        builder.func.is_arrow = true;
        builder
    }

    impl FunctionBuilder {
        pub fn param(mut self, name: impl Into<Ident>, ty: TypeExpr) -> Self {
            self.func.params.push(Param {
                name: name.into(),
                ty: Some(ty),
                default: None,
            });
            self
        }

        /// A parameter without a type annotation.
        pub fn untyped_param(mut self, name: impl Into<Ident>) -> Self {
            self.func.params.push(Param {
                name: name.into(),
                ty: None,
                default: None,
            });
            self
        }

        pub fn param_default(mut self, name: impl Into<Ident>, ty: TypeExpr, default: Expr) -> Self {
            self.func.params.push(Param {
                name: name.into(),
                ty: Some(ty),
                default: Some(default),
            });
            self
        }

        pub fn returns(mut self, ty: TypeExpr) -> Self {
            self.func.ret = Some(ty);
            self
        }

        pub fn body(mut self, body: Vec<Stmt>) -> Self {
            self.func.body = body;
            self
        }

        pub fn async_(mut self) -> Self {
            self.func.is_async = true;
            self
        }

        pub fn at(mut self, line: u32, col: u32) -> Self {
            self.func.span = Span::new(line, col, 0);
            self
        }

        pub fn build(self) -> Function {
            self.func
        }

        pub fn stmt(self) -> Stmt {
            Stmt::Function(self.func)
        }

        pub fn expr(self) -> Expr {
            Expr::Function(Box::new(self.func))
        }
    }
}

pub mod class {
    use wtscript_core::Span;

    use crate::{
        ClassDecl, ClassMember, ClassMemberKind, ClassModifiers, Expr, Function, Ident,
        MemberModifiers, Stmt, TypeExpr,
    };

    #[derive(Debug, Clone)]
    pub struct ClassBuilder {
        decl: ClassDecl,
    }

    pub fn class(name: impl Into<Ident>) -> ClassBuilder {
        let name = name.into();
        let span = name.span;
        ClassBuilder {
            decl: ClassDecl {
                name,
                parent: None,
                implements: Vec::new(),
                modifiers: ClassModifiers::empty(),
                universal_name: None,
                constructor: None,
                members: Vec::new(),
                span,
            },
        }
    }

    impl ClassBuilder {
        pub fn extends(mut self, parent: TypeExpr) -> Self {
            self.decl.parent = Some(parent);
            self
        }

        pub fn implements(mut self, interface: TypeExpr) -> Self {
            self.decl.implements.push(interface);
            self
        }

        pub fn as_abstract(mut self) -> Self {
            self.decl.modifiers |= ClassModifiers::ABSTRACT;
            self
        }

        pub fn as_final(mut self) -> Self {
            self.decl.modifiers |= ClassModifiers::FINAL;
            self
        }

        pub fn universal(mut self, name: &str) -> Self {
            self.decl.universal_name = Some(name.to_string());
            self
        }

        pub fn constructor(mut self, ctor: Function) -> Self {
            self.decl.constructor = Some(ctor);
            self
        }

        pub fn property(self, name: &str, ty: TypeExpr, init: Option<Expr>) -> Self {
            self.member(
                name,
                MemberModifiers::empty(),
                ClassMemberKind::Property { ty: Some(ty), init },
            )
        }

        pub fn static_property(self, name: &str, ty: TypeExpr, init: Expr) -> Self {
            self.member(
                name,
                MemberModifiers::STATIC,
                ClassMemberKind::Property {
                    ty: Some(ty),
                    init: Some(init),
                },
            )
        }

        pub fn method(self, name: &str, func: Function) -> Self {
            self.member(name, MemberModifiers::empty(), ClassMemberKind::Method(func))
        }

        pub fn method_with(self, name: &str, modifiers: MemberModifiers, func: Function) -> Self {
            self.member(name, modifiers, ClassMemberKind::Method(func))
        }

        /// A method without a body that subclasses must implement.
        pub fn abstract_method(self, name: &str, params: Vec<TypeExpr>, ret: Option<TypeExpr>) -> Self {
            let mut builder = super::func::anonymous();
            for (i, param) in params.into_iter().enumerate() {
                builder = builder.param(format!("p{i}").as_str(), param);
            }
            if let Some(ret) = ret {
                builder = builder.returns(ret);
            }
            self.member(
                name,
                MemberModifiers::ABSTRACT,
                ClassMemberKind::Method(builder.build()),
            )
        }

        pub fn getter(self, name: &str, ret: TypeExpr, body: Vec<Stmt>) -> Self {
            let func = super::func::anonymous().returns(ret).body(body).build();
            self.member(name, MemberModifiers::GETTER, ClassMemberKind::Method(func))
        }

        pub fn setter(self, name: &str, param: TypeExpr, body: Vec<Stmt>) -> Self {
            let func = super::func::anonymous().param("value", param).body(body).build();
            self.member(name, MemberModifiers::SETTER, ClassMemberKind::Method(func))
        }

        pub fn member(mut self, name: &str, modifiers: MemberModifiers, kind: ClassMemberKind) -> Self {
            self.decl.members.push(ClassMember {
                name: name.to_string(),
                modifiers,
                kind,
                span: Span::default(),
            });
            self
        }

        pub fn build(self) -> ClassDecl {
            self.decl
        }

        pub fn stmt(self) -> Stmt {
            Stmt::Class(self.decl)
        }
    }
}

pub mod interface {
    use wtscript_core::Span;

    use crate::{Ident, InterfaceDecl, InterfaceMember, InterfaceModifiers, MemberModifiers, Stmt, TypeExpr};

    #[derive(Debug, Clone)]
    pub struct InterfaceBuilder {
        decl: InterfaceDecl,
    }

    pub fn interface(name: impl Into<Ident>) -> InterfaceBuilder {
        let name = name.into();
        let span = name.span;
        InterfaceBuilder {
            decl: InterfaceDecl {
                name,
                parents: Vec::new(),
                modifiers: InterfaceModifiers::empty(),
                members: Vec::new(),
                span,
            },
        }
    }

    impl InterfaceBuilder {
        pub fn extends(mut self, parent: TypeExpr) -> Self {
            self.decl.parents.push(parent);
            self
        }

        pub fn universal(mut self) -> Self {
            self.decl.modifiers |= InterfaceModifiers::UNIVERSAL;
            self
        }

        pub fn rpc(mut self) -> Self {
            self.decl.modifiers |= InterfaceModifiers::RPC;
            self
        }

        pub fn method(self, name: &str, params: Vec<TypeExpr>, ret: Option<TypeExpr>) -> Self {
            self.member(name, MemberModifiers::empty(), params, ret)
        }

        pub fn getter(self, name: &str, ret: TypeExpr) -> Self {
            self.member(name, MemberModifiers::GETTER, Vec::new(), Some(ret))
        }

        pub fn setter(self, name: &str, param: TypeExpr) -> Self {
            self.member(name, MemberModifiers::SETTER, vec![param], None)
        }

        fn member(
            mut self,
            name: &str,
            modifiers: MemberModifiers,
            params: Vec<TypeExpr>,
            ret: Option<TypeExpr>,
        ) -> Self {
            self.decl.members.push(InterfaceMember {
                name: name.to_string(),
                modifiers,
                params,
                ret,
                span: Span::default(),
            });
            self
        }

        pub fn build(self) -> InterfaceDecl {
            self.decl
        }

        pub fn stmt(self) -> Stmt {
            Stmt::Interface(self.decl)
        }
    }
}

pub mod enumeration {
    use wtscript_core::Span;

    use crate::{EnumDecl, EnumMember, Expr, Ident, Stmt, TypeExpr};

    #[derive(Debug, Clone)]
    pub struct EnumBuilder {
        decl: EnumDecl,
    }

    pub fn enumeration(name: impl Into<Ident>, parent: TypeExpr) -> EnumBuilder {
        let name = name.into();
        let span = name.span;
        EnumBuilder {
            decl: EnumDecl {
                name,
                parent,
                members: Vec::new(),
                span,
            },
        }
    }

    impl EnumBuilder {
        pub fn member(mut self, name: &str, value: Option<Expr>) -> Self {
            self.decl.members.push(EnumMember {
                name: name.to_string(),
                value,
                span: Span::default(),
            });
            self
        }

        pub fn build(self) -> EnumDecl {
            self.decl
        }

        pub fn stmt(self) -> Stmt {
            Stmt::Enum(self.decl)
        }
    }
}

pub mod stmt {
    use wtscript_core::{Lang, Span};

    use crate::{
        AggregateName, Case, Catch, Declarator, ExportDecl, ExportName, Expr, Ident, IfBranch,
        ImportDecl, ImportName, Stmt, TypeExpr, VarDecl, VarKind,
    };

    pub fn decl(kind: VarKind, name: impl Into<Ident>, ty: Option<TypeExpr>, init: Option<Expr>) -> Stmt {
        let name = name.into();
        let span = name.span;
        Stmt::Var(VarDecl {
            kind,
            decls: vec![Declarator { name, ty, init }],
            span,
        })
    }

    pub fn let_(name: impl Into<Ident>, ty: Option<TypeExpr>, init: Option<Expr>) -> Stmt {
        decl(VarKind::Let, name, ty, init)
    }

    pub fn const_(name: impl Into<Ident>, ty: Option<TypeExpr>, init: Expr) -> Stmt {
        decl(VarKind::Const, name, ty, Some(init))
    }

    pub fn var(name: impl Into<Ident>, ty: Option<TypeExpr>, init: Option<Expr>) -> Stmt {
        decl(VarKind::Var, name, ty, init)
    }

    pub fn expr(expr: Expr) -> Stmt {
        Stmt::Expr(expr)
    }

    pub fn ret(value: Option<Expr>) -> Stmt {
        Stmt::Return {
            value,
            span: Span::default(),
        }
    }

    pub fn if_(cond: Expr, body: Vec<Stmt>) -> Stmt {
        if_else(vec![(cond, body)], None)
    }

    pub fn if_else(branches: Vec<(Expr, Vec<Stmt>)>, otherwise: Option<Vec<Stmt>>) -> Stmt {
        Stmt::If {
            branches: branches
                .into_iter()
                .map(|(cond, body)| IfBranch { cond, body })
                .collect(),
            otherwise,
            span: Span::default(),
        }
    }

    pub fn while_(cond: Expr, body: Vec<Stmt>) -> Stmt {
        Stmt::While {
            cond,
            body,
            span: Span::default(),
        }
    }

    pub fn for_(init: Option<Stmt>, cond: Option<Expr>, step: Option<Expr>, body: Vec<Stmt>) -> Stmt {
        Stmt::For {
            init: init.map(Box::new),
            cond,
            step,
            body,
            span: Span::default(),
        }
    }

    pub fn switch(subject: Expr, cases: Vec<(Option<Expr>, Vec<Stmt>)>) -> Stmt {
        Stmt::Switch {
            subject,
            cases: cases
                .into_iter()
                .map(|(test, body)| Case {
                    test,
                    body,
                    span: Span::default(),
                })
                .collect(),
            span: Span::default(),
        }
    }

    pub fn block(body: Vec<Stmt>) -> Stmt {
        Stmt::Block {
            body,
            span: Span::default(),
        }
    }

    pub fn break_() -> Stmt {
        Stmt::Break {
            span: Span::default(),
        }
    }

    pub fn continue_() -> Stmt {
        Stmt::Continue {
            span: Span::default(),
        }
    }

    pub fn throw(value: Expr) -> Stmt {
        Stmt::Throw {
            value,
            span: Span::default(),
        }
    }

    pub fn try_(body: Vec<Stmt>, catch: Option<(Option<Ident>, Vec<Stmt>)>, finally: Option<Vec<Stmt>>) -> Stmt {
        Stmt::Try {
            body,
            catch: catch.map(|(param, body)| Catch { param, body }),
            finally,
            span: Span::default(),
        }
    }

    /// `import {a, b as c} from source`, given `(imported, local)` pairs.
    pub fn import(names: &[(&str, &str)], source: &str) -> Stmt {
        Stmt::Import(ImportDecl {
            source: source.to_string(),
            source_span: Span::default(),
            lang: Lang::from_path(source).unwrap_or(Lang::Script),
            names: names
                .iter()
                .map(|(imported, local)| ImportName {
                    imported: imported.to_string(),
                    local: Ident::from(*local),
                })
                .collect(),
            span: Span::default(),
        })
    }

    /// `import {a, b} from source`
    pub fn import_names(names: &[&str], source: &str) -> Stmt {
        let pairs: Vec<(&str, &str)> = names.iter().map(|n| (*n, *n)).collect();
        import(&pairs, source)
    }

    pub fn export(stmt: Stmt) -> Stmt {
        let span = stmt.span();
        Stmt::Export(ExportDecl::Declaration {
            stmt: Box::new(stmt),
            span,
        })
    }

    /// `export {a, b as c}`, given `(local, exported)` pairs.
    pub fn export_names(names: &[(&str, &str)]) -> Stmt {
        Stmt::Export(ExportDecl::Names {
            names: names
                .iter()
                .map(|(local, exported)| ExportName {
                    local: Ident::from(*local),
                    exported: exported.to_string(),
                })
                .collect(),
            span: Span::default(),
        })
    }

    /// `export {a as b} from source`, given `(imported, exported)` pairs.
    pub fn export_from(names: &[(&str, &str)], source: &str) -> Stmt {
        Stmt::Export(ExportDecl::Aggregate {
            source: source.to_string(),
            source_span: Span::default(),
            names: Some(
                names
                    .iter()
                    .map(|(imported, exported)| AggregateName {
                        imported: imported.to_string(),
                        exported: exported.to_string(),
                        span: Span::default(),
                    })
                    .collect(),
            ),
            span: Span::default(),
        })
    }

    /// `export * from source`
    pub fn export_all(source: &str) -> Stmt {
        Stmt::Export(ExportDecl::Aggregate {
            source: source.to_string(),
            source_span: Span::default(),
            names: None,
            span: Span::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtscript_core::Span;
    use crate::{ClassMemberKind, Expr, Stmt, TypeExpr};

    #[test]
    fn class_builder_collects_members() {
        let decl = class::class("Point")
            .property("x", ty::named("Int"), None)
            .abstract_method("area", vec![], Some(ty::named("Number")))
            .as_abstract()
            .build();

        assert!(decl.is_abstract());
        assert_eq!(decl.members.len(), 2);
        assert!(decl.members[1].is_abstract());
        assert!(matches!(decl.members[0].kind, ClassMemberKind::Property { .. }));
    }

    #[test]
    fn positioned_names_carry_spans() {
        let s = stmt::let_(("x", 3, 5), None, Some(expr::int(1)));
        assert_eq!(s.span(), Span::new(3, 5, 1));
    }

    #[test]
    fn generic_types() {
        let t = ty::array(ty::named("Int"));
        match t {
            TypeExpr::Named { name, args, .. } => {
                assert_eq!(name.name, "Array");
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn import_builder() {
        match stmt::import(&[("a", "b")], "./lib") {
            Stmt::Import(import) => {
                assert_eq!(import.source, "./lib");
                assert_eq!(import.names[0].imported, "a");
                assert_eq!(import.names[0].local.name, "b");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn method_call_shape() {
        let call = expr::method_call(expr::var("xs"), "push", vec![expr::int(1)]);
        assert!(matches!(call, Expr::Call { ref callee, .. } if matches!(**callee, Expr::Member { .. })));
    }
}
