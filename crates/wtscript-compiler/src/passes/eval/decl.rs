//! Classes, interfaces and enums.
//!
//! Declarations are filled in two steps. While hoisting, `declare_*` turns
//! the declaration into registry members and constructor overloads. Once the
//! statement itself is reached, `check_*` validates inheritance, abstract
//! obligations, overrides, conformance and universality, then evaluates the
//! bodies.

use rustc_hash::FxHashSet;
use wtscript_core::{CompilationError, CompileResult, Span, TypeHash, primitives};
use wtscript_registry::{EnumMemberEntry, Instance, MemberEntry, MemberKind, Overload, Signature, TypeEntry, Value};
use wtscript_syntax::{
    ClassDecl, ClassMember, ClassMemberKind, EnumDecl, InterfaceDecl, MemberModifiers, TypeExpr,
};

use super::TypeEvaluator;
use super::stmt::FunctionRole;

/// Names every enum provides itself.
const RESERVED_ENUM_MEMBERS: &[&str] = &["values", "value", "keys", "key"];

impl TypeEvaluator<'_> {
    // ==========================================================================
    // Classes
    // ==========================================================================

    pub(super) fn declare_class(&mut self, class: &ClassDecl) -> CompileResult<()> {
        let hash = self.type_hash(&class.name)?;

        let parent = match &class.parent {
            Some(ty) => {
                let parent = self.named_type(ty)?;
                match self.ctx.registry.get(parent) {
                    Some(TypeEntry::Class(entry)) if entry.is_final => {
                        return Err(CompilationError::semantic(
                            format!("can't extend final class {}", entry.name),
                            ty.span(),
                        ));
                    }
                    Some(TypeEntry::Class(_)) => Some(parent),
                    _ => {
                        return Err(CompilationError::semantic(
                            format!("{} is not a class", self.ctx.registry.type_name(parent)),
                            ty.span(),
                        ));
                    }
                }
            }
            None => None,
        };

        let mut interfaces: Vec<(TypeHash, Span)> = Vec::new();
        for ty in &class.implements {
            let interface = self.interface_type(ty)?;
            if let Some((_, previous)) = interfaces.iter().find(|(h, _)| *h == interface) {
                return Err(CompilationError::semantic(
                    format!("{} implemented twice", self.ctx.registry.type_name(interface)),
                    ty.span(),
                )
                .with_note("first implemented here", *previous));
            }
            interfaces.push((interface, ty.span()));
        }

        let mut members: Vec<MemberEntry> = Vec::new();
        for member in &class.members {
            let entry = self.member_entry(member)?;
            let clash = members.iter().find(|m| {
                m.name == entry.name
                    && m.is_static == entry.is_static
                    && !accessor_pair(m.kind, entry.kind)
            });
            if let Some(previous) = clash {
                return Err(CompilationError::duplicate(&entry.name, entry.span, previous.span));
            }
            members.push(entry);
        }

        let constructors = match &class.constructor {
            Some(ctor) => Some(
                Overload::with_optional(self.param_values(ctor)?, ctor.required_params(), None)
                    .into_iter()
                    .map(|overload| overload.params)
                    .collect(),
            ),
            None => None,
        };

        if let Some(entry) = self.ctx.registry.class_mut(hash) {
            entry.parent = parent;
            entry.interfaces = interfaces;
            entry.members = members;
            entry.constructors = constructors;
        }
        Ok(())
    }

    /// Attach the constructible value once every class of the block is declared.
    pub(super) fn declare_class_value(&mut self, class: &ClassDecl) -> CompileResult<()> {
        let hash = self.type_hash(&class.name)?;
        let value = Value::class(hash, self.ctx.registry.constructors(hash));
        if let Some(var) = class.name.binding() {
            self.set_value(var, value);
        }
        Ok(())
    }

    fn member_entry(&self, member: &ClassMember) -> CompileResult<MemberEntry> {
        let modifiers = member.modifiers;
        let mut entry = match &member.kind {
            ClassMemberKind::Method(func) if modifiers.contains(MemberModifiers::GETTER) => {
                let ret = self.return_value(func.ret.as_ref())?;
                MemberEntry::getter(&member.name, ret.unwrap_or(Value::Any))
            }
            ClassMemberKind::Method(func) if modifiers.contains(MemberModifiers::SETTER) => {
                let [param] = self.param_values(func)?.try_into().map_err(|_| {
                    CompilationError::semantic(
                        format!("setter '{}' must take exactly one parameter", member.name),
                        member.span,
                    )
                })?;
                MemberEntry::setter(&member.name, param)
            }
            ClassMemberKind::Method(func) => MemberEntry::method(&member.name, self.function_value(func)?),
            ClassMemberKind::Property { ty, init } => {
                let mut entry = MemberEntry::property(&member.name, self.optional_type_value(ty.as_ref())?);
                entry.has_init = init.is_some();
                entry
            }
        };
        entry.is_static = modifiers.contains(MemberModifiers::STATIC);
        entry.is_abstract = modifiers.contains(MemberModifiers::ABSTRACT);
        entry.is_private = modifiers.contains(MemberModifiers::PRIVATE);
        entry.is_override = modifiers.contains(MemberModifiers::OVERRIDE);
        entry.is_const = modifiers.contains(MemberModifiers::CONST);
        entry.span = member.span;
        Ok(entry)
    }

    pub(super) fn check_class(&mut self, class: &ClassDecl) -> CompileResult<()> {
        let hash = self.type_hash(&class.name)?;
        tracing::trace!(class = %class.name.name, "checking class");
        self.classes.push(hash);
        let result = self.check_class_body(class, hash);
        self.classes.pop();
        result
    }

    fn check_class_body(&mut self, class: &ClassDecl, hash: TypeHash) -> CompileResult<()> {
        self.check_inheritance(class, hash)?;
        self.eval_properties(class, hash)?;
        self.check_abstract(hash)?;
        self.check_overrides(hash)?;
        self.check_implements(hash)?;
        self.check_universal(hash)?;

        match &class.constructor {
            Some(ctor) => self.eval_function(ctor, FunctionRole::Constructor(hash))?,
            None => self.check_initialized(hash, &FxHashSet::default())?,
        }
        for member in &class.members {
            if let ClassMemberKind::Method(func) = &member.kind
                && !member.is_abstract()
            {
                let role = if member.is_static() {
                    FunctionRole::Plain
                } else {
                    FunctionRole::Method
                };
                self.eval_function(func, role)?;
            }
        }
        Ok(())
    }

    fn check_inheritance(&self, class: &ClassDecl, hash: TypeHash) -> CompileResult<()> {
        let registry = &self.ctx.registry;
        let Some(parent) = registry.class(hash).and_then(|entry| entry.parent) else {
            return Ok(());
        };
        if parent == hash || registry.parent_chain(parent).contains(&hash) {
            let span = class.parent.as_ref().map_or(class.name.span, |ty| ty.span());
            return Err(CompilationError::semantic(
                format!("class {} inherits from itself", class.name.name),
                span,
            ));
        }
        Ok(())
    }

    /// Evaluate property initializers. Unannotated properties take the
    /// widened value of their initializer.
    fn eval_properties(&mut self, class: &ClassDecl, hash: TypeHash) -> CompileResult<()> {
        for member in &class.members {
            let ClassMemberKind::Property { ty, init: Some(init) } = &member.kind else {
                continue;
            };
            let have = self.eval_expr(init)?;
            match ty {
                Some(ty) => {
                    let want = self.type_value(ty)?;
                    self.ctx.registry.check(&want, &have, init.span())?;
                }
                None => {
                    let is_static = member.is_static();
                    if let Some(entry) = self.ctx.registry.class_mut(hash)
                        && let Some(property) = entry
                            .members
                            .iter_mut()
                            .find(|m| m.name == member.name && m.is_static == is_static)
                    {
                        property.value = have.widen();
                    }
                }
            }
        }
        Ok(())
    }

    /// Abstract members must be implemented by a concrete subclass with a
    /// conforming member. A class with outstanding obligations must be
    /// abstract, and an abstract class must have some.
    fn check_abstract(&self, hash: TypeHash) -> CompileResult<()> {
        let registry = &self.ctx.registry;
        let Some(entry) = registry.class(hash) else {
            return Ok(());
        };
        if !entry.is_abstract
            && let Some(member) = entry.abstract_members().next()
        {
            return Err(CompilationError::abstractness(
                format!("abstract member '{}' in non-abstract class {}", member.name, entry.name),
                member.span,
            ));
        }

        let mut lineage = registry.parent_chain(hash);
        lineage.reverse();
        lineage.push(hash);

        let mut outstanding: Vec<&MemberEntry> = Vec::new();
        for current in lineage {
            let Some(class) = registry.class(current) else {
                continue;
            };
            for member in class.members.iter().filter(|m| !m.is_static) {
                let pending = outstanding.iter().position(|o| o.name == member.name);
                match (member.is_abstract, pending) {
                    (true, Some(_)) if current == hash => {
                        return Err(CompilationError::abstractness(
                            format!("redefinition of abstract member '{}'", member.name),
                            member.span,
                        ));
                    }
                    (true, Some(_)) => {}
                    (true, None) => outstanding.push(member),
                    (false, Some(index)) => {
                        registry.check(&outstanding[index].value, &member.value, member.span).map_err(
                            |err| {
                                CompilationError::abstractness(
                                    format!(
                                        "'{}' doesn't implement the abstract member of {}",
                                        member.name,
                                        class.name
                                    ),
                                    member.span,
                                )
                                .merge(err)
                            },
                        )?;
                        outstanding.remove(index);
                    }
                    (false, None) => {}
                }
            }
        }

        match outstanding.first() {
            Some(missing) if !entry.is_abstract => Err(CompilationError::abstractness(
                format!("class {} doesn't implement '{}'", entry.name, missing.name),
                entry.span,
            )
            .with_note("declared abstract here", missing.span)),
            None if entry.is_abstract => Err(CompilationError::abstractness(
                format!("abstract class {} has no abstract members", entry.name),
                entry.span,
            )),
            _ => Ok(()),
        }
    }

    fn check_overrides(&self, hash: TypeHash) -> CompileResult<()> {
        let registry = &self.ctx.registry;
        let Some(entry) = registry.class(hash) else {
            return Ok(());
        };
        for member in entry.members.iter().filter(|m| m.is_override && !m.is_static) {
            let inherited = entry
                .parent
                .and_then(|parent| registry.any_member(&Instance::new(parent), &member.name))
                .ok_or_else(|| {
                    CompilationError::semantic(
                        format!("'{}' overrides nothing", member.name),
                        member.span,
                    )
                })?;
            registry
                .check(&inherited.value, &member.value, member.span)
                .map_err(|err| {
                    CompilationError::mismatch(
                        format!("'{}' doesn't match the member it overrides", member.name),
                        member.span,
                    )
                    .merge(err)
                })?;
        }
        Ok(())
    }

    fn check_implements(&mut self, hash: TypeHash) -> CompileResult<()> {
        let Some(entry) = self.ctx.registry.class(hash) else {
            return Ok(());
        };
        let universal = entry.is_universal();
        let declared = entry.interfaces.clone();
        let registry = &self.ctx.registry;
        for (interface, span) in declared {
            registry.check_interface(interface, hash, span)?;
        }

        // implementing an interface implements its ancestors too
        let implemented = registry.class_interfaces(hash);
        let mut targets = Vec::new();
        for (interface, span) in implemented {
            if !registry.interface(interface).is_some_and(|i| i.is_universal) {
                continue;
            }
            if !universal {
                return Err(CompilationError::semantic(
                    format!(
                        "universal interface {} can only be implemented by universal classes",
                        registry.type_name(interface)
                    ),
                    span,
                ));
            }
            targets.push(interface);
        }
        for interface in targets {
            self.ctx.registry.register_implementation(interface, hash);
        }
        Ok(())
    }

    /// Every property of a universal class, inherited ones included, must
    /// hold plain data.
    fn check_universal(&self, hash: TypeHash) -> CompileResult<()> {
        let registry = &self.ctx.registry;
        let Some(entry) = registry.class(hash).filter(|entry| entry.is_universal()) else {
            return Ok(());
        };
        if let Some(parent) = entry.parent
            && !registry.class(parent).is_some_and(|p| p.is_universal())
        {
            return Err(CompilationError::semantic(
                format!(
                    "parent of universal class {} must be universal",
                    entry.name
                ),
                entry.span,
            ));
        }
        for class in std::iter::once(hash)
            .chain(registry.parent_chain(hash))
            .filter_map(|h| registry.class(h))
        {
            for property in class.properties() {
                if !registry.is_universal(&property.value) {
                    return Err(CompilationError::semantic(
                        format!(
                            "property '{}' of universal class {} isn't universal ({})",
                            property.name,
                            entry.name,
                            registry.describe(&property.value)
                        ),
                        property.span,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Own properties without an initializer must be assigned by the constructor.
    pub(super) fn check_initialized(&self, hash: TypeHash, touched: &FxHashSet<String>) -> CompileResult<()> {
        let Some(entry) = self.ctx.registry.class(hash) else {
            return Ok(());
        };
        match entry
            .properties()
            .find(|p| !p.has_init && !touched.contains(&p.name))
        {
            Some(property) => Err(CompilationError::semantic(
                format!("this.{} not initialized", property.name),
                property.span,
            )),
            None => Ok(()),
        }
    }

    // ==========================================================================
    // Interfaces
    // ==========================================================================

    fn interface_type(&self, ty: &TypeExpr) -> CompileResult<TypeHash> {
        let hash = self.named_type(ty)?;
        if self.ctx.registry.interface(hash).is_none() {
            return Err(CompilationError::semantic(
                format!("{} is not an interface", self.ctx.registry.type_name(hash)),
                ty.span(),
            ));
        }
        Ok(hash)
    }

    pub(super) fn declare_interface(&mut self, interface: &InterfaceDecl) -> CompileResult<()> {
        let hash = self.type_hash(&interface.name)?;

        let mut parents: Vec<(TypeHash, Span)> = Vec::new();
        for ty in &interface.parents {
            let parent = self.interface_type(ty)?;
            if parents.iter().any(|(h, _)| *h == parent) {
                return Err(CompilationError::semantic(
                    format!("{} extended twice", self.ctx.registry.type_name(parent)),
                    ty.span(),
                ));
            }
            parents.push((parent, ty.span()));
        }

        let mut members: Vec<Signature> = Vec::new();
        for member in &interface.members {
            let signature = if member.modifiers.contains(MemberModifiers::GETTER) {
                let ret = self.return_value(member.ret.as_ref())?;
                Signature::getter(&member.name, ret.unwrap_or(Value::Any))
            } else if member.modifiers.contains(MemberModifiers::SETTER) {
                let param = match member.params.as_slice() {
                    [param] => self.type_value(param)?,
                    _ => {
                        return Err(CompilationError::semantic(
                            format!("setter '{}' must take exactly one parameter", member.name),
                            member.span,
                        ));
                    }
                };
                Signature::setter(&member.name, param)
            } else {
                let params = member
                    .params
                    .iter()
                    .map(|param| self.type_value(param))
                    .collect::<CompileResult<Vec<_>>>()?;
                Signature::method(&member.name, params, self.return_value(member.ret.as_ref())?)
            };
            let signature = signature.with_span(member.span);

            if let Some(previous) = members
                .iter()
                .find(|m| m.name == signature.name && m.kind == signature.kind)
            {
                return Err(CompilationError::duplicate(&signature.name, signature.span, previous.span));
            }
            members.push(signature);
        }

        if let Some(entry) = self.ctx.registry.interface_mut(hash) {
            entry.parents = parents;
            entry.members = members;
        }
        Ok(())
    }

    pub(super) fn check_interface_decl(&self, interface: &InterfaceDecl) -> CompileResult<()> {
        let hash = self.type_hash(&interface.name)?;
        let registry = &self.ctx.registry;
        let Some(entry) = registry.interface(hash) else {
            return Ok(());
        };

        let ancestors = registry.interface_ancestors(hash);
        for member in &entry.members {
            for &ancestor in &ancestors {
                if let Some(inherited) = registry.interface(ancestor).and_then(|a| a.find_member(&member.name)) {
                    return Err(CompilationError::semantic(
                        format!(
                            "'{}' already defined in parent interface {}",
                            member.name,
                            registry.type_name(ancestor)
                        ),
                        member.span,
                    )
                    .with_note("defined here", inherited.span));
                }
            }
        }

        if entry.is_rpc {
            for (parent, span) in &entry.parents {
                if !registry.interface(*parent).is_some_and(|p| p.is_rpc) {
                    return Err(CompilationError::semantic(
                        format!("rpc interface {} can only extend rpc interfaces", entry.name),
                        *span,
                    ));
                }
            }
            for member in &entry.members {
                let returns_promise = member
                    .ret
                    .as_ref()
                    .and_then(Value::interface)
                    .is_some_and(|ret| ret == primitives::PROMISE);
                if !returns_promise {
                    return Err(CompilationError::semantic(
                        format!("rpc member '{}' must return a Promise", member.name),
                        member.span,
                    ));
                }
            }
        }
        Ok(())
    }

    // ==========================================================================
    // Enums
    // ==========================================================================

    /// Enum members are evaluated while hoisting, so other declarations can
    /// refer to them in any order.
    pub(super) fn declare_enum(&mut self, decl: &EnumDecl) -> CompileResult<()> {
        let hash = self.type_hash(&decl.name)?;
        let parent = self.named_type(&decl.parent)?;
        if parent != primitives::INT && parent != primitives::STRING {
            return Err(CompilationError::semantic(
                format!("enum {} must extend Int or String", decl.name.name),
                decl.parent.span(),
            ));
        }
        let backing = Value::instance(parent);

        let mut members: Vec<EnumMemberEntry> = Vec::new();
        let mut next = 0i64;
        for member in &decl.members {
            if RESERVED_ENUM_MEMBERS.contains(&member.name.as_str()) {
                return Err(CompilationError::semantic(
                    format!("enum member name '{}' is reserved", member.name),
                    member.span,
                ));
            }
            if let Some(previous) = members.iter().find(|m| m.name == member.name) {
                return Err(CompilationError::duplicate(&member.name, member.span, previous.span));
            }
            let value = match &member.value {
                Some(expr) => {
                    let value = self.eval_expr(expr)?;
                    self.ctx.registry.check(&backing, &value, expr.span())?;
                    value.peel().clone()
                }
                None if parent == primitives::INT => Value::LiteralInt(next),
                None => Value::literal_string(&member.name),
            };
            if let Value::LiteralInt(n) = value {
                next = n.wrapping_add(1);
            }
            members.push(EnumMemberEntry {
                name: member.name.clone(),
                value,
                span: member.span,
            });
        }

        if let Some(entry) = self.ctx.registry.enumeration_mut(hash) {
            entry.parent = parent;
            entry.members = members;
        }
        if let Some(var) = decl.name.binding() {
            self.set_value(var, Value::Enum(hash));
        }
        Ok(())
    }
}

/// A getter and a setter may share a name.
fn accessor_pair(a: MemberKind, b: MemberKind) -> bool {
    matches!(
        (a, b),
        (MemberKind::Getter, MemberKind::Setter) | (MemberKind::Setter, MemberKind::Getter)
    )
}
