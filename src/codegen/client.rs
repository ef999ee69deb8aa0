//! Client module (`client.ts`).
//!
//! The client wraps an injected [`AbiCall`](CALL_TYPE) primitive and exposes
//! one async method per manifest method. Two binding styles exist, each a
//! [`ClientEmitter`]:
//!
//! - [`PositionalClient`]: `makePerson(name, age, email)`, declarations pulled
//!   in with `import type { ... }`.
//! - [`NamespacedClient`]: `make_person(params: { name; age; email })`,
//!   declarations referenced through `import * as types`.
//!
//! Both forward arguments as an array in declared parameter order and always
//! call the remote side by its ABI name.

use std::collections::{BTreeSet, HashSet};

use crate::manifest::{Manifest, Method, TypeRef};

use super::code_writer::CodeWriter;
use super::ident::{method_ident, property_access, safe_ident, string_literal};
use super::render::{nullable, render_member, render_type, RenderContext};
use super::types::declare_types;
use super::{
    error_type_name, write_header, ClientStyle, Declarations, GenerateError, CLIENT_FILE,
    TYPES_MODULE,
};

/// Name of the injected transport primitive type.
pub const CALL_TYPE: &str = "AbiCall";

/// Namespace alias used by [`NamespacedClient`].
pub const TYPES_NAMESPACE: &str = "types";

/// Module-level declarations every client carries besides the class.
const SUPPORT_DECLARATIONS: &[&str] = &[
    "AbiCallFailure",
    "AbiCallResult",
    CALL_TYPE,
    "AbiMethodError",
    "methodError",
];

/// Names a method body reads besides its own parameters.
const BODY_NAMES: &[&str] = &["response", "methodError", "Error"];

/// Identifier for a positional parameter. Names the method body relies on get
/// a `_` suffix so a parameter can never shadow them.
fn param_ident(name: &str) -> String {
    let mut ident = safe_ident(name);
    if BODY_NAMES.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Fail if two parameters of `method` end up with the same name.
fn check_unique_params<'a>(
    method: &Method,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), GenerateError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(GenerateError::DuplicateParameter {
                method: method.name().to_string(),
                param: name.to_string(),
            });
        }
    }
    Ok(())
}

/// A method signature as emitted by a binding style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Parameter list, without the surrounding parentheses.
    pub params: String,
    /// Argument expressions forwarded to the call primitive, in declared order.
    pub args: Vec<String>,
}

/// One client binding style.
pub trait ClientEmitter {
    /// Import / re-export lines at the top of the module.
    fn imports(&self, manifest: &Manifest) -> Result<Vec<String>, GenerateError>;

    /// Scope used to render types inside the client module.
    fn render_context<'a>(&self, manifest: &'a Manifest) -> RenderContext<'a>;

    /// Generated identifier for a method. The wire name is never derived from it.
    fn binding_name(&self, method: &Method) -> String;

    /// Module-level names introduced by [`imports`](Self::imports), other
    /// than the re-exported declarations.
    fn imported_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn signature(
        &self,
        method: &Method,
        cx: &RenderContext<'_>,
    ) -> Result<Signature, GenerateError>;
}

/// `makePerson(name: string, age: number, email: string | null)`
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalClient;

impl ClientEmitter for PositionalClient {
    fn imports(&self, manifest: &Manifest) -> Result<Vec<String>, GenerateError> {
        let mut names = BTreeSet::new();
        for method in manifest.methods() {
            for param in method.params() {
                collect_named(param.ty(), &mut names);
            }
            if let Some(returns) = method.value_return() {
                collect_named(returns, &mut names);
            }
            if !method.errors().is_empty() {
                names.insert(error_type_name(method));
            }
        }

        let mut lines = vec![format!("export * from {};", string_literal(TYPES_MODULE))];
        if !names.is_empty() {
            let names = names.into_iter().collect::<Vec<_>>().join(", ");
            lines.push(format!(
                "import type {{ {names} }} from {};",
                string_literal(TYPES_MODULE)
            ));
        }
        Ok(lines)
    }

    fn render_context<'a>(&self, manifest: &'a Manifest) -> RenderContext<'a> {
        RenderContext::new(manifest)
    }

    fn binding_name(&self, method: &Method) -> String {
        method_ident(method.name())
    }

    fn signature(
        &self,
        method: &Method,
        cx: &RenderContext<'_>,
    ) -> Result<Signature, GenerateError> {
        let mut params = Vec::with_capacity(method.params().len());
        let mut args = Vec::with_capacity(method.params().len());
        for param in method.params() {
            let ident = param_ident(param.name());
            params.push(format!(
                "{ident}: {}",
                nullable(render_type(param.ty(), cx)?, param.nullable())
            ));
            args.push(ident);
        }
        check_unique_params(method, args.iter().map(String::as_str))?;
        Ok(Signature {
            params: params.join(", "),
            args,
        })
    }
}

/// `make_person(params: { name: string; age: number; email: string | null })`
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespacedClient;

impl ClientEmitter for NamespacedClient {
    fn imports(&self, _manifest: &Manifest) -> Result<Vec<String>, GenerateError> {
        let module = string_literal(TYPES_MODULE);
        Ok(vec![
            format!("import * as {TYPES_NAMESPACE} from {module};"),
            format!("export * from {module};"),
        ])
    }

    fn render_context<'a>(&self, manifest: &'a Manifest) -> RenderContext<'a> {
        RenderContext::new(manifest).with_namespace(TYPES_NAMESPACE)
    }

    fn binding_name(&self, method: &Method) -> String {
        safe_ident(method.name())
    }

    fn imported_names(&self) -> &'static [&'static str] {
        &[TYPES_NAMESPACE]
    }

    fn signature(
        &self,
        method: &Method,
        cx: &RenderContext<'_>,
    ) -> Result<Signature, GenerateError> {
        if method.params().is_empty() {
            return Ok(Signature {
                params: String::new(),
                args: Vec::new(),
            });
        }
        check_unique_params(method, method.params().iter().map(|param| param.name()))?;

        let members = method
            .params()
            .iter()
            .map(|param| render_member(param, cx))
            .collect::<Result<Vec<_>, _>>()?;
        let args = method
            .params()
            .iter()
            .map(|param| property_access("params", param.name()))
            .collect();
        Ok(Signature {
            params: format!("params: {{ {} }}", members.join("; ")),
            args,
        })
    }
}

impl ClientStyle {
    pub fn emitter(self) -> &'static dyn ClientEmitter {
        match self {
            ClientStyle::Positional => &PositionalClient,
            ClientStyle::Namespaced => &NamespacedClient,
        }
    }
}

fn collect_named(ty: &TypeRef, names: &mut BTreeSet<String>) {
    let visited: Result<(), std::convert::Infallible> = ty.visit("", &mut |node, _| {
        if let TypeRef::Named(name) = node {
            names.insert(safe_ident(name));
        }
        Ok(())
    });
    if let Err(never) = visited {
        match never {}
    }
}

/// Emit the client module using the given binding style.
pub fn emit_client(
    manifest: &Manifest,
    client_name: &str,
    style: ClientStyle,
) -> Result<String, GenerateError> {
    emit_client_with(style.emitter(), manifest, client_name)
}

/// Emit the client module using any [`ClientEmitter`].
pub fn emit_client_with(
    emitter: &dyn ClientEmitter,
    manifest: &Manifest,
    client_name: &str,
) -> Result<String, GenerateError> {
    let cx = emitter.render_context(manifest);

    // Everything from the type module is re-exported, so it shares this scope.
    let mut names = Declarations::new(CLIENT_FILE);
    declare_types(&mut names, manifest)?;
    for name in emitter.imported_names() {
        names.declare(*name, "the type module import")?;
    }
    for name in SUPPORT_DECLARATIONS {
        names.declare(*name, "client support code")?;
    }
    names.declare("Error", "the global Error used by client methods")?;
    names.declare(safe_ident(client_name), "the client class")?;

    let mut seen = HashSet::new();
    for method in manifest.methods() {
        let binding = emitter.binding_name(method);
        if !seen.insert(binding.clone()) {
            return Err(GenerateError::DuplicateBinding {
                binding,
                method: method.name().to_string(),
            });
        }
    }

    let mut w = CodeWriter::with_indent_spaces(String::new(), 2);
    write_header(&mut w, manifest)?;
    w.blank_line()?;
    for line in emitter.imports(manifest)? {
        w.writeln(&line)?;
    }

    w.blank_line()?;
    write_transport_types(&mut w)?;
    if manifest.methods().iter().any(|m| !m.errors().is_empty()) {
        w.blank_line()?;
        write_method_error_helper(&mut w)?;
    }

    w.blank_line()?;
    w.writeln(&format!("export class {} {{", safe_ident(client_name)))?;
    {
        let _indent = w.indent();
        w.writeln(&format!("readonly #call: {CALL_TYPE};"))?;
        w.blank_line()?;
        w.block(&format!("constructor(call: {CALL_TYPE})"), |w| {
            w.writeln("this.#call = call;")
        })?;

        for method in manifest.methods() {
            w.blank_line()?;
            emit_method(&mut w, emitter, &cx, method)?;
        }
    }
    w.writeln("}")?;

    tracing::debug!(
        methods = manifest.methods().len(),
        client = client_name,
        "emitted client"
    );
    Ok(w.into_inner())
}

fn emit_method(
    w: &mut CodeWriter<String>,
    emitter: &dyn ClientEmitter,
    cx: &RenderContext<'_>,
    method: &Method,
) -> Result<(), GenerateError> {
    let wire_name = string_literal(method.name());
    let signature = emitter.signature(method, cx)?;

    let value_type = match method.value_return() {
        Some(returns) => Some(nullable(
            render_type(returns, cx)?,
            method.returns_nullable(),
        )),
        None => None,
    };
    let promise = value_type.as_deref().unwrap_or("void");

    w.doc_comment(&method_docs(method, cx)?)?;
    w.writeln(&format!(
        "async {}({}): Promise<{promise}> {{",
        emitter.binding_name(method),
        signature.params
    ))?;
    {
        let _indent = w.indent();
        w.writeln(&format!(
            "const response = await this.#call({wire_name}, [{}]);",
            signature.args.join(", ")
        ))?;
        w.writeln("if (!response.ok) {")?;
        {
            let _indent = w.indent();
            if method.errors().is_empty() {
                w.writeln("throw new Error(response.error.message);")?;
            } else {
                w.writeln(&format!(
                    "throw methodError<{}>({wire_name}, response.error);",
                    cx.qualify(&error_type_name(method))
                ))?;
            }
        }
        w.writeln("}")?;
        match (&value_type, method.returns_nullable()) {
            (Some(ty), true) => w.writeln(&format!("return (response.value ?? null) as {ty};"))?,
            (Some(ty), false) => w.writeln(&format!("return response.value as {ty};"))?,
            (None, _) => {}
        }
    }
    w.writeln("}")?;
    Ok(())
}

/// Doc comment lines for a method: a summary plus one `@throws` per error code.
fn method_docs(method: &Method, cx: &RenderContext<'_>) -> Result<Vec<String>, GenerateError> {
    let mut lines = vec![
        format!("Calls the `{}` ABI method.", method.name()),
        String::new(),
    ];
    if method.errors().is_empty() {
        lines.push("@throws {Error} when the call fails; no error codes are declared.".to_string());
    }
    for case in method.errors() {
        match case.payload() {
            Some(payload) => lines.push(format!(
                "@throws {{AbiMethodError}} `{}` with payload `{}`",
                case.code(),
                render_type(payload, cx)?
            )),
            None => lines.push(format!("@throws {{AbiMethodError}} `{}`", case.code())),
        }
    }
    Ok(lines)
}

fn write_transport_types(w: &mut CodeWriter<String>) -> Result<(), GenerateError> {
    w.writeln("/** A failed call as reported by the transport. */")?;
    w.block("export interface AbiCallFailure", |w| {
        w.writeln("code?: string;")?;
        w.writeln("message: string;")?;
        w.writeln("payload?: unknown;")
    })?;
    w.blank_line()?;
    w.writeln("export type AbiCallResult =")?;
    {
        let _indent = w.indent();
        w.writeln("| { ok: true; value: unknown }")?;
        w.writeln("| { ok: false; error: AbiCallFailure };")?;
    }
    w.blank_line()?;
    w.writeln("/** Transport primitive: invoke `method` with positional `args`. */")?;
    w.writeln(&format!(
        "export type {CALL_TYPE} = (method: string, args: unknown[]) => Promise<AbiCallResult>;"
    ))?;
    w.blank_line()?;
    w.writeln("/** Thrown when a method fails with one of its declared error codes. */")?;
    w.block(
        "export class AbiMethodError<E extends { code: string }> extends Error",
        |w| {
            w.writeln("readonly method: string;")?;
            w.writeln("readonly error: E;")?;
            w.blank_line()?;
            w.block(
                "constructor(method: string, error: E, message: string)",
                |w| {
                    w.writeln("super(message);")?;
                    w.writeln("this.name = \"AbiMethodError\";")?;
                    w.writeln("this.method = method;")?;
                    w.writeln("this.error = error;")
                },
            )
        },
    )?;
    Ok(())
}

fn write_method_error_helper(w: &mut CodeWriter<String>) -> Result<(), GenerateError> {
    w.block(
        "function methodError<E extends { code: string }>(method: string, failure: AbiCallFailure): AbiMethodError<E>",
        |w| {
            w.writeln("const error = (failure.payload === undefined")?;
            {
                let _indent = w.indent();
                w.writeln("? { code: failure.code }")?;
                w.writeln(": { code: failure.code, payload: failure.payload }) as unknown as E;")?;
            }
            w.writeln("return new AbiMethodError<E>(method, error, failure.message);")
        },
    )?;
    Ok(())
}
