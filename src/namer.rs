//! Assembly names for statics, user labels and generated return points.
//!
//! Statics live in `{module}.{index}`, user labels in
//! `{module}.{function}${label}`, and call return points in
//! `{caller}$ret.{n}` with `n` taken from a program-wide counter.

use std::collections::BTreeMap;

use crate::assembler::predefined_symbols;
use crate::error::SourcePos;
use crate::program::HALT_LABEL;

/// Caller name used for the return point of the bootstrap call.
pub const BOOTSTRAP_CALLER: &str = "Bootstrap";

/// Per-module naming state.
#[derive(Debug, Clone, Default)]
pub struct TranslationContext {
    pub module: String,
    /// Function currently being emitted into; empty before the first
    /// `function` command of the module.
    pub current_function: String,
    /// Current 1-based source line, for diagnostics.
    pub line: usize,
    scope: LabelScope,
}

/// Label declarations and uses inside one function body.
#[derive(Debug, Clone, Default)]
pub struct LabelScope {
    /// Label name to the line declaring it.
    pub declared: BTreeMap<String, usize>,
    /// Label name to the first line referencing it.
    pub referenced: BTreeMap<String, usize>,
}

impl LabelScope {
    /// Referenced labels with no declaration, with the line of first use.
    pub fn undeclared(&self) -> impl Iterator<Item = (&str, usize)> {
        self.referenced
            .iter()
            .filter(|(name, _)| !self.declared.contains_key(*name))
            .map(|(name, line)| (name.as_str(), *line))
    }
}

impl TranslationContext {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    pub fn pos(&self) -> SourcePos {
        SourcePos { module: self.module.clone(), line: self.line }
    }

    pub fn static_symbol(&self, index: u16) -> String {
        format!("{}.{}", self.module, index)
    }

    pub fn label_symbol(&self, label: &str) -> String {
        format!("{}.{}${}", self.module, self.current_function, label)
    }

    /// Human-readable name of the current label scope.
    pub fn scope_name(&self) -> String {
        if self.current_function.is_empty() {
            format!("{} (top level)", self.module)
        } else {
            format!("{}.{}", self.module, self.current_function)
        }
    }

    /// Caller component of return-point labels.
    pub fn caller(&self) -> &str {
        if self.current_function.is_empty() {
            &self.module
        } else {
            &self.current_function
        }
    }

    /// Record a `label` declaration. Returns the line of an earlier
    /// declaration of the same name in this scope, if any.
    pub fn declare_label(&mut self, label: &str) -> Option<usize> {
        match self.scope.declared.get(label) {
            Some(first) => Some(*first),
            None => {
                self.scope.declared.insert(label.to_string(), self.line);
                None
            }
        }
    }

    pub fn reference_label(&mut self, label: &str) {
        self.scope
            .referenced
            .entry(label.to_string())
            .or_insert(self.line);
    }

    /// Enter a new function; returns the label scope of the one just left.
    pub fn enter_function(&mut self, name: &str) -> LabelScope {
        self.current_function = name.to_string();
        std::mem::take(&mut self.scope)
    }

    /// Close the module; returns the last open label scope.
    pub fn close(&mut self) -> LabelScope {
        std::mem::take(&mut self.scope)
    }
}

pub fn return_symbol(caller: &str, n: usize) -> String {
    format!("{caller}$ret.{n}")
}

/// Why `name` cannot be a function entry label, if it cannot. Function
/// labels are emitted unqualified, so they must stay out of the predefined
/// symbols, the halt label, the `$` forms of user and return labels, and
/// the `Module.index` form of statics.
pub fn reserved_function_name(name: &str) -> Option<&'static str> {
    if predefined_symbols().contains_key(name) {
        return Some("is a predefined Hack symbol");
    }
    if name == HALT_LABEL {
        return Some("is the halt label");
    }
    if name.contains('$') {
        return Some("contains `$`, which is reserved for generated labels");
    }
    match name.rsplit_once('.') {
        Some((_, index)) if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => {
            Some("has the `Module.index` form of a static variable")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statics_are_module_scoped() {
        let a = TranslationContext::new("Foo");
        let b = TranslationContext::new("Bar");
        assert_eq!(a.static_symbol(3), "Foo.3");
        assert_ne!(a.static_symbol(3), b.static_symbol(3));
    }

    #[test]
    fn labels_are_function_scoped() {
        let mut ctx = TranslationContext::new("Main");
        assert_eq!(ctx.label_symbol("LOOP"), "Main.$LOOP");
        ctx.enter_function("Main.f");
        let f = ctx.label_symbol("LOOP");
        ctx.enter_function("Main.g");
        let g = ctx.label_symbol("LOOP");
        assert_eq!(f, "Main.Main.f$LOOP");
        assert_ne!(f, g);
    }

    #[test]
    fn scope_tracks_undeclared_references() {
        let mut ctx = TranslationContext::new("Main");
        ctx.enter_function("Main.f");
        ctx.line = 3;
        ctx.reference_label("END");
        ctx.line = 4;
        ctx.reference_label("MISSING");
        ctx.line = 5;
        assert_eq!(ctx.declare_label("END"), None);
        ctx.line = 6;
        assert_eq!(ctx.declare_label("END"), Some(5));
        let scope = ctx.enter_function("Main.g");
        assert_eq!(scope.undeclared().collect::<Vec<_>>(), vec![("MISSING", 4)]);
        assert!(ctx.close().undeclared().next().is_none());
    }

    #[test]
    fn reserved_function_names() {
        for name in ["SP", "THAT", "R0", "R13", "R15", "SCREEN", "KBD", "__HALT__", "Main.f$x", "Main.0", "Foo.17"] {
            assert!(reserved_function_name(name).is_some(), "{name}");
        }
        for name in ["Main.main", "Sys.init", "R16", "Main.f2", "Main.0x", "sp"] {
            assert_eq!(reserved_function_name(name), None, "{name}");
        }
    }

    #[test]
    fn return_points() {
        assert_eq!(return_symbol("Main.f", 7), "Main.f$ret.7");
        let ctx = TranslationContext::new("Main");
        assert_eq!(ctx.caller(), "Main");
    }
}
