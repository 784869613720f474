//! Driver-facing translation API.
//!
//! A [`Translator`] owns the single [`ProgramImage`] of a run. Modules are
//! fed through [`Translator::begin_module`], one source line at a time; each
//! module gets a fresh [`TranslationContext`], so statics and labels never
//! leak between modules while the address counter keeps running.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::codegen;
use crate::command::Command;
use crate::config::{Bootstrap, TranslatorConfig};
use crate::error::{SourcePos, TranslateError, TranslateResult};
use crate::instructions::MAX_CONSTANT;
use crate::namer::{reserved_function_name, LabelScope, TranslationContext};
use crate::parser::parse_line;
use crate::program::ProgramImage;

/// One source module: its name (file stem) and raw lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModule {
    pub name: String,
    pub lines: Vec<String>,
}

impl SourceModule {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Whether any line of this module is `function NAME ..`.
    pub fn declares_function(&self, name: &str) -> bool {
        self.lines.iter().any(|l| {
            matches!(parse_line(l), Ok(Command::Function { name: ref f, .. }) if f == name)
        })
    }
}

pub struct Translator {
    config: TranslatorConfig,
    image: ProgramImage,
    functions: HashMap<String, SourcePos>,
    bootstrapped: bool,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            config,
            image: ProgramImage::new(),
            functions: HashMap::new(),
            bootstrapped: false,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn image(&self) -> &ProgramImage {
        &self.image
    }

    /// Emit the stack setup and the call to the entry function. Only the
    /// first call has any effect.
    pub fn emit_bootstrap(&mut self) -> TranslateResult<()> {
        if self.bootstrapped {
            return Ok(());
        }
        if self.config.stack_base > MAX_CONSTANT {
            return Err(TranslateError::InvalidConfig(format!(
                "stack_base {} is above {MAX_CONSTANT}",
                self.config.stack_base
            )));
        }
        self.bootstrapped = true;
        debug!(entry = %self.config.entry_function, stack_base = self.config.stack_base, "bootstrap");
        if self.config.annotate {
            self.image.comment(format!(
                "// [{}] bootstrap: SP={}, call {} 0",
                self.image.next_address(),
                self.config.stack_base,
                self.config.entry_function
            ));
        }
        codegen::bootstrap(&mut self.image, self.config.stack_base, &self.config.entry_function);
        Ok(())
    }

    pub fn begin_module(&mut self, name: &str) -> ModuleTranslator<'_> {
        debug!(module = name, address = self.image.next_address(), "begin module");
        ModuleTranslator {
            ctx: TranslationContext::new(name),
            translator: self,
        }
    }

    /// Append the halt loop and return the finished program text.
    pub fn finish(self) -> TranslateResult<Vec<String>> {
        let words = self.image.next_address();
        let lines = self.image.finalize()?;
        debug!(words, lines = lines.len(), "program finalized");
        Ok(lines)
    }

    fn command(&mut self, ctx: &mut TranslationContext, cmd: &Command, text: &str) -> TranslateResult<()> {
        match cmd {
            Command::Comment => {
                if self.config.echo_comments {
                    self.image.comment(text.trim_end());
                }
                return Ok(());
            }
            Command::Label(label) => {
                if let Some(first) = ctx.declare_label(label) {
                    if self.config.strict_labels {
                        return Err(TranslateError::DuplicateLabel {
                            pos: ctx.pos(),
                            label: label.clone(),
                            scope: format!("{} (first declared on line {first})", ctx.scope_name()),
                        });
                    }
                    warn!(module = %ctx.module, line = ctx.line, label = %label, first, "label declared twice");
                }
            }
            Command::Goto(label) | Command::IfGoto(label) => ctx.reference_label(label),
            Command::Function { name, .. } => {
                if let Some(reason) = reserved_function_name(name) {
                    return Err(TranslateError::ReservedName { pos: ctx.pos(), name: name.clone(), reason });
                }
                if let Some(first) = self.functions.get(name) {
                    return Err(TranslateError::DuplicateFunction {
                        pos: ctx.pos(),
                        name: name.clone(),
                        first: first.clone(),
                    });
                }
                self.functions.insert(name.clone(), ctx.pos());
                let left = ctx.scope_name();
                let scope = ctx.enter_function(name);
                self.check_scope(&ctx.module, &left, &scope)?;
            }
            _ => {}
        }

        trace!(line = ctx.line, address = self.image.next_address(), command = %cmd);
        if self.config.annotate {
            self.image
                .comment(format!("// [{}] {}", self.image.next_address(), text.trim()));
        }
        codegen::generate(&mut self.image, ctx, cmd)
    }

    fn check_scope(&self, module: &str, scope_name: &str, scope: &LabelScope) -> TranslateResult<()> {
        if !self.config.strict_labels {
            for (label, line) in scope.undeclared() {
                warn!(module, line, label, scope = scope_name, "jump to undeclared label");
            }
            return Ok(());
        }
        match scope.undeclared().next() {
            Some((label, line)) => Err(TranslateError::UndeclaredLabel {
                pos: SourcePos { module: module.to_string(), line },
                label: label.to_string(),
                scope: scope_name.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Translation state for one open module.
pub struct ModuleTranslator<'a> {
    translator: &'a mut Translator,
    ctx: TranslationContext,
}

impl ModuleTranslator<'_> {
    pub fn context(&self) -> &TranslationContext {
        &self.ctx
    }

    /// Parse and translate the next source line.
    pub fn translate_line(&mut self, text: &str) -> TranslateResult<()> {
        self.ctx.line += 1;
        let cmd = parse_line(text).map_err(|source| TranslateError::Parse {
            pos: self.ctx.pos(),
            text: text.trim().to_string(),
            source,
        })?;
        self.translator.command(&mut self.ctx, &cmd, text)
    }

    /// Close the module, checking the labels of its last function.
    pub fn end(mut self) -> TranslateResult<()> {
        let left = self.ctx.scope_name();
        let scope = self.ctx.close();
        self.translator.check_scope(&self.ctx.module, &left, &scope)?;
        debug!(module = %self.ctx.module, lines = self.ctx.line, "end module");
        Ok(())
    }
}

fn wants_bootstrap(modules: &[SourceModule], config: &TranslatorConfig) -> bool {
    match config.bootstrap {
        Bootstrap::Always => {
            if !modules.iter().any(|m| m.declares_function(&config.entry_function)) {
                warn!(entry = %config.entry_function, "bootstrap requested but entry function is never declared");
            }
            true
        }
        Bootstrap::Never => false,
        Bootstrap::Auto => modules.iter().any(|m| m.declares_function(&config.entry_function)),
    }
}

/// Translate every module in order into one program, stopping at the first
/// error.
pub fn translate(modules: &[SourceModule], config: &TranslatorConfig) -> TranslateResult<Vec<String>> {
    let mut translator = Translator::new(config.clone());
    if wants_bootstrap(modules, config) {
        translator.emit_bootstrap()?;
    }
    for module in modules {
        let mut m = translator.begin_module(&module.name);
        for line in &module.lines {
            m.translate_line(line)?;
        }
        m.end()?;
    }
    translator.finish()
}
