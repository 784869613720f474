//! The output program: every emitted line in final order, plus the address
//! of the next real instruction.

use std::fmt;

use crate::assembler::ROM_WORDS;
use crate::error::{TranslateError, TranslateResult};
use crate::instructions::{Comp, Instr, Jump};

/// Label of the terminal self-loop.
pub const HALT_LABEL: &str = "__HALT__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    Instr(Instr),
    /// `(NAME)`; occupies no instruction word.
    Label(String),
    /// Copied verbatim, including any `//`.
    Comment(String),
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmLine::Instr(i) => write!(f, "  {i}"),
            AsmLine::Label(l) => write!(f, "({l})"),
            AsmLine::Comment(c) => f.write_str(c),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgramImage {
    lines: Vec<AsmLine>,
    next_address: usize,
    calls: usize,
}

impl ProgramImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the next emitted instruction will occupy.
    pub fn next_address(&self) -> usize {
        self.next_address
    }

    pub fn lines(&self) -> &[AsmLine] {
        &self.lines
    }

    pub fn emit(&mut self, instr: Instr) {
        self.lines.push(AsmLine::Instr(instr));
        self.next_address += 1;
    }

    pub fn label(&mut self, name: impl Into<String>) {
        self.lines.push(AsmLine::Label(name.into()));
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.lines.push(AsmLine::Comment(text.into()));
    }

    /// Next value of the program-wide call-site counter.
    pub fn next_call_id(&mut self) -> usize {
        let n = self.calls;
        self.calls += 1;
        n
    }

    /// Absolute address `offset` words past `base`, as an `@value` operand.
    pub fn address(&self, base: usize, offset: usize) -> TranslateResult<u16> {
        let addr = base + offset;
        if addr >= ROM_WORDS {
            return Err(TranslateError::ProgramTooLarge { words: addr + 1, limit: ROM_WORDS });
        }
        Ok(addr as u16)
    }

    /// Append the halt loop and hand back the finished text.
    pub fn finalize(mut self) -> TranslateResult<Vec<String>> {
        self.comment(format!("// [{}] halt", self.next_address));
        self.label(HALT_LABEL);
        self.emit(Instr::at(HALT_LABEL));
        self.emit(Instr::jump(Comp::Zero, Jump::all()));
        if self.next_address > ROM_WORDS {
            return Err(TranslateError::ProgramTooLarge { words: self.next_address, limit: ROM_WORDS });
        }
        Ok(self.lines.iter().map(ToString::to_string).collect())
    }
}
