//! Two-pass symbolic assembler for Hack assembly text.
//!
//! Pass one binds every `(LABEL)` to the ROM address of the instruction that
//! follows it. Pass two encodes instructions, resolving `@symbol` against the
//! predefined symbols, the labels, and finally variables allocated from
//! RAM 16 upward in order of first use.

use std::collections::HashMap;

use crate::instructions::{is_symbol, Instr, Operand};
use crate::isa::hack::encode;
use crate::memory::{ARG, KBD, LCL, SCREEN, SP, STATIC_BASE, THAT, THIS};

pub const ROM_WORDS: usize = 0x8000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct AsmError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
enum Item {
    Label(String),
    Instr(Instr),
}

#[derive(Debug, Clone, Default)]
pub struct Assembled {
    pub words: Vec<u16>,
    pub symbols: HashMap<String, u16>,
}

impl Assembled {
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }
}

pub fn predefined_symbols() -> HashMap<String, u16> {
    let mut map: HashMap<String, u16> = [
        ("SP", SP),
        ("LCL", LCL),
        ("ARG", ARG),
        ("THIS", THIS),
        ("THAT", THAT),
        ("SCREEN", SCREEN),
        ("KBD", KBD),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    for r in 0..16u16 {
        map.insert(format!("R{r}"), r);
    }
    map
}

fn parse_line(line: &str, number: usize) -> Result<Option<Item>, AsmError> {
    let s = line.split("//").next().unwrap_or("").trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Some(inner) = s.strip_prefix('(') {
        let name = inner
            .strip_suffix(')')
            .map(str::trim)
            .filter(|n| is_symbol(n))
            .ok_or_else(|| AsmError { line: number, message: format!("bad label: {s}") })?;
        return Ok(Some(Item::Label(name.to_string())));
    }
    s.parse::<Instr>()
        .map(|i| Some(Item::Instr(i)))
        .map_err(|e| AsmError { line: number, message: e.to_string() })
}

/// Assemble a full program.
pub fn assemble(source: &str) -> Result<Assembled, AsmError> {
    assemble_lines(source.lines())
}

pub fn assemble_lines<I, S>(lines: I) -> Result<Assembled, AsmError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut items = Vec::new();
    for (i, line) in lines.into_iter().enumerate() {
        if let Some(item) = parse_line(line.as_ref(), i + 1)? {
            items.push((i + 1, item));
        }
    }

    // Pass 1: labels
    let mut symbols = predefined_symbols();
    let mut pc = 0usize;
    for (number, item) in &items {
        match item {
            Item::Label(name) => {
                if symbols.insert(name.clone(), pc as u16).is_some() {
                    return Err(AsmError { line: *number, message: format!("duplicate symbol: {name}") });
                }
            }
            Item::Instr(_) => pc += 1,
        }
    }
    if pc > ROM_WORDS {
        return Err(AsmError { line: 0, message: format!("program has {pc} words, ROM holds {ROM_WORDS}") });
    }

    // Pass 2: encode
    let mut next_var = STATIC_BASE;
    let mut words = Vec::with_capacity(pc);
    for (number, item) in &items {
        let Item::Instr(instr) = item else { continue };
        let resolved = match instr {
            Instr::At(Operand::Symbol(name)) => {
                let addr = match symbols.get(name) {
                    Some(a) => *a,
                    None => {
                        let a = next_var;
                        symbols.insert(name.clone(), a);
                        next_var += 1;
                        a
                    }
                };
                Instr::at_value(addr)
            }
            other => other.clone(),
        };
        let word = encode(&resolved)
            .ok_or_else(|| AsmError { line: *number, message: format!("cannot encode {resolved}") })?;
        words.push(word);
    }
    Ok(Assembled { words, symbols })
}
