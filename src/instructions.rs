//! Hack instruction set: the `comp`/`dest`/`jump` fields and the typed
//! [`Instr`] shared by the code generator, the assembler and the emulator.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Largest value an `@value` instruction can load.
pub const MAX_CONSTANT: u16 = 0x7FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comp {
    Zero,
    One,
    NegOne,
    D,
    A,
    NotD,
    NotA,
    NegD,
    NegA,
    DPlusOne,
    APlusOne,
    DMinusOne,
    AMinusOne,
    DPlusA,
    DMinusA,
    AMinusD,
    DAndA,
    DOrA,
    M,
    NotM,
    NegM,
    MPlusOne,
    MMinusOne,
    DPlusM,
    DMinusM,
    MMinusD,
    DAndM,
    DOrM,
}

#[derive(Debug, Clone, Copy)]
pub struct CompDesc {
    pub comp: Comp,
    pub mnemonic: &'static str,
    /// `a c1 c2 c3 c4 c5 c6`, low seven bits.
    pub bits: u8,
}

pub const TABLE: &[CompDesc] = &[
    CompDesc { comp: Comp::Zero, mnemonic: "0", bits: 0b0101010 },
    CompDesc { comp: Comp::One, mnemonic: "1", bits: 0b0111111 },
    CompDesc { comp: Comp::NegOne, mnemonic: "-1", bits: 0b0111010 },
    CompDesc { comp: Comp::D, mnemonic: "D", bits: 0b0001100 },
    CompDesc { comp: Comp::A, mnemonic: "A", bits: 0b0110000 },
    CompDesc { comp: Comp::NotD, mnemonic: "!D", bits: 0b0001101 },
    CompDesc { comp: Comp::NotA, mnemonic: "!A", bits: 0b0110001 },
    CompDesc { comp: Comp::NegD, mnemonic: "-D", bits: 0b0001111 },
    CompDesc { comp: Comp::NegA, mnemonic: "-A", bits: 0b0110011 },
    CompDesc { comp: Comp::DPlusOne, mnemonic: "D+1", bits: 0b0011111 },
    CompDesc { comp: Comp::APlusOne, mnemonic: "A+1", bits: 0b0110111 },
    CompDesc { comp: Comp::DMinusOne, mnemonic: "D-1", bits: 0b0001110 },
    CompDesc { comp: Comp::AMinusOne, mnemonic: "A-1", bits: 0b0110010 },
    CompDesc { comp: Comp::DPlusA, mnemonic: "D+A", bits: 0b0000010 },
    CompDesc { comp: Comp::DMinusA, mnemonic: "D-A", bits: 0b0010011 },
    CompDesc { comp: Comp::AMinusD, mnemonic: "A-D", bits: 0b0000111 },
    CompDesc { comp: Comp::DAndA, mnemonic: "D&A", bits: 0b0000000 },
    CompDesc { comp: Comp::DOrA, mnemonic: "D|A", bits: 0b0010101 },
    CompDesc { comp: Comp::M, mnemonic: "M", bits: 0b1110000 },
    CompDesc { comp: Comp::NotM, mnemonic: "!M", bits: 0b1110001 },
    CompDesc { comp: Comp::NegM, mnemonic: "-M", bits: 0b1110011 },
    CompDesc { comp: Comp::MPlusOne, mnemonic: "M+1", bits: 0b1110111 },
    CompDesc { comp: Comp::MMinusOne, mnemonic: "M-1", bits: 0b1110010 },
    CompDesc { comp: Comp::DPlusM, mnemonic: "D+M", bits: 0b1000010 },
    CompDesc { comp: Comp::DMinusM, mnemonic: "D-M", bits: 0b1010011 },
    CompDesc { comp: Comp::MMinusD, mnemonic: "M-D", bits: 0b1000111 },
    CompDesc { comp: Comp::DAndM, mnemonic: "D&M", bits: 0b1000000 },
    CompDesc { comp: Comp::DOrM, mnemonic: "D|M", bits: 0b1010101 },
];

// Commutative spellings accepted on input; output always uses TABLE.
const ALIASES: &[(&str, Comp)] = &[
    ("1+D", Comp::DPlusOne),
    ("1+A", Comp::APlusOne),
    ("1+M", Comp::MPlusOne),
    ("A+D", Comp::DPlusA),
    ("M+D", Comp::DPlusM),
    ("A&D", Comp::DAndA),
    ("M&D", Comp::DAndM),
    ("A|D", Comp::DOrA),
    ("M|D", Comp::DOrM),
];

impl Comp {
    fn desc(self) -> &'static CompDesc {
        // TABLE lists every variant exactly once, in declaration order.
        &TABLE[self as usize]
    }

    pub fn mnemonic(self) -> &'static str {
        self.desc().mnemonic
    }

    pub fn bits(self) -> u8 {
        self.desc().bits
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        TABLE.iter().find(|d| d.bits == bits).map(|d| d.comp)
    }

    /// Whether evaluating this computation reads `RAM[A]`.
    pub fn reads_memory(self) -> bool {
        self.bits() & 0b100_0000 != 0
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        TABLE
            .iter()
            .find(|d| d.mnemonic == s)
            .map(|d| d.comp)
            .or_else(|| ALIASES.iter().find(|(m, _)| *m == s).map(|(_, c)| *c))
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dest: u8 {
const A = 0b100;
const D = 0b010;
const M = 0b001;
}
}

impl Dest {
    pub fn parse(s: &str) -> Option<Self> {
        let mut dest = Dest::empty();
        for c in s.chars() {
            let bit = match c {
                'A' => Dest::A,
                'D' => Dest::D,
                'M' => Dest::M,
                _ => return None,
            };
            if dest.contains(bit) {
                return None;
            }
            dest |= bit;
        }
        Some(dest)
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (bit, c) in [(Dest::A, 'A'), (Dest::M, 'M'), (Dest::D, 'D')] {
            if self.contains(bit) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jump: u8 {
const LT = 0b100;
const EQ = 0b010;
const GT = 0b001;
}
}

const JUMPS: &[(&str, u8)] = &[
    ("JGT", 0b001),
    ("JEQ", 0b010),
    ("JGE", 0b011),
    ("JLT", 0b100),
    ("JNE", 0b101),
    ("JLE", 0b110),
    ("JMP", 0b111),
];

impl Jump {
    pub fn mnemonic(self) -> Option<&'static str> {
        JUMPS.iter().find(|(_, b)| *b == self.bits()).map(|(m, _)| *m)
    }

    pub fn parse(s: &str) -> Option<Self> {
        JUMPS
            .iter()
            .find(|(m, _)| *m == s)
            .map(|(_, b)| Jump::from_bits_truncate(*b))
    }

    /// Evaluate the condition against an ALU output.
    pub fn taken(self, out: u16) -> bool {
        let v = out as i16;
        (self.contains(Jump::LT) && v < 0)
            || (self.contains(Jump::EQ) && v == 0)
            || (self.contains(Jump::GT) && v > 0)
    }
}

/// Operand of an A-instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    Value(u16),
    Symbol(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instr {
    At(Operand),
    Compute { dest: Dest, comp: Comp, jump: Jump },
}

impl Instr {
    pub fn at(symbol: impl Into<String>) -> Self {
        Instr::At(Operand::Symbol(symbol.into()))
    }

    pub fn at_value(value: u16) -> Self {
        Instr::At(Operand::Value(value))
    }

    /// `dest=comp`
    pub fn set(dest: Dest, comp: Comp) -> Self {
        Instr::Compute { dest, comp, jump: Jump::empty() }
    }

    /// `comp;jump`
    pub fn jump(comp: Comp, jump: Jump) -> Self {
        Instr::Compute { dest: Dest::empty(), comp, jump }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::At(Operand::Value(v)) => write!(f, "@{v}"),
            Instr::At(Operand::Symbol(s)) => write!(f, "@{s}"),
            Instr::Compute { dest, comp, jump } => {
                if !dest.is_empty() {
                    write!(f, "{dest}=")?;
                }
                f.write_str(comp.mnemonic())?;
                if let Some(j) = jump.mnemonic() {
                    write!(f, ";{j}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstrParseError {
    #[error("empty instruction")]
    Empty,
    #[error("constant {0} does not fit in 15 bits")]
    ConstantTooLarge(String),
    #[error("bad symbol `{0}`")]
    BadSymbol(String),
    #[error("bad dest `{0}`")]
    BadDest(String),
    #[error("bad comp `{0}`")]
    BadComp(String),
    #[error("bad jump `{0}`")]
    BadJump(String),
}

/// Letters, digits, `_`, `.`, `$`, `:`; not starting with a digit.
pub fn is_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if !c.is_ascii_digit() && is_symbol_char(c) => chars.all(is_symbol_char),
        _ => false,
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':')
}

impl FromStr for Instr {
    type Err = InstrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InstrParseError::Empty);
        }
        if let Some(operand) = s.strip_prefix('@') {
            if operand.starts_with(|c: char| c.is_ascii_digit()) {
                return match operand.parse::<u16>() {
                    Ok(v) if v <= MAX_CONSTANT => Ok(Instr::at_value(v)),
                    _ => Err(InstrParseError::ConstantTooLarge(operand.to_string())),
                };
            }
            if !is_symbol(operand) {
                return Err(InstrParseError::BadSymbol(operand.to_string()));
            }
            return Ok(Instr::at(operand));
        }

        let (dest, rest) = match s.split_once('=') {
            Some((d, r)) => (
                Dest::parse(d.trim()).ok_or_else(|| InstrParseError::BadDest(d.to_string()))?,
                r,
            ),
            None => (Dest::empty(), s),
        };
        let (comp, jump) = match rest.split_once(';') {
            Some((c, j)) => (
                c,
                Jump::parse(j.trim()).ok_or_else(|| InstrParseError::BadJump(j.to_string()))?,
            ),
            None => (rest, Jump::empty()),
        };
        let comp_text: String = comp.chars().filter(|c| !c.is_whitespace()).collect();
        let comp = Comp::from_mnemonic(&comp_text).ok_or(InstrParseError::BadComp(comp_text))?;
        Ok(Instr::Compute { dest, comp, jump })
    }
}
