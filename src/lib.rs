//! Translator from the stack VM language to Hack assembly.
//!
//! Translation: `parser` -> `codegen` (naming via `namer`) -> `program`,
//! driven by `translator`. Verification: `assembler` plus the emulator
//! (`cpu`, `decoder`, `exec`, `memory`, `isa::hack`).

pub mod assembler;
pub mod codegen;
pub mod command;
pub mod config;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod error;
pub mod exec;
pub mod instructions;
pub mod memory;
pub mod namer;
pub mod parser;
pub mod program;
pub mod translator;

pub mod isa {
    pub mod hack;
}

pub use command::{ArithOp, Command, Segment};
pub use config::{Bootstrap, TranslatorConfig};
pub use cpu::{Cpu, Flow, Trap};
pub use error::{ErrorKind, ParseError, SourcePos, TranslateError, TranslateResult};
pub use memory::{Bus, Ram};
pub use translator::{translate, SourceModule, Translator};
