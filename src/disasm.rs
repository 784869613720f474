use crate::decoder::Decoded;
use crate::instructions::{Instr, Operand};

pub fn fmt_decoded(d: &Decoded) -> String {
    to_instr(d).to_string()
}

pub fn to_instr(d: &Decoded) -> Instr {
    match *d {
        Decoded::Load(v) => Instr::At(Operand::Value(v)),
        Decoded::Compute { dest, comp, jump } => Instr::Compute { dest, comp, jump },
    }
}
