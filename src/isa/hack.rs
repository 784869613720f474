use crate::decoder::{Decoded, Decoder};
use crate::instructions::{Comp, Dest, Instr, Jump, Operand};

/// Decoder for the Hack machine-language encoding.
///
/// A-instructions have bit 15 clear and carry the constant in bits 14..0.
/// C-instructions are `111a cccc ccdd djjj`.
pub struct HackDecoder;

impl HackDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HackDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HackDecoder {
    fn decode(&self, word: u16) -> Option<Decoded> {
        if word & 0x8000 == 0 {
            return Some(Decoded::Load(word));
        }
        if word & 0xE000 != 0xE000 {
            return None;
        }
        let comp = Comp::from_bits(((word >> 6) & 0x7F) as u8)?;
        let dest = Dest::from_bits_truncate(((word >> 3) & 0b111) as u8);
        let jump = Jump::from_bits_truncate((word & 0b111) as u8);
        Some(Decoded::Compute { dest, comp, jump })
    }
}

/// Encode a resolved instruction. Symbolic operands must already be
/// replaced by their addresses.
pub fn encode(instr: &Instr) -> Option<u16> {
    match instr {
        Instr::At(Operand::Value(v)) if *v <= 0x7FFF => Some(*v),
        Instr::At(_) => None,
        Instr::Compute { dest, comp, jump } => Some(
            0xE000
                | ((comp.bits() as u16) << 6)
                | ((dest.bits() as u16) << 3)
                | jump.bits() as u16,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_words() {
        let dec = HackDecoder::new();
        assert_eq!(dec.decode(0x0011), Some(Decoded::Load(17)));
        // D=M
        assert_eq!(
            dec.decode(0b1111_1100_0001_0000),
            Some(Decoded::Compute { dest: Dest::D, comp: Comp::M, jump: Jump::empty() })
        );
        // 0;JMP
        assert_eq!(
            dec.decode(0b1110_1010_1000_0111),
            Some(Decoded::Compute { dest: Dest::empty(), comp: Comp::Zero, jump: Jump::all() })
        );
    }

    #[test]
    fn rejects_bad_prefix_and_unknown_comp() {
        let dec = HackDecoder::new();
        assert_eq!(dec.decode(0b1000_0000_0000_0000), None);
        // a=1 with a c-pattern that has no M form
        assert_eq!(dec.decode(0b1111_1111_1100_0000), None);
    }

    #[test]
    fn encode_matches_decode() {
        let dec = HackDecoder::new();
        let instr: Instr = "AM=M-1".parse().unwrap();
        let word = encode(&instr).unwrap();
        assert_eq!(word, 0b1111_1100_1010_1000);
        assert_eq!(
            dec.decode(word),
            Some(Decoded::Compute { dest: Dest::A | Dest::M, comp: Comp::MMinusOne, jump: Jump::empty() })
        );
        assert_eq!(encode(&Instr::at("SP")), None);
    }
}
