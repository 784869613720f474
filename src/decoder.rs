use serde::{Deserialize, Serialize};

use crate::instructions::{Comp, Dest, Jump};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoded {
    /// `@value`: load a 15-bit constant into A.
    Load(u16),
    Compute { dest: Dest, comp: Comp, jump: Jump },
}

pub trait Decoder {
    fn decode(&self, word: u16) -> Option<Decoded>;
}
