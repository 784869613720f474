//! Line classifier for VM source text.
//!
//! Each call looks at exactly one line: the trailing `//` comment is
//! dropped, the rest is split on whitespace and classified by field count
//! and leading keyword. Errors say which field was wrong.

use crate::command::{ArithOp, Command, Segment};
use crate::error::ParseError;
use crate::instructions::{is_symbol, MAX_CONSTANT};

/// `call` repositions ARG by `5 + args`, which must fit in an `@value`.
pub const MAX_CALL_ARGS: u16 = MAX_CONSTANT - 5;

/// Strip a trailing `//` comment and surrounding whitespace.
pub fn strip_comment(line: &str) -> &str {
    line.split_once("//").map(|(code, _)| code).unwrap_or(line).trim()
}

pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let code = strip_comment(line);
    let fields: Vec<&str> = code.split_whitespace().collect();
    match fields.as_slice() {
        [] => Ok(Command::Comment),
        ["return"] => Ok(Command::Return),
        [op] => ArithOp::from_name(op)
            .map(Command::Arithmetic)
            .ok_or_else(|| ParseError::MalformedCommand(code.to_string())),
        [kw @ ("label" | "goto" | "if-goto"), sym] => {
            let sym = symbol(sym)?;
            Ok(match *kw {
                "label" => Command::Label(sym),
                "goto" => Command::Goto(sym),
                _ => Command::IfGoto(sym),
            })
        }
        [kw @ ("push" | "pop"), seg, idx] => {
            let segment =
                Segment::from_name(seg).ok_or_else(|| ParseError::InvalidSegment(seg.to_string()))?;
            let index = number(idx)?;
            if index > segment.max_index() {
                return Err(ParseError::IndexOutOfRange {
                    field: segment.name().to_string(),
                    index,
                    max: segment.max_index(),
                });
            }
            if *kw == "push" {
                Ok(Command::Push(segment, index))
            } else if segment == Segment::Constant {
                Err(ParseError::PopConstant)
            } else {
                Ok(Command::Pop(segment, index))
            }
        }
        ["function", name, n] => Ok(Command::Function { name: symbol(name)?, locals: number(n)? }),
        ["call", name, n] => {
            let name = symbol(name)?;
            let args = number(n)?;
            if args > MAX_CALL_ARGS {
                return Err(ParseError::IndexOutOfRange { field: "call".to_string(), index: args, max: MAX_CALL_ARGS });
            }
            Ok(Command::Call { name, args })
        }
        _ => Err(ParseError::MalformedCommand(code.to_string())),
    }
}

fn number(field: &str) -> Result<u16, ParseError> {
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidIndex(field.to_string()));
    }
    field
        .parse::<u16>()
        .map_err(|_| ParseError::InvalidIndex(field.to_string()))
}

fn symbol(field: &str) -> Result<String, ParseError> {
    if is_symbol(field) {
        Ok(field.to_string())
    } else {
        Err(ParseError::InvalidSymbol(field.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(parse_line(""), Ok(Command::Comment));
        assert_eq!(parse_line("   \t"), Ok(Command::Comment));
        assert_eq!(parse_line("// push constant 1"), Ok(Command::Comment));
    }

    #[test]
    fn trailing_comment_is_ignored() {
        assert_eq!(
            parse_line("  push local 2   // load x"),
            Ok(Command::Push(Segment::Local, 2))
        );
        assert_eq!(parse_line("add//sum"), Ok(Command::Arithmetic(ArithOp::Add)));
    }

    #[test]
    fn every_operator_name() {
        for op in ArithOp::ALL {
            assert_eq!(parse_line(op.name()), Ok(Command::Arithmetic(op)));
        }
        assert_eq!(parse_line("return"), Ok(Command::Return));
    }

    #[test]
    fn control_and_function_commands() {
        assert_eq!(parse_line("label LOOP_START"), Ok(Command::Label("LOOP_START".into())));
        assert_eq!(parse_line("goto END"), Ok(Command::Goto("END".into())));
        assert_eq!(parse_line("if-goto IF_TRUE0"), Ok(Command::IfGoto("IF_TRUE0".into())));
        assert_eq!(
            parse_line("function Main.fib 2"),
            Ok(Command::Function { name: "Main.fib".into(), locals: 2 })
        );
        assert_eq!(
            parse_line("call Math.multiply 2"),
            Ok(Command::Call { name: "Math.multiply".into(), args: 2 })
        );
    }

    #[test]
    fn error_kinds() {
        let kind = |s: &str| parse_line(s).unwrap_err().kind();
        assert_eq!(kind("mul"), ErrorKind::MalformedCommand);
        assert_eq!(kind("jump END"), ErrorKind::MalformedCommand);
        assert_eq!(kind("push local"), ErrorKind::MalformedCommand);
        assert_eq!(kind("move local 1"), ErrorKind::MalformedCommand);
        assert_eq!(kind("add 1 2 3"), ErrorKind::MalformedCommand);
        assert_eq!(kind("push heap 1"), ErrorKind::InvalidSegment);
        assert_eq!(kind("pop constant 3"), ErrorKind::InvalidSegment);
        assert_eq!(kind("push local x"), ErrorKind::InvalidIndex);
        assert_eq!(kind("push local -1"), ErrorKind::InvalidIndex);
        assert_eq!(kind("push local +1"), ErrorKind::InvalidIndex);
        assert_eq!(kind("push temp 8"), ErrorKind::InvalidIndex);
        assert_eq!(kind("pop pointer 2"), ErrorKind::InvalidIndex);
        assert_eq!(kind("push constant 32768"), ErrorKind::InvalidIndex);
        assert_eq!(kind("function Main.main n"), ErrorKind::InvalidIndex);
        assert_eq!(kind("call Main.main -2"), ErrorKind::InvalidIndex);
        assert_eq!(kind("call Main.main 32763"), ErrorKind::InvalidIndex);
        assert_eq!(kind("goto 9lives"), ErrorKind::InvalidSymbol);
    }

    #[test]
    fn bounded_segments_accept_their_last_slot() {
        assert_eq!(parse_line("pop temp 7"), Ok(Command::Pop(Segment::Temp, 7)));
        assert_eq!(parse_line("push pointer 1"), Ok(Command::Push(Segment::Pointer, 1)));
        assert_eq!(parse_line("push constant 32767"), Ok(Command::Push(Segment::Constant, 32767)));
        assert_eq!(parse_line("push static 300"), Ok(Command::Push(Segment::Static, 300)));
    }
}
