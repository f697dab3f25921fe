//! Bril instructions and their JSON wire format.
//!
//! On the wire every instruction is a flat JSON object whose shape is implied by which fields
//! are present. [`Instruction`] is the typed form; conversion goes through a private
//! [`InstructionRecord`] so that shape errors (such as a phi with mismatched `args` and
//! `labels`) are reported once, at deserialization time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Opcodes that end a basic block.
pub const TERMINATORS: [&str; 3] = ["jmp", "br", "ret"];

/// A Bril type.
///
/// Core Bril only has named primitives; the memory extension adds parameterised pointers,
/// written `{"ptr": <type>}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Type {
    /// A primitive such as `int`, `bool`, `float` or `char`.
    Named(String),
    /// A pointer to values of the inner type.
    Pointer {
        /// The pointee type
        ptr: Box<Type>,
    },
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::Pointer { ptr } => write!(f, "ptr<{ptr}>"),
        }
    }
}

impl From<&str> for Type {
    fn from(name: &str) -> Self {
        Type::Named(name.to_string())
    }
}

/// A literal operand of a `const` instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// `true` / `false`
    Bool(bool),
    /// A 64-bit signed integer
    Int(i64),
    /// A double precision float
    Float(f64),
    /// A single character, encoded as a one-character string
    Char(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(value) => write!(f, "{value}"),
            Literal::Int(value) => write!(f, "{value}"),
            Literal::Float(value) => write!(f, "{value}"),
            Literal::Char(value) => write!(f, "'{value}'"),
        }
    }
}

/// One element of a function's flat instruction stream.
///
/// Labels live in the same stream as operations; the basic block builder consumes them as
/// block names. Phi nodes normally only appear after SSA construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstructionRecord", into = "InstructionRecord")]
pub enum Instruction {
    /// A block-entry marker.
    Label {
        /// The block name
        label: String,
    },

    /// An operation producing a value into `dest`.
    Value {
        /// Destination variable
        dest: String,
        /// Type of the produced value
        ty: Type,
        /// Opcode, e.g. `add` or `const`
        op: String,
        /// Variable operands
        args: Vec<String>,
        /// Callee names (for `call`)
        funcs: Vec<String>,
        /// Label operands
        labels: Vec<String>,
        /// Literal operand (for `const`)
        value: Option<Literal>,
    },

    /// An operation executed only for its effect, including the terminators.
    Effect {
        /// Opcode, e.g. `print`, `jmp` or `ret`
        op: String,
        /// Variable operands
        args: Vec<String>,
        /// Callee names (for `call`)
        funcs: Vec<String>,
        /// Label operands (branch targets for `jmp` / `br`)
        labels: Vec<String>,
    },

    /// A phi node: `dest` takes `args[i]` when control arrives from block `labels[i]`.
    Phi {
        /// Destination variable
        dest: String,
        /// Type of the merged value
        ty: Type,
        /// Incoming values, parallel to `labels`
        args: Vec<String>,
        /// Incoming predecessor blocks, parallel to `args`
        labels: Vec<String>,
    },
}

impl Instruction {
    /// Creates a label marker.
    #[must_use]
    pub fn label(name: impl Into<String>) -> Self {
        Instruction::Label { label: name.into() }
    }

    /// Creates a `const` instruction.
    #[must_use]
    pub fn constant(dest: impl Into<String>, ty: impl Into<Type>, value: Literal) -> Self {
        Instruction::Value {
            dest: dest.into(),
            ty: ty.into(),
            op: "const".to_string(),
            args: Vec::new(),
            funcs: Vec::new(),
            labels: Vec::new(),
            value: Some(value),
        }
    }

    /// Creates a value operation over variable operands.
    #[must_use]
    pub fn value(
        dest: impl Into<String>,
        ty: impl Into<Type>,
        op: impl Into<String>,
        args: &[&str],
    ) -> Self {
        Instruction::Value {
            dest: dest.into(),
            ty: ty.into(),
            op: op.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            funcs: Vec::new(),
            labels: Vec::new(),
            value: None,
        }
    }

    /// Creates an effect operation.
    #[must_use]
    pub fn effect(op: impl Into<String>, args: &[&str], labels: &[&str]) -> Self {
        Instruction::Effect {
            op: op.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            funcs: Vec::new(),
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
        }
    }

    /// Creates an unconditional jump.
    #[must_use]
    pub fn jmp(target: &str) -> Self {
        Self::effect("jmp", &[], &[target])
    }

    /// Creates a conditional branch.
    #[must_use]
    pub fn br(cond: &str, if_true: &str, if_false: &str) -> Self {
        Self::effect("br", &[cond], &[if_true, if_false])
    }

    /// Creates a return, optionally carrying a value.
    #[must_use]
    pub fn ret(value: Option<&str>) -> Self {
        match value {
            Some(v) => Self::effect("ret", &[v], &[]),
            None => Self::effect("ret", &[], &[]),
        }
    }

    /// Returns the opcode; `None` for labels.
    #[must_use]
    pub fn op(&self) -> Option<&str> {
        match self {
            Instruction::Label { .. } => None,
            Instruction::Value { op, .. } | Instruction::Effect { op, .. } => Some(op),
            Instruction::Phi { .. } => Some("phi"),
        }
    }

    /// Returns the destination variable, if this instruction defines one.
    #[must_use]
    pub fn dest(&self) -> Option<&str> {
        match self {
            Instruction::Value { dest, .. } | Instruction::Phi { dest, .. } => Some(dest),
            _ => None,
        }
    }

    /// Replaces the destination variable. Has no effect on labels and effect operations.
    pub fn set_dest(&mut self, name: String) {
        if let Instruction::Value { dest, .. } | Instruction::Phi { dest, .. } = self {
            *dest = name;
        }
    }

    /// Returns the type of the destination, if any.
    #[must_use]
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Instruction::Value { ty, .. } | Instruction::Phi { ty, .. } => Some(ty),
            _ => None,
        }
    }

    /// Returns the variable operands.
    #[must_use]
    pub fn args(&self) -> &[String] {
        match self {
            Instruction::Label { .. } => &[],
            Instruction::Value { args, .. }
            | Instruction::Effect { args, .. }
            | Instruction::Phi { args, .. } => args,
        }
    }

    /// Returns the variable operands mutably.
    pub fn args_mut(&mut self) -> &mut [String] {
        match self {
            Instruction::Label { .. } => &mut [],
            Instruction::Value { args, .. }
            | Instruction::Effect { args, .. }
            | Instruction::Phi { args, .. } => args,
        }
    }

    /// Returns the label operands (branch targets, or phi predecessors).
    #[must_use]
    pub fn labels(&self) -> &[String] {
        match self {
            Instruction::Label { .. } => &[],
            Instruction::Value { labels, .. }
            | Instruction::Effect { labels, .. }
            | Instruction::Phi { labels, .. } => labels,
        }
    }

    /// Returns the label name if this is a label marker.
    #[must_use]
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Instruction::Label { label } => Some(label),
            _ => None,
        }
    }

    /// Returns `true` for `jmp`, `br` and `ret`.
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        match self {
            Instruction::Effect { op, .. } => TERMINATORS.contains(&op.as_str()),
            _ => false,
        }
    }

    /// Returns `true` for phi nodes.
    #[must_use]
    pub fn is_phi(&self) -> bool {
        matches!(self, Instruction::Phi { .. })
    }
}

/// The flat JSON shape shared by every instruction kind.
#[derive(Debug, Default, Serialize, Deserialize)]
struct InstructionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    op: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dest: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    ty: Option<Type>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    funcs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Literal>,
}

impl TryFrom<InstructionRecord> for Instruction {
    type Error = Error;

    fn try_from(record: InstructionRecord) -> Result<Self, Self::Error> {
        if let Some(label) = record.label {
            if record.op.is_some() {
                return Err(malformed_error!(
                    "label '{}' also carries opcode '{}'",
                    label,
                    record.op.unwrap_or_default()
                ));
            }
            return Ok(Instruction::Label { label });
        }

        let Some(op) = record.op else {
            return Err(malformed_error!("instruction has neither 'op' nor 'label'"));
        };

        if op == "phi" {
            let (Some(dest), Some(ty)) = (record.dest, record.ty) else {
                return Err(malformed_error!("phi node without 'dest' and 'type'"));
            };
            if record.args.len() != record.labels.len() {
                return Err(malformed_error!(
                    "phi node '{}' has {} args but {} labels",
                    dest,
                    record.args.len(),
                    record.labels.len()
                ));
            }
            return Ok(Instruction::Phi {
                dest,
                ty,
                args: record.args,
                labels: record.labels,
            });
        }

        match record.dest {
            Some(dest) => {
                let Some(ty) = record.ty else {
                    return Err(malformed_error!(
                        "value operation '{}' defining '{}' has no 'type'",
                        op,
                        dest
                    ));
                };
                Ok(Instruction::Value {
                    dest,
                    ty,
                    op,
                    args: record.args,
                    funcs: record.funcs,
                    labels: record.labels,
                    value: record.value,
                })
            }
            None => Ok(Instruction::Effect {
                op,
                args: record.args,
                funcs: record.funcs,
                labels: record.labels,
            }),
        }
    }
}

impl From<Instruction> for InstructionRecord {
    fn from(instruction: Instruction) -> Self {
        match instruction {
            Instruction::Label { label } => InstructionRecord {
                label: Some(label),
                ..InstructionRecord::default()
            },
            Instruction::Value {
                dest,
                ty,
                op,
                args,
                funcs,
                labels,
                value,
            } => InstructionRecord {
                op: Some(op),
                dest: Some(dest),
                ty: Some(ty),
                args,
                funcs,
                labels,
                value,
                ..InstructionRecord::default()
            },
            Instruction::Effect {
                op,
                args,
                funcs,
                labels,
            } => InstructionRecord {
                op: Some(op),
                args,
                funcs,
                labels,
                ..InstructionRecord::default()
            },
            Instruction::Phi {
                dest,
                ty,
                args,
                labels,
            } => InstructionRecord {
                op: Some("phi".to_string()),
                dest: Some(dest),
                ty: Some(ty),
                args,
                labels,
                ..InstructionRecord::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> serde_json::Result<Instruction> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_parse_label() {
        let instr = parse(r#"{"label": "loop"}"#).unwrap();
        assert_eq!(instr, Instruction::label("loop"));
        assert_eq!(instr.op(), None);
        assert_eq!(instr.as_label(), Some("loop"));
    }

    #[test]
    fn test_parse_const() {
        let instr = parse(r#"{"dest": "x", "type": "int", "op": "const", "value": 7}"#).unwrap();
        assert_eq!(instr, Instruction::constant("x", "int", Literal::Int(7)));
        assert_eq!(instr.dest(), Some("x"));
        assert!(instr.args().is_empty());
    }

    #[test]
    fn test_parse_literals() {
        let b = parse(r#"{"dest": "b", "type": "bool", "op": "const", "value": true}"#).unwrap();
        let f = parse(r#"{"dest": "f", "type": "float", "op": "const", "value": 1.5}"#).unwrap();
        let c = parse(r#"{"dest": "c", "type": "char", "op": "const", "value": "a"}"#).unwrap();

        assert!(matches!(b, Instruction::Value { value: Some(Literal::Bool(true)), .. }));
        assert!(matches!(f, Instruction::Value { value: Some(Literal::Float(v)), .. } if v == 1.5));
        assert!(matches!(c, Instruction::Value { value: Some(Literal::Char(ref s)), .. } if s == "a"));
    }

    #[test]
    fn test_parse_effect_and_terminators() {
        let print = parse(r#"{"op": "print", "args": ["x"]}"#).unwrap();
        let jmp = parse(r#"{"op": "jmp", "labels": ["end"]}"#).unwrap();
        let br = parse(r#"{"op": "br", "args": ["c"], "labels": ["a", "b"]}"#).unwrap();
        let ret = parse(r#"{"op": "ret"}"#).unwrap();

        assert!(!print.is_terminator());
        assert!(jmp.is_terminator());
        assert!(br.is_terminator());
        assert!(ret.is_terminator());
        assert_eq!(br.labels(), ["a".to_string(), "b".to_string()]);
        assert_eq!(br, Instruction::br("c", "a", "b"));
    }

    #[test]
    fn test_parse_pointer_type() {
        let instr =
            parse(r#"{"dest": "p", "type": {"ptr": "int"}, "op": "alloc", "args": ["n"]}"#)
                .unwrap();
        let ty = instr.ty().unwrap();
        assert_eq!(ty.to_string(), "ptr<int>");
    }

    #[test]
    fn test_parse_phi() {
        let instr = parse(
            r#"{"dest": "x.2", "type": "int", "op": "phi", "args": ["x.0", "x.1"], "labels": ["l", "r"]}"#,
        )
        .unwrap();
        assert!(instr.is_phi());
        assert_eq!(instr.op(), Some("phi"));
        assert_eq!(instr.args().len(), 2);
    }

    #[test]
    fn test_phi_length_mismatch_rejected() {
        let err = parse(
            r#"{"dest": "x", "type": "int", "op": "phi", "args": ["a"], "labels": ["l", "r"]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("1 args but 2 labels"));
    }

    #[test]
    fn test_missing_op_rejected() {
        assert!(parse(r#"{"dest": "x", "type": "int"}"#).is_err());
        assert!(parse(r#"{"dest": "x", "op": "add", "args": ["a", "b"]}"#).is_err());
    }

    #[test]
    fn test_serialize_omits_empty_fields() {
        let json = serde_json::to_value(Instruction::ret(None)).unwrap();
        assert_eq!(json, serde_json::json!({"op": "ret"}));

        let json = serde_json::to_value(Instruction::value("s", "int", "add", &["a", "b"])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"op": "add", "dest": "s", "type": "int", "args": ["a", "b"]})
        );
    }

    #[test]
    fn test_set_dest_and_args_mut() {
        let mut instr = Instruction::value("s", "int", "add", &["a", "b"]);
        instr.set_dest("s.0".to_string());
        instr.args_mut()[1] = "b.3".to_string();
        assert_eq!(instr.dest(), Some("s.0"));
        assert_eq!(instr.args(), ["a".to_string(), "b.3".to_string()]);

        let mut label = Instruction::label("x");
        label.set_dest("ignored".to_string());
        assert_eq!(label.dest(), None);
    }
}
