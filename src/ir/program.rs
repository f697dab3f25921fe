//! Programs, functions and their parameters.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::{ir::instruction::Instruction, ir::instruction::Type, Result};

/// A formal parameter of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Parameter type
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Param {
    /// Creates a new parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<Type>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A Bril function: a name, parameters, an optional return type and a flat instruction stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Formal parameters, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Param>,
    /// Return type, absent for functions returning nothing
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
    /// Instructions and labels in program order
    #[serde(default)]
    pub instrs: Vec<Instruction>,
}

impl Function {
    /// Creates a function without parameters or return type.
    #[must_use]
    pub fn new(name: impl Into<String>, instrs: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            ty: None,
            instrs,
        }
    }

    /// Adds parameters to this function.
    #[must_use]
    pub fn with_params(mut self, args: Vec<Param>) -> Self {
        self.args = args;
        self
    }

    /// Returns `true` if the instruction stream contains any phi node.
    #[must_use]
    pub fn has_phis(&self) -> bool {
        self.instrs.iter().any(Instruction::is_phi)
    }
}

/// A whole Bril program.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// The program's functions, in file order
    pub functions: Vec<Function>,
}

impl Program {
    /// Parses a program from a JSON reader.
    ///
    /// # Errors
    /// Returns [`crate::Error::Json`] if the input is not a valid Bril JSON program.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parses a program from a JSON string.
    ///
    /// # Errors
    /// Returns [`crate::Error::Json`] if the input is not a valid Bril JSON program.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the program as indented JSON followed by a newline.
    ///
    /// # Errors
    /// Returns an error if serialization or the underlying write fails.
    pub fn to_writer_pretty<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Looks up a function by name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACT: &str = r#"{
        "functions": [{
            "name": "fact",
            "args": [{"name": "n", "type": "int"}],
            "type": "int",
            "instrs": [
                {"dest": "one", "type": "int", "op": "const", "value": 1},
                {"dest": "r", "type": "int", "op": "call", "funcs": ["fact"], "args": ["one"]},
                {"op": "ret", "args": ["r"]}
            ]
        }]
    }"#;

    #[test]
    fn test_parse_function_signature() {
        let program = Program::from_json_str(FACT).unwrap();
        let fact = program.function("fact").unwrap();
        assert_eq!(fact.args, vec![Param::new("n", "int")]);
        assert_eq!(fact.ty, Some(Type::from("int")));
        assert_eq!(fact.instrs.len(), 3);
        assert!(!fact.has_phis());
        assert!(program.function("main").is_none());
    }

    #[test]
    fn test_writer_reparses() {
        let program = Program::from_json_str(FACT).unwrap();
        let mut out = Vec::new();
        program.to_writer_pretty(&mut out).unwrap();
        assert!(out.ends_with(b"\n"));
        let again = Program::from_reader(out.as_slice()).unwrap();
        assert_eq!(program, again);
    }

    #[test]
    fn test_missing_functions_key() {
        assert!(Program::from_json_str("{}").is_err());
        assert!(Program::from_json_str("not json").is_err());
    }

    #[test]
    fn test_function_without_instrs() {
        let program = Program::from_json_str(r#"{"functions": [{"name": "f"}]}"#).unwrap();
        assert!(program.functions[0].instrs.is_empty());
        assert!(program.functions[0].args.is_empty());
    }
}
