//! Contract Interface Loading
//!
//! Reads the JSON interface description produced by the contract toolchain
//! and resolves the functions the binding calls into selectors.

use crate::abi::selector;
use crate::error::ContractError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// One parameter in a function declaration
#[derive(Debug, Clone, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    /// Canonical type as it appears in a signature (`tuple` expanded)
    fn canonical_type(&self) -> String {
        match self.kind.strip_prefix("tuple") {
            Some(suffix) => {
                let inner: Vec<String> = self.components.iter().map(|c| c.canonical_type()).collect();
                format!("({}){}", inner.join(","), suffix)
            }
            None => self.kind.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: String,
}

fn default_entry_type() -> String {
    "function".to_string()
}

/// A resolved contract function
#[derive(Debug, Clone)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub outputs: Vec<AbiParam>,
    pub state_mutability: String,
    signature: String,
    selector: [u8; 4],
}

impl AbiFunction {
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    pub fn is_payable(&self) -> bool {
        self.state_mutability == "payable"
    }
}

/// Functions declared by a contract, keyed by name
#[derive(Debug, Clone, Default)]
pub struct ContractInterface {
    functions: HashMap<String, AbiFunction>,
}

impl ContractInterface {
    /// Load the interface from a file on disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref();
        info!("Loading contract interface from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse either a bare ABI array or an artifact object with an `abi` field
    pub fn from_json(raw: &str) -> Result<Self, ContractError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ContractError::Interface(format!("not JSON: {}", e)))?;

        let entries = match value {
            Value::Array(items) => Value::Array(items),
            Value::Object(mut artifact) => artifact
                .remove("abi")
                .ok_or_else(|| ContractError::Interface("object has no `abi` field".to_string()))?,
            _ => {
                return Err(ContractError::Interface(
                    "expected an ABI array or artifact object".to_string(),
                ))
            }
        };

        let entries: Vec<AbiEntry> = serde_json::from_value(entries)
            .map_err(|e| ContractError::Interface(e.to_string()))?;

        let mut functions = HashMap::new();
        for entry in entries.into_iter().filter(|e| e.kind == "function") {
            let types: Vec<String> = entry.inputs.iter().map(|p| p.canonical_type()).collect();
            let signature = format!("{}({})", entry.name, types.join(","));
            debug!("Declared function {}", signature);

            // first declaration wins for overloaded names
            functions.entry(entry.name.clone()).or_insert_with(|| AbiFunction {
                selector: selector(&signature),
                signature,
                name: entry.name,
                inputs: entry.inputs,
                outputs: entry.outputs,
                state_mutability: entry.state_mutability,
            });
        }

        Ok(Self { functions })
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> Result<&AbiFunction, ContractError> {
        self.functions
            .get(name)
            .ok_or_else(|| ContractError::MissingFunction(name.to_string()))
    }

    /// Fail on the first name the interface does not declare
    pub fn require(&self, names: &[&str]) -> Result<(), ContractError> {
        names.iter().try_for_each(|name| self.function(name).map(|_| ()))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
