//! Gremlin protocol request messages.
//!
//! Request messages are sent from the client to the server.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{op, processor};

/// Request operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Script evaluation
    Eval,
    /// Authentication response
    Authentication,
    /// Bytecode traversal
    Bytecode,
    /// Session or side-effect close
    Close,
    /// Side-effect gather
    Gather,
    /// Side-effect key listing
    Keys,
}

impl Op {
    /// Wire name of the op.
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eval => op::EVAL,
            Op::Authentication => op::AUTHENTICATION,
            Op::Bytecode => op::BYTECODE,
            Op::Close => op::CLOSE,
            Op::Gather => op::GATHER,
            Op::Keys => op::KEYS,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request sent to the server.
///
/// The op and its arguments form one tagged value, serialized as the sibling
/// `"op"` and `"args"` fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// Correlation id echoed back on every response frame
    #[serde(rename = "requestId")]
    pub request_id: Uuid,
    /// Op and its arguments
    #[serde(flatten)]
    pub args: RequestArgs,
    /// Processor namespace (may be empty)
    pub processor: String,
}

impl Request {
    /// Create a request with a fresh id and the standard processor.
    pub fn new(args: RequestArgs) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            args,
            processor: processor::STANDARD.to_string(),
        }
    }

    /// Create a request reusing an existing id.
    pub fn with_id(request_id: Uuid, args: RequestArgs) -> Self {
        Self {
            request_id,
            args,
            processor: processor::STANDARD.to_string(),
        }
    }

    /// Set the processor.
    pub fn with_processor(mut self, processor: impl Into<String>) -> Self {
        self.processor = processor.into();
        self
    }

    /// Op of this request.
    pub fn op(&self) -> Op {
        self.args.op()
    }
}

/// Operation-specific request arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "lowercase")]
pub enum RequestArgs {
    /// `eval`
    Eval(EvalArgs),
    /// `authentication`
    Authentication(AuthenticationArgs),
    /// `bytecode`
    Bytecode(BytecodeArgs),
    /// `close`
    Close(CloseArgs),
    /// `gather`
    Gather(GatherArgs),
    /// `keys`
    Keys(KeysArgs),
}

impl RequestArgs {
    /// Op tag of these arguments.
    pub fn op(&self) -> Op {
        match self {
            RequestArgs::Eval(_) => Op::Eval,
            RequestArgs::Authentication(_) => Op::Authentication,
            RequestArgs::Bytecode(_) => Op::Bytecode,
            RequestArgs::Close(_) => Op::Close,
            RequestArgs::Gather(_) => Op::Gather,
            RequestArgs::Keys(_) => Op::Keys,
        }
    }
}

/// EVAL arguments - evaluate a script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalArgs {
    /// Script source
    #[serde(rename = "gremlin", skip_serializing_if = "String::is_empty", default)]
    pub script: String,
    /// Script parameters
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub bindings: HashMap<String, serde_json::Value>,
    /// Graph/traversal-source rebinding
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub aliases: HashMap<String, serde_json::Value>,
    /// Items per partial-content frame
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub batch_size: Option<u64>,
    /// Script language tag
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,
    /// Server-side evaluation timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub script_evaluation_timeout: Option<u64>,
    /// Session id (session processor only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session: Option<String>,
    /// Commit/rollback around the script (session processor only)
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub manage_transaction: bool,
}

impl EvalArgs {
    /// Create arguments for a script.
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            ..Default::default()
        }
    }

    /// Add a binding.
    pub fn with_binding(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    /// Add an alias.
    pub fn with_alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases
            .insert(name.into(), serde_json::Value::String(target.into()));
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Set the server-side evaluation timeout (ms).
    pub fn with_script_evaluation_timeout(mut self, millis: u64) -> Self {
        self.script_evaluation_timeout = Some(millis);
        self
    }

    /// Run inside a server-side session.
    pub fn with_session(mut self, session: impl Into<String>, manage_transaction: bool) -> Self {
        self.session = Some(session.into());
        self.manage_transaction = manage_transaction;
        self
    }
}

/// AUTHENTICATION arguments - SASL response to a challenge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationArgs {
    /// Base64-encoded SASL payload
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub sasl: String,
    /// SASL mechanism name
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sasl_mechanism: Option<String>,
}

/// BYTECODE arguments - submit a serialized traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BytecodeArgs {
    /// Serialized traversal
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub gremlin: String,
    /// Traversal-source rebinding
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub aliases: HashMap<String, String>,
}

/// CLOSE arguments.
///
/// The session processor uses `session`/`force`, the traversal processor
/// uses `side_effect`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseArgs {
    /// Session to close
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session: Option<String>,
    /// Close without waiting for in-flight work
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub force: bool,
    /// Side-effect id to release
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub side_effect: Option<String>,
}

/// GATHER arguments - fetch a side-effect value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatherArgs {
    /// Side-effect id
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub side_effect: String,
    /// Key within the side-effect
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub side_effect_key: String,
    /// Traversal-source rebinding
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub aliases: HashMap<String, serde_json::Value>,
}

/// KEYS arguments - list side-effect keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysArgs {
    /// Side-effect id
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub side_effect: String,
}
