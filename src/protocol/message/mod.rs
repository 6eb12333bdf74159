//! Gremlin protocol message types.
//!
//! Requests travel from the client to the server as framed JSON, responses
//! come back as one JSON document per transport message.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

/// Op names carried in the `op` field of a request.
pub mod op {
    /// Evaluate a script
    pub const EVAL: &str = "eval";
    /// Answer an authentication challenge
    pub const AUTHENTICATION: &str = "authentication";
    /// Submit traversal bytecode
    pub const BYTECODE: &str = "bytecode";
    /// Close a session or release side-effects
    pub const CLOSE: &str = "close";
    /// Gather side-effects of a traversal
    pub const GATHER: &str = "gather";
    /// List side-effect keys of a traversal
    pub const KEYS: &str = "keys";
}

/// Processor names carried in the `processor` field of a request.
pub mod processor {
    /// Sessionless script evaluation
    pub const STANDARD: &str = "";
    /// In-session script evaluation
    pub const SESSION: &str = "session";
    /// Bytecode traversal evaluation
    pub const TRAVERSAL: &str = "traversal";
}
