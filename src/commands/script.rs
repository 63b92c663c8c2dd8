use bytes::Bytes;
use sha1::{Digest, Sha1};

use crate::command::ToArg;
use crate::commands::{Eval, EvalSha};

/// A Lua script together with the SHA1 digest the server caches it under.
///
/// Run it with [`Client::invoke_script`](crate::Client::invoke_script), which sends the digest
/// first and the source only when the server does not know it yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    code: Bytes,
    hash: String,
}

impl Script {
    pub fn new(code: impl ToArg) -> Script {
        let code = code.to_arg();
        let hash = format!("{:x}", Sha1::digest(&code));
        Script { code, hash }
    }

    /// Lowercase hex digest, as accepted by EVALSHA and SCRIPT EXISTS.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn code(&self) -> &Bytes {
        &self.code
    }

    pub fn evalsha(&self) -> EvalSha {
        EvalSha::new(self.hash.clone())
    }

    pub fn eval(&self) -> Eval {
        Eval::new(self.code.clone())
    }
}
