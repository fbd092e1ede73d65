use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Input of the `set` procedure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SetInput {
    pub key: String,
    pub value: String,
}
