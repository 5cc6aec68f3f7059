//! # Deployment Context
//!
//! Built fresh for every deployment or estimate, never persisted.

use lx_03_ledger_client::Deployment;
use shared_types::{Bytes, ContractId, ContractRecord};

/// Bytecode plus encoded constructor arguments for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    /// Record being deployed.
    pub record_id: ContractId,
    /// Creation bytecode.
    pub bytecode: Bytes,
    /// ABI-encoded constructor arguments.
    pub encoded_args: Bytes,
}

impl DeploymentContext {
    /// Creation payload: bytecode followed by the encoded arguments.
    #[must_use]
    pub fn creation_data(&self) -> Bytes {
        let mut data = self.bytecode.as_slice().to_vec();
        data.extend_from_slice(self.encoded_args.as_slice());
        Bytes::from(data)
    }
}

/// A record after a successful deployment, with the ledger's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    /// Record as persisted, at DEPLOYED.
    pub record: ContractRecord,
    /// Address, transaction and gas of the creation.
    pub deployment: Deployment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_data_appends_args() {
        let context = DeploymentContext {
            record_id: ContractId::new(),
            bytecode: Bytes::from(vec![0x60, 0x01]),
            encoded_args: Bytes::from(vec![0xff]),
        };
        assert_eq!(context.creation_data().as_slice(), &[0x60, 0x01, 0xff]);
    }
}
