//! # Record Updates and Queries
//!
//! Partial field updates and single-field equality filters, the two shapes
//! the record store understands.

use shared_types::{Address, Bytes, ContractRecord, ContractStatus};

/// Compiled artifact change. Bytecode and ABI always move together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactChange {
    /// Store a freshly compiled pair.
    Set {
        /// Creation bytecode.
        binary: Bytes,
        /// ABI JSON text.
        abi: String,
    },
    /// Drop a stale pair.
    Clear,
}

/// A partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    /// New status.
    pub status: Option<ContractStatus>,
    /// New clause list.
    pub extracted_clauses: Option<Vec<String>>,
    /// New source text.
    pub solidity_source: Option<String>,
    /// Artifact change.
    pub artifact: Option<ArtifactChange>,
    /// Deployed address.
    pub deployed_address: Option<Address>,
}

impl RecordPatch {
    /// A patch changing only the status.
    #[must_use]
    pub fn status(status: ContractStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Applies the patch in place.
    pub fn apply(&self, record: &mut ContractRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(clauses) = &self.extracted_clauses {
            record.extracted_clauses = Some(clauses.clone());
        }
        if let Some(source) = &self.solidity_source {
            record.solidity_source = Some(source.clone());
        }
        match &self.artifact {
            Some(ArtifactChange::Set { binary, abi }) => {
                record.binary = Some(binary.clone());
                record.abi = Some(abi.clone());
            }
            Some(ArtifactChange::Clear) => {
                record.binary = None;
                record.abi = None;
            }
            None => {}
        }
        if let Some(address) = self.deployed_address {
            record.deployed_address = Some(address);
        }
    }
}

/// Field-equality filter for `RecordStore::query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// `status == ...`
    Status(ContractStatus),
    /// `deployedAddress == ...`
    DeployedAddress(Address),
    /// `userId == ...`
    Owner(String),
}

impl RecordFilter {
    /// Whether `record` passes the filter.
    #[must_use]
    pub fn matches(&self, record: &ContractRecord) -> bool {
        match self {
            Self::Status(status) => record.status == *status,
            Self::DeployedAddress(address) => record.deployed_address == Some(*address),
            Self::Owner(user_id) => record.is_owned_by(user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_moves_artifact_together() {
        let mut record = ContractRecord::uploaded("alice", "text");
        RecordPatch {
            status: Some(ContractStatus::SolidityGenerated),
            artifact: Some(ArtifactChange::Set {
                binary: Bytes::from(vec![0x60]),
                abi: "[]".into(),
            }),
            ..RecordPatch::default()
        }
        .apply(&mut record);
        assert!(record.binary.is_some() && record.abi.is_some());

        RecordPatch {
            artifact: Some(ArtifactChange::Clear),
            ..RecordPatch::default()
        }
        .apply(&mut record);
        assert!(record.binary.is_none() && record.abi.is_none());
        assert_eq!(record.status, ContractStatus::SolidityGenerated);
    }

    #[test]
    fn test_filters() {
        let mut record = ContractRecord::uploaded("alice", "text");
        let address = Address::new([9; 20]);
        record.deployed_address = Some(address);

        assert!(RecordFilter::Owner("alice".into()).matches(&record));
        assert!(!RecordFilter::Owner("bob".into()).matches(&record));
        assert!(RecordFilter::DeployedAddress(address).matches(&record));
        assert!(RecordFilter::Status(ContractStatus::Uploaded).matches(&record));
    }
}
