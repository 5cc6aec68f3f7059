//! Key vault and ledger client working together: balances feed the wallet
//! listing, loaded credentials sign deployments.

use lx_01_key_vault::prelude::*;
use lx_03_ledger_client::prelude::*;
use lx_03_ledger_client::{RpcError, ScriptedTransport};
use serde_json::json;
use shared_crypto::KdfParams;
use shared_types::{Bytes, U256};
use std::sync::Arc;
use tempfile::TempDir;
use zeroize::Zeroizing;

const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

fn scripted_node() -> Arc<ScriptedTransport> {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("eth_getBalance", json!("0x2a"))
        .respond("eth_gasPrice", json!("0x1"))
        .respond("eth_estimateGas", json!("0x100"))
        .respond("eth_getTransactionCount", json!("0x0"))
        .respond("eth_sendRawTransaction", json!(format!("0x{}", "11".repeat(32))))
        .respond(
            "eth_getTransactionReceipt",
            json!({
                "transactionHash": format!("0x{}", "11".repeat(32)),
                "contractAddress": CONTRACT,
                "status": "0x1"
            }),
        );
    transport
}

#[tokio::test]
async fn wallet_created_with_ledger_balance_signs_a_deployment() {
    let dir = TempDir::new().unwrap();
    let transport = scripted_node();
    let ledger = Arc::new(LedgerClient::new(LedgerConfig::default(), transport.clone()));

    let config = VaultConfig {
        keystore_dir: dir.path().to_path_buf(),
        passphrase: Zeroizing::new("correct horse".to_string()),
        kdf: KdfParams::light(),
    };
    let directory = Arc::new(FsKeyDirectory::open(dir.path()).await.unwrap());
    let vault = KeyVault::new(config, directory, ledger.clone());

    let wallet = vault.create_wallet("deployer").await.unwrap();
    assert_eq!(wallet.balance, Balance::Known(U256::from(42)));

    let signer = vault.load_credentials(wallet.address).await.unwrap();
    let bytecode = Bytes::from_hex("600160").unwrap();
    let encoded = ledger
        .build_deployment_context(&bytecode, &[100u64.into()])
        .unwrap();
    let deployment = ledger.deploy(&bytecode, &encoded, &signer).await.unwrap();

    assert_eq!(deployment.address.to_string(), CONTRACT);
    let nonce_query = transport
        .calls()
        .into_iter()
        .find(|c| c.method == "eth_getTransactionCount")
        .unwrap();
    assert_eq!(nonce_query.params[0], json!(wallet.address.to_string()));
}

#[tokio::test]
async fn unreachable_balances_degrade_the_listing() {
    let dir = TempDir::new().unwrap();
    let transport = scripted_node();
    transport.fail("eth_getBalance", RpcError::Transport("connection refused".into()));
    let ledger = Arc::new(LedgerClient::new(LedgerConfig::default(), transport));

    let config = VaultConfig {
        keystore_dir: dir.path().to_path_buf(),
        passphrase: Zeroizing::new("pw".to_string()),
        kdf: KdfParams::light(),
    };
    let directory = Arc::new(FsKeyDirectory::open(dir.path()).await.unwrap());
    let vault = KeyVault::new(config, directory, ledger);

    vault.create_wallet("ops").await.unwrap();
    let wallets = vault.list_wallets().await.unwrap();
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].balance, Balance::Unavailable);
}
