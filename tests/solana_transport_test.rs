//! JSON-RPC behaviour of the Solana transport against a mock HTTP server

use dex_connection::rpc::{RpcError, RpcTransport, SolanaRpcTransport};
use mockito::Matcher;
use serde_json::json;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{commitment_config::CommitmentConfig, hash::Hash, signature::Signature};

fn transport(server: &mockito::ServerGuard) -> SolanaRpcTransport {
    SolanaRpcTransport::new(&server.url(), CommitmentConfig::processed()).unwrap()
}

fn rpc_result(result: serde_json::Value) -> String {
    json!({ "jsonrpc": "2.0", "result": result, "id": 1 }).to_string()
}

#[tokio::test]
async fn test_send_raw_transaction_encodes_base64_and_skips_preflight() {
    let mut server = mockito::Server::new_async().await;
    let signature = Signature::from([7u8; 64]);

    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({ "method": "sendTransaction" })),
            Matcher::Regex(r#""AQID""#.to_string()),
            Matcher::Regex(r#""skipPreflight":true"#.to_string()),
            Matcher::Regex(r#""encoding":"base64""#.to_string()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!(signature.to_string())))
        .create_async()
        .await;

    let config = RpcSendTransactionConfig {
        skip_preflight: true,
        ..RpcSendTransactionConfig::default()
    };
    let returned = transport(&server)
        .send_raw_transaction(&[1, 2, 3], config)
        .await
        .unwrap();

    assert_eq!(returned, signature);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rpc_error_is_classified() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "error": { "code": -32002, "message": "Transaction simulation failed: Blockhash not found" },
                "id": 1,
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = transport(&server)
        .send_raw_transaction(&[1, 2, 3], RpcSendTransactionConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RpcError::BlockhashNotFound { .. }), "{:?}", err);
    assert_eq!(err.endpoint(), server.url());
}

#[tokio::test]
async fn test_signature_status_reports_landed_result() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getSignatureStatuses" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "context": { "slot": 42 },
            "value": [{
                "slot": 41,
                "confirmations": null,
                "err": null,
                "status": { "Ok": null },
                "confirmationStatus": "finalized",
            }],
        })))
        .create_async()
        .await;

    let status = transport(&server)
        .get_signature_status(&Signature::from([9u8; 64]), CommitmentConfig::confirmed())
        .await
        .unwrap();
    assert_eq!(status, Some(Ok(())));
}

#[tokio::test]
async fn test_signature_status_unknown_is_none() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getSignatureStatuses" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({ "context": { "slot": 42 }, "value": [null] })))
        .create_async()
        .await;

    let status = transport(&server)
        .get_signature_status(&Signature::from([9u8; 64]), CommitmentConfig::confirmed())
        .await
        .unwrap();
    assert_eq!(status, None);
}

#[tokio::test]
async fn test_latest_blockhash() {
    let mut server = mockito::Server::new_async().await;
    let blockhash = Hash::new_unique();
    let _mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getLatestBlockhash" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "context": { "slot": 42 },
            "value": { "blockhash": blockhash.to_string(), "lastValidBlockHeight": 300 },
        })))
        .create_async()
        .await;

    let returned = transport(&server)
        .get_latest_blockhash(CommitmentConfig::finalized())
        .await
        .unwrap();
    assert_eq!(returned, blockhash);
}
