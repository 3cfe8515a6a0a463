//! CLI command and shell tests

use std::io::Cursor;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tempfile::TempDir;

use ttlink::cli::{Cli, Commands};
use ttlink::errors::TtlinkError;
use ttlink::interfaces::cli::{CliError, MenuSignal, Shell, run_cli_command, save_token_in};
use ttlink::services::{CreateLinkRequest, LinkPolicy, LinkService};
use ttlink::storage::MemoryStorage;

fn setup() -> (LinkService, LinkPolicy) {
    (
        LinkService::new(Arc::new(MemoryStorage::new()), "clck.ru"),
        LinkPolicy::new(3600, 5).unwrap(),
    )
}

// =============================================================================
// One-shot Commands
// =============================================================================

#[tokio::test]
async fn test_go_command_consumes_visit() {
    let (service, policy) = setup();
    let record = service
        .create_link(
            CreateLinkRequest {
                target_url: "https://example.com".to_string(),
                ttl_secs: 60,
                traffic_limit: 5,
            },
            &policy,
        )
        .await
        .unwrap();

    let cli = Cli::try_parse_from(["ttlink", "go", record.code.as_str()]).unwrap();
    run_cli_command(&service, &policy, cli.command.unwrap())
        .await
        .unwrap();

    assert_eq!(service.get_info(&record.id).await.unwrap().used_count, 1);
}

#[tokio::test]
async fn test_command_errors_keep_their_kind() {
    let (service, policy) = setup();

    let err = run_cli_command(
        &service,
        &policy,
        Commands::Info {
            uuid: "missing".to_string(),
            json: true,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Service(TtlinkError::NotFound(_))));

    let err = run_cli_command(
        &service,
        &policy,
        Commands::Create {
            target_url: "javascript:alert(1)".to_string(),
            ttl: 60,
            limit: 5,
            save_token: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Service(TtlinkError::InvalidInput(_))));
    assert!(err.format_simple().contains("Invalid Input"));
}

#[tokio::test]
async fn test_set_limit_and_delete_commands() {
    let (service, policy) = setup();
    let record = service
        .create_link(
            CreateLinkRequest {
                target_url: "https://example.com".to_string(),
                ttl_secs: 60,
                traffic_limit: 5,
            },
            &policy,
        )
        .await
        .unwrap();

    run_cli_command(
        &service,
        &policy,
        Commands::SetLimit {
            uuid: record.id.clone(),
            limit: 11,
        },
    )
    .await
    .unwrap();
    assert_eq!(service.get_info(&record.id).await.unwrap().limit_count, 11);

    run_cli_command(
        &service,
        &policy,
        Commands::Delete {
            uuid: record.id.clone(),
        },
    )
    .await
    .unwrap();
    assert!(matches!(
        service.resolve(&record.code, Utc::now()).await,
        Err(TtlinkError::NotFound(_))
    ));
}

#[test]
fn test_save_token_in_directory() {
    let dir = TempDir::new().unwrap();
    let path = save_token_in(dir.path(), "owner-uuid", "token.txt").unwrap();
    assert_eq!(path.parent(), Some(dir.path()));
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "owner-uuid");
}

// =============================================================================
// Interactive Shell
// =============================================================================

#[tokio::test]
async fn test_shell_full_session() {
    let (service, policy) = setup();

    // 创建链接，不保存 UUID，然后返回并退出
    let script = "2\n2\nhttps://example.com/page\n120\n7\n2\n6\n1\n";
    let mut shell = Shell::new(&service, policy, Cursor::new(script), Vec::new());
    shell.run().await.unwrap();
    let output = String::from_utf8(shell.into_output()).unwrap();

    assert!(output.contains("https://example.com/page"));
    assert!(output.contains("0/7"));
}

#[tokio::test]
async fn test_shell_eof_exits() {
    let (service, policy) = setup();
    let mut shell = Shell::new(&service, policy, Cursor::new(""), Vec::new());
    assert_eq!(shell.main_menu().await.unwrap(), MenuSignal::Exit);
    shell.run().await.unwrap();
}
