//! Link management commands

use std::io::Write;

use chrono::Utc;
use colored::Colorize;

use super::token::save_token;
use crate::interfaces::cli::CliError;
use crate::services::{CreateLinkRequest, LinkPolicy, LinkService};
use crate::storage::{LinkRecord, LinkState};

/// Print a record in the human-readable form shared by the commands and the shell
pub fn print_record<W: Write>(out: &mut W, record: &LinkRecord) -> std::io::Result<()> {
    let state = match record.state_at(Utc::now()) {
        LinkState::Active => "active".green(),
        LinkState::LimitExhausted => "limit reached".yellow(),
        LinkState::Expired => "expired".red(),
    };
    writeln!(out, "  {} {}", "UUID:     ".dimmed(), record.id.magenta())?;
    writeln!(out, "  {} {}", "Short URL:".dimmed(), record.code.cyan())?;
    writeln!(
        out,
        "  {} {}",
        "Target:   ".dimmed(),
        record.target_url.blue().underline()
    )?;
    writeln!(
        out,
        "  {} {}",
        "Created:  ".dimmed(),
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        out,
        "  {} {}",
        "Expires:  ".dimmed(),
        record
            .expire_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .yellow()
    )?;
    writeln!(
        out,
        "  {} {}/{} ({})",
        "Visits:   ".dimmed(),
        record.used_count,
        record.limit_count,
        state
    )?;
    Ok(())
}

pub async fn create_link(
    service: &LinkService,
    policy: &LinkPolicy,
    target_url: String,
    ttl_secs: u64,
    traffic_limit: u32,
    save_token_file: Option<String>,
) -> Result<(), CliError> {
    let record = service
        .create_link(
            CreateLinkRequest {
                target_url,
                ttl_secs,
                traffic_limit,
            },
            policy,
        )
        .await?;

    if policy.effective_ttl(ttl_secs) != ttl_secs {
        println!(
            "{} TTL capped to {}s by configuration",
            "ℹ".bold().blue(),
            policy.max_ttl_secs
        );
    }
    if policy.effective_limit(traffic_limit) != traffic_limit {
        println!(
            "{} Visit limit raised to {} by configuration",
            "ℹ".bold().blue(),
            policy.min_traffic_limit
        );
    }

    println!(
        "{} Created short link: {} -> {}",
        "✓".bold().green(),
        record.code.cyan(),
        record.target_url.blue().underline()
    );
    println!(
        "{} Owner UUID (keep it, it is the only way to manage this link): {}",
        "!".bold().yellow(),
        record.id.magenta()
    );

    if let Some(file_name) = save_token_file {
        let path = save_token(&record.id, &file_name)?;
        let dir = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!(
            "{} UUID saved to {} in {}",
            "✓".bold().green(),
            file_name.cyan(),
            dir.blue()
        );
    }

    Ok(())
}

pub async fn link_info(service: &LinkService, uuid: &str, json: bool) -> Result<(), CliError> {
    let record = service.get_info(uuid).await?;

    if json {
        let text = serde_json::to_string_pretty(&record)
            .map_err(|e| CliError::Service(e.into()))?;
        println!("{}", text);
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    print_record(&mut stdout, &record)?;
    Ok(())
}

pub async fn go_link(service: &LinkService, short_url: &str) -> Result<(), CliError> {
    let target = service.resolve(short_url, Utc::now()).await?;
    println!("{} {}", "→".bold().green(), target.blue().underline());
    Ok(())
}

pub async fn set_limit(service: &LinkService, uuid: &str, limit: u32) -> Result<(), CliError> {
    service.update_limit(uuid, limit).await?;
    println!(
        "{} Visit limit of {} set to {}",
        "✓".bold().green(),
        uuid.magenta(),
        limit.to_string().cyan()
    );
    Ok(())
}

pub async fn delete_link(service: &LinkService, uuid: &str) -> Result<(), CliError> {
    service.delete_link(uuid).await?;
    println!("{} Deleted link {}", "✓".bold().green(), uuid.magenta());
    Ok(())
}

pub async fn reclaim_expired(service: &LinkService) -> Result<(), CliError> {
    let removed = service.reclaim_expired(Utc::now()).await?;
    println!(
        "{} Removed {} expired link(s)",
        "✓".bold().green(),
        removed.to_string().cyan()
    );
    Ok(())
}
