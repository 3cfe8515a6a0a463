//! Interactive menu shell
//!
//! Numbered menus read line by line from any `BufRead` and written to any
//! `Write`. Service errors are printed and the menu continues; only I/O
//! failures end the session. End of input behaves like "exit".

use std::io::{BufRead, Write};

use chrono::Utc;
use colored::Colorize;

use super::CliError;
use super::commands::{print_record, save_token};
use crate::cli::{DEFAULT_TRAFFIC_LIMIT, DEFAULT_TTL_SECS};
use crate::services::{CreateLinkRequest, LinkPolicy, LinkService};

/// What the main menu asks the driver loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSignal {
    Continue,
    Exit,
    Restart,
}

pub struct Shell<'a, R, W> {
    service: &'a LinkService,
    policy: LinkPolicy,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(service: &'a LinkService, policy: LinkPolicy, input: R, output: W) -> Self {
        Self {
            service,
            policy,
            input,
            output,
        }
    }

    /// Consume the shell and hand back its writer
    pub fn into_output(self) -> W {
        self.output
    }

    /// Driver loop: re-enters the main menu until it signals `Exit`
    pub async fn run(&mut self) -> Result<(), CliError> {
        self.banner()?;
        loop {
            match self.main_menu().await? {
                MenuSignal::Continue => {}
                MenuSignal::Exit => {
                    writeln!(self.output, "\n{}", "Bye.".dimmed())?;
                    return Ok(());
                }
                MenuSignal::Restart => {
                    tracing::debug!("Shell restarted by user");
                    writeln!(self.output, "{}", "Shell restarted.".yellow())?;
                    self.banner()?;
                }
            }
        }
    }

    fn banner(&mut self) -> Result<(), CliError> {
        writeln!(
            self.output,
            "{} {}",
            "ttlink".bold().cyan(),
            format!("(short URLs under {})", self.service.short_url_prefix()).dimmed()
        )?;
        Ok(())
    }

    /// 读取一行；输入结束时返回 None
    fn prompt(&mut self, text: &str) -> Result<Option<String>, CliError> {
        write!(self.output, "{} ", text.bold())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Show the main menu once and handle one choice
    pub async fn main_menu(&mut self) -> Result<MenuSignal, CliError> {
        writeln!(self.output)?;
        writeln!(self.output, "1 - exit")?;
        writeln!(self.output, "2 - work with links")?;
        writeln!(self.output, "3 - restart")?;

        let Some(choice) = self.prompt("Choose an action:")? else {
            return Ok(MenuSignal::Exit);
        };

        match choice.as_str() {
            "1" => Ok(MenuSignal::Exit),
            "2" => {
                self.link_menu().await?;
                Ok(MenuSignal::Continue)
            }
            "3" => Ok(MenuSignal::Restart),
            _ => {
                writeln!(self.output, "{}", "No such command, try again.".red())?;
                Ok(MenuSignal::Continue)
            }
        }
    }

    async fn link_menu(&mut self) -> Result<(), CliError> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "1 - link info")?;
            writeln!(self.output, "2 - create link")?;
            writeln!(self.output, "3 - follow short link")?;
            writeln!(self.output, "4 - change visit limit")?;
            writeln!(self.output, "5 - delete link")?;
            writeln!(self.output, "6 - back")?;

            let Some(choice) = self.prompt("Choose an action:")? else {
                return Ok(());
            };

            let handled = match choice.as_str() {
                "" => {
                    writeln!(self.output, "{}", "Empty input, try again.".red())?;
                    continue;
                }
                "1" => self.show_info().await,
                "2" => self.create().await,
                "3" => self.follow().await,
                "4" => self.change_limit().await,
                "5" => self.delete().await,
                "6" => {
                    writeln!(self.output, "{}", "Back to main menu...".dimmed())?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "{}", "No such command, try again.".red())?;
                    continue;
                }
            };

            match handled {
                Ok(()) => {}
                Err(CliError::Service(e)) => writeln!(self.output, "{}", e.format_colored())?,
                Err(e) => return Err(e),
            }
        }
    }

    async fn show_info(&mut self) -> Result<(), CliError> {
        let Some(uuid) = self.prompt("Owner UUID:")? else {
            return Ok(());
        };
        let record = self.service.get_info(&uuid).await?;
        print_record(&mut self.output, &record)?;
        Ok(())
    }

    async fn create(&mut self) -> Result<(), CliError> {
        let Some(target_url) = self.prompt("Target URL:")? else {
            return Ok(());
        };
        let ttl_secs = self.ask_number("Lifetime in seconds:", DEFAULT_TTL_SECS)?;
        let traffic_limit = self.ask_number("Visit limit:", DEFAULT_TRAFFIC_LIMIT)?;

        let record = self
            .service
            .create_link(
                CreateLinkRequest {
                    target_url,
                    ttl_secs,
                    traffic_limit,
                },
                &self.policy,
            )
            .await?;

        writeln!(
            self.output,
            "{} {}",
            "✓".bold().green(),
            "Link created. Save the UUID, it is the only way to manage the link:".green()
        )?;
        print_record(&mut self.output, &record)?;

        writeln!(self.output, "\nSave the UUID to a file?")?;
        writeln!(self.output, "1 - yes")?;
        writeln!(self.output, "2 - no")?;
        if self.prompt("Choose an action:")?.as_deref() != Some("1") {
            return Ok(());
        }

        let Some(file_name) = self.prompt("File name:")? else {
            return Ok(());
        };
        let path = save_token(&record.id, &file_name)?;
        let dir = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        writeln!(
            self.output,
            "{} UUID saved in {}",
            "✓".bold().green(),
            dir.blue()
        )?;
        Ok(())
    }

    /// 解析失败或为 0 时使用默认值
    fn ask_number<T>(&mut self, text: &str, default: T) -> Result<T, CliError>
    where
        T: std::str::FromStr + PartialEq + Default + std::fmt::Display + Copy,
    {
        let Some(raw) = self.prompt(text)? else {
            return Ok(default);
        };
        match raw.parse::<T>() {
            Ok(value) if value != T::default() => Ok(value),
            _ => {
                writeln!(
                    self.output,
                    "{}",
                    format!("Invalid number, using the default ({}).", default).yellow()
                )?;
                Ok(default)
            }
        }
    }

    async fn follow(&mut self) -> Result<(), CliError> {
        let prompt = format!("Short URL (like {}/abc123):", self.service.short_url_prefix());
        let Some(short_url) = self.prompt(&prompt)? else {
            return Ok(());
        };
        let target = self.service.resolve(&short_url, Utc::now()).await?;
        writeln!(
            self.output,
            "{} {}",
            "→".bold().green(),
            target.blue().underline()
        )?;
        Ok(())
    }

    async fn change_limit(&mut self) -> Result<(), CliError> {
        let Some(uuid) = self.prompt("Owner UUID:")? else {
            return Ok(());
        };
        let Some(raw) = self.prompt("New visit limit:")? else {
            return Ok(());
        };
        let Ok(limit) = raw.parse::<u32>() else {
            writeln!(self.output, "{}", "Invalid number, limit unchanged.".red())?;
            return Ok(());
        };
        self.service.update_limit(&uuid, limit).await?;
        writeln!(
            self.output,
            "{} Visit limit set to {}",
            "✓".bold().green(),
            limit.to_string().cyan()
        )?;
        Ok(())
    }

    async fn delete(&mut self) -> Result<(), CliError> {
        let Some(uuid) = self.prompt("Owner UUID:")? else {
            return Ok(());
        };
        self.service.delete_link(&uuid).await?;
        writeln!(self.output, "{} Link deleted", "✓".bold().green())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::io::Cursor;
    use std::sync::Arc;

    fn service() -> LinkService {
        LinkService::new(Arc::new(MemoryStorage::new()), "clck.ru")
    }

    fn policy() -> LinkPolicy {
        LinkPolicy::new(3600, 5).unwrap()
    }

    async fn run_script(service: &LinkService, script: &str) -> String {
        let mut shell = Shell::new(service, policy(), Cursor::new(script.to_string()), Vec::new());
        shell.run().await.unwrap();
        String::from_utf8(shell.into_output()).unwrap()
    }

    #[tokio::test]
    async fn test_main_menu_signals() {
        let service = service();
        let mut shell = Shell::new(&service, policy(), Cursor::new("3\n1\n9\n"), Vec::new());
        assert_eq!(shell.main_menu().await.unwrap(), MenuSignal::Restart);
        assert_eq!(shell.main_menu().await.unwrap(), MenuSignal::Exit);
        assert_eq!(shell.main_menu().await.unwrap(), MenuSignal::Continue);
        // 输入结束
        assert_eq!(shell.main_menu().await.unwrap(), MenuSignal::Exit);
    }

    #[tokio::test]
    async fn test_restart_reenters_menu() {
        let service = service();
        let output = run_script(&service, "3\n1\n").await;
        assert!(output.contains("Shell restarted."));
        assert!(output.contains("Bye."));
    }

    #[tokio::test]
    async fn test_create_with_bad_numbers_uses_defaults() {
        let service = service();
        let output = run_script(
            &service,
            "2\n2\nhttps://example.com\nsoon\nlots\n2\n6\n1\n",
        )
        .await;
        assert!(output.contains("using the default (3600)"));
        assert!(output.contains("using the default (5)"));
        assert!(output.contains("Link created"));
        assert!(output.contains("0/5"));
    }

    #[tokio::test]
    async fn test_service_errors_keep_menu_running() {
        let service = service();
        let output = run_script(&service, "2\n1\nno-such-uuid\n3\nclck.ru/zzz\n6\n1\n").await;
        assert!(output.contains("E002"));
        assert!(output.contains("E001"));
        assert!(output.contains("Bye."));
    }
}
