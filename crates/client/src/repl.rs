//! Line-oriented session loop over stdin.

use std::io::Write;

use anyhow::Result;
use encounter_core::{DirectiveSource, GameError};
use encounter_runtime::{EncounterService, RuntimeError};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::{self, Command};
use crate::render;

pub struct Repl {
    service: EncounterService,
    session: String,
}

impl Repl {
    pub fn new(service: EncounterService, session: String) -> Self {
        Self { service, session }
    }

    pub async fn run(self) -> Result<()> {
        println!("Session `{}`. Type /help for turn commands, /quit to leave.", self.session);
        println!("Plain lines are narrative; lines starting with ! are admin text.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        prompt()?;
        while let Some(line) = lines.next_line().await? {
            match command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => self.handle(command).await?,
                Err(error) => println!("  {error}"),
            }
            prompt()?;
        }

        tracing::info!(target: "cli", session = %self.session, "session loop finished");
        Ok(())
    }

    async fn handle(&self, command: Command) -> Result<()> {
        let session = self.session.as_str();
        match command {
            Command::Act(action) => match self.service.act(session, action).await {
                Ok(reply) => {
                    print_lines(render::patch(&reply.patch));
                    print_lines(render::facts(&reply.facts));
                    if let Some(text) = reply.narration {
                        println!("\n{text}\n");
                    }
                }
                Err(error) => report_error(&error)?,
            },
            Command::Admin(text) => self.apply(DirectiveSource::Admin, &text).await?,
            Command::Narrative(text) => self.apply(DirectiveSource::Generator, &text).await?,
            Command::Status => {
                let state = self.service.current_state(session).await?;
                print_lines(render::state(state.as_ref()));
            }
            Command::Log => {
                let ledger = self.service.ledger(session).await?;
                ledger.lines().for_each(|line| println!("{}", render::line(line)));
                println!("[{}]", ledger.status());
            }
            Command::Quit | Command::Empty => {}
        }
        Ok(())
    }

    async fn apply(&self, source: DirectiveSource, text: &str) -> Result<()> {
        match self.service.apply_text(&self.session, source, text).await {
            Ok(reply) => {
                if !reply.report.visible_text.is_empty() {
                    println!("{}", reply.report.visible_text);
                }
                print_lines(render::report(&reply.report));
                if let Some(patch) = &reply.patch {
                    print_lines(render::patch(patch));
                }
                print_lines(render::facts(&reply.facts));
                Ok(())
            }
            Err(error) => report_error(&error),
        }
    }
}

/// Validation errors are shown and the loop goes on; anything else ends it.
fn report_error(error: &RuntimeError) -> Result<()> {
    let severity = error.severity();
    if severity.is_internal() {
        return Err(anyhow::anyhow!("{error}"));
    }
    tracing::debug!(
        target: "cli",
        code = error.error_code(),
        severity = severity.as_str(),
        %error,
        "request rejected"
    );
    println!("  {error}");
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}
