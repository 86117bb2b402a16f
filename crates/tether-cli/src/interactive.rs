//! Terminal prompts for the deploy and plan commands.

use std::cell::RefCell;
use std::io::{self, Write};

use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};

use tether_core::guard::{StandardContract, StandardContractPrompt};

/// Asks on the terminal whether a standard contract should be reused.
///
/// With `yes` set every contract is reused without asking. Notices go to
/// stderr so that stdout stays free for `-o json`.
pub struct TerminalPrompt<W: Write = io::Stderr> {
    yes: bool,
    /// Output writer (for testing)
    writer: RefCell<W>,
    theme: ColorfulTheme,
}

impl TerminalPrompt<io::Stderr> {
    pub fn new(yes: bool) -> Self {
        Self {
            yes,
            writer: RefCell::new(io::stderr()),
            theme: ColorfulTheme::default(),
        }
    }
}

impl<W: Write> TerminalPrompt<W> {
    /// Create a prompt with a custom writer (for testing).
    #[cfg(test)]
    pub fn with_writer(yes: bool, writer: W) -> Self {
        Self {
            yes,
            writer: RefCell::new(writer),
            theme: ColorfulTheme::default(),
        }
    }

    fn print_notice(&self, contract: &StandardContract) -> io::Result<()> {
        let mut writer = self.writer.borrow_mut();
        writeln!(writer)?;
        writeln!(
            writer,
            "  {} is a standard contract already deployed at {}",
            style(&contract.name).bold().cyan(),
            style(contract.address).green()
        )?;
        writeln!(
            writer,
            "  Read more about it here: {}",
            style(&contract.info_link).dim()
        )?;
        if self.yes {
            writeln!(writer, "  Using the existing deployment")?;
        }
        writer.flush()
    }
}

impl<W: Write> StandardContractPrompt for TerminalPrompt<W> {
    fn use_existing(&self, contract: &StandardContract) -> anyhow::Result<bool> {
        self.print_notice(contract)?;
        if self.yes {
            return Ok(true);
        }

        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(format!(
                "Use the existing {} instead of deploying your own copy?",
                contract.name
            ))
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}
