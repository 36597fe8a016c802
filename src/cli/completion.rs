//! `pythainlp completion --shell <shell>`.

use std::io::Write;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};

use crate::cli::Cli;

/// Print a completion script for pythainlp
#[derive(Parser, Debug)]
pub struct Completion {
    /// Shell to generate the script for
    #[arg(value_enum, long)]
    pub shell: Shell,
}

impl Completion {
    pub fn run(&self) -> anyhow::Result<()> {
        self.write_to(&mut std::io::stdout())
    }

    fn write_to(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        generate(self.shell, &mut cmd, bin_name, out);
        Ok(())
    }
}
