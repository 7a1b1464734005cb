mod completion;
mod decode;
mod run;

pub(crate) use self::run::{execute_line, Flow, RunOpt};

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Decode instruction lines without executing them
    Decode(self::decode::DecodeOpt),

    /// Generate shell completions
    Completion(self::completion::CompletionOpt),
}

impl Subcommand {
    /// Run a subcommand
    pub fn exec(self) -> anyhow::Result<()> {
        match self {
            Self::Decode(opt) => opt.exec(),
            Self::Completion(opt) => opt.exec(),
        }
    }
}
