use anyhow::Result;

mod cli;
mod runtime;
mod scene;
mod script;

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::parse()?;
    runtime::execute(args)
}
