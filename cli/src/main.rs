use anyhow::Result;

fn main() -> Result<()> {
    linkedquad_cli::run()
}
