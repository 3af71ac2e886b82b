fn main() -> anyhow::Result<()> {
    nineverse::cli::run_cli()
}
