fn main() -> anyhow::Result<()> {
    corsgate::logging::init_logging()?;
    corsgate::cli::run_cli()
}
