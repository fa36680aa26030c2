use color_eyre::eyre::Result;
use log::LevelFilter;
use mdview::cli::Cli;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so configuration loading can log too
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .init();

  mdview::run(&cli)
}
