use anyhow::Result;

use chainfolio_core::output::{render, ConfigOutput, OutputFormat};
use chainfolio_core::workspace;

/// `chainfolio config show`: display the effective configuration.
pub fn show(fmt: OutputFormat) -> Result<()> {
    let mut config = workspace::load_config()?;
    config.apply_env();

    let output = ConfigOutput {
        path: workspace::config_path()?.display().to_string(),
        config,
    };
    render(fmt, &output)?;

    if fmt == OutputFormat::Table {
        println!();
        println!("Tip: edit the file directly; COINGECKO_API_KEY and CHAINFOLIO_BIND override it.");
    }
    Ok(())
}

/// `chainfolio config path`
pub fn path() -> Result<()> {
    println!("{}", workspace::config_path()?.display());
    Ok(())
}

/// `chainfolio config init`: create the dotfolder and default config if missing.
pub fn init() -> Result<()> {
    workspace::init_workspace()?;
    println!("✓ workspace ready at {}", workspace::root_dir()?.display());
    Ok(())
}
