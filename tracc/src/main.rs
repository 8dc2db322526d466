use clap::{Parser, Subcommand};
use tracc::app::{extract, run, AppError};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct TraccAppArguments {
    #[command(subcommand)]
    app: App,
}

#[derive(Subcommand)]
pub enum App {
    /// clip census tracts to the serviced region and derive centroids
    ExtractBoundaries {
        #[arg(long, help = "census tract polygon shapefile")]
        ct_file: String,
        #[arg(long, help = "dissemination area polygon shapefile, same CRS")]
        da_file: String,
        #[arg(long, help = "output stem for the boundary and centroid layers")]
        output_stem: String,
        #[arg(long, default_value = "DGUID", help = "identifier attribute name")]
        id_field: String,
    },
    /// generate isochrones and coverage ratios for one configured run
    Run {
        #[arg(long, help = "path to a .toml or .json run configuration")]
        configuration_file: String,
    },
}

pub fn execute(app: &App) -> Result<(), AppError> {
    env_logger::init();
    match app {
        App::ExtractBoundaries {
            ct_file,
            da_file,
            output_stem,
            id_field,
        } => extract::extract_ops::run(ct_file, da_file, output_stem, id_field),
        App::Run { configuration_file } => {
            log::info!("reading run configuration from {configuration_file}");
            let config = run::RunConfig::try_from(configuration_file)?;
            run::run_ops::run(&config)
        }
    }
}

fn main() {
    let args = TraccAppArguments::parse();
    match execute(&args.app) {
        Ok(_) => {
            eprintln!("finished.");
        }
        Err(e) => {
            log::error!("tracc failed: {e}");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
