use std::env;
use std::io::{self, BufReader};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use log::{error, info, warn};
use rowwise::{read_coordinates, Algorithm, MultiplyConfig, SparseMatrixCSR};

const DEFAULT_CONFIG_PATH: &str = "config.txt";

fn describe(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::Inner => "Sequential inner product multiplication with NO transposition",
        Algorithm::InnerWithTransposition => "Parallel inner product multiplication with transposition",
        Algorithm::RowWise => "Parallel row wise product multiplication",
    }
}

fn load_config(path: &Path) -> rowwise::Result<MultiplyConfig> {
    if path.exists() {
        MultiplyConfig::from_file(path)
    } else {
        warn!("{} not found, using default configuration", path.display());
        Ok(MultiplyConfig::default())
    }
}

fn run() -> rowwise::Result<()> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(Path::new(&config_path))?;
    info!("configuration: {:?}", config);

    let data = read_coordinates::<f32, _>(BufReader::new(io::stdin().lock()))?;
    let a = data.into_padded_matrix()?;
    info!(
        "loaded {}x{} matrix with {} nonzeros",
        a.height(),
        a.width(),
        a.nnz()
    );

    let mut baseline: Option<SparseMatrixCSR<f32>> = None;
    for algorithm in Algorithm::ALL {
        let started = Instant::now();
        let product = a.multiply(&a, algorithm, &config)?;
        println!("{}: {}", describe(algorithm), started.elapsed().as_micros());

        match &baseline {
            Some(expected) if !expected.approx_eq(&product) => {
                warn!("{:?} disagrees with {:?}", algorithm, Algorithm::Inner);
            }
            Some(_) => {}
            None => baseline = Some(product),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
