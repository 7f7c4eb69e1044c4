//! Runs the external asset extractor into an Orbital resource tree.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use orbital_lib::core::asset::{AssetVersionId, ASSETS_DIR};
use orbital_lib::core::error::{AppResult, ApplicationError};
use orbital_lib::core::extract::{
    read_docs, requests_from_docs, RequestList, SidecarJob, DEFAULT_LOCALE,
};
use orbital_lib::core::state::manifest_resources;

#[derive(Parser, Clone, Debug)]
#[command(about, long_about = None)]
struct Cli {
    /// Extractor executable
    #[arg(long)]
    sidecar: PathBuf,

    /// Directory holding the game's pak archives
    #[arg(long)]
    paks: PathBuf,

    /// Directory holding the type mappings
    #[arg(long)]
    mappings: PathBuf,

    /// Prepared request list (`id::type::package-path` per line)
    #[arg(long, required_unless_present = "docs", conflicts_with = "docs")]
    requests: Option<PathBuf>,

    /// Game docs directory; requests are generated from `<docs>/<locale>.json`
    #[arg(long)]
    docs: Option<PathBuf>,

    /// Docs locale to read
    #[arg(short, long, default_value = DEFAULT_LOCALE)]
    locale: String,

    /// Resource root; images land in `<resources>/assets/<version>`
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Asset version to extract into, e.g. `1.0-stable`
    #[arg(long)]
    version: AssetVersionId,

    /// Working directory (defaults to a tempdir)
    #[arg(short = 'w', long)]
    workdir: Option<PathBuf>,
}

impl Cli {
    fn output_dir(&self) -> PathBuf {
        self.resources
            .clone()
            .unwrap_or_else(manifest_resources)
            .join(ASSETS_DIR)
            .join(self.version.to_string())
    }
}

async fn run(cli: Cli) -> AppResult<bool> {
    let requests = match (&cli.requests, &cli.docs) {
        (Some(file), _) => RequestList::read_from(file).await?,
        (None, Some(docs_dir)) => requests_from_docs(&read_docs(docs_dir, &cli.locale).await?),
        (None, None) => {
            return Err(ApplicationError::unexpected(
                "either --requests or --docs is required",
            ))
        }
    };
    info!("Loaded {} asset requests", requests.len());

    let (workdir, _tmp) = match cli.workdir.clone() {
        Some(dir) => (dir, None),
        None => {
            let tmp = tempfile::tempdir().map_err(|_| {
                ApplicationError::unexpected("unable to create a temporary working directory")
            })?;
            (tmp.path().to_path_buf(), Some(tmp))
        }
    };

    let request_file = requests.write_to(&workdir).await?;
    let job = SidecarJob {
        executable: cli.sidecar.clone(),
        paks_dir: cli.paks.clone(),
        mappings_dir: cli.mappings.clone(),
        request_file,
        output_dir: cli.output_dir(),
    };

    let report = job.run_and_verify(&requests).await?;
    for missing in &report.missing {
        warn!("Missing {:?}", missing);
    }
    info!(
        "Extracted {} of {} textures into {:?}",
        report.produced.len(),
        report.produced.len() + report.missing.len(),
        job.output_dir
    );

    Ok(report.status.success())
}

#[tokio::main]
async fn main() -> ExitCode {
    orbital_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("Extractor exited with a failure status");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_goes_under_version_namespace() {
        let cli = Cli::try_parse_from([
            "orbital-extract",
            "--sidecar",
            "/bin/x",
            "--paks",
            "/game/paks",
            "--mappings",
            "/game/mappings",
            "--requests",
            "req.txt",
            "--resources",
            "/res",
            "--version",
            "1.0-stable",
        ])
        .unwrap();
        assert_eq!(cli.output_dir(), PathBuf::from("/res/assets/1.0-stable"));
    }

    #[test]
    fn docs_replace_request_file() {
        let cli = Cli::try_parse_from([
            "orbital-extract",
            "--sidecar",
            "/bin/x",
            "--paks",
            "p",
            "--mappings",
            "m",
            "--docs",
            "/game/CommunityResources/Docs",
            "--version",
            "1.0-stable",
        ])
        .unwrap();
        assert_eq!(cli.requests, None);
        assert_eq!(cli.locale, "en-US");

        let both = Cli::try_parse_from([
            "orbital-extract",
            "--sidecar",
            "/bin/x",
            "--paks",
            "p",
            "--mappings",
            "m",
            "--docs",
            "d",
            "--requests",
            "r",
            "--version",
            "1.0-stable",
        ]);
        assert!(both.is_err());

        let neither = Cli::try_parse_from([
            "orbital-extract",
            "--sidecar",
            "/bin/x",
            "--paks",
            "p",
            "--mappings",
            "m",
            "--version",
            "1.0-stable",
        ]);
        assert!(neither.is_err());
    }

    #[test]
    fn rejects_escaping_version() {
        let parsed = Cli::try_parse_from([
            "orbital-extract",
            "--sidecar",
            "/bin/x",
            "--paks",
            "p",
            "--mappings",
            "m",
            "--requests",
            "r",
            "--version",
            "../outside-stable",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn rejects_malformed_version() {
        let parsed = Cli::try_parse_from([
            "orbital-extract",
            "--sidecar",
            "/bin/x",
            "--paks",
            "p",
            "--mappings",
            "m",
            "--requests",
            "r",
            "--version",
            "1.0-nightly",
        ]);
        assert!(parsed.is_err());
    }
}
