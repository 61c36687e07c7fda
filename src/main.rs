use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use kubearch_inspect::{
    DockerManifestProbe, HttpInspectionService, InspectionService, Orchestrator,
    ProbeInspectionService,
};
use kubearch_k8s::{
    DocumentWorkloadSource, KubeClient, KubeWorkloadSource, WorkloadScanner, WorkloadSource,
};
use kubearch_report::{
    export_file_name, ExportFormat, ReportQuery, SortDirection, SortKey, StatusFilter,
};
use kubearch_types::{ArchError, InspectionReport, NamespaceScope};

mod config;
mod listing;

use config::Config;

/// Kubearch - Find out which container images in a Kubernetes cluster support ARM64
#[derive(Parser, Debug)]
#[command(name = "kubearch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Kubernetes context name (defaults to the kubeconfig's current context)
    #[arg(value_name = "CONTEXT")]
    context: Option<String>,

    /// Namespace to scan ("all" scans every namespace)
    #[arg(value_name = "NAMESPACE", default_value = "all")]
    namespace: String,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Kubeconfig file to read
    #[arg(long, value_name = "FILE")]
    kubeconfig: Option<PathBuf>,

    /// Read workloads from a `kubectl get -o json|yaml` document instead of a cluster
    #[arg(long, value_name = "FILE")]
    from_file: Option<PathBuf>,

    /// Inspection service URL (images are probed with docker when unset)
    #[arg(long, value_name = "URL")]
    service_url: Option<String>,

    /// Show only: all, compatible, incompatible, errors
    #[arg(long, default_value = "all")]
    filter: StatusFilter,

    /// Case-insensitive text to look for in image, name, namespace or kind
    #[arg(long, default_value = "")]
    search: String,

    /// Sort by: image, name, namespace, kind, arm
    #[arg(long, default_value = "image")]
    sort: SortKey,

    /// Sort in descending order
    #[arg(long)]
    desc: bool,

    /// Page to show (starting at 1)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    page: u64,

    /// Rows per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Write the report as csv or json (repeatable)
    #[arg(long = "export", value_name = "FORMAT")]
    exports: Vec<ExportFormat>,

    /// Directory for exported files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// List kubeconfig contexts and exit
    #[arg(long, conflicts_with = "from_file")]
    list_contexts: bool,

    /// List the namespaces of the selected context and exit
    #[arg(long, conflicts_with = "from_file")]
    list_namespaces: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing for debugging
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    // Dropping the run future discards whatever it was waiting on
    let result = tokio::select! {
        result = run_app(args) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted");
            return ExitCode::from(130);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(arch_error) = e.downcast_ref::<ArchError>() {
                eprintln!("{}", arch_error.remediation());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let scope: NamespaceScope = args.namespace.parse().unwrap_or_default();

    let (context, source) = match &args.from_file {
        Some(path) => {
            let source = DocumentWorkloadSource::from_path(path)?;
            let context = args
                .context
                .clone()
                .unwrap_or_else(|| path.display().to_string());
            (context, Box::new(source) as Box<dyn WorkloadSource>)
        }
        None => {
            let kubeconfig = args.kubeconfig.as_deref().or(config.kubeconfig.as_deref());
            let kube_client = KubeClient::load(kubeconfig)?;

            if args.list_contexts {
                print_contexts(&kube_client);
                return Ok(());
            }

            let context = kube_client
                .catalog()
                .select(args.context.as_deref())?
                .name
                .clone();

            if args.list_namespaces {
                let client = kube_client.client_for_context(&context).await?;
                for namespace in kube_client.namespaces(&client).await? {
                    println!("{}", namespace);
                }
                return Ok(());
            }

            let source = KubeWorkloadSource::connect(&kube_client, &context).await?;
            (context, Box::new(source) as Box<dyn WorkloadSource>)
        }
    };

    let references = match WorkloadScanner::new(source).scan(&context, &scope).await {
        Ok(references) => references,
        Err(e @ ArchError::EmptyResult { .. }) => {
            println!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let orchestrator = Orchestrator::new(inspection_service(&args, &config)?);
    let report = orchestrator.inspect(&references, &context, &scope).await?;

    let query = ReportQuery {
        status: args.filter,
        search: args.search.clone(),
        sort_key: args.sort,
        direction: if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        },
        page: (args.page - 1) as usize,
        page_size: args.page_size.unwrap_or(config.report.page_size),
    };
    let page = query.apply(&report)?;
    print!("{}", listing::render(&report, &page));

    let output_dir = args.output_dir.as_deref().unwrap_or(&config.export.directory);
    for format in &args.exports {
        let path = export_report(&report, *format, output_dir, &config.export.prefix)?;
        println!("Exported {}", path.display());
    }

    Ok(())
}

fn inspection_service(args: &Args, config: &Config) -> Result<Box<dyn InspectionService>> {
    let service_url = args
        .service_url
        .as_deref()
        .or(config.inspection.service_url.as_deref());

    let service: Box<dyn InspectionService> = match service_url {
        Some(url) => {
            let timeout = Duration::from_secs(config.inspection.timeout_secs);
            Box::new(HttpInspectionService::new(url, timeout)?)
        }
        None => {
            let probe = match &config.inspection.probe_program {
                Some(program) => DockerManifestProbe::with_program(program.clone()),
                None => DockerManifestProbe::new(),
            };
            Box::new(ProbeInspectionService::new(probe).with_concurrency(config.inspection.concurrency))
        }
    };
    Ok(service)
}

fn print_contexts(kube_client: &KubeClient) {
    if kube_client.catalog().is_empty() {
        println!("No contexts available");
        return;
    }
    for ctx in kube_client.contexts() {
        let marker = if ctx.is_current { "*" } else { " " };
        println!("{} {}\t{}\t{}", marker, ctx.name, ctx.cluster, ctx.namespace);
    }
}

/// Write the report to `dir` under a date-stamped name
fn export_report(
    report: &InspectionReport,
    format: ExportFormat,
    dir: &Path,
    prefix: &str,
) -> Result<PathBuf> {
    let content = format.render(report)?;
    let filename = export_file_name(prefix, Utc::now().date_naive(), format);
    let path = dir.join(filename);

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
