use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use framewright::render::{ExternalRenderer, RenderJob};
use framewright::{Artifact, Pipeline, PipelineConfig, ValidationReport, Validator};

#[derive(Parser, Debug)]
#[command(
    name = "framewright",
    version,
    about = "Transpile stateful React artifacts into deterministic, frame-indexed components."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Pipeline config JSON (defaults apply to missing keys).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the external type checker.
    #[arg(long, global = true)]
    no_typecheck: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transpile one artifact and print (or write) the result.
    Transpile(TranspileArgs),
    /// Validate a component and print its findings.
    Validate(InputArgs),
    /// Repair quote corruption and print the repaired text.
    Repair(RepairArgs),
    /// Report missing or malformed project files without writing.
    Check(ProjectArgs),
    /// Synthesize missing project files.
    Recover(RecoverArgs),
    /// Transpile an artifact into a project directory, optionally rendering it.
    Deploy(DeployArgs),
    /// Transpile every artifact in a directory in parallel.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Artifact file.
    input: PathBuf,

    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct TranspileArgs {
    /// Artifact file.
    input: PathBuf,

    /// Output file; stdout when absent.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print substitutions, notes and repair audit to stderr.
    #[arg(long)]
    explain: bool,
}

#[derive(Args, Debug)]
struct RepairArgs {
    /// Artifact file.
    input: PathBuf,

    /// Rewrite the file instead of printing.
    #[arg(long)]
    in_place: bool,
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Project directory.
    project: PathBuf,

    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RecoverArgs {
    /// Project directory.
    project: PathBuf,

    /// Text for a missing primary payload.
    #[arg(long)]
    payload: Option<PathBuf>,

    /// Composition id used by generated templates.
    #[arg(long, default_value = "Artifact")]
    composition: String,
}

#[derive(Args, Debug)]
struct DeployArgs {
    /// Artifact file.
    input: PathBuf,

    /// Project directory.
    project: PathBuf,

    /// Render the composition to this video file after deploying.
    #[arg(long)]
    render: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Directory of artifacts (`.jsx`, `.tsx`, `.js`, `.ts`).
    dir: PathBuf,

    /// Output directory for transpiled components.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Transpile(args) => cmd_transpile(&cli.global, args),
        Command::Validate(args) => cmd_validate(&cli.global, args),
        Command::Repair(args) => cmd_repair(args),
        Command::Check(args) => cmd_check(&cli.global, args),
        Command::Recover(args) => cmd_recover(&cli.global, args),
        Command::Deploy(args) => cmd_deploy(&cli.global, args),
        Command::Batch(args) => cmd_batch(&cli.global, args),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn load_config(global: &GlobalArgs) -> anyhow::Result<PipelineConfig> {
    let mut cfg = match &global.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => PipelineConfig::default(),
    };
    if global.no_typecheck {
        cfg.oracle.enabled = false;
    }
    Ok(cfg)
}

fn make_pipeline(global: &GlobalArgs, project: Option<&Path>) -> anyhow::Result<Pipeline> {
    let cfg = load_config(global)?;
    let oracle = cfg.oracle.build(project);
    Ok(Pipeline::new(Arc::new(cfg), oracle))
}

fn read_artifact(path: &Path) -> anyhow::Result<Artifact> {
    Artifact::from_path(path).with_context(|| format!("read artifact '{}'", path.display()))
}

fn print_report(report: &ValidationReport) {
    for f in &report.findings {
        eprintln!("{}:{f}", report.identifier);
    }
    eprintln!("{}: {}", report.identifier, report.summary());
}

fn cmd_transpile(global: &GlobalArgs, args: TranspileArgs) -> anyhow::Result<ExitCode> {
    let pipeline = make_pipeline(global, None)?;
    let artifact = read_artifact(&args.input)?;
    let done = match pipeline.transpile(&artifact) {
        Ok(done) => done,
        Err(rejected) => {
            print_report(&rejected.report);
            return Ok(ExitCode::from(1));
        }
    };

    if args.explain {
        for s in &done.rewrite.substitutions {
            eprintln!("substituted {} = {}", s.binding_name, s.frame_expression);
        }
        for note in &done.rewrite.notes {
            eprintln!("note: {note}");
        }
        for line in done.repair_audit() {
            eprintln!("repair: {line}");
        }
        eprintln!("confidence: {:.2}", done.rewrite.confidence);
    }

    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(out, &done.text)
                .with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => print!("{}", done.text),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(global: &GlobalArgs, args: InputArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_config(global)?;
    let oracle = cfg.oracle.build(None);
    let artifact = read_artifact(&args.input)?;
    let report = Validator::new(oracle.as_ref()).validate(artifact.source_text(), artifact.identifier());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(if report.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn cmd_repair(args: RepairArgs) -> anyhow::Result<ExitCode> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read '{}'", args.input.display()))?;
    let outcome = framewright::repair(&text);
    for line in outcome.audit() {
        eprintln!("{line}");
    }
    if args.in_place {
        if outcome.fix_count > 0 {
            std::fs::write(&args.input, &outcome.text)
                .with_context(|| format!("write '{}'", args.input.display()))?;
        }
        eprintln!("{} fix(es) in {}", outcome.fix_count, args.input.display());
    } else {
        print!("{}", outcome.text);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(global: &GlobalArgs, args: ProjectArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_config(global)?;
    let report = framewright::check_project_integrity(&args.project, &cfg.manifest);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for path in &report.missing {
            println!("missing   {path}");
        }
        for path in &report.malformed {
            println!("malformed {path}");
        }
        println!("{:?}", report.final_state);
    }
    Ok(if report.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn cmd_recover(global: &GlobalArgs, args: RecoverArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_config(global)?;
    let payload = args
        .payload
        .as_ref()
        .map(|p| std::fs::read_to_string(p).with_context(|| format!("read '{}'", p.display())))
        .transpose()?;
    let opts = cfg.recover_options(&args.composition, payload);
    let report = framewright::auto_recover_project(&args.project, &cfg.manifest, &opts)?;
    for action in &report.actions_taken {
        println!("{action}");
    }
    println!("{:?} after {} attempt(s)", report.state, report.attempts);
    report.into_result()?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_deploy(global: &GlobalArgs, args: DeployArgs) -> anyhow::Result<ExitCode> {
    let pipeline = make_pipeline(global, Some(&args.project))?;
    let artifact = read_artifact(&args.input)?;
    let deployment = match pipeline.transpile(&artifact) {
        Ok(done) => pipeline.install(done, &artifact.composition_id(), &args.project)?,
        Err(rejected) => {
            print_report(&rejected.report);
            return Ok(ExitCode::from(1));
        }
    };
    for action in &deployment.integrity.actions_taken {
        eprintln!("{action}");
    }
    eprintln!(
        "deployed {} into {} ({:?})",
        artifact.identifier(),
        args.project.display(),
        deployment.integrity.state
    );

    if let Some(out) = args.render {
        let renderer = ExternalRenderer::from_config(&pipeline.config().renderer);
        let job = RenderJob::for_manifest(&pipeline.config().manifest, artifact.composition_id(), out);
        let written = renderer.render(&args.project, &job)?;
        eprintln!("wrote {}", written.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn is_artifact(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e, "jsx" | "tsx" | "js" | "ts"))
}

fn cmd_batch(global: &GlobalArgs, args: BatchArgs) -> anyhow::Result<ExitCode> {
    let pipeline = make_pipeline(global, None)?;
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(&args.dir)
        .with_context(|| format!("read dir '{}'", args.dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| is_artifact(p))
        .collect();
    inputs.sort();
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let outcomes: Vec<(PathBuf, anyhow::Result<bool>)> = inputs
        .par_iter()
        .map(|path| {
            let run = || -> anyhow::Result<bool> {
                let artifact = read_artifact(path)?;
                match pipeline.transpile(&artifact) {
                    Ok(done) => {
                        let out = args.out.join(format!("{}.tsx", artifact.identifier()));
                        std::fs::write(&out, &done.text)
                            .with_context(|| format!("write '{}'", out.display()))?;
                        Ok(true)
                    }
                    Err(rejected) => {
                        print_report(&rejected.report);
                        Ok(false)
                    }
                }
            };
            (path.clone(), run())
        })
        .collect();

    let mut ok = 0usize;
    for (path, outcome) in &outcomes {
        match outcome {
            Ok(true) => ok += 1,
            Ok(false) => eprintln!("rejected {}", path.display()),
            Err(e) => eprintln!("failed {}: {e:#}", path.display()),
        }
    }
    eprintln!("{ok}/{} artifact(s) transpiled into {}", outcomes.len(), args.out.display());
    Ok(if ok == outcomes.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
