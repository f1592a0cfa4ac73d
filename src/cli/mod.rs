//! TZ-017: CLI subcommands — infer, table, blocks, run, eval, exec,
//! fanout, validate, init, completions.

use crate::cluster::{self, fanout};
use crate::core::{self, InferredType};
use crate::polyglot::{self, Runner};
use crate::runlog::RunLog;
use crate::transport;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect and parse typed output from a file or stdin
    Infer {
        /// Input file (stdin if omitted)
        file: Option<PathBuf>,

        /// Force a target type instead of detecting
        #[arg(short, long)]
        r#type: Option<String>,

        /// Print a JSON object with type and value
        #[arg(long)]
        json: bool,
    },

    /// Convert columnar output into records
    Table {
        /// Input file (stdin if omitted)
        file: Option<PathBuf>,

        /// Field delimiter
        #[arg(short, long, default_value = " ")]
        delimiter: String,

        /// Comma-separated header fields (first input line otherwise)
        #[arg(long)]
        header: Option<String>,
    },

    /// List the block sequence of a polyglot file
    Blocks {
        /// Polyglot source file
        file: PathBuf,
    },

    /// Run a polyglot file
    Run {
        /// Polyglot source file
        file: PathBuf,

        /// Directory for the JSONL run log
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Run a polyglot snippet given on the command line
    Eval {
        /// Snippet source (starts in the script language)
        code: String,
    },

    /// Execute one command and type its output
    Exec {
        /// Command text
        command: String,

        /// Remote host (user@addr); runs locally if omitted
        #[arg(long)]
        host: Option<String>,

        /// Fail on non-zero exit
        #[arg(long)]
        check: bool,

        /// Stream stdout lines as they arrive
        #[arg(long)]
        stream: bool,

        /// Bind the terminal directly to the command
        #[arg(long)]
        interactive: bool,
    },

    /// Fan a command template out across targets
    Fanout {
        /// Command template ({name}, {addr}, {user}, {worker})
        template: String,

        /// Cluster inventory file
        #[arg(short, long)]
        cluster: Option<PathBuf>,

        /// Ad-hoc user@addr targets
        #[arg(long, value_delimiter = ',')]
        hosts: Vec<String>,

        /// Number of local workers
        #[arg(long)]
        workers: Option<usize>,

        /// Only cluster hosts carrying this role
        #[arg(long)]
        role: Option<String>,

        /// Parallelism bound
        #[arg(long, default_value_t = fanout::DEFAULT_LIMIT)]
        limit: usize,

        /// Print rendered commands without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a cluster inventory without connecting
    Validate {
        /// Path to trenza.yaml
        #[arg(short, long, default_value = "trenza.yaml")]
        file: PathBuf,
    },

    /// Initialize a new trenza project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Infer { file, r#type, json } => cmd_infer(file.as_deref(), r#type.as_deref(), json),
        Commands::Table {
            file,
            delimiter,
            header,
        } => cmd_table(file.as_deref(), &delimiter, header.as_deref()),
        Commands::Blocks { file } => cmd_blocks(&file),
        Commands::Run { file, log_dir } => cmd_run(&file, log_dir.as_deref()),
        Commands::Eval { code } => cmd_eval(&code),
        Commands::Exec {
            command,
            host,
            check,
            stream,
            interactive,
        } => cmd_exec(&command, host.as_deref(), check, stream, interactive),
        Commands::Fanout {
            template,
            cluster,
            hosts,
            workers,
            role,
            limit,
            dry_run,
        } => cmd_fanout(
            &template,
            cluster.as_deref(),
            &hosts,
            workers,
            role.as_deref(),
            limit,
            dry_run,
        ),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Init { path } => cmd_init(&path),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

fn read_input(file: Option<&Path>) -> Result<String, String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e)),
        None => std::io::read_to_string(std::io::stdin()).map_err(|e| format!("stdin: {}", e)),
    }
}

fn cmd_infer(file: Option<&Path>, type_name: Option<&str>, json: bool) -> Result<(), String> {
    let input = read_input(file)?;

    let value = match type_name {
        Some(name) => {
            let target =
                InferredType::from_name(name).ok_or_else(|| format!("unknown type: {}", name))?;
            core::parse_as(&input, target)?
        }
        None => core::parse(&input)?,
    };

    if json {
        let doc = serde_json::json!({
            "type": value.type_of().to_string(),
            "value": value.to_json(),
        });
        println!("{}", doc);
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn cmd_table(file: Option<&Path>, delimiter: &str, header: Option<&str>) -> Result<(), String> {
    let input = read_input(file)?;
    let delimiter = delimiter
        .chars()
        .next()
        .ok_or_else(|| "delimiter must not be empty".to_string())?;
    let header =
        header.map(|h| h.split(',').map(|f| f.trim().to_string()).collect::<Vec<_>>());

    for record in core::as_table(&input, delimiter, header) {
        let json = serde_json::to_string(&record).map_err(|e| format!("JSON error: {}", e))?;
        println!("{}", json);
    }
    Ok(())
}

fn cmd_blocks(file: &Path) -> Result<(), String> {
    let blocks = polyglot::scan_file(file)?;
    for (i, block) in blocks.iter().enumerate() {
        let lang = block.lang.to_string();
        let preview = block.body.lines().next().unwrap_or("");
        let more = block.body.lines().count().saturating_sub(1);
        if more > 0 {
            println!("{:>3} {:6} {} (+{} lines)", i, lang, preview, more);
        } else {
            println!("{:>3} {:6} {}", i, lang, preview);
        }
    }
    Ok(())
}

fn cmd_run(file: &Path, log_dir: Option<&Path>) -> Result<(), String> {
    let mut runner = Runner::new();
    if let Some(dir) = log_dir {
        runner = runner.log_to(RunLog::new(dir));
    }
    let ctx = runner.run_file(file)?;
    print_context(&ctx);
    Ok(())
}

fn cmd_eval(code: &str) -> Result<(), String> {
    let ctx = Runner::new().run_str(code)?;
    print_context(&ctx);
    Ok(())
}

/// Show the final context after a run.
fn print_context(ctx: &polyglot::ExecutionContext) {
    for (name, value) in &ctx.vars {
        println!("{} = {}", name, value);
    }
    for (name, value) in &ctx.env {
        println!("{}={}", name, value);
    }
}

fn cmd_exec(
    command: &str,
    host: Option<&str>,
    check: bool,
    stream: bool,
    interactive: bool,
) -> Result<(), String> {
    if interactive {
        let out = transport::local::exec_local_interactive(command)?;
        if !out.success() {
            return Err(format!("exit code {}", out.exit_code));
        }
        return Ok(());
    }

    if let Some(spec) = host {
        let target = cluster::Host::from_spec(spec);
        let out = transport::exec(&target, command)?;
        print!("{}", out.stdout);
        eprint!("{}", out.stderr);
        if !out.success() {
            return Err(format!("exit code {}", out.exit_code));
        }
        return Ok(());
    }

    if stream {
        let out = transport::local::exec_local_streaming(command, &mut |line| {
            println!("{}", line);
        })?;
        eprint!("{}", out.stderr);
        if !out.success() {
            return Err(format!("exit code {}", out.exit_code));
        }
        return Ok(());
    }

    if check {
        let out = transport::run_checked(command).map_err(|e| e.to_string())?;
        println!("{}", core::parse(&out.stdout)?);
        return Ok(());
    }

    println!("{}", transport::capture(command)?);
    Ok(())
}

fn cmd_fanout(
    template: &str,
    cluster_file: Option<&Path>,
    hosts: &[String],
    workers: Option<usize>,
    role: Option<&str>,
    limit: usize,
    dry_run: bool,
) -> Result<(), String> {
    let targets = if let Some(path) = cluster_file {
        let config = cluster::parse_cluster_file(path)?;
        let errors = cluster::validate_cluster(&config);
        if !errors.is_empty() {
            for e in &errors {
                eprintln!("  ERROR: {}", e);
            }
            return Err(format!("{} validation error(s)", errors.len()));
        }
        fanout::targets_from_cluster(&config, role)
    } else if !hosts.is_empty() {
        fanout::targets_from_specs(hosts)
    } else if let Some(n) = workers {
        fanout::local_workers(n)
    } else {
        return Err("no targets: use --cluster, --hosts, or --workers".to_string());
    };

    if targets.is_empty() {
        return Err("no targets matched".to_string());
    }

    if dry_run {
        for (i, target) in targets.iter().enumerate() {
            let command = fanout::render_command(template, target, i);
            println!(
                "{}: {}",
                target.name,
                transport::ssh::render_ssh_command(&target.host, &command)
            );
        }
        return Ok(());
    }

    let results = fanout::run_fanout(targets, template, limit)?;

    let mut failed = 0u32;
    for result in &results {
        match &result.output {
            Ok(out) if out.success() => {
                println!("{}: ok", result.name);
                for line in out.stdout.lines() {
                    println!("  {}", line);
                }
            }
            Ok(out) => {
                failed += 1;
                println!("{}: exit {}", result.name, out.exit_code);
                for line in out.stderr.lines() {
                    println!("  {}", line);
                }
            }
            Err(e) => {
                failed += 1;
                println!("{}: error: {}", result.name, e);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} target(s) failed", failed));
    }
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let config = cluster::parse_cluster_file(file)?;
    let errors = cluster::validate_cluster(&config);

    if errors.is_empty() {
        println!("OK: {} ({} hosts)", config.name, config.hosts.len());
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("trenza.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }

    let template = r#"version: "1.0"
name: my-cluster
description: "Managed by trenza"

hosts: {}
"#;
    std::fs::write(&config_path, template)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    let demo_path = path.join("demo.tz");
    if !demo_path.exists() {
        let demo = r#"# A braided script: assignments here, shell below.
kernel = $(uname -r)
#B> echo "running on $kernel"
hosts = $(ls /etc | wc -l)
"#;
        std::fs::write(&demo_path, demo)
            .map_err(|e| format!("cannot write {}: {}", demo_path.display(), e))?;
    }

    println!("Initialized trenza project at {}", path.display());
    println!("  Created: {}", config_path.display());
    println!("  Created: {}", demo_path.display());
    Ok(())
}

/// Mirror of the binary's top-level parser, for completion generation.
#[derive(Parser)]
#[command(name = "trenza", version)]
struct CompletionTarget {
    #[command(subcommand)]
    command: Commands,
}

fn cmd_completions(shell: clap_complete::Shell) -> Result<(), String> {
    let mut cmd = CompletionTarget::command();
    clap_complete::generate(shell, &mut cmd, "trenza", &mut std::io::stdout());
    Ok(())
}
