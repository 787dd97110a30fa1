use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use goml_project::{Project, create_new_project};
use goml_runtime::Runtime;

const DEFAULT_PROJECT_NAME: &str = "GOML Project";

fn main() {
    let args: Vec<String> = env::args().collect();
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let Some(command) = args.get(1).map(String::as_str) else {
        print_usage();
        std::process::exit(2);
    };

    let result = match command {
        "new" => new_command(&args, &cwd),
        "check" => check_command(&args, &cwd),
        "run" => run_command(&args, &cwd),
        _ => {
            print_usage();
            Err(anyhow::anyhow!("unknown command `{command}`"))
        }
    };

    if let Err(err) = result {
        log::error!("{err:#}");
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  goml new [--path <parent_dir>] [--name <project_name>]");
    eprintln!("  goml check [--path <project_dir>]   # parse and build the main document");
    eprintln!("  goml run [--path <project_dir>] [--frames <n>] [--fps <rate>]");
}

fn parse_flag_value(args: &[String], flag: &str) -> Option<String> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).cloned()
}

fn parse_number_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> anyhow::Result<Option<T>> {
    match parse_flag_value(args, flag) {
        Some(raw) => match raw.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => bail!("{flag} expects a number, got `{raw}`"),
        },
        None => Ok(None),
    }
}

fn project_root(args: &[String], cwd: &Path) -> PathBuf {
    parse_flag_value(args, "--path")
        .map(|p| cwd.join(p))
        .unwrap_or_else(|| cwd.to_path_buf())
}

fn init_logger(level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

fn sanitize_project_dir_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "goml_project".to_string()
    } else {
        cleaned.to_string()
    }
}

fn new_command(args: &[String], cwd: &Path) -> anyhow::Result<()> {
    init_logger("info");
    let base_dir = project_root(args, cwd);
    let name = parse_flag_value(args, "--name").unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
    let project_dir = base_dir.join(sanitize_project_dir_name(&name));

    create_new_project(&project_dir, &name)
        .with_context(|| format!("failed to create project at {}", project_dir.display()))?;
    println!("created project `{name}` at {}", project_dir.display());
    Ok(())
}

fn load_project(args: &[String], cwd: &Path) -> anyhow::Result<Project> {
    let root = project_root(args, cwd);
    let project = Project::load(&root)
        .with_context(|| format!("no GOML project at {}", root.display()))?;
    init_logger(&project.runtime().log_level);
    Ok(project)
}

fn check_command(args: &[String], cwd: &Path) -> anyhow::Result<()> {
    let project = load_project(args, cwd)?;
    let path = project.main_document_path();
    let source = project.read_main_document()?;
    let markup = goml_markup::parse(&source)
        .with_context(|| format!("{} does not parse", path.display()))?;

    let runtime = Runtime::from_project(project)?;
    let document = runtime.document().borrow();
    println!(
        "{}: {} declarations, {} elements, {} core objects",
        path.display(),
        markup.declarations.len(),
        document.len(),
        document.objects().len()
    );
    Ok(())
}

fn run_command(args: &[String], cwd: &Path) -> anyhow::Result<()> {
    let project = load_project(args, cwd)?;
    let frames = parse_number_flag::<u64>(args, "--frames")?
        .unwrap_or(u64::from(project.runtime().frames));
    let fps = parse_number_flag::<f64>(args, "--fps")?.unwrap_or(project.runtime().fps);
    if !(fps.is_finite() && fps > 0.0) {
        bail!("--fps must be a positive number, got {fps}");
    }

    let name = project.name().to_string();
    let mut runtime = Runtime::from_project(project)?;
    log::info!("running {name} for {frames} frames at {fps} fps");

    let summary = runtime.run_frames(frames, fps);
    log::info!(
        "{} frames ({} skipped), {} callbacks, {} failures, {:.3}s simulated",
        summary.frames,
        summary.skipped,
        summary.callbacks,
        summary.failures,
        summary.elapsed
    );
    if summary.failures > 0 {
        bail!("{} frame callbacks failed", summary.failures);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_values() {
        let a = args(&["goml", "run", "--frames", "10", "--fps", "x"]);
        assert_eq!(parse_flag_value(&a, "--frames").as_deref(), Some("10"));
        assert_eq!(parse_number_flag::<u64>(&a, "--frames").unwrap(), Some(10));
        assert!(parse_number_flag::<f64>(&a, "--fps").is_err());
        assert_eq!(parse_number_flag::<u64>(&a, "--path").unwrap(), None);
        assert_eq!(parse_flag_value(&args(&["goml", "run", "--path"]), "--path"), None);
    }

    #[test]
    fn project_dir_names() {
        assert_eq!(sanitize_project_dir_name("My Game"), "My_Game");
        assert_eq!(sanitize_project_dir_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_project_dir_name(" .. "), "goml_project");
    }
}
