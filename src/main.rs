use std::io;
use std::path::PathBuf;

use clap::Parser;
use ebookgen::config::Config;
use ebookgen::{CohereClient, Error, Pipeline, Result, TemplateStore, WkHtmlToPdf, prompt, render};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "ebookgen")]
#[command(about = "Generate an eBook about a topic and render it to PDF")]
struct Cli {
    /// Config file (defaults to $EBOOKGEN_CONFIG, then ./ebookgen.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the wkhtmltopdf executable
    #[arg(long)]
    wkhtmltopdf: Option<PathBuf>,

    /// Directory the Markdown and PDF files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() {
    // Logs go to stderr; stdout carries the prompts
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        report(&e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let Config {
        generator,
        renderer,
        templates,
    } = Config::discover(cli.config.as_deref())?;

    // Everything that can be checked is checked before the slow generation step
    let wkhtmltopdf = cli.wkhtmltopdf.as_deref().or(renderer.path.as_deref());
    let renderer = WkHtmlToPdf::resolve(wkhtmltopdf)?.with_options(renderer.options);
    let templates = TemplateStore::discover(templates.dir.as_deref());
    let generator = CohereClient::new(generator)?;
    let pipeline = Pipeline::new(generator, templates, renderer);

    let request = prompt::ask_request(&mut io::stdin().lock(), &mut io::stdout())?;

    let files = pipeline.run(&request, &cli.output_dir, |step| println!("{step}"))?;

    println!("eBook '{}' generation complete!", files.pdf.display());
    Ok(())
}

fn report(err: &Error) {
    match err {
        Error::RendererNotFound { path, source } => {
            eprintln!("\n{}\n", render::install_help(path));
            eprintln!("({source})");
        }
        _ => eprintln!("Error: {err}"),
    }
}
