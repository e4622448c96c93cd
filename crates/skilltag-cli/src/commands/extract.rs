//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use indicatif::{ProgressBar, ProgressStyle};
use skilltag_domain::{AttributionPolicy, CorpusFilter};
use skilltag_embed::{resolve_model, ModelOptions};
use skilltag_extractor::{
    EmbeddingIndex, ExtractionEvent, ExtractionRequest, ExtractorConfig, SkillExtractor,
    SkillTaxonomy,
};
use skilltag_store::SqliteStore;
use tracing::info;

/// Execute the extract command.
pub fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let extractor_config = effective_config(&args, &config.extractor);
    extractor_config.validate().map_err(CliError::InvalidInput)?;

    // Taxonomy and model problems abort before any paper is read
    let taxonomy = SkillTaxonomy::load(&args.taxonomy)?;

    let options = ModelOptions {
        cache_dir: extractor_config.cache_dir.clone(),
    };
    let model = resolve_model(&extractor_config.model, &options)?;
    let index = EmbeddingIndex::build(taxonomy, model)?;

    let extractor = SkillExtractor::new(&index, extractor_config)?;
    info!("Extracting with model '{}'", index.model_id());
    let request = ExtractionRequest::new(build_filter(&args)).with_reprocess(args.reprocess);

    let show_progress = !args.no_progress && formatter.format() == OutputFormat::Table;
    let progress = if show_progress {
        let total = extractor.eligible_count(&*store, &request)?;
        create_progress_bar(total as u64)
    } else {
        ProgressBar::hidden()
    };

    let report = extractor.run_with_progress(store, &request, |event| {
        if let ExtractionEvent::Failed { paper_id, .. } = event {
            progress.set_message(format!("paper {} failed", paper_id));
        }
        progress.inc(1);
    })?;
    progress.finish_and_clear();

    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

/// Config values with command-line flags applied on top
fn effective_config(args: &ExtractArgs, base: &ExtractorConfig) -> ExtractorConfig {
    let mut config = base.clone();
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if let Some(attribution) = args.attribution {
        config.attribution = AttributionPolicy::from(attribution).as_str().to_string();
    }
    config
}

fn build_filter(args: &ExtractArgs) -> CorpusFilter {
    let filter = match &args.author {
        Some(author) => CorpusFilter::by_author(author.clone()),
        None => CorpusFilter::default(),
    };
    filter.with_years(args.start_year, args.end_year)
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} papers {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}
