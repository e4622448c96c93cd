//! Skills command implementation.

use crate::cli::SkillsArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use skilltag_domain::traits::PaperCatalog;
use skilltag_embed::recorded_model_id;
use skilltag_store::SqliteStore;

/// Execute the skills command.
pub fn execute_skills(args: SkillsArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    if store.get_paper(args.paper_id)?.is_none() {
        return Err(CliError::NotFound(format!("paper {}", args.paper_id)));
    }

    let model = args.model.as_deref().map(recorded_model_id);
    let skills = store.skills_for_paper(args.paper_id, model.as_deref())?;

    println!("{}", formatter.format_skills(&skills)?);
    Ok(())
}
