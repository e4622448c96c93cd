//! Papers command implementation.

use crate::cli::{PapersAction, PapersArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use skilltag_domain::traits::PaperCatalog;
use skilltag_domain::PaperId;
use skilltag_store::SqliteStore;
use std::io::{self, Write};

/// Execute the papers command.
pub fn execute_papers(args: PapersArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<()> {
    match args.action {
        PapersAction::List { limit, offset } => {
            let papers = store.list_papers(limit, offset)?;
            println!("{}", formatter.format_papers(&papers)?);
        }
        PapersAction::ByAuthor { name } => {
            if name.trim().is_empty() {
                return Err(CliError::InvalidInput("Author name must not be empty".to_string()));
            }
            let papers = store.papers_by_author(&name)?;
            println!("{}", formatter.format_papers(&papers)?);
        }
        PapersAction::Show { id } => {
            let paper = store
                .get_paper(id)?
                .ok_or_else(|| CliError::NotFound(format!("paper {}", id)))?;
            println!("{}", formatter.format_paper(&paper)?);
        }
        PapersAction::Delete { id, yes } => delete_paper(store, id, yes, formatter)?,
    }

    Ok(())
}

fn delete_paper(store: &mut SqliteStore, id: PaperId, yes: bool, formatter: &Formatter) -> Result<()> {
    let paper = store
        .get_paper(id)?
        .ok_or_else(|| CliError::NotFound(format!("paper {}", id)))?;

    // Confirm deletion unless --yes is specified
    if !yes {
        let results = store.skills_for_paper(id, None)?.len();
        println!("About to delete {} and {} extracted skill(s)", paper, results);
        print!("Continue? [y/N] ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    if store.delete_paper(id)? {
        println!("{}", formatter.success(&format!("Deleted paper {}", id)));
    } else {
        println!("{}", formatter.warning(&format!("Paper {} was already gone", id)));
    }
    Ok(())
}
